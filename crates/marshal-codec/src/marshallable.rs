//! Self-serializing object contract.
//!
//! Implementors write their fields in one fixed order and read them back in
//! the same order. Nothing on the wire identifies the type or its fields.

use std::io;

use crate::error::Result;
use crate::reader::UnmarshallingContext;
use crate::writer::MarshallingContext;

/// A value that can marshal itself into a writing context.
pub trait Marshallable {
    /// Write this value's fields into `context`.
    fn marshal_into(&self, context: &mut MarshallingContext<'_>) -> Result<()>;

    /// Marshal this value into a fresh context and return the bytes.
    ///
    /// The context has its own string dictionary, so shared strings are
    /// written in full the first time they occur within this value.
    fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        let mut context = MarshallingContext::new(&mut bytes);
        self.marshal_into(&mut context)?;
        context.close()?;
        Ok(bytes)
    }

    /// Number of bytes [`to_bytes`](Marshallable::to_bytes) would produce.
    fn size(&self) -> Result<usize> {
        let mut context = MarshallingContext::new(io::sink());
        self.marshal_into(&mut context)?;
        let size = context.bytes_written();
        context.close()?;
        Ok(size as usize)
    }
}

impl<M: Marshallable + ?Sized> Marshallable for &M {
    fn marshal_into(&self, context: &mut MarshallingContext<'_>) -> Result<()> {
        (**self).marshal_into(context)
    }
}

impl<M: Marshallable + ?Sized> Marshallable for Box<M> {
    fn marshal_into(&self, context: &mut MarshallingContext<'_>) -> Result<()> {
        (**self).marshal_into(context)
    }
}

/// A value that can be constructed from a reading context.
pub trait Unmarshallable: Sized {
    /// Read this value's fields from `context`.
    fn unmarshal_from(context: &mut UnmarshallingContext<'_>) -> Result<Self>;

    /// Unmarshal a value from bytes produced by [`Marshallable::to_bytes`].
    ///
    /// Trailing bytes after the value are ignored.
    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut context = UnmarshallingContext::new(bytes);
        let value = Self::unmarshal_from(&mut context)?;
        context.close()?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Tagged {
        tag: String,
        value: i64,
    }

    impl Marshallable for Tagged {
        fn marshal_into(&self, context: &mut MarshallingContext<'_>) -> Result<()> {
            context.write_string_shared(&self.tag)?;
            context.write_compact_long(self.value)
        }
    }

    impl Unmarshallable for Tagged {
        fn unmarshal_from(context: &mut UnmarshallingContext<'_>) -> Result<Self> {
            Ok(Self {
                tag: context.read_string_shared()?,
                value: context.read_compact_long()?,
            })
        }
    }

    #[test]
    fn to_bytes_then_from_bytes() {
        let tagged = Tagged {
            tag: "gas".to_owned(),
            value: 1_000_000,
        };

        let bytes = tagged.to_bytes().unwrap();
        assert_eq!(bytes, vec![255, 3, b'g', b'a', b's', 0xFE, 0, 0x0F, 0x42, 0x40]);
        assert_eq!(Tagged::from_bytes(&bytes).unwrap(), tagged);
    }

    #[test]
    fn size_matches_to_bytes() {
        let tagged = Tagged {
            tag: "x".repeat(300),
            value: -7,
        };

        assert_eq!(tagged.size().unwrap(), tagged.to_bytes().unwrap().len());
    }

    #[test]
    fn references_and_boxes_delegate() {
        let tagged = Tagged {
            tag: "t".to_owned(),
            value: 1,
        };
        let boxed: Box<dyn Marshallable> = Box::new(Tagged {
            tag: "t".to_owned(),
            value: 1,
        });

        assert_eq!((&tagged).to_bytes().unwrap(), boxed.to_bytes().unwrap());
    }

    #[test]
    fn arrays_of_marshallables() {
        let items = vec![
            Tagged {
                tag: "a".to_owned(),
                value: 1,
            },
            Tagged {
                tag: "a".to_owned(),
                value: 2,
            },
        ];

        let mut wire = Vec::new();
        let mut writer = MarshallingContext::new(&mut wire);
        writer.write_length_and_array(&items).unwrap();
        writer.close().unwrap();

        assert_eq!(wire, vec![2, 255, 1, b'a', 1, 0, 2]);

        let mut reader = UnmarshallingContext::new(wire.as_slice());
        let decoded = reader.read_length_and_array(Tagged::unmarshal_from).unwrap();
        assert_eq!(decoded, items);
    }
}
