use std::any::type_name;
use std::io::{self, ErrorKind};

use bytes::{Buf, Bytes, BytesMut};
use marshal_stream::Source;
use num_bigint::BigInt;
use tracing::{debug, trace, warn};

use crate::codec::{inline_big_integer, ContextConfig};
use crate::dictionary::ReadDictionary;
use crate::error::{MarshalError, Result};
use crate::marker::{
    big_integer_selector_name, is_inline_index, is_inline_int, is_inline_long, BIG_DECIMAL,
    BIG_INT, BIG_LONG, BIG_SHORT, INT_SHORT, LONG_INT, LONG_SHORT, STRING_INDEX,
};
use crate::registry::ObjectUnmarshallers;

const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Upper bound, in bytes, on the space reserved for an array before any of
/// its items has been read.
const MAX_ARRAY_PREALLOCATION: usize = 64 * 1024;

/// Reading context: unmarshals values from a [`Source`].
///
/// Calls must mirror, in order, the calls issued on the writing context that
/// produced the stream. Bytes are pulled from the source in chunks, so the
/// source may be read past the last token consumed.
pub struct UnmarshallingContext<'a> {
    source: Box<dyn Source + 'a>,
    buf: BytesMut,
    strings: ReadDictionary,
    unmarshallers: ObjectUnmarshallers,
    config: ContextConfig,
    closed: bool,
}

impl<'a> UnmarshallingContext<'a> {
    /// Create a reading context with default configuration and no unmarshallers.
    pub fn new(source: impl Source + 'a) -> Self {
        Self::with_config(source, ContextConfig::default())
    }

    /// Create a reading context with explicit configuration.
    pub fn with_config(source: impl Source + 'a, config: ContextConfig) -> Self {
        Self::with_unmarshallers(source, ObjectUnmarshallers::new(), config)
    }

    /// Create a reading context that dispatches [`read_object`] through
    /// `unmarshallers`.
    ///
    /// [`read_object`]: UnmarshallingContext::read_object
    pub fn with_unmarshallers(
        source: impl Source + 'a,
        unmarshallers: ObjectUnmarshallers,
        config: ContextConfig,
    ) -> Self {
        Self {
            source: Box::new(source),
            buf: BytesMut::with_capacity(config.buffer_capacity),
            strings: ReadDictionary::new(),
            unmarshallers,
            config,
            closed: false,
        }
    }

    pub fn read_byte(&mut self) -> Result<u8> {
        self.require(1)?;
        Ok(self.buf.get_u8())
    }

    /// Read a boolean. Any non-zero byte is `true`.
    pub fn read_boolean(&mut self) -> Result<bool> {
        Ok(self.read_byte()? != 0)
    }

    /// Read a UTF-16 code unit.
    pub fn read_char(&mut self) -> Result<u16> {
        self.require(2)?;
        Ok(self.buf.get_u16())
    }

    pub fn read_short(&mut self) -> Result<i16> {
        self.require(2)?;
        Ok(self.buf.get_i16())
    }

    pub fn read_int(&mut self) -> Result<i32> {
        self.require(4)?;
        Ok(self.buf.get_i32())
    }

    pub fn read_long(&mut self) -> Result<i64> {
        self.require(8)?;
        Ok(self.buf.get_i64())
    }

    pub fn read_float(&mut self) -> Result<f32> {
        self.require(4)?;
        Ok(self.buf.get_f32())
    }

    pub fn read_double(&mut self) -> Result<f64> {
        self.require(8)?;
        Ok(self.buf.get_f64())
    }

    pub fn read_compact_int(&mut self) -> Result<i32> {
        match self.read_byte()? {
            value if is_inline_int(value) => Ok(i32::from(value)),
            INT_SHORT => Ok(i32::from(self.read_short()?)),
            _ => self.read_int(),
        }
    }

    pub fn read_compact_long(&mut self) -> Result<i64> {
        match self.read_byte()? {
            value if is_inline_long(value) => Ok(i64::from(value)),
            LONG_SHORT => Ok(i64::from(self.read_short()?)),
            LONG_INT => Ok(i64::from(self.read_int()?)),
            _ => self.read_long(),
        }
    }

    pub fn read_big_integer(&mut self) -> Result<BigInt> {
        let selector = self.read_byte()?;
        trace!(
            selector,
            kind = big_integer_selector_name(selector),
            "reading big integer"
        );
        match selector {
            BIG_SHORT => Ok(BigInt::from(self.read_short()?)),
            BIG_INT => Ok(BigInt::from(self.read_int()?)),
            BIG_LONG => Ok(BigInt::from(self.read_long()?)),
            BIG_DECIMAL => {
                let digits = self.read_length_and_bytes("BigInteger length mismatch")?;
                let digits = std::str::from_utf8(&digits)
                    .map_err(|err| MarshalError::InvalidBigInteger(err.to_string()))?;
                digits
                    .parse::<BigInt>()
                    .map_err(|err| MarshalError::InvalidBigInteger(format!("{digits:?}: {err}")))
            }
            inline => Ok(BigInt::from(inline_big_integer(inline))),
        }
    }

    /// Read a compact-int length and check it against the configured maximum.
    pub fn read_length(&mut self) -> Result<usize> {
        let len = self.read_compact_int()?;
        let len = usize::try_from(len).map_err(|_| MarshalError::NegativeLength(len))?;
        if len > self.config.max_length {
            return Err(MarshalError::LengthTooLarge {
                size: len,
                max: self.config.max_length,
            });
        }
        Ok(len)
    }

    /// Read exactly `len` raw bytes.
    ///
    /// A stream that ends early fails with [`MarshalError::LengthMismatch`]
    /// carrying `message`.
    pub fn read_bytes(&mut self, len: usize, message: &str) -> Result<Bytes> {
        self.fill(len)?;
        if self.buf.len() < len {
            return Err(MarshalError::LengthMismatch {
                message: message.to_owned(),
                expected: len,
                actual: self.buf.len(),
            });
        }
        Ok(self.buf.split_to(len).freeze())
    }

    /// Read a compact-int length followed by that many raw bytes.
    pub fn read_length_and_bytes(&mut self, message: &str) -> Result<Bytes> {
        let len = self.read_length()?;
        self.read_bytes(len, message)
    }

    /// Read up to `dst.len()` bytes, stopping early at end of stream.
    pub fn read_n_bytes(&mut self, dst: &mut [u8]) -> Result<usize> {
        self.fill(dst.len())?;
        let n = dst.len().min(self.buf.len());
        self.buf.copy_to_slice(&mut dst[..n]);
        Ok(n)
    }

    /// Read every remaining byte of the stream.
    pub fn read_all_bytes(&mut self) -> Result<Bytes> {
        self.fill(usize::MAX)?;
        Ok(self.buf.split().freeze())
    }

    /// Bytes that can be read without blocking.
    pub fn available(&self) -> Result<usize> {
        Ok(self.buf.len() + self.source.available()?)
    }

    pub fn read_string_unshared(&mut self) -> Result<String> {
        let bytes = self.read_length_and_bytes("String length mismatch")?;
        Ok(String::from_utf8(Vec::from(bytes))?)
    }

    /// Read a string written through the shared string dictionary.
    pub fn read_string_shared(&mut self) -> Result<String> {
        match self.read_byte()? {
            index if is_inline_index(index) => {
                Ok(self.strings.get(i32::from(index))?.to_owned())
            }
            STRING_INDEX => {
                let index = self.read_int()?;
                Ok(self.strings.get(index)?.to_owned())
            }
            _ => {
                let s = self.read_string_unshared()?;
                let index = self.strings.push(s.clone())?;
                trace!(index, len = s.len(), "learned shared string");
                Ok(s)
            }
        }
    }

    /// Read a value of `T` through the unmarshaller registered for it.
    pub fn read_object<T: 'static>(&mut self) -> Result<T> {
        let unmarshal = self.unmarshallers.get::<T>()?;
        trace!(type_name = type_name::<T>(), "unmarshalling object");
        unmarshal(self)
    }

    /// Read a compact-int length `n`, then `n` items into a `Vec`.
    ///
    /// The vector starts with a bounded capacity and grows as items arrive,
    /// so a corrupt length fails on the first missing item instead of
    /// reserving memory for all of them.
    pub fn read_length_and_array<T, F>(&mut self, read_item: F) -> Result<Vec<T>>
    where
        F: FnMut(&mut Self) -> Result<T>,
    {
        let max_items = MAX_ARRAY_PREALLOCATION / std::mem::size_of::<T>().max(1);
        self.read_length_and_array_with(|len| Vec::with_capacity(len.min(max_items)), read_item)
    }

    /// Read a compact-int length `n`, then `n` items into a collection built
    /// by `allocate(n)`.
    ///
    /// `n` is the declared length, checked only against
    /// [`ContextConfig::max_length`]; `allocate` should not trust it as an
    /// exact reservation.
    pub fn read_length_and_array_with<T, C, A, F>(
        &mut self,
        allocate: A,
        mut read_item: F,
    ) -> Result<C>
    where
        A: FnOnce(usize) -> C,
        C: Extend<T>,
        F: FnMut(&mut Self) -> Result<T>,
    {
        let len = self.read_length()?;
        let mut items = allocate(len);
        for _ in 0..len {
            let item = read_item(self)?;
            items.extend(std::iter::once(item));
        }
        Ok(items)
    }

    /// Number of distinct strings learned from the shared dictionary.
    pub fn shared_strings(&self) -> usize {
        self.strings.len()
    }

    /// Unmarshallers this context dispatches to.
    pub fn unmarshallers(&self) -> &ObjectUnmarshallers {
        &self.unmarshallers
    }

    /// Current context configuration.
    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    /// Close the source.
    pub fn close(mut self) -> Result<()> {
        self.release()
    }

    fn require(&mut self, wanted: usize) -> Result<()> {
        self.fill(wanted)?;
        if self.buf.len() < wanted {
            return Err(MarshalError::Io(io::Error::new(
                ErrorKind::UnexpectedEof,
                format!("stream ended after {} of {wanted} bytes", self.buf.len()),
            )));
        }
        Ok(())
    }

    /// Pull chunks from the source until `wanted` bytes are buffered or the
    /// stream ends.
    fn fill(&mut self, wanted: usize) -> Result<()> {
        while self.buf.len() < wanted {
            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.source.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(MarshalError::Io(err)),
            };

            if read == 0 {
                break;
            }

            self.buf.extend_from_slice(&chunk[..read]);
        }
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        self.closed = true;
        debug!(
            buffered = self.buf.len(),
            shared_strings = self.strings.len(),
            "closing unmarshalling context"
        );
        self.source.close()?;
        Ok(())
    }
}

impl Drop for UnmarshallingContext<'_> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(err) = self.release() {
            warn!(error = %err, "failed to close unmarshalling context on drop");
        }
    }
}
