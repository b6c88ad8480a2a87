use std::any::type_name;
use std::io::Write;

use bytes::{BufMut, BytesMut};
use marshal_stream::Sink;
use num_bigint::BigInt;
use tracing::{debug, trace, warn};

use crate::codec::{
    encode_big_integer, encode_compact_int, encode_compact_long, encode_length,
    encode_length_and_bytes, encode_string_reference, ContextConfig,
};
use crate::dictionary::WriteDictionary;
use crate::error::{MarshalError, Result};
use crate::marker::STRING_NEW;
use crate::marshallable::Marshallable;
use crate::registry::ObjectMarshallers;

/// Writing context: marshals values into a [`Sink`].
///
/// Tokens are staged in an internal buffer and written through to the sink
/// once the buffer reaches the configured flush threshold, on [`flush`], and
/// on [`close`]. A context that is dropped without being closed flushes and
/// closes its sink on a best-effort basis.
///
/// [`flush`]: MarshallingContext::flush
/// [`close`]: MarshallingContext::close
pub struct MarshallingContext<'a> {
    sink: Box<dyn Sink + 'a>,
    buf: BytesMut,
    strings: WriteDictionary,
    marshallers: ObjectMarshallers,
    config: ContextConfig,
    flushed: u64,
    closed: bool,
}

impl<'a> MarshallingContext<'a> {
    /// Create a writing context with default configuration and no marshallers.
    pub fn new(sink: impl Sink + 'a) -> Self {
        Self::with_config(sink, ContextConfig::default())
    }

    /// Create a writing context with explicit configuration.
    pub fn with_config(sink: impl Sink + 'a, config: ContextConfig) -> Self {
        Self::with_marshallers(sink, ObjectMarshallers::new(), config)
    }

    /// Create a writing context that dispatches [`write_object`] through
    /// `marshallers`.
    ///
    /// [`write_object`]: MarshallingContext::write_object
    pub fn with_marshallers(
        sink: impl Sink + 'a,
        marshallers: ObjectMarshallers,
        config: ContextConfig,
    ) -> Self {
        Self {
            sink: Box::new(sink),
            buf: BytesMut::with_capacity(config.buffer_capacity),
            strings: WriteDictionary::new(),
            marshallers,
            config,
            flushed: 0,
            closed: false,
        }
    }

    pub fn write_byte(&mut self, value: u8) -> Result<()> {
        self.buf.put_u8(value);
        self.spill_if_full()
    }

    pub fn write_boolean(&mut self, value: bool) -> Result<()> {
        self.buf.put_u8(u8::from(value));
        self.spill_if_full()
    }

    /// Write a UTF-16 code unit.
    pub fn write_char(&mut self, value: u16) -> Result<()> {
        self.buf.put_u16(value);
        self.spill_if_full()
    }

    pub fn write_short(&mut self, value: i16) -> Result<()> {
        self.buf.put_i16(value);
        self.spill_if_full()
    }

    pub fn write_int(&mut self, value: i32) -> Result<()> {
        self.buf.put_i32(value);
        self.spill_if_full()
    }

    pub fn write_long(&mut self, value: i64) -> Result<()> {
        self.buf.put_i64(value);
        self.spill_if_full()
    }

    pub fn write_float(&mut self, value: f32) -> Result<()> {
        self.buf.put_f32(value);
        self.spill_if_full()
    }

    pub fn write_double(&mut self, value: f64) -> Result<()> {
        self.buf.put_f64(value);
        self.spill_if_full()
    }

    /// Write an int in 1, 3 or 5 bytes, favouring small non-negative values.
    pub fn write_compact_int(&mut self, value: i32) -> Result<()> {
        encode_compact_int(value, &mut self.buf);
        self.spill_if_full()
    }

    /// Write a long in 1, 3, 5 or 9 bytes, favouring small non-negative values.
    pub fn write_compact_long(&mut self, value: i64) -> Result<()> {
        encode_compact_long(value, &mut self.buf);
        self.spill_if_full()
    }

    pub fn write_big_integer(&mut self, value: &BigInt) -> Result<()> {
        encode_big_integer(value, &mut self.buf)?;
        self.spill_if_full()
    }

    /// Write a string through the shared string dictionary.
    ///
    /// The first occurrence is written in full and assigned the next index;
    /// later occurrences are written as that index.
    pub fn write_string_shared(&mut self, s: &str) -> Result<()> {
        match self.strings.index_of(s) {
            Some(index) => encode_string_reference(index, &mut self.buf),
            None => {
                let index = self.strings.insert(s)?;
                trace!(index, len = s.len(), "sharing new string");
                self.buf.put_u8(STRING_NEW);
                encode_length_and_bytes(s.as_bytes(), &mut self.buf)?;
            }
        }
        self.spill_if_full()
    }

    /// Write a string as length-prefixed UTF-8, bypassing the dictionary.
    pub fn write_string_unshared(&mut self, s: &str) -> Result<()> {
        self.write_length_and_bytes(s.as_bytes())
    }

    /// Write raw bytes with no length prefix.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.buf.put_slice(bytes);
        self.spill_if_full()
    }

    /// Write a compact-int length followed by the raw bytes.
    pub fn write_length_and_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        encode_length_and_bytes(bytes, &mut self.buf)?;
        self.spill_if_full()
    }

    /// Write a compact-int length followed by each item marshalling itself.
    pub fn write_length_and_array<M: Marshallable>(&mut self, items: &[M]) -> Result<()> {
        encode_length(items.len(), &mut self.buf)?;
        for item in items {
            item.marshal_into(self)?;
        }
        self.spill_if_full()
    }

    /// Write `value` through the marshaller registered for `T`.
    pub fn write_object<T: ?Sized + 'static>(&mut self, value: &T) -> Result<()> {
        let marshal = self.marshallers.get::<T>()?;
        trace!(type_name = type_name::<T>(), "marshalling object");
        marshal(value, self)
    }

    /// Write every buffered byte to the sink and flush it.
    pub fn flush(&mut self) -> Result<()> {
        self.write_buffered()?;
        self.sink.flush()?;
        Ok(())
    }

    /// Flush pending bytes and close the sink.
    pub fn close(mut self) -> Result<()> {
        self.release()
    }

    /// Total bytes marshalled so far, buffered or not.
    pub fn bytes_written(&self) -> u64 {
        self.flushed + self.buf.len() as u64
    }

    /// Number of distinct strings written through the shared dictionary.
    pub fn shared_strings(&self) -> usize {
        self.strings.len()
    }

    /// Marshallers this context dispatches to.
    pub fn marshallers(&self) -> &ObjectMarshallers {
        &self.marshallers
    }

    /// Current context configuration.
    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    fn spill_if_full(&mut self) -> Result<()> {
        if self.buf.len() >= self.config.flush_threshold {
            self.write_buffered()?;
        }
        Ok(())
    }

    fn write_buffered(&mut self) -> Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        trace!(len = self.buf.len(), "writing buffered bytes to sink");
        self.sink.write_all(&self.buf)?;
        self.flushed += self.buf.len() as u64;
        self.buf.clear();
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        self.closed = true;
        debug!(
            bytes = self.bytes_written(),
            shared_strings = self.strings.len(),
            "closing marshalling context"
        );
        // The sink is closed even when the flush fails; the first error wins.
        let flushed = self.flush();
        let closed = self.sink.close().map_err(MarshalError::from);
        flushed.and(closed)
    }
}

impl Drop for MarshallingContext<'_> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(err) = self.release() {
            warn!(error = %err, "failed to close marshalling context on drop");
        }
    }
}
