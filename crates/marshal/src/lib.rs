//! Compact, deterministic binary marshalling.
//!
//! Values are written into a [`MarshallingContext`] and read back, in the
//! same order, from an [`UnmarshallingContext`]. Primitives are fixed-width
//! big-endian; ints, longs, big integers and strings use variable-length
//! encodings that keep common values to a single byte.
//!
//! # Crate Structure
//!
//! - [`stream`]: byte sinks and sources (buffers, files, sockets)
//! - [`codec`]: writing and reading contexts, object registries and errors
//!
//! # Example
//!
//! ```
//! use marshal::{MarshallingContext, UnmarshallingContext};
//!
//! let mut wire = Vec::new();
//! let mut writer = MarshallingContext::new(&mut wire);
//! writer.write_string_shared("hello")?;
//! writer.write_compact_int(30006)?;
//! writer.close()?;
//!
//! let mut reader = UnmarshallingContext::new(wire.as_slice());
//! assert_eq!(reader.read_string_shared()?, "hello");
//! assert_eq!(reader.read_compact_int()?, 30006);
//! # Ok::<(), marshal::MarshalError>(())
//! ```

/// Re-export stream types.
pub mod stream {
    pub use marshal_stream::*;
}

/// Re-export codec types.
pub mod codec {
    pub use marshal_codec::*;
}

pub use marshal_codec::{
    BigInt, ContextConfig, MarshalError, Marshallable, MarshallingContext, ObjectMarshallers,
    ObjectUnmarshallers, Result, Unmarshallable, UnmarshallingContext,
};
pub use marshal_stream::{Sink, Source};
