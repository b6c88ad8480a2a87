//! Compact binary marshalling with shared strings and object registries.
//!
//! A stream is a plain concatenation of self-delimiting tokens with no header
//! or framing. Readers must issue the same sequence of calls the writer
//! issued. Small values are favoured:
//! - compact ints and longs take one byte below 254 / 253;
//! - big integers in `0..=251` fold into their selector byte;
//! - shared strings are written in full once, then referenced by index.

pub mod codec;
pub mod dictionary;
pub mod error;
pub mod marker;
pub mod marshallable;
pub mod reader;
pub mod registry;
pub mod writer;

pub use codec::{
    ContextConfig, DEFAULT_BUFFER_CAPACITY, DEFAULT_FLUSH_THRESHOLD, DEFAULT_MAX_LENGTH,
    MAX_ENCODED_LENGTH,
};
pub use error::{MarshalError, Result};
pub use marshallable::{Marshallable, Unmarshallable};
pub use num_bigint::BigInt;
pub use reader::UnmarshallingContext;
pub use registry::{MarshalFn, ObjectMarshallers, ObjectUnmarshallers, UnmarshalFn};
pub use writer::MarshallingContext;
