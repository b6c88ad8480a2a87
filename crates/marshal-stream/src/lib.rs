//! Byte sink and source abstractions for the marshal codec.
//!
//! The codec never opens a transport itself. Writing contexts push bytes into
//! a [`Sink`], reading contexts pull bytes out of a [`Source`]:
//! - a sink accepts bytes, flushes and closes;
//! - a source yields bytes on demand and reports how many bytes are ready
//!   without blocking.
//!
//! Implementations are provided for in-memory buffers, files, standard
//! streams, TCP and Unix domain sockets. Arbitrary `Read`/`Write` types can be
//! plugged in through [`ReadSource`] and [`WriteSink`].

pub mod adapter;
pub mod net;
pub mod traits;

pub use adapter::{ReadSource, WriteSink};
pub use traits::{Sink, Source};
