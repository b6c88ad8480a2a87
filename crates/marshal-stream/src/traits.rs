use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Cursor, Read, Seek, Write};

use bytes::buf::{Reader, Writer};
use bytes::{Buf, Bytes, BytesMut};

/// A destination for marshalled bytes.
///
/// Bytes are accepted through [`Write`]. `close` releases the transport; the
/// default implementation only flushes, which is all that in-memory and
/// buffered sinks need.
pub trait Sink: Write {
    /// Flush pending bytes and release the transport.
    fn close(&mut self) -> io::Result<()> {
        self.flush()
    }
}

/// A source of marshalled bytes.
///
/// Bytes are yielded on demand through [`Read`]. Reads may block until the
/// transport delivers data.
pub trait Source: Read {
    /// Number of bytes that can be read without blocking.
    ///
    /// Sources that cannot tell report `Ok(0)`.
    fn available(&self) -> io::Result<usize>;

    /// Release the transport.
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Sink for Vec<u8> {}

impl Sink for Cursor<Vec<u8>> {}

impl Sink for Cursor<&mut Vec<u8>> {}

impl Sink for Cursor<&mut [u8]> {}

impl Sink for Writer<BytesMut> {}

impl Sink for File {}

impl Sink for io::Stdout {}

impl Sink for io::Stderr {}

impl Sink for io::Sink {}

impl<W: Write> Sink for BufWriter<W> {}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

impl Source for &[u8] {
    fn available(&self) -> io::Result<usize> {
        Ok(self.len())
    }
}

impl<T: AsRef<[u8]>> Source for Cursor<T> {
    fn available(&self) -> io::Result<usize> {
        let len = self.get_ref().as_ref().len();
        let position = usize::try_from(self.position()).unwrap_or(usize::MAX);
        Ok(len.saturating_sub(position))
    }
}

impl Source for Reader<Bytes> {
    fn available(&self) -> io::Result<usize> {
        Ok(self.get_ref().remaining())
    }
}

impl Source for VecDeque<u8> {
    fn available(&self) -> io::Result<usize> {
        Ok(self.len())
    }
}

impl Source for File {
    fn available(&self) -> io::Result<usize> {
        let len = self.metadata()?.len();
        let mut handle: &File = self;
        let position = handle.stream_position()?;
        Ok(usize::try_from(len.saturating_sub(position)).unwrap_or(usize::MAX))
    }
}

impl<R: Read> Source for BufReader<R> {
    fn available(&self) -> io::Result<usize> {
        Ok(self.buffer().len())
    }
}

impl Source for io::Empty {
    fn available(&self) -> io::Result<usize> {
        Ok(0)
    }
}

impl<S: Source + ?Sized> Source for &mut S {
    fn available(&self) -> io::Result<usize> {
        (**self).available()
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

impl<S: Source + ?Sized> Source for Box<S> {
    fn available(&self) -> io::Result<usize> {
        (**self).available()
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}
