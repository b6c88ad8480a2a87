//! Socket transports.
//!
//! Sockets report pending bytes through `FIONREAD` on Unix. Closing a sink
//! shuts down the write half so the peer observes end of stream; closing a
//! source shuts down the read half.

use std::io::{self, ErrorKind, Write};
use std::net::{Shutdown, TcpStream};

#[cfg(unix)]
use std::os::fd::AsRawFd;
#[cfg(unix)]
use std::os::unix::net::UnixStream;

use tracing::debug;

use crate::traits::{Sink, Source};

impl Sink for TcpStream {
    fn close(&mut self) -> io::Result<()> {
        self.flush()?;
        debug!("shutting down tcp write half");
        ignore_not_connected(self.shutdown(Shutdown::Write))
    }
}

impl Source for TcpStream {
    fn available(&self) -> io::Result<usize> {
        pending_bytes(self)
    }

    fn close(&mut self) -> io::Result<()> {
        ignore_not_connected(self.shutdown(Shutdown::Read))
    }
}

#[cfg(unix)]
impl Sink for UnixStream {
    fn close(&mut self) -> io::Result<()> {
        self.flush()?;
        debug!("shutting down unix socket write half");
        ignore_not_connected(self.shutdown(Shutdown::Write))
    }
}

#[cfg(unix)]
impl Source for UnixStream {
    fn available(&self) -> io::Result<usize> {
        pending_bytes(self)
    }

    fn close(&mut self) -> io::Result<()> {
        ignore_not_connected(self.shutdown(Shutdown::Read))
    }
}

fn ignore_not_connected(result: io::Result<()>) -> io::Result<()> {
    match result {
        Err(err) if err.kind() == ErrorKind::NotConnected => Ok(()),
        other => other,
    }
}

/// Bytes queued in the socket receive buffer.
#[cfg(unix)]
fn pending_bytes(socket: &impl AsRawFd) -> io::Result<usize> {
    let mut pending: libc::c_int = 0;

    // SAFETY: `pending` is a valid writable `c_int`, which is what FIONREAD
    // stores into, and the descriptor is an open socket borrowed for the call.
    let rc = unsafe {
        libc::ioctl(
            socket.as_raw_fd(),
            libc::FIONREAD,
            &mut pending as *mut libc::c_int,
        )
    };

    if rc < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(usize::try_from(pending).unwrap_or(0))
}

#[cfg(not(unix))]
fn pending_bytes(_socket: &TcpStream) -> io::Result<usize> {
    Ok(0)
}
