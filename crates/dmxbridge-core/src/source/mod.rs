//! Serial-side input abstractions.
//!
//! The bridge never opens or configures a port itself; it only consumes
//! reads. `ByteSource` serves the binary break-sync encoding and
//! `LineSource` the delimited text encoding. `io` adapts any `std::io::Read`
//! (a serial port handle, a replay file, a test cursor) to both.

mod error;
mod io;

pub use error::SourceError;
pub use io::{DEFAULT_MAX_LINE_LEN, IoByteSource, IoLineSource};

use std::time::Instant;

/// A single received byte with its host-side arrival time.
///
/// Arrival times come from the host clock after the OS has buffered the
/// data, so inter-byte gaps are best-effort and never hard real-time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedByte {
    pub value: u8,
    pub at: Instant,
}

/// Result of a chunk read: how many bytes landed and when the read returned.
///
/// The whole chunk is treated as arriving at `at`; a source cannot report
/// finer timing than its read granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedChunk {
    pub len: usize,
    pub at: Instant,
}

pub trait ByteSource {
    /// Read one byte, blocking up to the source's read timeout.
    fn read_byte(&mut self) -> Result<TimedByte, SourceError>;

    /// Read up to `buf.len()` bytes. A chunk with `len == 0` means the source
    /// has no more data and will not produce any.
    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<TimedChunk, SourceError>;
}

pub trait LineSource {
    /// Read one line without its terminator, blocking up to the source's
    /// read timeout. A partially received line survives a timeout.
    fn read_line(&mut self) -> Result<String, SourceError>;
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn read_byte(&mut self) -> Result<TimedByte, SourceError> {
        (**self).read_byte()
    }

    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<TimedChunk, SourceError> {
        (**self).read_chunk(buf)
    }
}

impl<S: LineSource + ?Sized> LineSource for Box<S> {
    fn read_line(&mut self) -> Result<String, SourceError> {
        (**self).read_line()
    }
}
