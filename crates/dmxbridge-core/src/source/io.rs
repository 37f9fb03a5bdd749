use std::io::{self, BufRead, BufReader, Read};
use std::time::Instant;

use super::{ByteSource, LineSource, SourceError, TimedByte, TimedChunk};

/// Longest accepted text line, terminator excluded.
///
/// 512 three-digit fields plus separators and a terminator fit in 2048
/// bytes; the rest is headroom for padding whitespace.
pub const DEFAULT_MAX_LINE_LEN: usize = 8192;

/// Byte-oriented adapter over any reader.
///
/// # Examples
/// ```
/// use std::io::Cursor;
///
/// use dmxbridge_core::{ByteSource, IoByteSource};
///
/// let mut source = IoByteSource::new(Cursor::new(vec![0x00, 0x10]));
/// assert_eq!(source.read_byte()?.value, 0x00);
/// # Ok::<(), dmxbridge_core::SourceError>(())
/// ```
pub struct IoByteSource<R> {
    inner: R,
}

impl<R: Read> IoByteSource<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<R: Read> ByteSource for IoByteSource<R> {
    fn read_byte(&mut self) -> Result<TimedByte, SourceError> {
        let mut byte = [0u8; 1];
        loop {
            match self.inner.read(&mut byte) {
                Ok(0) => return Err(SourceError::Closed),
                Ok(_) => {
                    return Ok(TimedByte {
                        value: byte[0],
                        at: Instant::now(),
                    });
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            }
        }
    }

    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<TimedChunk, SourceError> {
        loop {
            match self.inner.read(buf) {
                Ok(len) => {
                    return Ok(TimedChunk {
                        len,
                        at: Instant::now(),
                    });
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            }
        }
    }
}

/// Line-oriented adapter over any reader.
///
/// Bytes received before a timeout are kept and completed by the next call.
/// A trailing `\r` is stripped so CRLF senders work unchanged. Lines longer
/// than `max_line_len` are reported once as `SourceError::LineOverflow` and
/// the remainder up to the next terminator is dropped.
pub struct IoLineSource<R> {
    reader: BufReader<R>,
    terminator: u8,
    max_line_len: usize,
    pending: Vec<u8>,
    discarding: bool,
}

impl<R: Read> IoLineSource<R> {
    pub fn new(inner: R, terminator: u8) -> Self {
        Self::with_max_line_len(inner, terminator, DEFAULT_MAX_LINE_LEN)
    }

    pub fn with_max_line_len(inner: R, terminator: u8, max_line_len: usize) -> Self {
        Self {
            reader: BufReader::new(inner),
            terminator,
            max_line_len: max_line_len.max(1),
            pending: Vec::new(),
            discarding: false,
        }
    }

    fn take_line(&mut self) -> String {
        if self.pending.last() == Some(&self.terminator) {
            self.pending.pop();
        }
        if self.pending.last() == Some(&b'\r') {
            self.pending.pop();
        }
        let line = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        line
    }
}

impl<R: Read> LineSource for IoLineSource<R> {
    fn read_line(&mut self) -> Result<String, SourceError> {
        loop {
            let budget = (self.max_line_len + 1).saturating_sub(self.pending.len()) as u64;
            let result = (&mut self.reader)
                .take(budget)
                .read_until(self.terminator, &mut self.pending);
            match result {
                Ok(0) => {
                    if self.pending.is_empty() || self.discarding {
                        self.pending.clear();
                        return Err(SourceError::Closed);
                    }
                    return Ok(self.take_line());
                }
                Ok(_) => {
                    let complete = self.pending.last() == Some(&self.terminator);
                    if self.discarding {
                        self.pending.clear();
                        if complete {
                            self.discarding = false;
                        }
                        continue;
                    }
                    if complete {
                        return Ok(self.take_line());
                    }
                    if self.pending.len() > self.max_line_len {
                        self.pending.clear();
                        self.discarding = true;
                        return Err(SourceError::LineOverflow {
                            limit: self.max_line_len,
                        });
                    }
                    // End of data without a terminator; hand back what arrived.
                    return Ok(self.take_line());
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{IoByteSource, IoLineSource};
    use crate::source::{ByteSource, LineSource, SourceError};
    use std::collections::VecDeque;
    use std::io::{self, Cursor, Read};
    use std::time::Instant;

    /// Reader that replays a script of chunks and errors.
    struct Scripted {
        steps: VecDeque<io::Result<Vec<u8>>>,
    }

    impl Read for Scripted {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.steps.pop_front() {
                None => Ok(0),
                Some(Err(err)) => Err(err),
                Some(Ok(mut bytes)) => {
                    let n = bytes.len().min(buf.len());
                    buf[..n].copy_from_slice(&bytes[..n]);
                    if n < bytes.len() {
                        self.steps.push_front(Ok(bytes.split_off(n)));
                    }
                    Ok(n)
                }
            }
        }
    }

    #[test]
    fn byte_source_reports_closed_at_eof() {
        let mut source = IoByteSource::new(Cursor::new(vec![7u8]));
        assert_eq!(source.read_byte().unwrap().value, 7);
        assert!(matches!(source.read_byte(), Err(SourceError::Closed)));
    }

    #[test]
    fn byte_source_chunk_ends_with_empty_read() {
        let mut source = IoByteSource::new(Cursor::new(vec![1u8, 2, 3]));
        let mut buf = [0u8; 8];
        let before = Instant::now();
        let chunk = source.read_chunk(&mut buf).unwrap();
        assert_eq!(chunk.len, 3);
        assert!(chunk.at >= before);
        assert_eq!(&buf[..3], &[1, 2, 3]);
        assert_eq!(source.read_chunk(&mut buf).unwrap().len, 0);
    }

    #[test]
    fn byte_source_maps_timeout() {
        let reader = Scripted {
            steps: VecDeque::from([Err(io::Error::from(io::ErrorKind::TimedOut))]),
        };
        let mut source = IoByteSource::new(reader);
        assert!(matches!(source.read_byte(), Err(SourceError::Timeout)));
    }

    #[test]
    fn line_source_splits_and_strips_crlf() {
        let mut source = IoLineSource::new(Cursor::new(b"1,2;\r\n3;\n".to_vec()), b'\n');
        assert_eq!(source.read_line().unwrap(), "1,2;");
        assert_eq!(source.read_line().unwrap(), "3;");
        assert!(matches!(source.read_line(), Err(SourceError::Closed)));
    }

    #[test]
    fn line_source_keeps_partial_line_across_timeout() {
        let reader = Scripted {
            steps: VecDeque::from([
                Ok(b"10,2".to_vec()),
                Err(io::Error::from(io::ErrorKind::TimedOut)),
                Ok(b"0;\n".to_vec()),
            ]),
        };
        let mut source = IoLineSource::new(reader, b'\n');
        assert!(matches!(source.read_line(), Err(SourceError::Timeout)));
        assert_eq!(source.read_line().unwrap(), "10,20;");
    }

    #[test]
    fn line_source_returns_unterminated_tail_at_eof() {
        let mut source = IoLineSource::new(Cursor::new(b"5,6;".to_vec()), b'\n');
        assert_eq!(source.read_line().unwrap(), "5,6;");
        assert!(matches!(source.read_line(), Err(SourceError::Closed)));
    }

    #[test]
    fn line_source_drops_overlong_line_once() {
        let mut input = vec![b'1'; 32];
        input.extend_from_slice(b"\n7;\n");
        let mut source = IoLineSource::with_max_line_len(Cursor::new(input), b'\n', 8);
        assert!(matches!(
            source.read_line(),
            Err(SourceError::LineOverflow { limit: 8 })
        ));
        assert_eq!(source.read_line().unwrap(), "7;");
    }
}
