use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    /// No data arrived within the read timeout. Expected while the line is idle.
    #[error("read timed out")]
    Timeout,
    /// The source reached end of data and will not produce more.
    #[error("source closed")]
    Closed,
    #[error("line exceeds {limit} bytes")]
    LineOverflow { limit: usize },
    #[error("I/O error: {0}")]
    Io(io::Error),
}

impl SourceError {
    /// Transient conditions are tolerated indefinitely by the synchronizers.
    pub fn is_timeout(&self) -> bool {
        matches!(self, SourceError::Timeout)
    }
}

impl From<io::Error> for SourceError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => SourceError::Timeout,
            io::ErrorKind::UnexpectedEof | io::ErrorKind::BrokenPipe => SourceError::Closed,
            _ => SourceError::Io(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SourceError;
    use std::io;

    #[test]
    fn timed_out_maps_to_timeout() {
        let err = SourceError::from(io::Error::from(io::ErrorKind::TimedOut));
        assert!(err.is_timeout());
    }

    #[test]
    fn eof_maps_to_closed() {
        let err = SourceError::from(io::Error::from(io::ErrorKind::UnexpectedEof));
        assert!(matches!(err, SourceError::Closed));
    }

    #[test]
    fn other_kinds_stay_io() {
        let err = SourceError::from(io::Error::other("framing error"));
        assert!(matches!(err, SourceError::Io(_)));
        assert!(err.to_string().contains("framing error"));
    }
}
