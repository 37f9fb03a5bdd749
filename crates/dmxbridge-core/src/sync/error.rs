use thiserror::Error;

use super::text::LineRejection;

/// Why an input unit was not committed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameRejection {
    #[error("short binary frame: {received} of 512 bytes before read failure")]
    ShortFrame { received: usize },
    #[error("line rejected: {0}")]
    Line(#[from] LineRejection),
    #[error("line exceeds {limit} bytes")]
    LineOverflow { limit: usize },
}
