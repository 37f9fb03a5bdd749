//! Text line strategy.
//!
//! Each line carries up to 512 comma-separated decimal levels closed by a
//! field terminator, e.g. `10,20,30;`. Lines are validated as a whole: a
//! candidate frame is built from an all-zero scratch and only returned when
//! every field parsed, so a rejected line has no effect downstream.
//!
//! Byte positions and limits live in `layout`, validation in `parser`,
//! rejection reasons in `error`.

pub mod error;
pub mod layout;
pub mod parser;

pub use error::LineRejection;
pub use parser::{LineFormat, ParsedLine, parse_line};

use crate::source::{LineSource, SourceError};

use super::error::FrameRejection;
use super::transient::TransientTracker;
use super::SyncStep;

pub struct LineSync<S> {
    source: S,
    format: LineFormat,
    transient: TransientTracker,
}

impl<S: LineSource> LineSync<S> {
    pub fn new(source: S, format: LineFormat) -> Self {
        Self {
            source,
            format,
            transient: TransientTracker::default(),
        }
    }

    pub fn format(&self) -> &LineFormat {
        &self.format
    }

    pub fn step(&mut self) -> SyncStep {
        let line = match self.source.read_line() {
            Ok(line) => line,
            Err(SourceError::Closed) => return SyncStep::Exhausted,
            Err(SourceError::LineOverflow { limit }) => {
                self.transient.clear();
                return SyncStep::Rejected(FrameRejection::LineOverflow { limit });
            }
            Err(err) => {
                return match self.transient.record(&err) {
                    Some(stall) => SyncStep::Stalled(stall),
                    None => SyncStep::Idle,
                };
            }
        };
        self.transient.clear();

        match parse_line(&line, &self.format) {
            Ok(parsed) => {
                tracing::trace!(fields = parsed.fields, "line accepted");
                SyncStep::Frame(parsed.frame)
            }
            Err(reason) => SyncStep::Rejected(reason.into()),
        }
    }
}
