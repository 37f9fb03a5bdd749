//! Frame synchronizers.
//!
//! Each strategy turns an unreliable serial stream into complete
//! `ChannelFrame`s, one `step` at a time, so the caller can check for
//! shutdown between reads. Strategies are picked once at startup through
//! the `Synchronizer` tagged variant; they share no state.
//!
//! A step yields at most one of: a complete frame, a rejection (malformed
//! input unit, to be counted as corrupted), a stall notice (a run of
//! consecutive transient failures crossed its threshold), idle, or the end
//! of the source. Partial frames never leave a synchronizer.

pub mod binary;
pub mod error;
pub mod pattern;
pub mod text;
mod transient;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::frame::ChannelFrame;
use crate::source::{ByteSource, LineSource};

pub use binary::{BinarySync, DEFAULT_BREAK_GAP, START_MARKER, SyncState};
pub use error::FrameRejection;
pub use pattern::{DEFAULT_PATTERN_INTERVAL, RandomFrames};
pub use text::{LineFormat, LineRejection, LineSync, ParsedLine, parse_line};
pub use transient::{ERROR_WARN_THRESHOLD, Stall, StallKind, TIMEOUT_WARN_THRESHOLD};

/// Outcome of one synchronizer step.
#[derive(Debug)]
pub enum SyncStep {
    Frame(ChannelFrame),
    Rejected(FrameRejection),
    Stalled(Stall),
    Idle,
    Exhausted,
}

/// Ingestion strategy selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestionMode {
    /// Raw bytes framed by a start marker after an idle gap.
    Binary,
    /// Comma-separated decimal levels, one frame per line.
    Text,
    /// Random levels at a fixed cadence, no serial input.
    Random,
}

impl IngestionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            IngestionMode::Binary => "binary",
            IngestionMode::Text => "text",
            IngestionMode::Random => "random",
        }
    }
}

impl fmt::Display for IngestionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IngestionMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "binary" => Ok(IngestionMode::Binary),
            "text" => Ok(IngestionMode::Text),
            "random" => Ok(IngestionMode::Random),
            other => Err(format!(
                "unknown mode '{other}' (expected binary, text or random)"
            )),
        }
    }
}

pub type BoxedByteSource = Box<dyn ByteSource + Send>;
pub type BoxedLineSource = Box<dyn LineSource + Send>;

pub enum Synchronizer {
    Binary(BinarySync<BoxedByteSource>),
    Text(LineSync<BoxedLineSource>),
    Pattern(RandomFrames),
}

impl Synchronizer {
    pub fn binary(source: impl ByteSource + Send + 'static) -> Self {
        Synchronizer::Binary(BinarySync::new(Box::new(source)))
    }

    pub fn binary_with_break_gap(
        source: impl ByteSource + Send + 'static,
        break_gap: Duration,
    ) -> Self {
        Synchronizer::Binary(BinarySync::with_break_gap(Box::new(source), break_gap))
    }

    pub fn random(interval: Duration) -> Self {
        Synchronizer::Pattern(RandomFrames::new(interval))
    }

    pub fn text(source: impl LineSource + Send + 'static, format: LineFormat) -> Self {
        Synchronizer::Text(LineSync::new(Box::new(source), format))
    }

    pub fn mode(&self) -> IngestionMode {
        match self {
            Synchronizer::Binary(_) => IngestionMode::Binary,
            Synchronizer::Text(_) => IngestionMode::Text,
            Synchronizer::Pattern(_) => IngestionMode::Random,
        }
    }

    pub fn step(&mut self) -> SyncStep {
        match self {
            Synchronizer::Binary(sync) => sync.step(),
            Synchronizer::Text(sync) => sync.step(),
            Synchronizer::Pattern(sync) => sync.step(),
        }
    }

    /// Accepted frames only, until the source is exhausted.
    pub fn frames(&mut self) -> Frames<'_> {
        Frames { sync: self }
    }
}

pub struct Frames<'a> {
    sync: &'a mut Synchronizer,
}

impl Iterator for Frames<'_> {
    type Item = ChannelFrame;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.sync.step() {
                SyncStep::Frame(frame) => return Some(frame),
                SyncStep::Exhausted => return None,
                SyncStep::Rejected(_) | SyncStep::Stalled(_) | SyncStep::Idle => {}
            }
        }
    }
}
