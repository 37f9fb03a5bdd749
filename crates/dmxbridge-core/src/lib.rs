//! DMX bridge core library: serial lighting-control input to Art-Net.
//!
//! The pipeline is: a serial `source` feeds a frame synchronizer (`sync`),
//! which recovers complete 512-channel frames from either a binary
//! break-framed byte stream or delimited text lines and rejects anything
//! malformed. Accepted frames are committed to the `handoff` slot and
//! transmitted by the `dispatch` layer through a `FrameSender` (Art-Net over
//! UDP in `protocols`). The `bridge` loop owns the wiring; `counters` and
//! `diagnostics` surface what happened.
//!
//! Invariants:
//! - A frame leaving a synchronizer always has exactly 512 channels; partial
//!   or malformed input is counted as corrupted and never transmitted.
//! - The live frame is replaced wholesale under a lock held only for the
//!   copy; readers never observe a torn frame.
//! - Steady-state errors (timeouts, bad input, failed sends) never stop the
//!   bridge; only setup errors are returned to the caller.
//!
//! # Examples
//! ```no_run
//! use std::io::Cursor;
//! use std::net::Ipv4Addr;
//! use std::sync::Arc;
//! use std::sync::atomic::AtomicBool;
//!
//! use dmxbridge_core::protocols::artnet::ArtNetSender;
//! use dmxbridge_core::{
//!     Bridge, Counters, Dispatcher, IoLineSource, LineFormat, SharedFrame, Synchronizer,
//! };
//!
//! let source = IoLineSource::new(Cursor::new(b"10,20,30;\n".to_vec()), b'\n');
//! let sync = Synchronizer::text(source, LineFormat::default());
//! let sender = ArtNetSender::open(None, Ipv4Addr::new(2, 0, 2, 1))?;
//! let counters = Arc::new(Counters::new());
//! let dispatcher = Dispatcher::new(sender, 0, Arc::new(SharedFrame::new()), counters.clone());
//! let mut bridge = Bridge::new(sync, dispatcher, counters);
//! bridge.run(&AtomicBool::new(false));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

mod bridge;
mod counters;
pub mod diagnostics;
mod dispatch;
mod frame;
mod handoff;
pub mod protocols;
mod source;
pub mod sync;

pub use bridge::{Bridge, StopReason};
pub use counters::{CounterSnapshot, Counters};
pub use diagnostics::{DiagnosticsSink, TracingSink};
pub use dispatch::{Dispatcher, FrameSender, TransportError};
pub use frame::{CHANNELS, ChannelFrame};
pub use handoff::SharedFrame;
pub use source::{
    ByteSource, DEFAULT_MAX_LINE_LEN, IoByteSource, IoLineSource, LineSource, SourceError,
    TimedByte, TimedChunk,
};
pub use sync::{
    FrameRejection, IngestionMode, LineFormat, LineRejection, SyncStep, Synchronizer, parse_line,
};

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;
/// Timestamp used when the clock cannot be formatted.
pub const DEFAULT_TIMESTAMP: &str = "1970-01-01T00:00:00Z";

/// Summary of one bridge run.
///
/// # Examples
/// ```
/// use dmxbridge_core::{CounterSnapshot, IngestionMode, StopReason, make_report};
///
/// let report = make_report(
///     IngestionMode::Text,
///     3,
///     "2.0.2.1:6454",
///     "2026-01-01T00:00:00Z".to_string(),
///     StopReason::SourceExhausted,
///     CounterSnapshot::default(),
/// );
/// assert_eq!(report.report_version, dmxbridge_core::REPORT_VERSION);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    pub tool: ToolInfo,
    pub mode: IngestionMode,
    /// Art-Net port address the frames were sent to.
    pub universe: u16,
    /// Destination in `ip:port` form.
    pub target: String,
    /// RFC3339.
    pub started_at: String,
    /// RFC3339.
    pub stopped_at: String,
    pub stop_reason: StopReason,
    pub counters: CounterSnapshot,
}

/// Tool metadata embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    /// Semver of the core library.
    pub version: String,
    /// Short commit of the build, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
}

/// Build a report stamped with the current time as `stopped_at`.
pub fn make_report(
    mode: IngestionMode,
    universe: u16,
    target: &str,
    started_at: String,
    stop_reason: StopReason,
    counters: CounterSnapshot,
) -> Report {
    Report {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "dmxbridge".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            commit: None,
        },
        mode,
        universe,
        target: target.to_string(),
        started_at,
        stopped_at: now_rfc3339(),
        stop_reason,
        counters,
    }
}

/// Current UTC time as RFC3339.
pub fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| DEFAULT_TIMESTAMP.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_omits_unknown_commit() {
        let report = make_report(
            IngestionMode::Binary,
            0,
            "10.0.0.255:6454",
            DEFAULT_TIMESTAMP.to_string(),
            StopReason::ShutdownRequested,
            CounterSnapshot::default(),
        );
        let value = serde_json::to_value(&report).expect("report json");
        assert!(value["tool"].get("commit").is_none());
        assert_eq!(value["mode"], "binary");
        assert_eq!(value["stop_reason"], "shutdown_requested");
    }

    #[test]
    fn now_is_rfc3339() {
        let now = now_rfc3339();
        assert!(now.contains('T'));
        assert!(now.ends_with('Z'));
    }
}
