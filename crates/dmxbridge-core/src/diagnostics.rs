//! Diagnostics sink: where rejection reasons and failures are reported.
//!
//! Implementations must return promptly; the ingestion loop calls them
//! inline.

use crate::dispatch::TransportError;
use crate::sync::{FrameRejection, Stall, StallKind};

pub trait DiagnosticsSink: Send + Sync {
    fn frame_rejected(&self, _reason: &FrameRejection) {}

    fn send_failed(&self, _err: &TransportError) {}

    fn source_stalled(&self, _stall: &Stall) {}
}

/// Reports through `tracing`. Rejections are per-line noise on a bad link,
/// so they log at debug; failures and stalls log at warn.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn frame_rejected(&self, reason: &FrameRejection) {
        tracing::debug!(%reason, "input rejected");
    }

    fn send_failed(&self, err: &TransportError) {
        tracing::warn!(error = %err, "frame transmission failed");
    }

    fn source_stalled(&self, stall: &Stall) {
        match stall.kind {
            StallKind::Timeouts => tracing::warn!(
                consecutive = stall.consecutive,
                "waiting for serial signal"
            ),
            StallKind::Errors => tracing::warn!(
                consecutive = stall.consecutive,
                last_error = stall.last_error.as_deref().unwrap_or("unknown"),
                "serial read keeps failing"
            ),
        }
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticsSink for NullSink {}
