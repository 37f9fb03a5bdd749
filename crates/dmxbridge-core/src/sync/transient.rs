use crate::source::SourceError;

/// Consecutive read timeouts before a stall is surfaced.
pub const TIMEOUT_WARN_THRESHOLD: u32 = 100;
/// Consecutive read errors before a stall is surfaced.
pub const ERROR_WARN_THRESHOLD: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StallKind {
    Timeouts,
    Errors,
}

/// A run of consecutive transient read failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stall {
    pub kind: StallKind,
    pub consecutive: u32,
    pub last_error: Option<String>,
}

/// Counts consecutive transient failures and reports each full run once.
#[derive(Debug, Default)]
pub(crate) struct TransientTracker {
    timeouts: u32,
    errors: u32,
}

impl TransientTracker {
    pub(crate) fn record(&mut self, err: &SourceError) -> Option<Stall> {
        if err.is_timeout() {
            self.timeouts += 1;
            if self.timeouts >= TIMEOUT_WARN_THRESHOLD {
                self.timeouts = 0;
                return Some(Stall {
                    kind: StallKind::Timeouts,
                    consecutive: TIMEOUT_WARN_THRESHOLD,
                    last_error: None,
                });
            }
            return None;
        }
        self.errors += 1;
        if self.errors >= ERROR_WARN_THRESHOLD {
            self.errors = 0;
            return Some(Stall {
                kind: StallKind::Errors,
                consecutive: ERROR_WARN_THRESHOLD,
                last_error: Some(err.to_string()),
            });
        }
        None
    }

    pub(crate) fn clear(&mut self) {
        self.timeouts = 0;
        self.errors = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::{StallKind, TIMEOUT_WARN_THRESHOLD, TransientTracker};
    use crate::source::SourceError;
    use std::io;

    #[test]
    fn timeouts_surface_once_per_run() {
        let mut tracker = TransientTracker::default();
        let mut stalls = Vec::new();
        for _ in 0..(TIMEOUT_WARN_THRESHOLD * 2 + 5) {
            if let Some(stall) = tracker.record(&SourceError::Timeout) {
                stalls.push(stall);
            }
        }
        assert_eq!(stalls.len(), 2);
        assert!(stalls.iter().all(|s| s.kind == StallKind::Timeouts));
    }

    #[test]
    fn errors_surface_after_ten_with_message() {
        let mut tracker = TransientTracker::default();
        let mut last = None;
        for _ in 0..10 {
            last = tracker.record(&SourceError::Io(io::Error::other("parity")));
        }
        let stall = last.expect("stall after ten errors");
        assert_eq!(stall.kind, StallKind::Errors);
        assert!(stall.last_error.unwrap().contains("parity"));
    }

    #[test]
    fn clear_restarts_the_run() {
        let mut tracker = TransientTracker::default();
        for _ in 0..(TIMEOUT_WARN_THRESHOLD - 1) {
            assert!(tracker.record(&SourceError::Timeout).is_none());
        }
        tracker.clear();
        assert!(tracker.record(&SourceError::Timeout).is_none());
    }
}
