use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Process-wide diagnostics counters. Monotonic; reset only by constructing
/// a new instance.
#[derive(Debug, Default)]
pub struct Counters {
    valid_frames: AtomicU64,
    corrupted_frames: AtomicU64,
    send_failures: AtomicU64,
    source_stalls: AtomicU64,
}

/// Point-in-time copy of `Counters`.
///
/// # Examples
/// ```
/// use dmxbridge_core::Counters;
///
/// let counters = Counters::new();
/// counters.record_valid();
/// assert_eq!(counters.snapshot().valid_frames, 1);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterSnapshot {
    pub valid_frames: u64,
    pub corrupted_frames: u64,
    pub send_failures: u64,
    pub source_stalls: u64,
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_valid(&self) {
        self.valid_frames.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_corrupted(&self) {
        self.corrupted_frames.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_send_failure(&self) {
        self.send_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_stall(&self) {
        self.source_stalls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            valid_frames: self.valid_frames.load(Ordering::Relaxed),
            corrupted_frames: self.corrupted_frames.load(Ordering::Relaxed),
            send_failures: self.send_failures.load(Ordering::Relaxed),
            source_stalls: self.source_stalls.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CounterSnapshot, Counters};

    #[test]
    fn each_counter_is_independent() {
        let counters = Counters::new();
        counters.record_valid();
        counters.record_valid();
        counters.record_corrupted();
        counters.record_send_failure();
        assert_eq!(
            counters.snapshot(),
            CounterSnapshot {
                valid_frames: 2,
                corrupted_frames: 1,
                send_failures: 1,
                source_stalls: 0,
            }
        );
    }

    #[test]
    fn snapshot_serializes_field_names() {
        let value = serde_json::to_value(CounterSnapshot::default()).expect("snapshot json");
        assert_eq!(value["valid_frames"], 0);
        assert_eq!(value["corrupted_frames"], 0);
    }
}
