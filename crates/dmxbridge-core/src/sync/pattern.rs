//! Test-pattern source: random levels at a fixed cadence, no serial input.

use std::thread;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::frame::ChannelFrame;

use super::SyncStep;

/// Roughly the refresh period of a full 512-slot DMX universe.
pub const DEFAULT_PATTERN_INTERVAL: Duration = Duration::from_millis(22);

pub struct RandomFrames {
    rng: StdRng,
    interval: Duration,
    next_at: Option<Instant>,
}

impl RandomFrames {
    pub fn new(interval: Duration) -> Self {
        Self::with_rng(StdRng::from_os_rng(), interval)
    }

    /// Reproducible sequence, for tests and demos.
    pub fn seeded(seed: u64, interval: Duration) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), interval)
    }

    fn with_rng(rng: StdRng, interval: Duration) -> Self {
        Self {
            rng,
            interval,
            next_at: None,
        }
    }

    /// Sleeps until the next frame is due, then yields it.
    pub fn step(&mut self) -> SyncStep {
        if let Some(due) = self.next_at {
            let now = Instant::now();
            if due > now {
                thread::sleep(due - now);
            }
        }
        self.next_at = Some(Instant::now() + self.interval);

        let mut frame = ChannelFrame::blackout();
        self.rng.fill_bytes(frame.as_mut_slice());
        SyncStep::Frame(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::RandomFrames;
    use crate::sync::SyncStep;
    use std::time::{Duration, Instant};

    fn frame(step: SyncStep) -> crate::ChannelFrame {
        match step {
            SyncStep::Frame(frame) => frame,
            other => panic!("expected frame, got {other:?}"),
        }
    }

    #[test]
    fn seeded_sequences_repeat() {
        let mut a = RandomFrames::seeded(7, Duration::ZERO);
        let mut b = RandomFrames::seeded(7, Duration::ZERO);
        assert_eq!(frame(a.step()), frame(b.step()));
    }

    #[test]
    fn paces_frames_by_interval() {
        let mut pattern = RandomFrames::seeded(1, Duration::from_millis(5));
        let started = Instant::now();
        pattern.step();
        pattern.step();
        pattern.step();
        assert!(started.elapsed() >= Duration::from_millis(10));
    }
}
