//! The ingestion loop: synchronizer -> handoff -> dispatcher.
//!
//! Dispatch runs inline after each accepted frame, on the ingestion thread,
//! so source-to-network latency is one parse plus one send. Every
//! steady-state error is handled here; nothing returned from `step` is
//! fatal.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::counters::Counters;
use crate::diagnostics::{DiagnosticsSink, NullSink};
use crate::dispatch::{Dispatcher, FrameSender};
use crate::sync::{SyncStep, Synchronizer};

/// Why `Bridge::run` returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    SourceExhausted,
    ShutdownRequested,
}

pub struct Bridge<S> {
    sync: Synchronizer,
    dispatcher: Dispatcher<S>,
    counters: Arc<Counters>,
    sink: Arc<dyn DiagnosticsSink>,
    stats_interval: Option<Duration>,
}

impl<S: FrameSender> Bridge<S> {
    pub fn new(sync: Synchronizer, dispatcher: Dispatcher<S>, counters: Arc<Counters>) -> Self {
        Self {
            sync,
            dispatcher,
            counters,
            sink: Arc::new(NullSink),
            stats_interval: None,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticsSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Log a counter summary at most once per `interval`.
    pub fn with_stats_interval(mut self, interval: Duration) -> Self {
        self.stats_interval = Some(interval).filter(|interval| !interval.is_zero());
        self
    }

    pub fn counters(&self) -> &Arc<Counters> {
        &self.counters
    }

    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher<S> {
        &mut self.dispatcher
    }

    /// Advance the synchronizer once and act on the outcome.
    ///
    /// Returns `false` once the source is exhausted.
    pub fn step(&mut self) -> bool {
        match self.sync.step() {
            SyncStep::Frame(frame) => {
                if let Err(err) = self.dispatcher.publish(&frame) {
                    self.sink.send_failed(&err);
                }
            }
            SyncStep::Rejected(reason) => {
                self.counters.record_corrupted();
                self.sink.frame_rejected(&reason);
            }
            SyncStep::Stalled(stall) => {
                self.counters.record_stall();
                self.sink.source_stalled(&stall);
            }
            SyncStep::Idle => {}
            SyncStep::Exhausted => return false,
        }
        true
    }

    /// Step until the source is exhausted or `shutdown` is set.
    ///
    /// `shutdown` is checked before every step; a read in progress when it
    /// is set completes (bounded by the source timeout) and any partial
    /// frame is dropped with the synchronizer.
    pub fn run(&mut self, shutdown: &AtomicBool) -> StopReason {
        tracing::info!(
            mode = %self.sync.mode(),
            universe = self.dispatcher.universe(),
            "bridge running"
        );
        let mut last_stats = Instant::now();
        let reason = loop {
            if shutdown.load(Ordering::SeqCst) {
                break StopReason::ShutdownRequested;
            }
            if !self.step() {
                break StopReason::SourceExhausted;
            }
            if let Some(interval) = self.stats_interval {
                if last_stats.elapsed() >= interval {
                    self.log_stats();
                    last_stats = Instant::now();
                }
            }
        };
        self.log_stats();
        tracing::info!(?reason, "bridge stopped");
        reason
    }

    fn log_stats(&self) {
        let snapshot = self.counters.snapshot();
        tracing::info!(
            valid = snapshot.valid_frames,
            corrupted = snapshot.corrupted_frames,
            send_failures = snapshot.send_failures,
            stalls = snapshot.source_stalls,
            "frame counters"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::{Bridge, StopReason};
    use crate::counters::Counters;
    use crate::dispatch::{Dispatcher, FrameSender, TransportError};
    use crate::frame::ChannelFrame;
    use crate::handoff::SharedFrame;
    use crate::source::IoLineSource;
    use crate::sync::{LineFormat, Synchronizer};
    use std::io::Cursor;
    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;

    struct Count(usize);

    impl FrameSender for Count {
        fn send(&mut self, _universe: u16, _frame: &ChannelFrame) -> Result<(), TransportError> {
            self.0 += 1;
            Ok(())
        }
    }

    fn bridge(input: &str) -> Bridge<Count> {
        let counters = Arc::new(Counters::new());
        let sync = Synchronizer::text(
            IoLineSource::new(Cursor::new(input.as_bytes().to_vec()), b'\n'),
            LineFormat::default(),
        );
        let dispatcher = Dispatcher::new(Count(0), 0, Arc::new(SharedFrame::new()), counters.clone());
        Bridge::new(sync, dispatcher, counters)
    }

    #[test]
    fn runs_until_source_exhausted() {
        let mut bridge = bridge("1;\nbad\n2;\n");
        let reason = bridge.run(&AtomicBool::new(false));
        assert_eq!(reason, StopReason::SourceExhausted);
        let snapshot = bridge.counters().snapshot();
        assert_eq!(snapshot.valid_frames, 2);
        assert_eq!(snapshot.corrupted_frames, 1);
        assert_eq!(bridge.dispatcher_mut().sender().0, 2);
    }

    #[test]
    fn shutdown_flag_stops_before_reading() {
        let mut bridge = bridge("1;\n");
        let reason = bridge.run(&AtomicBool::new(true));
        assert_eq!(reason, StopReason::ShutdownRequested);
        assert_eq!(bridge.counters().snapshot().valid_frames, 0);
    }
}
