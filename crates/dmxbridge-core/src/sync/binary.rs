//! Binary break-sync strategy.
//!
//! A frame starts with the start marker byte received while waiting for
//! sync, followed by exactly 512 channel bytes. An inter-byte silence longer
//! than the break gap (a line break condition or a device reset upstream)
//! drops the synchronizer back to waiting; a break in the middle of a frame
//! abandons the partial frame. Gaps are measured on host arrival times, so the threshold is a tunable to be checked against the
//! link speed, not a hard timing contract.

use std::time::{Duration, Instant};

use crate::frame::{CHANNELS, ChannelFrame};
use crate::source::{ByteSource, SourceError};

use super::error::FrameRejection;
use super::transient::TransientTracker;
use super::SyncStep;

/// Reserved byte that opens a frame payload.
pub const START_MARKER: u8 = 0x00;
/// Inter-byte silence treated as loss of framing.
pub const DEFAULT_BREAK_GAP: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    WaitingForStartMarker,
    Collecting { filled: usize },
}

pub struct BinarySync<S> {
    source: S,
    break_gap: Duration,
    state: SyncState,
    last_byte_at: Option<Instant>,
    scratch: ChannelFrame,
    transient: TransientTracker,
}

impl<S: ByteSource> BinarySync<S> {
    pub fn new(source: S) -> Self {
        Self::with_break_gap(source, DEFAULT_BREAK_GAP)
    }

    pub fn with_break_gap(source: S, break_gap: Duration) -> Self {
        Self {
            source,
            break_gap,
            state: SyncState::WaitingForStartMarker,
            last_byte_at: None,
            scratch: ChannelFrame::blackout(),
            transient: TransientTracker::default(),
        }
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn break_gap(&self) -> Duration {
        self.break_gap
    }

    pub fn step(&mut self) -> SyncStep {
        match self.state {
            SyncState::WaitingForStartMarker => self.await_marker(),
            SyncState::Collecting { filled } => self.collect(filled),
        }
    }

    fn await_marker(&mut self) -> SyncStep {
        let byte = match self.source.read_byte() {
            Ok(byte) => byte,
            Err(SourceError::Closed) => return SyncStep::Exhausted,
            Err(err) => {
                self.lose_sync();
                return match self.transient.record(&err) {
                    Some(stall) => SyncStep::Stalled(stall),
                    None => SyncStep::Idle,
                };
            }
        };
        self.transient.clear();
        // Already waiting, so a break here only resets the gap clock.
        self.note_arrival(byte.at);

        if byte.value == START_MARKER {
            self.state = SyncState::Collecting { filled: 0 };
        }
        SyncStep::Idle
    }

    fn collect(&mut self, filled: usize) -> SyncStep {
        let result = self
            .source
            .read_chunk(&mut self.scratch.as_mut_slice()[filled..]);
        let chunk = match result {
            Ok(chunk) if chunk.len > 0 => chunk,
            _ => {
                tracing::trace!(received = filled, "abandoning partial binary frame");
                self.lose_sync();
                return SyncStep::Rejected(FrameRejection::ShortFrame { received: filled });
            }
        };
        self.transient.clear();

        if self.note_arrival(chunk.at) {
            tracing::trace!(received = filled, "break inside binary frame");
            self.resync_within(filled, chunk.len);
            return SyncStep::Rejected(FrameRejection::ShortFrame { received: filled });
        }

        let filled = filled + chunk.len;
        if filled < CHANNELS {
            self.state = SyncState::Collecting { filled };
            return SyncStep::Idle;
        }
        let frame = std::mem::take(&mut self.scratch);
        self.state = SyncState::WaitingForStartMarker;
        SyncStep::Frame(frame)
    }

    /// Record an arrival and report whether it followed a break.
    fn note_arrival(&mut self, at: Instant) -> bool {
        let gap = self.last_byte_at.map(|last| at.saturating_duration_since(last));
        self.last_byte_at = Some(at);
        match gap {
            Some(gap) if gap > self.break_gap => {
                tracing::trace!(gap_us = gap.as_micros() as u64, "break detected");
                true
            }
            _ => false,
        }
    }

    /// Bytes `start..start + len` of the scratch frame arrived after a break.
    /// They are scanned like any bytes received while waiting: everything up
    /// to and including a start marker is dropped, the rest opens a new frame.
    fn resync_within(&mut self, start: usize, len: usize) {
        let slots = self.scratch.as_mut_slice();
        let arrived = start..start + len;
        match slots[arrived].iter().position(|&value| value == START_MARKER) {
            Some(pos) => {
                let payload = start + pos + 1..start + len;
                let kept = payload.len();
                slots.copy_within(payload, 0);
                slots[kept..].fill(0);
                self.state = SyncState::Collecting { filled: kept };
            }
            None => {
                self.scratch = ChannelFrame::blackout();
                self.state = SyncState::WaitingForStartMarker;
            }
        }
    }

    fn lose_sync(&mut self) {
        self.state = SyncState::WaitingForStartMarker;
        self.scratch = ChannelFrame::blackout();
    }
}

#[cfg(test)]
mod tests {
    use super::{BinarySync, START_MARKER, SyncState};
    use crate::frame::CHANNELS;
    use crate::source::{ByteSource, SourceError, TimedByte, TimedChunk};
    use crate::sync::{FrameRejection, SyncStep};
    use std::collections::VecDeque;
    use std::time::{Duration, Instant};

    enum Event {
        Byte(u8, Duration),
        Chunk(Vec<u8>, Duration),
        Timeout,
    }

    /// Byte source replaying events with arrival offsets from a fixed origin.
    struct Script {
        origin: Instant,
        events: VecDeque<Event>,
    }

    impl Script {
        fn new(events: Vec<Event>) -> Self {
            Self {
                origin: Instant::now(),
                events: events.into(),
            }
        }
    }

    impl ByteSource for Script {
        fn read_byte(&mut self) -> Result<TimedByte, SourceError> {
            match self.events.pop_front() {
                Some(Event::Byte(value, offset)) => Ok(TimedByte {
                    value,
                    at: self.origin + offset,
                }),
                Some(Event::Chunk(mut bytes, offset)) => {
                    let rest = bytes.split_off(1);
                    if !rest.is_empty() {
                        self.events.push_front(Event::Chunk(rest, offset));
                    }
                    Ok(TimedByte {
                        value: bytes[0],
                        at: self.origin + offset,
                    })
                }
                Some(Event::Timeout) => Err(SourceError::Timeout),
                None => Err(SourceError::Closed),
            }
        }

        fn read_chunk(&mut self, buf: &mut [u8]) -> Result<TimedChunk, SourceError> {
            match self.events.pop_front() {
                Some(Event::Chunk(mut bytes, offset)) => {
                    let len = bytes.len().min(buf.len());
                    buf[..len].copy_from_slice(&bytes[..len]);
                    if len < bytes.len() {
                        self.events
                            .push_front(Event::Chunk(bytes.split_off(len), offset));
                    }
                    Ok(TimedChunk {
                        len,
                        at: self.origin + offset,
                    })
                }
                Some(Event::Timeout) => Err(SourceError::Timeout),
                Some(Event::Byte(..)) => panic!("byte read expected"),
                None => Ok(TimedChunk {
                    len: 0,
                    at: self.origin,
                }),
            }
        }
    }

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn us(value: u64) -> Duration {
        Duration::from_micros(value)
    }

    fn count_frames(sync: &mut BinarySync<Script>) -> usize {
        let mut frames = 0;
        loop {
            match sync.step() {
                SyncStep::Frame(_) => frames += 1,
                SyncStep::Exhausted => return frames,
                _ => {}
            }
        }
    }

    #[test]
    fn discards_bytes_until_start_marker() {
        let mut sync = BinarySync::new(Script::new(vec![
            Event::Byte(0x55, ms(0)),
            Event::Byte(0x66, ms(0)),
            Event::Byte(START_MARKER, ms(0)),
        ]));
        assert!(matches!(sync.step(), SyncStep::Idle));
        assert_eq!(sync.state(), SyncState::WaitingForStartMarker);
        sync.step();
        sync.step();
        assert_eq!(sync.state(), SyncState::Collecting { filled: 0 });
    }

    #[test]
    fn collects_across_short_reads() {
        let mut sync = BinarySync::new(Script::new(vec![
            Event::Byte(START_MARKER, ms(0)),
            Event::Chunk(vec![1; 100], us(100)),
            Event::Chunk(vec![2; CHANNELS - 100], us(200)),
        ]));
        sync.step();
        assert!(matches!(sync.step(), SyncStep::Idle));
        assert_eq!(sync.state(), SyncState::Collecting { filled: 100 });
        let SyncStep::Frame(frame) = sync.step() else {
            panic!("expected a frame");
        };
        assert_eq!(frame.get(99), Some(1));
        assert_eq!(frame.get(100), Some(2));
        assert_eq!(sync.state(), SyncState::WaitingForStartMarker);
    }

    #[test]
    fn timeout_mid_frame_discards_partial() {
        let mut sync = BinarySync::new(Script::new(vec![
            Event::Byte(START_MARKER, ms(0)),
            Event::Chunk(vec![9; 400], us(100)),
            Event::Timeout,
        ]));
        sync.step();
        sync.step();
        let step = sync.step();
        assert!(matches!(
            step,
            SyncStep::Rejected(FrameRejection::ShortFrame { received: 400 })
        ));
        assert_eq!(sync.state(), SyncState::WaitingForStartMarker);
    }

    #[test]
    fn timeout_while_waiting_is_swallowed() {
        let mut sync = BinarySync::new(Script::new(vec![
            Event::Byte(0x10, ms(0)),
            Event::Timeout,
        ]));
        sync.step();
        assert!(matches!(sync.step(), SyncStep::Idle));
        assert_eq!(sync.state(), SyncState::WaitingForStartMarker);
        assert!(matches!(sync.step(), SyncStep::Exhausted));
    }

    #[test]
    fn break_mid_frame_abandons_partial() {
        let mut sync = BinarySync::new(Script::new(vec![
            Event::Byte(START_MARKER, ms(0)),
            Event::Chunk(vec![9; 200], us(100)),
            Event::Chunk(vec![9; CHANNELS - 200], ms(50)),
        ]));
        sync.step();
        assert!(matches!(sync.step(), SyncStep::Idle));
        assert!(matches!(
            sync.step(),
            SyncStep::Rejected(FrameRejection::ShortFrame { received: 200 })
        ));
        assert_eq!(sync.state(), SyncState::WaitingForStartMarker);
        assert!(matches!(sync.step(), SyncStep::Exhausted));
    }

    #[test]
    fn break_mid_frame_resyncs_on_marker_after_gap() {
        let mut tail = vec![0x44, 0x45, START_MARKER];
        tail.extend([3u8; 100]);
        let mut sync = BinarySync::new(Script::new(vec![
            Event::Byte(START_MARKER, ms(0)),
            Event::Chunk(vec![9; 300], us(100)),
            Event::Chunk(tail, ms(20)),
            Event::Chunk(vec![4; CHANNELS - 100], ms(20) + us(100)),
        ]));
        sync.step();
        sync.step();
        assert!(matches!(sync.step(), SyncStep::Rejected(_)));
        assert_eq!(sync.state(), SyncState::Collecting { filled: 100 });
        let SyncStep::Frame(frame) = sync.step() else {
            panic!("expected a frame after resync");
        };
        assert_eq!(frame.get(0), Some(3));
        assert_eq!(frame.get(99), Some(3));
        assert_eq!(frame.get(100), Some(4));
    }

    #[test]
    fn gap_while_waiting_then_marker_syncs() {
        let mut sync = BinarySync::new(Script::new(vec![
            Event::Byte(0x55, ms(0)),
            Event::Byte(START_MARKER, ms(30)),
            Event::Chunk(vec![6; CHANNELS], ms(30) + us(100)),
        ]));
        sync.step();
        sync.step();
        assert_eq!(sync.state(), SyncState::Collecting { filled: 0 });
        assert!(matches!(sync.step(), SyncStep::Frame(_)));
    }

    #[test]
    fn break_gap_sets_the_threshold() {
        let events = || {
            vec![
                Event::Byte(START_MARKER, ms(0)),
                Event::Chunk(vec![5; 100], ms(3)),
                Event::Chunk(vec![5; CHANNELS - 100], ms(6)),
            ]
        };
        let mut tight = BinarySync::with_break_gap(Script::new(events()), ms(1));
        assert_eq!(tight.break_gap(), ms(1));
        assert_eq!(count_frames(&mut tight), 0);

        let mut loose = BinarySync::with_break_gap(Script::new(events()), ms(5));
        assert_eq!(count_frames(&mut loose), 1);
    }
}
