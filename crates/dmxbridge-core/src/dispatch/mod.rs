//! Dispatch: hand accepted frames to the live slot and push the live frame
//! to the network.
//!
//! Failed sends are not retried. The next accepted frame supersedes the
//! lost one, and a stalled send must never hold up ingestion.

mod error;

pub use error::TransportError;

use std::sync::Arc;

use crate::counters::Counters;
use crate::frame::ChannelFrame;
use crate::handoff::SharedFrame;

/// Protocol/transport collaborator: encodes and transmits one universe.
pub trait FrameSender {
    fn send(&mut self, universe: u16, frame: &ChannelFrame) -> Result<(), TransportError>;
}

impl<S: FrameSender + ?Sized> FrameSender for Box<S> {
    fn send(&mut self, universe: u16, frame: &ChannelFrame) -> Result<(), TransportError> {
        (**self).send(universe, frame)
    }
}

pub struct Dispatcher<S> {
    sender: S,
    universe: u16,
    shared: Arc<SharedFrame>,
    counters: Arc<Counters>,
}

impl<S: FrameSender> Dispatcher<S> {
    pub fn new(sender: S, universe: u16, shared: Arc<SharedFrame>, counters: Arc<Counters>) -> Self {
        Self {
            sender,
            universe,
            shared,
            counters,
        }
    }

    pub fn universe(&self) -> u16 {
        self.universe
    }

    pub fn shared(&self) -> &Arc<SharedFrame> {
        &self.shared
    }

    pub fn sender(&self) -> &S {
        &self.sender
    }

    /// Commit an accepted frame and transmit the live frame.
    ///
    /// The frame counts as valid once committed, whatever the send outcome.
    ///
    /// # Errors
    /// Returns the transport error of a failed send; the frame stays
    /// committed and the failure is counted.
    pub fn publish(&mut self, frame: &ChannelFrame) -> Result<(), TransportError> {
        self.shared.commit(frame);
        self.counters.record_valid();
        self.dispatch()
    }

    /// Transmit the current live frame.
    ///
    /// # Errors
    /// Returns the transport error of a failed send.
    pub fn dispatch(&mut self) -> Result<(), TransportError> {
        let frame = self.shared.snapshot();
        self.sender.send(self.universe, &frame).inspect_err(|_| {
            self.counters.record_send_failure();
        })
    }

    /// Transmit an all-zero frame without touching the live frame.
    ///
    /// # Errors
    /// Returns the transport error of a failed send.
    pub fn send_blackout(&mut self) -> Result<(), TransportError> {
        self.sender
            .send(self.universe, &ChannelFrame::blackout())
            .inspect_err(|_| self.counters.record_send_failure())
    }
}
