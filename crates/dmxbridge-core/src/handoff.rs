//! The single live frame shared by ingestion (writer) and dispatch (reader).
//!
//! The frame is only ever replaced wholesale under one mutex, and the lock
//! is held for exactly one fixed-size copy, never across I/O. A reader can
//! therefore never observe a mix of two frames.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::frame::ChannelFrame;

#[derive(Debug, Default)]
pub struct SharedFrame {
    current: Mutex<ChannelFrame>,
}

impl SharedFrame {
    /// Starts dark.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the live frame from an accepted candidate.
    pub fn commit(&self, candidate: &ChannelFrame) {
        self.lock().copy_from(candidate);
    }

    /// Copy of the live frame.
    pub fn snapshot(&self) -> ChannelFrame {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, ChannelFrame> {
        // The guarded value is plain bytes and every write is a whole-frame
        // copy, so a panicking holder cannot leave it torn.
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
