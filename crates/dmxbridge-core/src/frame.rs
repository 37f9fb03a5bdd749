use std::fmt;

/// Number of channel slots in one universe.
pub const CHANNELS: usize = 512;

/// One complete universe of channel levels, index = channel number (0-based).
///
/// The length is fixed by the type, so a partially filled frame cannot be
/// represented; channels that were never written are 0.
///
/// # Examples
/// ```
/// use dmxbridge_core::{CHANNELS, ChannelFrame};
///
/// let mut frame = ChannelFrame::blackout();
/// frame.set(0, 255);
/// assert_eq!(frame.get(0), Some(255));
/// assert_eq!(frame.as_slice().len(), CHANNELS);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ChannelFrame {
    slots: [u8; CHANNELS],
}

impl ChannelFrame {
    /// All channels at level 0.
    pub const fn blackout() -> Self {
        Self {
            slots: [0u8; CHANNELS],
        }
    }

    pub const fn from_slots(slots: [u8; CHANNELS]) -> Self {
        Self { slots }
    }

    pub fn get(&self, channel: usize) -> Option<u8> {
        self.slots.get(channel).copied()
    }

    /// Set one channel; out-of-range channels are ignored.
    pub fn set(&mut self, channel: usize, level: u8) {
        if let Some(slot) = self.slots.get_mut(channel) {
            *slot = level;
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.slots
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.slots
    }

    /// Overwrite every channel from `other`.
    pub fn copy_from(&mut self, other: &ChannelFrame) {
        self.slots.copy_from_slice(&other.slots);
    }
}

impl Default for ChannelFrame {
    fn default() -> Self {
        Self::blackout()
    }
}

impl fmt::Debug for ChannelFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let last_lit = self.slots.iter().rposition(|level| *level != 0);
        let shown = last_lit.map_or(0, |idx| (idx + 1).min(16));
        f.debug_struct("ChannelFrame")
            .field("head", &&self.slots[..shown])
            .field("lit", &self.slots.iter().filter(|level| **level != 0).count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{CHANNELS, ChannelFrame};

    #[test]
    fn blackout_is_all_zero() {
        let frame = ChannelFrame::blackout();
        assert!(frame.as_slice().iter().all(|level| *level == 0));
        assert_eq!(frame.as_slice().len(), CHANNELS);
    }

    #[test]
    fn set_ignores_out_of_range_channel() {
        let mut frame = ChannelFrame::blackout();
        frame.set(CHANNELS, 9);
        assert_eq!(frame, ChannelFrame::blackout());
        assert_eq!(frame.get(CHANNELS), None);
    }

    #[test]
    fn copy_from_replaces_every_channel() {
        let mut target = ChannelFrame::from_slots([7u8; CHANNELS]);
        let mut source = ChannelFrame::blackout();
        source.set(3, 42);
        target.copy_from(&source);
        assert_eq!(target, source);
    }
}
