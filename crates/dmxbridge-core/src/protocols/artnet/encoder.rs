use crate::frame::ChannelFrame;

use super::error::ArtNetError;
use super::layout;
use super::writer::ArtNetWriter;

/// Write a complete ArtDMX packet carrying `frame` into `packet`.
///
/// A `sequence` of 0 tells receivers not to reorder.
///
/// # Examples
/// ```
/// use dmxbridge_core::ChannelFrame;
/// use dmxbridge_core::protocols::artnet::{encode_artdmx, layout};
///
/// let mut packet = [0u8; layout::PACKET_LEN];
/// encode_artdmx(&mut packet, 1, 7, &ChannelFrame::blackout())?;
/// assert_eq!(&packet[..8], layout::ARTNET_ID);
/// # Ok::<(), dmxbridge_core::protocols::artnet::ArtNetError>(())
/// ```
///
/// # Errors
/// Returns `ArtNetError` when the universe does not fit the port address or
/// the buffer is shorter than `layout::PACKET_LEN`.
pub fn encode_artdmx(
    packet: &mut [u8],
    universe: u16,
    sequence: u8,
    frame: &ChannelFrame,
) -> Result<(), ArtNetError> {
    if universe > layout::MAX_PORT_ADDRESS {
        return Err(ArtNetError::InvalidUniverse { universe });
    }
    let mut writer = ArtNetWriter::new(packet);
    writer.require_len(layout::PACKET_LEN)?;

    writer.write_signature()?;
    writer.write_u16_le(layout::OP_CODE_RANGE.clone(), layout::ARTDMX_OPCODE)?;
    writer.write_u16_be(
        layout::PROTOCOL_VERSION_RANGE.clone(),
        layout::PROTOCOL_VERSION,
    )?;
    writer.write_u8(layout::SEQUENCE_OFFSET, sequence)?;
    writer.write_u8(layout::PHYSICAL_OFFSET, 0)?;
    writer.write_u16_le(layout::UNIVERSE_RANGE.clone(), universe)?;
    writer.write_u16_be(layout::LENGTH_RANGE.clone(), layout::DMX_MAX_SLOTS as u16)?;
    writer.write_slice(layout::DMX_DATA_OFFSET..layout::PACKET_LEN, frame.as_slice())?;
    Ok(())
}

/// Next sequence number, cycling through 1..=255 (0 means "unsequenced").
pub(crate) fn next_sequence(current: u8) -> u8 {
    if current == u8::MAX { 1 } else { current + 1 }
}
