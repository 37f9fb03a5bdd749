use super::error::ArtNetError;
use super::layout;

pub struct ArtNetWriter<'a> {
    packet: &'a mut [u8],
}

impl<'a> ArtNetWriter<'a> {
    pub fn new(packet: &'a mut [u8]) -> Self {
        Self { packet }
    }

    pub fn require_len(&self, needed: usize) -> Result<(), ArtNetError> {
        if self.packet.len() < needed {
            return Err(ArtNetError::TooShort {
                needed,
                actual: self.packet.len(),
            });
        }
        Ok(())
    }

    pub fn write_u16_le(
        &mut self,
        range: std::ops::Range<usize>,
        value: u16,
    ) -> Result<(), ArtNetError> {
        self.write_slice(range, &value.to_le_bytes())
    }

    pub fn write_u16_be(
        &mut self,
        range: std::ops::Range<usize>,
        value: u16,
    ) -> Result<(), ArtNetError> {
        self.write_slice(range, &value.to_be_bytes())
    }

    pub fn write_u8(&mut self, offset: usize, value: u8) -> Result<(), ArtNetError> {
        let actual = self.packet.len();
        let slot = self.packet.get_mut(offset).ok_or(ArtNetError::TooShort {
            needed: offset + 1,
            actual,
        })?;
        *slot = value;
        Ok(())
    }

    pub fn write_slice(
        &mut self,
        range: std::ops::Range<usize>,
        bytes: &[u8],
    ) -> Result<(), ArtNetError> {
        let actual = self.packet.len();
        let target = self
            .packet
            .get_mut(range.clone())
            .ok_or(ArtNetError::TooShort {
                needed: range.end,
                actual,
            })?;
        if target.len() != bytes.len() {
            return Err(ArtNetError::TooShort {
                needed: bytes.len(),
                actual: target.len(),
            });
        }
        target.copy_from_slice(bytes);
        Ok(())
    }

    pub fn write_signature(&mut self) -> Result<(), ArtNetError> {
        self.write_slice(0..layout::ARTNET_ID.len(), layout::ARTNET_ID)
    }
}

#[cfg(test)]
mod tests {
    use super::ArtNetWriter;
    use crate::protocols::artnet::error::ArtNetError;

    #[test]
    fn write_past_end_is_too_short() {
        let mut buf = [0u8; 4];
        let mut writer = ArtNetWriter::new(&mut buf);
        let err = writer.write_u16_le(3..5, 1).unwrap_err();
        assert!(matches!(err, ArtNetError::TooShort { needed: 5, actual: 4 }));
    }

    #[test]
    fn endianness_follows_method() {
        let mut buf = [0u8; 4];
        let mut writer = ArtNetWriter::new(&mut buf);
        writer.write_u16_le(0..2, 0x5000).unwrap();
        writer.write_u16_be(2..4, 0x0200).unwrap();
        assert_eq!(buf, [0x00, 0x50, 0x02, 0x00]);
    }
}
