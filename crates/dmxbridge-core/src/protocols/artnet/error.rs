use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArtNetError {
    #[error("buffer too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
    #[error("universe {universe} exceeds the 15-bit Art-Net port address")]
    InvalidUniverse { universe: u16 },
}
