//! Art-Net ArtDMX transmission.
//!
//! The encoder writes one ArtDMX packet per frame into a reusable buffer
//! (signature, opcode, protocol version, sequence, 15-bit port address,
//! big-endian length, 512 slots) and the sender pushes it over UDP to the
//! configured node or broadcast address.
//!
//! Byte offsets live in `layout`, safe field writes in `writer`, packet
//! assembly in `encoder`.

pub mod encoder;
pub mod error;
pub mod layout;
pub mod sender;
pub mod writer;

pub use encoder::encode_artdmx;
pub use error::ArtNetError;
pub use sender::ArtNetSender;
