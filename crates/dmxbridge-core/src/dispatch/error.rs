use std::io;
use std::net::SocketAddr;

use thiserror::Error;

use crate::protocols::artnet::ArtNetError;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("cannot bind UDP socket on {addr}: {source}")]
    Bind { addr: SocketAddr, source: io::Error },
    #[error("cannot configure UDP socket: {0}")]
    Configure(io::Error),
    #[error("send to {target} failed: {source}")]
    Send { target: SocketAddr, source: io::Error },
    #[error("short send to {target}: {sent} of {expected} bytes")]
    ShortSend {
        target: SocketAddr,
        sent: usize,
        expected: usize,
    },
    #[error(transparent)]
    Encode(#[from] ArtNetError),
}
