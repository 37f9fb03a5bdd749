use std::net::{Ipv4Addr, SocketAddr, UdpSocket};

use crate::dispatch::{FrameSender, TransportError};
use crate::frame::ChannelFrame;

use super::encoder::{encode_artdmx, next_sequence};
use super::layout;

/// UDP ArtDMX transmitter bound to one local address and one destination.
pub struct ArtNetSender {
    socket: UdpSocket,
    target: SocketAddr,
    sequence: u8,
    packet: [u8; layout::PACKET_LEN],
}

impl ArtNetSender {
    /// Open a socket towards `target` on the Art-Net port.
    ///
    /// With a `local` address the socket is bound there first; if that bind
    /// fails the sender falls back to the unspecified address, so a stale
    /// interface setting degrades to OS routing instead of stopping the
    /// bridge.
    ///
    /// # Errors
    /// Returns `TransportError` when no socket can be bound or broadcast
    /// cannot be enabled.
    pub fn open(local: Option<Ipv4Addr>, target: Ipv4Addr) -> Result<Self, TransportError> {
        Self::open_to(local, SocketAddr::from((target, layout::ARTNET_PORT)))
    }

    /// Like `open`, with an explicit destination port.
    ///
    /// # Errors
    /// Returns `TransportError` when no socket can be bound or broadcast
    /// cannot be enabled.
    pub fn open_to(local: Option<Ipv4Addr>, target: SocketAddr) -> Result<Self, TransportError> {
        let socket = match local {
            Some(ip) => match bind(ip) {
                Ok(socket) => socket,
                Err(err) => {
                    tracing::warn!(error = %err, "falling back to any local address");
                    bind(Ipv4Addr::UNSPECIFIED)?
                }
            },
            None => bind(Ipv4Addr::UNSPECIFIED)?,
        };
        socket
            .set_broadcast(true)
            .map_err(TransportError::Configure)?;

        Ok(Self {
            socket,
            target,
            sequence: 0,
            packet: [0u8; layout::PACKET_LEN],
        })
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }

    /// # Errors
    /// Returns `TransportError::Configure` when the OS cannot report it.
    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        self.socket.local_addr().map_err(TransportError::Configure)
    }
}

fn bind(ip: Ipv4Addr) -> Result<UdpSocket, TransportError> {
    let addr = SocketAddr::from((ip, 0));
    UdpSocket::bind(addr).map_err(|source| TransportError::Bind { addr, source })
}

impl FrameSender for ArtNetSender {
    fn send(&mut self, universe: u16, frame: &ChannelFrame) -> Result<(), TransportError> {
        let sequence = next_sequence(self.sequence);
        encode_artdmx(&mut self.packet, universe, sequence, frame)?;
        self.sequence = sequence;

        let target = self.target;
        let sent = self
            .socket
            .send_to(&self.packet, target)
            .map_err(|source| TransportError::Send { target, source })?;
        if sent != layout::PACKET_LEN {
            return Err(TransportError::ShortSend {
                target,
                sent,
                expected: layout::PACKET_LEN,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::ArtNetSender;
    use crate::dispatch::FrameSender;
    use crate::frame::ChannelFrame;
    use crate::protocols::artnet::layout;
    use std::net::{Ipv4Addr, UdpSocket};
    use std::time::Duration;

    #[test]
    fn sends_sequenced_packets_over_loopback() {
        let receiver = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        receiver
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();
        let target = receiver.local_addr().unwrap();
        let mut sender = ArtNetSender::open_to(Some(Ipv4Addr::LOCALHOST), target).unwrap();

        let mut frame = ChannelFrame::blackout();
        frame.set(2, 30);
        sender.send(3, &frame).unwrap();
        sender.send(3, &frame).unwrap();

        let mut buf = [0u8; 1024];
        let (len, _) = receiver.recv_from(&mut buf).unwrap();
        assert_eq!(len, layout::PACKET_LEN);
        assert_eq!(buf[layout::SEQUENCE_OFFSET], 1);
        assert_eq!(buf[layout::UNIVERSE_RANGE.start], 3);
        assert_eq!(buf[layout::DMX_DATA_OFFSET + 2], 30);
        let (_, _) = receiver.recv_from(&mut buf).unwrap();
        assert_eq!(buf[layout::SEQUENCE_OFFSET], 2);
    }

    #[test]
    fn invalid_universe_is_a_send_error() {
        let mut sender =
            ArtNetSender::open_to(Some(Ipv4Addr::LOCALHOST), (Ipv4Addr::LOCALHOST, 9).into())
                .unwrap();
        assert!(sender.send(0x8000, &ChannelFrame::blackout()).is_err());
    }
}
