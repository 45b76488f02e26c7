//! Datagram link to the robot.
//!
//! A single bound socket is shared through an `Arc`: the sender half calls
//! `send_to` from the input thread while the receiver half blocks in
//! `recv_from` on the telemetry thread. Datagram sockets support this
//! concurrently, so no lock is involved.

use std::{
    net::{SocketAddr, ToSocketAddrs, UdpSocket},
    sync::Arc,
};

use super::{CommandSink, FrameSource, TransportError};

/// Outbound half: sends each command as one datagram to the fixed peer.
#[derive(Debug, Clone)]
pub struct UdpSender {
    socket: Arc<UdpSocket>,
    peer: SocketAddr,
}

/// Inbound half: yields one telemetry frame per datagram.
#[derive(Debug, Clone)]
pub struct UdpReceiver {
    socket: Arc<UdpSocket>,
}

/// Resolve `host:port` to the first address of the family of `bind`.
pub fn resolve_peer(
    host: &str,
    port: u16,
    bind: &SocketAddr,
) -> Result<SocketAddr, TransportError> {
    let label = format!("{host}:{port}");
    let mut addrs = (host, port)
        .to_socket_addrs()
        .map_err(|_| TransportError::PeerUnresolved(label.clone()))?;
    addrs
        .find(|a| a.is_ipv4() == bind.is_ipv4())
        .ok_or(TransportError::PeerUnresolved(label))
}

/// Bind a local socket and pair it with the resolved peer.
///
/// Fails if the bind address is invalid or in use, or if the peer does not
/// resolve. Both are startup errors.
pub fn open(
    bind: &str,
    peer_host: &str,
    peer_port: u16,
) -> Result<(UdpSender, UdpReceiver), TransportError> {
    let socket = UdpSocket::bind(bind)?;
    let local = socket.local_addr()?;
    let peer = resolve_peer(peer_host, peer_port, &local)?;
    tracing::info!(%local, %peer, "udp link ready");
    Ok(split(socket, peer))
}

/// Share an already-bound socket between a sender and a receiver half.
pub fn split(
    socket: UdpSocket,
    peer: SocketAddr,
) -> (UdpSender, UdpReceiver) {
    let socket = Arc::new(socket);
    (
        UdpSender {
            socket: Arc::clone(&socket),
            peer,
        },
        UdpReceiver { socket },
    )
}

impl UdpSender {
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }
}

impl CommandSink for UdpSender {
    fn send(
        &mut self,
        payload: &[u8],
    ) -> Result<usize, TransportError> {
        let written = self.socket.send_to(payload, self.peer)?;
        if written != payload.len() {
            return Err(TransportError::ShortWrite {
                written,
                expected: payload.len(),
            });
        }
        Ok(written)
    }
}

impl FrameSource for UdpReceiver {
    fn recv_frame(
        &mut self,
        buf: &mut [u8],
    ) -> Result<usize, TransportError> {
        let (len, from) = self.socket.recv_from(buf)?;
        tracing::trace!(%from, len, "datagram received");
        Ok(len)
    }
}
