//! Transport capabilities and telemetry ingestion.
//!
//! The input side only needs to *send* bytes to the robot and the telemetry
//! side only needs to *receive* them, so a link is split into two halves
//! that can live on different threads without a lock:
//!
//! - `CommandSink`: outbound half, owned by the dispatcher
//! - `FrameSource`: inbound half, owned by the ingestor
//!
//! # Modules
//! - `udp`: datagram link sharing one socket between both halves
//! - `serial`: byte-stream link over a cloned serial port
//! - `ingest`: the blocking telemetry loop

pub mod ingest;
pub mod serial;
pub mod udp;

use std::io;

use crate::utils::protocol::{FrameError, Framing};

/// Errors raised at the transport boundary.
///
/// Per-frame errors are returned to the dispatcher and ingestor, which
/// discard them; construction errors abort startup.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),
    #[error("bad frame: {0}")]
    Frame(#[from] FrameError),
    #[error("could not resolve peer `{0}`")]
    PeerUnresolved(String),
    #[error("short write: {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },
}

impl TransportError {
    /// Receive timeouts are the normal idle state of a polled link.
    pub fn is_timeout(&self) -> bool {
        match self {
            TransportError::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
            ),
            _ => false,
        }
    }
}

/// Outbound half of a link: "send bytes to peer".
pub trait CommandSink {
    /// Write one encoded command. Exactly one write per call.
    fn send(
        &mut self,
        payload: &[u8],
    ) -> Result<usize, TransportError>;

    /// Framing the link expects on outbound tokens.
    fn framing(&self) -> Framing {
        Framing::Datagram
    }
}

/// Inbound half of a link: "receive bytes from peer".
pub trait FrameSource {
    /// Block until one frame is available and copy it into `buf`.
    ///
    /// Returns the number of bytes of the frame. A stream frame that does
    /// not fit `buf` is dropped whole and reported as
    /// [`TransportError::Frame`]; a datagram is cut at `buf.len()` by the
    /// socket itself.
    fn recv_frame(
        &mut self,
        buf: &mut [u8],
    ) -> Result<usize, TransportError>;
}

impl<S: CommandSink + ?Sized> CommandSink for Box<S> {
    fn send(
        &mut self,
        payload: &[u8],
    ) -> Result<usize, TransportError> {
        (**self).send(payload)
    }

    fn framing(&self) -> Framing {
        (**self).framing()
    }
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn recv_frame(
        &mut self,
        buf: &mut [u8],
    ) -> Result<usize, TransportError> {
        (**self).recv_frame(buf)
    }
}
