//! Telemetry ingestion loop.
//!
//! Runs on its own thread, blocking on the inbound half of the link. Every
//! received frame either replaces the single status line on the console or is
//! dropped; nothing in here can end the loop.

use std::{io::Write, thread, time::Duration};

use super::{FrameSource, TransportError};
use crate::utils::{
    config::{DisplayMode, MIN_STATUS_FIELDS, RECV_BUFFER_SIZE, RECV_ERROR_BACKOFF},
    protocol::telemetry::{self, FrameError, TelemetryFrame},
};

/// Padding that wipes leftovers of a longer previous line.
const LINE_PAD: &str = "      ";

/// Result of one ingestion iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ingest {
    /// A frame was rendered to the display.
    Displayed,
    /// A frame arrived but was malformed, too short or too long.
    Discarded(FrameError),
    /// Nothing arrived within the link's read timeout.
    TimedOut,
    /// The receive itself failed.
    RecvFailed,
}

impl Ingest {
    /// Pause before the next receive. A link that fails instantly (closed
    /// port, unplugged bridge) would otherwise spin.
    pub fn backoff(&self) -> Option<Duration> {
        match self {
            Ingest::RecvFailed => Some(RECV_ERROR_BACKOFF),
            _ => None,
        }
    }
}

/// Blocking telemetry receiver and console renderer.
pub struct TelemetryIngestor<S, W> {
    source: S,
    out: W,
    mode: DisplayMode,
    buf: Vec<u8>,
}

impl<S, W> TelemetryIngestor<S, W>
where
    S: FrameSource,
    W: Write,
{
    /// Create an ingestor rendering frames from `source` onto `out`.
    pub fn new(
        source: S,
        out: W,
        mode: DisplayMode,
    ) -> Self {
        TelemetryIngestor {
            source,
            out,
            mode,
            buf: vec![0; RECV_BUFFER_SIZE],
        }
    }

    /// Receive and handle exactly one frame.
    pub fn poll_once(&mut self) -> Ingest {
        let len = match self.source.recv_frame(&mut self.buf) {
            Ok(len) => len,
            Err(TransportError::Frame(reason)) => {
                tracing::trace!(%reason, "telemetry frame discarded");
                return Ingest::Discarded(reason);
            }
            Err(error) if error.is_timeout() => return Ingest::TimedOut,
            Err(error) => {
                tracing::trace!(%error, "telemetry receive failed");
                return Ingest::RecvFailed;
            }
        };

        let rendered = match self.mode {
            DisplayMode::Raw => telemetry::decode(&self.buf[..len]).map(|text| {
                format!(
                    "\r[TELEMETRY] {}{LINE_PAD}{LINE_PAD}",
                    text.trim_end_matches(['\r', '\n'])
                )
            }),
            DisplayMode::Status => TelemetryFrame::parse(&self.buf[..len], MIN_STATUS_FIELDS)
                .map(|frame| format!("\r{}{LINE_PAD}", frame.status_line())),
            // CRLF: the console is in raw mode while the client runs.
            DisplayMode::Json => TelemetryFrame::parse(&self.buf[..len], MIN_STATUS_FIELDS)
                .map(|frame| format!("{}\r\n", frame.to_json())),
        };

        match rendered {
            Ok(line) => {
                if let Err(error) = self
                    .out
                    .write_all(line.as_bytes())
                    .and_then(|_| self.out.flush())
                {
                    tracing::debug!(%error, "telemetry display write failed");
                }
                Ingest::Displayed
            }
            Err(reason) => {
                tracing::trace!(%reason, "telemetry frame discarded");
                Ingest::Discarded(reason)
            }
        }
    }

    /// Ingest frames until the process exits.
    pub fn run(mut self) -> ! {
        tracing::info!(mode = ?self.mode, "telemetry stream started");
        loop {
            if let Some(pause) = self.poll_once().backoff() {
                thread::sleep(pause);
            }
        }
    }

    /// Give back the display sink.
    pub fn into_output(self) -> W {
        self.out
    }
}
