//! Serial bridge link.
//!
//! Used when the robot is reached through a transmitter board on a serial
//! port instead of Wi-Fi. Commands are newline-terminated and each inbound
//! line is treated as one telemetry frame. The port is cloned so the writer
//! and reader halves can be moved to different threads.
//!
//! Both halves are generic over the byte stream so they can run on anything
//! that implements [`Read`]/[`Write`]; [`open`] instantiates them with a real
//! port.

use std::{
    io::{self, BufRead, BufReader, Read, Write},
    thread,
    time::Duration,
};

use serialport::SerialPort;

use super::{CommandSink, FrameSource, TransportError};
use crate::utils::{
    config::SERIAL_READ_TIMEOUT,
    protocol::{FrameError, Framing},
};

/// Outbound half of the serial bridge.
pub struct SerialWriter<W = Box<dyn SerialPort>> {
    port: W,
}

/// Inbound half of the serial bridge; yields one line per frame.
pub struct SerialReader<R = Box<dyn SerialPort>> {
    reader: BufReader<R>,
    pending: Vec<u8>,
    /// Bytes already shed from an over-length line still being received.
    shed: usize,
}

/// Open `path` at `baud_rate` and wait `settle` for the bridge to reset.
pub fn open(
    path: &str,
    baud_rate: u32,
    settle: Duration,
) -> Result<(SerialWriter, SerialReader), TransportError> {
    tracing::info!(path, baud_rate, "opening serial bridge");
    let port = serialport::new(path, baud_rate)
        .timeout(SERIAL_READ_TIMEOUT)
        .open()?;
    let reader = port.try_clone()?;

    // Opening the port toggles DTR and resets the bridge board.
    thread::sleep(settle);
    tracing::info!(path, "serial bridge connected");

    Ok((SerialWriter::new(port), SerialReader::new(reader)))
}

impl<W: Write> SerialWriter<W> {
    pub fn new(port: W) -> Self {
        SerialWriter { port }
    }

    pub fn get_ref(&self) -> &W {
        &self.port
    }
}

impl<W: Write> CommandSink for SerialWriter<W> {
    fn send(
        &mut self,
        payload: &[u8],
    ) -> Result<usize, TransportError> {
        self.port.write_all(payload)?;
        self.port.flush()?;
        Ok(payload.len())
    }

    fn framing(&self) -> Framing {
        Framing::Line
    }
}

impl<R: Read> SerialReader<R> {
    pub fn new(port: R) -> Self {
        SerialReader {
            reader: BufReader::new(port),
            pending: Vec::new(),
            shed: 0,
        }
    }

    /// Drop the partial line once it can no longer fit a frame buffer.
    fn shed_overflow(
        &mut self,
        capacity: usize,
    ) {
        if self.pending.len() > capacity {
            self.shed += self.pending.len();
            self.pending.clear();
        }
    }
}

impl<R: Read> FrameSource for SerialReader<R> {
    /// Read up to and including the next `\n`.
    ///
    /// A read timeout surfaces as an error; bytes of a partially received
    /// line are kept and completed by the next call. A line longer than
    /// `buf` is discarded whole with [`FrameError::TooLong`].
    fn recv_frame(
        &mut self,
        buf: &mut [u8],
    ) -> Result<usize, TransportError> {
        loop {
            match self.reader.read_until(b'\n', &mut self.pending) {
                Ok(0) => return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into()),
                Ok(_) => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.shed_overflow(buf.len());
                    return Err(e.into());
                }
            }
        }

        let len = self.shed + self.pending.len();
        if len > buf.len() {
            self.shed = 0;
            self.pending.clear();
            return Err(FrameError::TooLong {
                len,
                capacity: buf.len(),
            }
            .into());
        }

        buf[..len].copy_from_slice(&self.pending);
        self.pending.clear();
        Ok(len)
    }
}
