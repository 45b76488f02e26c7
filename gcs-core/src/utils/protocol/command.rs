//! Command vocabulary understood by the robot firmware.
//!
//! Two vocabularies share the `STOP` token: the fixed-speed set used by the
//! edge-triggered profile (`FORWARD`, `BOOST`, ...) and the RPM-parameterized
//! set used by the polled profile (`M:<rpm>`, `CL:<rpm>`, ...).
//!
//! # Example
//! ```rust
//! use gcs_core::utils::protocol::command::Command;
//! let cmd: Command = "CL:35".parse().unwrap();
//! assert_eq!(cmd, Command::CurveLeft(35));
//! assert_eq!(cmd.to_string(), "CL:35");
//! ```

use core::{fmt, str::FromStr};

/// One motion command, rendered on the wire as a short text token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    // Fixed-speed vocabulary
    /// `FORWARD`
    Forward,
    /// `BOOST`: forward at high speed.
    Boost,
    /// `LEFT`: adjust heading left while moving.
    Left,
    /// `RIGHT`: adjust heading right while moving.
    Right,
    /// `ROTATE_Q`: pivot left in place.
    RotateQ,
    /// `ROTATE_E`: pivot right in place.
    RotateE,
    /// `STOP`, shared by both vocabularies.
    Stop,

    // RPM-parameterized vocabulary
    /// `M:<rpm>`
    Move(u32),
    /// `CL:<rpm>`
    CurveLeft(u32),
    /// `CR:<rpm>`
    CurveRight(u32),
    /// `RL:<rpm>`
    RotateLeft(u32),
    /// `RR:<rpm>`
    RotateRight(u32),
}

/// Framing applied to a token before it reaches the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Framing {
    /// Message-oriented link: the datagram boundary delimits the token.
    #[default]
    Datagram,
    /// Byte-stream link: the token is terminated by `\n`.
    Line,
}

/// Error returned when a token is not part of either vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown command token `{0}`")]
pub struct ParseCommandError(pub String);

impl Command {
    /// Serialize the token for the given link framing.
    pub fn encode(
        &self,
        framing: Framing,
    ) -> Vec<u8> {
        let mut buf = self.to_string().into_bytes();
        if framing == Framing::Line {
            buf.push(b'\n');
        }
        buf
    }
}

impl fmt::Display for Command {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Command::Forward => f.write_str("FORWARD"),
            Command::Boost => f.write_str("BOOST"),
            Command::Left => f.write_str("LEFT"),
            Command::Right => f.write_str("RIGHT"),
            Command::RotateQ => f.write_str("ROTATE_Q"),
            Command::RotateE => f.write_str("ROTATE_E"),
            Command::Stop => f.write_str("STOP"),
            Command::Move(n) => write!(f, "M:{n}"),
            Command::CurveLeft(n) => write!(f, "CL:{n}"),
            Command::CurveRight(n) => write!(f, "CR:{n}"),
            Command::RotateLeft(n) => write!(f, "RL:{n}"),
            Command::RotateRight(n) => write!(f, "RR:{n}"),
        }
    }
}

impl FromStr for Command {
    type Err = ParseCommandError;

    /// Parse a token, tolerating surrounding whitespace and a trailing newline.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        let fixed = match token {
            "FORWARD" => Some(Command::Forward),
            "BOOST" => Some(Command::Boost),
            "LEFT" => Some(Command::Left),
            "RIGHT" => Some(Command::Right),
            "ROTATE_Q" => Some(Command::RotateQ),
            "ROTATE_E" => Some(Command::RotateE),
            "STOP" => Some(Command::Stop),
            _ => None,
        };
        if let Some(cmd) = fixed {
            return Ok(cmd);
        }

        let err = || ParseCommandError(token.to_owned());
        let (code, rpm) = token.split_once(':').ok_or_else(err)?;
        let rpm: u32 = rpm.parse().map_err(|_| err())?;
        match code {
            "M" => Ok(Command::Move(rpm)),
            "CL" => Ok(Command::CurveLeft(rpm)),
            "CR" => Ok(Command::CurveRight(rpm)),
            "RL" => Ok(Command::RotateLeft(rpm)),
            "RR" => Ok(Command::RotateRight(rpm)),
            _ => Err(err()),
        }
    }
}
