//! Wire formats exchanged with the robot.
//!
//! - `command`: outbound command tokens and their framing
//! - `telemetry`: inbound comma-separated status frames

pub mod command;
pub mod telemetry;

pub use command::{Command, Framing, ParseCommandError};
pub use telemetry::{FrameError, TelemetryFrame};
