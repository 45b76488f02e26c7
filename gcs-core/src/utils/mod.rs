//! Utility re-exports for the Robobook ground-control client.
//!
//! - `config`: reference constants and the client configuration
//! - `connection`: transport capabilities (UDP, serial) and telemetry ingestion
//! - `controllers`: key model, input trackers and command dispatch
//! - `protocol`: command vocabulary and telemetry frame parsing

pub mod config;
pub mod connection;
pub mod controllers;
pub mod protocol;

pub use connection::ingest::TelemetryIngestor;
pub use controllers::{dispatcher::CommandDispatcher, Teleop};
pub use protocol::{command::Command, telemetry::TelemetryFrame};
