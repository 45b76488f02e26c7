//! Core state machine, command dispatch and telemetry ingestion for the
//! Robobook ground-control client.
//!
//! For runnable binaries, see the `gcs-app/` directory.

pub mod utils;
