//! Polled RPM tracker.
//!
//! Key events only update the held set and the target RPM. The command is
//! recomputed on every tick from whatever is held, so changing the target
//! RPM while driving takes effect on the next tick.

use core::time::Duration;

use super::{
    keys::{Key, KeySet},
    InputTracker,
};
use crate::utils::{
    config::{DEFAULT_TARGET_RPM, POLL_INTERVAL},
    protocol::Command,
};

/// Tracker for the `M:<rpm>`/`CL:<rpm>`/... vocabulary.
#[derive(Debug, Clone)]
pub struct PolledTracker {
    held: KeySet,
    target_rpm: u32,
    interval: Duration,
}

impl PolledTracker {
    /// Create a tracker starting at `initial_rpm` and ticking every `interval`.
    pub fn new(
        initial_rpm: u32,
        interval: Duration,
    ) -> Self {
        PolledTracker {
            held: KeySet::new(),
            target_rpm: initial_rpm,
            interval,
        }
    }

    pub fn held(&self) -> &KeySet {
        &self.held
    }

    /// Resolve the held keys to one command.
    ///
    /// Precedence is `W > D > A > E > Q > S`; with nothing held the robot is
    /// told to stop.
    pub fn evaluate(&self) -> Command {
        let rpm = self.target_rpm;
        if self.held.contains(Key::W) {
            Command::Move(rpm)
        } else if self.held.contains(Key::D) {
            Command::CurveLeft(rpm)
        } else if self.held.contains(Key::A) {
            Command::CurveRight(rpm)
        } else if self.held.contains(Key::E) {
            Command::RotateLeft(rpm)
        } else if self.held.contains(Key::Q) {
            Command::RotateRight(rpm)
        } else {
            Command::Stop
        }
    }
}

impl InputTracker for PolledTracker {
    fn on_press(
        &mut self,
        key: Key,
    ) -> Option<Command> {
        match key {
            Key::Up => {
                self.target_rpm = self.target_rpm.saturating_add(1);
                tracing::debug!(target_rpm = self.target_rpm, "target rpm raised");
            }
            Key::Down => {
                self.target_rpm = self.target_rpm.saturating_sub(1);
                tracing::debug!(target_rpm = self.target_rpm, "target rpm lowered");
            }
            Key::Shift(_) => {}
            letter => {
                self.held.insert(letter);
            }
        }
        None
    }

    fn on_release(
        &mut self,
        key: Key,
    ) -> Option<Command> {
        if !matches!(key, Key::Up | Key::Down | Key::Shift(_)) {
            self.held.remove(key);
        }
        None
    }

    fn on_tick(&mut self) -> Option<Command> {
        Some(self.evaluate())
    }

    fn tick_interval(&self) -> Option<Duration> {
        Some(self.interval)
    }

    fn target_rpm(&self) -> Option<u32> {
        Some(self.target_rpm)
    }
}

impl Default for PolledTracker {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_RPM, POLL_INTERVAL)
    }
}
