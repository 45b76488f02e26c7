//! Edge-triggered key tracker.
//!
//! A command goes out only when a key *becomes* held. Terminals and key
//! listeners repeat press events while a key is down, so repeats of a held
//! key are swallowed here. The exceptions are the drive key `W` and Shift:
//!
//! - Shift changing while `W` is held switches between `FORWARD` and `BOOST`.
//! - Releasing `W` sends `STOP` (momentary drive) when enabled.

use super::{
    keys::{Key, KeySet},
    InputTracker,
};
use crate::utils::protocol::Command;

/// Tracker for the `FORWARD`/`BOOST`/`LEFT`/... vocabulary.
#[derive(Debug, Clone)]
pub struct EdgeTracker {
    held: KeySet,
    momentary_stop: bool,
}

impl Default for EdgeTracker {
    fn default() -> Self {
        Self::new(true)
    }
}

impl EdgeTracker {
    /// Create a tracker; `momentary_stop` sends `STOP` whenever `W` is released.
    pub fn new(momentary_stop: bool) -> Self {
        EdgeTracker {
            held: KeySet::new(),
            momentary_stop,
        }
    }

    pub fn held(&self) -> &KeySet {
        &self.held
    }

    fn tracks(key: Key) -> bool {
        !matches!(key, Key::Up | Key::Down)
    }

    fn drive_command(&self) -> Command {
        if self.held.any_shift() {
            Command::Boost
        } else {
            Command::Forward
        }
    }
}

impl InputTracker for EdgeTracker {
    fn on_press(
        &mut self,
        key: Key,
    ) -> Option<Command> {
        if !Self::tracks(key) {
            return None;
        }
        let shift_was_held = self.held.any_shift();
        if !self.held.insert(key) {
            return None;
        }

        match key {
            Key::W => Some(self.drive_command()),
            Key::A => Some(Command::Left),
            Key::D => Some(Command::Right),
            Key::Q => Some(Command::RotateQ),
            Key::E => Some(Command::RotateE),
            Key::S => Some(Command::Stop),
            Key::Shift(_) if !shift_was_held && self.held.contains(Key::W) => {
                tracing::info!("shift pressed while driving, boosting");
                Some(Command::Boost)
            }
            Key::Shift(_) | Key::Up | Key::Down => None,
        }
    }

    fn on_release(
        &mut self,
        key: Key,
    ) -> Option<Command> {
        if !self.held.remove(key) {
            return None;
        }

        match key {
            Key::W if self.momentary_stop => {
                tracing::info!("drive key released, stopping");
                Some(Command::Stop)
            }
            Key::Shift(_) if !self.held.any_shift() && self.held.contains(Key::W) => {
                tracing::info!("shift released while driving, normal speed");
                Some(Command::Forward)
            }
            _ => None,
        }
    }
}
