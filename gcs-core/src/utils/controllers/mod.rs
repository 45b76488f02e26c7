//! Module Exports
//!
//! This file exports the key-handling side of the ground-control client.
//!
//! - `keys`: normalized key identifiers and the held-key set
//! - `edge`: edge-triggered tracker (`FORWARD`, `BOOST`, ...)
//! - `polled`: timer-polled tracker (`M:<rpm>`, `CL:<rpm>`, ...)
//! - `dispatcher`: best-effort writer of commands to the link

pub mod dispatcher;
pub mod edge;
pub mod keys;
pub mod polled;

use core::time::Duration;

pub use dispatcher::{CommandDispatcher, DispatchStats};
pub use edge::EdgeTracker;
pub use keys::{Key, KeyEvent, KeySet, ShiftSide};
pub use polled::PolledTracker;

use crate::utils::{
    config::{ClientConfig, Profile},
    connection::CommandSink,
    protocol::Command,
};

/// Maps key transitions to at most one command each.
pub trait InputTracker {
    /// A key went down (or the source repeated a held key).
    fn on_press(
        &mut self,
        key: Key,
    ) -> Option<Command>;

    /// A key went up.
    fn on_release(
        &mut self,
        key: Key,
    ) -> Option<Command>;

    /// Periodic evaluation; only polled trackers produce anything here.
    fn on_tick(&mut self) -> Option<Command> {
        None
    }

    /// Period at which [`on_tick`](Self::on_tick) must be driven.
    fn tick_interval(&self) -> Option<Duration> {
        None
    }

    /// Current target RPM, for trackers that have one.
    fn target_rpm(&self) -> Option<u32> {
        None
    }
}

impl<T: InputTracker + ?Sized> InputTracker for Box<T> {
    fn on_press(
        &mut self,
        key: Key,
    ) -> Option<Command> {
        (**self).on_press(key)
    }

    fn on_release(
        &mut self,
        key: Key,
    ) -> Option<Command> {
        (**self).on_release(key)
    }

    fn on_tick(&mut self) -> Option<Command> {
        (**self).on_tick()
    }

    fn tick_interval(&self) -> Option<Duration> {
        (**self).tick_interval()
    }

    fn target_rpm(&self) -> Option<u32> {
        (**self).target_rpm()
    }
}

/// Build the tracker selected by `config.profile`.
pub fn tracker_for(config: &ClientConfig) -> Box<dyn InputTracker + Send> {
    match config.profile {
        Profile::Edge => Box::new(EdgeTracker::new(config.momentary_stop)),
        Profile::Polled => Box::new(PolledTracker::new(
            config.initial_rpm,
            config.poll_interval,
        )),
    }
}

/// Input-side controller: a tracker feeding a dispatcher.
///
/// Owns all input state. Runs entirely on the input thread and never waits
/// on the network beyond a single non-acknowledged write.
pub struct Teleop<T, S> {
    tracker: T,
    dispatcher: CommandDispatcher<S>,
}

impl<T, S> Teleop<T, S>
where
    T: InputTracker,
    S: CommandSink,
{
    pub fn new(
        tracker: T,
        sink: S,
    ) -> Self {
        Teleop {
            tracker,
            dispatcher: CommandDispatcher::new(sink),
        }
    }

    /// Feed one key event; returns the command dispatched for it, if any.
    pub fn handle(
        &mut self,
        event: KeyEvent,
    ) -> Option<Command> {
        let command = match event {
            KeyEvent::Press(key) => self.tracker.on_press(key),
            KeyEvent::Release(key) => self.tracker.on_release(key),
        }?;
        self.dispatcher.dispatch(&command);
        Some(command)
    }

    /// Drive one periodic evaluation.
    pub fn tick(&mut self) -> Option<Command> {
        let command = self.tracker.on_tick()?;
        self.dispatcher.dispatch(&command);
        Some(command)
    }

    /// Send a final best-effort `STOP`, e.g. when the operator quits.
    pub fn stop(&mut self) {
        self.dispatcher.dispatch(&Command::Stop);
    }

    pub fn tracker(&self) -> &T {
        &self.tracker
    }

    pub fn dispatcher(&self) -> &CommandDispatcher<S> {
        &self.dispatcher
    }
}
