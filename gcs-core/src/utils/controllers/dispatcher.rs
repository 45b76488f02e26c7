//! Best-effort command dispatch.
//!
//! Every command handed to the dispatcher is written to the link exactly once.
//! The link is unreliable by nature and a lost command is superseded by the
//! next key transition, so send failures are counted and dropped here instead
//! of being returned to the input loop.

use crate::utils::{connection::CommandSink, protocol::Command};

/// Delivery counters of a dispatcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Commands the transport accepted.
    pub sent: u64,
    /// Commands lost to a transport error.
    pub dropped: u64,
}

/// Owner of the outbound half of the link.
pub struct CommandDispatcher<S> {
    sink: S,
    last: Option<Command>,
    stats: DispatchStats,
}

impl<S: CommandSink> CommandDispatcher<S> {
    pub fn new(sink: S) -> Self {
        CommandDispatcher {
            sink,
            last: None,
            stats: DispatchStats::default(),
        }
    }

    /// Encode `command` for the link and write it once.
    ///
    /// Never fails: a transport error is logged and the command is counted
    /// as dropped.
    pub fn dispatch(
        &mut self,
        command: &Command,
    ) {
        let payload = command.encode(self.sink.framing());
        self.last = Some(*command);

        match self.sink.send(&payload) {
            Ok(_) => {
                self.stats.sent += 1;
                tracing::debug!(%command, "command sent");
            }
            Err(error) => {
                self.stats.dropped += 1;
                tracing::debug!(%command, %error, "command dropped");
            }
        }
    }

    /// Last command handed to [`dispatch`](Self::dispatch), delivered or not.
    pub fn last_command(&self) -> Option<Command> {
        self.last
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}
