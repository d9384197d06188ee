//! Inter-task command channel.
//!
//! BLE control-characteristic writes arrive in the Bluedroid callback
//! context; the control loop consumes them on its own tick.  An
//! `embassy-sync` bounded channel bridges the two without heap
//! allocation and without blocking the callback.
//!
//! ```text
//! ┌───────────────┐ ControlCommand ┌───────────────┐
//! │ BLE callback  │───────────────▶│  Control loop │
//! │ (Bluedroid)   │                │  (main task)  │
//! └───────────────┘                └───────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use crate::app::commands::ControlCommand;

/// Channel depth for inbound commands.  Control writes are rare; eight
/// slots is already generous.
const CONTROL_DEPTH: usize = 8;

/// Inbound command channel: BLE callback → control loop.
pub static CONTROL_CHANNEL: Channel<CriticalSectionRawMutex, ControlCommand, CONTROL_DEPTH> =
    Channel::new();

/// Post a command from the transport side.  Returns `false` (command
/// dropped) if the control loop has fallen impossibly far behind.
pub fn post_command(cmd: ControlCommand) -> bool {
    CONTROL_CHANNEL.try_send(cmd).is_ok()
}

/// Take the next pending command, if any.  Non-blocking; called once per
/// control tick.
pub fn take_command() -> Option<ControlCommand> {
    CONTROL_CHANNEL.try_receive().ok()
}

// ── Tests ────────────────────────────────────────────────────

/// The channel is a process-wide static; tests that touch it serialize on
/// this lock so they cannot interleave.
#[cfg(test)]
pub(crate) fn test_lock() -> std::sync::MutexGuard<'static, ()> {
    use std::sync::{Mutex, PoisonError};
    static LOCK: Mutex<()> = Mutex::new(());
    LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_and_drain_in_order() {
        let _guard = test_lock();
        while take_command().is_some() {}

        assert!(post_command(ControlCommand::StreamOn));
        assert!(post_command(ControlCommand::ResetAlert));

        assert_eq!(take_command(), Some(ControlCommand::StreamOn));
        assert_eq!(take_command(), Some(ControlCommand::ResetAlert));
        assert_eq!(take_command(), None);

        // Depth is bounded: overfilling drops, not blocks.
        for _ in 0..CONTROL_DEPTH {
            assert!(post_command(ControlCommand::StreamOff));
        }
        assert!(!post_command(ControlCommand::StreamOff));
        while take_command().is_some() {}
    }
}
