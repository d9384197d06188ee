//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world — the BLE
//! control characteristic, a serial console, host tests — that the
//! [`BeaconService`](super::service::BeaconService) interprets and acts
//! upon.  The wire form is a short ASCII verb, matching what the
//! companion app writes to the control characteristic.

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    /// Acknowledge the current alert and re-arm the detectors.
    ResetAlert,
    /// Raise a fall alert without a physical fall (companion-app test).
    TriggerTestFall,
    /// Start streaming compressed audio.
    StreamOn,
    /// Stop streaming audio.
    StreamOff,
    /// Reset the audio encoder so the next chunk is self-contained
    /// (lets a receiver join the stream fresh).
    RestartStream,
}

impl ControlCommand {
    /// Parse a control-characteristic write.  Unknown verbs are `None`
    /// and logged by the caller.
    pub fn parse(raw: &[u8]) -> Option<Self> {
        match raw {
            b"RESET_ALERT" => Some(Self::ResetAlert),
            b"TRIGGER_FALL" => Some(Self::TriggerTestFall),
            b"STREAM_ON" => Some(Self::StreamOn),
            b"STREAM_OFF" => Some(Self::StreamOff),
            b"STREAM_RESTART" => Some(Self::RestartStream),
            _ => None,
        }
    }
}
