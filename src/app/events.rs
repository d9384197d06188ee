//! Outbound application events.
//!
//! The [`BeaconService`](super::service::BeaconService) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on
//! the other side decide what to do with them — log to serial, mirror to
//! a BLE status characteristic, feed a companion-app stream.

use crate::power::PowerState;
use crate::telemetry::SchedulerStats;

/// Which life-critical condition raised an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Fall,
    HeartStop,
    Manual,
}

impl AlertKind {
    /// The wire message carried in the CRITICAL packet.
    pub const fn message(self) -> &'static str {
        match self {
            Self::Fall => "FALL",
            Self::HeartStop => "HEART_STOP",
            Self::Manual => "MANUAL_ALERT",
        }
    }
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum BeaconEvent {
    /// A CRITICAL alert was raised and queued for transmission.
    AlertRaised(AlertKind),

    /// A pending alert was cancelled (double press / remote reset).
    AlertCancelled,

    /// A throttled heart-rate sample went out on the HIGH tier.
    HeartRate(u8),

    /// Debounced wear state change.
    WearChanged(bool),

    /// Voice activity edge — audio rate budget switched.
    VoiceActivity(bool),

    /// The power manager changed state.
    PowerChanged { from: PowerState, to: PowerState },

    /// Periodic scheduler statistics snapshot.
    LinkStats(SchedulerStats),

    /// The application service has started.
    Started,
}
