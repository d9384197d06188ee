//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).  The
//! BLE status characteristic is fed by a separate sink implementing the
//! same trait.

use log::{info, warn};

use crate::app::events::BeaconEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`BeaconEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &BeaconEvent) {
        match event {
            BeaconEvent::AlertRaised(kind) => {
                warn!("ALERT | {} raised and queued", kind.message());
            }
            BeaconEvent::AlertCancelled => {
                info!("ALERT | cancelled");
            }
            BeaconEvent::HeartRate(bpm) => {
                info!("VITAL | {bpm} BPM");
            }
            BeaconEvent::WearChanged(worn) => {
                info!("WEAR  | {}", if *worn { "worn" } else { "removed" });
            }
            BeaconEvent::VoiceActivity(active) => {
                info!(
                    "VOICE | {} — audio budget {}",
                    if *active { "active" } else { "inactive" },
                    if *active { "raised" } else { "lowered" },
                );
            }
            BeaconEvent::PowerChanged { from, to } => {
                info!("POWER | {from:?} -> {to:?}");
            }
            BeaconEvent::LinkStats(s) => {
                info!(
                    "STATS | depth {}/{}/{} | dropped {}/{}/{} | audio {}/{} pkt/s",
                    s.critical_depth,
                    s.high_depth,
                    s.normal_depth,
                    s.dropped_critical,
                    s.dropped_high,
                    s.dropped_normal,
                    s.rate_count,
                    s.rate_limit,
                );
            }
            BeaconEvent::Started => {
                info!("START | beacon service up");
            }
        }
    }
}
