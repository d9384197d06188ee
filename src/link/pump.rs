//! Link pump — drains the scheduler into the radio.
//!
//! One `service()` call is one pump iteration: wait briefly for work
//! (the wait only ever blocks on the NORMAL tier), then drain everything
//! pending in strict priority order.  On disconnect the queues are
//! cleared unconditionally — stale telemetry is worth less than nothing
//! once the client is gone, and nothing is retransmitted.

use log::{debug, info, warn};

use crate::error::LinkError;
use crate::telemetry::TelemetryScheduler;

use super::transport::RadioLink;

pub struct LinkPump {
    /// NORMAL-tier wait per iteration (keeps the task idle-cheap).
    wait_ms: u32,
    /// Statistics log cadence.
    stats_interval_ms: u32,
    last_stats_ms: u32,
    was_connected: bool,
    /// Packets that failed at the radio after leaving the queues.
    tx_dropped: u32,
}

impl LinkPump {
    pub fn new(wait_ms: u32, stats_interval_ms: u32) -> Self {
        Self {
            wait_ms,
            stats_interval_ms,
            last_stats_ms: 0,
            was_connected: false,
            tx_dropped: 0,
        }
    }

    /// Packets lost between dequeue and the air.
    pub fn tx_dropped(&self) -> u32 {
        self.tx_dropped
    }

    /// One pump iteration.  Returns the number of packets transmitted.
    pub fn service<R: RadioLink>(
        &mut self,
        scheduler: &TelemetryScheduler,
        radio: &mut R,
        now_ms: u32,
    ) -> u32 {
        if !radio.connected() {
            if self.was_connected {
                self.was_connected = false;
                info!("link down — discarding pending telemetry");
                scheduler.clear_all();
            }
            return 0;
        }
        if !self.was_connected {
            self.was_connected = true;
            info!("link up — pump active");
        }

        let mut sent = 0u32;
        // First dequeue may wait; once draining, stay non-blocking.
        while let Some(packet) = scheduler.next_packet(if sent == 0 { self.wait_ms } else { 0 }) {
            match radio.send(&packet) {
                Ok(()) => sent += 1,
                Err(LinkError::NotConnected) => {
                    // Client vanished mid-drain; teardown happens on the
                    // next iteration.
                    self.tx_dropped += 1;
                    break;
                }
                Err(e) => {
                    self.tx_dropped += 1;
                    warn!("{} packet dropped at radio: {e}", packet.tier.label());
                }
            }
        }

        if now_ms.wrapping_sub(self.last_stats_ms) >= self.stats_interval_ms {
            self.last_stats_ms = now_ms;
            let s = scheduler.stats();
            info!(
                "QUEUES | crit={}/{} high={}/{} norm={}/{} | dropped {}/{}/{} | \
                 audio {}/{} pkt/s | tx_dropped={}",
                s.critical_depth,
                crate::telemetry::scheduler::CRITICAL_QUEUE_CAP,
                s.high_depth,
                crate::telemetry::scheduler::HIGH_QUEUE_CAP,
                s.normal_depth,
                crate::telemetry::scheduler::NORMAL_QUEUE_CAP,
                s.dropped_critical,
                s.dropped_high,
                s.dropped_normal,
                s.rate_count,
                s.rate_limit,
                self.tx_dropped,
            );
        }

        if sent > 0 {
            debug!("pump: {sent} packet(s) transmitted");
        }
        sent
    }
}

// ── Tests ────────────────────────────────────────────────────
