//! Three-tier strict-priority packet scheduler.
//!
//! One scheduler instance sits between every telemetry producer and the
//! single link pump.  Enqueue operations are typed — each fixes the tier
//! and validates the payload — and strictly non-blocking: a full queue
//! rejects the packet and bumps that tier's drop counter.  The dequeue
//! side drains CRITICAL, then HIGH, then NORMAL at every call; a packet in
//! a lower tier is never returned while a higher tier holds one.
//!
//! Rejections are deliberate load shedding, not errors: for best-effort
//! telemetry, staleness is worse than loss, so there is no retry or
//! backoff anywhere in this module.

use core::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use log::{debug, info, warn};

use super::packet::{Packet, Tier};
use super::queue::BoundedQueue;
use super::rate::RateLimiter;

/// Queue capacities per tier.  Alerts and vitals are small and rare; audio
/// gets the deepest ring because it is the stream expected to shed load.
pub const CRITICAL_QUEUE_CAP: usize = 10;
pub const HIGH_QUEUE_CAP: usize = 10;
pub const NORMAL_QUEUE_CAP: usize = 20;

/// Point-in-time scheduler statistics.  Diagnostic surface only — nothing
/// in the pipeline makes control decisions from these numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerStats {
    pub critical_depth: usize,
    pub high_depth: usize,
    pub normal_depth: usize,
    pub dropped_critical: u32,
    pub dropped_high: u32,
    pub dropped_normal: u32,
    /// Audio chunks admitted in the current rate window.
    pub rate_count: u16,
    /// Current rate ceiling (packets per second).
    pub rate_limit: u16,
}

/// The telemetry scheduler.  Shared by reference between producer contexts
/// and the link pump; all methods take `&self`.
pub struct TelemetryScheduler {
    critical: BoundedQueue<Packet, CRITICAL_QUEUE_CAP>,
    high: BoundedQueue<Packet, HIGH_QUEUE_CAP>,
    normal: BoundedQueue<Packet, NORMAL_QUEUE_CAP>,
    rate: RateLimiter,
    dropped_critical: AtomicU32,
    dropped_high: AtomicU32,
    dropped_normal: AtomicU32,
}

impl TelemetryScheduler {
    /// `audio_rate_limit` is the initial NORMAL-tier admission ceiling in
    /// packets per second (the quiet operating point at boot).
    pub fn new(audio_rate_limit: u16) -> Self {
        info!(
            "scheduler up: queues {}/{}/{}, audio rate {} pkt/s",
            CRITICAL_QUEUE_CAP, HIGH_QUEUE_CAP, NORMAL_QUEUE_CAP, audio_rate_limit
        );
        Self {
            critical: BoundedQueue::new(),
            high: BoundedQueue::new(),
            normal: BoundedQueue::new(),
            rate: RateLimiter::new(audio_rate_limit),
            dropped_critical: AtomicU32::new(0),
            dropped_high: AtomicU32::new(0),
            dropped_normal: AtomicU32::new(0),
        }
    }

    // ── Enqueue (producer side) ───────────────────────────────

    /// Queue a CRITICAL alert.  The message is truncated and
    /// NUL-terminated by packet construction.
    pub fn enqueue_alert(&self, message: &str, now_ms: u32) -> bool {
        match self.critical.try_send(Packet::alert(message, now_ms)) {
            Ok(()) => {
                info!("alert queued: {message}");
                true
            }
            Err(_) => {
                self.dropped_critical.fetch_add(1, Ordering::Relaxed);
                warn!("critical queue full — alert dropped: {message}");
                false
            }
        }
    }

    /// Queue a HIGH-tier heart-rate sample (one byte).
    pub fn enqueue_heart_rate(&self, bpm: u8, now_ms: u32) -> bool {
        match self.high.try_send(Packet::heart_rate(bpm, now_ms)) {
            Ok(()) => {
                debug!("heart rate queued: {bpm} BPM");
                true
            }
            Err(_) => {
                self.dropped_high.fetch_add(1, Ordering::Relaxed);
                warn!("high queue full — heart rate dropped");
                false
            }
        }
    }

    /// Queue a NORMAL-tier compressed audio chunk.
    ///
    /// Admission is gated by the rate limiter *before* the queue is
    /// touched — a rate rejection consumes no queue slot and counts no
    /// drop.  A zero-length chunk is a no-op.  Queue-full rejections are
    /// counted but not logged per packet; audio is the stream expected to
    /// shed under load.
    pub fn enqueue_audio(&self, chunk: &[u8], now_ms: u32) -> bool {
        if chunk.is_empty() {
            return false;
        }
        if !self.rate.admit(now_ms) {
            return false;
        }
        match self.normal.try_send(Packet::audio(chunk, now_ms)) {
            Ok(()) => true,
            Err(_) => {
                self.dropped_normal.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    // ── Dequeue (consumer side) ───────────────────────────────

    /// Take the next packet in strict priority order.
    ///
    /// CRITICAL and HIGH are polled without blocking; only the NORMAL
    /// check may wait, up to `timeout_ms` (`0` = pure poll).  Blocking is
    /// confined to the lowest tier so the consumer can idle efficiently
    /// without ever waiting while urgent work exists.
    pub fn next_packet(&self, timeout_ms: u32) -> Option<Packet> {
        if let Some(p) = self.critical.try_recv() {
            return Some(p);
        }
        if let Some(p) = self.high.try_recv() {
            return Some(p);
        }
        if timeout_ms == 0 {
            self.normal.try_recv()
        } else {
            self.normal
                .recv_timeout(Duration::from_millis(u64::from(timeout_ms)))
        }
    }

    /// True if any tier holds at least one packet.
    pub fn has_packets(&self) -> bool {
        !self.critical.is_empty() || !self.high.is_empty() || !self.normal.is_empty()
    }

    /// Current depth of one tier's queue.
    pub fn depth(&self, tier: Tier) -> usize {
        match tier {
            Tier::Critical => self.critical.len(),
            Tier::High => self.high.len(),
            Tier::Normal => self.normal.len(),
        }
    }

    /// Drop every pending packet in every tier.  Link-teardown path only —
    /// audio and heart-rate packets lost here are not retransmitted.
    pub fn clear_all(&self) {
        self.critical.clear();
        self.high.clear();
        self.normal.clear();
        info!("all telemetry queues cleared");
    }

    // ── Rate control ──────────────────────────────────────────

    /// Change the audio admission ceiling (packets per second).  Called by
    /// the voice-activity edge logic; takes effect on the next check.
    pub fn set_audio_rate_limit(&self, per_sec: u16) {
        self.rate.set_limit(per_sec);
    }

    // ── Diagnostics ───────────────────────────────────────────

    pub fn stats(&self) -> SchedulerStats {
        let (rate_count, rate_limit) = self.rate.occupancy();
        SchedulerStats {
            critical_depth: self.critical.len(),
            high_depth: self.high.len(),
            normal_depth: self.normal.len(),
            dropped_critical: self.dropped_critical.load(Ordering::Relaxed),
            dropped_high: self.dropped_high.load(Ordering::Relaxed),
            dropped_normal: self.dropped_normal.load(Ordering::Relaxed),
            rate_count,
            rate_limit,
        }
    }
}

// ── Tests ────────────────────────────────────────────────────
