//! Telemetry scheduling — the arbitration core of the beacon.
//!
//! Three producer streams with very different urgency share one radio link
//! with a hard payload budget.  The scheduler keeps them in independent
//! bounded queues and drains them in strict priority order, so a burst of
//! audio can never delay an alert.
//!
//! ```text
//! ┌─────────────┐ enqueue_alert       ┌──────────────────────────┐
//! │ Fall/HR/Btn │────────────────────▶│ CRITICAL queue (cap 10)  │──┐
//! └─────────────┘                     └──────────────────────────┘  │
//! ┌─────────────┐ enqueue_heart_rate  ┌──────────────────────────┐  │ strict
//! │ HR monitor  │────────────────────▶│ HIGH queue     (cap 10)  │──┼──▶ next_packet()
//! └─────────────┘                     └──────────────────────────┘  │
//! ┌─────────────┐ enqueue_audio       ┌──────────────────────────┐  │
//! │ AudioStream │──▶ RateLimiter ────▶│ NORMAL queue   (cap 20)  │──┘
//! └─────────────┘    (15/30 pkt/s)    └──────────────────────────┘
//! ```
//!
//! Every enqueue is non-blocking: a full queue rejects the packet and bumps
//! a per-tier drop counter.  Only the NORMAL-tier dequeue may block, bounded
//! by an explicit timeout, so the link pump can idle cheaply without ever
//! waiting on urgent work's behalf.

pub mod packet;
pub mod queue;
pub mod rate;
pub mod scheduler;

pub use packet::{Packet, PacketKind, Tier, MAX_ALERT_LEN, MAX_PAYLOAD};
pub use rate::RateLimiter;
pub use scheduler::{SchedulerStats, TelemetryScheduler};
