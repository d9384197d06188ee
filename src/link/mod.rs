//! Radio link — the consumer side of the pipeline.
//!
//! ```text
//! ┌──────────────────┐ next_packet ┌──────────┐ send ┌─────────────┐
//! │ TelemetryScheduler│────────────▶│ LinkPump │─────▶│  RadioLink  │
//! └──────────────────┘  (priority) └──────────┘      │ (BLE notify)│
//!                                        │            └─────────────┘
//!                                        └─ stats log every 10 s
//! ```
//!
//! The pump is the single consumer the scheduler is designed around; it
//! never blocks on urgent tiers and clears all queues on link teardown.
//! Inbound control-characteristic writes travel the other way through the
//! bounded channel in [`channels`].

pub mod channels;
pub mod pump;
pub mod transport;

pub use pump::LinkPump;
pub use transport::{NullLink, RadioLink};
