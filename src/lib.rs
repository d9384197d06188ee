//! Beacon firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection.  All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module, so the telemetry
//! scheduler, the ADPCM codec and every sensor state machine build and
//! test on the host.

#![deny(unused_must_use)]

pub mod app;
pub mod audio;
pub mod config;
pub mod drivers;
pub mod error;
pub mod events;
pub mod link;
pub mod power;
pub mod sensors;
pub mod telemetry;

pub mod adapters;
pub mod pins;

mod esp_link_shims;
