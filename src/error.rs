//! Unified error types for the beacon firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! top-level loop's error handling uniform.  All variants are `Copy` so they
//! can be passed through the control loop without allocation.
//!
//! Note the deliberate asymmetry with the scheduler: admission rejections
//! (queue full, rate-limited) are *not* errors — they are expected load
//! shedding, reported as `bool` plus drop counters.  This type covers the
//! genuinely exceptional paths: peripheral reads and the radio link.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A sensor could not be read or returned out-of-range data.
    Sensor(SensorError),
    /// The radio link failed.
    Link(LinkError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Link(e) => write!(f, "link: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// I2C transaction with the pulse-oximeter or IMU failed.
    I2cReadFailed,
    /// I2S DMA read returned an error or timed out.
    I2sReadFailed,
    /// Reading is outside the physically plausible range.
    OutOfRange,
    /// Sensor has not completed its power-up sequence.
    NotReady,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::I2cReadFailed => write!(f, "I2C read failed"),
            Self::I2sReadFailed => write!(f, "I2S read failed"),
            Self::OutOfRange => write!(f, "reading out of range"),
            Self::NotReady => write!(f, "sensor not ready"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Link errors
// ---------------------------------------------------------------------------

/// Radio-link failures reported by [`RadioLink`](crate::link::transport::RadioLink)
/// implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// No client is connected; nothing can be notified.
    NotConnected,
    /// Packet payload exceeds the negotiated MTU budget.
    PayloadTooLarge,
    /// The BLE stack rejected the notification.
    TxFailed,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected => write!(f, "not connected"),
            Self::PayloadTooLarge => write!(f, "payload too large"),
            Self::TxFailed => write!(f, "transmit failed"),
        }
    }
}

impl From<LinkError> for Error {
    fn from(e: LinkError) -> Self {
        Self::Link(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
