//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ BeaconService (domain)
//! ```
//!
//! Driven adapters (pulse-oximeter, IMU, microphone, event sinks)
//! implement these traits.  The [`BeaconService`](super::service::BeaconService)
//! consumes them via generics, so the domain core never touches hardware
//! directly — the scheduler and codec stay testable on the host.

use crate::error::Result;

// ───────────────────────────────────────────────────────────────
// Vital signs port (driven adapter: pulse-oximeter → domain)
// ───────────────────────────────────────────────────────────────

/// One pulse-oximeter reading.  Peak detection runs in the driver; the
/// domain only consumes the outcome.
#[derive(Debug, Clone, Copy)]
pub struct VitalsSample {
    /// Raw IR reflectance — doubles as the wear-detection input.
    pub ir: f32,
    /// True if the driver's peak detector confirmed a beat on this read.
    pub beat: bool,
}

/// Read-side port for the heart-rate/wear sensor.
pub trait VitalSignsPort {
    /// Take one sample.  Implementations should be non-blocking.
    fn sample(&mut self) -> Result<VitalsSample>;
}

// ───────────────────────────────────────────────────────────────
// Motion port (driven adapter: IMU → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port for the IMU's linear acceleration stream.
pub trait MotionPort {
    /// Current linear-acceleration magnitude in m/s².
    fn accel_magnitude(&mut self) -> Result<f32>;
}

// ───────────────────────────────────────────────────────────────
// Audio capture port (driven adapter: microphone DMA → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port for the I2S microphone.
pub trait AudioCapturePort {
    /// Read up to `buf.len()` samples from the capture DMA.  Returns the
    /// number of samples written; `0` means no data was ready.
    fn read_samples(&mut self, buf: &mut [i16]) -> Result<usize>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`BeaconEvent`](super::events::BeaconEvent)s
/// through this port.  Adapters decide where they go (serial log, BLE
/// status characteristic, etc.); multiple sinks can be layered.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::BeaconEvent);
}
