//! Hardware bridge — vendor sensor drivers to domain port traits.
//!
//! The MAX30105 pulse-oximeter and BNO085 IMU are serviced by their
//! vendor driver components on a dedicated acquisition task; peak
//! detection and sensor fusion stay inside those drivers.  The task
//! publishes each reading through the exported C hooks below into
//! lock-free atomics, and the port implementations here sample the
//! atomics from the control loop — the same ISR-bridge pattern the
//! button driver uses.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::app::ports::{MotionPort, VitalSignsPort, VitalsSample};
use crate::error::Result;

/// Latest IR reflectance from the pulse-oximeter (raw counts).
static LATEST_IR: AtomicU32 = AtomicU32::new(0);
/// Set by the driver when its peak detector confirms a beat; consumed by
/// the next `sample()`.
static BEAT_PENDING: AtomicBool = AtomicBool::new(false);
/// Latest linear-acceleration magnitude in milli-m/s².
static LATEST_ACCEL_MMS2: AtomicU32 = AtomicU32::new(0);

/// Called by the acquisition task for every pulse-oximeter read.
/// Lock-free — safe from any task or callback context.
#[no_mangle]
pub extern "C" fn beacon_on_ir_sample(ir_raw: u32, beat_detected: bool) {
    LATEST_IR.store(ir_raw, Ordering::Release);
    if beat_detected {
        BEAT_PENDING.store(true, Ordering::Release);
    }
}

/// Called by the acquisition task for every IMU linear-acceleration
/// report (magnitude in milli-m/s²).
#[no_mangle]
pub extern "C" fn beacon_on_accel_sample(magnitude_mms2: u32) {
    LATEST_ACCEL_MMS2.store(magnitude_mms2, Ordering::Release);
}

/// [`VitalSignsPort`] over the published pulse-oximeter readings.
pub struct HardwareVitals;

impl HardwareVitals {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HardwareVitals {
    fn default() -> Self {
        Self::new()
    }
}

impl VitalSignsPort for HardwareVitals {
    fn sample(&mut self) -> Result<VitalsSample> {
        Ok(VitalsSample {
            ir: LATEST_IR.load(Ordering::Acquire) as f32,
            beat: BEAT_PENDING.swap(false, Ordering::AcqRel),
        })
    }
}

/// [`MotionPort`] over the published IMU readings.
pub struct HardwareMotion;

impl HardwareMotion {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HardwareMotion {
    fn default() -> Self {
        Self::new()
    }
}

impl MotionPort for HardwareMotion {
    fn accel_magnitude(&mut self) -> Result<f32> {
        Ok(LATEST_ACCEL_MMS2.load(Ordering::Acquire) as f32 / 1000.0)
    }
}

// ── Tests ────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // One test exercises the whole bridge: the atomics are process-wide.
    #[test]
    fn hooks_publish_to_ports() {
        beacon_on_ir_sample(42_000, true);
        beacon_on_accel_sample(9_810);

        let mut vitals = HardwareVitals::new();
        let s = vitals.sample().unwrap();
        assert!((s.ir - 42_000.0).abs() < f32::EPSILON);
        assert!(s.beat);

        // The beat flag is consumed by the read.
        assert!(!vitals.sample().unwrap().beat);

        let mut motion = HardwareMotion::new();
        assert!((motion.accel_magnitude().unwrap() - 9.81).abs() < 0.001);
    }
}
