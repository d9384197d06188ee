//! Sensor decision logic — pure state machines over raw peripheral reads.
//!
//! Raw bus traffic (I2C to the pulse-oximeter and IMU) lives behind the
//! port traits in [`crate::app::ports`]; the monitors here consume plain
//! numbers and timestamps, so every detection path runs identically under
//! host tests and on the device.
//!
//! | Monitor            | Input                 | Produces                  |
//! |--------------------|-----------------------|---------------------------|
//! | `HeartRateMonitor` | IR level + beat flag  | 1 Hz BPM, heart-stop edge |
//! | `FallDetector`     | accel magnitude       | fall edge, motion wake    |
//! | `WearDetector`     | IR level              | debounced worn/off edges  |

pub mod fall;
pub mod heart_rate;
pub mod wear;

pub use fall::FallDetector;
pub use heart_rate::{HeartRateMonitor, HrEvent};
pub use wear::WearDetector;
