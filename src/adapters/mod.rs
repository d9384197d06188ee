//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements        | Connects to                   |
//! |------------|-------------------|-------------------------------|
//! | `ble`      | RadioLink         | Bluedroid GATT server         |
//! | `hardware` | VitalSignsPort    | vendor sensor task (atomics)  |
//! |            | MotionPort        |                               |
//! | `mic`      | AudioCapturePort  | ESP32 I2S DMA / scripted sim  |
//! | `log_sink` | EventSink         | Serial log output             |
//! | `time`     | monotonic clock   | ESP32 system timer / Instant  |

pub mod ble;
pub mod hardware;
pub mod log_sink;
pub mod mic;
pub mod time;
