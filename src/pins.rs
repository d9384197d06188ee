//! GPIO / peripheral pin assignments for the beacon main board (ESP32-C3).
//!
//! Single source of truth — every adapter references this module rather
//! than hard-coding pin numbers.  Change a pin here and it propagates
//! everywhere.

// ---------------------------------------------------------------------------
// I²C bus (MAX30105 pulse-oximeter, BNO085 IMU)
// ---------------------------------------------------------------------------

pub const I2C_SDA: i32 = 8;
pub const I2C_SCL: i32 = 9;

/// MAX30105 heart-rate / IR sensor address.
pub const MAX30105_ADDR: u8 = 0x57;
/// BNO085 IMU address (default strap).
pub const BNO085_ADDR: u8 = 0x4A;
/// BNO085 IMU address (alternate strap).
pub const BNO085_ADDR_ALT: u8 = 0x4B;

// ---------------------------------------------------------------------------
// I²S MEMS microphone (INMP441 / ICS-43434)
// ---------------------------------------------------------------------------

/// Word select (LRCLK).
pub const I2S_WS: i32 = 7;
/// Bit clock (BCLK).
pub const I2S_SCK: i32 = 5;
/// Serial data in (microphone DOUT).
pub const I2S_SD: i32 = 6;

// ---------------------------------------------------------------------------
// Alert button (active-low with external pull-up)
// ---------------------------------------------------------------------------

/// Momentary push-button: single press = manual alert, double = cancel.
/// Also a GPIO wake source for light/deep sleep.
pub const BUTTON: i32 = 3;
