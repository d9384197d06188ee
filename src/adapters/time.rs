//! ESP32 time adapter.
//!
//! Provides monotonic time queries for the beacon.
//!
//! - **`target_os = "espidf"`** — wraps `esp_timer_get_time()` from the
//!   ESP-IDF high-resolution timer (microsecond precision, monotonic).
//! - **`not(target_os = "espidf")`** — uses `std::time::Instant` for
//!   host-side testing and simulation.
//!
//! Millisecond timestamps are deliberately `u32`: they wrap after ~49
//! days, and every consumer compares with `wrapping_sub`.

/// Monotonic clock for the ESP32-C3 platform.
pub struct MonotonicClock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Milliseconds since boot, truncated to u32 (wrapping).
    pub fn now_ms(&self) -> u32 {
        (self.uptime_us() / 1000) as u32
    }

    /// Seconds since boot (monotonic).
    pub fn uptime_secs(&self) -> u64 {
        self.uptime_us() / 1_000_000
    }

    /// Microseconds since boot (monotonic).
    #[cfg(target_os = "espidf")]
    pub fn uptime_us(&self) -> u64 {
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64
    }

    /// Microseconds since boot (monotonic).
    #[cfg(not(target_os = "espidf"))]
    pub fn uptime_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_is_monotonic() {
        let clock = MonotonicClock::new();
        let a = clock.uptime_us();
        let b = clock.uptime_us();
        assert!(b >= a);
    }

    #[test]
    fn now_ms_tracks_uptime() {
        let clock = MonotonicClock::new();
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(clock.now_ms() >= 5);
    }
}
