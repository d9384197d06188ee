//! IR-based wear detection with hysteresis and debounce.
//!
//! The pulse-oximeter's IR channel doubles as a skin-contact sensor: high
//! reflectance means the device sits on the wearer.  Two thresholds leave
//! a dead band so borderline readings hold the current state, and a state
//! change must persist through the debounce window before it is committed
//! — a sleeve brushing the sensor must not bounce the power manager.

use log::info;

use crate::config::BeaconConfig;

pub struct WearDetector {
    ir_high: f32,
    ir_low: f32,
    check_interval_ms: u32,
    debounce_ms: u32,

    last_check_ms: Option<u32>,
    worn: bool,
    /// A state change waiting out the debounce window: (target, since).
    pending: Option<(bool, u32)>,
}

impl WearDetector {
    pub fn new(config: &BeaconConfig) -> Self {
        Self {
            ir_high: config.wear_ir_high,
            ir_low: config.wear_ir_low,
            check_interval_ms: config.wear_check_interval_ms,
            debounce_ms: config.wear_debounce_ms,
            last_check_ms: None,
            // Assume worn at boot — the wearer just strapped it on.
            worn: true,
            pending: None,
        }
    }

    pub fn is_worn(&self) -> bool {
        self.worn
    }

    /// Feed one IR reading.  Returns `Some(new_state)` when a debounced
    /// wear change commits; steady states and in-band readings are `None`.
    pub fn update(&mut self, now_ms: u32, ir_value: f32) -> Option<bool> {
        if let Some(last) = self.last_check_ms {
            if now_ms.wrapping_sub(last) < self.check_interval_ms {
                return None;
            }
        }
        self.last_check_ms = Some(now_ms);

        // Hysteresis: readings inside the dead band hold the current state.
        let observed = if ir_value > self.ir_high {
            true
        } else if ir_value < self.ir_low {
            false
        } else {
            self.worn
        };

        if observed == self.worn {
            self.pending = None;
            return None;
        }

        match self.pending {
            Some((target, since)) if target == observed => {
                if now_ms.wrapping_sub(since) >= self.debounce_ms {
                    self.worn = observed;
                    self.pending = None;
                    info!("wear state: {}", if observed { "worn" } else { "removed" });
                    return Some(observed);
                }
            }
            _ => {
                self.pending = Some((observed, now_ms));
            }
        }
        None
    }
}

// ── Tests ────────────────────────────────────────────────────
