//! Power state machine — wear-driven sleep management.
//!
//! ```text
//!        device removed            60 s not worn          checks pass
//! ACTIVE ───────────────▶ WORN_CHECK ─────────▶ TRANSITION_SLEEP ─────▶ LIGHT_SLEEP
//!   ▲                        │ worn again           │ worn / motion        │ wake
//!   └────────────────────────┴──────────────────────┴──────────────────────┘
//!
//! ACTIVE + no link + idle 30 s ──▶ DEEP_SLEEP (chip resets on wake)
//! ```
//!
//! The machine produces [`PowerAction`] values; the main loop applies them
//! (dim sensors, stop the radio, call the SoC sleep API).  A 30-second
//! grace period after boot suppresses every sleep transition so a fresh
//! strap-on never fights the power manager.

use log::{info, warn};

use crate::config::BeaconConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerState {
    /// Normal operation — all sensors active.
    Active,
    /// Not worn — counting down before any sleep preparation.
    WornCheck,
    /// Countdown elapsed — final checks before sleeping.
    TransitionSleep,
    /// Asleep with periodic wake checks.  The main loop never runs here;
    /// seeing this state in `update` means a missed wake path.
    LightSleep,
    /// No link and idle — deepest mode, exits via chip reset.
    DeepSleep,
}

/// What the main loop must do as a result of a state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerAction {
    /// Dim sensors, stop the radio, enter light sleep.
    EnterLightSleep,
    /// Power everything down; wake is a fresh boot.
    EnterDeepSleep,
}

pub struct PowerManager {
    state: PowerState,
    startup_ms: u32,
    last_activity_ms: u32,
    not_worn_since_ms: u32,
    last_countdown_log_ms: u32,

    grace_ms: u32,
    not_worn_timeout_ms: u32,
    idle_deep_sleep_ms: u32,
}

impl PowerManager {
    pub fn new(config: &BeaconConfig, now_ms: u32) -> Self {
        Self {
            state: PowerState::Active,
            startup_ms: now_ms,
            last_activity_ms: now_ms,
            not_worn_since_ms: 0,
            last_countdown_log_ms: 0,
            grace_ms: config.startup_grace_ms,
            not_worn_timeout_ms: config.not_worn_timeout_ms,
            idle_deep_sleep_ms: config.idle_deep_sleep_ms,
        }
    }

    pub fn state(&self) -> PowerState {
        self.state
    }

    /// Note wearer/link activity — defers the deep-sleep idle timeout.
    pub fn record_activity(&mut self, now_ms: u32) {
        self.last_activity_ms = now_ms;
    }

    /// Run the state machine.  `motion` is the current motion-wake check
    /// result from the IMU path.
    pub fn update(
        &mut self,
        now_ms: u32,
        link_connected: bool,
        worn: bool,
        motion: bool,
    ) -> Option<PowerAction> {
        // Startup grace: no sleep decisions while the wearer settles in.
        if now_ms.wrapping_sub(self.startup_ms) < self.grace_ms {
            return None;
        }

        match self.state {
            PowerState::Active => {
                if !worn {
                    self.not_worn_since_ms = now_ms;
                    self.last_countdown_log_ms = now_ms;
                    self.state = PowerState::WornCheck;
                    info!("power: device removed, starting low-power countdown");
                } else if self.idle_for_deep_sleep(now_ms, link_connected) {
                    self.state = PowerState::DeepSleep;
                    info!("power: no link and idle — deep sleep");
                    return Some(PowerAction::EnterDeepSleep);
                }
                None
            }

            PowerState::WornCheck => {
                if worn {
                    self.state = PowerState::Active;
                    info!("power: worn again, countdown cancelled");
                    return None;
                }
                let elapsed = now_ms.wrapping_sub(self.not_worn_since_ms);
                if elapsed >= self.not_worn_timeout_ms {
                    self.state = PowerState::TransitionSleep;
                    info!("power: countdown elapsed, preparing for sleep");
                } else if now_ms.wrapping_sub(self.last_countdown_log_ms) >= 10_000 {
                    self.last_countdown_log_ms = now_ms;
                    info!(
                        "power: {} s until low power",
                        (self.not_worn_timeout_ms - elapsed) / 1000
                    );
                }
                None
            }

            PowerState::TransitionSleep => {
                if worn {
                    self.state = PowerState::Active;
                    info!("power: sleep aborted — worn again");
                    None
                } else if motion {
                    self.state = PowerState::Active;
                    info!("power: sleep aborted — motion detected");
                    None
                } else {
                    self.state = PowerState::LightSleep;
                    Some(PowerAction::EnterLightSleep)
                }
            }

            PowerState::LightSleep => {
                // The wake path should have gone through `wake()` first.
                warn!("power: update while in light sleep — forcing ACTIVE");
                self.wake(now_ms);
                None
            }

            PowerState::DeepSleep => None,
        }
    }

    /// Return to ACTIVE after a sleep wake (button, timer or motion).
    /// The caller restores sensors and restarts the radio.
    pub fn wake(&mut self, now_ms: u32) {
        self.state = PowerState::Active;
        self.last_activity_ms = now_ms;
        info!("power: awake and operational");
    }

    fn idle_for_deep_sleep(&self, now_ms: u32, link_connected: bool) -> bool {
        !link_connected && now_ms.wrapping_sub(self.last_activity_ms) > self.idle_deep_sleep_ms
    }
}

// ── Tests ────────────────────────────────────────────────────
