//! ISR-debounced alert button with single and double press detection.
//!
//! ## Hardware
//!
//! Active-low momentary switch with external pull-up.  GPIO fires on the
//! falling edge; the ISR records the raw timestamp into an atomic, and the
//! `tick()` method (called from the main loop at control-tick rate) runs
//! the debounce + gesture state machine.
//!
//! ## Gestures
//!
//! | Gesture      | Condition                          | Meaning              |
//! |--------------|------------------------------------|----------------------|
//! | Single press | no second press within 1000 ms     | raise a manual alert |
//! | Double press | second press inside the window     | cancel (false alarm) |
//!
//! The single press deliberately waits out the double-press window before
//! firing: the cancel gesture must be able to pre-empt the alert.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::config::BeaconConfig;

/// Raw ISR timestamp (milliseconds since boot, truncated to u32).
/// Written by the ISR, read by the main loop.  Zero means "never pressed".
static BUTTON_ISR_TIMESTAMP: AtomicU32 = AtomicU32::new(0);

/// Called from the GPIO ISR on each falling edge.
/// Lock-free — safe in interrupt context.
pub fn button_isr_handler(now_ms: u32) {
    // Avoid the "never pressed" sentinel on a wrap-exact tick.
    BUTTON_ISR_TIMESTAMP.store(now_ms.max(1), Ordering::Release);
}

/// Classified button gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    /// Single press — wearer requests help.
    ManualAlert,
    /// Double press — cancel the pending alert.
    FalseAlarm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GestureState {
    Idle,
    DebounceWait { since_ms: u32 },
    WaitSecondPress { first_press_ms: u32 },
}

pub struct AlertButton {
    debounce_ms: u32,
    double_window_ms: u32,
    state: GestureState,
    last_isr_ms: u32,
}

impl AlertButton {
    pub fn new(config: &BeaconConfig) -> Self {
        Self {
            debounce_ms: config.button_debounce_ms,
            double_window_ms: config.double_press_window_ms,
            state: GestureState::Idle,
            last_isr_ms: 0,
        }
    }

    /// Call from the main loop at each control tick.
    /// `now_ms` is the current monotonic time in milliseconds.
    pub fn tick(&mut self, now_ms: u32) -> Option<ButtonEvent> {
        let isr_ms = BUTTON_ISR_TIMESTAMP.load(Ordering::Acquire);
        self.apply(now_ms, isr_ms)
    }

    /// Gesture state machine, fed the latest ISR timestamp explicitly so
    /// it can be exercised without the static.
    fn apply(&mut self, now_ms: u32, isr_ms: u32) -> Option<ButtonEvent> {
        let new_press = isr_ms != self.last_isr_ms && isr_ms != 0;

        match self.state {
            GestureState::Idle => {
                if new_press {
                    self.last_isr_ms = isr_ms;
                    self.state = GestureState::DebounceWait { since_ms: now_ms };
                }
                None
            }

            GestureState::DebounceWait { since_ms } => {
                if now_ms.wrapping_sub(since_ms) >= self.debounce_ms {
                    self.state = GestureState::WaitSecondPress {
                        first_press_ms: since_ms,
                    };
                }
                None
            }

            GestureState::WaitSecondPress { first_press_ms } => {
                if new_press {
                    self.last_isr_ms = isr_ms;
                    if now_ms.wrapping_sub(first_press_ms) <= self.double_window_ms {
                        self.state = GestureState::Idle;
                        return Some(ButtonEvent::FalseAlarm);
                    }
                    // Stale press past the window — restart as a fresh first
                    // press; the expired single fires below on a later tick.
                    self.state = GestureState::DebounceWait { since_ms: now_ms };
                    return Some(ButtonEvent::ManualAlert);
                }

                if now_ms.wrapping_sub(first_press_ms) > self.double_window_ms {
                    self.state = GestureState::Idle;
                    return Some(ButtonEvent::ManualAlert);
                }
                None
            }
        }
    }
}

// ── Tests ────────────────────────────────────────────────────
