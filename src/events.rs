//! Interrupt-driven event system.
//!
//! Events are produced by:
//! - Sensor tasks (fall spike confirmed, heart-stop timeout, wear edges)
//! - The button ISR path (manual alert, false-alarm cancel)
//! - BLE stack callbacks (client connect / disconnect)
//!
//! Events are consumed by the main control loop, which processes them one
//! at a time.  This replaces the function-pointer callback mesh of a
//! typical Arduino firmware: producers publish typed events, and the loop
//! is the single subscriber that fans them out.
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Sensor tasks │────▶│              │     │              │
//! │ Button ISR   │────▶│  Event Queue │────▶│  Main Loop   │
//! │ BLE callbacks│────▶│  (lock-free) │     │  (consumer)  │
//! └──────────────┘     └──────────────┘     └──────────────┘
//! ```

use core::sync::atomic::{AtomicU8, Ordering};

/// Maximum number of pending events.
/// Power of 2 for efficient ring buffer modulo.
const EVENT_QUEUE_CAP: usize = 32;

/// System event types, ordered by rough priority.
/// Lower discriminant = more urgent when several are pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Event {
    // ── Life-critical (highest priority) ──────────────────
    /// Fall detector confirmed a spike-then-stationary pattern.
    FallDetected       = 0,
    /// No heartbeat for the configured timeout while worn.
    HeartStopDetected  = 1,
    /// Wearer pressed the alert button once.
    ManualAlert        = 2,
    /// Double press — cancel the pending alert.
    FalseAlarmCancel   = 3,

    // ── Wear state ────────────────────────────────────────
    /// Device is on the wearer's body again.
    WearOn             = 10,
    /// Device was removed.
    WearOff            = 11,

    // ── Link ──────────────────────────────────────────────
    /// BLE client connected.
    LinkConnected      = 20,
    /// BLE client disconnected — pending packets are discarded.
    LinkDisconnected   = 21,

    // ── Power management ──────────────────────────────────
    /// Motion above the wake threshold during a sleep check.
    MotionWake         = 30,
}

// ── Lock-free SPSC ring buffer ────────────────────────────────
//
// ISR/callback contexts write (produce), main loop reads (consume).
// Uses atomic head/tail indices.  The buffer is intentionally kept in a
// static so C-callback contexts (which cannot capture closures) can
// reach it.

static EVENT_HEAD: AtomicU8 = AtomicU8::new(0);
static EVENT_TAIL: AtomicU8 = AtomicU8::new(0);
// SAFETY: EVENT_BUFFER is accessed exclusively through the SPSC indices
// above.  Producer (push_event): ISR / BLE-callback context — one writer.
// Consumer (pop_event): main-loop task — one reader.  The Acquire/Release
// pairs on head/tail order the data accesses.
static mut EVENT_BUFFER: [u8; EVENT_QUEUE_CAP] = [0; EVENT_QUEUE_CAP];

/// Push an event into the queue.
/// Safe to call from ISR context (lock-free).
/// Returns `false` if the queue is full (event dropped).
pub fn push_event(event: Event) -> bool {
    let head = EVENT_HEAD.load(Ordering::Relaxed);
    let tail = EVENT_TAIL.load(Ordering::Acquire);
    let next_head = (head + 1) % EVENT_QUEUE_CAP as u8;

    if next_head == tail {
        return false; // Queue full — drop event.
    }

    // SAFETY: single producer; slot `head` is not visible to the consumer
    // until the Release store below.
    unsafe {
        EVENT_BUFFER[head as usize] = event as u8;
    }

    EVENT_HEAD.store(next_head, Ordering::Release);
    true
}

/// Pop the next event from the queue.
/// Called from the main loop (single consumer).
/// Returns `None` if the queue is empty.
pub fn pop_event() -> Option<Event> {
    let tail = EVENT_TAIL.load(Ordering::Relaxed);
    let head = EVENT_HEAD.load(Ordering::Acquire);

    if tail == head {
        return None; // Empty.
    }

    let raw = unsafe { EVENT_BUFFER[tail as usize] };
    EVENT_TAIL.store((tail + 1) % EVENT_QUEUE_CAP as u8, Ordering::Release);

    event_from_u8(raw)
}

/// Drain all pending events into a callback, FIFO order.
pub fn drain_events(mut handler: impl FnMut(Event)) {
    while let Some(event) = pop_event() {
        handler(event);
    }
}

/// Check if the event queue is empty.
pub fn queue_is_empty() -> bool {
    let tail = EVENT_TAIL.load(Ordering::Relaxed);
    let head = EVENT_HEAD.load(Ordering::Acquire);
    tail == head
}

/// Number of pending events.
pub fn queue_len() -> usize {
    let head = EVENT_HEAD.load(Ordering::Relaxed) as usize;
    let tail = EVENT_TAIL.load(Ordering::Relaxed) as usize;
    (head + EVENT_QUEUE_CAP - tail) % EVENT_QUEUE_CAP
}

// ── Internal ──────────────────────────────────────────────────

fn event_from_u8(raw: u8) -> Option<Event> {
    match raw {
        0  => Some(Event::FallDetected),
        1  => Some(Event::HeartStopDetected),
        2  => Some(Event::ManualAlert),
        3  => Some(Event::FalseAlarmCancel),
        10 => Some(Event::WearOn),
        11 => Some(Event::WearOff),
        20 => Some(Event::LinkConnected),
        21 => Some(Event::LinkDisconnected),
        30 => Some(Event::MotionWake),
        _  => None,
    }
}
