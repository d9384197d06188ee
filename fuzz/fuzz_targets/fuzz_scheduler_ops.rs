//! Fuzz target: `TelemetryScheduler` operation sequences
//!
//! Interprets the input bytes as a little op-code program of enqueues,
//! dequeues and rate changes, and asserts the scheduler's invariants:
//! - No panics under any interleaving
//! - Queue depths never exceed their capacities
//! - A dequeued packet never outranks one still waiting in a higher tier
//!
//! cargo fuzz run fuzz_scheduler_ops

#![no_main]

use beacon::telemetry::scheduler::{
    CRITICAL_QUEUE_CAP, HIGH_QUEUE_CAP, NORMAL_QUEUE_CAP,
};
use beacon::telemetry::{TelemetryScheduler, Tier};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let scheduler = TelemetryScheduler::new(1000);
    let mut now_ms: u32 = 0;

    for op in data.chunks(2) {
        let arg = op.get(1).copied().unwrap_or(0);
        match op[0] % 6 {
            0 => {
                let _ = scheduler.enqueue_alert("FALL", now_ms);
            }
            1 => {
                let _ = scheduler.enqueue_heart_rate(arg, now_ms);
            }
            2 => {
                let _ = scheduler.enqueue_audio(&[arg; 64], now_ms);
            }
            3 => {
                if let Some(packet) = scheduler.next_packet(0) {
                    // Strict priority: nothing more urgent may remain.
                    match packet.tier {
                        Tier::Critical => {}
                        Tier::High => assert_eq!(scheduler.depth(Tier::Critical), 0),
                        Tier::Normal => {
                            assert_eq!(scheduler.depth(Tier::Critical), 0);
                            assert_eq!(scheduler.depth(Tier::High), 0);
                        }
                    }
                }
            }
            4 => scheduler.set_audio_rate_limit(u16::from(arg).max(1)),
            _ => now_ms = now_ms.wrapping_add(u32::from(arg) * 10),
        }

        assert!(scheduler.depth(Tier::Critical) <= CRITICAL_QUEUE_CAP);
        assert!(scheduler.depth(Tier::High) <= HIGH_QUEUE_CAP);
        assert!(scheduler.depth(Tier::Normal) <= NORMAL_QUEUE_CAP);
    }
});
