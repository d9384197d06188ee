//! Fuzz target: `Packet::from_wire`
//!
//! Drives arbitrary byte sequences into the wire decoder and asserts it
//! never panics and that every accepted packet re-encodes losslessly.
//!
//! cargo fuzz run fuzz_wire_decode

#![no_main]

use beacon::telemetry::{Packet, MAX_PAYLOAD};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(packet) = Packet::from_wire(data) {
        // Accepted packets must respect the payload bound...
        assert!(packet.len() <= MAX_PAYLOAD);

        // ...and survive a round trip bit-for-bit.
        let rewired = packet.to_wire().expect("re-encode accepted packet");
        let again = Packet::from_wire(&rewired).expect("decode own encoding");
        assert_eq!(again.tier, packet.tier);
        assert_eq!(again.kind, packet.kind);
        assert_eq!(again.timestamp_ms, packet.timestamp_ms);
        assert_eq!(again.payload, packet.payload);
    }
});
