//! The packet — the unit of data moved through the scheduler.
//!
//! Payloads are copied into the packet at construction so producers can
//! reuse their scratch buffers the moment an enqueue call returns.  A
//! packet is immutable after construction and already sized for a single
//! transport message; the link layer never needs to fragment.

extern crate alloc;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

/// Maximum payload for one packet: BLE MTU 247 minus the 3-byte ATT
/// notification header.
pub const MAX_PAYLOAD: usize = 244;

/// Maximum alert message length in bytes, excluding the NUL terminator.
pub const MAX_ALERT_LEN: usize = 31;

/// Priority tier.  Fixed at packet construction; determines queue placement
/// and drain order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    /// Alerts (fall, heart-stop, manual) — drained before everything else.
    Critical,
    /// Vital signs — guaranteed ahead of bulk audio.
    High,
    /// Compressed audio — fills whatever bandwidth remains.
    Normal,
}

impl Tier {
    /// Short label for log lines.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Critical => "CRIT",
            Self::High => "HIGH",
            Self::Normal => "NORM",
        }
    }
}

/// What the payload contains — tells the receiving side how to interpret it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PacketKind {
    Alert,
    HeartRate,
    Audio,
}

/// One telemetry packet.
///
/// `timestamp_ms` is the monotonic creation time and exists for diagnostics
/// only — ordering is entirely determined by tier and queue position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Packet {
    pub tier: Tier,
    pub kind: PacketKind,
    pub timestamp_ms: u32,
    pub payload: heapless::Vec<u8, MAX_PAYLOAD>,
}

impl Packet {
    /// Build a CRITICAL alert packet.  The message is truncated to
    /// [`MAX_ALERT_LEN`] bytes and NUL-terminated so downstream log
    /// consumers can always treat it as a printable C string.
    pub fn alert(message: &str, timestamp_ms: u32) -> Self {
        let bytes = message.as_bytes();
        let take = bytes.len().min(MAX_ALERT_LEN);

        let mut payload = heapless::Vec::new();
        // Truncated above, so neither push can overflow the payload buffer.
        let _ = payload.extend_from_slice(&bytes[..take]);
        let _ = payload.push(0);

        Self {
            tier: Tier::Critical,
            kind: PacketKind::Alert,
            timestamp_ms,
            payload,
        }
    }

    /// Build a HIGH-tier heart-rate packet (single BPM byte).
    pub fn heart_rate(bpm: u8, timestamp_ms: u32) -> Self {
        let mut payload = heapless::Vec::new();
        let _ = payload.push(bpm);

        Self {
            tier: Tier::High,
            kind: PacketKind::HeartRate,
            timestamp_ms,
            payload,
        }
    }

    /// Build a NORMAL-tier audio packet.  Chunks longer than
    /// [`MAX_PAYLOAD`] are truncated to fit one transport message.
    pub fn audio(chunk: &[u8], timestamp_ms: u32) -> Self {
        let take = chunk.len().min(MAX_PAYLOAD);

        let mut payload = heapless::Vec::new();
        let _ = payload.extend_from_slice(&chunk[..take]);

        Self {
            tier: Tier::Normal,
            kind: PacketKind::Audio,
            timestamp_ms,
            payload,
        }
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Encode for the radio link (postcard wire format).
    pub fn to_wire(&self) -> postcard::Result<Vec<u8>> {
        postcard::to_allocvec(self)
    }

    /// Decode a packet received off the wire.
    pub fn from_wire(bytes: &[u8]) -> postcard::Result<Self> {
        postcard::from_bytes(bytes)
    }
}

// ── Tests ────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alert_is_nul_terminated() {
        let p = Packet::alert("FALL", 123);
        assert_eq!(p.tier, Tier::Critical);
        assert_eq!(p.kind, PacketKind::Alert);
        assert_eq!(p.payload.as_slice(), b"FALL\0");
    }

    #[test]
    fn alert_truncates_long_message() {
        let long = "X".repeat(100);
        let p = Packet::alert(&long, 0);
        assert_eq!(p.len(), MAX_ALERT_LEN + 1);
        assert_eq!(p.payload[MAX_ALERT_LEN], 0);
    }

    #[test]
    fn heart_rate_is_one_byte() {
        let p = Packet::heart_rate(72, 5);
        assert_eq!(p.tier, Tier::High);
        assert_eq!(p.payload.as_slice(), &[72]);
    }

    #[test]
    fn audio_truncates_to_transport_payload() {
        let big = vec![0xAB; 400];
        let p = Packet::audio(&big, 0);
        assert_eq!(p.len(), MAX_PAYLOAD);
        assert!(p.payload.iter().all(|&b| b == 0xAB));
    }

    #[test]
    fn wire_roundtrip() {
        let p = Packet::audio(&[1, 2, 3, 4], 99);
        let wire = p.to_wire().unwrap();
        let back = Packet::from_wire(&wire).unwrap();
        assert_eq!(back.tier, p.tier);
        assert_eq!(back.kind, p.kind);
        assert_eq!(back.timestamp_ms, 99);
        assert_eq!(back.payload, p.payload);
    }

    #[test]
    fn wire_decode_rejects_garbage() {
        assert!(Packet::from_wire(&[0xFF, 0xFF, 0xFF]).is_err());
    }
}
