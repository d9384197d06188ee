//! Radio transport abstraction.
//!
//! Concrete implementations:
//! - BLE GATT notifications (the production path, `adapters::ble`)
//! - Host simulation recording frames for tests
//!
//! The pump is generic over `RadioLink`, so swapping the transport
//! requires zero changes to the drain logic.

use crate::error::LinkError;
use crate::telemetry::Packet;

/// A byte-budgeted, connection-oriented radio sink.
pub trait RadioLink {
    /// True while a client is connected and subscribed.
    fn connected(&self) -> bool;

    /// Largest payload one transmission can carry (MTU-derived).  Packets
    /// from the scheduler are already sized to fit the BLE maximum; a
    /// transport with a smaller budget must reject, not fragment.
    fn max_payload(&self) -> usize;

    /// Transmit one packet.  Non-blocking; a failed transmission is
    /// dropped by the caller, never retried.
    fn send(&mut self, packet: &Packet) -> Result<(), LinkError>;
}

/// A null link that is never connected and discards nothing because
/// nothing ever reaches it.  Default when no radio is wired up.
pub struct NullLink;

impl RadioLink for NullLink {
    fn connected(&self) -> bool {
        false
    }

    fn max_payload(&self) -> usize {
        crate::telemetry::MAX_PAYLOAD
    }

    fn send(&mut self, _packet: &Packet) -> Result<(), LinkError> {
        Err(LinkError::NotConnected)
    }
}
