//! Handover - tap-triggered Bluetooth peripheral pairing
//!
//! This library turns the out-of-band (OOB) descriptor read from an NFC tag into a
//! paired and connected Bluetooth peripheral. It covers the NDEF container and the
//! connection-handover records that carry the descriptor, the Bluetooth classic, LE and
//! legacy OOB sub-formats, handover request/select negotiation, and the pairing session
//! that bonds with the peer and connects its audio or input profiles.
//! The radio stack and the host device are reached through traits, so the same session
//! logic runs against a real stack or a test double.

pub mod config;
pub mod error;
pub mod gap;
pub mod ndef;
pub mod negotiator;
pub mod oob;
pub mod pairing;
pub mod service;
pub mod timer;
pub mod uuid;

// Re-export common types for convenience
pub use config::HandoverConfig;
pub use error::{HandoverError, Result, StartError};
pub use gap::{AddressType, BdAddr, DeviceClass, Transport};
pub use ndef::{NdefMessage, NdefRecord, Tnf};
pub use negotiator::{HandoverNegotiator, LocalAdapter};
pub use oob::{decode, encode, HandoverRecord, OobPairingMaterial};
pub use pairing::{
    HostSurface, PairingSession, PeripheralTarget, RadioStack, SessionContext, SessionEvent,
};
pub use service::{AdapterControl, PeripheralHandoverService, TagPolling};
pub use timer::{Scheduler, ThreadScheduler};
pub use uuid::Uuid;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tap_to_target() {
        let address: BdAddr = "00:1B:DC:0F:10:2A".parse().unwrap();
        let record = HandoverRecord::for_address(address, Transport::Classic);

        let bytes = encode(&record, false);
        let target = PeripheralTarget::from_record(&decode(&bytes)).unwrap();

        assert_eq!(target.address, address);
        assert_eq!(target.transport, Transport::Classic);
    }
}
