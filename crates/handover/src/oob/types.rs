//! Decoded handover descriptors

use super::constants::*;
use crate::gap::{AddressType, BdAddr, DeviceClass, Transport};
use crate::uuid::Uuid;
use std::fmt;

/// Sub-format of an OOB payload, selected by the carrier record's type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubFormat {
    /// `application/vnd.bluetooth.ep.oob`
    Classic,
    /// `application/vnd.bluetooth.le.oob`
    LowEnergy,
    /// `nokia.com:bt` fixed-layout headset record
    Legacy,
}

/// LE role advertised by the peer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeRole {
    PeripheralOnly,
    CentralOnly,
    PeripheralPreferred,
    CentralPreferred,
    Reserved(u8),
}

impl LeRole {
    pub fn from_u8(value: u8) -> Self {
        match value {
            BT_HANDOVER_LE_ROLE_PERIPHERAL_ONLY => LeRole::PeripheralOnly,
            BT_HANDOVER_LE_ROLE_CENTRAL_ONLY => LeRole::CentralOnly,
            BT_HANDOVER_LE_ROLE_PERIPHERAL_PREFERRED => LeRole::PeripheralPreferred,
            BT_HANDOVER_LE_ROLE_CENTRAL_PREFERRED => LeRole::CentralPreferred,
            other => LeRole::Reserved(other),
        }
    }

    pub fn to_u8(self) -> u8 {
        match self {
            LeRole::PeripheralOnly => BT_HANDOVER_LE_ROLE_PERIPHERAL_ONLY,
            LeRole::CentralOnly => BT_HANDOVER_LE_ROLE_CENTRAL_ONLY,
            LeRole::PeripheralPreferred => BT_HANDOVER_LE_ROLE_PERIPHERAL_PREFERRED,
            LeRole::CentralPreferred => BT_HANDOVER_LE_ROLE_CENTRAL_PREFERRED,
            LeRole::Reserved(value) => value,
        }
    }
}

/// LE pairing material carried in an LE OOB record.
///
/// Every security field is optional; a peer may supply only the address and role and
/// leave key agreement to the radio stack.
#[derive(Clone, PartialEq, Eq)]
pub struct OobPairingMaterial {
    pub address: BdAddr,
    pub address_type: AddressType,
    pub role: Option<LeRole>,
    /// LE Secure Connections confirmation value
    pub confirmation: Option<[u8; 16]>,
    /// LE Secure Connections random value
    pub randomizer: Option<[u8; 16]>,
    /// Legacy pairing temporary key
    pub temporary_key: Option<[u8; 16]>,
    pub device_name: Option<String>,
}

impl OobPairingMaterial {
    pub fn new(address: BdAddr, address_type: AddressType) -> Self {
        Self {
            address,
            address_type,
            role: None,
            confirmation: None,
            randomizer: None,
            temporary_key: None,
            device_name: None,
        }
    }

    /// The LE device address TLV value: reversed address followed by the type byte
    pub fn address_with_type(&self) -> [u8; LE_ADDRESS_WITH_TYPE_SIZE] {
        let mut raw = [0u8; LE_ADDRESS_WITH_TYPE_SIZE];
        raw[..BT_ADDRESS_SIZE].copy_from_slice(&self.address.to_reversed());
        raw[BT_ADDRESS_SIZE] = self.address_type.into();
        raw
    }

    /// Whether any key material is present
    pub fn has_keys(&self) -> bool {
        self.confirmation.is_some() || self.randomizer.is_some() || self.temporary_key.is_some()
    }
}

// Key material stays out of logs
impl fmt::Debug for OobPairingMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OobPairingMaterial")
            .field("address", &self.address)
            .field("address_type", &self.address_type)
            .field("role", &self.role)
            .field("confirmation", &self.confirmation.is_some())
            .field("randomizer", &self.randomizer.is_some())
            .field("temporary_key", &self.temporary_key.is_some())
            .field("device_name", &self.device_name)
            .finish()
    }
}

/// A peer descriptor decoded from a tap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoverRecord {
    /// False when the mandatory address could not be extracted
    pub valid: bool,
    pub address: Option<BdAddr>,
    /// Empty when the peer supplied no name
    pub name: String,
    pub transport: Transport,
    pub oob: Option<OobPairingMaterial>,
    pub uuids: Vec<Uuid>,
    pub device_class: Option<DeviceClass>,
    pub carrier_activating: bool,
}

impl HandoverRecord {
    pub fn invalid(transport: Transport) -> Self {
        Self {
            valid: false,
            address: None,
            name: String::new(),
            transport,
            oob: None,
            uuids: Vec::new(),
            device_class: None,
            carrier_activating: false,
        }
    }

    /// A valid descriptor for a known peer, as used when advertising the local device
    pub fn for_address(address: BdAddr, transport: Transport) -> Self {
        Self {
            valid: true,
            address: Some(address),
            ..Self::invalid(transport)
        }
    }
}
