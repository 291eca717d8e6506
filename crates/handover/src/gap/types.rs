use crate::error::HandoverError;
use crate::gap::constants::*;
use std::fmt;
use std::str::FromStr;

/// LE address type carried next to the address in LE OOB data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressType {
    Public,
    Random,
}

impl From<u8> for AddressType {
    fn from(value: u8) -> Self {
        match value {
            RANDOM_DEVICE_ADDRESS => AddressType::Random,
            _ => AddressType::Public,
        }
    }
}

impl From<AddressType> for u8 {
    fn from(value: AddressType) -> Self {
        match value {
            AddressType::Public => PUBLIC_DEVICE_ADDRESS,
            AddressType::Random => RANDOM_DEVICE_ADDRESS,
        }
    }
}

/// Radio transport a handover targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transport {
    /// BR/EDR; peer exposes headset and audio sink profiles
    Classic,
    /// Low Energy; peer exposes the HID-over-GATT profile
    LowEnergy,
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Classic => write!(f, "BR/EDR"),
            Transport::LowEnergy => write!(f, "LE"),
        }
    }
}

/// A Bluetooth device address.
///
/// Bytes are kept in transmission order as they appear when the address is written
/// most-significant byte first, i.e. `bytes[0]` is the first group of the textual form
/// `AA:BB:CC:DD:EE:FF`. OOB payloads carry the address reversed; use
/// [`BdAddr::from_reversed`] and [`BdAddr::to_reversed`] at that boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BdAddr {
    pub bytes: [u8; 6],
}

impl BdAddr {
    pub fn new(bytes: [u8; 6]) -> Self {
        Self { bytes }
    }

    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        if slice.len() >= 6 {
            let mut bytes = [0u8; 6];
            bytes.copy_from_slice(&slice[0..6]);
            Some(Self { bytes })
        } else {
            None
        }
    }

    /// Builds an address from the little-endian wire layout used by OOB records
    pub fn from_reversed(mut bytes: [u8; 6]) -> Self {
        bytes.reverse();
        Self { bytes }
    }

    pub fn to_reversed(&self) -> [u8; 6] {
        let mut bytes = self.bytes;
        bytes.reverse();
        bytes
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Display for BdAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            self.bytes[0],
            self.bytes[1],
            self.bytes[2],
            self.bytes[3],
            self.bytes[4],
            self.bytes[5]
        )
    }
}

impl FromStr for BdAddr {
    type Err = HandoverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let groups: Vec<&str> = s.split(':').collect();
        if groups.len() != 6 || groups.iter().any(|g| g.len() != 2) {
            return Err(HandoverError::InvalidAddress(s.to_string()));
        }

        let mut bytes = [0u8; 6];
        hex::decode_to_slice(groups.concat(), &mut bytes)
            .map_err(|_| HandoverError::InvalidAddress(s.to_string()))?;
        Ok(Self { bytes })
    }
}
