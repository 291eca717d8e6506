//! Bluetooth service UUIDs
//!
//! OOB records advertise service hints as lists of 16-, 32- or 128-bit UUIDs. All three
//! widths are normalized onto the Bluetooth base UUID so hints can be compared with the
//! well-known profile UUIDs regardless of how the peer encoded them.

use std::fmt;

/// A 128-bit Bluetooth UUID, stored little-endian as it appears on the wire.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Uuid {
    bytes: [u8; 16],
}

/// "00000000-0000-1000-8000-00805F9B34FB", little-endian
const BASE_UUID_BYTES: [u8; 16] = [
    0xFB, 0x34, 0x9B, 0x5F, 0x80, 0x00, 0x00, 0x80, 0x00, 0x10, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

/// Offset within the base UUID where the 16/32-bit value is inserted.
const BASE_OFFSET: usize = 12;

/// Width in bytes of a UUID as carried in an OOB service list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UuidWidth {
    Bits16,
    Bits32,
    Bits128,
}

impl UuidWidth {
    pub const fn byte_len(self) -> usize {
        match self {
            UuidWidth::Bits16 => 2,
            UuidWidth::Bits32 => 4,
            UuidWidth::Bits128 => 16,
        }
    }
}

impl Uuid {
    pub const fn from_bytes_le(bytes: [u8; 16]) -> Self {
        Uuid { bytes }
    }

    pub const fn from_u16(uuid16: u16) -> Self {
        let mut bytes = BASE_UUID_BYTES;
        bytes[BASE_OFFSET] = uuid16 as u8;
        bytes[BASE_OFFSET + 1] = (uuid16 >> 8) as u8;
        Uuid { bytes }
    }

    pub const fn from_u32(uuid32: u32) -> Self {
        let mut bytes = BASE_UUID_BYTES;
        bytes[BASE_OFFSET] = uuid32 as u8;
        bytes[BASE_OFFSET + 1] = (uuid32 >> 8) as u8;
        bytes[BASE_OFFSET + 2] = (uuid32 >> 16) as u8;
        bytes[BASE_OFFSET + 3] = (uuid32 >> 24) as u8;
        Uuid { bytes }
    }

    /// Accepts slices of length 2, 4 or 16 in little-endian order.
    pub fn try_from_slice_le(slice: &[u8]) -> Option<Self> {
        match slice.len() {
            2 => Some(Uuid::from_u16(u16::from_le_bytes([slice[0], slice[1]]))),
            4 => Some(Uuid::from_u32(u32::from_le_bytes([
                slice[0], slice[1], slice[2], slice[3],
            ]))),
            16 => {
                let mut bytes = [0u8; 16];
                bytes.copy_from_slice(slice);
                Some(Uuid::from_bytes_le(bytes))
            }
            _ => None,
        }
    }

    pub fn as_bytes_be(&self) -> [u8; 16] {
        let mut bytes = self.bytes;
        bytes.reverse();
        bytes
    }

    fn is_sig_assigned(&self) -> bool {
        self.bytes[0..BASE_OFFSET] == BASE_UUID_BYTES[0..BASE_OFFSET]
    }

    /// The short form, if this is a SIG-assigned 16-bit UUID
    pub fn as_u16(&self) -> Option<u16> {
        match self.as_u32() {
            Some(value) if value <= u16::MAX as u32 => Some(value as u16),
            _ => None,
        }
    }

    /// The short form, if this is derived from the base UUID
    pub fn as_u32(&self) -> Option<u32> {
        if self.is_sig_assigned() {
            Some(u32::from_le_bytes([
                self.bytes[BASE_OFFSET],
                self.bytes[BASE_OFFSET + 1],
                self.bytes[BASE_OFFSET + 2],
                self.bytes[BASE_OFFSET + 3],
            ]))
        } else {
            None
        }
    }
}

impl From<u16> for Uuid {
    fn from(uuid16: u16) -> Self {
        Uuid::from_u16(uuid16)
    }
}

impl PartialEq<u16> for Uuid {
    fn eq(&self, other: &u16) -> bool {
        self.as_u16() == Some(*other)
    }
}

impl fmt::Display for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = hex::encode(self.as_bytes_be());
        write!(
            f,
            "{}-{}-{}-{}-{}",
            &b[0..8],
            &b[8..12],
            &b[12..16],
            &b[16..20],
            &b[20..32]
        )
    }
}

impl fmt::Debug for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(short) = self.as_u16() {
            write!(f, "Uuid(0x{:04X})", short)
        } else if let Some(short) = self.as_u32() {
            write!(f, "Uuid(0x{:08X})", short)
        } else {
            write!(f, "Uuid({})", self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_forms_share_base() {
        let from16 = Uuid::from_u16(0x110B);
        let from32 = Uuid::try_from_slice_le(&[0x0B, 0x11, 0x00, 0x00]).unwrap();
        assert_eq!(from16, from32);
        assert_eq!(from16, 0x110Bu16);
        assert_eq!(from16.to_string(), "0000110b-0000-1000-8000-00805f9b34fb");
        assert_eq!(format!("{:?}", from16), "Uuid(0x110B)");
    }

    #[test]
    fn test_32_bit_form() {
        let uuid = Uuid::try_from_slice_le(&[0x0B, 0x11, 0x01, 0x00]).unwrap();
        assert_eq!(uuid.as_u32(), Some(0x0001_110B));
        assert_eq!(uuid.as_u16(), None);
        assert_eq!(format!("{:?}", uuid), "Uuid(0x0001110B)");
    }

    #[test]
    fn test_vendor_uuid_stays_128_bit() {
        // 6e400001-b5a3-f393-e0a9-e50e24dcca9e
        let bytes_le = [
            0x9E, 0xCA, 0xDC, 0x24, 0x0E, 0xE5, 0xA9, 0xE0, 0x93, 0xF3, 0xA3, 0xB5, 0x01, 0x00,
            0x40, 0x6E,
        ];
        let vendor = Uuid::try_from_slice_le(&bytes_le).unwrap();
        assert_eq!(vendor.as_u32(), None);
        assert_eq!(vendor.to_string(), "6e400001-b5a3-f393-e0a9-e50e24dcca9e");
        assert_ne!(vendor, 0x0001u16);
    }

    #[test]
    fn test_bad_slice_length() {
        assert_eq!(Uuid::try_from_slice_le(&[0x0B, 0x11, 0x00]), None);
        assert_eq!(Uuid::try_from_slice_le(&[]), None);
    }
}
