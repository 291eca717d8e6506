//! Constants for Bluetooth OOB payloads

// EIR / AD data types found in OOB TLV streams
pub const BT_HANDOVER_TYPE_16_BIT_UUIDS_PARTIAL: u8 = 0x02;
pub const BT_HANDOVER_TYPE_16_BIT_UUIDS_COMPLETE: u8 = 0x03;
pub const BT_HANDOVER_TYPE_32_BIT_UUIDS_PARTIAL: u8 = 0x04;
pub const BT_HANDOVER_TYPE_32_BIT_UUIDS_COMPLETE: u8 = 0x05;
pub const BT_HANDOVER_TYPE_128_BIT_UUIDS_PARTIAL: u8 = 0x06;
pub const BT_HANDOVER_TYPE_128_BIT_UUIDS_COMPLETE: u8 = 0x07;
pub const BT_HANDOVER_TYPE_SHORT_LOCAL_NAME: u8 = 0x08;
pub const BT_HANDOVER_TYPE_LONG_LOCAL_NAME: u8 = 0x09;
pub const BT_HANDOVER_TYPE_CLASS_OF_DEVICE: u8 = 0x0D;
pub const BT_HANDOVER_TYPE_SECURITY_MANAGER_TK: u8 = 0x10;
pub const BT_HANDOVER_TYPE_APPEARANCE: u8 = 0x19;
pub const BT_HANDOVER_TYPE_MAC: u8 = 0x1B;
pub const BT_HANDOVER_TYPE_LE_ROLE: u8 = 0x1C;
pub const BT_HANDOVER_TYPE_LE_SC_CONFIRMATION: u8 = 0x22;
pub const BT_HANDOVER_TYPE_LE_SC_RANDOM: u8 = 0x23;

// LE role values
pub const BT_HANDOVER_LE_ROLE_PERIPHERAL_ONLY: u8 = 0x00;
pub const BT_HANDOVER_LE_ROLE_CENTRAL_ONLY: u8 = 0x01;
pub const BT_HANDOVER_LE_ROLE_PERIPHERAL_PREFERRED: u8 = 0x02;
pub const BT_HANDOVER_LE_ROLE_CENTRAL_PREFERRED: u8 = 0x03;

// Fixed field sizes
pub const BT_OOB_LENGTH_FIELD_SIZE: usize = 2;
pub const BT_ADDRESS_SIZE: usize = 6;
/// Address plus the trailing address-type byte
pub const LE_ADDRESS_WITH_TYPE_SIZE: usize = 7;
pub const SECURITY_MANAGER_TK_SIZE: usize = 16;
pub const SECURITY_MANAGER_LE_SC_C_SIZE: usize = 16;
pub const SECURITY_MANAGER_LE_SC_R_SIZE: usize = 16;

// Legacy headset record layout
pub const NOKIA_ADDRESS_OFFSET: u64 = 1;
pub const NOKIA_NAME_OFFSET: u64 = 14;

// Alternative carrier power states (lower two bits of the first ac byte)
pub const CARRIER_POWER_STATE_INACTIVE: u8 = 0;
pub const CARRIER_POWER_STATE_ACTIVE: u8 = 1;
pub const CARRIER_POWER_STATE_ACTIVATING: u8 = 2;
pub const CARRIER_POWER_STATE_UNKNOWN: u8 = 3;
pub const CARRIER_POWER_STATE_MASK: u8 = 0x03;

/// Carrier data reference tying the ac record to the OOB record's id
pub const BT_CARRIER_DATA_REFERENCE: &[u8] = b"b";

pub const COLLISION_RANDOM_SIZE: usize = 2;
