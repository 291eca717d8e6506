//! Constants for NDEF framing and handover record types

// Record header flags
pub const FLAG_MB: u8 = 0x80;
pub const FLAG_ME: u8 = 0x40;
pub const FLAG_CF: u8 = 0x20;
pub const FLAG_SR: u8 = 0x10;
pub const FLAG_IL: u8 = 0x08;
pub const TNF_MASK: u8 = 0x07;

// Type name formats
pub const TNF_EMPTY: u8 = 0x00;
pub const TNF_WELL_KNOWN: u8 = 0x01;
pub const TNF_MIME_MEDIA: u8 = 0x02;
pub const TNF_ABSOLUTE_URI: u8 = 0x03;
pub const TNF_EXTERNAL_TYPE: u8 = 0x04;
pub const TNF_UNKNOWN: u8 = 0x05;
pub const TNF_UNCHANGED: u8 = 0x06;

// Well-known record types used by connection handover
pub const RTD_HANDOVER_SELECT: &[u8] = b"Hs";
pub const RTD_HANDOVER_REQUEST: &[u8] = b"Hr";
pub const RTD_ALTERNATIVE_CARRIER: &[u8] = b"ac";
pub const RTD_COLLISION_RESOLUTION: &[u8] = b"cr";

/// Connection handover version 1.2
pub const HANDOVER_VERSION: u8 = 0x12;

// Carrier payload types
pub const TYPE_BT_OOB: &[u8] = b"application/vnd.bluetooth.ep.oob";
pub const TYPE_BLE_OOB: &[u8] = b"application/vnd.bluetooth.le.oob";
pub const TYPE_NOKIA: &[u8] = b"nokia.com:bt";
