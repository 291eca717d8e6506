//! Bluetooth OOB descriptor codec
//!
//! Decodes the peer descriptors carried in a tapped NDEF message and builds the
//! handover messages we send back. Decoding never fails: malformed input yields a
//! best-effort [`HandoverRecord`] whose `valid` flag tells whether an address was found.

pub mod carrier;
mod classic;
pub mod constants;
pub mod encode;
mod le;
mod legacy;
pub(crate) mod reader;
pub mod types;


pub use carrier::{is_carrier_activating, CarrierPowerState};
pub use classic::parse_bt_oob;
pub use encode::encode;
pub use le::parse_ble_oob;
pub use legacy::parse_nokia;
pub use types::{HandoverRecord, LeRole, OobPairingMaterial, SubFormat};

use crate::gap::Transport;
use crate::ndef::{
    NdefMessage, NdefRecord, Tnf, RTD_HANDOVER_REQUEST, RTD_HANDOVER_SELECT, TYPE_BLE_OOB,
    TYPE_BT_OOB, TYPE_NOKIA,
};
use log::debug;

/// Decodes a single carrier payload of a known sub-format
pub fn decode_payload(sub_format: SubFormat, payload: &[u8]) -> HandoverRecord {
    match sub_format {
        SubFormat::Classic => parse_bt_oob(payload),
        SubFormat::LowEnergy => parse_ble_oob(payload),
        SubFormat::Legacy => parse_nokia(payload),
    }
}

/// Sub-format of a carrier record, if it is one we understand
pub fn sub_format_of(record: &NdefRecord) -> Option<SubFormat> {
    if record.is(Tnf::MimeMedia, TYPE_BT_OOB) {
        Some(SubFormat::Classic)
    } else if record.is(Tnf::MimeMedia, TYPE_BLE_OOB) {
        Some(SubFormat::LowEnergy)
    } else if record.is(Tnf::External, TYPE_NOKIA) {
        Some(SubFormat::Legacy)
    } else {
        None
    }
}

/// Finds the first BR/EDR or LE carrier record following a handover record and
/// decodes it.
fn decode_handover(message: &NdefMessage) -> Option<HandoverRecord> {
    let handover_record = message.first();
    for record in message.records() {
        match sub_format_of(record) {
            Some(SubFormat::Classic) => {
                let mut result = parse_bt_oob(&record.payload);
                if result.valid && is_carrier_activating(handover_record, &record.id) {
                    result.carrier_activating = true;
                }
                return Some(result);
            }
            Some(SubFormat::LowEnergy) => return Some(parse_ble_oob(&record.payload)),
            _ => {}
        }
    }
    None
}

/// Decodes a tapped message, or `None` when it holds no Bluetooth carrier
///
/// Accepted shapes: a bare BR/EDR or LE OOB record, a handover select or request
/// followed by an OOB record, or the legacy headset record.
pub fn decode_message(message: &NdefMessage) -> Option<HandoverRecord> {
    let first = message.first();

    if let Some(sub_format) = sub_format_of(first) {
        return Some(decode_payload(sub_format, &first.payload));
    }

    if first.is(Tnf::WellKnown, RTD_HANDOVER_SELECT)
        || first.is(Tnf::WellKnown, RTD_HANDOVER_REQUEST)
    {
        return decode_handover(message);
    }

    None
}

/// Decodes raw NDEF bytes into a handover descriptor.
///
/// Anything that is not a well-formed message with a Bluetooth carrier comes back as
/// an invalid classic record.
pub fn decode(bytes: &[u8]) -> HandoverRecord {
    let message = match NdefMessage::parse(bytes) {
        Ok(message) => message,
        Err(e) => {
            debug!("Not a usable NDEF message: {}", e);
            return HandoverRecord::invalid(Transport::Classic);
        }
    };

    decode_message(&message).unwrap_or_else(|| {
        debug!("No Bluetooth carrier in message");
        HandoverRecord::invalid(Transport::Classic)
    })
}
