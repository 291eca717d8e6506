//! Outbound handover messages

use super::carrier::{alternative_carrier_record, CarrierPowerState};
use super::constants::*;
use super::types::{HandoverRecord, LeRole, OobPairingMaterial};
use crate::gap::{AddressType, BdAddr, Transport};
use crate::ndef::{
    NdefMessage, NdefRecord, HANDOVER_VERSION, RTD_COLLISION_RESOLUTION, RTD_HANDOVER_REQUEST,
    RTD_HANDOVER_SELECT, TYPE_BLE_OOB, TYPE_BT_OOB,
};
use byteorder::{LittleEndian, WriteBytesExt};
use log::warn;
use rand::RngCore;

const BT_OOB_PAYLOAD_SIZE: usize = BT_OOB_LENGTH_FIELD_SIZE + BT_ADDRESS_SIZE;

/// BR/EDR OOB payload: little-endian total length followed by the reversed address
pub fn bt_oob_payload(address: &BdAddr) -> Vec<u8> {
    let mut payload = Vec::with_capacity(BT_OOB_PAYLOAD_SIZE);
    // Writing into a Vec cannot fail
    let _ = payload.write_u16::<LittleEndian>(BT_OOB_PAYLOAD_SIZE as u16);
    payload.extend_from_slice(&address.to_reversed());
    payload
}

fn push_tlv(out: &mut Vec<u8>, data_type: u8, data: &[u8]) {
    out.push(data.len() as u8 + 1);
    out.push(data_type);
    out.extend_from_slice(data);
}

/// LE OOB payload carrying the address, role and whatever name or key material the
/// record has
pub fn ble_oob_payload(address: &BdAddr, record: &HandoverRecord) -> Vec<u8> {
    let oob = record.oob.as_ref();
    let address_type = oob.map(|m| m.address_type).unwrap_or(AddressType::Public);
    let role = oob.and_then(|m| m.role).unwrap_or(LeRole::PeripheralOnly);

    let mut payload = Vec::new();

    let mac = OobPairingMaterial::new(*address, address_type).address_with_type();
    push_tlv(&mut payload, BT_HANDOVER_TYPE_MAC, &mac);
    push_tlv(&mut payload, BT_HANDOVER_TYPE_LE_ROLE, &[role.to_u8()]);

    let name = oob
        .and_then(|m| m.device_name.as_deref())
        .unwrap_or(record.name.as_str());
    if !name.is_empty() {
        if name.len() < u8::MAX as usize {
            push_tlv(&mut payload, BT_HANDOVER_TYPE_LONG_LOCAL_NAME, name.as_bytes());
        } else {
            warn!("LE OOB: name of {} bytes does not fit, omitting it", name.len());
        }
    }

    if let Some(material) = oob {
        if let Some(tk) = &material.temporary_key {
            push_tlv(&mut payload, BT_HANDOVER_TYPE_SECURITY_MANAGER_TK, tk);
        }
        if let Some(confirmation) = &material.confirmation {
            push_tlv(&mut payload, BT_HANDOVER_TYPE_LE_SC_CONFIRMATION, confirmation);
        }
        if let Some(randomizer) = &material.randomizer {
            push_tlv(&mut payload, BT_HANDOVER_TYPE_LE_SC_RANDOM, randomizer);
        }
    }

    payload
}

/// The carrier record referenced by the `ac` entry of an `Hs`/`Hr`
pub fn oob_data_record(record: &HandoverRecord) -> NdefRecord {
    let address = record.address.unwrap_or_else(|| {
        warn!("Handover record has no address, advertising 00:00:00:00:00:00");
        BdAddr::default()
    });

    match record.transport {
        Transport::Classic => {
            NdefRecord::mime(TYPE_BT_OOB, BT_CARRIER_DATA_REFERENCE, bt_oob_payload(&address))
        }
        Transport::LowEnergy => NdefRecord::mime(
            TYPE_BLE_OOB,
            BT_CARRIER_DATA_REFERENCE,
            ble_oob_payload(&address, record),
        ),
    }
}

/// Random bytes used to break a tie when both sides send a request
pub fn collision_random() -> [u8; COLLISION_RANDOM_SIZE] {
    let mut random = [0u8; COLLISION_RANDOM_SIZE];
    rand::thread_rng().fill_bytes(&mut random);
    random
}

pub fn collision_record(random: [u8; COLLISION_RANDOM_SIZE]) -> NdefRecord {
    NdefRecord::well_known(RTD_COLLISION_RESOLUTION, random.to_vec())
}

fn versioned_payload(nested: &NdefMessage) -> Vec<u8> {
    let mut payload = vec![HANDOVER_VERSION];
    payload.extend(nested.to_bytes());
    payload
}

pub fn handover_select_record(power: CarrierPowerState) -> NdefRecord {
    let nested = NdefMessage::with_first(
        alternative_carrier_record(power, BT_CARRIER_DATA_REFERENCE),
        Vec::new(),
    );
    NdefRecord::well_known(RTD_HANDOVER_SELECT, versioned_payload(&nested))
}

pub fn handover_request_record(random: [u8; COLLISION_RANDOM_SIZE]) -> NdefRecord {
    let nested = NdefMessage::with_first(
        collision_record(random),
        vec![alternative_carrier_record(
            CarrierPowerState::Active,
            BT_CARRIER_DATA_REFERENCE,
        )],
    );
    NdefRecord::well_known(RTD_HANDOVER_REQUEST, versioned_payload(&nested))
}

/// `Hs` answering with our carrier, marked activating when `record.carrier_activating`
pub fn select_message(record: &HandoverRecord) -> NdefMessage {
    let power = if record.carrier_activating {
        CarrierPowerState::Activating
    } else {
        CarrierPowerState::Active
    };
    NdefMessage::with_first(handover_select_record(power), vec![oob_data_record(record)])
}

/// `Hr` offering our carrier, with a fresh collision random
pub fn request_message(record: &HandoverRecord) -> NdefMessage {
    NdefMessage::with_first(
        handover_request_record(collision_random()),
        vec![oob_data_record(record)],
    )
}

/// Serializes `record` as a handover request (`as_request`) or select message
pub fn encode(record: &HandoverRecord, as_request: bool) -> Vec<u8> {
    let message = if as_request {
        request_message(record)
    } else {
        select_message(record)
    };
    message.to_bytes()
}
