//! Alternative carrier records
//!
//! A handover select/request record nests one `ac` record per offered carrier. Each
//! `ac` names the carrier's power state and refers to the carrier's OOB record by id.

use super::constants::*;
use crate::ndef::{NdefMessage, NdefRecord, Tnf, RTD_ALTERNATIVE_CARRIER};
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarrierPowerState {
    Inactive,
    Active,
    Activating,
    Unknown,
}

impl CarrierPowerState {
    pub fn from_u8(value: u8) -> Self {
        match value & CARRIER_POWER_STATE_MASK {
            CARRIER_POWER_STATE_INACTIVE => CarrierPowerState::Inactive,
            CARRIER_POWER_STATE_ACTIVE => CarrierPowerState::Active,
            CARRIER_POWER_STATE_ACTIVATING => CarrierPowerState::Activating,
            _ => CarrierPowerState::Unknown,
        }
    }

    pub fn to_u8(self) -> u8 {
        match self {
            CarrierPowerState::Inactive => CARRIER_POWER_STATE_INACTIVE,
            CarrierPowerState::Active => CARRIER_POWER_STATE_ACTIVE,
            CarrierPowerState::Activating => CARRIER_POWER_STATE_ACTIVATING,
            CarrierPowerState::Unknown => CARRIER_POWER_STATE_UNKNOWN,
        }
    }
}

/// Builds an `ac` record pointing at the carrier record with id `carrier_ref`
pub fn alternative_carrier_record(power: CarrierPowerState, carrier_ref: &[u8]) -> NdefRecord {
    let mut payload = Vec::with_capacity(carrier_ref.len() + 3);
    payload.push(power.to_u8());
    payload.push(carrier_ref.len() as u8);
    payload.extend_from_slice(carrier_ref);
    payload.push(0); // auxiliary data reference count
    NdefRecord::well_known(RTD_ALTERNATIVE_CARRIER, payload)
}

/// Whether the carrier with id `carrier_id` is still being powered up, according to the
/// `ac` records nested in `handover_record` (an `Hs` or `Hr`).
///
/// A nested message that cannot be parsed, or an `ac` whose reference length differs
/// from `carrier_id`, yields `false`. When every `ac` was scanned and none referred to
/// `carrier_id` the answer is `true`.
///
/// That last case fails open: an unreferenced carrier reads as activating. Whether peers
/// rely on this is unknown, so it is kept as is.
pub fn is_carrier_activating(handover_record: &NdefRecord, carrier_id: &[u8]) -> bool {
    let payload = &handover_record.payload;
    if payload.len() <= 1 {
        return false;
    }

    // Skip the version byte
    let nested = match NdefMessage::parse(&payload[1..]) {
        Ok(nested) => nested,
        Err(e) => {
            debug!("handover record carries no usable carrier list: {}", e);
            return false;
        }
    };

    for alt in nested.records() {
        if !alt.is(Tnf::WellKnown, RTD_ALTERNATIVE_CARRIER) || alt.payload.len() < 2 {
            continue;
        }

        let power = CarrierPowerState::from_u8(alt.payload[0]);
        let ref_len = alt.payload[1] as usize;
        if ref_len != carrier_id.len() {
            return false;
        }

        let Some(carrier_ref) = alt.payload.get(2..2 + ref_len) else {
            continue;
        };
        if carrier_ref == carrier_id {
            return power == CarrierPowerState::Activating;
        }
    }

    // No ac refers to this carrier
    true
}
