//! LE OOB payloads (`application/vnd.bluetooth.le.oob`)
//!
//! A bare AD TLV stream. The device address entry is mandatory; the role, name and
//! security manager entries are optional and each one is length-checked on its own so
//! a single malformed entry does not spoil the rest of the record.

use super::constants::*;
use super::reader::OobReader;
use super::types::{HandoverRecord, LeRole, OobPairingMaterial};
use crate::gap::{AddressType, BdAddr, Transport};
use log::info;
use std::io;

#[derive(Default)]
struct LeFields {
    address: Option<(BdAddr, AddressType)>,
    role: Option<LeRole>,
    name: Option<String>,
    temporary_key: Option<[u8; 16]>,
    confirmation: Option<[u8; 16]>,
    randomizer: Option<[u8; 16]>,
}

enum Outcome {
    Parsed,
    CentralOnly,
}

pub fn parse_ble_oob(payload: &[u8]) -> HandoverRecord {
    let mut result = HandoverRecord::invalid(Transport::LowEnergy);
    let mut fields = LeFields::default();
    let mut reader = OobReader::new(payload);

    match parse_into(&mut reader, &mut fields) {
        Ok(Outcome::CentralOnly) => {
            // The peer can only act as central, so it cannot pair with us
            info!("BLE OOB: peer supports central role only");
            return result;
        }
        Ok(Outcome::Parsed) => {}
        Err(_) => info!("BLE OOB: payload shorter than expected"),
    }

    let Some((address, address_type)) = fields.address else {
        return result;
    };

    result.valid = true;
    result.address = Some(address);
    result.name = fields.name.clone().unwrap_or_default();
    result.oob = Some(OobPairingMaterial {
        address,
        address_type,
        role: fields.role,
        confirmation: fields.confirmation,
        randomizer: fields.randomizer,
        temporary_key: fields.temporary_key,
        device_name: fields.name,
    });
    result
}

fn parse_into(reader: &mut OobReader<'_>, fields: &mut LeFields) -> io::Result<Outcome> {
    while reader.remaining() > 0 {
        let Some((data_type, len)) = reader.read_tlv_header()? else {
            break;
        };

        match data_type {
            BT_HANDOVER_TYPE_MAC if len == LE_ADDRESS_WITH_TYPE_SIZE => {
                let address = reader.read_array::<BT_ADDRESS_SIZE>()?;
                let address_type = AddressType::from(reader.read_u8()?);
                fields.address = Some((BdAddr::from_reversed(address), address_type));
            }
            BT_HANDOVER_TYPE_LE_ROLE if len == 1 => {
                let role = LeRole::from_u8(reader.read_u8()?);
                if role == LeRole::CentralOnly {
                    return Ok(Outcome::CentralOnly);
                }
                fields.role = Some(role);
            }
            BT_HANDOVER_TYPE_LONG_LOCAL_NAME => {
                fields.name = Some(reader.read_string(len)?);
            }
            BT_HANDOVER_TYPE_SECURITY_MANAGER_TK => {
                if let Some(key) = read_key(reader, len, SECURITY_MANAGER_TK_SIZE, "SM TK")? {
                    fields.temporary_key = Some(key);
                }
            }
            BT_HANDOVER_TYPE_LE_SC_CONFIRMATION => {
                let what = "LE SC Confirmation";
                if let Some(value) = read_key(reader, len, SECURITY_MANAGER_LE_SC_C_SIZE, what)? {
                    fields.confirmation = Some(value);
                }
            }
            BT_HANDOVER_TYPE_LE_SC_RANDOM => {
                let what = "LE SC Random";
                if let Some(value) = read_key(reader, len, SECURITY_MANAGER_LE_SC_R_SIZE, what)? {
                    fields.randomizer = Some(value);
                }
            }
            BT_HANDOVER_TYPE_MAC | BT_HANDOVER_TYPE_LE_ROLE => {
                info!("BLE OOB: dropping entry 0x{:02X} with invalid size {}", data_type, len);
                reader.skip(len)?;
            }
            _ => reader.skip(len)?,
        }
    }

    Ok(Outcome::Parsed)
}

/// Reads a fixed-size key entry; a size mismatch drops the entry and skips its bytes.
fn read_key(
    reader: &mut OobReader<'_>,
    len: usize,
    expected: usize,
    what: &str,
) -> io::Result<Option<[u8; 16]>> {
    if len != expected {
        info!("BLE OOB: invalid size of {}, should be {} bytes", what, expected);
        reader.skip(len)?;
        return Ok(None);
    }
    reader.read_array::<16>().map(Some)
}
