//! BR/EDR OOB payloads (`application/vnd.bluetooth.ep.oob`)
//!
//! Layout: a two byte length, the peer address in reverse byte order, then an EIR TLV
//! stream. The length has been emitted big-endian by at least one implementation and
//! nobody has ever relied on it, so it is skipped and the payload length bounds the read.

use super::constants::*;
use super::reader::OobReader;
use super::types::HandoverRecord;
use crate::gap::{BdAddr, DeviceClass, Transport};
use crate::uuid::{Uuid, UuidWidth};
use log::{debug, info};
use std::io;

pub fn parse_bt_oob(payload: &[u8]) -> HandoverRecord {
    let mut result = HandoverRecord::invalid(Transport::Classic);
    let mut name = None;
    let mut reader = OobReader::new(payload);

    if parse_into(&mut reader, &mut result, &mut name).is_err() {
        info!("BT OOB: payload shorter than expected");
    }

    if result.valid {
        result.name = name.unwrap_or_default();
    }
    result
}

fn parse_into(
    reader: &mut OobReader<'_>,
    result: &mut HandoverRecord,
    name: &mut Option<String>,
) -> io::Result<()> {
    reader.skip(BT_OOB_LENGTH_FIELD_SIZE)?;
    let address = reader.read_array::<BT_ADDRESS_SIZE>()?;
    result.address = Some(BdAddr::from_reversed(address));
    result.valid = true;

    while reader.remaining() > 0 {
        let Some((data_type, len)) = reader.read_tlv_header()? else {
            debug!("BT OOB: zero length entry, ignoring remainder");
            break;
        };

        let consumed = match data_type {
            BT_HANDOVER_TYPE_SHORT_LOCAL_NAME => {
                *name = Some(reader.read_string(len)?);
                true
            }
            // Only a fallback when no short name was given
            BT_HANDOVER_TYPE_LONG_LOCAL_NAME if name.is_none() => {
                *name = Some(reader.read_string(len)?);
                true
            }
            BT_HANDOVER_TYPE_16_BIT_UUIDS_PARTIAL
            | BT_HANDOVER_TYPE_16_BIT_UUIDS_COMPLETE
            | BT_HANDOVER_TYPE_32_BIT_UUIDS_PARTIAL
            | BT_HANDOVER_TYPE_32_BIT_UUIDS_COMPLETE
            | BT_HANDOVER_TYPE_128_BIT_UUIDS_PARTIAL
            | BT_HANDOVER_TYPE_128_BIT_UUIDS_COMPLETE => {
                match parse_uuid_list(reader, data_type, len)? {
                    Some(uuids) => {
                        for uuid in uuids {
                            if !result.uuids.contains(&uuid) {
                                result.uuids.push(uuid);
                            }
                        }
                        true
                    }
                    None => false,
                }
            }
            BT_HANDOVER_TYPE_CLASS_OF_DEVICE => {
                if len != crate::gap::CLASS_OF_DEVICE_SIZE {
                    info!(
                        "BT OOB: invalid size of Class of Device, should be {} bytes",
                        crate::gap::CLASS_OF_DEVICE_SIZE
                    );
                    false
                } else {
                    result.device_class = Some(DeviceClass::from_bytes(reader.read_array()?));
                    true
                }
            }
            _ => false,
        };

        if !consumed {
            reader.skip(len)?;
        }
    }

    Ok(())
}

fn uuid_width(data_type: u8) -> Option<UuidWidth> {
    match data_type {
        BT_HANDOVER_TYPE_16_BIT_UUIDS_PARTIAL | BT_HANDOVER_TYPE_16_BIT_UUIDS_COMPLETE => {
            Some(UuidWidth::Bits16)
        }
        BT_HANDOVER_TYPE_32_BIT_UUIDS_PARTIAL | BT_HANDOVER_TYPE_32_BIT_UUIDS_COMPLETE => {
            Some(UuidWidth::Bits32)
        }
        BT_HANDOVER_TYPE_128_BIT_UUIDS_PARTIAL | BT_HANDOVER_TYPE_128_BIT_UUIDS_COMPLETE => {
            Some(UuidWidth::Bits128)
        }
        _ => None,
    }
}

/// Reads a UUID list entry. Returns `Ok(None)` without consuming anything when the
/// entry length is not a whole number of UUIDs.
fn parse_uuid_list(
    reader: &mut OobReader<'_>,
    data_type: u8,
    len: usize,
) -> io::Result<Option<Vec<Uuid>>> {
    let Some(width) = uuid_width(data_type) else {
        return Ok(None);
    };
    let size = width.byte_len();

    if len == 0 || len % size != 0 {
        info!("BT OOB: invalid size of UUIDs, should be multiples of {} bytes", size);
        return Ok(None);
    }

    let data = reader.read_vec(len)?;
    Ok(Some(
        data.chunks_exact(size)
            .filter_map(Uuid::try_from_slice_le)
            .collect(),
    ))
}
