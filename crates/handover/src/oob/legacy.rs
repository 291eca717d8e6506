//! Fixed-layout headset record (`nokia.com:bt` external type)
//!
//! Found on some older headsets: the address sits at a fixed offset in natural byte
//! order and a length-prefixed name follows at a later fixed offset.

use super::constants::*;
use super::reader::OobReader;
use super::types::HandoverRecord;
use crate::gap::{BdAddr, Transport};
use log::info;

pub fn parse_nokia(payload: &[u8]) -> HandoverRecord {
    let mut result = HandoverRecord::invalid(Transport::Classic);
    let mut reader = OobReader::new(payload);

    reader.seek(NOKIA_ADDRESS_OFFSET);
    let Ok(address) = reader.read_array::<BT_ADDRESS_SIZE>() else {
        info!("nokia: payload shorter than expected");
        return result;
    };
    result.address = Some(BdAddr::new(address));
    result.valid = true;

    reader.seek(NOKIA_NAME_OFFSET);
    let name = reader
        .read_u8()
        .and_then(|len| reader.read_string(len as usize));
    match name {
        Ok(name) => result.name = name,
        Err(_) => info!("nokia: payload shorter than expected"),
    }

    result
}
