use super::constants::*;
use crate::error::{HandoverError, Result};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Cursor, Read};

/// Type name format of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tnf {
    Empty,
    WellKnown,
    MimeMedia,
    AbsoluteUri,
    External,
    Unknown,
    Unchanged,
}

impl Tnf {
    pub fn to_u8(self) -> u8 {
        match self {
            Tnf::Empty => TNF_EMPTY,
            Tnf::WellKnown => TNF_WELL_KNOWN,
            Tnf::MimeMedia => TNF_MIME_MEDIA,
            Tnf::AbsoluteUri => TNF_ABSOLUTE_URI,
            Tnf::External => TNF_EXTERNAL_TYPE,
            Tnf::Unknown => TNF_UNKNOWN,
            Tnf::Unchanged => TNF_UNCHANGED,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            TNF_EMPTY => Some(Tnf::Empty),
            TNF_WELL_KNOWN => Some(Tnf::WellKnown),
            TNF_MIME_MEDIA => Some(Tnf::MimeMedia),
            TNF_ABSOLUTE_URI => Some(Tnf::AbsoluteUri),
            TNF_EXTERNAL_TYPE => Some(Tnf::External),
            TNF_UNKNOWN => Some(Tnf::Unknown),
            TNF_UNCHANGED => Some(Tnf::Unchanged),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NdefRecord {
    pub tnf: Tnf,
    pub record_type: Vec<u8>,
    pub id: Vec<u8>,
    pub payload: Vec<u8>,
}

impl NdefRecord {
    pub fn new(tnf: Tnf, record_type: &[u8], id: &[u8], payload: Vec<u8>) -> Self {
        Self {
            tnf,
            record_type: record_type.to_vec(),
            id: id.to_vec(),
            payload,
        }
    }

    pub fn well_known(record_type: &[u8], payload: Vec<u8>) -> Self {
        Self::new(Tnf::WellKnown, record_type, &[], payload)
    }

    pub fn mime(mime_type: &[u8], id: &[u8], payload: Vec<u8>) -> Self {
        Self::new(Tnf::MimeMedia, mime_type, id, payload)
    }

    /// Whether this record has the given type name format and type
    pub fn is(&self, tnf: Tnf, record_type: &[u8]) -> bool {
        self.tnf == tnf && self.record_type == record_type
    }

    fn write_to(&self, out: &mut Vec<u8>, first: bool, last: bool) {
        let short = self.payload.len() <= u8::MAX as usize;
        let mut header = self.tnf.to_u8();
        if first {
            header |= FLAG_MB;
        }
        if last {
            header |= FLAG_ME;
        }
        if short {
            header |= FLAG_SR;
        }
        if !self.id.is_empty() {
            header |= FLAG_IL;
        }

        out.push(header);
        out.push(self.record_type.len() as u8);
        if short {
            out.push(self.payload.len() as u8);
        } else {
            // Writing into a Vec cannot fail
            let _ = out.write_u32::<BigEndian>(self.payload.len() as u32);
        }
        if !self.id.is_empty() {
            out.push(self.id.len() as u8);
        }
        out.extend_from_slice(&self.record_type);
        out.extend_from_slice(&self.id);
        out.extend_from_slice(&self.payload);
    }

    fn read_from(cursor: &mut Cursor<&[u8]>) -> std::io::Result<(Self, u8)> {
        let header = cursor.read_u8()?;
        let type_len = cursor.read_u8()? as usize;
        let payload_len = if header & FLAG_SR != 0 {
            cursor.read_u8()? as usize
        } else {
            cursor.read_u32::<BigEndian>()? as usize
        };
        let id_len = if header & FLAG_IL != 0 {
            cursor.read_u8()? as usize
        } else {
            0
        };

        let remaining = cursor.get_ref().len() - cursor.position() as usize;
        if type_len + id_len + payload_len > remaining {
            return Err(std::io::ErrorKind::UnexpectedEof.into());
        }

        let mut record_type = vec![0u8; type_len];
        cursor.read_exact(&mut record_type)?;
        let mut id = vec![0u8; id_len];
        cursor.read_exact(&mut id)?;
        let mut payload = vec![0u8; payload_len];
        cursor.read_exact(&mut payload)?;

        let tnf = Tnf::from_u8(header & TNF_MASK).unwrap_or(Tnf::Unknown);
        Ok((
            Self {
                tnf,
                record_type,
                id,
                payload,
            },
            header,
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NdefMessage {
    records: Vec<NdefRecord>,
}

impl NdefMessage {
    /// Builds a message; an empty record list is rejected.
    pub fn new(records: Vec<NdefRecord>) -> Result<Self> {
        if records.is_empty() {
            return Err(HandoverError::InvalidMessage("message has no records".into()));
        }
        Ok(Self { records })
    }

    /// Builds a message from a leading record and any number of followers
    pub fn with_first(first: NdefRecord, rest: Vec<NdefRecord>) -> Self {
        let mut records = Vec::with_capacity(rest.len() + 1);
        records.push(first);
        records.extend(rest);
        Self { records }
    }

    pub fn records(&self) -> &[NdefRecord] {
        &self.records
    }

    /// The first record; every message has one
    pub fn first(&self) -> &NdefRecord {
        &self.records[0]
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        let last = self.records.len() - 1;
        for (i, record) in self.records.iter().enumerate() {
            record.write_to(&mut out, i == 0, i == last);
        }
        out
    }

    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(data);
        let mut records = Vec::new();

        loop {
            let (record, header) = NdefRecord::read_from(&mut cursor).map_err(|_| {
                HandoverError::InvalidMessage(format!(
                    "record {} truncated at offset {}",
                    records.len(),
                    cursor.position()
                ))
            })?;

            if header & FLAG_CF != 0 {
                return Err(HandoverError::ChunkedRecord);
            }
            if records.is_empty() && header & FLAG_MB == 0 {
                return Err(HandoverError::InvalidMessage("missing message begin".into()));
            }
            if !records.is_empty() && header & FLAG_MB != 0 {
                return Err(HandoverError::InvalidMessage("unexpected message begin".into()));
            }

            records.push(record);

            if header & FLAG_ME != 0 {
                break;
            }
            if cursor.position() as usize >= data.len() {
                return Err(HandoverError::InvalidMessage("missing message end".into()));
            }
        }

        if (cursor.position() as usize) < data.len() {
            return Err(HandoverError::InvalidMessage(
                "trailing bytes after message end".into(),
            ));
        }

        Ok(Self { records })
    }
}
