//! Bounded reads over an OOB payload
//!
//! Every read is checked against the payload end; running past it yields
//! `UnexpectedEof`, which the parsers treat as truncation rather than a failure.

use byteorder::ReadBytesExt;
use std::io::{self, Cursor, Read};

pub(crate) struct OobReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> OobReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(data),
        }
    }

    pub fn remaining(&self) -> usize {
        let len = self.cursor.get_ref().len() as u64;
        len.saturating_sub(self.cursor.position()) as usize
    }

    pub fn seek(&mut self, position: u64) {
        self.cursor.set_position(position);
    }

    pub fn read_u8(&mut self) -> io::Result<u8> {
        self.cursor.read_u8()
    }

    pub fn read_array<const N: usize>(&mut self) -> io::Result<[u8; N]> {
        let mut out = [0u8; N];
        self.cursor.read_exact(&mut out)?;
        Ok(out)
    }

    pub fn read_vec(&mut self, len: usize) -> io::Result<Vec<u8>> {
        if len > self.remaining() {
            return Err(io::ErrorKind::UnexpectedEof.into());
        }
        let mut out = vec![0u8; len];
        self.cursor.read_exact(&mut out)?;
        Ok(out)
    }

    /// Reads `len` bytes as a UTF-8 string, replacing invalid sequences
    pub fn read_string(&mut self, len: usize) -> io::Result<String> {
        let bytes = self.read_vec(len)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    pub fn skip(&mut self, len: usize) -> io::Result<()> {
        if len > self.remaining() {
            return Err(io::ErrorKind::UnexpectedEof.into());
        }
        self.cursor.set_position(self.cursor.position() + len as u64);
        Ok(())
    }

    /// Reads an EIR-style `[length][type]` header.
    ///
    /// Returns the data type and the number of data bytes that follow, or `None` for a
    /// zero length entry, which terminates the stream.
    pub fn read_tlv_header(&mut self) -> io::Result<Option<(u8, usize)>> {
        let len = self.read_u8()? as usize;
        if len == 0 {
            return Ok(None);
        }
        let data_type = self.read_u8()?;
        Ok(Some((data_type, len - 1)))
    }
}
