//! Typed NDEF records
//!
//! The tag-exchanged container is an NDEF message: a sequence of records, each with a
//! type name format, a type, an optional id and a payload. Handover select and request
//! records nest a further NDEF message inside their payload, so the codec needs to
//! serialize and re-parse messages, not only read them.
//!
//! Only unchunked records are supported.

pub mod constants;
mod record;


pub use constants::*;
pub use record::{NdefMessage, NdefRecord, Tnf};
