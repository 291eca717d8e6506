//! Handover negotiation
//!
//! Recognizes inbound handover requests, answers them with a select carrying the local
//! adapter's address, and decodes the selects we get back for our own requests.

mod collision;


pub use collision::{collision_random, resolve_collision, CollisionOutcome};

use crate::gap::{BdAddr, Transport};
use crate::ndef::{NdefMessage, Tnf, RTD_HANDOVER_REQUEST, TYPE_BT_OOB};
use crate::oob::encode::{request_message, select_message};
use crate::oob::{decode_message, parse_bt_oob, HandoverRecord};
use log::debug;
use std::sync::{Arc, Mutex, PoisonError};

/// The local Bluetooth adapter, as far as negotiation needs it
pub trait LocalAdapter: Send + Sync {
    /// Public address, or `None` while the adapter cannot report it
    fn address(&self) -> Option<BdAddr>;

    fn is_enabled(&self) -> bool;
}

/// A peer's handover request together with the select we answer it with
#[derive(Debug, Clone)]
pub struct IncomingHandoverData {
    pub select: NdefMessage,
    pub record: HandoverRecord,
}

pub struct HandoverNegotiator {
    adapter: Option<Arc<dyn LocalAdapter>>,
    local_address: Mutex<Option<BdAddr>>,
}

impl HandoverNegotiator {
    /// `adapter` is `None` on devices without Bluetooth
    pub fn new(adapter: Option<Arc<dyn LocalAdapter>>) -> Self {
        Self {
            adapter,
            local_address: Mutex::new(None),
        }
    }

    pub fn is_handover_supported(&self) -> bool {
        self.adapter.is_some()
    }

    /// The local address, queried once and cached. An unknown address is not cached so
    /// the next message asks the adapter again.
    fn local_address(&self) -> Option<BdAddr> {
        let mut cached = self
            .local_address
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if cached.is_none() {
            *cached = self.adapter.as_ref().and_then(|a| a.address());
        }
        *cached
    }

    fn local_record(&self) -> HandoverRecord {
        match self.local_address() {
            Some(address) => HandoverRecord::for_address(address, Transport::Classic),
            None => HandoverRecord::invalid(Transport::Classic),
        }
    }

    pub fn create_handover_request_message(&self) -> Option<NdefMessage> {
        self.adapter.as_ref()?;
        Some(request_message(&self.local_record()))
    }

    pub fn create_handover_select_message(&self, activating: bool) -> NdefMessage {
        let mut record = self.local_record();
        record.carrier_activating = activating;
        select_message(&record)
    }

    /// Answers a peer's handover request.
    ///
    /// Returns `None` unless `request` starts with an `Hr` record and offers a BR/EDR
    /// carrier. The carrier is marked activating when the local adapter is off.
    pub fn incoming_handover_data(&self, request: &NdefMessage) -> Option<IncomingHandoverData> {
        let adapter = self.adapter.as_ref()?;

        if !request.first().is(Tnf::WellKnown, RTD_HANDOVER_REQUEST) {
            return None;
        }

        let record = request
            .records()
            .iter()
            .rev()
            .find(|r| r.is(Tnf::MimeMedia, TYPE_BT_OOB))
            .map(|r| parse_bt_oob(&r.payload))?;

        // The adapter may be switched off right after this check; the transfer then
        // fails on its own.
        let activating = !adapter.is_enabled();
        let select = self.create_handover_select_message(activating);
        debug!(
            "Answering handover request from {:?} (activating: {})",
            record.address, activating
        );

        Some(IncomingHandoverData { select, record })
    }

    /// Decodes the peer descriptor from the select answering our request
    pub fn outgoing_handover_data(&self, select: &NdefMessage) -> Option<HandoverRecord> {
        decode_message(select)
    }
}
