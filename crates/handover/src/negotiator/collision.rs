//! Handover request collision resolution
//!
//! When both devices send a handover request at once, each compares its own collision
//! random with the peer's to decide who answers as selector.

use crate::ndef::{NdefMessage, NdefRecord, Tnf, RTD_COLLISION_RESOLUTION, RTD_HANDOVER_REQUEST};
use crate::oob::constants::COLLISION_RANDOM_SIZE;

/// Role the local device takes after a request collision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionOutcome {
    /// Keep waiting for the peer's select
    Requester,
    /// Answer the peer's request with a select
    Selector,
    /// Randoms were identical; send a new request with a fresh random
    Retry,
}

/// Decides the local role from the two collision randoms.
///
/// When the least significant bits agree the larger number selects, otherwise the
/// smaller one does.
pub fn resolve_collision(
    local: [u8; COLLISION_RANDOM_SIZE],
    remote: [u8; COLLISION_RANDOM_SIZE],
) -> CollisionOutcome {
    let local = u16::from_be_bytes(local);
    let remote = u16::from_be_bytes(remote);

    if local == remote {
        return CollisionOutcome::Retry;
    }

    let same_parity = (local ^ remote) & 1 == 0;
    let local_selects = if same_parity {
        local > remote
    } else {
        local < remote
    };

    if local_selects {
        CollisionOutcome::Selector
    } else {
        CollisionOutcome::Requester
    }
}

/// The collision random nested in a handover request record
pub fn collision_random(handover_request: &NdefRecord) -> Option<[u8; COLLISION_RANDOM_SIZE]> {
    if !handover_request.is(Tnf::WellKnown, RTD_HANDOVER_REQUEST) {
        return None;
    }
    let nested = NdefMessage::parse(handover_request.payload.get(1..)?).ok()?;
    nested
        .records()
        .iter()
        .find(|r| r.is(Tnf::WellKnown, RTD_COLLISION_RESOLUTION))
        .and_then(|r| r.payload.as_slice().try_into().ok())
}
