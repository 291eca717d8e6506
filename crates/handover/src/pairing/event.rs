//! Inputs to and outputs from the pairing machine

use super::types::{
    BondState, ConnectionPolicy, Notice, ProfileConnectionState, ProfileKind, UnbondReason,
};
use crate::gap::BdAddr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Overall deadline of the attempt
    Deadline,
    /// Backoff before re-bonding or reconnecting
    Retry,
}

/// Everything that can move a session forward.
///
/// Radio and user events carry the address they concern; the session drops events for
/// any other peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A profile proxy became usable
    ProxyBound(ProfileKind),
    /// The radio refused to bind a profile proxy
    ProxyUnavailable(ProfileKind),
    BondStateChanged {
        address: BdAddr,
        state: BondState,
        reason: Option<UnbondReason>,
    },
    /// The radio refused to start bonding
    BondRequestFailed,
    ProfileStateChanged {
        address: BdAddr,
        profile: ProfileKind,
        state: ProfileConnectionState,
    },
    /// The user allowed pairing with the tapped peer
    Allow { address: BdAddr },
    /// The user declined pairing
    Deny { address: BdAddr },
    /// The caller gave up on the attempt
    Cancel,
    TimerFired { kind: TimerKind, generation: u64 },
}

/// Side effects requested by the machine, executed in order by the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Subscribe,
    Unsubscribe,
    /// Arms `kind`, replacing any earlier timer of that kind
    ArmTimer {
        kind: TimerKind,
        delay: Duration,
        generation: u64,
    },
    CancelTimer(TimerKind),
    BindProxy(ProfileKind),
    ReleaseProxies,
    RequestConfirmation,
    DismissConfirmation,
    CreateBond,
    RemoveBond,
    SetConnectionPolicy(ProfileKind, ConnectionPolicy),
    Disconnect(ProfileKind),
    Notify(Notice),
    ResumeMedia,
    SetAlias,
    /// Final outcome; always the last effect of a session
    Complete(bool),
}
