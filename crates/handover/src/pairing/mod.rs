//! Peripheral pairing
//!
//! Takes a tapped peripheral through bonding and profile connection, or disconnects it
//! when it is already connected. [`PairingMachine`] decides; [`PairingSession`] talks to
//! the radio stack, the host and the timers on its behalf.

mod capability;
mod collaborators;
mod event;
mod machine;
mod session;
mod types;

#[cfg(test)]
pub(crate) mod mock;
#[cfg(test)]
mod tests;

pub use capability::{has_a2dp_capability, has_headset_capability};
pub use collaborators::{
    HandoverSurface, HostSurface, ProxyHandle, ProxyListener, RadioStack, SessionHandle,
};
pub use event::{Effect, SessionEvent, TimerKind};
pub use machine::{PairingMachine, SessionView};
pub use session::{CompletionCallback, PairingSession, PeripheralTarget, SessionContext};
pub use types::*;
