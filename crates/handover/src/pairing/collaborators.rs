//! Seams to the radio stack and to the host device

use super::event::SessionEvent;
use super::types::{BondState, ConnectionPolicy, Notice, ProfileConnectionState, ProfileKind};
use crate::gap::{BdAddr, Transport};
use crate::oob::OobPairingMaterial;
use log::debug;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Opaque handle to a bound profile proxy, returned to the radio on release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProxyHandle(pub u64);

/// The Bluetooth stack a session drives.
///
/// Bonding and profile connections complete asynchronously; the stack reports progress
/// by posting [`SessionEvent`]s to every subscribed [`SessionHandle`].
pub trait RadioStack: Send + Sync {
    fn is_available(&self) -> bool;

    fn bond_state(&self, address: &BdAddr) -> BondState;

    /// Starts bonding, out of band when `oob` is given. Returns `false` if the
    /// attempt could not be started.
    fn create_bond(
        &self,
        address: &BdAddr,
        transport: Transport,
        oob: Option<&OobPairingMaterial>,
    ) -> bool;

    fn remove_bond(&self, address: &BdAddr) -> bool;

    fn connected_devices(&self, profile: ProfileKind) -> Vec<BdAddr>;

    fn connection_state(&self, profile: ProfileKind, address: &BdAddr) -> ProfileConnectionState;

    fn connection_policy(&self, profile: ProfileKind, address: &BdAddr) -> ConnectionPolicy;

    /// Setting [`ConnectionPolicy::Allowed`] also asks the stack to connect the profile
    fn set_connection_policy(
        &self,
        profile: ProfileKind,
        address: &BdAddr,
        policy: ConnectionPolicy,
    ) -> bool;

    fn disconnect(&self, profile: ProfileKind, address: &BdAddr) -> bool;

    /// Requests a profile proxy. The stack hands the proxy to `listener` once it is
    /// usable, possibly before this call returns. Returns `false` if the profile is not
    /// supported at all.
    fn bind_profile_proxy(&self, profile: ProfileKind, listener: ProxyListener) -> bool;

    fn release_profile_proxy(&self, profile: ProfileKind, proxy: ProxyHandle);

    fn subscribe(&self, handle: SessionHandle);

    fn unsubscribe(&self, handle: &SessionHandle);
}

/// The device hosting the handover: notices, the pairing prompt and media control
pub trait HostSurface: Send + Sync {
    fn notify(&self, notice: Notice, device_name: &str);

    /// Shows the allow/deny prompt. The answer comes back as
    /// [`SessionEvent::Allow`] or [`SessionEvent::Deny`].
    fn request_pair_confirmation(&self, address: &BdAddr, name: &str);

    fn dismiss_pair_confirmation(&self, address: &BdAddr);

    fn is_device_provisioned(&self) -> bool;

    fn is_media_active(&self) -> bool;

    fn resume_media(&self);

    fn set_alias(&self, address: &BdAddr, name: &str);
}

static NEXT_HANDLE_ID: AtomicU64 = AtomicU64::new(1);

/// Posts events into a session's queue. Cheap to clone and safe to use from any thread.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    id: u64,
    sender: Sender<SessionEvent>,
}

impl SessionHandle {
    pub(crate) fn new(sender: Sender<SessionEvent>) -> Self {
        Self {
            id: NEXT_HANDLE_ID.fetch_add(1, Ordering::Relaxed),
            sender,
        }
    }

    /// Identifies the session; clones share it
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Queues `event`. Events posted after the session is gone are dropped.
    pub fn post(&self, event: SessionEvent) {
        if self.sender.send(event).is_err() {
            debug!("Session {} is gone, dropping event", self.id);
        }
    }
}

impl PartialEq for SessionHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for SessionHandle {}

/// Profile proxies bound for one session.
///
/// Once closed, the table accepts no more proxies.
#[derive(Debug, Default)]
pub(crate) struct ProxyTable {
    bound: HashMap<ProfileKind, ProxyHandle>,
    closed: bool,
}

impl ProxyTable {
    pub(crate) fn contains(&self, profile: &ProfileKind) -> bool {
        self.bound.contains_key(profile)
    }

    /// Closes the table and hands back every proxy bound so far
    pub(crate) fn close(&mut self) -> Vec<(ProfileKind, ProxyHandle)> {
        self.closed = true;
        self.bound.drain().collect()
    }
}

pub(crate) fn lock_table(table: &Mutex<ProxyTable>) -> MutexGuard<'_, ProxyTable> {
    table.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Receives profile proxies on the radio stack's thread.
///
/// A proxy that arrives after its session has released its proxies goes straight back
/// to the radio.
pub struct ProxyListener {
    table: Arc<Mutex<ProxyTable>>,
    radio: Arc<dyn RadioStack>,
    handle: SessionHandle,
}

impl ProxyListener {
    pub(crate) fn new(
        table: Arc<Mutex<ProxyTable>>,
        radio: Arc<dyn RadioStack>,
        handle: SessionHandle,
    ) -> Self {
        Self {
            table,
            radio,
            handle,
        }
    }

    pub fn on_service_connected(&self, profile: ProfileKind, proxy: ProxyHandle) {
        let mut table = lock_table(&self.table);
        if table.closed {
            drop(table);
            debug!("{} proxy arrived after its session ended, releasing it", profile);
            self.radio.release_profile_proxy(profile, proxy);
            return;
        }
        table.bound.insert(profile, proxy);
        drop(table);
        self.handle.post(SessionEvent::ProxyBound(profile));
    }

    pub fn on_service_disconnected(&self, profile: ProfileKind) {
        debug!("{} proxy disconnected", profile);
    }
}

/// The single handover slot of a device.
///
/// Only one session may drive a handover at a time; clones share the slot.
#[derive(Debug, Clone, Default)]
pub struct HandoverSurface {
    owner: Arc<Mutex<Option<u64>>>,
}

impl HandoverSurface {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Option<u64>> {
        self.owner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_busy(&self) -> bool {
        self.lock().is_some()
    }

    pub(crate) fn try_claim(&self, session: u64) -> bool {
        let mut owner = self.lock();
        match *owner {
            Some(current) => current == session,
            None => {
                *owner = Some(session);
                true
            }
        }
    }

    pub(crate) fn release(&self, session: u64) {
        let mut owner = self.lock();
        if *owner == Some(session) {
            *owner = None;
        }
    }
}
