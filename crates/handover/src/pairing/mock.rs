//! Test doubles for the radio stack and the host

use super::*;
use crate::gap::{BdAddr, Transport};
use crate::oob::OobPairingMaterial;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Subscribe,
    Unsubscribe,
    Bind(ProfileKind),
    Release(ProfileKind),
    CreateBond { oob: bool },
    RemoveBond,
    SetPolicy(ProfileKind, ConnectionPolicy),
    Disconnect(ProfileKind),
}

pub(crate) struct RadioState {
    pub(crate) available: bool,
    pub(crate) bond_state: BondState,
    pub(crate) create_bond_ok: bool,
    pub(crate) connected: Vec<ProfileKind>,
    pub(crate) states: HashMap<ProfileKind, ProfileConnectionState>,
    pub(crate) policies: HashMap<ProfileKind, ConnectionPolicy>,
    pub(crate) bind_fails: Vec<ProfileKind>,
    pub(crate) defer_binds: bool,
    pub(crate) deferred: Vec<(ProfileKind, ProxyListener)>,
    pub(crate) subscribers: Vec<SessionHandle>,
    pub(crate) next_proxy: u64,
    pub(crate) calls: Vec<Call>,
}

/// Mock radio stack; proxies bind synchronously unless `defer_binds` is set
pub(crate) struct MockRadio {
    pub(crate) state: Mutex<RadioState>,
}

impl MockRadio {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(RadioState {
                available: true,
                bond_state: BondState::None,
                create_bond_ok: true,
                connected: Vec::new(),
                states: HashMap::new(),
                policies: HashMap::new(),
                bind_fails: Vec::new(),
                defer_binds: false,
                deferred: Vec::new(),
                subscribers: Vec::new(),
                next_proxy: 1,
                calls: Vec::new(),
            }),
        })
    }

    pub(crate) fn with<R>(&self, f: impl FnOnce(&mut RadioState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.with(|s| s.calls.clone())
    }

    pub(crate) fn count(&self, call: &Call) -> usize {
        self.with(|s| s.calls.iter().filter(|c| *c == call).count())
    }

    pub(crate) fn create_bond_calls(&self) -> usize {
        self.with(|s| {
            s.calls
                .iter()
                .filter(|c| matches!(c, Call::CreateBond { .. }))
                .count()
        })
    }

    /// Hands each deferred bind its proxy
    pub(crate) fn deliver_binds(&self) {
        let deferred = self.with(|s| std::mem::take(&mut s.deferred));
        for (profile, listener) in deferred {
            let proxy = self.with(|s| {
                s.next_proxy += 1;
                ProxyHandle(s.next_proxy)
            });
            listener.on_service_connected(profile, proxy);
        }
    }

    /// Posts `event` to every subscribed session
    pub(crate) fn emit(&self, event: SessionEvent) {
        let subscribers = self.with(|s| s.subscribers.clone());
        for handle in subscribers {
            handle.post(event.clone());
        }
    }

    pub(crate) fn bond(&self, state: BondState, reason: Option<UnbondReason>) {
        self.with(|s| s.bond_state = state);
        self.emit(SessionEvent::BondStateChanged {
            address: peer(),
            state,
            reason,
        });
    }

    pub(crate) fn profile(&self, profile: ProfileKind, state: ProfileConnectionState) {
        self.with(|s| {
            s.states.insert(profile, state);
            s.connected.retain(|p| *p != profile);
            if state == ProfileConnectionState::Connected {
                s.connected.push(profile);
            }
        });
        self.emit(SessionEvent::ProfileStateChanged {
            address: peer(),
            profile,
            state,
        });
    }
}

impl RadioStack for MockRadio {
    fn is_available(&self) -> bool {
        self.with(|s| s.available)
    }

    fn bond_state(&self, _address: &BdAddr) -> BondState {
        self.with(|s| s.bond_state)
    }

    fn create_bond(
        &self,
        _address: &BdAddr,
        _transport: Transport,
        oob: Option<&OobPairingMaterial>,
    ) -> bool {
        self.with(|s| {
            s.calls.push(Call::CreateBond { oob: oob.is_some() });
            if s.create_bond_ok {
                s.bond_state = BondState::Bonding;
            }
            s.create_bond_ok
        })
    }

    fn remove_bond(&self, _address: &BdAddr) -> bool {
        self.with(|s| {
            s.calls.push(Call::RemoveBond);
            s.bond_state = BondState::None;
        });
        true
    }

    fn connected_devices(&self, profile: ProfileKind) -> Vec<BdAddr> {
        self.with(|s| {
            if s.connected.contains(&profile) {
                vec![peer()]
            } else {
                Vec::new()
            }
        })
    }

    fn connection_state(&self, profile: ProfileKind, _address: &BdAddr) -> ProfileConnectionState {
        self.with(|s| {
            s.states
                .get(&profile)
                .copied()
                .unwrap_or(ProfileConnectionState::Disconnected)
        })
    }

    fn connection_policy(&self, profile: ProfileKind, _address: &BdAddr) -> ConnectionPolicy {
        self.with(|s| {
            s.policies
                .get(&profile)
                .copied()
                .unwrap_or(ConnectionPolicy::Unknown)
        })
    }

    fn set_connection_policy(
        &self,
        profile: ProfileKind,
        _address: &BdAddr,
        policy: ConnectionPolicy,
    ) -> bool {
        self.with(|s| s.calls.push(Call::SetPolicy(profile, policy)));
        true
    }

    fn disconnect(&self, profile: ProfileKind, _address: &BdAddr) -> bool {
        self.with(|s| s.calls.push(Call::Disconnect(profile)));
        true
    }

    fn bind_profile_proxy(&self, profile: ProfileKind, listener: ProxyListener) -> bool {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Bind(profile));
        if state.bind_fails.contains(&profile) {
            return false;
        }
        if state.defer_binds {
            state.deferred.push((profile, listener));
            return true;
        }
        state.next_proxy += 1;
        let proxy = ProxyHandle(state.next_proxy);
        drop(state);
        listener.on_service_connected(profile, proxy);
        true
    }

    fn release_profile_proxy(&self, profile: ProfileKind, _proxy: ProxyHandle) {
        self.with(|s| s.calls.push(Call::Release(profile)));
    }

    fn subscribe(&self, handle: SessionHandle) {
        self.with(|s| {
            s.calls.push(Call::Subscribe);
            s.subscribers.push(handle);
        });
    }

    fn unsubscribe(&self, handle: &SessionHandle) {
        self.with(|s| {
            s.calls.push(Call::Unsubscribe);
            s.subscribers.retain(|h| h != handle);
        });
    }
}

#[derive(Default)]
pub(crate) struct HostState {
    pub(crate) unprovisioned: bool,
    pub(crate) media_active: bool,
    pub(crate) notices: Vec<Notice>,
    pub(crate) prompts: usize,
    pub(crate) dismissed: usize,
    pub(crate) resumed: usize,
    pub(crate) alias: Option<String>,
}

#[derive(Default)]
pub(crate) struct MockHost {
    pub(crate) state: Mutex<HostState>,
}

impl MockHost {
    pub(crate) fn with<R>(&self, f: impl FnOnce(&mut HostState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    pub(crate) fn notices(&self) -> Vec<Notice> {
        self.with(|s| s.notices.clone())
    }
}

impl HostSurface for MockHost {
    fn notify(&self, notice: Notice, _device_name: &str) {
        self.with(|s| s.notices.push(notice));
    }

    fn request_pair_confirmation(&self, _address: &BdAddr, _name: &str) {
        self.with(|s| s.prompts += 1);
    }

    fn dismiss_pair_confirmation(&self, _address: &BdAddr) {
        self.with(|s| s.dismissed += 1);
    }

    fn is_device_provisioned(&self) -> bool {
        self.with(|s| !s.unprovisioned)
    }

    fn is_media_active(&self) -> bool {
        self.with(|s| s.media_active)
    }

    fn resume_media(&self) {
        self.with(|s| s.resumed += 1);
    }

    fn set_alias(&self, _address: &BdAddr, name: &str) {
        self.with(|s| s.alias = Some(name.to_string()));
    }
}

pub(crate) fn peer() -> BdAddr {
    "00:1B:DC:0F:10:2A".parse().unwrap()
}

pub(crate) fn other() -> BdAddr {
    "11:22:33:44:55:66".parse().unwrap()
}
