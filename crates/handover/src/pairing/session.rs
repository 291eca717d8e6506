//! Drives a [`PairingMachine`] against the real collaborators

use super::collaborators::*;
use super::event::{Effect, SessionEvent, TimerKind};
use super::machine::{PairingMachine, SessionView};
use super::types::*;
use crate::config::HandoverConfig;
use crate::error::StartError;
use crate::gap::{BdAddr, DeviceClass, Transport};
use crate::oob::{HandoverRecord, OobPairingMaterial};
use crate::timer::{Scheduler, TimerId};
use crate::uuid::Uuid;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::{Arc, Mutex};

/// The peripheral a session pairs with, as learned from the tap
#[derive(Debug, Clone)]
pub struct PeripheralTarget {
    pub address: BdAddr,
    pub name: String,
    pub transport: Transport,
    pub oob: Option<OobPairingMaterial>,
    pub uuids: Vec<Uuid>,
    pub device_class: Option<DeviceClass>,
}

impl PeripheralTarget {
    pub fn new(address: BdAddr, name: impl Into<String>, transport: Transport) -> Self {
        Self {
            address,
            name: name.into(),
            transport,
            oob: None,
            uuids: Vec::new(),
            device_class: None,
        }
    }

    /// The target described by a decoded record; `None` unless the record is valid
    pub fn from_record(record: &HandoverRecord) -> Option<Self> {
        if !record.valid {
            return None;
        }
        Some(Self {
            address: record.address?,
            name: record.name.clone(),
            transport: record.transport,
            oob: record.oob.clone(),
            uuids: record.uuids.clone(),
            device_class: record.device_class,
        })
    }
}

/// Collaborators shared by every session on a device
#[derive(Clone)]
pub struct SessionContext {
    pub radio: Arc<dyn RadioStack>,
    pub host: Arc<dyn HostSurface>,
    pub scheduler: Arc<dyn Scheduler>,
    pub surface: HandoverSurface,
    pub config: HandoverConfig,
}

pub type CompletionCallback = Box<dyn FnOnce(bool) + Send>;

/// Answers machine queries from the live collaborators
struct LiveView<'a> {
    address: &'a BdAddr,
    radio: &'a dyn RadioStack,
    host: &'a dyn HostSurface,
    proxies: &'a Mutex<ProxyTable>,
}

impl SessionView for LiveView<'_> {
    fn is_radio_available(&self) -> bool {
        self.radio.is_available()
    }

    fn is_device_provisioned(&self) -> bool {
        self.host.is_device_provisioned()
    }

    fn proxies_bound(&self, profiles: &[ProfileKind]) -> bool {
        let table = lock_table(self.proxies);
        profiles.iter().all(|p| table.contains(p))
    }

    fn bond_state(&self) -> BondState {
        self.radio.bond_state(self.address)
    }

    fn is_connected(&self, profile: ProfileKind) -> bool {
        self.radio.connected_devices(profile).contains(self.address)
    }

    fn connection_state(&self, profile: ProfileKind) -> ProfileConnectionState {
        self.radio.connection_state(profile, self.address)
    }

    fn connection_policy(&self, profile: ProfileKind) -> ConnectionPolicy {
        self.radio.connection_policy(profile, self.address)
    }

    fn is_media_active(&self) -> bool {
        self.host.is_media_active()
    }
}

/// One tap-triggered handover attempt.
///
/// A session is single use. After [`start`](PairingSession::start) it reacts to events
/// posted through its [`SessionHandle`]; call [`run`](PairingSession::run) on a
/// dedicated thread, or [`dispatch_pending`](PairingSession::dispatch_pending) from an
/// existing loop. The completion callback runs exactly once.
pub struct PairingSession {
    target: PeripheralTarget,
    machine: PairingMachine,
    ctx: SessionContext,
    proxies: Arc<Mutex<ProxyTable>>,
    handle: SessionHandle,
    events: Receiver<SessionEvent>,
    timers: HashMap<TimerKind, TimerId>,
    on_complete: Option<CompletionCallback>,
}

impl PairingSession {
    pub fn new(
        target: PeripheralTarget,
        ctx: SessionContext,
        on_complete: impl FnOnce(bool) + Send + 'static,
    ) -> Self {
        let machine = PairingMachine::new(
            target.address,
            target.transport,
            &target.uuids,
            target.device_class.as_ref(),
            ctx.config.clone(),
        );
        let (sender, events) = mpsc::channel();

        Self {
            target,
            machine,
            ctx,
            proxies: Arc::new(Mutex::new(ProxyTable::default())),
            handle: SessionHandle::new(sender),
            events,
            timers: HashMap::new(),
            on_complete: Some(Box::new(on_complete)),
        }
    }

    /// Handle for posting events to this session
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    pub fn state(&self) -> SessionState {
        self.machine.state()
    }

    pub fn action(&self) -> SessionAction {
        self.machine.action()
    }

    pub fn is_complete(&self) -> bool {
        self.machine.is_complete()
    }

    pub fn has_started(&self) -> bool {
        self.machine.state() != SessionState::Init
    }

    /// Starts the handover. Returns `false` if the session cannot start; nothing
    /// changes in that case and the completion callback is not run.
    pub fn start(&mut self) -> bool {
        match self.try_start() {
            Ok(()) => true,
            Err(e) => {
                info!("Not starting handover with {}: {}", self.target.address, e);
                false
            }
        }
    }

    /// Like [`start`](Self::start), but says why a session could not start
    pub fn try_start(&mut self) -> Result<(), StartError> {
        if self.has_started() {
            return Err(StartError::AlreadyStarted);
        }
        if !self.ctx.surface.try_claim(self.handle.id()) {
            return Err(StartError::SurfaceBusy);
        }

        let view = LiveView {
            address: &self.target.address,
            radio: &*self.ctx.radio,
            host: &*self.ctx.host,
            proxies: &self.proxies,
        };
        let effects = match self.machine.start(&view) {
            Ok(effects) => effects,
            Err(e) => {
                self.ctx.surface.release(self.handle.id());
                return Err(e);
            }
        };

        info!(
            "Starting {} handover with {} ({})",
            self.target.transport, self.target.address, self.target.name
        );
        self.execute(effects);
        Ok(())
    }

    /// Feeds one event through the machine and executes the resulting effects
    pub fn process(&mut self, event: SessionEvent) {
        let view = LiveView {
            address: &self.target.address,
            radio: &*self.ctx.radio,
            host: &*self.ctx.host,
            proxies: &self.proxies,
        };
        let effects = self.machine.handle(event, &view);
        self.execute(effects);
    }

    /// Processes every queued event without blocking. Returns `true` once complete.
    pub fn dispatch_pending(&mut self) -> bool {
        loop {
            match self.events.try_recv() {
                Ok(event) => self.process(event),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        self.is_complete()
    }

    /// Blocks processing events until the session completes
    pub fn run(&mut self) {
        while self.has_started() && !self.is_complete() {
            match self.events.recv() {
                Ok(event) => self.process(event),
                Err(_) => break,
            }
        }
    }

    fn execute(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            self.execute_one(effect);
        }
    }

    fn execute_one(&mut self, effect: Effect) {
        let address = &self.target.address;
        let radio = &self.ctx.radio;
        let host = &self.ctx.host;

        match effect {
            Effect::Subscribe => radio.subscribe(self.handle.clone()),
            Effect::Unsubscribe => radio.unsubscribe(&self.handle),
            Effect::ArmTimer {
                kind,
                delay,
                generation,
            } => {
                if let Some(previous) = self.timers.remove(&kind) {
                    self.ctx.scheduler.cancel(previous);
                }
                let handle = self.handle.clone();
                let id = self.ctx.scheduler.schedule(
                    delay,
                    Box::new(move || handle.post(SessionEvent::TimerFired { kind, generation })),
                );
                self.timers.insert(kind, id);
            }
            Effect::CancelTimer(kind) => {
                if let Some(id) = self.timers.remove(&kind) {
                    self.ctx.scheduler.cancel(id);
                }
            }
            Effect::BindProxy(profile) => {
                let listener = ProxyListener::new(
                    self.proxies.clone(),
                    self.ctx.radio.clone(),
                    self.handle.clone(),
                );
                if !radio.bind_profile_proxy(profile, listener) {
                    self.handle.post(SessionEvent::ProxyUnavailable(profile));
                }
            }
            Effect::ReleaseProxies => {
                let bound = lock_table(&self.proxies).close();
                for (profile, proxy) in bound {
                    radio.release_profile_proxy(profile, proxy);
                }
            }
            Effect::RequestConfirmation => {
                host.request_pair_confirmation(address, &self.target.name)
            }
            Effect::DismissConfirmation => host.dismiss_pair_confirmation(address),
            Effect::CreateBond => {
                let oob = self.target.oob.as_ref();
                if oob.is_some_and(|m| !m.has_keys()) {
                    debug!("OOB data for {} carries no keys, bonding without them", address);
                }
                if !radio.create_bond(address, self.target.transport, oob) {
                    self.handle.post(SessionEvent::BondRequestFailed);
                }
            }
            Effect::RemoveBond => {
                if !radio.remove_bond(address) {
                    warn!("Could not remove bond with {}", address);
                }
            }
            Effect::SetConnectionPolicy(profile, policy) => {
                if !radio.set_connection_policy(profile, address, policy) {
                    warn!("Could not set {} policy {:?} for {}", profile, policy, address);
                }
            }
            Effect::Disconnect(profile) => {
                if !radio.disconnect(profile, address) {
                    warn!("Could not disconnect {} from {}", profile, address);
                }
            }
            Effect::Notify(notice) => host.notify(notice, &self.target.name),
            Effect::ResumeMedia => host.resume_media(),
            Effect::SetAlias => host.set_alias(address, &self.target.name),
            Effect::Complete(connected) => {
                debug!("Handover with {} complete, connected: {}", address, connected);
                self.ctx.surface.release(self.handle.id());
                if let Some(on_complete) = self.on_complete.take() {
                    on_complete(connected);
                }
            }
        }
    }
}

impl Drop for PairingSession {
    fn drop(&mut self) {
        if !self.has_started() || self.is_complete() {
            return;
        }
        // Abandoned mid-flight: detach from the radio without reporting an outcome
        debug!("Dropping unfinished session for {}", self.target.address);
        self.ctx.radio.unsubscribe(&self.handle);
        for (_, id) in self.timers.drain() {
            self.ctx.scheduler.cancel(id);
        }
        let bound = lock_table(&self.proxies).close();
        for (profile, proxy) in bound {
            self.ctx.radio.release_profile_proxy(profile, proxy);
        }
        self.ctx.surface.release(self.handle.id());
    }
}
