//! Peripheral pairing state machine
//!
//! The machine owns the session state and nothing else. Each input is answered with a
//! list of [`Effect`]s for the driving session to execute; radio and host state is
//! read through [`SessionView`], never changed directly.
//!
//! ```text
//! Init -> WaitingForProxies -> InitComplete -+-> WaitingForBondConfirmation -> Bonding -> Connecting -+-> Complete
//!                                            +-> Disconnecting ----------------------------------------+
//! ```

use super::capability::{has_a2dp_capability, has_headset_capability};
use super::event::{Effect, SessionEvent, TimerKind};
use super::types::*;
use crate::config::HandoverConfig;
use crate::error::StartError;
use crate::gap::{BdAddr, DeviceClass, Transport};
use crate::uuid::Uuid;
use log::{debug, info, warn};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

/// Read-only queries the machine needs about the radio and the host
pub trait SessionView {
    fn is_radio_available(&self) -> bool;
    fn is_device_provisioned(&self) -> bool;
    /// Whether a proxy is bound for every profile in `profiles`
    fn proxies_bound(&self, profiles: &[ProfileKind]) -> bool;
    fn bond_state(&self) -> BondState;
    /// Whether the peer is among the profile's connected devices
    fn is_connected(&self, profile: ProfileKind) -> bool;
    fn connection_state(&self, profile: ProfileKind) -> ProfileConnectionState;
    fn connection_policy(&self, profile: ProfileKind) -> ConnectionPolicy;
    fn is_media_active(&self) -> bool;
}

#[derive(Debug, Default)]
struct TimerSlot {
    generation: u64,
    armed: bool,
}

impl TimerSlot {
    fn arm(&mut self) -> u64 {
        self.generation += 1;
        self.armed = true;
        self.generation
    }

    fn disarm(&mut self) {
        self.generation += 1;
        self.armed = false;
    }

    /// Consumes a firing; stale generations are rejected
    fn fire(&mut self, generation: u64) -> bool {
        if self.armed && self.generation == generation {
            self.armed = false;
            true
        } else {
            false
        }
    }
}

pub struct PairingMachine {
    address: BdAddr,
    transport: Transport,
    config: HandoverConfig,
    state: SessionState,
    action: SessionAction,
    /// Profiles worth connecting, from the tap hints minus forbidden ones
    available: BTreeSet<ProfileKind>,
    results: BTreeMap<ProfileKind, ProfileResult>,
    retry_count: u32,
    media_was_active: bool,
    deadline: TimerSlot,
    retry: TimerSlot,
}

impl PairingMachine {
    pub fn new(
        address: BdAddr,
        transport: Transport,
        uuids: &[Uuid],
        device_class: Option<&DeviceClass>,
        config: HandoverConfig,
    ) -> Self {
        let mut available = BTreeSet::new();
        match transport {
            Transport::Classic => {
                let headset = has_headset_capability(uuids, device_class);
                let a2dp = has_a2dp_capability(uuids, device_class);
                // Hints are optional; with none at all, try both profiles
                if headset || !a2dp {
                    available.insert(ProfileKind::Headset);
                }
                if a2dp || !headset {
                    available.insert(ProfileKind::A2dp);
                }
            }
            Transport::LowEnergy => {
                available.insert(ProfileKind::HidHost);
            }
        }

        Self {
            address,
            transport,
            config,
            state: SessionState::Init,
            action: SessionAction::Init,
            available,
            results: BTreeMap::new(),
            retry_count: 0,
            media_was_active: false,
            deadline: TimerSlot::default(),
            retry: TimerSlot::default(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn action(&self) -> SessionAction {
        self.action
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn is_complete(&self) -> bool {
        self.state == SessionState::Complete
    }

    /// Result recorded for `profile`, once connecting or disconnecting has begun
    pub fn result(&self, profile: ProfileKind) -> Option<ProfileResult> {
        self.results.get(&profile).copied()
    }

    fn profiles(&self) -> &'static [ProfileKind] {
        self.transport.profiles()
    }

    /// Begins the session: subscribes, arms the deadline and requests the proxies
    pub fn start(&mut self, view: &dyn SessionView) -> Result<Vec<Effect>, StartError> {
        if self.state != SessionState::Init {
            return Err(StartError::AlreadyStarted);
        }
        if !view.is_radio_available() {
            return Err(StartError::RadioUnavailable);
        }
        if !view.is_device_provisioned() && self.transport != Transport::LowEnergy {
            return Err(StartError::ProvisioningRestricted);
        }

        let mut fx = vec![Effect::Subscribe];
        self.arm(TimerKind::Deadline, self.config.timeout, &mut fx);
        self.retry_count = 0;
        self.state = SessionState::WaitingForProxies;
        fx.extend(self.profiles().iter().map(|p| Effect::BindProxy(*p)));
        Ok(fx)
    }

    pub fn handle(&mut self, event: SessionEvent, view: &dyn SessionView) -> Vec<Effect> {
        let mut fx = Vec::new();
        if self.is_complete() {
            debug!("Ignoring {:?} after completion", event);
            return fx;
        }

        match event {
            SessionEvent::ProxyBound(profile) => {
                if self.state == SessionState::WaitingForProxies
                    && view.proxies_bound(self.profiles())
                {
                    debug!("{} proxy bound, all proxies ready", profile);
                    self.init_complete(view, &mut fx);
                }
            }
            SessionEvent::ProxyUnavailable(profile) => {
                if self.state == SessionState::WaitingForProxies {
                    warn!("{} proxy unavailable", profile);
                    self.complete(false, &mut fx);
                }
            }
            SessionEvent::Allow { address } if self.is_for_peer(&address, "allow") => {
                if self.state == SessionState::WaitingForBondConfirmation {
                    self.arm(TimerKind::Deadline, self.config.timeout, &mut fx);
                    self.after_confirmation(view, &mut fx);
                } else {
                    debug!("Allow in state {:?} ignored", self.state);
                }
            }
            SessionEvent::Deny { address } if self.is_for_peer(&address, "deny") => {
                if self.state == SessionState::WaitingForBondConfirmation {
                    info!("User declined pairing with {}", self.address);
                    self.complete(false, &mut fx);
                } else {
                    debug!("Deny in state {:?} ignored", self.state);
                }
            }
            SessionEvent::Cancel if self.state == SessionState::Init => {
                debug!("Cancel before start ignored");
            }
            SessionEvent::Cancel => {
                info!("Handover with {} cancelled", self.address);
                if self.state == SessionState::WaitingForBondConfirmation {
                    fx.push(Effect::DismissConfirmation);
                }
                self.complete(false, &mut fx);
            }
            SessionEvent::BondStateChanged {
                address,
                state,
                reason,
            } if self.is_for_peer(&address, "bond state") => {
                if self.state == SessionState::Bonding {
                    self.on_bond_state(state, reason, view, &mut fx);
                }
            }
            SessionEvent::BondRequestFailed => {
                if self.state == SessionState::Bonding {
                    warn!("Could not start bonding with {}", self.address);
                    fx.push(Effect::Notify(Notice::PairingFailed));
                    self.complete(false, &mut fx);
                }
            }
            SessionEvent::ProfileStateChanged {
                address,
                profile,
                state,
            } if self.is_for_peer(&address, "profile state") => {
                if !self.profiles().contains(&profile) {
                    warn!("{} event for a profile this session does not use", profile);
                } else if matches!(
                    self.state,
                    SessionState::Connecting | SessionState::Disconnecting
                ) {
                    self.on_profile_state(profile, state, &mut fx);
                }
            }
            SessionEvent::TimerFired { kind, generation } => {
                let slot = match kind {
                    TimerKind::Deadline => &mut self.deadline,
                    TimerKind::Retry => &mut self.retry,
                };
                if !slot.fire(generation) {
                    debug!("Stale {:?} timer ignored", kind);
                } else {
                    match kind {
                        TimerKind::Deadline => self.on_timeout(&mut fx),
                        TimerKind::Retry => self.on_retry(view, &mut fx),
                    }
                }
            }
            // Address mismatch, already logged
            _ => {}
        }

        fx
    }

    fn is_for_peer(&self, address: &BdAddr, what: &str) -> bool {
        if *address == self.address {
            true
        } else {
            warn!("Ignoring {} event for {}, session is for {}", what, address, self.address);
            false
        }
    }

    fn arm(&mut self, kind: TimerKind, delay: Duration, fx: &mut Vec<Effect>) {
        let generation = match kind {
            TimerKind::Deadline => self.deadline.arm(),
            TimerKind::Retry => self.retry.arm(),
        };
        fx.push(Effect::ArmTimer {
            kind,
            delay,
            generation,
        });
    }

    /// Arms the retry timer, replacing any that is still pending
    fn arm_retry(&mut self, delay: Duration, fx: &mut Vec<Effect>) {
        self.arm(TimerKind::Retry, delay, fx);
    }

    fn retries_left(&self) -> bool {
        self.retry_count < self.config.max_retry_count
    }

    fn init_complete(&mut self, view: &dyn SessionView, fx: &mut Vec<Effect>) {
        self.state = SessionState::InitComplete;

        if self.profiles().iter().any(|p| view.is_connected(*p)) {
            info!("{} already connected, disconnecting", self.address);
            self.action = SessionAction::Disconnect;
            self.start_disconnecting(view, fx);
            return;
        }

        for profile in self.profiles() {
            if view.connection_policy(*profile) == ConnectionPolicy::Forbidden {
                self.available.remove(profile);
            }
        }
        if self.available.is_empty() {
            info!("No usable profile on {}", self.address);
            self.complete(false, fx);
            return;
        }

        info!("Connecting {} over {}", self.address, self.transport);
        self.action = SessionAction::Connect;
        if self.available.contains(&ProfileKind::A2dp) {
            self.media_was_active = view.is_media_active();
        }

        if view.bond_state() != BondState::Bonded {
            self.request_confirmation(fx);
            return;
        }
        if self.transport == Transport::LowEnergy {
            // Drop the old bond so the fresh OOB material from this tap is used
            fx.push(Effect::RemoveBond);
            self.request_confirmation(fx);
            return;
        }
        self.after_confirmation(view, fx);
    }

    fn request_confirmation(&mut self, fx: &mut Vec<Effect>) {
        self.state = SessionState::WaitingForBondConfirmation;
        fx.push(Effect::RequestConfirmation);
    }

    fn after_confirmation(&mut self, view: &dyn SessionView, fx: &mut Vec<Effect>) {
        if view.bond_state() == BondState::Bonded {
            self.start_connecting(view, fx);
        } else {
            self.start_bonding(fx);
        }
    }

    fn start_bonding(&mut self, fx: &mut Vec<Effect>) {
        self.state = SessionState::Bonding;
        if self.retry_count == 0 {
            fx.push(Effect::Notify(Notice::Pairing));
        }
        fx.push(Effect::CreateBond);
    }

    fn on_bond_state(
        &mut self,
        state: BondState,
        reason: Option<UnbondReason>,
        view: &dyn SessionView,
        fx: &mut Vec<Effect>,
    ) {
        match state {
            BondState::Bonded => {
                self.retry_count = 0;
                self.start_connecting(view, fx);
            }
            BondState::None => {
                let reason = reason.unwrap_or(UnbondReason::Unknown);
                if self.retries_left() && !reason.is_auth_failure() {
                    debug!("Bonding failed ({:?}), retrying", reason);
                    self.arm_retry(self.config.retry_pairing_wait, fx);
                } else {
                    info!("Bonding with {} failed: {:?}", self.address, reason);
                    fx.push(Effect::Notify(Notice::PairingFailed));
                    self.complete(false, fx);
                }
            }
            BondState::Bonding => {}
        }
    }

    fn start_connecting(&mut self, view: &dyn SessionView, fx: &mut Vec<Effect>) {
        self.state = SessionState::Connecting;

        for profile in self.profiles() {
            let result = if view.connection_state(*profile) == ProfileConnectionState::Connected {
                ProfileResult::Connected
            } else if self.available.contains(profile) {
                fx.push(Effect::SetConnectionPolicy(*profile, ConnectionPolicy::Allowed));
                ProfileResult::Pending
            } else {
                ProfileResult::Disconnected
            };
            self.results.insert(*profile, result);
        }

        if self.any_pending() {
            if self.retry_count == 0 {
                fx.push(Effect::Notify(Notice::Connecting));
            }
            if self.retries_left() {
                self.arm_retry(self.config.retry_connect_wait, fx);
            }
            return;
        }
        self.evaluate_connect(fx);
    }

    fn any_pending(&self) -> bool {
        self.results.values().any(|r| *r == ProfileResult::Pending)
    }

    fn evaluate_connect(&mut self, fx: &mut Vec<Effect>) {
        if self.any_pending() {
            return;
        }

        let connected = self
            .results
            .values()
            .any(|r| *r == ProfileResult::Connected);
        if connected {
            info!("Connected to {}", self.address);
            fx.push(Effect::Notify(Notice::Connected));
            let a2dp = self.result(ProfileKind::A2dp) == Some(ProfileResult::Connected);
            if a2dp && (self.config.auto_play || self.media_was_active) {
                fx.push(Effect::ResumeMedia);
            }
            fx.push(Effect::SetAlias);
            self.complete(true, fx);
        } else {
            info!("Could not connect to {}", self.address);
            fx.push(Effect::Notify(Notice::ConnectFailed));
            self.complete(false, fx);
        }
    }

    fn start_disconnecting(&mut self, view: &dyn SessionView, fx: &mut Vec<Effect>) {
        self.state = SessionState::Disconnecting;

        for profile in self.profiles() {
            let result =
                if view.connection_state(*profile) == ProfileConnectionState::Disconnected {
                    ProfileResult::Disconnected
                } else {
                    fx.push(Effect::Disconnect(*profile));
                    ProfileResult::Pending
                };
            self.results.insert(*profile, result);
        }

        if self.any_pending() {
            fx.push(Effect::Notify(Notice::Disconnecting));
            return;
        }
        self.evaluate_disconnect(fx);
    }

    fn evaluate_disconnect(&mut self, fx: &mut Vec<Effect>) {
        if self.any_pending() {
            return;
        }
        if self
            .results
            .values()
            .all(|r| *r == ProfileResult::Disconnected)
        {
            fx.push(Effect::Notify(Notice::Disconnected));
        }
        self.complete(false, fx);
    }

    fn on_profile_state(
        &mut self,
        profile: ProfileKind,
        state: ProfileConnectionState,
        fx: &mut Vec<Effect>,
    ) {
        match state {
            ProfileConnectionState::Connected => {
                self.results.insert(profile, ProfileResult::Connected);
            }
            ProfileConnectionState::Disconnected => {
                if self.action == SessionAction::Connect && self.retries_left() {
                    debug!("{} disconnected while connecting, retrying", profile);
                    self.arm_retry(self.config.retry_connect_wait, fx);
                    return;
                }
                self.results.insert(profile, ProfileResult::Disconnected);
            }
            ProfileConnectionState::Connecting | ProfileConnectionState::Disconnecting => {
                return;
            }
        }

        match self.action {
            SessionAction::Connect => self.evaluate_connect(fx),
            SessionAction::Disconnect => self.evaluate_disconnect(fx),
            SessionAction::Init => {}
        }
    }

    fn on_retry(&mut self, view: &dyn SessionView, fx: &mut Vec<Effect>) {
        self.retry_count += 1;
        match self.state {
            SessionState::Bonding => {
                debug!("Re-bonding, attempt {}", self.retry_count);
                self.state = SessionState::WaitingForBondConfirmation;
                self.after_confirmation(view, fx);
            }
            SessionState::Connecting => {
                debug!("Reconnecting, attempt {}", self.retry_count);
                self.state = SessionState::Bonding;
                self.start_connecting(view, fx);
            }
            other => debug!("Retry in state {:?} ignored", other),
        }
    }

    fn on_timeout(&mut self, fx: &mut Vec<Effect>) {
        info!("Handover with {} timed out in {:?}", self.address, self.state);
        match self.state {
            SessionState::WaitingForBondConfirmation => {
                fx.push(Effect::DismissConfirmation);
                self.complete(false, fx);
            }
            SessionState::Bonding => {
                fx.push(Effect::Notify(Notice::PairingFailed));
                self.complete(false, fx);
            }
            SessionState::Connecting => {
                for result in self.results.values_mut() {
                    if *result == ProfileResult::Pending {
                        *result = ProfileResult::Disconnected;
                    }
                }
                // A single connected profile counts as success
                self.evaluate_connect(fx);
            }
            _ => self.complete(false, fx),
        }
    }

    fn complete(&mut self, connected: bool, fx: &mut Vec<Effect>) {
        if self.is_complete() {
            return;
        }
        self.state = SessionState::Complete;
        self.deadline.disarm();
        self.retry.disarm();
        fx.extend([
            Effect::Unsubscribe,
            Effect::CancelTimer(TimerKind::Deadline),
            Effect::CancelTimer(TimerKind::Retry),
            Effect::ReleaseProxies,
            Effect::Complete(connected),
        ]);
    }
}
