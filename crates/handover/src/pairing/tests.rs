//! Unit tests for peripheral pairing

use super::mock::*;
use super::*;
use crate::config::HandoverConfig;
use crate::error::StartError;
use crate::gap::{AddressType, DeviceClass, Transport};
use crate::oob::OobPairingMaterial;
use crate::timer::ManualScheduler;
use crate::uuid::Uuid;
use std::sync::{Arc, Mutex};
use std::time::Duration;

struct Harness {
    radio: Arc<MockRadio>,
    host: Arc<MockHost>,
    scheduler: Arc<ManualScheduler>,
    surface: HandoverSurface,
    config: HandoverConfig,
    outcomes: Arc<Mutex<Vec<bool>>>,
}

impl Harness {
    fn new() -> Self {
        Self {
            radio: MockRadio::new(),
            host: Arc::new(MockHost::default()),
            scheduler: Arc::new(ManualScheduler::new()),
            surface: HandoverSurface::new(),
            config: HandoverConfig::default(),
            outcomes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn session(&self, target: PeripheralTarget) -> PairingSession {
        let ctx = SessionContext {
            radio: self.radio.clone(),
            host: self.host.clone(),
            scheduler: self.scheduler.clone(),
            surface: self.surface.clone(),
            config: self.config.clone(),
        };
        let outcomes = self.outcomes.clone();
        PairingSession::new(target, ctx, move |connected| {
            outcomes.lock().unwrap().push(connected)
        })
    }

    fn classic(&self) -> PairingSession {
        self.session(PeripheralTarget::new(peer(), "Headphones", Transport::Classic))
    }

    fn le(&self) -> PairingSession {
        let mut target = PeripheralTarget::new(peer(), "Keyboard", Transport::LowEnergy);
        target.oob = Some(OobPairingMaterial::new(peer(), AddressType::Random));
        self.session(target)
    }

    fn outcomes(&self) -> Vec<bool> {
        self.outcomes.lock().unwrap().clone()
    }

    /// Advances the clock a second at a time, letting the session react in between
    fn run_for(&self, session: &mut PairingSession, seconds: u64) {
        for _ in 0..seconds {
            self.scheduler.advance(Duration::from_secs(1));
            session.dispatch_pending();
        }
    }

    /// Starts `session` and takes it to the allow/deny prompt
    fn start_to_prompt(&self, session: &mut PairingSession) {
        assert!(session.start());
        session.dispatch_pending();
        assert_eq!(session.state(), SessionState::WaitingForBondConfirmation);
    }

    /// Starts a classic session and takes it to the point where both profiles are
    /// connecting
    fn start_to_connecting(&self, session: &mut PairingSession) {
        self.start_to_prompt(session);
        session.handle().post(SessionEvent::Allow { address: peer() });
        session.dispatch_pending();
        assert_eq!(session.state(), SessionState::Bonding);

        self.radio.bond(BondState::Bonded, None);
        session.dispatch_pending();
        assert_eq!(session.state(), SessionState::Connecting);
    }
}

#[test]
fn test_classic_connect() {
    let h = Harness::new();
    let mut session = h.classic();

    h.start_to_prompt(&mut session);
    assert_eq!(h.host.with(|s| s.prompts), 1);
    assert_eq!(session.action(), SessionAction::Connect);
    assert!(h.surface.is_busy());

    session.handle().post(SessionEvent::Allow { address: peer() });
    session.dispatch_pending();
    assert_eq!(session.state(), SessionState::Bonding);
    assert_eq!(h.radio.count(&Call::CreateBond { oob: false }), 1);

    h.radio.bond(BondState::Bonded, None);
    session.dispatch_pending();
    assert_eq!(session.state(), SessionState::Connecting);
    assert_eq!(
        h.radio.count(&Call::SetPolicy(ProfileKind::Headset, ConnectionPolicy::Allowed)),
        1
    );
    assert_eq!(
        h.radio.count(&Call::SetPolicy(ProfileKind::A2dp, ConnectionPolicy::Allowed)),
        1
    );

    h.radio.profile(ProfileKind::Headset, ProfileConnectionState::Connected);
    session.dispatch_pending();
    assert!(!session.is_complete());

    h.radio.profile(ProfileKind::A2dp, ProfileConnectionState::Connected);
    session.dispatch_pending();
    assert!(session.is_complete());

    assert_eq!(h.outcomes(), vec![true]);
    assert_eq!(
        h.host.notices(),
        vec![Notice::Pairing, Notice::Connecting, Notice::Connected]
    );
    assert_eq!(h.host.with(|s| s.alias.clone()), Some("Headphones".to_string()));
    assert_eq!(h.host.with(|s| s.resumed), 0);

    // Teardown
    assert_eq!(h.radio.count(&Call::Unsubscribe), 1);
    assert_eq!(h.radio.count(&Call::Release(ProfileKind::Headset)), 1);
    assert_eq!(h.radio.count(&Call::Release(ProfileKind::A2dp)), 1);
    assert!(!h.surface.is_busy());
    assert_eq!(h.scheduler.pending(), 0);
}

#[test]
fn test_partial_success_at_deadline() {
    let h = Harness::new();
    let mut session = h.classic();
    h.start_to_connecting(&mut session);

    h.radio.profile(ProfileKind::Headset, ProfileConnectionState::Connected);
    session.dispatch_pending();
    assert!(!session.is_complete());

    h.run_for(&mut session, 25);
    assert!(session.is_complete());
    assert_eq!(h.outcomes(), vec![true]);
    assert!(h.host.notices().contains(&Notice::Connected));
    // Audio sink never connected, so nothing to resume
    assert_eq!(h.host.with(|s| s.resumed), 0);
}

#[test]
fn test_connect_failure_at_deadline() {
    let h = Harness::new();
    let mut session = h.classic();
    h.start_to_connecting(&mut session);

    h.run_for(&mut session, 24);
    assert!(!session.is_complete());
    h.run_for(&mut session, 1);
    assert!(session.is_complete());

    assert_eq!(h.outcomes(), vec![false]);
    assert_eq!(h.host.notices().last(), Some(&Notice::ConnectFailed));
    // Initial attempt plus three retries
    assert_eq!(
        h.radio.count(&Call::SetPolicy(ProfileKind::A2dp, ConnectionPolicy::Allowed)),
        4
    );
    // The connecting notice is shown once
    assert_eq!(
        h.host
            .notices()
            .iter()
            .filter(|n| **n == Notice::Connecting)
            .count(),
        1
    );
}

#[test]
fn test_deny_aborts_before_bonding() {
    let h = Harness::new();
    let mut session = h.classic();
    h.start_to_prompt(&mut session);

    session.handle().post(SessionEvent::Deny { address: peer() });
    session.dispatch_pending();

    assert!(session.is_complete());
    assert_eq!(h.outcomes(), vec![false]);
    assert_eq!(h.radio.create_bond_calls(), 0);
    assert!(!h.surface.is_busy());
}

#[test]
fn test_confirmation_timeout_dismisses_prompt() {
    let h = Harness::new();
    let mut session = h.classic();
    h.start_to_prompt(&mut session);

    h.run_for(&mut session, 25);

    assert!(session.is_complete());
    assert_eq!(h.outcomes(), vec![false]);
    assert_eq!(h.host.with(|s| s.dismissed), 1);
    assert_eq!(h.radio.create_bond_calls(), 0);
}

#[test]
fn test_allow_rearms_deadline() {
    let h = Harness::new();
    let mut session = h.classic();
    h.start_to_prompt(&mut session);

    h.run_for(&mut session, 20);
    session.handle().post(SessionEvent::Allow { address: peer() });
    session.dispatch_pending();

    // The first deadline would have fired at 25 s
    h.run_for(&mut session, 10);
    assert_eq!(session.state(), SessionState::Bonding);

    h.run_for(&mut session, 15);
    assert!(session.is_complete());
    assert_eq!(h.outcomes(), vec![false]);
    assert_eq!(h.host.notices().last(), Some(&Notice::PairingFailed));
}

#[test]
fn test_session_singleton() {
    let h = Harness::new();
    let mut first = h.classic();
    let mut second = h.classic();

    assert!(first.start());
    assert!(!second.start());
    assert_eq!(second.try_start(), Err(StartError::SurfaceBusy));
    assert!(!second.has_started());

    // The first session carries on untouched
    first.dispatch_pending();
    assert_eq!(first.state(), SessionState::WaitingForBondConfirmation);

    first.process(SessionEvent::Cancel);
    assert!(first.is_complete());
    assert!(second.start());
}

#[test]
fn test_start_rejections() {
    let h = Harness::new();
    let mut session = h.classic();
    assert!(session.start());
    assert_eq!(session.try_start(), Err(StartError::AlreadyStarted));

    let h = Harness::new();
    h.radio.with(|s| s.available = false);
    let mut session = h.classic();
    assert_eq!(session.try_start(), Err(StartError::RadioUnavailable));
    assert!(!h.surface.is_busy());
    assert!(h.radio.calls().is_empty());

    let h = Harness::new();
    h.host.with(|s| s.unprovisioned = true);
    let mut session = h.classic();
    assert_eq!(session.try_start(), Err(StartError::ProvisioningRestricted));
    // LE handover is allowed during provisioning
    let mut session = h.le();
    assert_eq!(session.try_start(), Ok(()));
    assert!(h.outcomes().is_empty());
}

#[test]
fn test_bond_retry_then_success() {
    let h = Harness::new();
    let mut session = h.classic();
    h.start_to_prompt(&mut session);
    session.handle().post(SessionEvent::Allow { address: peer() });
    session.dispatch_pending();

    h.radio.bond(BondState::None, Some(UnbondReason::RemoteDeviceDown));
    session.dispatch_pending();
    assert_eq!(session.state(), SessionState::Bonding);
    assert_eq!(h.radio.create_bond_calls(), 1);

    h.run_for(&mut session, 2);
    assert_eq!(h.radio.create_bond_calls(), 2);
    assert_eq!(session.state(), SessionState::Bonding);

    h.radio.bond(BondState::Bonded, None);
    session.dispatch_pending();
    assert_eq!(session.state(), SessionState::Connecting);

    // Pairing notice only for the first attempt; retries reset once bonded
    let pairing = h
        .host
        .notices()
        .iter()
        .filter(|n| **n == Notice::Pairing)
        .count();
    assert_eq!(pairing, 1);
    assert!(h.host.notices().contains(&Notice::Connecting));
}

#[test]
fn test_bond_auth_rejection_is_final() {
    let h = Harness::new();
    let mut session = h.classic();
    h.start_to_prompt(&mut session);
    session.handle().post(SessionEvent::Allow { address: peer() });
    session.dispatch_pending();

    h.radio.bond(BondState::None, Some(UnbondReason::AuthRejected));
    session.dispatch_pending();

    assert!(session.is_complete());
    assert_eq!(h.outcomes(), vec![false]);
    assert_eq!(h.radio.create_bond_calls(), 1);
    assert_eq!(h.host.notices().last(), Some(&Notice::PairingFailed));
}

#[test]
fn test_bond_retries_exhausted() {
    let h = Harness::new();
    let mut session = h.classic();
    h.start_to_prompt(&mut session);
    session.handle().post(SessionEvent::Allow { address: peer() });
    session.dispatch_pending();

    for _ in 0..3 {
        h.radio.bond(BondState::None, Some(UnbondReason::AuthTimeout));
        session.dispatch_pending();
        h.run_for(&mut session, 2);
    }
    assert_eq!(h.radio.create_bond_calls(), 4);
    assert!(!session.is_complete());

    h.radio.bond(BondState::None, Some(UnbondReason::AuthTimeout));
    session.dispatch_pending();
    assert!(session.is_complete());
    assert_eq!(h.outcomes(), vec![false]);
}

#[test]
fn test_bond_request_refused() {
    let h = Harness::new();
    h.radio.with(|s| s.create_bond_ok = false);
    let mut session = h.classic();
    h.start_to_prompt(&mut session);

    session.handle().post(SessionEvent::Allow { address: peer() });
    session.dispatch_pending();

    assert!(session.is_complete());
    assert_eq!(h.outcomes(), vec![false]);
    assert_eq!(h.host.notices().last(), Some(&Notice::PairingFailed));
}

#[test]
fn test_connected_peer_is_disconnected() {
    let h = Harness::new();
    h.radio.with(|s| {
        s.bond_state = BondState::Bonded;
        s.connected.push(ProfileKind::Headset);
        s.states
            .insert(ProfileKind::Headset, ProfileConnectionState::Connected);
    });
    let mut session = h.classic();
    assert!(session.start());
    session.dispatch_pending();

    assert_eq!(session.action(), SessionAction::Disconnect);
    assert_eq!(session.state(), SessionState::Disconnecting);
    assert_eq!(h.radio.count(&Call::Disconnect(ProfileKind::Headset)), 1);
    assert_eq!(h.radio.count(&Call::Disconnect(ProfileKind::A2dp)), 0);
    assert_eq!(h.host.notices(), vec![Notice::Disconnecting]);

    h.radio
        .profile(ProfileKind::Headset, ProfileConnectionState::Disconnected);
    session.dispatch_pending();

    assert!(session.is_complete());
    assert_eq!(h.outcomes(), vec![false]);
    assert_eq!(
        h.host.notices(),
        vec![Notice::Disconnecting, Notice::Disconnected]
    );
    assert_eq!(h.host.with(|s| s.prompts), 0);
}

#[test]
fn test_bonded_classic_peer_skips_prompt() {
    let h = Harness::new();
    h.radio.with(|s| s.bond_state = BondState::Bonded);
    let mut session = h.classic();
    assert!(session.start());
    session.dispatch_pending();

    assert_eq!(session.state(), SessionState::Connecting);
    assert_eq!(h.host.with(|s| s.prompts), 0);
    assert_eq!(h.radio.create_bond_calls(), 0);
}

#[test]
fn test_bonded_le_peer_is_rebonded() {
    let h = Harness::new();
    h.radio.with(|s| s.bond_state = BondState::Bonded);
    let mut session = h.le();
    assert!(session.start());
    session.dispatch_pending();

    assert_eq!(session.state(), SessionState::WaitingForBondConfirmation);
    assert_eq!(h.radio.count(&Call::RemoveBond), 1);
    assert_eq!(h.radio.count(&Call::Bind(ProfileKind::HidHost)), 1);

    session.handle().post(SessionEvent::Allow { address: peer() });
    session.dispatch_pending();
    assert_eq!(h.radio.count(&Call::CreateBond { oob: true }), 1);

    h.radio.bond(BondState::Bonded, None);
    session.dispatch_pending();
    assert_eq!(
        h.radio.count(&Call::SetPolicy(ProfileKind::HidHost, ConnectionPolicy::Allowed)),
        1
    );

    h.radio
        .profile(ProfileKind::HidHost, ProfileConnectionState::Connected);
    session.dispatch_pending();
    assert_eq!(h.outcomes(), vec![true]);
    assert_eq!(h.host.with(|s| s.alias.clone()), Some("Keyboard".to_string()));
}

#[test]
fn test_forbidden_profiles_are_skipped() {
    let h = Harness::new();
    h.radio.with(|s| {
        s.policies
            .insert(ProfileKind::Headset, ConnectionPolicy::Forbidden);
    });
    let mut session = h.classic();
    h.start_to_connecting(&mut session);

    assert_eq!(
        h.radio.count(&Call::SetPolicy(ProfileKind::Headset, ConnectionPolicy::Allowed)),
        0
    );
    assert_eq!(
        h.radio.count(&Call::SetPolicy(ProfileKind::A2dp, ConnectionPolicy::Allowed)),
        1
    );

    // The headset result is settled, so the audio sink alone decides
    h.radio.profile(ProfileKind::A2dp, ProfileConnectionState::Connected);
    session.dispatch_pending();
    assert_eq!(h.outcomes(), vec![true]);
}

#[test]
fn test_all_profiles_forbidden_fails() {
    let h = Harness::new();
    h.radio.with(|s| {
        s.policies
            .insert(ProfileKind::Headset, ConnectionPolicy::Forbidden);
        s.policies.insert(ProfileKind::A2dp, ConnectionPolicy::Forbidden);
    });
    let mut session = h.classic();
    assert!(session.start());
    session.dispatch_pending();

    assert!(session.is_complete());
    assert_eq!(h.outcomes(), vec![false]);
    assert_eq!(h.host.with(|s| s.prompts), 0);
}

#[test]
fn test_hints_limit_profiles() {
    let h = Harness::new();
    // Headphones class of device: audio sink only
    let mut target = PeripheralTarget::new(peer(), "Headphones", Transport::Classic);
    target.device_class = Some(DeviceClass::from_bytes([0x18, 0x04, 0x04]));
    let mut session = h.session(target);
    h.start_to_connecting(&mut session);

    assert_eq!(
        h.radio.count(&Call::SetPolicy(ProfileKind::Headset, ConnectionPolicy::Allowed)),
        0
    );

    let h = Harness::new();
    let mut target = PeripheralTarget::new(peer(), "Car kit", Transport::Classic);
    target.uuids = vec![Uuid::from(0x111E_u16)];
    let mut session = h.session(target);
    h.start_to_connecting(&mut session);

    assert_eq!(
        h.radio.count(&Call::SetPolicy(ProfileKind::A2dp, ConnectionPolicy::Allowed)),
        0
    );
}

#[test]
fn test_media_resumed_when_playing_before_tap() {
    let h = Harness::new();
    h.host.with(|s| s.media_active = true);
    let mut session = h.classic();
    h.start_to_connecting(&mut session);

    h.radio.profile(ProfileKind::A2dp, ProfileConnectionState::Connected);
    h.radio.profile(ProfileKind::Headset, ProfileConnectionState::Connected);
    session.dispatch_pending();

    assert_eq!(h.outcomes(), vec![true]);
    assert_eq!(h.host.with(|s| s.resumed), 1);
}

#[test]
fn test_auto_play_resumes_media() {
    let mut h = Harness::new();
    h.config.auto_play = true;
    let mut session = h.classic();
    h.start_to_connecting(&mut session);

    h.radio.profile(ProfileKind::A2dp, ProfileConnectionState::Connected);
    h.radio.profile(ProfileKind::Headset, ProfileConnectionState::Connected);
    session.dispatch_pending();

    assert_eq!(h.host.with(|s| s.resumed), 1);
}

#[test]
fn test_disconnect_event_while_connecting_retries() {
    let h = Harness::new();
    let mut session = h.classic();
    h.start_to_connecting(&mut session);

    h.radio.profile(ProfileKind::Headset, ProfileConnectionState::Connected);
    h.radio
        .profile(ProfileKind::A2dp, ProfileConnectionState::Disconnected);
    session.dispatch_pending();

    // Still waiting on the audio sink rather than giving up on it
    assert!(!session.is_complete());
    assert_eq!(session.state(), SessionState::Connecting);

    h.run_for(&mut session, 5);
    assert_eq!(
        h.radio.count(&Call::SetPolicy(ProfileKind::A2dp, ConnectionPolicy::Allowed)),
        2
    );

    h.radio.profile(ProfileKind::A2dp, ProfileConnectionState::Connected);
    session.dispatch_pending();
    assert_eq!(h.outcomes(), vec![true]);
}

#[test]
fn test_disconnect_event_pushes_retry_back() {
    let h = Harness::new();
    let mut session = h.classic();
    h.start_to_connecting(&mut session);
    let a2dp_policy = Call::SetPolicy(ProfileKind::A2dp, ConnectionPolicy::Allowed);

    h.run_for(&mut session, 3);
    h.radio
        .profile(ProfileKind::A2dp, ProfileConnectionState::Disconnected);
    session.dispatch_pending();

    // The first retry would have fired at 5 s; the disconnect moved it to 8 s
    h.run_for(&mut session, 2);
    assert_eq!(h.radio.count(&a2dp_policy), 1);
    assert_eq!(h.scheduler.pending(), 2);

    h.run_for(&mut session, 3);
    assert_eq!(h.radio.count(&a2dp_policy), 2);
    assert_eq!(session.state(), SessionState::Connecting);
}

#[test]
fn test_cancel_while_prompting() {
    let h = Harness::new();
    let mut session = h.classic();
    h.start_to_prompt(&mut session);

    session.handle().post(SessionEvent::Cancel);
    session.dispatch_pending();

    assert_eq!(h.outcomes(), vec![false]);
    assert_eq!(h.host.with(|s| s.dismissed), 1);
}

#[test]
fn test_proxy_bind_failure_fails_session() {
    let h = Harness::new();
    h.radio.with(|s| s.bind_fails.push(ProfileKind::A2dp));
    let mut session = h.classic();

    assert!(session.start());
    session.dispatch_pending();

    assert!(session.is_complete());
    assert_eq!(h.outcomes(), vec![false]);
    assert_eq!(h.host.with(|s| s.prompts), 0);
    // The proxy that did bind is given back
    assert_eq!(h.radio.count(&Call::Release(ProfileKind::Headset)), 1);
}

#[test]
fn test_foreign_and_stale_events_are_ignored() {
    let h = Harness::new();
    let mut session = h.classic();
    h.start_to_prompt(&mut session);

    // Events about another peer
    session.handle().post(SessionEvent::Allow { address: other() });
    session.handle().post(SessionEvent::Deny { address: other() });
    session.dispatch_pending();
    assert_eq!(session.state(), SessionState::WaitingForBondConfirmation);

    // Bond events outside bonding
    h.radio.bond(BondState::Bonded, None);
    session.dispatch_pending();
    assert_eq!(session.state(), SessionState::WaitingForBondConfirmation);

    session.handle().post(SessionEvent::Deny { address: peer() });
    session.dispatch_pending();
    assert!(session.is_complete());

    // Anything after completion is a no-op
    let handle = session.handle();
    handle.post(SessionEvent::Allow { address: peer() });
    handle.post(SessionEvent::Cancel);
    handle.post(SessionEvent::TimerFired {
        kind: TimerKind::Deadline,
        generation: 1,
    });
    session.dispatch_pending();
    h.run_for(&mut session, 30);

    assert_eq!(h.outcomes(), vec![false]);
    assert_eq!(h.radio.create_bond_calls(), 0);
}

#[test]
fn test_profile_event_for_unused_profile_is_ignored() {
    let h = Harness::new();
    let mut session = h.classic();
    h.start_to_connecting(&mut session);

    h.radio
        .profile(ProfileKind::HidHost, ProfileConnectionState::Connected);
    session.dispatch_pending();

    assert!(!session.is_complete());
    assert_eq!(session.state(), SessionState::Connecting);
}

#[test]
fn test_drop_releases_surface() {
    let h = Harness::new();
    {
        let mut session = h.classic();
        h.start_to_prompt(&mut session);
        assert!(h.surface.is_busy());
    }
    assert!(!h.surface.is_busy());
    assert_eq!(h.scheduler.pending(), 0);
    assert!(h.outcomes().is_empty());
}

#[test]
fn test_late_proxies_are_released_after_completion() {
    let h = Harness::new();
    h.radio.with(|s| s.defer_binds = true);
    let mut session = h.classic();

    assert!(session.start());
    session.dispatch_pending();
    assert_eq!(session.state(), SessionState::WaitingForProxies);

    h.run_for(&mut session, 26);
    assert_eq!(h.outcomes(), vec![false]);
    assert_eq!(h.radio.count(&Call::Release(ProfileKind::Headset)), 0);

    // The stack gets round to binding after the session has given up
    h.radio.deliver_binds();
    session.dispatch_pending();

    assert_eq!(h.radio.count(&Call::Release(ProfileKind::Headset)), 1);
    assert_eq!(h.radio.count(&Call::Release(ProfileKind::A2dp)), 1);
    assert_eq!(h.outcomes(), vec![false]);
}

#[test]
fn test_late_proxies_are_released_after_drop() {
    let h = Harness::new();
    h.radio.with(|s| s.defer_binds = true);
    {
        let mut session = h.classic();
        assert!(session.start());
        session.dispatch_pending();
    }
    assert!(!h.surface.is_busy());

    h.radio.deliver_binds();

    assert_eq!(h.radio.count(&Call::Release(ProfileKind::Headset)), 1);
    assert_eq!(h.radio.count(&Call::Release(ProfileKind::A2dp)), 1);
    assert!(h.outcomes().is_empty());
}

/// Fixed answers for driving the machine directly
struct StaticView {
    bond_state: BondState,
}

impl SessionView for StaticView {
    fn is_radio_available(&self) -> bool {
        true
    }

    fn is_device_provisioned(&self) -> bool {
        true
    }

    fn proxies_bound(&self, _profiles: &[ProfileKind]) -> bool {
        true
    }

    fn bond_state(&self) -> BondState {
        self.bond_state
    }

    fn is_connected(&self, _profile: ProfileKind) -> bool {
        false
    }

    fn connection_state(&self, _profile: ProfileKind) -> ProfileConnectionState {
        ProfileConnectionState::Disconnected
    }

    fn connection_policy(&self, _profile: ProfileKind) -> ConnectionPolicy {
        ConnectionPolicy::Unknown
    }

    fn is_media_active(&self) -> bool {
        false
    }
}

#[test]
fn test_machine_start_effects() {
    let view = StaticView {
        bond_state: BondState::None,
    };
    let mut machine = PairingMachine::new(
        peer(),
        Transport::Classic,
        &[],
        None,
        HandoverConfig::default(),
    );

    let fx = machine.start(&view).unwrap();
    assert_eq!(
        fx,
        vec![
            Effect::Subscribe,
            Effect::ArmTimer {
                kind: TimerKind::Deadline,
                delay: Duration::from_secs(25),
                generation: 1,
            },
            Effect::BindProxy(ProfileKind::Headset),
            Effect::BindProxy(ProfileKind::A2dp),
        ]
    );
    assert_eq!(machine.state(), SessionState::WaitingForProxies);
    assert_eq!(machine.start(&view), Err(StartError::AlreadyStarted));
}

#[test]
fn test_machine_ignores_stale_timer_generation() {
    let view = StaticView {
        bond_state: BondState::None,
    };
    let mut machine = PairingMachine::new(
        peer(),
        Transport::Classic,
        &[],
        None,
        HandoverConfig::default(),
    );
    machine.start(&view).unwrap();
    machine.handle(SessionEvent::ProxyBound(ProfileKind::Headset), &view);
    assert_eq!(machine.state(), SessionState::WaitingForBondConfirmation);

    // Allow re-arms the deadline as generation 2
    let fx = machine.handle(SessionEvent::Allow { address: peer() }, &view);
    assert!(fx.contains(&Effect::ArmTimer {
        kind: TimerKind::Deadline,
        delay: Duration::from_secs(25),
        generation: 2,
    }));

    let fx = machine.handle(
        SessionEvent::TimerFired {
            kind: TimerKind::Deadline,
            generation: 1,
        },
        &view,
    );
    assert!(fx.is_empty());
    assert_eq!(machine.state(), SessionState::Bonding);

    let fx = machine.handle(
        SessionEvent::TimerFired {
            kind: TimerKind::Deadline,
            generation: 2,
        },
        &view,
    );
    assert_eq!(fx.last(), Some(&Effect::Complete(false)));
    assert!(machine.is_complete());
}

#[test]
fn test_machine_retry_rearm_replaces_pending_timer() {
    let view = StaticView {
        bond_state: BondState::None,
    };
    let config = HandoverConfig::default();
    let retry = |generation| Effect::ArmTimer {
        kind: TimerKind::Retry,
        delay: config.retry_connect_wait,
        generation,
    };
    let mut machine = PairingMachine::new(
        peer(),
        Transport::Classic,
        &[],
        None,
        config.clone(),
    );
    machine.start(&view).unwrap();
    machine.handle(SessionEvent::ProxyBound(ProfileKind::Headset), &view);
    machine.handle(SessionEvent::Allow { address: peer() }, &view);

    let fx = machine.handle(
        SessionEvent::BondStateChanged {
            address: peer(),
            state: BondState::Bonded,
            reason: None,
        },
        &view,
    );
    assert_eq!(machine.state(), SessionState::Connecting);
    assert!(fx.contains(&retry(1)));

    let fx = machine.handle(
        SessionEvent::ProfileStateChanged {
            address: peer(),
            profile: ProfileKind::A2dp,
            state: ProfileConnectionState::Disconnected,
        },
        &view,
    );
    assert_eq!(fx, vec![retry(2)]);

    // The replaced timer is stale
    let fx = machine.handle(
        SessionEvent::TimerFired {
            kind: TimerKind::Retry,
            generation: 1,
        },
        &view,
    );
    assert!(fx.is_empty());
    assert_eq!(machine.retry_count(), 0);

    let fx = machine.handle(
        SessionEvent::TimerFired {
            kind: TimerKind::Retry,
            generation: 2,
        },
        &view,
    );
    assert_eq!(machine.retry_count(), 1);
    assert!(fx.contains(&Effect::SetConnectionPolicy(
        ProfileKind::A2dp,
        ConnectionPolicy::Allowed
    )));
    assert!(fx.contains(&retry(3)));
}
