//! Tap-to-pair service
//!
//! Owns at most one [`PairingSession`] at a time and handles the adapter around it:
//! powering the radio up for the handover, pausing tag polling while an LE peripheral
//! pairs, and powering the radio back down afterwards if nothing else needs it.


use crate::gap::{BdAddr, Transport};
use crate::pairing::{PairingSession, PeripheralTarget, SessionContext, SessionHandle};
use crate::timer::TimerId;
use log::{debug, error, info, warn};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// How long tag polling stays paused while an LE peripheral pairs
pub const PAUSE_POLLING_TIMEOUT: Duration = Duration::from_secs(35);
/// Delay before polling is paused, so the tap that started the handover completes
pub const PAUSE_POLLING_DELAY: Duration = Duration::from_millis(300);

/// Power control of the local adapter
pub trait AdapterControl: Send + Sync {
    fn is_enabled(&self) -> bool;

    /// Powers the adapter up without reconnecting previously paired devices.
    /// Completion is reported through
    /// [`on_adapter_state_changed`](PeripheralHandoverService::on_adapter_state_changed).
    fn enable(&self) -> bool;

    fn disable(&self) -> bool;

    /// Whether a bonded device other than `except` is connected
    fn has_other_connections(&self, except: &BdAddr) -> bool;
}

/// The tag reader, whose polling would re-read the tag mid-pairing
pub trait TagPolling: Send + Sync {
    fn pause_polling(&self, timeout: Duration);
    fn resume_polling(&self);
}

/// Outcome reported to whoever asked for the handover
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandoverReply {
    pub connected: bool,
    /// The adapter was powered up for this handover and is still on
    pub enabled_by_handover: bool,
}

pub type ReplyCallback = Box<dyn FnOnce(HandoverReply) + Send>;

pub struct HandoverRequest {
    pub target: PeripheralTarget,
    /// The caller already powered the adapter up for this handover
    pub enabled_by_handover: bool,
    pub reply: Option<ReplyCallback>,
}

impl HandoverRequest {
    pub fn new(target: PeripheralTarget) -> Self {
        Self {
            target,
            enabled_by_handover: false,
            reply: None,
        }
    }

    pub fn with_reply(mut self, reply: impl FnOnce(HandoverReply) + Send + 'static) -> Self {
        self.reply = Some(Box::new(reply));
        self
    }
}

struct InFlight {
    session: PairingSession,
    address: BdAddr,
    transport: Transport,
    outcome: Arc<Mutex<Option<bool>>>,
    reply: Option<ReplyCallback>,
    pause_timer: Option<TimerId>,
}

pub struct PeripheralHandoverService {
    ctx: SessionContext,
    adapter: Arc<dyn AdapterControl>,
    polling: Arc<dyn TagPolling>,
    in_flight: Option<InFlight>,
    enabled_by_handover: bool,
    peer_connected: bool,
}

impl PeripheralHandoverService {
    pub fn new(
        ctx: SessionContext,
        adapter: Arc<dyn AdapterControl>,
        polling: Arc<dyn TagPolling>,
    ) -> Self {
        Self {
            ctx,
            adapter,
            polling,
            in_flight: None,
            enabled_by_handover: false,
            peer_connected: false,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn is_enabled_by_handover(&self) -> bool {
        self.enabled_by_handover
    }

    /// Handle for posting user decisions to the running session
    pub fn session_handle(&self) -> Option<SessionHandle> {
        self.in_flight.as_ref().map(|f| f.session.handle())
    }

    /// Begins a handover. A request made while another is in flight is ignored and
    /// reported as accepted. Returns `false` if the handover could not begin; the reply
    /// callback is not run in that case.
    pub fn request(&mut self, request: HandoverRequest) -> bool {
        if self.in_flight.is_some() {
            debug!("Ignoring pairing request, existing handover in progress");
            return true;
        }

        let HandoverRequest {
            target,
            enabled_by_handover,
            reply,
        } = request;
        self.enabled_by_handover = enabled_by_handover;
        self.peer_connected = false;

        let address = target.address;
        let transport = target.transport;
        let outcome = Arc::new(Mutex::new(None));
        let slot = outcome.clone();
        let session = PairingSession::new(target, self.ctx.clone(), move |connected| {
            *slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(connected);
        });

        let pause_timer = (transport == Transport::LowEnergy).then(|| {
            let polling = self.polling.clone();
            self.ctx.scheduler.schedule(
                PAUSE_POLLING_DELAY,
                Box::new(move || polling.pause_polling(PAUSE_POLLING_TIMEOUT)),
            )
        });

        self.in_flight = Some(InFlight {
            session,
            address,
            transport,
            outcome,
            reply,
            pause_timer,
        });

        if self.adapter.is_enabled() {
            return self.start_in_flight();
        }

        // The session starts once the adapter reports on
        info!("Enabling adapter for handover with {}", address);
        if !self.adapter.enable() {
            error!("Error enabling adapter");
            self.abandon();
            return false;
        }
        self.enabled_by_handover = true;
        true
    }

    /// Adapter power notifications. A handover waiting on the adapter starts on power up.
    pub fn on_adapter_state_changed(&mut self, enabled: bool) {
        if !enabled {
            return;
        }
        let waiting = self
            .in_flight
            .as_ref()
            .is_some_and(|f| !f.session.has_started());
        if waiting {
            self.start_in_flight();
        }
    }

    /// Runs the in-flight session's queued events and wraps up a finished handover.
    /// Returns `true` while a handover is still in flight.
    pub fn dispatch_pending(&mut self) -> bool {
        if let Some(in_flight) = self.in_flight.as_mut() {
            in_flight.session.dispatch_pending();
        }
        self.finish_if_complete();
        self.is_busy()
    }

    /// Blocks until the in-flight handover completes
    pub fn run(&mut self) {
        if let Some(in_flight) = self.in_flight.as_mut() {
            in_flight.session.run();
        }
        self.finish_if_complete();
    }

    fn start_in_flight(&mut self) -> bool {
        let started = self
            .in_flight
            .as_mut()
            .is_some_and(|f| f.session.start());
        if !started {
            self.abandon();
        }
        started
    }

    /// Drops a handover that never started
    fn abandon(&mut self) {
        let Some(in_flight) = self.in_flight.take() else {
            return;
        };
        if let Some(id) = in_flight.pause_timer {
            self.ctx.scheduler.cancel(id);
            self.polling.resume_polling();
        }
        self.disable_adapter_if_needed(&in_flight.address);
    }

    fn finish_if_complete(&mut self) {
        let outcome = match &self.in_flight {
            Some(in_flight) => *in_flight
                .outcome
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
            None => return,
        };
        let Some(connected) = outcome else {
            return;
        };
        let Some(mut in_flight) = self.in_flight.take() else {
            return;
        };

        self.peer_connected = connected;
        if in_flight.transport == Transport::LowEnergy && !connected {
            // Let the user retry right away. On success polling comes back on its own
            // so a peripheral left on the reader is not re-tapped and disconnected.
            if let Some(id) = in_flight.pause_timer.take() {
                self.ctx.scheduler.cancel(id);
            }
            self.polling.resume_polling();
        }
        self.disable_adapter_if_needed(&in_flight.address);

        let reply = HandoverReply {
            connected,
            enabled_by_handover: self.enabled_by_handover,
        };
        info!("Handover with {} finished: {:?}", in_flight.address, reply);
        if let Some(callback) = in_flight.reply.take() {
            callback(reply);
        }
    }

    fn disable_adapter_if_needed(&mut self, peer: &BdAddr) {
        if !self.enabled_by_handover || self.peer_connected {
            return;
        }
        // The peer's own connection state may lag, so only other devices count
        if self.adapter.has_other_connections(peer) {
            return;
        }
        debug!("Disabling adapter enabled for handover");
        if !self.adapter.disable() {
            warn!("Could not disable adapter");
        }
        self.enabled_by_handover = false;
    }
}
