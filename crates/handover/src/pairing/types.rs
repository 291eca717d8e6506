use crate::gap::Transport;
use std::fmt;

/// Profiles a tapped peripheral may be connected on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProfileKind {
    /// Headset / hands-free audio gateway
    Headset,
    /// Advanced audio distribution (audio sink)
    A2dp,
    /// HID over GATT host
    HidHost,
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileKind::Headset => write!(f, "HFP/HSP"),
            ProfileKind::A2dp => write!(f, "A2DP"),
            ProfileKind::HidHost => write!(f, "HID"),
        }
    }
}

const CLASSIC_PROFILES: &[ProfileKind] = &[ProfileKind::Headset, ProfileKind::A2dp];
const LE_PROFILES: &[ProfileKind] = &[ProfileKind::HidHost];

impl Transport {
    /// Profiles a handover over this transport binds and connects
    pub fn profiles(&self) -> &'static [ProfileKind] {
        match self {
            Transport::Classic => CLASSIC_PROFILES,
            Transport::LowEnergy => LE_PROFILES,
        }
    }
}

/// Outcome tracked per profile while connecting or disconnecting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileResult {
    Pending,
    Connected,
    Disconnected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Disconnecting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionPolicy {
    Unknown,
    Forbidden,
    Allowed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BondState {
    None,
    Bonding,
    Bonded,
}

/// Why a bond attempt ended without a bond
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnbondReason {
    AuthFailed,
    AuthRejected,
    AuthCanceled,
    RemoteDeviceDown,
    DiscoveryInProgress,
    AuthTimeout,
    RepeatedAttempts,
    RemoteAuthCanceled,
    Removed,
    Unknown,
}

impl UnbondReason {
    /// Failures that another bond attempt cannot fix
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, UnbondReason::AuthFailed | UnbondReason::AuthRejected)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Init,
    WaitingForProxies,
    InitComplete,
    WaitingForBondConfirmation,
    Bonding,
    Connecting,
    Disconnecting,
    Complete,
}

/// What the session decided to do once the profile proxies were bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    Init,
    Connect,
    Disconnect,
}

/// User-visible progress notices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Pairing,
    PairingFailed,
    Connecting,
    Connected,
    Disconnecting,
    Disconnected,
    ConnectFailed,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Notice::Pairing => "Pairing",
            Notice::PairingFailed => "Could not pair",
            Notice::Connecting => "Connecting",
            Notice::Connected => "Connected",
            Notice::Disconnecting => "Disconnecting",
            Notice::Disconnected => "Disconnected",
            Notice::ConnectFailed => "Could not connect",
        };
        f.write_str(text)
    }
}
