//! Error types for the handover library
//!
//! Protocol-level failures during a pairing session are never surfaced here; a session
//! only reports its outcome through the completion callback. These errors exist for the
//! API seams that can genuinely be misused: container framing, address text and
//! session start-up.

use thiserror::Error;

/// Errors that can occur at the library's API seams
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandoverError {
    #[error("Invalid NDEF message: {0}")]
    InvalidMessage(String),

    #[error("Chunked NDEF records are not supported")]
    ChunkedRecord,

    #[error("Invalid Bluetooth address: {0}")]
    InvalidAddress(String),

    #[error("Session could not be started: {0}")]
    Start(#[from] StartError),
}

/// Reasons a pairing session refuses to start
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartError {
    #[error("session has already been started")]
    AlreadyStarted,

    #[error("another handover session is in progress")]
    SurfaceBusy,

    #[error("Bluetooth radio is not available")]
    RadioUnavailable,

    #[error("device is provisioning; only LE handover is permitted")]
    ProvisioningRestricted,
}

pub type Result<T> = std::result::Result<T, HandoverError>;
