// ── Core error types ──
//
// User-facing errors from bridgeup-core. Consumers never see raw HTTP
// status codes or JSON parse failures directly -- the `From` impl
// translates wire-layer errors into domain-appropriate variants. Note
// that most network failures never surface as a `Result` at all: the
// synchronizer records them on the snapshot and keeps retrying.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("cannot reach the BridgeUp API: {reason}")]
    ConnectionFailed { reason: String },

    #[error("BridgeUp API rejected the request for {resource} (HTTP {status})")]
    Api { resource: String, status: u16 },

    #[error("unexpected payload shape for {resource}: {message}")]
    Payload { resource: String, message: String },

    #[error("synchronizer already started")]
    AlreadyStarted,

    #[error("synchronizer stopped")]
    Stopped,

    #[error("configuration error: {message}")]
    Config { message: String },
}

// ── Conversion from wire-layer errors ────────────────────────────────

impl From<bridgeup_api::Error> for CoreError {
    fn from(err: bridgeup_api::Error) -> Self {
        match err {
            bridgeup_api::Error::Transport(e) => CoreError::ConnectionFailed {
                reason: e.to_string(),
            },
            bridgeup_api::Error::Api { resource, status } => CoreError::Api { resource, status },
            bridgeup_api::Error::Deserialization { resource, message } => {
                CoreError::Payload { resource, message }
            }
            bridgeup_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("invalid URL: {e}"),
            },
        }
    }
}
