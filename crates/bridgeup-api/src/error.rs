// ── API-level error types ──
//
// Transport and protocol failures as seen by the wire layer. Consumers
// of bridgeup-core never handle these directly -- the core crate
// translates them into its own error type. Stream failures travel as
// `StreamEvent`s rather than errors: the stream task retries on its
// own and has no caller to return a `Result` to.

use thiserror::Error;

/// Unified error type for the wire layer.
#[derive(Debug, Error)]
pub enum Error {
    /// Underlying HTTP failure (connect, timeout, TLS, ...).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status code.
    #[error("API returned HTTP {status} for {resource}")]
    Api { resource: String, status: u16 },

    /// A response body could not be decoded into the expected shape.
    #[error("failed to decode {resource} response: {message}")]
    Deserialization { resource: String, message: String },

    /// Endpoint URL could not be constructed.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}
