// bridgeup-api: wire-level client for the BridgeUp API (REST + WebSocket stream)

pub mod error;
pub mod rest;
pub mod stream;
pub mod transport;
pub mod types;

pub use error::Error;
pub use rest::RestClient;
pub use stream::{ReconnectConfig, StreamEvent, StreamHandle};
