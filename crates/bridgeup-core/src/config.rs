// ── Runtime connection configuration ──
//
// Describes *where* the BridgeUp endpoints live and how aggressively to
// retry and poll. The embedding application constructs a `SyncConfig`
// and hands it in -- core never reads config files or the environment.

use std::time::Duration;

use url::Url;

use bridgeup_api::stream::ReconnectConfig;
use bridgeup_api::types::Channel;

/// Configuration for one [`Synchronizer`](crate::sync::Synchronizer).
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// REST base URL (e.g. `https://api.bridgeup.app`).
    pub rest_url: Url,
    /// Stream endpoint URL (e.g. `wss://api.bridgeup.app/ws`).
    pub ws_url: Url,
    /// Channels to subscribe to on the stream.
    pub channels: Vec<Channel>,
    /// Per-request HTTP timeout.
    pub timeout: Duration,
    /// Stream reconnect/backoff tuning.
    pub reconnect: ReconnectConfig,
    /// Fallback poll interval once the stream budget is spent.
    pub poll_interval: Duration,
}

impl Default for SyncConfig {
    // Statically known-good URLs; parse cannot fail.
    #[allow(clippy::unwrap_used)]
    fn default() -> Self {
        Self {
            rest_url: "https://api.bridgeup.app".parse().unwrap(),
            ws_url: "wss://api.bridgeup.app/ws".parse().unwrap(),
            channels: vec![Channel::Bridges, Channel::Boats],
            timeout: Duration::from_secs(30),
            reconnect: ReconnectConfig::default(),
            poll_interval: Duration::from_secs(30),
        }
    }
}
