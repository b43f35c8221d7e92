//! The synchronizer: composition root of the data layer.
//!
//! Owns the REST client, the stream task, and the snapshot store, and
//! drives the session lifecycle:
//!
//! 1. `start` runs one REST refresh so the first snapshot never waits
//!    on the stream handshake, then spawns the stream consumer.
//! 2. Stream payloads replace entity slices as they arrive.
//! 3. When the stream's reconnect budget is spent, the consumer drops
//!    to fixed-interval REST polling for the rest of the session.
//! 4. `stop` cancels everything and waits for the tasks to finish.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use bridgeup_api::stream::{StreamEvent, StreamHandle};
use bridgeup_api::transport::TransportConfig;
use bridgeup_api::RestClient;

use crate::config::SyncConfig;
use crate::convert::{group_by_region, normalize_bridges, normalize_vessels};
use crate::error::CoreError;
use crate::handle::SnapshotHandle;
use crate::model::{ConnectionStatus, Snapshot};
use crate::store::SnapshotStore;
use crate::stream::SnapshotStream;

/// Live data synchronizer for one BridgeUp session.
///
/// Cloning is cheap; all clones share the same session.
#[derive(Clone)]
pub struct Synchronizer {
    inner: Arc<Inner>,
}

struct Inner {
    config: SyncConfig,
    store: SnapshotStore,
    rest: RestClient,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Synchronizer {
    /// Build a synchronizer from configuration. Nothing runs until
    /// [`start`](Self::start) is called.
    pub fn new(config: SyncConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            timeout: config.timeout,
        };
        let rest = RestClient::new(config.rest_url.clone(), &transport)?;

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                store: SnapshotStore::new(),
                rest,
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        })
    }

    /// Start the session.
    ///
    /// Performs one REST refresh before returning (failures are
    /// recorded on the snapshot, not returned), then spawns the stream
    /// consumer task.
    pub async fn start(&self) -> Result<(), CoreError> {
        let mut handles = self.inner.task_handles.lock().await;
        if !handles.is_empty() {
            return Err(CoreError::AlreadyStarted);
        }
        if self.inner.cancel.is_cancelled() {
            return Err(CoreError::Stopped);
        }

        self.inner.store.set_connection(ConnectionStatus::Connecting);

        // Initial paint comes from REST; the stream only has to keep
        // it fresh.
        if let Err(e) = self.refresh().await {
            warn!(error = %e, "initial fetch failed");
            self.inner.store.record_error(e.to_string());
        }

        let sync = self.clone();
        handles.push(tokio::spawn(sync_task(sync)));

        info!("synchronizer started");
        Ok(())
    }

    /// Stop the session and wait for background tasks to exit.
    pub async fn stop(&self) {
        self.inner.cancel.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }

        self.inner
            .store
            .set_connection(ConnectionStatus::Disconnected);
        debug!("synchronizer stopped");
    }

    /// Force an immediate REST refresh of both entity slices.
    pub async fn refetch(&self) -> Result<(), CoreError> {
        if self.inner.cancel.is_cancelled() {
            return Err(CoreError::Stopped);
        }
        if let Err(e) = self.refresh().await {
            self.inner.store.record_error(e.to_string());
            return Err(e);
        }
        Ok(())
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.inner.store.snapshot()
    }

    /// Subscribe to snapshot changes.
    pub fn subscribe(&self) -> SnapshotStream {
        SnapshotStream::new(self.inner.store.subscribe())
    }

    /// A cheap read handle, safe to hand to any consumer.
    pub fn handle(&self) -> SnapshotHandle {
        SnapshotHandle::attached(self.inner.store.subscribe())
    }

    pub fn config(&self) -> &SyncConfig {
        &self.inner.config
    }

    // ── Internals ────────────────────────────────────────────────────

    /// Fetch both resources, normalize, and replace the snapshot's
    /// entity slices. All-or-nothing: a failure on either resource
    /// leaves the snapshot untouched.
    async fn refresh(&self) -> Result<(), CoreError> {
        let (bridges_res, vessels_res) =
            tokio::join!(self.inner.rest.bridges(), self.inner.rest.vessels());
        let bridges_resp = bridges_res?;
        let vessels_resp = vessels_res?;

        // A fetch that resolves after shutdown must not resurrect data.
        if self.inner.cancel.is_cancelled() {
            return Err(CoreError::Stopped);
        }

        let now = Utc::now();
        let bridges = normalize_bridges(&bridges_resp, now);
        let regions = group_by_region(&bridges);
        let vessels = normalize_vessels(&vessels_resp, now);

        debug!(
            bridges = bridges.len(),
            vessels = vessels.len(),
            "refresh complete"
        );
        self.inner.store.apply_bridges(bridges, regions, now);
        self.inner.store.apply_vessels(vessels, now);
        Ok(())
    }

    /// Apply one stream event to the store. Returns `true` when the
    /// stream has given up for the session.
    fn apply_stream_event(&self, event: StreamEvent) -> bool {
        let store = &self.inner.store;
        match event {
            StreamEvent::Connecting => store.set_connection(ConnectionStatus::Connecting),
            StreamEvent::Connected => {
                store.set_connection(ConnectionStatus::Connected);
                store.clear_error();
            }
            StreamEvent::Subscribed { channels } => {
                debug!(?channels, "subscription acknowledged");
            }
            StreamEvent::Bridges(resp) => {
                let now = Utc::now();
                let bridges = normalize_bridges(&resp, now);
                let regions = group_by_region(&bridges);
                store.apply_bridges(bridges, regions, now);
            }
            StreamEvent::Boats(resp) => {
                let now = Utc::now();
                let vessels = normalize_vessels(&resp, now);
                store.apply_vessels(vessels, now);
            }
            StreamEvent::Disconnected { reason } => {
                debug!(reason, "stream session ended");
                store.set_connection(ConnectionStatus::Disconnected);
            }
            StreamEvent::ConnectFailed { attempt, error } => {
                debug!(attempt, error, "stream connect failed");
                store.set_connection(ConnectionStatus::Error);
            }
            StreamEvent::Exhausted => return true,
        }
        false
    }
}

impl std::fmt::Debug for Synchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Synchronizer")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

// ── Background task ──────────────────────────────────────────────────

/// Consumes stream events; once the reconnect budget is spent, polls
/// REST at a fixed interval until shutdown.
async fn sync_task(sync: Synchronizer) {
    let inner = &sync.inner;
    let mut stream = StreamHandle::spawn(
        inner.config.ws_url.clone(),
        inner.config.channels.clone(),
        inner.config.reconnect.clone(),
        inner.cancel.clone(),
    );

    let exhausted = loop {
        tokio::select! {
            biased;

            _ = inner.cancel.cancelled() => break false,

            event = stream.next_event() => match event {
                Some(event) => {
                    if sync.apply_stream_event(event) {
                        break true;
                    }
                }
                // Channel closed without an Exhausted event only
                // happens on cancellation.
                None => break false,
            },
        }
    };

    if !exhausted {
        return;
    }

    info!(
        interval = ?inner.config.poll_interval,
        "stream budget spent, falling back to polling"
    );
    inner
        .store
        .record_error("Live updates unavailable, falling back to polling");

    if let Err(e) = sync.refresh().await {
        warn!(error = %e, "fallback fetch failed");
        inner.store.record_error(e.to_string());
    }

    let mut ticker = tokio::time::interval(inner.config.poll_interval);
    // The first tick fires immediately; the fetch above covered it.
    ticker.tick().await;

    loop {
        tokio::select! {
            biased;

            _ = inner.cancel.cancelled() => break,

            _ = ticker.tick() => {
                if let Err(e) = sync.refresh().await {
                    warn!(error = %e, "poll refresh failed");
                    inner.store.record_error(e.to_string());
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bridgeup_api::types::{BridgesResponse, VesselsResponse};
    use serde_json::json;

    fn test_sync() -> Synchronizer {
        Synchronizer::new(SyncConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn connected_event_sets_status_and_clears_error() {
        let sync = test_sync();
        sync.inner.store.record_error("earlier failure");

        let done = sync.apply_stream_event(StreamEvent::Connected);
        assert!(!done);

        let snap = sync.snapshot();
        assert_eq!(snap.connection, ConnectionStatus::Connected);
        assert!(snap.error.is_none());
    }

    #[tokio::test]
    async fn bridges_event_replaces_the_bridge_slice() {
        let sync = test_sync();
        let resp: BridgesResponse = serde_json::from_value(json!({
            "last_updated": "2026-08-30T12:00:00Z",
            "bridges": {
                "carlton-st": {
                    "static": {
                        "name": "Carlton St.",
                        "region": "St. Catharines",
                        "coordinates": { "lat": 43.19, "lng": -79.20 }
                    },
                    "live": {
                        "status": "Open",
                        "last_updated": "2026-08-30T12:00:00Z"
                    }
                }
            }
        }))
        .unwrap();

        sync.apply_stream_event(StreamEvent::Bridges(resp));

        let snap = sync.snapshot();
        assert!(!snap.loading);
        assert_eq!(snap.bridges.len(), 1);
        assert_eq!(snap.bridges[0].name, "Carlton St.");
        assert_eq!(snap.regions.len(), 1);
    }

    #[tokio::test]
    async fn boats_event_leaves_bridges_alone() {
        let sync = test_sync();
        let bridges: BridgesResponse = serde_json::from_value(json!({
            "last_updated": "2026-08-30T12:00:00Z",
            "bridges": {
                "carlton-st": {
                    "static": {
                        "name": "Carlton St.",
                        "region": "St. Catharines",
                        "coordinates": { "lat": 43.19, "lng": -79.20 }
                    },
                    "live": {
                        "status": "Open",
                        "last_updated": "2026-08-30T12:00:00Z"
                    }
                }
            }
        }))
        .unwrap();
        sync.apply_stream_event(StreamEvent::Bridges(bridges));

        let vessels: VesselsResponse = serde_json::from_value(json!({
            "last_updated": "2026-08-30T12:00:30Z",
            "vessels": [
                {
                    "mmsi": 316001234,
                    "name": "FEDERAL DANUBE",
                    "type_name": "Bulk Carrier",
                    "type_category": "Cargo",
                    "position": { "lat": 43.2, "lon": -79.2 },
                    "last_seen": "2026-08-30T12:00:00Z"
                }
            ]
        }))
        .unwrap();
        sync.apply_stream_event(StreamEvent::Boats(vessels));

        let snap = sync.snapshot();
        assert_eq!(snap.bridges.len(), 1);
        assert_eq!(snap.vessels.len(), 1);
        assert_eq!(snap.vessels[0].name, "FEDERAL DANUBE");
    }

    #[tokio::test]
    async fn exhausted_event_signals_the_fallback() {
        let sync = test_sync();
        assert!(sync.apply_stream_event(StreamEvent::Exhausted));
    }

    #[tokio::test]
    async fn start_after_stop_is_rejected() {
        let sync = test_sync();
        sync.stop().await;
        assert!(matches!(sync.start().await, Err(CoreError::Stopped)));
        assert!(matches!(sync.refetch().await, Err(CoreError::Stopped)));
    }
}
