// ── Reactive snapshot store ──
//
// Holds the current Snapshot and broadcasts every change through a
// `watch` channel: synchronous reads of the latest value, push-based
// notification for subscribers. Entity slices are replaced wholesale,
// never merged.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::model::{Bridge, ConnectionStatus, Region, Snapshot, Vessel};

pub struct SnapshotStore {
    tx: watch::Sender<Snapshot>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Snapshot::default());
        Self { tx }
    }

    /// Synchronous read of the latest snapshot (cheap clone).
    pub fn snapshot(&self) -> Snapshot {
        self.tx.borrow().clone()
    }

    /// Subscribe to snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.tx.subscribe()
    }

    // ── Mutators (crate-internal; consumers only read) ───────────────

    /// Replace the bridge slice and its derived region grouping.
    ///
    /// Any successful arrival ends the loading phase and clears the
    /// last error.
    pub(crate) fn apply_bridges(
        &self,
        bridges: Vec<Bridge>,
        regions: Vec<Region>,
        now: DateTime<Utc>,
    ) {
        self.tx.send_modify(|snap| {
            snap.bridges = Arc::new(bridges);
            snap.regions = Arc::new(regions);
            snap.loading = false;
            snap.error = None;
            snap.last_updated = Some(now);
        });
    }

    /// Replace the vessel slice; the bridge slice is untouched.
    pub(crate) fn apply_vessels(&self, vessels: Vec<Vessel>, now: DateTime<Utc>) {
        self.tx.send_modify(|snap| {
            snap.vessels = Arc::new(vessels);
            snap.loading = false;
            snap.error = None;
            snap.last_updated = Some(now);
        });
    }

    pub(crate) fn set_connection(&self, status: ConnectionStatus) {
        self.tx.send_if_modified(|snap| {
            if snap.connection == status {
                false
            } else {
                snap.connection = status;
                true
            }
        });
    }

    /// Record a non-fatal error; data and loading state are untouched.
    pub(crate) fn record_error(&self, message: impl Into<String>) {
        self.tx.send_modify(|snap| snap.error = Some(message.into()));
    }

    pub(crate) fn clear_error(&self) {
        self.tx.send_if_modified(|snap| snap.error.take().is_some());
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::BridgeStatus;

    fn bridge(id: &str) -> Bridge {
        Bridge {
            id: id.into(),
            name: id.into(),
            region: "St. Catharines".into(),
            region_id: "st-catharines".into(),
            lat: 0.0,
            lng: 0.0,
            status: BridgeStatus::Open,
            last_updated: Utc::now(),
            prediction: None,
            upcoming_closure: None,
            future_closures: Vec::new(),
            responsible_vessel_mmsi: None,
        }
    }

    fn vessel(mmsi: u32) -> Vessel {
        Vessel {
            mmsi,
            name: format!("Vessel {mmsi}"),
            type_name: "Tug".into(),
            type_category: "Tug".into(),
            lat: 0.0,
            lng: 0.0,
            heading: None,
            course: 0.0,
            speed_knots: 0.0,
            destination: None,
            dimensions: None,
            last_seen: Utc::now(),
            source: "udp".into(),
            region: String::new(),
            glyph: "🛥️",
        }
    }

    #[test]
    fn starts_with_the_default_snapshot() {
        let store = SnapshotStore::new();
        let snap = store.snapshot();
        assert!(snap.loading);
        assert!(snap.bridges.is_empty());
        assert_eq!(snap.connection, ConnectionStatus::Connecting);
    }

    #[test]
    fn first_successful_apply_ends_loading_and_clears_error() {
        let store = SnapshotStore::new();
        store.record_error("fetch failed");
        assert!(store.snapshot().error.is_some());

        let now = Utc::now();
        store.apply_bridges(vec![bridge("b1")], Vec::new(), now);

        let snap = store.snapshot();
        assert!(!snap.loading);
        assert!(snap.error.is_none());
        assert_eq!(snap.last_updated, Some(now));
        assert_eq!(snap.bridges.len(), 1);
    }

    #[test]
    fn applying_vessels_leaves_bridges_untouched() {
        let store = SnapshotStore::new();
        let now = Utc::now();
        store.apply_bridges(vec![bridge("b1")], Vec::new(), now);
        store.apply_vessels(vec![vessel(1), vessel(2)], now);

        let snap = store.snapshot();
        assert_eq!(snap.bridges.len(), 1);
        assert_eq!(snap.vessels.len(), 2);

        // Wholesale replacement, not a merge.
        store.apply_vessels(vec![vessel(3)], now);
        let snap = store.snapshot();
        assert_eq!(snap.vessels.len(), 1);
        assert_eq!(snap.vessels[0].mmsi, 3);
        assert_eq!(snap.bridges.len(), 1);
    }

    #[tokio::test]
    async fn subscribers_see_every_change() {
        let store = SnapshotStore::new();
        let mut rx = store.subscribe();

        store.set_connection(ConnectionStatus::Connected);
        rx.changed().await.unwrap();
        assert_eq!(
            rx.borrow_and_update().connection,
            ConnectionStatus::Connected
        );

        // Idempotent status writes do not wake subscribers.
        store.set_connection(ConnectionStatus::Connected);
        assert!(!rx.has_changed().unwrap());
    }
}
