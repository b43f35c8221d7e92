// ── Snapshot: the unit handed to consumers ──

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::bridge::Bridge;
use super::region::Region;
use super::vessel::Vessel;

/// Connection state observable on every snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Disconnected,
    Error,
}

/// Point-in-time view of all synchronized data.
///
/// Cheap to clone: entity lists are `Arc`ed and replaced wholesale on
/// each update, never merged incrementally. `Default` is the safe
/// sentinel handed out before (or without) a running synchronizer.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub bridges: Arc<Vec<Bridge>>,
    pub vessels: Arc<Vec<Vessel>>,
    /// Bridges grouped by region in fixed priority order.
    pub regions: Arc<Vec<Region>>,
    /// True until the first successful data arrival (stream or REST).
    pub loading: bool,
    /// Last non-fatal error, cleared on the next successful update.
    pub error: Option<String>,
    /// Instant of the most recent successful update of either slice.
    pub last_updated: Option<DateTime<Utc>>,
    pub connection: ConnectionStatus,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            bridges: Arc::new(Vec::new()),
            vessels: Arc::new(Vec::new()),
            regions: Arc::new(Vec::new()),
            loading: true,
            error: None,
            last_updated: None,
            connection: ConnectionStatus::Connecting,
        }
    }
}

impl Snapshot {
    /// Look up a vessel by MMSI (e.g. following a bridge's
    /// `responsible_vessel_mmsi`).
    pub fn vessel_by_mmsi(&self, mmsi: u32) -> Option<&Vessel> {
        self.vessels.iter().find(|v| v.mmsi == mmsi)
    }
}
