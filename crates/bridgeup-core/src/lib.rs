//! Reactive data layer between `bridgeup-api` and consumers.
//!
//! This crate owns the domain model, normalization logic, and session
//! lifecycle for a BridgeUp client:
//!
//! - **[`Synchronizer`]** — Central facade managing the full session:
//!   [`start()`](Synchronizer::start) runs one REST refresh for the
//!   first snapshot, then consumes the push stream; once the stream's
//!   reconnect budget is spent it falls back to fixed-interval REST
//!   polling until [`stop()`](Synchronizer::stop).
//!
//! - **[`SnapshotStore`]** — Reactive storage built on a
//!   `tokio::sync::watch` channel. Entity slices are replaced
//!   wholesale on every arrival, never merged.
//!
//! - **[`SnapshotStream`]** / **[`SnapshotHandle`]** — Subscription and
//!   read handles vended by the synchronizer. A detached handle reads
//!   the default (loading) snapshot instead of failing.
//!
//! - **Domain model** ([`model`]) — Normalized types ([`Bridge`],
//!   [`Vessel`], [`Region`], [`Closure`], ...) derived from the wire
//!   payloads, with computed status, prediction windows, and closure
//!   schedules.

pub mod config;
pub mod convert;
pub mod error;
pub mod handle;
pub mod model;
pub mod store;
pub mod stream;
pub mod sync;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::SyncConfig;
pub use error::CoreError;
pub use handle::SnapshotHandle;
pub use store::SnapshotStore;
pub use stream::SnapshotStream;
pub use sync::Synchronizer;

// Re-export model types at the crate root for ergonomics.
pub use model::{
    Bridge,
    BridgeStatus,
    Closure,
    ConnectionStatus,
    Dimensions,
    Prediction,
    Region,
    RegionBridge,
    Snapshot,
    TimeWindow,
    Vessel,
};

// Wire-level types that appear in `SyncConfig`.
pub use bridgeup_api::stream::ReconnectConfig;
pub use bridgeup_api::types::Channel;
