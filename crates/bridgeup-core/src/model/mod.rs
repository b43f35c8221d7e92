// ── Domain model ──

mod bridge;
mod region;
mod snapshot;
mod vessel;

pub use bridge::{Bridge, BridgeStatus, Closure, Prediction, TimeWindow};
pub use region::{Region, RegionBridge};
pub use snapshot::{ConnectionStatus, Snapshot};
pub use vessel::{Dimensions, Vessel};

pub(crate) use bridge::format_clock;
pub(crate) use region::{region_accent, region_display_name, region_id, REGION_ORDER};
pub(crate) use vessel::glyph_for_category;
