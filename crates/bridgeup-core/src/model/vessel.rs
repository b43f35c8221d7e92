// ── Vessel domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Vessel hull dimensions in metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub length: f64,
    pub width: f64,
}

/// The canonical vessel entity. Keyed by MMSI, which is unique within
/// a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Vessel {
    /// Maritime Mobile Service Identity.
    pub mmsi: u32,
    /// Reported name, or `"Vessel {mmsi}"` when the transponder sends none.
    pub name: String,
    pub type_name: String,
    pub type_category: String,
    pub lat: f64,
    pub lng: f64,
    /// True heading in degrees, when the transponder reports one.
    pub heading: Option<f64>,
    /// Course over ground in degrees.
    pub course: f64,
    pub speed_knots: f64,
    pub destination: Option<String>,
    pub dimensions: Option<Dimensions>,
    pub last_seen: DateTime<Utc>,
    /// Receiver that produced the report (e.g. `"udp"`, `"aishub"`).
    pub source: String,
    pub region: String,
    /// Display glyph derived from the type category.
    pub glyph: &'static str,
}

impl Vessel {
    /// Speed rendered for display; slow drift reads as stationary.
    pub fn speed_text(&self) -> String {
        if self.speed_knots < 0.5 {
            "Stationary".into()
        } else {
            format!("{:.1} knots", self.speed_knots)
        }
    }

    /// Hull dimensions rendered for display, e.g. `"225m × 24m"`.
    pub fn dimensions_text(&self) -> Option<String> {
        self.dimensions
            .map(|d| format!("{}m × {}m", d.length, d.width))
    }
}

/// Map a vessel type category onto a display glyph.
///
/// Categories come from the AIS feed: "Cargo", "Tanker", "Passenger",
/// "Pleasure Craft", "Sailing", "Tug", etc. Small motorized craft are
/// the fallback.
pub(crate) fn glyph_for_category(category: &str) -> &'static str {
    let category = category.to_lowercase();

    if category.contains("sail") {
        "⛵"
    } else if category.contains("passenger")
        || category.contains("ferry")
        || category.contains("cruise")
    {
        "⛴️"
    } else if category.contains("tanker") {
        "🛳️"
    } else if category.contains("cargo")
        || category.contains("bulk")
        || category.contains("container")
        || category.contains("freighter")
    {
        "🚢"
    } else {
        "🛥️"
    }
}

// ── Tests ────────────────────────────────────────────────────────────
