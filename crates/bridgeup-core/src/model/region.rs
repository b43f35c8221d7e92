// ── Region grouping types and lookup tables ──
//
// Region identity is table-driven: known display names map to fixed
// slugs, slugs map to display names and accent colors, and the grouped
// view follows a fixed priority order down the seaway.

use serde::{Deserialize, Serialize};

use super::bridge::BridgeStatus;

/// Grouped-view ordering, north to south along the canal, then the
/// Montréal-area regions.
pub(crate) const REGION_ORDER: [&str; 5] = [
    "st-catharines",
    "port-colborne",
    "montreal",
    "beauharnois",
    "kahnawake",
];

/// Map a backend region display name to its slug. Unmapped names fall
/// back to a slugified form, so `region_id` is total.
pub(crate) fn region_id(region_name: &str) -> String {
    match region_name {
        "St Catharines" | "St. Catharines" => "st-catharines".into(),
        "Port Colborne" => "port-colborne".into(),
        "Montreal" | "Montreal South Shore" => "montreal".into(),
        "Beauharnois" | "Salaberry" | "Salaberry / Beauharnois / Suroît Region" => {
            "beauharnois".into()
        }
        "Kahnawake" => "kahnawake".into(),
        other => slugify(other),
    }
}

/// Canonical display name for a region slug.
pub(crate) fn region_display_name(id: &str) -> Option<&'static str> {
    match id {
        "st-catharines" => Some("St. Catharines"),
        "port-colborne" => Some("Port Colborne"),
        "montreal" => Some("Montréal"),
        "beauharnois" => Some("Beauharnois"),
        "kahnawake" => Some("Kahnawake"),
        _ => None,
    }
}

/// Fixed accent color per region slug; gray for anything unmapped.
pub(crate) fn region_accent(id: &str) -> &'static str {
    match id {
        "st-catharines" => "#22c55e",
        "port-colborne" => "#3b82f6",
        "montreal" => "#8b5cf6",
        "beauharnois" => "#f97316",
        "kahnawake" => "#ec4899",
        _ => "#6b7280",
    }
}

/// Lowercase with whitespace runs collapsed to single hyphens.
fn slugify(name: &str) -> String {
    name.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// A bridge as it appears inside a grouped region card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionBridge {
    pub name: String,
    pub status: BridgeStatus,
}

/// Bridges grouped under one region, with its fixed accent color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Region {
    pub id: String,
    pub name: String,
    pub accent_color: &'static str,
    pub bridges: Vec<RegionBridge>,
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_region_names_map_to_slugs() {
        assert_eq!(region_id("St. Catharines"), "st-catharines");
        assert_eq!(region_id("St Catharines"), "st-catharines");
        assert_eq!(region_id("Montreal South Shore"), "montreal");
        assert_eq!(
            region_id("Salaberry / Beauharnois / Suroît Region"),
            "beauharnois"
        );
    }

    #[test]
    fn unmapped_region_slugifies() {
        assert_eq!(region_id("Thousand Islands"), "thousand-islands");
        assert_eq!(region_id("Sault  Ste   Marie"), "sault-ste-marie");
    }

    #[test]
    fn accent_colors_are_fixed() {
        assert_eq!(region_accent("st-catharines"), "#22c55e");
        assert_eq!(region_accent("kahnawake"), "#ec4899");
        assert_eq!(region_accent("somewhere-else"), "#6b7280");
    }

    #[test]
    fn unknown_slug_has_no_display_name() {
        assert!(region_display_name("thousand-islands").is_none());
        assert_eq!(region_display_name("montreal"), Some("Montréal"));
    }
}
