// ── Bridge domain types ──

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// Canonical bridge status, mapped from the backend's raw status string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub enum BridgeStatus {
    Open,
    Closed,
    Closing,
    ClosingSoon,
    Opening,
    Construction,
    Unknown,
}

impl BridgeStatus {
    /// Fixed lookup table over the raw strings the backend emits.
    /// Anything unmapped becomes [`Unknown`](Self::Unknown).
    pub fn from_wire(raw: &str) -> Self {
        match raw {
            "Open" => Self::Open,
            "Closed" => Self::Closed,
            "Closing" => Self::Closing,
            "Closing soon" => Self::ClosingSoon,
            "Opening" => Self::Opening,
            "Construction" => Self::Construction,
            _ => Self::Unknown,
        }
    }
}

/// A minutes-from-now window. Bounds in the past clamp to zero rather
/// than going negative, so an elapsed prediction reads as "current-ish".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub min: u32,
    pub max: u32,
}

impl TimeWindow {
    /// Both bounds have passed.
    pub fn is_elapsed(self) -> bool {
        self.min == 0 && self.max == 0
    }
}

/// Directional prediction window. The direction is selected by status:
/// a closed bridge predicts when it opens, an open one when it closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Prediction {
    OpensIn(TimeWindow),
    ClosesIn(TimeWindow),
}

/// A scheduled closure, annotated relative to the normalization instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Closure {
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    /// Human-readable cause label, e.g. `"Vessel transit"`.
    pub cause: String,
    /// Signed minutes until the scheduled start; negative once the
    /// start has passed.
    pub minutes_until: i64,
    /// Formatted display time range, e.g. `"12:05pm – 1:00pm"`.
    pub display_range: String,
}

impl Closure {
    /// The scheduled start is already in the past.
    pub fn is_overdue(&self) -> bool {
        self.minutes_until < 0
    }

    /// Elapsed minutes since an overdue start (0 if not overdue).
    pub fn minutes_overdue(&self) -> i64 {
        self.minutes_until.min(0).abs()
    }
}

/// The canonical bridge entity handed to consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bridge {
    /// Stable backend id.
    pub id: String,
    pub name: String,
    pub region: String,
    /// Region slug, always derivable from `region`.
    pub region_id: String,
    pub lat: f64,
    pub lng: f64,
    pub status: BridgeStatus,
    /// Backend-clock timestamp of the live slice.
    pub last_updated: DateTime<Utc>,
    pub prediction: Option<Prediction>,
    /// Nearest scheduled closure, if overdue or due within the hour.
    pub upcoming_closure: Option<Closure>,
    /// All pending or currently active closures, ordered by start.
    pub future_closures: Vec<Closure>,
    /// Foreign key into the vessel slice, when the backend knows which
    /// vessel a closure is for.
    pub responsible_vessel_mmsi: Option<u32>,
}

impl Bridge {
    /// One-line human status summary, the single source of truth for
    /// display strings across consumers.
    pub fn status_text(&self, now: DateTime<Utc>) -> String {
        match self.status {
            BridgeStatus::Open => format!("Opened {}", format_clock(self.last_updated, now)),

            BridgeStatus::ClosingSoon => match self.prediction {
                Some(Prediction::ClosesIn(w)) if !w.is_elapsed() => {
                    format!("Closing soon in {}-{}m", w.min, w.max)
                }
                Some(Prediction::ClosesIn(_)) => "Closing soon (longer than usual)".into(),
                _ => "Closing soon".into(),
            },

            BridgeStatus::Closing => "Just missed it, the bridge is closing".into(),

            BridgeStatus::Closed => match self.prediction {
                Some(Prediction::OpensIn(w)) if w.is_elapsed() => format!(
                    "Closed {} (longer than usual)",
                    format_clock(self.last_updated, now)
                ),
                Some(Prediction::OpensIn(w)) if w.min == w.max => {
                    format!("Closed, opens in ~{}m", w.min)
                }
                Some(Prediction::OpensIn(w)) => {
                    format!("Closed, opens in {}-{}m", w.min, w.max)
                }
                _ => format!(
                    "Closed {} (longer than usual)",
                    format_clock(self.last_updated, now)
                ),
            },

            BridgeStatus::Opening => "Will be open in a few moments".into(),

            BridgeStatus::Construction => match self.prediction {
                Some(Prediction::OpensIn(w)) if w.min > 0 => {
                    format!("Closed for construction, opens in {}", format_span(w.min))
                }
                _ => "Closed for unscheduled construction, unknown opening".into(),
            },

            BridgeStatus::Unknown => "Bridge status is unknown or unavailable".into(),
        }
    }
}

// ── Display formatting helpers ───────────────────────────────────────

/// Clock-style timestamp: `"3:42pm"`, with a month/day prefix when the
/// instant is not today (relative to `now`).
pub(crate) fn format_clock(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let time = at.format("%-I:%M%P").to_string();
    if (at.year(), at.ordinal()) == (now.year(), now.ordinal()) {
        time
    } else {
        format!("{} {time}", at.format("%b %-d"))
    }
}

/// Minutes rendered as `"45m"`, `"2h 15m"`, or `"3d"`.
fn format_span(minutes: u32) -> String {
    if minutes > 24 * 60 {
        format!("{}d", minutes / (24 * 60))
    } else if minutes >= 60 {
        let hours = minutes / 60;
        let rest = minutes % 60;
        if rest > 0 {
            format!("{hours}h {rest}m")
        } else {
            format!("{hours}h")
        }
    } else {
        format!("{minutes}m")
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn bridge(status: BridgeStatus, prediction: Option<Prediction>) -> Bridge {
        Bridge {
            id: "b1".into(),
            name: "Carlton St".into(),
            region: "St. Catharines".into(),
            region_id: "st-catharines".into(),
            lat: 43.19,
            lng: -79.20,
            status,
            last_updated: "2025-01-01T12:00:00Z".parse().unwrap(),
            prediction,
            upcoming_closure: None,
            future_closures: Vec::new(),
            responsible_vessel_mmsi: None,
        }
    }

    fn noon() -> DateTime<Utc> {
        "2025-01-01T12:30:00Z".parse().unwrap()
    }

    #[test]
    fn status_table_is_fixed() {
        assert_eq!(BridgeStatus::from_wire("Open"), BridgeStatus::Open);
        assert_eq!(BridgeStatus::from_wire("Closed"), BridgeStatus::Closed);
        assert_eq!(BridgeStatus::from_wire("Closing"), BridgeStatus::Closing);
        assert_eq!(
            BridgeStatus::from_wire("Closing soon"),
            BridgeStatus::ClosingSoon
        );
        assert_eq!(BridgeStatus::from_wire("Opening"), BridgeStatus::Opening);
        assert_eq!(
            BridgeStatus::from_wire("Construction"),
            BridgeStatus::Construction
        );
    }

    #[test]
    fn unmapped_status_is_unknown() {
        assert_eq!(BridgeStatus::from_wire("Partially open"), BridgeStatus::Unknown);
        assert_eq!(BridgeStatus::from_wire(""), BridgeStatus::Unknown);
        assert_eq!(BridgeStatus::from_wire("open"), BridgeStatus::Unknown);
    }

    #[test]
    fn status_text_closed_with_window() {
        let b = bridge(
            BridgeStatus::Closed,
            Some(Prediction::OpensIn(TimeWindow { min: 5, max: 10 })),
        );
        assert_eq!(b.status_text(noon()), "Closed, opens in 5-10m");
    }

    #[test]
    fn status_text_closed_elapsed_window() {
        let b = bridge(
            BridgeStatus::Closed,
            Some(Prediction::OpensIn(TimeWindow { min: 0, max: 0 })),
        );
        assert_eq!(b.status_text(noon()), "Closed 12:00pm (longer than usual)");
    }

    #[test]
    fn status_text_construction_spans() {
        let cases = [
            (45, "Closed for construction, opens in 45m"),
            (135, "Closed for construction, opens in 2h 15m"),
            (120, "Closed for construction, opens in 2h"),
            (3 * 24 * 60 + 30, "Closed for construction, opens in 3d"),
        ];
        for (minutes, expected) in cases {
            let b = bridge(
                BridgeStatus::Construction,
                Some(Prediction::OpensIn(TimeWindow {
                    min: minutes,
                    max: minutes,
                })),
            );
            assert_eq!(b.status_text(noon()), expected);
        }
    }

    #[test]
    fn clock_includes_date_when_not_today() {
        let at: DateTime<Utc> = "2024-12-30T09:05:00Z".parse().unwrap();
        assert_eq!(format_clock(at, noon()), "Dec 30 9:05am");
    }

    #[test]
    fn overdue_closure_reports_elapsed_minutes() {
        let c = Closure {
            starts_at: "2025-01-01T12:00:00Z".parse().unwrap(),
            ends_at: None,
            cause: "Vessel transit".into(),
            minutes_until: -12,
            display_range: String::new(),
        };
        assert!(c.is_overdue());
        assert_eq!(c.minutes_overdue(), 12);
    }
}
