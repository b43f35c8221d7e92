// ── Wire-to-domain normalization ──
//
// Pure transforms from raw `bridgeup_api` payloads into canonical
// domain entities. No network, no state: everything time-dependent is
// parameterized on a `now` instant, so normalizing the same payload at
// the same instant always yields structurally equal output.
//
// Record-level fault isolation: one malformed entity is logged and
// skipped, never aborting the rest of the batch.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use tracing::debug;

use bridgeup_api::types::{
    BridgeRecord, BridgesResponse, RawClosure, RawPrediction, VesselRecord, VesselsResponse,
};

use crate::model::{
    format_clock, glyph_for_category, region_accent, region_display_name, region_id, Bridge,
    BridgeStatus, Closure, Prediction, Region, RegionBridge, TimeWindow, Vessel, REGION_ORDER,
};

/// Closures further out than this are not yet actionable.
const UPCOMING_HORIZON_MINUTES: i64 = 60;

// ── Helpers ──────────────────────────────────────────────────────────

fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Whole minutes between `now` and `at`, rounded; negative when `at`
/// is in the past.
fn minutes_from_now(at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let ms = (at - now).num_milliseconds();
    (ms as f64 / 60_000.0).round() as i64
}

/// Minutes-from-now clamped at zero, for prediction windows: an
/// entirely elapsed window collapses to `{0, 0}` rather than going
/// negative.
fn window_bound(at: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
    u32::try_from(minutes_from_now(at, now).max(0)).unwrap_or(u32::MAX)
}

// ── Bridges ──────────────────────────────────────────────────────────

/// Normalize a full bridges payload. Malformed records are skipped.
pub fn normalize_bridges(resp: &BridgesResponse, now: DateTime<Utc>) -> Vec<Bridge> {
    resp.bridges
        .iter()
        .filter_map(|(id, raw)| {
            match serde_json::from_value::<BridgeRecord>(raw.clone()) {
                Ok(record) => Some(normalize_bridge(id, &record, now)),
                Err(e) => {
                    debug!(bridge = %id, error = %e, "skipping malformed bridge record");
                    None
                }
            }
        })
        .collect()
}

fn normalize_bridge(id: &str, record: &BridgeRecord, now: DateTime<Utc>) -> Bridge {
    let status = BridgeStatus::from_wire(&record.live.status);
    let last_updated = parse_datetime(&record.live.last_updated).unwrap_or_else(|| {
        debug!(bridge = %id, "unparseable last_updated, falling back to now");
        now
    });

    let (upcoming_closure, future_closures) =
        closure_schedule(&record.live.upcoming_closures, now);

    Bridge {
        id: id.to_owned(),
        name: record.static_info.name.clone(),
        region: record.static_info.region.clone(),
        region_id: region_id(&record.static_info.region),
        lat: record.static_info.coordinates.lat,
        lng: record.static_info.coordinates.lng,
        status,
        last_updated,
        prediction: record
            .live
            .predicted
            .as_ref()
            .and_then(|raw| parse_prediction(raw, status, now)),
        upcoming_closure,
        future_closures,
        responsible_vessel_mmsi: record.live.responsible_vessel_mmsi,
    }
}

/// Turn absolute prediction bounds into a directional minutes window.
///
/// Direction follows status: a closed (or closing, or under
/// construction) bridge predicts its opening; an open or closing-soon
/// bridge predicts its closing. Other statuses carry no prediction.
fn parse_prediction(
    raw: &RawPrediction,
    status: BridgeStatus,
    now: DateTime<Utc>,
) -> Option<Prediction> {
    let lower = parse_datetime(&raw.lower)?;
    let upper = parse_datetime(&raw.upper)?;
    let window = TimeWindow {
        min: window_bound(lower, now),
        max: window_bound(upper, now),
    };

    match status {
        BridgeStatus::Closed | BridgeStatus::Closing | BridgeStatus::Construction => {
            Some(Prediction::OpensIn(window))
        }
        BridgeStatus::Open | BridgeStatus::ClosingSoon => Some(Prediction::ClosesIn(window)),
        _ => None,
    }
}

/// Derive the closure views from the raw schedule.
///
/// `upcoming` is the single nearest closure that has not ended, and
/// only if it is overdue or due within the hour. `future` lists every
/// closure that is still pending or currently active, ordered by start;
/// already-ended closures are dropped.
fn closure_schedule(
    raws: &[RawClosure],
    now: DateTime<Utc>,
) -> (Option<Closure>, Vec<Closure>) {
    let mut parsed: Vec<Closure> = raws
        .iter()
        .filter_map(|raw| normalize_closure(raw, now))
        .collect();
    parsed.sort_by_key(|c| c.starts_at);

    let upcoming = parsed
        .iter()
        .filter(|c| c.ends_at.is_none_or(|end| end >= now))
        .min_by_key(|c| c.starts_at)
        .filter(|c| c.minutes_until < UPCOMING_HORIZON_MINUTES)
        .cloned();

    let future = parsed
        .into_iter()
        .filter(|c| {
            c.starts_at > now
                || c.ends_at
                    .is_some_and(|end| c.starts_at <= now && now <= end)
        })
        .collect();

    (upcoming, future)
}

fn normalize_closure(raw: &RawClosure, now: DateTime<Utc>) -> Option<Closure> {
    let Some(starts_at) = parse_datetime(&raw.time) else {
        debug!(time = %raw.time, "skipping closure with unparseable start");
        return None;
    };
    let ends_at = raw.end_time.as_deref().and_then(parse_datetime);

    let display_range = match ends_at {
        Some(end) => format!(
            "{} – {}",
            format_clock(starts_at, now),
            format_clock(end, now)
        ),
        None => format_clock(starts_at, now),
    };

    Some(Closure {
        starts_at,
        ends_at,
        cause: closure_cause_label(raw.cause.as_deref()),
        minutes_until: minutes_from_now(starts_at, now),
        display_range,
    })
}

/// Human label for a machine cause code. Unknown codes are prettified
/// rather than dropped; an absent code reads as a generic closure.
fn closure_cause_label(code: Option<&str>) -> String {
    match code {
        Some("vessel_transit") => "Vessel transit".into(),
        Some("maintenance") => "Maintenance".into(),
        Some("construction") => "Construction".into(),
        Some("special_event") => "Special event".into(),
        Some(other) if !other.is_empty() => {
            let pretty = other.replace('_', " ");
            let mut chars = pretty.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => "Scheduled closure".into(),
            }
        }
        _ => "Scheduled closure".into(),
    }
}

// ── Vessels ──────────────────────────────────────────────────────────

/// Normalize a full vessels payload. Malformed records are skipped and
/// duplicate MMSIs are dropped (first record wins), keeping MMSI unique
/// within the snapshot.
pub fn normalize_vessels(resp: &VesselsResponse, now: DateTime<Utc>) -> Vec<Vessel> {
    let mut seen = HashSet::new();
    resp.vessels
        .iter()
        .filter_map(|raw| match serde_json::from_value::<VesselRecord>(raw.clone()) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!(error = %e, "skipping malformed vessel record");
                None
            }
        })
        .filter(|record| {
            if seen.insert(record.mmsi) {
                true
            } else {
                debug!(mmsi = record.mmsi, "dropping duplicate vessel record");
                false
            }
        })
        .map(|record| normalize_vessel(&record, now))
        .collect()
}

fn normalize_vessel(record: &VesselRecord, now: DateTime<Utc>) -> Vessel {
    Vessel {
        mmsi: record.mmsi,
        name: record
            .name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| format!("Vessel {}", record.mmsi)),
        type_name: record.type_name.clone(),
        type_category: record.type_category.clone(),
        lat: record.position.lat,
        lng: record.position.lon,
        heading: record.heading,
        course: record.course,
        speed_knots: record.speed_knots,
        destination: record.destination.clone(),
        dimensions: record.dimensions.map(|d| crate::model::Dimensions {
            length: d.length,
            width: d.width,
        }),
        last_seen: parse_datetime(&record.last_seen).unwrap_or(now),
        source: record.source.clone(),
        region: record.region.clone(),
        glyph: glyph_for_category(&record.type_category),
    }
}

// ── Region grouping ──────────────────────────────────────────────────

/// Group bridges by region slug in the fixed priority order. Regions
/// without a display-name mapping are dropped from the grouped view.
pub fn group_by_region(bridges: &[Bridge]) -> Vec<Region> {
    let mut grouped: BTreeMap<&str, Vec<RegionBridge>> = BTreeMap::new();
    for bridge in bridges {
        grouped
            .entry(bridge.region_id.as_str())
            .or_default()
            .push(RegionBridge {
                name: bridge.name.clone(),
                status: bridge.status,
            });
    }

    REGION_ORDER
        .iter()
        .filter_map(|id| {
            let bridges = grouped.remove(*id)?;
            let name = region_display_name(id)?;
            Some(Region {
                id: (*id).to_owned(),
                name: name.to_owned(),
                accent_color: region_accent(id),
                bridges,
            })
        })
        .collect()
}

// ── Tests ────────────────────────────────────────────────────────────
