// ── Wire types for the BridgeUp API ──
//
// Shapes exactly as the backend sends them, for both the REST resources
// and the WebSocket stream. Entity collections are kept as raw JSON
// values so a single malformed record can never abort decoding of the
// whole payload -- record-level decoding happens downstream, where bad
// records are skipped individually.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ── Bridges resource ─────────────────────────────────────────────────

/// Response body of `GET /bridges`, also carried in `bridges` stream
/// messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgesResponse {
    /// Backend-clock timestamp of the payload (ISO-8601).
    pub last_updated: String,

    /// Lightweight directory of known bridges.
    #[serde(default)]
    pub available_bridges: Vec<AvailableBridge>,

    /// Bridge records keyed by their stable backend id. Held raw;
    /// decode each with [`BridgeRecord`].
    pub bridges: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableBridge {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub region_short: Option<String>,
    pub region: String,
}

/// One bridge record: static facts plus the live slice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeRecord {
    #[serde(rename = "static")]
    pub static_info: BridgeStatic,
    pub live: BridgeLive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeStatic {
    pub name: String,
    pub region: String,
    pub coordinates: Coordinates,
    #[serde(default)]
    pub statistics: Option<BridgeStatistics>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeStatistics {
    #[serde(default)]
    pub average_duration: Option<f64>,
    #[serde(default)]
    pub median_duration: Option<f64>,
    #[serde(default)]
    pub closure_count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeLive {
    /// Raw status string, e.g. `"Open"`, `"Closing soon"`. Mapped to a
    /// typed status downstream; unrecognized values become unknown.
    pub status: String,
    pub last_updated: String,
    #[serde(default)]
    pub predicted: Option<RawPrediction>,
    #[serde(default)]
    pub upcoming_closures: Vec<RawClosure>,
    #[serde(default)]
    pub responsible_vessel_mmsi: Option<u32>,
}

/// Prediction bounds as absolute backend timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPrediction {
    pub lower: String,
    pub upper: String,
}

/// A scheduled closure as the backend reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawClosure {
    /// Scheduled start (ISO-8601).
    pub time: String,
    /// Scheduled end, if the backend knows one.
    #[serde(default)]
    pub end_time: Option<String>,
    /// Machine cause code, e.g. `"vessel_transit"`, `"maintenance"`.
    #[serde(default)]
    pub cause: Option<String>,
}

// ── Boats resource ───────────────────────────────────────────────────

/// Response body of `GET /boats`, also carried in `boats` stream
/// messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VesselsResponse {
    pub last_updated: String,
    #[serde(default)]
    pub vessel_count: u32,
    /// Vessel records, held raw; decode each with [`VesselRecord`].
    pub vessels: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VesselRecord {
    pub mmsi: u32,
    #[serde(default)]
    pub name: Option<String>,
    pub type_name: String,
    pub type_category: String,
    pub position: VesselPosition,
    #[serde(default)]
    pub heading: Option<f64>,
    #[serde(default)]
    pub course: f64,
    #[serde(default)]
    pub speed_knots: f64,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub dimensions: Option<VesselDimensions>,
    pub last_seen: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub region: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VesselPosition {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VesselDimensions {
    pub length: f64,
    pub width: f64,
}

// ── Stream wire protocol ─────────────────────────────────────────────

/// Channels the stream endpoint can push.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Bridges,
    Boats,
}

impl Channel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bridges => "bridges",
            Self::Boats => "boats",
        }
    }
}

/// Client→server subscribe directive, sent once after the socket opens.
#[derive(Debug, Serialize)]
pub struct SubscribeDirective<'a> {
    action: &'static str,
    channels: &'a [Channel],
}

impl<'a> SubscribeDirective<'a> {
    pub fn new(channels: &'a [Channel]) -> Self {
        Self {
            action: "subscribe",
            channels,
        }
    }
}

/// Server→client messages, discriminated on `type`.
///
/// Unrecognized discriminators decode to [`Unknown`](Self::Unknown) so
/// protocol additions never break existing clients.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage {
    Subscribed {
        #[serde(default)]
        channels: Vec<Channel>,
    },
    Bridges {
        data: BridgesResponse,
    },
    Boats {
        data: VesselsResponse,
    },
    #[serde(other)]
    Unknown,
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn subscribe_directive_shape() {
        let directive = SubscribeDirective::new(&[Channel::Bridges, Channel::Boats]);
        let value = serde_json::to_value(&directive).unwrap();
        assert_eq!(
            value,
            json!({ "action": "subscribe", "channels": ["bridges", "boats"] })
        );
    }

    #[test]
    fn decode_bridges_response() {
        let body = json!({
            "last_updated": "2025-01-01T12:00:00Z",
            "available_bridges": [
                { "id": "b1", "name": "Carlton St", "region_short": "STC", "region": "St. Catharines" }
            ],
            "bridges": {
                "b1": {
                    "static": {
                        "name": "Carlton St",
                        "region": "St. Catharines",
                        "coordinates": { "lat": 43.19, "lng": -79.20 }
                    },
                    "live": {
                        "status": "Closing soon",
                        "last_updated": "2025-01-01T12:00:00Z",
                        "predicted": { "lower": "2025-01-01T12:05:00Z", "upper": "2025-01-01T12:10:00Z" },
                        "upcoming_closures": [],
                        "responsible_vessel_mmsi": null
                    }
                }
            }
        });

        let resp: BridgesResponse = serde_json::from_value(body).unwrap();
        assert_eq!(resp.last_updated, "2025-01-01T12:00:00Z");
        assert_eq!(resp.available_bridges.len(), 1);

        let record: BridgeRecord =
            serde_json::from_value(resp.bridges["b1"].clone()).unwrap();
        assert_eq!(record.static_info.name, "Carlton St");
        assert_eq!(record.live.status, "Closing soon");
        assert_eq!(
            record.live.predicted.unwrap().lower,
            "2025-01-01T12:05:00Z"
        );
    }

    #[test]
    fn malformed_record_does_not_abort_response_decode() {
        let body = json!({
            "last_updated": "2025-01-01T12:00:00Z",
            "bridges": {
                "good": {
                    "static": {
                        "name": "Lakeshore Rd",
                        "region": "St. Catharines",
                        "coordinates": { "lat": 43.2, "lng": -79.2 }
                    },
                    "live": { "status": "Open", "last_updated": "2025-01-01T12:00:00Z" }
                },
                "bad": { "static": { "name": 42 } }
            }
        });

        let resp: BridgesResponse = serde_json::from_value(body).unwrap();
        assert_eq!(resp.bridges.len(), 2);
        assert!(serde_json::from_value::<BridgeRecord>(resp.bridges["good"].clone()).is_ok());
        assert!(serde_json::from_value::<BridgeRecord>(resp.bridges["bad"].clone()).is_err());
    }

    #[test]
    fn server_message_dispatch() {
        let msg: ServerMessage = serde_json::from_value(json!({
            "type": "subscribed",
            "channels": ["bridges", "boats"]
        }))
        .unwrap();
        assert!(matches!(
            msg,
            ServerMessage::Subscribed { ref channels } if channels == &[Channel::Bridges, Channel::Boats]
        ));

        let msg: ServerMessage = serde_json::from_value(json!({
            "type": "boats",
            "data": { "last_updated": "2025-01-01T12:00:00Z", "vessels": [] }
        }))
        .unwrap();
        assert!(matches!(msg, ServerMessage::Boats { .. }));
    }

    #[test]
    fn unrecognized_message_type_is_unknown() {
        let msg: ServerMessage =
            serde_json::from_value(json!({ "type": "weather" })).unwrap();
        assert!(matches!(msg, ServerMessage::Unknown));
    }

    #[test]
    fn vessel_record_defaults() {
        let record: VesselRecord = serde_json::from_value(json!({
            "mmsi": 316001234,
            "name": null,
            "type_name": "Bulk Carrier",
            "type_category": "Cargo",
            "position": { "lat": 43.25, "lon": -79.21 },
            "last_seen": "2025-01-01T11:59:00Z"
        }))
        .unwrap();

        assert_eq!(record.mmsi, 316_001_234);
        assert!(record.name.is_none());
        assert!(record.heading.is_none());
        assert_eq!(record.speed_knots, 0.0);
        assert_eq!(record.source, "");
    }
}
