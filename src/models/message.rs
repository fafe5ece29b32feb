use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use uuid::Uuid;

use super::geofence::{ApprovalStatus, Hazard, HazardCategory, Severity, Zone};
use super::position::Position;

/// One position event from the location feed.
#[derive(Debug, Deserialize)]
pub struct PositionMessage {
    pub uuid: Option<String>,
    #[serde(default, deserialize_with = "parse_f64_option")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "parse_f64_option")]
    pub lng: Option<f64>,
    #[serde(default, deserialize_with = "parse_f64_option")]
    pub accuracy: Option<f64>,
    pub timestamp: Option<String>,
}

impl PositionMessage {
    /// Correlation id for log lines; upstream ids that are not UUIDs get a
    /// fresh one so tracing always has something to key on.
    pub fn correlation_id(&self) -> Uuid {
        self.uuid
            .as_deref()
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_else(Uuid::new_v4)
    }

    pub fn into_position(self) -> Option<Position> {
        let latitude = self.lat?;
        let longitude = self.lng?;
        let captured_at = parse_timestamp(self.timestamp.as_deref())?;
        Some(Position::new(
            latitude,
            longitude,
            self.accuracy.unwrap_or(0.0),
            captured_at,
        ))
    }
}

/// Full replace-on-change snapshot from the geofence feed.
#[derive(Debug, Default, Deserialize)]
pub struct GeofenceDocument {
    #[serde(default)]
    pub zones: Vec<ZoneRecord>,
    #[serde(default)]
    pub hazards: Vec<HazardRecord>,
}

#[derive(Debug, Deserialize)]
pub struct ZoneRecord {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "parse_f64_option")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "parse_f64_option")]
    pub lng: Option<f64>,
    pub severity: Severity,
    #[serde(default, deserialize_with = "parse_f64_option")]
    pub radius: Option<f64>,
    pub description: Option<String>,
    #[serde(rename = "createdBy")]
    pub created_by: Option<String>,
    pub timestamp: Option<String>,
}

impl ZoneRecord {
    pub fn into_zone(self, default_radius_m: f64) -> Option<Zone> {
        let latitude = self.lat?;
        let longitude = self.lng?;
        Some(Zone {
            id: self.id,
            name: self.name,
            latitude,
            longitude,
            severity: self.severity,
            radius_m: self.radius.unwrap_or(default_radius_m),
            description: self.description,
            created_by: self.created_by,
            created_at: self
                .timestamp
                .as_deref()
                .and_then(|s| parse_timestamp(Some(s))),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct HazardRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub category: HazardCategory,
    #[serde(default, deserialize_with = "parse_f64_option")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "parse_f64_option")]
    pub lng: Option<f64>,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "reportedBy", default)]
    pub reported_by: String,
    pub status: Option<ApprovalStatus>,
}

impl HazardRecord {
    pub fn into_hazard(self) -> Option<Hazard> {
        let latitude = self.lat?;
        let longitude = self.lng?;
        Some(Hazard {
            id: self.id,
            category: self.category,
            latitude,
            longitude,
            description: self.description,
            reported_by: self.reported_by,
            // Reports with no moderation status stay out of alerting.
            status: self.status.unwrap_or(ApprovalStatus::Pending),
        })
    }
}

fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t.with_timezone(&Utc));
    }
    if let Ok(t) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(t.and_utc());
    }
    // Epoch milliseconds, the format the browser location API reports.
    if let Ok(millis) = raw.parse::<i64>() {
        return DateTime::from_timestamp_millis(millis);
    }
    None
}

fn parse_f64_option<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrFloat {
        String(String),
        Float(f64),
    }

    let v: Option<StringOrFloat> = Option::deserialize(deserializer)?;
    match v {
        Some(StringOrFloat::Float(f)) => Ok(Some(f)),
        Some(StringOrFloat::String(s)) => {
            if s.trim().is_empty() {
                Ok(None)
            } else {
                s.parse::<f64>().map(Some).map_err(serde::de::Error::custom)
            }
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parsing_string_encoded_position() {
        let payload = r#"
        {
            "uuid": "d52b1454-d43d-50fa-99ca-79515c904162",
            "lat": "+20.652494",
            "lng": "-100.391404",
            "accuracy": "12.5",
            "timestamp": "2025-11-29 06:15:15"
        }
        "#;

        let msg: PositionMessage = serde_json::from_str(payload).unwrap();
        let position = msg.into_position().unwrap();
        assert_eq!(position.latitude, 20.652494);
        assert_eq!(position.longitude, -100.391404);
        assert_eq!(position.accuracy_m, 12.5);
        assert_eq!(
            position.captured_at.to_rfc3339(),
            "2025-11-29T06:15:15+00:00"
        );
    }

    #[test]
    fn test_position_without_coordinates_is_dropped() {
        let msg: PositionMessage =
            serde_json::from_str(r#"{"lat": "", "timestamp": "2025-11-29 06:15:15"}"#).unwrap();
        assert!(msg.into_position().is_none());
    }

    #[test]
    fn test_epoch_millis_and_rfc3339_timestamps() {
        let from_millis = parse_timestamp(Some("1764396915000")).unwrap();
        let from_rfc = parse_timestamp(Some("2025-11-29T06:15:15Z")).unwrap();
        assert_eq!(from_millis, from_rfc);
        assert!(parse_timestamp(Some("yesterday")).is_none());
    }

    #[test]
    fn test_geofence_document_parsing() {
        let payload = r#"
        {
            "zones": [
                {
                    "id": "z1",
                    "name": "Silk Board junction",
                    "lat": 12.9716,
                    "lng": "77.5946",
                    "severity": "high",
                    "description": "Frequent rear-end collisions"
                }
            ],
            "hazards": [
                {
                    "id": "h1",
                    "type": "pothole",
                    "lat": 12.93,
                    "lng": 77.61,
                    "description": "Deep pothole after the flyover",
                    "reportedBy": "u42",
                    "status": "approved"
                },
                {
                    "id": "h2",
                    "type": "sinkhole",
                    "lat": 12.94,
                    "lng": 77.62,
                    "description": "Unmapped category",
                    "reportedBy": "u43"
                }
            ]
        }
        "#;

        let doc: GeofenceDocument = serde_json::from_str(payload).unwrap();

        let zone = doc
            .zones
            .into_iter()
            .next()
            .unwrap()
            .into_zone(500.0)
            .unwrap();
        assert_eq!(zone.severity, Severity::High);
        assert_eq!(zone.radius_m, 500.0);
        assert_eq!(zone.longitude, 77.5946);

        let hazards: Vec<_> = doc
            .hazards
            .into_iter()
            .map(|h| h.into_hazard().unwrap())
            .collect();
        assert_eq!(hazards[0].status, ApprovalStatus::Approved);
        // Unknown category and missing status degrade, not fail.
        assert_eq!(hazards[1].category, HazardCategory::Other);
        assert_eq!(hazards[1].status, ApprovalStatus::Pending);
    }

    #[test]
    fn test_correlation_id_fallback() {
        let msg: PositionMessage = serde_json::from_str(r#"{"uuid": "not-a-uuid"}"#).unwrap();
        // Falls back to a generated id instead of failing.
        let _ = msg.correlation_id();

        let msg: PositionMessage =
            serde_json::from_str(r#"{"uuid": "d52b1454-d43d-50fa-99ca-79515c904162"}"#).unwrap();
        assert_eq!(
            msg.correlation_id().to_string(),
            "d52b1454-d43d-50fa-99ca-79515c904162"
        );
    }
}
