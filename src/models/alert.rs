use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::geofence::{hazard_key, zone_key, Hazard, Severity, Zone};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Zone,
    Hazard,
}

impl SourceKind {
    /// How long the toast for this alert stays on screen.
    pub fn toast_duration_ms(&self) -> u64 {
        match self {
            SourceKind::Zone => 5000,
            SourceKind::Hazard => 4000,
        }
    }
}

/// A fired proximity notification. Distinct from the hazard *report*: one
/// geofence can fire many alerts over its lifetime, one per visit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub id: String,
    pub source_kind: SourceKind,
    pub title: String,
    pub message: String,
    pub severity: Severity,
    pub fired_at: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub dismissed: bool,
}

impl Alert {
    pub fn for_zone(zone: &Zone, distance_m: f64, fired_at: DateTime<Utc>) -> Self {
        Alert {
            id: format!("{}-{}", zone_key(&zone.id), fired_at.timestamp_millis()),
            source_kind: SourceKind::Zone,
            title: zone.name.clone(),
            message: format!(
                "You are approaching a {} severity accident zone. Distance: {}m",
                zone.severity.as_str(),
                distance_m.round() as i64
            ),
            severity: zone.severity,
            fired_at,
            latitude: zone.latitude,
            longitude: zone.longitude,
            dismissed: false,
        }
    }

    pub fn for_hazard(hazard: &Hazard, distance_m: f64, fired_at: DateTime<Utc>) -> Self {
        Alert {
            id: format!("{}-{}", hazard_key(&hazard.id), fired_at.timestamp_millis()),
            source_kind: SourceKind::Hazard,
            title: format!("Road Hazard: {}", hazard.category.as_str()),
            message: format!(
                "{}. Distance: {}m",
                hazard.description,
                distance_m.round() as i64
            ),
            // Reported hazards always alert at medium severity.
            severity: Severity::Medium,
            fired_at,
            latitude: hazard.latitude,
            longitude: hazard.longitude,
            dismissed: false,
        }
    }
}

/// Canonical severity presentation table. Every surface (toast, tone,
/// map markers) reads from here instead of keeping its own copy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeverityStyle {
    pub color: &'static str,
    pub icon: &'static str,
    pub tone_hz: f32,
}

impl Severity {
    pub fn style(&self) -> SeverityStyle {
        match self {
            Severity::Low => SeverityStyle {
                color: "hsl(142, 76%, 36%)",
                icon: "⚠️",
                tone_hz: 400.0,
            },
            Severity::Medium => SeverityStyle {
                color: "hsl(45, 93%, 47%)",
                icon: "⚠️",
                tone_hz: 600.0,
            },
            Severity::High => SeverityStyle {
                color: "hsl(25, 95%, 53%)",
                icon: "🚨",
                tone_hz: 800.0,
            },
            Severity::Critical => SeverityStyle {
                color: "hsl(0, 84%, 60%)",
                icon: "🚨",
                tone_hz: 1000.0,
            },
        }
    }
}
