use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HazardCategory {
    Pothole,
    Debris,
    Construction,
    Accident,
    Other,
}

// Reports arrive from a form whose category list has changed over time, so
// unknown values fold into Other instead of failing the whole snapshot.
impl<'de> Deserialize<'de> for HazardCategory {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.as_str() {
            "pothole" => HazardCategory::Pothole,
            "debris" => HazardCategory::Debris,
            "construction" => HazardCategory::Construction,
            "accident" => HazardCategory::Accident,
            _ => HazardCategory::Other,
        })
    }
}

impl HazardCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            HazardCategory::Pothole => "pothole",
            HazardCategory::Debris => "debris",
            HazardCategory::Construction => "construction",
            HazardCategory::Accident => "accident",
            HazardCategory::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

/// Administrator-defined accident zone with its own alerting radius.
#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub severity: Severity,
    pub radius_m: f64,
    pub description: Option<String>,
    pub created_by: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Crowd-sourced point hazard. Alerting radius is fixed by configuration,
/// not per-report; only approved reports reach ordinary users.
#[derive(Debug, Clone, PartialEq)]
pub struct Hazard {
    pub id: String,
    pub category: HazardCategory,
    pub latitude: f64,
    pub longitude: f64,
    pub description: String,
    pub reported_by: String,
    pub status: ApprovalStatus,
}

impl Hazard {
    pub fn is_approved(&self) -> bool {
        self.status == ApprovalStatus::Approved
    }
}

/// Full snapshot of the current zones and hazards. The geofence feed
/// replaces the whole set on every change; the engine never mutates it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeofenceSet {
    pub zones: Vec<Zone>,
    pub hazards: Vec<Hazard>,
}

impl GeofenceSet {
    pub fn new(zones: Vec<Zone>, hazards: Vec<Hazard>) -> Self {
        Self { zones, hazards }
    }

    pub fn approved_hazards(&self) -> impl Iterator<Item = &Hazard> {
        self.hazards.iter().filter(|h| h.is_approved())
    }

    /// Dedup keys of every geofence that can currently fire. Used to prune
    /// tracker state for deleted geofences.
    pub fn live_keys(&self) -> HashSet<String> {
        self.zones
            .iter()
            .map(|z| zone_key(&z.id))
            .chain(self.approved_hazards().map(|h| hazard_key(&h.id)))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty() && self.hazards.is_empty()
    }
}

// Raw ids come from two separate collections, so the dedup key carries the
// kind prefix to keep a zone and a hazard with the same id distinct.
pub fn zone_key(id: &str) -> String {
    format!("zone-{}", id)
}

pub fn hazard_key(id: &str) -> String {
    format!("hazard-{}", id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hazard(id: &str, status: ApprovalStatus) -> Hazard {
        Hazard {
            id: id.to_string(),
            category: HazardCategory::Pothole,
            latitude: 12.97,
            longitude: 77.59,
            description: "Large pothole in right lane".to_string(),
            reported_by: "u1".to_string(),
            status,
        }
    }

    #[test]
    fn test_only_approved_hazards_are_live() {
        let set = GeofenceSet::new(
            vec![],
            vec![
                hazard("h1", ApprovalStatus::Approved),
                hazard("h2", ApprovalStatus::Pending),
                hazard("h3", ApprovalStatus::Rejected),
            ],
        );

        let keys = set.live_keys();
        assert!(keys.contains("hazard-h1"));
        assert!(!keys.contains("hazard-h2"));
        assert!(!keys.contains("hazard-h3"));
    }

    #[test]
    fn test_zone_and_hazard_keys_never_collide() {
        assert_ne!(zone_key("x1"), hazard_key("x1"));
    }

    #[test]
    fn test_severity_serde_is_lowercase() {
        let s: Severity = serde_json::from_str("\"critical\"").unwrap();
        assert_eq!(s, Severity::Critical);
        assert_eq!(serde_json::to_string(&Severity::Low).unwrap(), "\"low\"");
    }
}
