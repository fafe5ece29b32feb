use tracing::debug;

use super::distance::haversine_distance_m;
use crate::models::geofence::{hazard_key, zone_key, GeofenceSet, Hazard, Zone};
use crate::models::position::Position;

/// The geofence a membership result refers to.
#[derive(Debug, Clone, Copy)]
pub enum GeofenceRef<'a> {
    Zone(&'a Zone),
    Hazard(&'a Hazard),
}

impl GeofenceRef<'_> {
    pub fn key(&self) -> String {
        match self {
            GeofenceRef::Zone(z) => zone_key(&z.id),
            GeofenceRef::Hazard(h) => hazard_key(&h.id),
        }
    }
}

/// One geofence's membership result for a single position sample.
#[derive(Debug, Clone, Copy)]
pub struct Evaluation<'a> {
    pub source: GeofenceRef<'a>,
    pub distance_m: f64,
    pub is_inside: bool,
    pub is_outside_with_margin: bool,
}

/// Tests the position against every zone and every approved hazard.
///
/// History-free: the same position and set always produce the same result.
/// Malformed entries (non-finite center, non-positive radius) evaluate as
/// no match so one bad document cannot stall the alerting loop.
pub fn evaluate<'a>(
    position: &Position,
    set: &'a GeofenceSet,
    hazard_radius_m: f64,
    exit_margin_m: f64,
) -> Vec<Evaluation<'a>> {
    let mut results = Vec::with_capacity(set.zones.len() + set.hazards.len());

    for zone in &set.zones {
        match membership(position, zone.latitude, zone.longitude, zone.radius_m, exit_margin_m) {
            Some((distance_m, is_inside, is_outside_with_margin)) => results.push(Evaluation {
                source: GeofenceRef::Zone(zone),
                distance_m,
                is_inside,
                is_outside_with_margin,
            }),
            None => debug!("Skipping malformed zone {}", zone.id),
        }
    }

    for hazard in set.approved_hazards() {
        match membership(position, hazard.latitude, hazard.longitude, hazard_radius_m, exit_margin_m) {
            Some((distance_m, is_inside, is_outside_with_margin)) => results.push(Evaluation {
                source: GeofenceRef::Hazard(hazard),
                distance_m,
                is_inside,
                is_outside_with_margin,
            }),
            None => debug!("Skipping malformed hazard {}", hazard.id),
        }
    }

    results
}

fn membership(
    position: &Position,
    latitude: f64,
    longitude: f64,
    radius_m: f64,
    exit_margin_m: f64,
) -> Option<(f64, bool, bool)> {
    if !latitude.is_finite() || !longitude.is_finite() || !radius_m.is_finite() || radius_m <= 0.0 {
        return None;
    }
    let distance_m =
        haversine_distance_m(position.latitude, position.longitude, latitude, longitude);
    Some((
        distance_m,
        distance_m <= radius_m,
        distance_m > radius_m + exit_margin_m,
    ))
}
