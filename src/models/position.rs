use chrono::{DateTime, Utc};

/// A single GPS fix from the location source. Each reading supersedes the
/// previous one; readings are never merged.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_m: f64,
    pub captured_at: DateTime<Utc>,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64, accuracy_m: f64, captured_at: DateTime<Utc>) -> Self {
        Self {
            latitude,
            longitude,
            accuracy_m,
            captured_at,
        }
    }

    /// True when the coordinates are finite and within valid lat/lng ranges.
    pub fn has_valid_coordinates(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}
