use anyhow::Result;
use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Extra distance past a geofence radius before it can fire again.
    pub exit_margin_m: f64,
    /// Alerting radius applied to every approved hazard report.
    pub hazard_radius_m: f64,
    /// Radius for zones whose document does not carry one.
    pub default_zone_radius_m: f64,
    /// Readings with worse reported accuracy skip evaluation; 0 disables
    /// the check.
    pub accuracy_limit_m: f64,
    /// NDJSON position events, "-" for stdin.
    pub positions_path: String,
    /// Geofence snapshot document, re-read on change.
    pub geofences_path: String,
    pub geofence_poll_secs: u64,
    pub log_level: String,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let exit_margin_m = env::var("EXIT_MARGIN_METERS")
            .unwrap_or_else(|_| "100".to_string())
            .parse()
            .unwrap_or(100.0);
        let hazard_radius_m = env::var("HAZARD_RADIUS_METERS")
            .unwrap_or_else(|_| "200".to_string())
            .parse()
            .unwrap_or(200.0);
        let default_zone_radius_m = env::var("DEFAULT_ZONE_RADIUS_METERS")
            .unwrap_or_else(|_| "500".to_string())
            .parse()
            .unwrap_or(500.0);
        let accuracy_limit_m = env::var("ACCURACY_LIMIT_METERS")
            .unwrap_or_else(|_| "100".to_string())
            .parse()
            .unwrap_or(100.0);

        let positions_path = env::var("POSITIONS_PATH").unwrap_or_else(|_| "-".to_string());
        let geofences_path =
            env::var("GEOFENCES_PATH").unwrap_or_else(|_| "geofences.json".to_string());
        let geofence_poll_secs = env::var("GEOFENCE_POLL_SECS")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .unwrap_or(5);

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            exit_margin_m,
            hazard_radius_m,
            default_zone_radius_m,
            accuracy_limit_m,
            positions_path,
            geofences_path,
            geofence_poll_secs,
            log_level,
        })
    }
}
