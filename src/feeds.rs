//! Feed adapters: decode raw events from the outside world into model types
//! and push them onto the engine's channels. Malformed events are logged and
//! skipped so the feeds never die on bad input.

use std::time::Duration;

use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::models::geofence::{GeofenceSet, Hazard, Zone};
use crate::models::message::{GeofenceDocument, PositionMessage};
use crate::models::position::Position;

/// Streams NDJSON position events from a file, or stdin when `path` is "-",
/// until the source is exhausted or the engine goes away.
pub async fn run_position_feed(path: &str, tx: mpsc::Sender<Position>) -> anyhow::Result<()> {
    let reader: Box<dyn AsyncBufRead + Unpin + Send> = if path == "-" {
        info!("Reading position events from stdin");
        Box::new(BufReader::new(tokio::io::stdin()))
    } else {
        info!("Reading position events from {}", path);
        Box::new(BufReader::new(File::open(path).await?))
    };

    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let message: PositionMessage = match serde_json::from_str(&line) {
            Ok(m) => m,
            Err(e) => {
                warn!("Failed to parse position event: {}", e);
                continue;
            }
        };

        let correlation_id = message.correlation_id();
        match message.into_position() {
            Some(position) => {
                debug!(
                    "Position event {} at ({}, {})",
                    correlation_id, position.latitude, position.longitude
                );
                if tx.send(position).await.is_err() {
                    // Engine dropped its receiver, nothing left to feed.
                    break;
                }
            }
            None => {
                warn!(
                    "Position event {} missing coordinates or timestamp, skipping",
                    correlation_id
                );
            }
        }
    }

    Ok(())
}

/// Polls the geofence document and publishes a full replacement snapshot
/// whenever its contents change. Read or parse failures keep the previous
/// snapshot in place.
pub async fn run_geofence_feed(
    path: String,
    poll_interval: Duration,
    default_zone_radius_m: f64,
    tx: watch::Sender<GeofenceSet>,
) -> anyhow::Result<()> {
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_raw = String::new();

    loop {
        ticker.tick().await;
        if tx.is_closed() {
            break;
        }

        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Failed to read geofence document {}: {}", path, e);
                continue;
            }
        };
        if raw == last_raw {
            continue;
        }

        let document: GeofenceDocument = match serde_json::from_str(&raw) {
            Ok(d) => d,
            Err(e) => {
                warn!("Failed to parse geofence document {}: {}", path, e);
                continue;
            }
        };

        let zones: Vec<Zone> = document
            .zones
            .into_iter()
            .filter_map(|record| record.into_zone(default_zone_radius_m))
            .collect();
        // Only approved reports alert; moderation happens upstream.
        let hazards: Vec<Hazard> = document
            .hazards
            .into_iter()
            .filter_map(|record| record.into_hazard())
            .filter(|hazard| hazard.is_approved())
            .collect();

        info!(
            "Geofence snapshot updated: {} zones, {} approved hazards",
            zones.len(),
            hazards.len()
        );
        if tx.send(GeofenceSet::new(zones, hazards)).is_err() {
            break;
        }
        last_raw = raw;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::geofence::Severity;

    #[tokio::test]
    async fn test_position_feed_skips_junk_lines() {
        let dir = std::env::temp_dir().join("roadwatch-feed-test");
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let path = dir.join("positions.ndjson");
        tokio::fs::write(
            &path,
            concat!(
                "{\"lat\": 12.9716, \"lng\": 77.5946, \"accuracy\": 5, \"timestamp\": \"2025-11-29T06:15:15Z\"}\n",
                "not json at all\n",
                "\n",
                "{\"lat\": \"12.9720\", \"lng\": \"77.5950\", \"timestamp\": \"2025-11-29 06:15:20\"}\n",
                "{\"lng\": 77.5946, \"timestamp\": \"2025-11-29T06:15:25Z\"}\n",
            ),
        )
        .await
        .unwrap();

        let (tx, mut rx) = mpsc::channel(8);
        run_position_feed(path.to_str().unwrap(), tx).await.unwrap();

        let mut received = Vec::new();
        while let Some(position) = rx.recv().await {
            received.push(position);
        }
        assert_eq!(received.len(), 2);
        assert_eq!(received[0].latitude, 12.9716);
        assert_eq!(received[1].longitude, 77.5950);
    }

    #[tokio::test]
    async fn test_geofence_feed_publishes_on_change() {
        let dir = std::env::temp_dir().join("roadwatch-geofence-test");
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let path = dir.join("geofences.json");
        tokio::fs::write(
            &path,
            r#"{
                "zones": [
                    {"id": "z1", "name": "Outer ring", "lat": 12.9716, "lng": 77.5946, "severity": "critical"}
                ],
                "hazards": [
                    {"id": "h1", "type": "debris", "lat": 12.93, "lng": 77.61, "description": "d", "reportedBy": "u1", "status": "pending"}
                ]
            }"#,
        )
        .await
        .unwrap();

        let (tx, mut rx) = watch::channel(GeofenceSet::default());
        let feed = tokio::spawn(run_geofence_feed(
            path.to_str().unwrap().to_string(),
            Duration::from_millis(10),
            500.0,
            tx,
        ));

        rx.changed().await.unwrap();
        let snapshot = rx.borrow().clone();
        assert_eq!(snapshot.zones.len(), 1);
        assert_eq!(snapshot.zones[0].severity, Severity::Critical);
        assert_eq!(snapshot.zones[0].radius_m, 500.0);
        // Pending reports never reach the engine.
        assert!(snapshot.hazards.is_empty());

        // Dropping the receiver ends the feed task.
        drop(rx);
        feed.await.unwrap().unwrap();
    }
}
