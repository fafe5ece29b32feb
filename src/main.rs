use std::time::Duration;

use roadwatch::config::AppConfig;
use roadwatch::engine::Engine;
use roadwatch::feeds;
use roadwatch::models::geofence::GeofenceSet;
use roadwatch::notify::{ChannelSink, Dispatcher, LogSink, Signal};
use roadwatch::store::AlertStore;
use tokio::sync::{mpsc, watch};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load config
    let config = AppConfig::load()?;

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(&config.log_level)
        .init();

    info!("Starting Roadwatch proximity alerting service...");

    let store = AlertStore::new();

    // Signals flow to the display surface over a channel; the log sink keeps
    // a diagnostic trace of every delivery.
    let (signal_tx, mut signal_rx) = mpsc::unbounded_channel();
    let dispatcher = Dispatcher::new(vec![
        Box::new(LogSink),
        Box::new(ChannelSink::new(signal_tx)),
    ]);

    tokio::spawn(async move {
        while let Some(signal) = signal_rx.recv().await {
            if let Signal::Toast {
                message,
                color,
                icon,
                duration_ms,
            } = signal
            {
                info!("{} {} ({}, {}ms)", icon, message, color, duration_ms);
            }
        }
    });

    // Feeds
    let (position_tx, position_rx) = mpsc::channel(64);
    let (geofence_tx, geofence_rx) = watch::channel(GeofenceSet::default());

    let geofences_path = config.geofences_path.clone();
    let poll_interval = Duration::from_secs(config.geofence_poll_secs.max(1));
    let default_zone_radius_m = config.default_zone_radius_m;
    tokio::spawn(async move {
        if let Err(e) = feeds::run_geofence_feed(
            geofences_path,
            poll_interval,
            default_zone_radius_m,
            geofence_tx,
        )
        .await
        {
            error!("Geofence feed failed: {}", e);
        }
    });

    let positions_path = config.positions_path.clone();
    tokio::spawn(async move {
        // The sender moves into the task; when the source is exhausted the
        // channel closes and the engine loop winds down.
        if let Err(e) = feeds::run_position_feed(&positions_path, position_tx).await {
            error!("Position feed failed: {}", e);
        }
    });

    // Periodic visibility into the query surface.
    let summary_store = store.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(60));
        ticker.tick().await;
        loop {
            ticker.tick().await;
            info!("{} active alerts", summary_store.active_alerts().len());
        }
    });

    let engine = Engine::new(config, store, dispatcher);
    tokio::select! {
        _ = engine.run(position_rx, geofence_rx) => {
            info!("Position feed ended, shutting down");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
    }

    Ok(())
}
