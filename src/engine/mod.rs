//! The proximity-alerting engine: one position event triggers one full,
//! synchronous evaluation pass over the current geofence snapshot.

pub mod distance;
pub mod evaluator;
pub mod tracker;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::models::alert::Alert;
use crate::models::geofence::GeofenceSet;
use crate::models::position::Position;
use crate::notify::Dispatcher;
use crate::store::AlertStore;

use evaluator::{evaluate, GeofenceRef};
use tracker::{Transition, VisitTracker};

pub struct Engine {
    config: AppConfig,
    tracker: VisitTracker,
    store: AlertStore,
    dispatcher: Dispatcher,
}

impl Engine {
    pub fn new(config: AppConfig, store: AlertStore, dispatcher: Dispatcher) -> Self {
        Self {
            config,
            tracker: VisitTracker::new(),
            store,
            dispatcher,
        }
    }

    /// Consumes the position feed until it closes. Geofence snapshots are
    /// taken per pass from the watch channel; a set replaced mid-pass is
    /// only observed on the next position event.
    pub async fn run(
        mut self,
        mut positions: mpsc::Receiver<Position>,
        geofences: watch::Receiver<GeofenceSet>,
    ) {
        info!("Evaluation loop started");
        while let Some(position) = positions.recv().await {
            let snapshot = geofences.borrow().clone();
            let fired = self.process_position(&position, &snapshot);
            for alert in fired {
                info!("Alert fired: {} ({})", alert.title, alert.id);
                // Signals are fire-and-forget; the loop never waits on them.
                let dispatcher = self.dispatcher.clone();
                tokio::spawn(async move {
                    dispatcher.dispatch(&alert);
                });
            }
        }
        info!("Position feed closed, evaluation loop ended");
    }

    /// One atomic evaluation pass. Returns the alerts fired by this sample,
    /// already appended to the store in evaluation order.
    pub fn process_position(&mut self, position: &Position, set: &GeofenceSet) -> Vec<Alert> {
        // 1. Validate the reading
        if !position.has_valid_coordinates() {
            warn!(
                "Dropping position with invalid coordinates ({}, {})",
                position.latitude, position.longitude
            );
            return Vec::new();
        }
        if self.config.accuracy_limit_m > 0.0 && position.accuracy_m > self.config.accuracy_limit_m
        {
            debug!(
                "Skipping low-accuracy reading ({:.0}m > {:.0}m limit)",
                position.accuracy_m, self.config.accuracy_limit_m
            );
            return Vec::new();
        }

        // 2. Evaluate membership against the snapshot
        let evaluations = evaluate(
            position,
            set,
            self.config.hazard_radius_m,
            self.config.exit_margin_m,
        );

        // 3. Apply visit transitions; entries fire, exits silently re-arm
        let mut fired = Vec::new();
        for eval in &evaluations {
            let key = eval.source.key();
            match self
                .tracker
                .observe(&key, eval.is_inside, eval.is_outside_with_margin)
            {
                Transition::Entered => {
                    let alert = match eval.source {
                        GeofenceRef::Zone(zone) => {
                            Alert::for_zone(zone, eval.distance_m, position.captured_at)
                        }
                        GeofenceRef::Hazard(hazard) => {
                            Alert::for_hazard(hazard, eval.distance_m, position.captured_at)
                        }
                    };
                    self.store.append(alert.clone());
                    fired.push(alert);
                }
                Transition::Exited => debug!("Re-armed {}", key),
                Transition::Unchanged => {}
            }
        }

        // 4. Drop tracker state for geofences that left the feed
        self.tracker.prune(&set.live_keys());

        fired
    }
}
