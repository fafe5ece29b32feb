use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::models::alert::Alert;

/// In-memory, insertion-ordered collection of fired alerts.
///
/// The engine appends; the display surface reads, dismisses, and clears.
/// Process-lifetime only, nothing survives a restart. Handles are cheap
/// clones sharing one collection behind a mutex, since position passes and
/// UI-triggered dismissals can arrive on different tasks.
#[derive(Debug, Clone, Default)]
pub struct AlertStore {
    inner: Arc<Mutex<Vec<Alert>>>,
}

impl AlertStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends at the end of the collection. A duplicate id is rejected
    /// without disturbing ordering; the tracker already guarantees one fire
    /// per visit, so a duplicate means a replayed event.
    pub fn append(&self, alert: Alert) {
        let mut alerts = self.lock();
        if alerts.iter().any(|a| a.id == alert.id) {
            debug!("Ignoring duplicate alert {}", alert.id);
            return;
        }
        alerts.push(alert);
    }

    /// Marks the matching alert dismissed. Unknown ids are a no-op; the
    /// flag never reverts.
    pub fn dismiss(&self, alert_id: &str) {
        let mut alerts = self.lock();
        if let Some(alert) = alerts.iter_mut().find(|a| a.id == alert_id) {
            alert.dismissed = true;
        }
    }

    /// Empties the collection, dismissed or not.
    pub fn clear_all(&self) {
        self.lock().clear();
    }

    /// Snapshot of un-dismissed alerts in insertion order. Recomputed on
    /// every call.
    pub fn active_alerts(&self) -> Vec<Alert> {
        self.lock()
            .iter()
            .filter(|a| !a.dismissed)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Alert>> {
        // Poisoning means a panic mid-mutation on another task; nothing to
        // recover, fail fast.
        self.inner.lock().expect("alert store lock poisoned")
    }
}
