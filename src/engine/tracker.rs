use std::collections::HashSet;

/// Outcome of feeding one membership evaluation to the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// First sample inside an un-notified geofence. Fire exactly one alert.
    Entered,
    /// Left the geofence past its exit margin; it may fire again.
    Exited,
    Unchanged,
}

/// Remembers which geofences have already fired for the current visit.
///
/// Per geofence the state cycles NOT_NOTIFIED -> NOTIFIED -> NOT_NOTIFIED.
/// Entry requires being inside the radius, re-arming requires leaving past
/// radius + exit margin, so GPS jitter at the boundary cannot re-fire.
#[derive(Debug, Default)]
pub struct VisitTracker {
    notified: HashSet<String>,
}

impl VisitTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, key: &str, is_inside: bool, is_outside_with_margin: bool) -> Transition {
        if self.notified.contains(key) {
            if is_outside_with_margin {
                self.notified.remove(key);
                return Transition::Exited;
            }
            return Transition::Unchanged;
        }
        if is_inside {
            self.notified.insert(key.to_string());
            return Transition::Entered;
        }
        Transition::Unchanged
    }

    /// Drops state for geofences no longer present in the feed, so deleted
    /// zones and hazards do not pin memory forever.
    pub fn prune(&mut self, live_keys: &HashSet<String>) {
        self.notified.retain(|key| live_keys.contains(key));
    }

    pub fn is_notified(&self, key: &str) -> bool {
        self.notified.contains(key)
    }

    pub fn tracked(&self) -> usize {
        self.notified.len()
    }
}
