//! Side-effect signaling for fired alerts: a visual toast, an audible tone
//! keyed by severity, and a haptic pulse. All three are best-effort; a sink
//! failure is logged and never reaches the evaluation pass.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::models::alert::Alert;

/// Vibrate/pause/vibrate, in milliseconds.
pub const HAPTIC_PATTERN_MS: [u64; 3] = [200, 100, 200];

const TONE_DURATION_MS: u64 = 500;
const TONE_PEAK_GAIN: f32 = 0.3;
const TONE_FLOOR_GAIN: f32 = 0.01;

#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    Toast {
        message: String,
        color: &'static str,
        icon: &'static str,
        duration_ms: u64,
    },
    /// Sine tone with an exponential decay from peak to floor gain.
    Tone {
        frequency_hz: f32,
        peak_gain: f32,
        floor_gain: f32,
        duration_ms: u64,
    },
    Haptic {
        pattern_ms: &'static [u64],
    },
}

/// Builds the three signals for one fired alert from the canonical
/// severity style table.
pub fn signals_for(alert: &Alert) -> [Signal; 3] {
    let style = alert.severity.style();
    [
        Signal::Toast {
            message: alert.message.clone(),
            color: style.color,
            icon: style.icon,
            duration_ms: alert.source_kind.toast_duration_ms(),
        },
        Signal::Tone {
            frequency_hz: style.tone_hz,
            peak_gain: TONE_PEAK_GAIN,
            floor_gain: TONE_FLOOR_GAIN,
            duration_ms: TONE_DURATION_MS,
        },
        Signal::Haptic {
            pattern_ms: &HAPTIC_PATTERN_MS,
        },
    ]
}

#[derive(Debug, Error)]
pub enum SignalError {
    #[error("display surface disconnected")]
    ChannelClosed,
    #[error("{0} is not supported on this device")]
    Unsupported(&'static str),
}

/// One delivery surface for signals. Implementations must not block; the
/// dispatcher runs them off the evaluation pass but still expects them to
/// return promptly.
pub trait SignalSink: Send + Sync {
    fn name(&self) -> &'static str;
    fn deliver(&self, signal: &Signal) -> Result<(), SignalError>;
}

/// Fans each alert's signals out to every sink, swallowing failures.
#[derive(Clone)]
pub struct Dispatcher {
    sinks: Arc<Vec<Box<dyn SignalSink>>>,
}

impl Dispatcher {
    pub fn new(sinks: Vec<Box<dyn SignalSink>>) -> Self {
        Self {
            sinks: Arc::new(sinks),
        }
    }

    pub fn dispatch(&self, alert: &Alert) {
        for signal in signals_for(alert) {
            for sink in self.sinks.iter() {
                if let Err(e) = sink.deliver(&signal) {
                    warn!("Signal sink {} failed for alert {}: {}", sink.name(), alert.id, e);
                }
            }
        }
    }
}

/// Diagnostics sink: traces every signal at debug level.
pub struct LogSink;

impl SignalSink for LogSink {
    fn name(&self) -> &'static str {
        "log"
    }

    fn deliver(&self, signal: &Signal) -> Result<(), SignalError> {
        debug!("Delivering signal: {:?}", signal);
        Ok(())
    }
}

/// Forwards signals to the display surface over a channel.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Signal>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<Signal>) -> Self {
        Self { tx }
    }
}

impl SignalSink for ChannelSink {
    fn name(&self) -> &'static str {
        "display"
    }

    fn deliver(&self, signal: &Signal) -> Result<(), SignalError> {
        self.tx
            .send(signal.clone())
            .map_err(|_| SignalError::ChannelClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::alert::SourceKind;
    use crate::models::geofence::Severity;
    use chrono::Utc;
    use std::sync::Mutex;

    fn alert(severity: Severity, source_kind: SourceKind) -> Alert {
        Alert {
            id: "zone-z1-1764396915000".to_string(),
            source_kind,
            title: "Test zone".to_string(),
            message: "You are approaching a high severity accident zone. Distance: 300m"
                .to_string(),
            severity,
            fired_at: Utc::now(),
            latitude: 12.97,
            longitude: 77.59,
            dismissed: false,
        }
    }

    struct RecordingSink {
        delivered: Mutex<Vec<Signal>>,
    }

    impl RecordingSink {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                delivered: Mutex::new(Vec::new()),
            })
        }
    }

    impl SignalSink for Arc<RecordingSink> {
        fn name(&self) -> &'static str {
            "recording"
        }

        fn deliver(&self, signal: &Signal) -> Result<(), SignalError> {
            self.delivered.lock().unwrap().push(signal.clone());
            Ok(())
        }
    }

    struct BrokenSink;

    impl SignalSink for BrokenSink {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn deliver(&self, _signal: &Signal) -> Result<(), SignalError> {
            Err(SignalError::Unsupported("haptics"))
        }
    }

    #[test]
    fn test_one_alert_produces_toast_tone_haptic() {
        let signals = signals_for(&alert(Severity::High, SourceKind::Zone));

        match &signals[0] {
            Signal::Toast {
                color,
                icon,
                duration_ms,
                ..
            } => {
                assert_eq!(*color, "hsl(25, 95%, 53%)");
                assert_eq!(*icon, "🚨");
                assert_eq!(*duration_ms, 5000);
            }
            other => panic!("expected toast first, got {:?}", other),
        }
        match &signals[1] {
            Signal::Tone { frequency_hz, duration_ms, .. } => {
                assert_eq!(*frequency_hz, 800.0);
                assert_eq!(*duration_ms, 500);
            }
            other => panic!("expected tone second, got {:?}", other),
        }
        match &signals[2] {
            Signal::Haptic { pattern_ms } => assert_eq!(*pattern_ms, &[200, 100, 200]),
            other => panic!("expected haptic last, got {:?}", other),
        }
    }

    #[test]
    fn test_hazard_toast_is_shorter() {
        let signals = signals_for(&alert(Severity::Medium, SourceKind::Hazard));
        match &signals[0] {
            Signal::Toast { duration_ms, .. } => assert_eq!(*duration_ms, 4000),
            other => panic!("expected toast, got {:?}", other),
        }
    }

    #[test]
    fn test_broken_sink_does_not_block_the_others() {
        let recording = RecordingSink::new();
        let dispatcher = Dispatcher::new(vec![
            Box::new(BrokenSink),
            Box::new(Arc::clone(&recording)),
        ]);

        dispatcher.dispatch(&alert(Severity::Critical, SourceKind::Zone));

        assert_eq!(recording.delivered.lock().unwrap().len(), 3);
    }

    #[test]
    fn test_channel_sink_reports_closed_channel() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let sink = ChannelSink::new(tx);

        let result = sink.deliver(&Signal::Haptic {
            pattern_ms: &HAPTIC_PATTERN_MS,
        });
        assert!(matches!(result, Err(SignalError::ChannelClosed)));
    }
}
