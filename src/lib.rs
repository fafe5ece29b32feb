pub mod config;
pub mod engine;
pub mod feeds;
pub mod models;
pub mod notify;
pub mod store;

pub use config::AppConfig;
pub use engine::Engine;
pub use models::alert::{Alert, SeverityStyle, SourceKind};
pub use models::geofence::{
    ApprovalStatus, GeofenceSet, Hazard, HazardCategory, Severity, Zone,
};
pub use models::position::Position;
pub use notify::{ChannelSink, Dispatcher, LogSink, Signal, SignalSink};
pub use store::AlertStore;
