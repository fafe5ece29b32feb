pub mod alert;
pub mod geofence;
pub mod message;
pub mod position;
