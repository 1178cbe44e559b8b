use chrono::{DateTime, Utc};
use serde::Serialize;

/// A fixed spot in the room where signal strengths were sampled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, sqlx::FromRow)]
pub struct Measurement {
    pub id: i32,
    pub x: f64,
    pub y: f64,
}

/// A client device and its representative readings, one per sensor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Device {
    pub mac: String,
    pub signals: Vec<f64>,
}

/// One read of the store.
///
/// `signals[i]` holds the readings taken at `measurements[i]`.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub measurements: Vec<Measurement>,
    pub signals: Vec<Vec<f64>>,
    pub devices: Vec<Device>,
    pub fetched_at: DateTime<Utc>,
}
