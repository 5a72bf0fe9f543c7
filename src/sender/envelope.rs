use crate::projection::Event;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// HEC payload: `{"time": <unix seconds>, "event": {...}}`.
#[derive(Debug, Serialize)]
pub struct HecEnvelope<'a> {
    pub time: i64,
    pub event: &'a Event,
}

impl<'a> HecEnvelope<'a> {
    pub fn new(event: &'a Event, timestamp: DateTime<Utc>) -> Self {
        Self {
            time: timestamp.timestamp(),
            event,
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}
