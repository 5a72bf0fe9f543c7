//! Turns analytics records into collector events.
//!
//! Which fields end up in an event is decided by a [`ProjectionConfig`]: an
//! explicit ordered field list, or the full default set when the list is
//! empty. The API key can be redacted down to a short visible suffix.

pub mod field;
pub mod redact;

pub use field::{Field, UnknownField};
pub use redact::{MASK_PREFIX, obfuscate};

use crate::domain::AnalyticsRecord;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectionConfig {
    pub fields: Vec<String>,
    pub obfuscate_api_keys: bool,
    pub obfuscate_api_keys_length: usize,
}

impl ProjectionConfig {
    /// Configured names that do not match any analytics field.
    pub fn unknown_fields(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .map(String::as_str)
            .filter(|name| Field::from_name(name).is_none())
    }
}

/// Field name to value mapping sent as the `event` member of a collector payload.
///
/// Keys serialize in alphabetical order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Event(BTreeMap<&'static str, Value>);

impl Event {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: Field, value: Value) {
        self.0.insert(field.name(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(Field, Value)> for Event {
    fn from_iter<I: IntoIterator<Item = (Field, Value)>>(iter: I) -> Self {
        let mut event = Event::new();
        for (field, value) in iter {
            event.insert(field, value);
        }
        event
    }
}

/// Builds the event for one record. Pure: the same inputs always give the same event.
pub fn project(record: &AnalyticsRecord, config: &ProjectionConfig) -> Event {
    if config.fields.is_empty() {
        return Field::DEFAULT_SET
            .into_iter()
            .map(|field| (field, field.extract(record)))
            .collect();
    }

    let mut event = Event::new();
    for name in &config.fields {
        let Some(field) = Field::from_name(name) else {
            continue;
        };

        if field == Field::ApiKey && config.obfuscate_api_keys {
            if let Some(masked) = obfuscate(&record.api_key, config.obfuscate_api_keys_length) {
                event.insert(field, Value::String(masked));
            }
            continue;
        }

        event.insert(field, field.extract(record));
    }
    event
}
