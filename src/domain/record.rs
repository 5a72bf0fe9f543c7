use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single request recorded by the API gateway.
///
/// Records are produced upstream and handed to the pump in batches. The pump
/// only ever borrows them; projection copies the values it needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsRecord {
    pub method: String,
    pub path: String,
    pub response_code: i64,
    pub api_key: String,
    pub timestamp: DateTime<Utc>,
    pub api_version: String,
    pub api_name: String,
    pub api_id: String,
    pub org_id: String,
    pub oauth_id: String,
    /// Base64 encoded request as seen by the gateway
    pub raw_request: String,
    /// Base64 encoded upstream response
    pub raw_response: String,
    /// Upstream latency in milliseconds
    pub request_time: i64,
    pub ip_address: String,
}
