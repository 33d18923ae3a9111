//! Traffic watch event record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Database name reported for requests not bound to a tenant database.
pub const NOT_APPLICABLE: &str = "N/A";

/// One completed (or failed) request, as seen by traffic watch listeners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TrafficWatchEvent {
    pub timestamp: DateTime<Utc>,
    pub request_id: u64,
    pub http_method: String,
    pub elapsed_milliseconds: u64,
    pub response_status_code: u16,
    /// Full encoded request URL.
    pub request_uri: String,
    /// Scheme and host only.
    pub absolute_uri: String,
    pub database_name: String,
    #[serde(default)]
    pub custom_info: String,
    #[serde(default)]
    pub inner_requests_count: u32,
    #[serde(default)]
    pub query_timings: Option<serde_json::Value>,
}

impl TrafficWatchEvent {
    /// Whether the request targeted `database` (case-insensitive).
    pub fn targets(&self, database: &str) -> bool {
        self.database_name.eq_ignore_ascii_case(database)
    }
}
