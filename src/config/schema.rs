//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cluster::RachisState;

/// Root configuration for the server front door.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Security settings that drive the safety gate.
    pub security: SecurityConfig,

    /// HTTP pipeline settings.
    pub http: HttpConfig,

    /// Debug-only switches.
    pub debug: DebugConfig,

    /// Traffic watch fan-out settings.
    pub traffic_watch: TrafficWatchConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Identity of this cluster node.
    pub node: NodeConfig,

    /// Admin surface settings.
    pub admin: AdminConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
        }
    }
}

/// Security configuration consumed by the safety gate.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Client certificate authentication is configured.
    pub authentication_enabled: bool,

    /// An administrator validated that unsecured access is permitted for the
    /// bound addresses. Unset means not validated.
    pub unsecured_access_validated: Option<bool>,

    /// Paths served normally even when the server runs unsafe.
    pub unsafe_allowed_paths: Vec<String>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            authentication_enabled: false,
            unsecured_access_validated: None,
            unsafe_allowed_paths: vec!["/debug/server-id".to_string()],
        }
    }
}

/// HTTP pipeline configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Compress responses (gzip) when the client accepts it.
    pub use_response_compression: bool,

    /// Suppress the per-request log line.
    pub skip_http_logging: bool,

    /// Deadline for the router in seconds. Exceeding it is a 408 `Timeout` fault.
    pub request_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            use_response_compression: true,
            skip_http_logging: false,
            request_timeout_secs: 300,
        }
    }
}

/// Debug switches. Never enable in production.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DebugConfig {
    /// Echo raw fault text of every kind in fault bodies.
    pub expose_fault_details: bool,
}

/// Traffic watch configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TrafficWatchConfig {
    /// Events buffered per listener before the oldest are dropped.
    pub queue_capacity: usize,
}

impl Default for TrafficWatchConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 1024,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Identity of this node as reported by `/cluster/node-info`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NodeConfig {
    pub node_tag: String,
    pub topology_id: String,
    /// Thumbprint of the server certificate, if any.
    pub certificate_thumbprint: Option<String>,
    pub cluster_status: String,
    pub current_state: RachisState,
    /// Server instance id. Generated at startup when unset.
    pub server_id: Option<Uuid>,
    pub installed_memory_gb: f64,
    pub usable_memory_gb: f64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            node_tag: "A".to_string(),
            topology_id: String::new(),
            certificate_thumbprint: None,
            cluster_status: "Ok".to_string(),
            current_state: RachisState::Passive,
            server_id: None,
            installed_memory_gb: 0.0,
            usable_memory_gb: 0.0,
        }
    }
}

/// Admin surface configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable the admin listener.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,

    /// Admin listener bind address.
    pub bind_address: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            // Rejected by validation while the admin surface is enabled.
            api_key: "CHANGE_ME_IN_PRODUCTION".to_string(),
            bind_address: "127.0.0.1:8081".to_string(),
        }
    }
}
