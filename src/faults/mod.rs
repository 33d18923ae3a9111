//! Fault subsystem.
//!
//! # Data Flow
//! ```text
//! domain logic / router
//!     → Fault (closed set of kinds)
//!     → taxonomy.rs (ordered classification → FaultClass + status)
//!     → body.rs (sanitized wire body)
//!     → dispatch pipeline writes status + body
//! ```
//!
//! # Design Decisions
//! - Fault kinds are a closed enum; adding a kind forces a classification arm
//! - Classification is pure and total
//! - Internal detail is logged, only allow-listed detail reaches the wire

pub mod body;
pub mod taxonomy;

use thiserror::Error;

pub use body::{ClassifiedFault, FaultBody, FaultDetail};
pub use taxonomy::{classify, Classification, FaultClass};

/// Result type for routed handlers.
pub type FaultResult<T> = Result<T, Fault>;

/// Every failure a routed request can surface to the dispatch pipeline.
#[derive(Debug, Error)]
pub enum Fault {
    /// Plaintext request against an endpoint that requires TLS.
    #[error("insufficient transport layer protection: {0}")]
    InsufficientTransportLayerProtection(String),

    #[error("low memory: {0}")]
    LowMemory(String),

    #[error("out of memory")]
    OutOfMemory,

    /// The storage engine hit an error it cannot recover from.
    #[error("storage engine unrecoverable error: {0}")]
    StorageUnrecoverable(String),

    #[error("document '{doc_id}' is in conflict, largest etag is {largest_etag}")]
    DocumentConflict { doc_id: String, largest_etag: i64 },

    #[error("conflict: {0}")]
    Conflict(String),

    /// Optimistic concurrency check failed.
    #[error("concurrency violation: {0}")]
    Concurrency(String),

    #[error("database '{database}' is disabled")]
    DatabaseDisabled { database: String },

    #[error("database '{database}' failed to load: {reason}")]
    DatabaseLoadFailure { database: String, reason: String },

    #[error("database '{database}' did not load in time")]
    DatabaseLoadTimeout { database: String },

    #[error("database '{database}' is being loaded by another request and did not finish in time")]
    DatabaseConcurrentLoadTimeout { database: String },

    /// This node is not yet an active member of the cluster.
    #[error("node is passive and cannot serve requests")]
    NodeIsPassive,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("no route for {method} {path}")]
    RouteNotFound { method: String, path: String },

    #[error("unauthorized access: {0}")]
    Unauthorized(String),

    #[error("operation timed out: {0}")]
    Timeout(String),

    #[error("license limit reached: {0}")]
    LicenseLimit(String),

    /// The addressed database is no longer hosted on this node.
    #[error("database '{database}' is not relevant on this node")]
    DatabaseNotRelevant { database: String },

    #[error("failed to compile index definition property '{index_definition_property}': {message}")]
    IndexCompilation {
        index_definition_property: String,
        problematic_text: String,
        message: String,
    },

    #[error("internal error: {0}")]
    Internal(String),

    /// Anything a handler raised that has no dedicated kind.
    #[error(transparent)]
    Unexpected(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl Fault {
    /// Stable name reported in the `Type` field of fault bodies.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Fault::InsufficientTransportLayerProtection(_) => "InsufficientTransportLayerProtection",
            Fault::LowMemory(_) => "LowMemory",
            Fault::OutOfMemory => "OutOfMemory",
            Fault::StorageUnrecoverable(_) => "StorageUnrecoverable",
            Fault::DocumentConflict { .. } => "DocumentConflict",
            Fault::Conflict(_) => "Conflict",
            Fault::Concurrency(_) => "Concurrency",
            Fault::DatabaseDisabled { .. } => "DatabaseDisabled",
            Fault::DatabaseLoadFailure { .. } => "DatabaseLoadFailure",
            Fault::DatabaseLoadTimeout { .. } => "DatabaseLoadTimeout",
            Fault::DatabaseConcurrentLoadTimeout { .. } => "DatabaseConcurrentLoadTimeout",
            Fault::NodeIsPassive => "NodeIsPassive",
            Fault::BadRequest(_) => "BadRequest",
            Fault::RouteNotFound { .. } => "RouteNotFound",
            Fault::Unauthorized(_) => "Unauthorized",
            Fault::Timeout(_) => "Timeout",
            Fault::LicenseLimit(_) => "LicenseLimit",
            Fault::DatabaseNotRelevant { .. } => "DatabaseNotRelevant",
            Fault::IndexCompilation { .. } => "IndexCompilation",
            Fault::Internal(_) => "Internal",
            Fault::Unexpected(_) => "Unexpected",
        }
    }

    /// Whether the kind-specific detail of this fault may be echoed to clients.
    pub fn detail_is_public(&self) -> bool {
        matches!(
            self,
            Fault::DocumentConflict { .. } | Fault::IndexCompilation { .. }
        )
    }

    /// Wrap an arbitrary error as an unclassified fault.
    pub fn unexpected<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Fault::Unexpected(Box::new(err))
    }
}

impl From<serde_json::Error> for Fault {
    fn from(err: serde_json::Error) -> Self {
        Fault::BadRequest(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_allow_list() {
        let conflict = Fault::DocumentConflict {
            doc_id: "orders/1".into(),
            largest_etag: 42,
        };
        assert!(conflict.detail_is_public());

        let compilation = Fault::IndexCompilation {
            index_definition_property: "Maps".into(),
            problematic_text: "from doc in docs select doc.Nme".into(),
            message: "unknown member".into(),
        };
        assert!(compilation.detail_is_public());

        assert!(!Fault::Internal("secret path /var/lib".into()).detail_is_public());
        assert!(!Fault::BadRequest("x".into()).detail_is_public());
    }

    #[test]
    fn test_json_error_is_bad_request() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let fault = Fault::from(err);
        assert_eq!(fault.kind_name(), "BadRequest");
    }

    #[test]
    fn test_unexpected_wraps_source() {
        let io = std::io::Error::other("disk on fire");
        let fault = Fault::unexpected(io);
        assert_eq!(fault.kind_name(), "Unexpected");
        assert_eq!(fault.to_string(), "disk on fire");
    }
}
