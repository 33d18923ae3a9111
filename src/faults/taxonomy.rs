//! Fault classification.
//!
//! # Responsibilities
//! - Map every fault kind to exactly one wire status code
//! - Attach response directives (cache control, security headers)
//!
//! # Design Decisions
//! - Precedence follows declaration order of `FaultClass`
//! - The match in `FaultClass::of` is exhaustive; new kinds fail to compile
//!   until they are placed in a class

use axum::http::StatusCode;

use super::Fault;

/// Cache directive attached to answers about resources that moved away.
pub const NO_CACHE_DIRECTIVE: &str = "must-revalidate, no-cache";

/// Wire-level fault class, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultClass {
    TransportSecurity,
    ResourceExhaustion,
    WriteConflict,
    DatabaseUnavailable,
    MalformedRequest,
    AccessDenied,
    DeadlineExceeded,
    LicenseLimit,
    NoLongerRelevant,
    Unclassified,
}

impl FaultClass {
    /// Resolve the class of a fault.
    pub fn of(fault: &Fault) -> Self {
        match fault {
            Fault::InsufficientTransportLayerProtection(_) => FaultClass::TransportSecurity,

            Fault::LowMemory(_) | Fault::OutOfMemory | Fault::StorageUnrecoverable(_) => {
                FaultClass::ResourceExhaustion
            }

            Fault::DocumentConflict { .. } | Fault::Conflict(_) | Fault::Concurrency(_) => {
                FaultClass::WriteConflict
            }

            Fault::DatabaseDisabled { .. }
            | Fault::DatabaseLoadFailure { .. }
            | Fault::DatabaseLoadTimeout { .. }
            | Fault::DatabaseConcurrentLoadTimeout { .. }
            | Fault::NodeIsPassive => FaultClass::DatabaseUnavailable,

            Fault::BadRequest(_) | Fault::RouteNotFound { .. } => FaultClass::MalformedRequest,

            Fault::Unauthorized(_) => FaultClass::AccessDenied,

            Fault::Timeout(_) => FaultClass::DeadlineExceeded,

            Fault::LicenseLimit(_) => FaultClass::LicenseLimit,

            Fault::DatabaseNotRelevant { .. } => FaultClass::NoLongerRelevant,

            Fault::IndexCompilation { .. } | Fault::Internal(_) | Fault::Unexpected(_) => {
                FaultClass::Unclassified
            }
        }
    }

    pub fn status(self) -> StatusCode {
        match self {
            FaultClass::TransportSecurity => StatusCode::BAD_REQUEST,
            FaultClass::ResourceExhaustion => StatusCode::SERVICE_UNAVAILABLE,
            FaultClass::WriteConflict => StatusCode::CONFLICT,
            FaultClass::DatabaseUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            FaultClass::MalformedRequest => StatusCode::BAD_REQUEST,
            FaultClass::AccessDenied => StatusCode::FORBIDDEN,
            FaultClass::DeadlineExceeded => StatusCode::REQUEST_TIMEOUT,
            FaultClass::LicenseLimit => StatusCode::PAYMENT_REQUIRED,
            FaultClass::NoLongerRelevant => StatusCode::GONE,
            FaultClass::Unclassified => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing summary used instead of raw fault text.
    pub fn summary(self) -> &'static str {
        match self {
            FaultClass::TransportSecurity => "This endpoint requires a secured transport",
            FaultClass::ResourceExhaustion => "The server is low on resources, retry later",
            FaultClass::WriteConflict => "The write conflicts with the current state",
            FaultClass::DatabaseUnavailable => "The requested database is currently unavailable",
            FaultClass::MalformedRequest => "The request is malformed or has no matching route",
            FaultClass::AccessDenied => "Access to the requested resource is denied",
            FaultClass::DeadlineExceeded => "The operation did not complete in time",
            FaultClass::LicenseLimit => "A license limit was reached",
            FaultClass::NoLongerRelevant => "The requested database is no longer hosted on this node",
            FaultClass::Unclassified => "An internal server error occurred",
        }
    }

    /// Label used for metrics and log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            FaultClass::TransportSecurity => "transport_security",
            FaultClass::ResourceExhaustion => "resource_exhaustion",
            FaultClass::WriteConflict => "write_conflict",
            FaultClass::DatabaseUnavailable => "database_unavailable",
            FaultClass::MalformedRequest => "malformed_request",
            FaultClass::AccessDenied => "access_denied",
            FaultClass::DeadlineExceeded => "deadline_exceeded",
            FaultClass::LicenseLimit => "license_limit",
            FaultClass::NoLongerRelevant => "no_longer_relevant",
            FaultClass::Unclassified => "unclassified",
        }
    }
}

/// Outcome of classifying a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub class: FaultClass,
    pub status: StatusCode,
    /// `Cache-Control` value the response must carry, if any.
    pub cache_control: Option<&'static str>,
    /// Security headers must be re-applied on the error response.
    pub reapply_security_headers: bool,
}

/// Classify a fault into its wire status and response directives.
pub fn classify(fault: &Fault) -> Classification {
    let class = FaultClass::of(fault);
    Classification {
        class,
        status: class.status(),
        cache_control: (class == FaultClass::NoLongerRelevant).then_some(NO_CACHE_DIRECTIVE),
        reapply_security_headers: class == FaultClass::TransportSecurity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(fault: Fault) -> u16 {
        classify(&fault).status.as_u16()
    }

    #[test]
    fn test_transport_security() {
        let c = classify(&Fault::InsufficientTransportLayerProtection("use https".into()));
        assert_eq!(c.status, StatusCode::BAD_REQUEST);
        assert!(c.reapply_security_headers);
        assert!(c.cache_control.is_none());
    }

    #[test]
    fn test_resource_exhaustion() {
        assert_eq!(status_of(Fault::LowMemory("commit limit".into())), 503);
        assert_eq!(status_of(Fault::OutOfMemory), 503);
        assert_eq!(status_of(Fault::StorageUnrecoverable("bad page".into())), 503);
    }

    #[test]
    fn test_write_conflicts() {
        assert_eq!(
            status_of(Fault::DocumentConflict {
                doc_id: "orders/1".into(),
                largest_etag: 42,
            }),
            409
        );
        assert_eq!(status_of(Fault::Conflict("cmpxchg".into())), 409);
        assert_eq!(status_of(Fault::Concurrency("etag mismatch".into())), 409);
    }

    #[test]
    fn test_database_unavailable() {
        let db = || "northwind".to_string();
        assert_eq!(status_of(Fault::DatabaseDisabled { database: db() }), 503);
        assert_eq!(
            status_of(Fault::DatabaseLoadFailure {
                database: db(),
                reason: "corrupt journal".into(),
            }),
            503
        );
        assert_eq!(status_of(Fault::DatabaseLoadTimeout { database: db() }), 503);
        assert_eq!(
            status_of(Fault::DatabaseConcurrentLoadTimeout { database: db() }),
            503
        );
        assert_eq!(status_of(Fault::NodeIsPassive), 503);
    }

    #[test]
    fn test_client_side_classes() {
        assert_eq!(status_of(Fault::BadRequest("missing id".into())), 400);
        assert_eq!(
            status_of(Fault::RouteNotFound {
                method: "GET".into(),
                path: "/nope".into(),
            }),
            400
        );
        assert_eq!(status_of(Fault::Unauthorized("no cert".into())), 403);
        assert_eq!(status_of(Fault::Timeout("query".into())), 408);
        assert_eq!(status_of(Fault::LicenseLimit("cores".into())), 402);
    }

    #[test]
    fn test_not_relevant_is_gone_and_uncacheable() {
        let c = classify(&Fault::DatabaseNotRelevant {
            database: "northwind".into(),
        });
        assert_eq!(c.status, StatusCode::GONE);
        assert_eq!(c.cache_control, Some("must-revalidate, no-cache"));
        assert!(!c.reapply_security_headers);
    }

    #[test]
    fn test_fallback_is_internal_error() {
        assert_eq!(status_of(Fault::Internal("boom".into())), 500);
        assert_eq!(
            status_of(Fault::unexpected(std::io::Error::other("boom"))),
            500
        );
        assert_eq!(
            status_of(Fault::IndexCompilation {
                index_definition_property: "Maps".into(),
                problematic_text: "select".into(),
                message: "syntax".into(),
            }),
            500
        );
    }
}
