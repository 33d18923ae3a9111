//! Route pattern matching.
//!
//! # Responsibilities
//! - Parse route templates such as `/databases/{database}/stats`
//! - Match method and path segments
//! - Capture the tenant database name
//!
//! # Design Decisions
//! - Method matching is exact
//! - Path matching is case-sensitive, segment by segment
//! - Trailing slashes are ignored
//! - No regex to guarantee O(n) matching

use axum::http::Method;

/// One segment of a route template.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Database,
}

/// Result of a successful match.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RouteMatch {
    /// Captured `{database}` segment, if the template has one.
    pub database: Option<String>,
}

/// A compiled `(method, template)` pair.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    method: Method,
    template: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    /// Compile a template. `{database}` captures a tenant database name.
    pub fn new(method: Method, template: impl Into<String>) -> Self {
        let template = template.into();
        let segments = split(&template)
            .map(|s| match s {
                "{database}" => Segment::Database,
                literal => Segment::Literal(literal.to_string()),
            })
            .collect();

        Self {
            method,
            template,
            segments,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn matches(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        if method != self.method {
            return None;
        }

        let mut captured = RouteMatch::default();
        let mut parts = split(path);

        for segment in &self.segments {
            let part = parts.next()?;
            match segment {
                Segment::Literal(expected) if expected == part => {}
                Segment::Literal(_) => return None,
                Segment::Database if part.is_empty() => return None,
                Segment::Database => captured.database = Some(part.to_string()),
            }
        }

        if parts.next().is_some() {
            return None;
        }
        Some(captured)
    }
}

fn split(path: &str) -> impl Iterator<Item = &str> {
    path.trim_matches('/').split('/').filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_route() {
        let pattern = RoutePattern::new(Method::GET, "/debug/server-id");
        assert_eq!(
            pattern.matches(&Method::GET, "/debug/server-id"),
            Some(RouteMatch::default())
        );
        assert!(pattern.matches(&Method::GET, "/debug/server-id/").is_some());
        assert!(pattern.matches(&Method::POST, "/debug/server-id").is_none());
        assert!(pattern.matches(&Method::GET, "/debug").is_none());
        assert!(pattern.matches(&Method::GET, "/debug/server-id/x").is_none());
        assert!(pattern.matches(&Method::GET, "/DEBUG/server-id").is_none());
    }

    #[test]
    fn test_database_capture() {
        let pattern = RoutePattern::new(Method::GET, "/databases/{database}/stats");
        let matched = pattern.matches(&Method::GET, "/databases/shop/stats").unwrap();
        assert_eq!(matched.database.as_deref(), Some("shop"));

        assert!(pattern.matches(&Method::GET, "/databases//stats").is_none());
        assert!(pattern.matches(&Method::GET, "/databases/shop").is_none());
    }

    #[test]
    fn test_root() {
        let pattern = RoutePattern::new(Method::GET, "/");
        assert!(pattern.matches(&Method::GET, "/").is_some());
        assert!(pattern.matches(&Method::GET, "/x").is_none());
    }
}
