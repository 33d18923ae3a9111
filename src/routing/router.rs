//! Router capability and a simple route table.
//!
//! # Responsibilities
//! - Define the `RequestRouter` seam the dispatch pipeline calls
//! - Store compiled routes and run the first match
//! - Report the resolved tenant database to the pipeline
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) scan in registration order, first match wins
//! - Explicit `RouteNotFound` fault rather than a silent default

use std::sync::Arc;

use axum::http::Method;
use futures_util::future::BoxFuture;

use crate::faults::{Fault, FaultResult};
use crate::http::request::RequestContext;
use crate::routing::matcher::RoutePattern;

/// Resolves a request to a handler and runs it.
///
/// Returns the tenant database the request addressed, or `None` for
/// cluster-wide and diagnostic endpoints.
pub trait RequestRouter: Send + Sync {
    fn handle_path<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
    ) -> BoxFuture<'a, FaultResult<Option<String>>>;
}

/// A routed endpoint.
pub trait RouteHandler: Send + Sync {
    fn call<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        database: Option<&'a str>,
    ) -> BoxFuture<'a, FaultResult<()>>;
}

struct SyncHandler<F>(F);

impl<F> RouteHandler for SyncHandler<F>
where
    F: Fn(&mut RequestContext, Option<&str>) -> FaultResult<()> + Send + Sync,
{
    fn call<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        database: Option<&'a str>,
    ) -> BoxFuture<'a, FaultResult<()>> {
        let result = (self.0)(ctx, database);
        Box::pin(async move { result })
    }
}

struct Route {
    pattern: RoutePattern,
    handler: Arc<dyn RouteHandler>,
}

/// Ordered table of routes.
#[derive(Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an async handler.
    pub fn route(
        mut self,
        method: Method,
        template: &str,
        handler: Arc<dyn RouteHandler>,
    ) -> Self {
        self.routes.push(Route {
            pattern: RoutePattern::new(method, template),
            handler,
        });
        self
    }

    /// Register a synchronous handler.
    pub fn sync_route<F>(self, method: Method, template: &str, handler: F) -> Self
    where
        F: Fn(&mut RequestContext, Option<&str>) -> FaultResult<()> + Send + Sync + 'static,
    {
        self.route(method, template, Arc::new(SyncHandler(handler)))
    }

    /// `(method, template)` of every route, in match order.
    pub fn templates(&self) -> Vec<(Method, String)> {
        self.routes
            .iter()
            .map(|r| (r.pattern.method().clone(), r.pattern.template().to_string()))
            .collect()
    }
}

impl RequestRouter for RouteTable {
    fn handle_path<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
    ) -> BoxFuture<'a, FaultResult<Option<String>>> {
        Box::pin(async move {
            let found = self.routes.iter().find_map(|route| {
                route
                    .pattern
                    .matches(ctx.method(), ctx.path())
                    .map(|m| (route, m))
            });

            let Some((route, matched)) = found else {
                return Err(Fault::RouteNotFound {
                    method: ctx.method().to_string(),
                    path: ctx.path().to_string(),
                });
            };

            tracing::trace!(template = route.pattern.template(), "Route matched");
            route.handler.call(ctx, matched.database.as_deref()).await?;
            Ok(matched.database)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;
    use axum::http::HeaderMap;

    fn ctx(method: Method, path: &str) -> RequestContext {
        RequestContext::new(method, &path.parse().unwrap(), HeaderMap::new(), Bytes::new())
    }

    fn table() -> RouteTable {
        RouteTable::new()
            .sync_route(Method::GET, "/debug/ping", |ctx, _| {
                ctx.write_json(&serde_json::json!({ "Pong": true }))
            })
            .sync_route(Method::GET, "/databases/{database}/stats", |ctx, database| {
                ctx.write_json(&serde_json::json!({ "Database": database }))
            })
            .sync_route(Method::DELETE, "/databases/{database}/docs", |_, database| {
                Err(Fault::DatabaseDisabled {
                    database: database.unwrap_or_default().to_string(),
                })
            })
    }

    #[tokio::test]
    async fn test_cluster_wide_route() {
        let table = table();
        let mut ctx = ctx(Method::GET, "/debug/ping");
        let database = table.handle_path(&mut ctx).await.unwrap();
        assert_eq!(database, None);
        assert_eq!(ctx.response.body(), b"{\"Pong\":true}");
    }

    #[tokio::test]
    async fn test_database_route() {
        let table = table();
        let mut ctx = ctx(Method::GET, "/databases/shop/stats");
        let database = table.handle_path(&mut ctx).await.unwrap();
        assert_eq!(database.as_deref(), Some("shop"));
    }

    #[tokio::test]
    async fn test_handler_fault_propagates() {
        let table = table();
        let mut ctx = ctx(Method::DELETE, "/databases/shop/docs");
        let fault = table.handle_path(&mut ctx).await.unwrap_err();
        assert!(matches!(fault, Fault::DatabaseDisabled { ref database } if database == "shop"));
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let table = table();
        let mut ctx = ctx(Method::GET, "/nope");
        let fault = table.handle_path(&mut ctx).await.unwrap_err();
        assert!(matches!(fault, Fault::RouteNotFound { .. }));
    }
}
