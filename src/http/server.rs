//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router; every request falls through to the dispatch pipeline
//! - Wire up middleware (tracing, request ID, compression)
//! - Bind the server to a listener and serve until shutdown
//! - Apply configuration reloads to the safety gate

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::faults::Fault;
use crate::http::dispatch::{DispatchPipeline, PipelineOptions};
use crate::http::request::{ClientAbort, RequestContext};
use crate::routing::RequestRouter;
use crate::safety::SafetyGate;
use crate::traffic_watch::TrafficWatchBus;

/// Largest request body buffered for the router.
pub const MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<DispatchPipeline>,
}

/// HTTP server for the database front door.
pub struct HttpServer {
    router: Router,
    gate: Arc<SafetyGate>,
    traffic_watch: Arc<TrafficWatchBus>,
}

impl HttpServer {
    /// Create a new HTTP server dispatching to `router`.
    pub fn new(config: ServerConfig, router: Arc<dyn RequestRouter>) -> Self {
        let gate = Arc::new(SafetyGate::new(&config.security));
        let traffic_watch = Arc::new(TrafficWatchBus::new(config.traffic_watch.queue_capacity));
        Self::with_shared(config, router, gate, traffic_watch)
    }

    /// Create a server around an existing gate and bus, e.g. shared with
    /// the admin listener.
    pub fn with_shared(
        config: ServerConfig,
        router: Arc<dyn RequestRouter>,
        gate: Arc<SafetyGate>,
        traffic_watch: Arc<TrafficWatchBus>,
    ) -> Self {
        let options = PipelineOptions {
            skip_http_logging: config.http.skip_http_logging,
            expose_fault_details: config.debug.expose_fault_details,
            request_timeout: Some(Duration::from_secs(config.http.request_timeout_secs)),
        };
        let pipeline = Arc::new(DispatchPipeline::new(
            router,
            gate.clone(),
            traffic_watch.clone(),
            options,
        ));

        let router = Self::build_router(&config, AppState { pipeline });
        Self {
            router,
            gate,
            traffic_watch,
        }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// There is no timeout layer: the pipeline enforces the request deadline
    /// so a late request still gets a classified 408 and a matching event.
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        let mut router = Router::new().fallback(dispatch_handler).with_state(state);

        if config.http.use_response_compression {
            router = router.layer(CompressionLayer::new());
        }

        router.layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
    }

    pub fn gate(&self) -> &Arc<SafetyGate> {
        &self.gate
    }

    pub fn traffic_watch(&self) -> &Arc<TrafficWatchBus> {
        &self.traffic_watch
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Reloaded configurations received on `config_updates` re-derive the
    /// safety mode. Returns once `shutdown` fires and in-flight requests
    /// have drained.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<ServerConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, safe = self.gate.is_safe(), "HTTP server starting");

        let gate = self.gate.clone();
        let reloader = tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                gate.reload(&config.security);
                tracing::info!("Configuration reloaded");
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        reloader.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Fallback handler: every request goes through the dispatch pipeline.
///
/// The pipeline runs on its own task. If the client disconnects, this
/// future is dropped and the abort guard flags the request as abandoned.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();

    let abort = ClientAbort::new();
    let guard = abort.guard();

    let body = axum::body::to_bytes(body, MAX_BODY_BYTES).await;
    let mut ctx = RequestContext::new(
        parts.method,
        &parts.uri,
        parts.headers,
        body.as_ref().cloned().unwrap_or_default(),
    )
    .with_abort(abort);

    let pipeline = state.pipeline.clone();
    let task = tokio::spawn(async move {
        match body {
            Ok(_) => {
                pipeline.handle(&mut ctx).await;
            }
            Err(e) => {
                pipeline.fail(&mut ctx, Fault::BadRequest(format!("unreadable request body: {e}")));
            }
        }
        ctx
    });

    let result = task.await;
    guard.disarm();

    match result {
        Ok(ctx) => ctx.response.into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Dispatch task failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
