//! The dispatch pipeline wrapped around every request.
//!
//! # Responsibilities
//! - Gate requests on the server's safety mode
//! - Run the router and time it
//! - Convert faults into classified, sanitized responses
//! - Publish one traffic watch event per request when anyone listens
//!
//! # Design Decisions
//! - Never returns an error: every fault becomes a response
//! - Holds no lock across a request
//! - Telemetry is published before the disconnect check so aborted
//!   requests stay observable
//! - The request deadline and router panics are enforced here, so they get
//!   the same classified body and event as any other fault

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::{header, HeaderValue, StatusCode};
use chrono::Utc;
use futures_util::FutureExt;

use crate::faults::{ClassifiedFault, Fault, FaultClass};
use crate::http::request::RequestContext;
use crate::observability::metrics;
use crate::routing::RequestRouter;
use crate::safety::{RestrictedResponse, SafetyGate};
use crate::security::headers::apply_cors_headers;
use crate::traffic_watch::{TrafficWatchBus, TrafficWatchEvent, NOT_APPLICABLE};

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Pipeline switches taken from configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineOptions {
    /// Suppress the per-request log line.
    pub skip_http_logging: bool,
    /// Echo raw fault text of every kind to clients.
    pub expose_fault_details: bool,
    /// Deadline for the router. `None` lets handlers run unbounded.
    pub request_timeout: Option<Duration>,
}

/// How a request left the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The router ran to completion.
    Completed { database: Option<String> },
    /// Refused by the safety gate.
    Restricted,
    /// A fault was classified and written.
    Faulted { class: FaultClass, status: StatusCode },
    /// A fault occurred after the client went away; nothing was written.
    Abandoned { class: FaultClass },
}

/// Front door shared by all request tasks.
pub struct DispatchPipeline {
    router: Arc<dyn RequestRouter>,
    gate: Arc<SafetyGate>,
    traffic_watch: Arc<TrafficWatchBus>,
    options: PipelineOptions,
}

impl DispatchPipeline {
    pub fn new(
        router: Arc<dyn RequestRouter>,
        gate: Arc<SafetyGate>,
        traffic_watch: Arc<TrafficWatchBus>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            router,
            gate,
            traffic_watch,
            options,
        }
    }

    pub fn traffic_watch(&self) -> &Arc<TrafficWatchBus> {
        &self.traffic_watch
    }

    /// Handle one request end to end.
    pub async fn handle(&self, ctx: &mut RequestContext) -> DispatchOutcome {
        Self::prepare(ctx);
        let started = Instant::now();

        if !self.gate.snapshot().admits(ctx.path()) {
            self.write_restricted(ctx);
            self.publish(ctx, ctx.response.status(), started.elapsed(), None);
            metrics::record_request(ctx.method().as_str(), ctx.response.status().as_u16(), started);
            return DispatchOutcome::Restricted;
        }

        match self.route(ctx).await {
            Ok(database) => {
                let elapsed = started.elapsed();
                let status = ctx.response.status();

                if !self.options.skip_http_logging {
                    tracing::info!(
                        method = %ctx.method(),
                        url = %ctx.url(),
                        status = status.as_u16(),
                        elapsed_ms = elapsed.as_millis() as u64,
                        "Request completed"
                    );
                }
                metrics::record_request(ctx.method().as_str(), status.as_u16(), started);

                self.publish(ctx, status, elapsed, database.as_deref());
                ctx.response.complete();
                DispatchOutcome::Completed { database }
            }
            Err(fault) => self.handle_fault(ctx, fault, started),
        }
    }

    /// Run the router under the request deadline, turning a panic into a fault.
    async fn route(&self, ctx: &mut RequestContext) -> Result<Option<String>, Fault> {
        let routed = AssertUnwindSafe(async { self.router.handle_path(ctx).await }).catch_unwind();

        let result = match self.options.request_timeout {
            Some(limit) => match tokio::time::timeout(limit, routed).await {
                Ok(result) => result,
                Err(_) => {
                    return Err(Fault::Timeout(format!(
                        "request exceeded {} ms",
                        limit.as_millis()
                    )))
                }
            },
            None => routed.await,
        };

        result.unwrap_or_else(|panic| Err(Fault::Internal(panic_message(panic.as_ref()))))
    }

    /// Fail a request before it reaches the router, e.g. on an unreadable body.
    pub fn fail(&self, ctx: &mut RequestContext, fault: Fault) -> DispatchOutcome {
        Self::prepare(ctx);
        self.handle_fault(ctx, fault, Instant::now())
    }

    fn prepare(ctx: &mut RequestContext) {
        let _ = ctx.response.set_status(StatusCode::OK);
        let _ = ctx.response.insert_header(
            header::CONTENT_TYPE,
            HeaderValue::from_static(JSON_CONTENT_TYPE),
        );
    }

    fn handle_fault(
        &self,
        ctx: &mut RequestContext,
        fault: Fault,
        started: Instant,
    ) -> DispatchOutcome {
        let classified = ClassifiedFault::new(&fault, ctx.url(), self.options.expose_fault_details);
        let class = classified.classification.class;

        let status = if ctx.response.has_started() {
            ctx.response.status()
        } else {
            classified.status()
        };

        if status.is_server_error() {
            tracing::error!(
                method = %ctx.method(),
                url = %ctx.url(),
                status = status.as_u16(),
                class = class.as_str(),
                fault = ?fault,
                "Request failed: {fault}"
            );
        } else {
            tracing::warn!(
                method = %ctx.method(),
                url = %ctx.url(),
                status = status.as_u16(),
                class = class.as_str(),
                fault = ?fault,
                "Request failed: {fault}"
            );
        }
        metrics::record_fault(class.as_str());
        metrics::record_request(ctx.method().as_str(), status.as_u16(), started);

        self.publish(ctx, status, Duration::ZERO, None);

        if ctx.abort_signal().is_aborted() {
            tracing::debug!(url = %ctx.url(), class = class.as_str(), "Client gone, fault not written");
            return DispatchOutcome::Abandoned { class };
        }

        if !ctx.response.has_started() {
            let directives = classified.classification;
            let _ = ctx.response.set_status(directives.status);
            if let Some(cache_control) = directives.cache_control {
                let _ = ctx
                    .response
                    .insert_header(header::CACHE_CONTROL, HeaderValue::from_static(cache_control));
            }
            if directives.reapply_security_headers {
                let request_headers = ctx.headers().clone();
                if let Ok(headers) = ctx.response.headers_mut() {
                    apply_cors_headers(&request_headers, headers);
                }
            }
        }

        if let Err(e) = ctx.response.write(&classified.to_json()) {
            tracing::warn!(error = %e, url = %ctx.url(), "Could not write fault body");
        }
        ctx.response.complete();

        DispatchOutcome::Faulted { class, status }
    }

    fn write_restricted(&self, ctx: &mut RequestContext) {
        let restricted = RestrictedResponse::negotiate(&ctx.accept());

        let _ = ctx.response.set_status(StatusCode::SERVICE_UNAVAILABLE);
        let _ = ctx.response.insert_header(
            header::CONTENT_TYPE,
            HeaderValue::from_static(restricted.content_type),
        );
        let _ = ctx.response.write(&restricted.body);
        ctx.response.complete();

        metrics::record_unsafe_rejection();
        tracing::debug!(path = %ctx.path(), "Request refused, server is running unsafe");
    }

    /// Build and dispatch a traffic watch event if anyone listens.
    fn publish(
        &self,
        ctx: &RequestContext,
        status: StatusCode,
        elapsed: Duration,
        database: Option<&str>,
    ) {
        if !self.traffic_watch.has_listeners() {
            return;
        }

        self.traffic_watch.publish(|request_id| TrafficWatchEvent {
            timestamp: Utc::now(),
            request_id,
            http_method: ctx.method().to_string(),
            elapsed_milliseconds: elapsed.as_millis() as u64,
            response_status_code: status.as_u16(),
            request_uri: ctx.request_uri(),
            absolute_uri: ctx.absolute_uri(),
            database_name: database.unwrap_or(NOT_APPLICABLE).to_string(),
            custom_info: String::new(),
            inner_requests_count: 0,
            query_timings: None,
        });
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    let detail = panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string payload");
    format!("handler panicked: {detail}")
}
