//! Per-request context handed to the router.
//!
//! # Responsibilities
//! - Capture method, path, query, accept values and origin of a request
//! - Own the response under construction
//! - Carry the client-disconnect signal
//!
//! # Design Decisions
//! - Exclusively owned by the task dispatching the request
//! - The disconnect signal is set by a drop guard held by the connection task

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::body::Bytes;
use axum::http::{header, HeaderMap, Method, Uri};
use serde::Serialize;

use crate::faults::{Fault, FaultResult};
use crate::http::response::ResponseWriter;

/// Signal set when the client goes away before the response is written.
#[derive(Debug, Clone, Default)]
pub struct ClientAbort(Arc<AtomicBool>);

impl ClientAbort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abort(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Guard that aborts the signal when dropped, unless disarmed first.
    pub fn guard(&self) -> AbortOnDrop {
        AbortOnDrop {
            signal: self.clone(),
            armed: true,
        }
    }
}

/// Held by the connection future; dropped early when the client disconnects.
#[derive(Debug)]
pub struct AbortOnDrop {
    signal: ClientAbort,
    armed: bool,
}

impl AbortOnDrop {
    pub fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        if self.armed {
            self.signal.abort();
        }
    }
}

/// Everything the pipeline and router know about one inbound call.
#[derive(Debug)]
pub struct RequestContext {
    method: Method,
    path: String,
    query: Option<String>,
    scheme: String,
    host: String,
    headers: HeaderMap,
    body: Bytes,
    abort: ClientAbort,
    pub response: ResponseWriter,
}

impl RequestContext {
    pub fn new(method: Method, uri: &Uri, headers: HeaderMap, body: Bytes) -> Self {
        let host = uri
            .authority()
            .map(|a| a.as_str().to_string())
            .or_else(|| {
                headers
                    .get(header::HOST)
                    .and_then(|h| h.to_str().ok())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "localhost".to_string());

        Self {
            method,
            path: uri.path().to_string(),
            query: uri.query().map(str::to_string),
            scheme: uri.scheme_str().unwrap_or("http").to_string(),
            host,
            headers,
            body,
            abort: ClientAbort::new(),
            response: ResponseWriter::new(),
        }
    }

    /// Builder-style override of the request scheme (e.g. behind TLS).
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Builder-style replacement of the disconnect signal.
    pub fn with_abort(mut self, abort: ClientAbort) -> Self {
        self.abort = abort;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn abort_signal(&self) -> &ClientAbort {
        &self.abort
    }

    /// All `Accept` header values, in order.
    pub fn accept(&self) -> Vec<&str> {
        self.headers
            .get_all(header::ACCEPT)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }

    /// Path plus query string, as echoed in fault bodies.
    pub fn url(&self) -> String {
        match &self.query {
            Some(query) => format!("{}?{}", self.path, query),
            None => self.path.clone(),
        }
    }

    /// `scheme://host`.
    pub fn absolute_uri(&self) -> String {
        format!("{}://{}", self.scheme, self.host)
    }

    /// Full encoded request url.
    pub fn request_uri(&self) -> String {
        format!("{}{}", self.absolute_uri(), self.url())
    }

    /// Parse the request body as JSON.
    pub fn read_json<T: serde::de::DeserializeOwned>(&self) -> FaultResult<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Serialize `value` into the response body.
    pub fn write_json<T: Serialize>(&mut self, value: &T) -> FaultResult<()> {
        let bytes = serde_json::to_vec(value).map_err(|e| Fault::Internal(e.to_string()))?;
        self.response
            .write(&bytes)
            .map_err(|e| Fault::Internal(e.to_string()))
    }
}
