//! Response construction as an explicit state machine.
//!
//! # Responsibilities
//! - Hold status, headers and body of the response being built
//! - Refuse status/header changes once headers are on the wire
//! - Convert into an axum response when the pipeline is done
//!
//! # Design Decisions
//! - Phases only move forward: NotStarted → HeadersSent → BodyStreaming → Complete
//! - Writing body implicitly sends headers
//! - Nothing is written after Complete

use axum::body::Body;
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::Response;
use thiserror::Error;

/// Lifecycle phase of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ResponsePhase {
    NotStarted,
    HeadersSent,
    BodyStreaming,
    Complete,
}

/// Misuse of the response state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ResponseError {
    #[error("response headers were already sent")]
    AlreadyStarted,

    #[error("response is already complete")]
    AlreadyComplete,
}

/// Response under construction for one request.
#[derive(Debug)]
pub struct ResponseWriter {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
    phase: ResponsePhase,
}

impl Default for ResponseWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseWriter {
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Vec::new(),
            phase: ResponsePhase::NotStarted,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn phase(&self) -> ResponsePhase {
        self.phase
    }

    /// True once headers have been sent.
    pub fn has_started(&self) -> bool {
        self.phase != ResponsePhase::NotStarted
    }

    pub fn set_status(&mut self, status: StatusCode) -> Result<(), ResponseError> {
        self.ensure_not_started()?;
        self.status = status;
        Ok(())
    }

    pub fn insert_header(
        &mut self,
        name: HeaderName,
        value: HeaderValue,
    ) -> Result<(), ResponseError> {
        self.ensure_not_started()?;
        self.headers.insert(name, value);
        Ok(())
    }

    /// Mutable header access, only while headers are unsent.
    pub fn headers_mut(&mut self) -> Result<&mut HeaderMap, ResponseError> {
        self.ensure_not_started()?;
        Ok(&mut self.headers)
    }

    /// Send headers. Idempotent until the response completes.
    pub fn start(&mut self) -> Result<(), ResponseError> {
        match self.phase {
            ResponsePhase::NotStarted => {
                self.phase = ResponsePhase::HeadersSent;
                Ok(())
            }
            ResponsePhase::HeadersSent | ResponsePhase::BodyStreaming => Ok(()),
            ResponsePhase::Complete => Err(ResponseError::AlreadyComplete),
        }
    }

    /// Append to the body, sending headers first if needed.
    pub fn write(&mut self, bytes: &[u8]) -> Result<(), ResponseError> {
        self.start()?;
        self.phase = ResponsePhase::BodyStreaming;
        self.body.extend_from_slice(bytes);
        Ok(())
    }

    /// Mark the response complete. Further writes fail.
    pub fn complete(&mut self) {
        self.phase = ResponsePhase::Complete;
    }

    fn ensure_not_started(&self) -> Result<(), ResponseError> {
        match self.phase {
            ResponsePhase::NotStarted => Ok(()),
            ResponsePhase::Complete => Err(ResponseError::AlreadyComplete),
            _ => Err(ResponseError::AlreadyStarted),
        }
    }

    pub fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}
