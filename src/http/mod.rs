//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, fallback handler)
//!     → request.rs (RequestContext, client-abort signal)
//!     → dispatch.rs (safety gate, router, fault classification, telemetry)
//!     → response.rs (status/header/body state machine)
//!     → Send to client
//!
//! Admin listener
//!     → websocket.rs (live traffic watch stream)
//! ```

pub mod dispatch;
pub mod request;
pub mod response;
pub mod server;
pub mod websocket;

pub use dispatch::{DispatchOutcome, DispatchPipeline, PipelineOptions};
pub use request::{ClientAbort, RequestContext};
pub use response::{ResponseError, ResponsePhase, ResponseWriter};
pub use server::HttpServer;
