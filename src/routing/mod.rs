//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! RequestContext (method, path)
//!     → router.rs (RequestRouter::handle_path)
//!     → matcher.rs (evaluate route templates)
//!     → handler runs, writes into the context's response
//!     → Return: resolved database name, or a Fault
//!
//! Route compilation (at startup):
//!     builtin.rs + embedder routes
//!     → RouteTable (immutable)
//! ```
//!
//! # Design Decisions
//! - The pipeline only knows the `RequestRouter` trait; any router can be plugged in
//! - Deterministic: same input always matches same route
//! - First match wins (registration order)

pub mod builtin;
pub mod matcher;
pub mod router;

pub use builtin::builtin_routes;
pub use matcher::{RouteMatch, RoutePattern};
pub use router::{RequestRouter, RouteHandler, RouteTable};
