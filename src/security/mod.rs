//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Fault path (transport security violation):
//!     → headers.rs (re-apply CORS headers on the error response)
//! ```
//!
//! # Design Decisions
//! - Authentication itself lives outside this crate
//! - The safety gate (crate::safety) decides whether traffic is served at all

pub mod headers;
