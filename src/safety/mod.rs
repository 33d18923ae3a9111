//! Safety gate subsystem.
//!
//! # Data Flow
//! ```text
//! SecurityConfig
//!     → SafetyState (immutable snapshot)
//!     → SafetyGate (atomically swapped on reload)
//!
//! Per request:
//!     gate.admits(path)?
//!         yes → dispatch pipeline continues
//!         no  → restricted.rs answers 503 with the unsafe-mode warning
//! ```
//!
//! # Design Decisions
//! - Safe means authentication enabled or unsecured access validated
//! - Readers never observe a half-applied reload
//! - Allow-list matching is exact, no prefixes

pub mod gate;
pub mod restricted;

pub use gate::{SafetyGate, SafetyState};
pub use restricted::{is_html_acceptable, render_unsafe_page, RestrictedResponse, UNSAFE_WARNING};
