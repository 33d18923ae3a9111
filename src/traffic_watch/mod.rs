//! Traffic watch: live fan-out of per-request telemetry.
//!
//! # Data Flow
//! ```text
//! dispatch pipeline (request completed or faulted)
//!     → bus.has_listeners()? (cheap, skips event construction when false)
//!     → TrafficWatchEvent (immutable, shared via Arc)
//!     → bus.dispatch() (non-blocking broadcast)
//!     → each TrafficWatchListener drains its own bounded queue
//! ```
//!
//! # Design Decisions
//! - Dispatch never awaits; slow listeners lose their oldest events
//! - Listeners deregister by being dropped or closed
//! - Request ids are only issued for events that are actually built

pub mod bus;
pub mod event;

pub use bus::{ListenerSnapshot, TrafficWatchBus, TrafficWatchListener};
pub use event::{TrafficWatchEvent, NOT_APPLICABLE};
