//! Cluster-facing read-only commands.
//!
//! # Responsibilities
//! - Describe this node's identity (`NodeInfo`)
//! - Query a peer's identity over HTTP (`NodeInfoClient`)
//!
//! # Design Decisions
//! - Node info is never cached; every query hits the peer
//! - No retries here; membership logic owns retry and backoff

pub mod client;
pub mod node_info;

pub use client::{ClusterError, NodeInfoClient};
pub use node_info::{NodeInfo, RachisState};
