//! Node identity snapshot exchanged between cluster members.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::NodeConfig;

/// Cluster membership state of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RachisState {
    Passive,
    Candidate,
    Follower,
    Leader,
}

/// Read-only snapshot of a node's identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NodeInfo {
    pub node_tag: String,
    pub topology_id: String,
    /// Certificate thumbprint, absent on unsecured nodes.
    pub certificate: Option<String>,
    pub cluster_status: String,
    pub number_of_cores: u32,
    pub installed_memory_in_gb: f64,
    pub usable_memory_in_gb: f64,
    pub server_id: Uuid,
    pub current_state: RachisState,
}

impl NodeInfo {
    /// Describe the local node from its configuration.
    pub fn local(config: &NodeConfig, server_id: Uuid) -> Self {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get() as u32)
            .unwrap_or(1);

        Self {
            node_tag: config.node_tag.clone(),
            topology_id: config.topology_id.clone(),
            certificate: config.certificate_thumbprint.clone(),
            cluster_status: config.cluster_status.clone(),
            number_of_cores: cores,
            installed_memory_in_gb: config.installed_memory_gb,
            usable_memory_in_gb: config.usable_memory_gb,
            server_id,
            current_state: config.current_state,
        }
    }
}
