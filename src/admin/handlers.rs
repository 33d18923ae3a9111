use axum::{extract::State, Json};
use serde::Serialize;
use uuid::Uuid;

use super::AdminState;
use crate::cluster::RachisState;
use crate::traffic_watch::ListenerSnapshot;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub safe: bool,
    pub node_tag: String,
    pub server_id: Uuid,
    pub current_state: RachisState,
    pub traffic_watch_listeners: usize,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        safe: state.gate.is_safe(),
        node_tag: state.node.node_tag.clone(),
        server_id: state.node.server_id,
        current_state: state.node.current_state,
        traffic_watch_listeners: state.traffic_watch.listener_count(),
    })
}

pub async fn get_listeners(State(state): State<AdminState>) -> Json<Vec<ListenerSnapshot>> {
    Json(state.traffic_watch.listeners())
}
