//! Admin surface: status, traffic watch listeners and the live stream.
//!
//! Served on its own listener, behind a bearer API key.

pub mod auth;
pub mod handlers;

use std::sync::Arc;

use axum::{extract::FromRef, middleware, routing::get, Router};

use crate::cluster::NodeInfo;
use crate::http::websocket::traffic_watch_socket;
use crate::safety::SafetyGate;
use crate::traffic_watch::TrafficWatchBus;

use self::auth::admin_auth_middleware;
use self::handlers::*;

/// State shared by admin handlers.
#[derive(Clone)]
pub struct AdminState {
    pub api_key: Arc<str>,
    pub gate: Arc<SafetyGate>,
    pub traffic_watch: Arc<TrafficWatchBus>,
    pub node: Arc<NodeInfo>,
}

impl FromRef<AdminState> for Arc<TrafficWatchBus> {
    fn from_ref(state: &AdminState) -> Self {
        state.traffic_watch.clone()
    }
}

pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/traffic-watch", get(traffic_watch_socket))
        .route("/admin/traffic-watch/listeners", get(get_listeners))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            admin_auth_middleware,
        ))
        .with_state(state)
}
