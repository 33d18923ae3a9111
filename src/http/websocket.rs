//! Live traffic watch over WebSocket.
//!
//! # Responsibilities
//! - Complete the upgrade handshake for a traffic watch subscriber
//! - Register a listener on the bus for the lifetime of the socket
//! - Forward each event as one JSON text frame
//!
//! # Data Flow
//! ```text
//! DispatchPipeline → TrafficWatchBus → listener → WebSocket frames → Client
//! ```
//!
//! # Design Decisions
//! - The listener is dropped (deregistered) as soon as the socket closes
//! - Inbound frames are ignored except Close
//! - A slow client only loses its own oldest events

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use serde::Deserialize;

use crate::traffic_watch::{TrafficWatchBus, TrafficWatchListener};

/// Query parameters of the traffic watch endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct TrafficWatchParams {
    /// Only stream events addressed to this database.
    pub database: Option<String>,
}

/// Upgrade handler for `/admin/traffic-watch`.
pub async fn traffic_watch_socket(
    ws: WebSocketUpgrade,
    Query(params): Query<TrafficWatchParams>,
    State(bus): State<Arc<TrafficWatchBus>>,
) -> Response {
    ws.on_upgrade(move |socket| {
        let listener = match params.database {
            Some(database) => bus.register_for_database("websocket", database),
            None => bus.register("websocket"),
        };
        stream_events(socket, listener)
    })
}

async fn stream_events(mut socket: WebSocket, mut listener: TrafficWatchListener) {
    let id = listener.id();
    tracing::debug!(listener_id = id, "Traffic watch socket opened");

    loop {
        tokio::select! {
            event = listener.recv() => {
                let Some(event) = event else { break };
                let text = match serde_json::to_string(&*event) {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::warn!(listener_id = id, error = %e, "Failed to encode traffic watch event");
                        continue;
                    }
                };
                if socket.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
            inbound = socket.recv() => {
                match inbound {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    tracing::debug!(listener_id = id, lagged = listener.lagged(), "Traffic watch socket closed");
}
