//! Listener registry and best-effort event delivery.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};

use crate::observability::metrics;
use crate::traffic_watch::event::TrafficWatchEvent;

type Registry = DashMap<u64, ListenerEntry>;

struct ListenerEntry {
    name: String,
    database: Option<String>,
    registered_at: DateTime<Utc>,
    lagged: Arc<AtomicU64>,
}

/// Point-in-time view of a registered listener.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListenerSnapshot {
    pub id: u64,
    pub name: String,
    pub database: Option<String>,
    pub registered_at: DateTime<Utc>,
    pub lagged_events: u64,
}

/// Fan-out bus for traffic watch events.
///
/// Each listener gets its own bounded view of a broadcast channel: dispatch
/// never waits, and a listener that falls behind loses its oldest events
/// without affecting anyone else.
pub struct TrafficWatchBus {
    sender: broadcast::Sender<Arc<TrafficWatchEvent>>,
    registry: Arc<Registry>,
    next_listener_id: AtomicU64,
    request_ids: AtomicU64,
    // Serializes id allocation with send so listeners see ids in order.
    sequence: Mutex<()>,
}

impl TrafficWatchBus {
    /// Create a bus buffering up to `queue_capacity` events per listener.
    pub fn new(queue_capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(queue_capacity.max(1));
        Self {
            sender,
            registry: Arc::new(DashMap::new()),
            next_listener_id: AtomicU64::new(1),
            request_ids: AtomicU64::new(0),
            sequence: Mutex::new(()),
        }
    }

    /// Cheap check used to skip building events nobody will see.
    pub fn has_listeners(&self) -> bool {
        self.sender.receiver_count() > 0
    }

    pub fn listener_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Allocate the next request id. Ids start at 1.
    pub fn next_request_id(&self) -> u64 {
        self.request_ids.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Number of request ids issued so far, i.e. events built.
    pub fn issued_request_ids(&self) -> u64 {
        self.request_ids.load(Ordering::Relaxed)
    }

    /// Deliver an event to every currently registered listener.
    ///
    /// Returns the number of listeners the event was queued for.
    pub fn dispatch(&self, event: TrafficWatchEvent) -> usize {
        self.sender.send(Arc::new(event)).unwrap_or(0)
    }

    /// Allocate a request id, build the event for it and send it as one step.
    ///
    /// Concurrent publishers reach every listener in request-id order.
    /// Returns the number of listeners the event was queued for.
    pub fn publish<F>(&self, build: F) -> usize
    where
        F: FnOnce(u64) -> TrafficWatchEvent,
    {
        let _sequence = self
            .sequence
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let event = build(self.next_request_id());
        self.dispatch(event)
    }

    /// Register a listener receiving every event.
    pub fn register(&self, name: impl Into<String>) -> TrafficWatchListener {
        self.register_inner(name.into(), None)
    }

    /// Register a listener receiving only events for `database`.
    pub fn register_for_database(
        &self,
        name: impl Into<String>,
        database: impl Into<String>,
    ) -> TrafficWatchListener {
        self.register_inner(name.into(), Some(database.into()))
    }

    fn register_inner(&self, name: String, database: Option<String>) -> TrafficWatchListener {
        let id = self.next_listener_id.fetch_add(1, Ordering::Relaxed);
        let lagged = Arc::new(AtomicU64::new(0));
        let receiver = self.sender.subscribe();

        self.registry.insert(
            id,
            ListenerEntry {
                name: name.clone(),
                database: database.clone(),
                registered_at: Utc::now(),
                lagged: lagged.clone(),
            },
        );
        metrics::set_traffic_watch_listeners(self.registry.len());
        tracing::info!(listener_id = id, name = %name, database = ?database, "Traffic watch listener registered");

        TrafficWatchListener {
            id,
            database,
            receiver,
            lagged,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Snapshot of all registered listeners, ordered by id.
    pub fn listeners(&self) -> Vec<ListenerSnapshot> {
        let mut listeners: Vec<_> = self
            .registry
            .iter()
            .map(|entry| ListenerSnapshot {
                id: *entry.key(),
                name: entry.name.clone(),
                database: entry.database.clone(),
                registered_at: entry.registered_at,
                lagged_events: entry.lagged.load(Ordering::Relaxed),
            })
            .collect();
        listeners.sort_by_key(|l| l.id);
        listeners
    }
}

/// Registration handle. Dropping it deregisters the listener.
pub struct TrafficWatchListener {
    id: u64,
    database: Option<String>,
    receiver: broadcast::Receiver<Arc<TrafficWatchEvent>>,
    lagged: Arc<AtomicU64>,
    registry: Weak<Registry>,
}

impl TrafficWatchListener {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Events lost because this listener fell behind.
    pub fn lagged(&self) -> u64 {
        self.lagged.load(Ordering::Relaxed)
    }

    fn accepts(&self, event: &TrafficWatchEvent) -> bool {
        match &self.database {
            Some(database) => event.targets(database),
            None => true,
        }
    }

    fn record_lag(&self, skipped: u64) {
        self.lagged.fetch_add(skipped, Ordering::Relaxed);
        metrics::record_traffic_watch_lagged(skipped);
        tracing::debug!(listener_id = self.id, skipped, "Traffic watch listener lagged");
    }

    /// Wait for the next matching event. `None` once the bus is gone.
    pub async fn recv(&mut self) -> Option<Arc<TrafficWatchEvent>> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.accepts(&event) => return Some(event),
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => self.record_lag(skipped),
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Next matching event if one is already queued.
    pub fn try_recv(&mut self) -> Option<Arc<TrafficWatchEvent>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) if self.accepts(&event) => return Some(event),
                Ok(_) => continue,
                Err(TryRecvError::Lagged(skipped)) => self.record_lag(skipped),
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }

    /// Explicit deregistration; equivalent to dropping the handle.
    pub fn close(self) {}
}

impl Drop for TrafficWatchListener {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(&self.id);
            metrics::set_traffic_watch_listeners(registry.len());
        }
        tracing::info!(listener_id = self.id, "Traffic watch listener deregistered");
    }
}
