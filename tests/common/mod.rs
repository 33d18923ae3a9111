//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use docdb_frontdoor::config::ServerConfig;
use docdb_frontdoor::http::HttpServer;
use docdb_frontdoor::lifecycle::Shutdown;
use docdb_frontdoor::routing::RequestRouter;
use docdb_frontdoor::safety::SafetyGate;
use docdb_frontdoor::traffic_watch::TrafficWatchBus;

/// A front door listening on an ephemeral port.
#[allow(dead_code)]
pub struct TestServer {
    pub addr: SocketAddr,
    pub gate: Arc<SafetyGate>,
    pub traffic_watch: Arc<TrafficWatchBus>,
    pub reload: mpsc::UnboundedSender<ServerConfig>,
    pub shutdown: Shutdown,
}

#[allow(dead_code)]
impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Config whose safety mode is decided by `safe`.
#[allow(dead_code)]
pub fn config(safe: bool) -> ServerConfig {
    let mut config = ServerConfig::default();
    config.security.unsecured_access_validated = Some(safe);
    config.http.skip_http_logging = true;
    config
}

/// Start a front door dispatching to `router`.
#[allow(dead_code)]
pub async fn start_server(config: ServerConfig, router: Arc<dyn RequestRouter>) -> TestServer {
    let gate = Arc::new(SafetyGate::new(&config.security));
    let traffic_watch = Arc::new(TrafficWatchBus::new(config.traffic_watch.queue_capacity));
    start_shared(config, router, gate, traffic_watch).await
}

/// Start a front door around an existing gate and bus.
#[allow(dead_code)]
pub async fn start_shared(
    config: ServerConfig,
    router: Arc<dyn RequestRouter>,
    gate: Arc<SafetyGate>,
    traffic_watch: Arc<TrafficWatchBus>,
) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::with_shared(config, router, gate.clone(), traffic_watch.clone());
    let (reload, updates) = mpsc::unbounded_channel();
    let shutdown = Shutdown::new();
    let signal = shutdown.subscribe();

    tokio::spawn(async move {
        server.run(listener, updates, signal).await.unwrap();
    });

    TestServer {
        addr,
        gate,
        traffic_watch,
        reload,
        shutdown,
    }
}

/// Start a raw peer answering every request with `status` and `body`.
#[allow(dead_code)]
pub async fn start_mock_peer(status: &'static str, body: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let mut buf = [0u8; 4096];
                        let _ = socket.read(&mut buf).await;
                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Poll `check` until it holds or a second passes.
#[allow(dead_code)]
pub async fn eventually<F: Fn() -> bool>(check: F) -> bool {
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}
