//! Request front door for a document database server.

pub mod admin;
pub mod cluster;
pub mod config;
pub mod faults;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod safety;
pub mod security;
pub mod traffic_watch;

pub use config::schema::ServerConfig;
pub use faults::{Fault, FaultResult};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
