//! HTTP client for `GET /cluster/node-info`.

use std::time::Duration;

use reqwest::Client;
use thiserror::Error;

use crate::cluster::node_info::NodeInfo;

/// Errors from querying a cluster peer.
#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("invalid peer url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("peer {url} answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("peer {url} returned an invalid node info payload: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Read-only node-info command against cluster peers.
#[derive(Clone)]
pub struct NodeInfoClient {
    client: Client,
}

impl NodeInfoClient {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Build the node-info url for a peer base url.
    pub fn endpoint(peer_url: &str) -> Result<url::Url, ClusterError> {
        let base = peer_url.trim_end_matches('/');
        url::Url::parse(&format!("{base}/cluster/node-info")).map_err(|source| {
            ClusterError::InvalidUrl {
                url: peer_url.to_string(),
                source,
            }
        })
    }

    /// Query a peer. An empty response body yields `Ok(None)`.
    pub async fn get_node_info(&self, peer_url: &str) -> Result<Option<NodeInfo>, ClusterError> {
        let url = Self::endpoint(peer_url)?;
        let url_text = url.to_string();

        tracing::debug!(url = %url_text, "Querying node info");

        let response = self
            .client
            .get(url)
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(|source| ClusterError::Transport {
                url: url_text.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClusterError::Status {
                url: url_text,
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| ClusterError::Transport {
                url: url_text.clone(),
                source,
            })?;

        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }

        serde_json::from_slice(&body)
            .map(Some)
            .map_err(|source| ClusterError::Decode {
                url: url_text,
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint() {
        let url = NodeInfoClient::endpoint("http://10.0.0.2:8080/").unwrap();
        assert_eq!(url.as_str(), "http://10.0.0.2:8080/cluster/node-info");

        assert!(matches!(
            NodeInfoClient::endpoint("not a url"),
            Err(ClusterError::InvalidUrl { .. })
        ));
    }
}
