//! Node-info client against raw mock peers.

use std::time::Duration;

use docdb_frontdoor::cluster::{ClusterError, NodeInfoClient, RachisState};

mod common;

const NODE_INFO: &str = r#"{"NodeTag":"B","TopologyId":"t-1","Certificate":null,"ClusterStatus":"Ok","NumberOfCores":8,"InstalledMemoryInGb":32.0,"UsableMemoryInGb":30.5,"ServerId":"6f1c9a0e-8a59-4a52-9d6e-5d8f0b7f2c11","CurrentState":"Leader"}"#;

fn client() -> NodeInfoClient {
    NodeInfoClient::new(Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_node_info_from_peer() {
    let addr = common::start_mock_peer("200 OK", NODE_INFO).await;

    let info = client()
        .get_node_info(&format!("http://{addr}"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(info.node_tag, "B");
    assert_eq!(info.number_of_cores, 8);
    assert_eq!(info.current_state, RachisState::Leader);
    assert!(info.certificate.is_none());
}

#[tokio::test]
async fn test_empty_body_is_none() {
    let addr = common::start_mock_peer("200 OK", "").await;

    let info = client().get_node_info(&format!("http://{addr}")).await.unwrap();
    assert!(info.is_none());
}

#[tokio::test]
async fn test_error_status() {
    let addr = common::start_mock_peer("503 Service Unavailable", "{}").await;

    let err = client()
        .get_node_info(&format!("http://{addr}"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClusterError::Status { status: 503, .. }));
}

#[tokio::test]
async fn test_malformed_payload() {
    let addr = common::start_mock_peer("200 OK", "{\"NodeTag\":").await;

    let err = client()
        .get_node_info(&format!("http://{addr}"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClusterError::Decode { .. }));
}
