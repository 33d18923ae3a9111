//! Endpoints every node serves regardless of tenant databases.

use axum::http::Method;
use serde::Serialize;
use uuid::Uuid;

use crate::cluster::NodeInfo;
use crate::routing::router::RouteTable;

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ServerIdBody {
    server_id: Uuid,
}

/// Route table with the diagnostic and cluster endpoints of this node.
pub fn builtin_routes(node: NodeInfo) -> RouteTable {
    let server_id = node.server_id;

    RouteTable::new()
        .sync_route(Method::GET, "/debug/server-id", move |ctx, _| {
            ctx.write_json(&ServerIdBody { server_id })
        })
        .sync_route(Method::GET, "/cluster/node-info", move |ctx, _| {
            ctx.write_json(&node)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NodeConfig;
    use crate::routing::RequestRouter;
    use crate::http::request::RequestContext;
    use axum::body::Bytes;
    use axum::http::HeaderMap;

    #[tokio::test]
    async fn test_server_id_and_node_info() {
        let id = Uuid::new_v4();
        let table = builtin_routes(NodeInfo::local(&NodeConfig::default(), id));

        let mut ctx = RequestContext::new(
            Method::GET,
            &"/debug/server-id".parse().unwrap(),
            HeaderMap::new(),
            Bytes::new(),
        );
        assert_eq!(table.handle_path(&mut ctx).await.unwrap(), None);
        let body: serde_json::Value = serde_json::from_slice(ctx.response.body()).unwrap();
        assert_eq!(body["ServerId"], id.to_string());

        let mut ctx = RequestContext::new(
            Method::GET,
            &"/cluster/node-info".parse().unwrap(),
            HeaderMap::new(),
            Bytes::new(),
        );
        table.handle_path(&mut ctx).await.unwrap();
        let info: NodeInfo = serde_json::from_slice(ctx.response.body()).unwrap();
        assert_eq!(info.server_id, id);
        assert_eq!(info.node_tag, "A");
    }
}
