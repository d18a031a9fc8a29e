//! HTTP routes: the shard contract and the coordinator surface.

mod coordinator_api;
mod shard_api;

use crate::state::AppState;
use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the service router. Every operation is a GET with query-string
/// arguments, which is the contract remote proxies speak.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Shard-facing contract
        .route("/create-graph-shard", get(shard_api::create_graph_shard))
        .route("/nodes", get(shard_api::nodes))
        .route("/edges", get(shard_api::edges))
        .route(
            "/most-distant-internal-nodes",
            get(shard_api::most_distant_internal_nodes),
        )
        .route("/add-edge-external", get(shard_api::add_edge_external))
        .route(
            "/bfs-trees-with-remote-nodes",
            get(shard_api::bfs_trees_with_remote_nodes),
        )
        .route(
            "/bfs-trees-with-remote-nodes-from-center-node",
            get(shard_api::bfs_from_center_node),
        )
        // Coordinator surface
        .route("/create-shards", get(coordinator_api::create_shards))
        .route(
            "/create-remote-shards",
            get(coordinator_api::create_remote_shards),
        )
        .route("/do-dbfs", get(coordinator_api::do_dbfs))
        .route("/do-ddbfs", get(coordinator_api::do_ddbfs))
        .route("/role", get(coordinator_api::role))
        .route("/health", get(coordinator_api::health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
