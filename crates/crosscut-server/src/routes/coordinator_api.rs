//! The coordinator surface: fleet creation and distributed BFS runs.

use crate::error::ApiError;
use crate::state::{AppState, Role};
use axum::extract::{Query, State};
use crosscut_distributed::types::FleetConfig;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateShardsParams {
    pub shards: u32,
    pub nodes: u32,
    /// Geometric connection radius, named `edges` on the wire.
    pub edges: f64,
    pub farnodes: u32,
}

impl CreateShardsParams {
    fn config(&self) -> FleetConfig {
        FleetConfig {
            shards: self.shards,
            nodes: self.nodes,
            edge_radius: self.edges,
            farnodes: self.farnodes,
        }
    }
}

/// `create-shards?shards&nodes&edges&farnodes` — grow an in-process
/// fleet; this instance becomes a SERVER.
pub async fn create_shards(
    State(state): State<AppState>,
    Query(params): Query<CreateShardsParams>,
) -> Result<String, ApiError> {
    state.create_local_fleet(params.config()).await
}

#[derive(Debug, Deserialize)]
pub struct CreateRemoteShardsParams {
    pub shards: u32,
    pub nodes: u32,
    pub edges: f64,
    pub farnodes: u32,
    #[serde(rename = "shards-ip")]
    pub shards_ip: String,
    #[serde(rename = "shard-ports-start-at")]
    pub shard_ports_start_at: u16,
}

/// `create-remote-shards?shards&nodes&edges&farnodes&shards-ip&shard-ports-start-at`
/// — create one shard per remote service at contiguous ports; this
/// instance becomes a MASTER-SERVER.
pub async fn create_remote_shards(
    State(state): State<AppState>,
    Query(params): Query<CreateRemoteShardsParams>,
) -> Result<String, ApiError> {
    let config = FleetConfig {
        shards: params.shards,
        nodes: params.nodes,
        edge_radius: params.edges,
        farnodes: params.farnodes,
    };
    state
        .create_remote_fleet(config, &params.shards_ip, params.shard_ports_start_at)
        .await
}

#[derive(Debug, Deserialize)]
pub struct DbfsParams {
    pub shard: u32,
    #[serde(default)]
    pub verbose: u8,
}

/// `do-dbfs?shard&verbose` — run a distributed BFS over the in-process
/// fleet, starting at the named shard's center node.
pub async fn do_dbfs(
    State(state): State<AppState>,
    Query(params): Query<DbfsParams>,
) -> Result<String, ApiError> {
    if params.verbose > 0 {
        tracing::info!(shard = params.shard, "starting DBFS on local shard fleet");
    }
    state.run_dbfs(Role::Server, params.shard).await
}

/// `do-ddbfs?shard&verbose` — the same traversal over a remote fleet.
pub async fn do_ddbfs(
    State(state): State<AppState>,
    Query(params): Query<DbfsParams>,
) -> Result<String, ApiError> {
    if params.verbose > 0 {
        tracing::info!(shard = params.shard, "starting DBFS on remote shard fleet");
    }
    state.run_dbfs(Role::MasterServer, params.shard).await
}

/// `role` — which part this process is currently playing.
pub async fn role(State(state): State<AppState>) -> String {
    state.role().await.as_str().to_string()
}

/// Liveness probe.
pub async fn health() -> &'static str {
    "crosscut shard service is up"
}
