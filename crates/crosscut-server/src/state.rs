//! Service state: the process role and whatever fleet it is holding.
//!
//! The process plays one of three parts depending on which creation
//! endpoint was hit last: a CLIENT hosting a single shard, a SERVER
//! running an in-process fleet, or a MASTER-SERVER coordinating remote
//! shard services. Switching roles rebuilds the state wholesale; a failed
//! creation leaves the previous role untouched. Nothing survives a
//! restart.

use crate::error::ApiError;
use crosscut_core::{GraphShard, NodeId, ShardId};
use crosscut_distributed::fleet::{as_fleet, grow_local_fleet, grow_remote_fleet};
use crosscut_distributed::proxy::Fleet;
use crosscut_distributed::types::{DistributedError, FleetConfig};
use crosscut_distributed::DbfsCoordinator;
use std::sync::Arc;
use tokio::sync::RwLock;

/// What this process is currently acting as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Undecided,
    Client,
    Server,
    MasterServer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Undecided => "Undecided",
            Role::Client => "CLIENT",
            Role::Server => "SERVER",
            Role::MasterServer => "MASTER-SERVER",
        }
    }
}

struct ServiceState {
    role: Role,
    /// Shards hosted in this process (one as CLIENT, the whole fleet as
    /// SERVER, none as MASTER-SERVER).
    shards: Vec<Arc<RwLock<GraphShard>>>,
    /// Proxies the coordinator drives; empty until a fleet is created.
    fleet: Fleet,
    /// Shape of the last created fleet, for visit totals in summaries.
    config: Option<FleetConfig>,
}

/// Shared handle to the service state.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<RwLock<ServiceState>>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(ServiceState {
                role: Role::Undecided,
                shards: Vec::new(),
                fleet: Vec::new(),
                config: None,
            })),
        }
    }

    pub async fn role(&self) -> Role {
        self.inner.read().await.role
    }

    /// Host a single fresh shard and become a CLIENT.
    ///
    /// Returns the new shard's edge count and center node, the pair the
    /// creation endpoint reports.
    pub async fn create_client_shard(
        &self,
        id: u32,
        nodes: u32,
        edge_radius: f64,
    ) -> (usize, NodeId) {
        let shard = GraphShard::grow(ShardId::new(id), nodes, edge_radius);
        let edge_count = shard.edge_count();
        let center = shard.center_node().0;

        let mut state = self.inner.write().await;
        if state.role != Role::Client {
            tracing::info!("this instance is now a CLIENT instance");
        }
        state.role = Role::Client;
        state.shards = vec![Arc::new(RwLock::new(shard))];
        state.fleet = Vec::new();
        state.config = None;
        (edge_count, center)
    }

    /// Look up a hosted shard by id.
    pub async fn hosted_shard(&self, id: u32) -> Result<Arc<RwLock<GraphShard>>, ApiError> {
        let state = self.inner.read().await;
        Self::shard_at(&state, id)
    }

    /// Look up a hosted shard for mutation or traversal, which only a
    /// CLIENT serves.
    ///
    /// A SERVER's shards are wired into a fleet and driven through the
    /// coordinator alone; letting raw `add-edge-external` or BFS calls at
    /// them would mutate or traverse a fleet that is supposed to be
    /// immutable after wiring.
    pub async fn client_shard(&self, id: u32) -> Result<Arc<RwLock<GraphShard>>, ApiError> {
        let state = self.inner.read().await;
        if !state.shards.is_empty() && state.role != Role::Client {
            return Err(DistributedError::NotReady(
                "this instance is not a CLIENT instance".to_string(),
            )
            .into());
        }
        Self::shard_at(&state, id)
    }

    fn shard_at(state: &ServiceState, id: u32) -> Result<Arc<RwLock<GraphShard>>, ApiError> {
        if state.shards.is_empty() {
            return Err(DistributedError::NotReady(
                "graph shard not yet created".to_string(),
            )
            .into());
        }
        state
            .shards
            .get(id as usize)
            .cloned()
            .ok_or_else(|| DistributedError::ShardNotFound(ShardId::new(id)).into())
    }

    /// Grow an in-process fleet and become a SERVER.
    pub async fn create_local_fleet(&self, config: FleetConfig) -> Result<String, ApiError> {
        let proxies = grow_local_fleet(&config).await?;
        let shards = proxies.iter().map(|p| p.shard()).collect();
        let fleet = as_fleet(&proxies);

        let mut state = self.inner.write().await;
        if state.role != Role::Server {
            tracing::info!("this instance is now a SERVER instance");
        }
        state.role = Role::Server;
        state.shards = shards;
        state.fleet = fleet;
        state.config = Some(config);
        Ok(format!(
            "Created {} local toroidal shards of {} nodes each, joined by {} mirror-edge pairs per neighbor pair.",
            config.shards,
            config.nodes,
            config.farnodes / 2
        ))
    }

    /// Create a fleet of remote shards at contiguous ports and become a
    /// MASTER-SERVER.
    pub async fn create_remote_fleet(
        &self,
        config: FleetConfig,
        host: &str,
        ports_start: u16,
    ) -> Result<String, ApiError> {
        let proxies = grow_remote_fleet(&config, host, ports_start).await?;
        let fleet = as_fleet(&proxies);

        let mut state = self.inner.write().await;
        if state.role != Role::MasterServer {
            tracing::info!("this instance is now a MASTER-SERVER instance");
        }
        state.role = Role::MasterServer;
        state.shards = Vec::new();
        state.fleet = fleet;
        state.config = Some(config);
        Ok(format!(
            "Created {} remote toroidal shards of {} nodes each at {}, ports [{}, {}].",
            config.shards,
            config.nodes,
            host,
            ports_start,
            u32::from(ports_start) + config.shards - 1
        ))
    }

    /// Run a distributed BFS, provided the process is in the expected
    /// role.
    ///
    /// The fleet handle is cloned out before the traversal so the state
    /// lock is never held across shard calls.
    pub async fn run_dbfs(&self, required: Role, begin: u32) -> Result<String, ApiError> {
        let (fleet, total_nodes) = {
            let state = self.inner.read().await;
            if state.role != required {
                return Err(DistributedError::NotReady(format!(
                    "this instance is not a {} instance; create the fleet first",
                    required.as_str()
                ))
                .into());
            }
            let total = state
                .config
                .map(|c| u64::from(c.shards) * u64::from(c.nodes))
                .unwrap_or(0);
            (state.fleet.clone(), total)
        };

        let coordinator = DbfsCoordinator::new(fleet);
        let report = coordinator.run(ShardId::new(begin)).await?;
        Ok(format!(
            "DBFS from {} complete. {}",
            ShardId::new(begin),
            report.summary(total_nodes)
        ))
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_initial_role_is_undecided() {
        let state = AppState::new();
        assert_eq!(state.role().await, Role::Undecided);
        assert!(state.hosted_shard(0).await.is_err());
    }

    #[tokio::test]
    async fn test_client_shard_creation_switches_role() {
        let state = AppState::new();
        let (edges, _center) = state.create_client_shard(0, 50, 0.2).await;
        assert_eq!(state.role().await, Role::Client);
        assert!(state.hosted_shard(0).await.is_ok());
        assert!(state.hosted_shard(1).await.is_err());

        let shard = state.hosted_shard(0).await.unwrap();
        assert_eq!(shard.read().await.edge_count(), edges);
    }

    #[tokio::test]
    async fn test_local_fleet_switches_role_and_hosts_shards() {
        let state = AppState::new();
        let config = FleetConfig {
            shards: 4,
            nodes: 30,
            edge_radius: 0.3,
            farnodes: 4,
        };
        state.create_local_fleet(config).await.unwrap();
        assert_eq!(state.role().await, Role::Server);
        assert!(state.hosted_shard(3).await.is_ok());

        let summary = state.run_dbfs(Role::Server, 0).await.unwrap();
        assert!(summary.contains("Total cross cuts:"));
    }

    #[tokio::test]
    async fn test_failed_creation_keeps_prior_role() {
        let state = AppState::new();
        let bad = FleetConfig {
            shards: 3,
            ..Default::default()
        };
        assert!(state.create_local_fleet(bad).await.is_err());
        assert_eq!(state.role().await, Role::Undecided);

        // Same from an established role.
        state.create_client_shard(0, 20, 0.2).await;
        assert!(state.create_local_fleet(bad).await.is_err());
        assert_eq!(state.role().await, Role::Client);
        assert!(state.hosted_shard(0).await.is_ok());
    }

    #[tokio::test]
    async fn test_client_shard_requires_client_role() {
        let state = AppState::new();

        // Nothing hosted at all: the not-created message, not a role one.
        let err = state.client_shard(0).await.unwrap_err();
        assert!(err.message().contains("not yet created"));

        // A SERVER hosts shards, but only for reads; mutation and
        // traversal are refused.
        let config = FleetConfig {
            shards: 4,
            nodes: 30,
            edge_radius: 0.3,
            farnodes: 4,
        };
        state.create_local_fleet(config).await.unwrap();
        assert!(state.hosted_shard(0).await.is_ok());
        let err = state.client_shard(0).await.unwrap_err();
        assert!(err.message().contains("not a CLIENT"));

        // A CLIENT serves both.
        state.create_client_shard(0, 20, 0.2).await;
        assert!(state.client_shard(0).await.is_ok());
    }

    #[tokio::test]
    async fn test_dbfs_requires_matching_role() {
        let state = AppState::new();
        let err = state.run_dbfs(Role::MasterServer, 0).await.unwrap_err();
        assert!(err.message().contains("MASTER-SERVER"));

        state.create_client_shard(0, 20, 0.2).await;
        assert!(state.run_dbfs(Role::Server, 0).await.is_err());
    }

    #[tokio::test]
    async fn test_switching_roles_resets_fleet() {
        let state = AppState::new();
        let config = FleetConfig {
            shards: 4,
            nodes: 30,
            edge_radius: 0.3,
            farnodes: 4,
        };
        state.create_local_fleet(config).await.unwrap();
        state.create_client_shard(0, 20, 0.2).await;

        // Back to CLIENT: one hosted shard, no fleet to traverse.
        assert_eq!(state.role().await, Role::Client);
        assert!(state.hosted_shard(1).await.is_err());
        assert!(state.run_dbfs(Role::Server, 0).await.is_err());
    }
}
