//! `pnap_rancher_cluster` data source.
//!
//! With a name the cluster list is searched (narrowed by id when both are
//! given); with only an id the cluster is fetched directly.

use serde::{Deserialize, Serialize};

use crate::api::PnapClient;
use crate::api::rancher::{Cluster, NodePool};
use crate::provider::{DataSourceHandler, HandlerFuture, ProviderError};
use crate::resources::rancher_cluster::NodeState;
use crate::schema::{Attribute, Schema, ValueType};
use crate::state::{block, find_unique};

/// Node pool as exposed by the data source.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct DataNodePoolState {
    /// Pool name.
    pub name: String,
    /// Number of nodes.
    pub node_count: i64,
    /// Server type such as `s1.c1.small`.
    pub server_type: String,
    /// Servers in the pool.
    pub nodes: Vec<NodeState>,
}

impl From<NodePool> for DataNodePoolState {
    fn from(pool: NodePool) -> Self {
        Self {
            name: pool.name.unwrap_or_default(),
            node_count: pool.node_count.unwrap_or_default(),
            server_type: pool.server_type.unwrap_or_default(),
            nodes: pool
                .nodes
                .into_iter()
                .map(|node| NodeState {
                    server_id: node.server_id.unwrap_or_default(),
                })
                .collect(),
        }
    }
}

/// Public part of the cluster metadata; credentials are never re-read.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct DataMetadataState {
    /// Rancher UI address.
    pub url: String,
}

/// Rancher cluster as exposed by the data source.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct RancherClusterDataState {
    /// Cluster identifier.
    pub id: String,
    /// Cluster name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Location code such as `PHX`.
    pub location: String,
    /// Rancher version the cluster was created with.
    pub initial_cluster_version: String,
    /// Node pools of the cluster.
    pub node_pools: Vec<DataNodePoolState>,
    /// Access details for the Rancher UI.
    #[serde(with = "block")]
    pub metadata: Option<DataMetadataState>,
    /// Cluster status.
    pub status_description: String,
}

impl From<Cluster> for RancherClusterDataState {
    fn from(cluster: Cluster) -> Self {
        Self {
            id: cluster.id.unwrap_or_default(),
            name: cluster.name.unwrap_or_default(),
            description: cluster.description.unwrap_or_default(),
            location: cluster.location,
            initial_cluster_version: cluster.initial_cluster_version.unwrap_or_default(),
            node_pools: cluster.node_pools.into_iter().map(Into::into).collect(),
            metadata: cluster.metadata.map(|metadata| DataMetadataState {
                url: metadata.url.unwrap_or_default(),
            }),
            status_description: cluster.status_description.unwrap_or_default(),
        }
    }
}

/// Handler for the `pnap_rancher_cluster` data source.
#[derive(Clone, Copy, Debug, Default)]
pub struct RancherClusterDataSource;

impl RancherClusterDataSource {
    async fn search(
        client: &PnapClient,
        config: RancherClusterDataState,
    ) -> Result<RancherClusterDataState, ProviderError> {
        let subject = if config.id.is_empty() {
            format!("clusters with name {}", config.name)
        } else {
            format!("clusters with id {} and name {}", config.id, config.name)
        };
        let clusters = client.list_clusters().await?;
        let found = find_unique(
            clusters,
            |cluster| {
                cluster.name.as_deref() == Some(config.name.as_str())
                    && (config.id.is_empty() || cluster.id.as_deref() == Some(config.id.as_str()))
            },
            subject,
        )?;
        Ok(found.map_or_else(
            || RancherClusterDataState {
                id: String::new(),
                ..config
            },
            RancherClusterDataState::from,
        ))
    }
}

impl DataSourceHandler for RancherClusterDataSource {
    type State = RancherClusterDataState;

    const TYPE_NAME: &'static str = "pnap_rancher_cluster";

    fn schema(&self) -> Schema {
        let node = Schema::new().attr("server_id", Attribute::computed(ValueType::String));
        let node_pool = Schema::new()
            .attr("name", Attribute::computed(ValueType::String))
            .attr("node_count", Attribute::computed(ValueType::Int))
            .attr("server_type", Attribute::computed(ValueType::String))
            .attr("nodes", Attribute::computed(ValueType::blocks(node)));
        let metadata = Schema::new().attr("url", Attribute::computed(ValueType::String));
        Schema::new()
            .attr("id", Attribute::optional_computed(ValueType::String))
            .attr("name", Attribute::optional_computed(ValueType::String))
            .attr("description", Attribute::computed(ValueType::String))
            .attr("location", Attribute::computed(ValueType::String))
            .attr("initial_cluster_version", Attribute::computed(ValueType::String))
            .attr("node_pools", Attribute::computed(ValueType::blocks(node_pool)))
            .attr("metadata", Attribute::computed(ValueType::block(metadata)))
            .attr("status_description", Attribute::computed(ValueType::String))
    }

    fn read<'a>(
        &'a self,
        client: &'a PnapClient,
        config: RancherClusterDataState,
    ) -> HandlerFuture<'a, RancherClusterDataState> {
        Box::pin(async move {
            if !config.name.is_empty() {
                return Self::search(client, config).await;
            }
            if config.id.is_empty() {
                return Ok(config);
            }
            let cluster = client.get_cluster(&config.id).await?;
            if cluster.id.as_deref().is_none_or(str::is_empty) {
                return Err(ProviderError::invalid("unknown cluster identifier"));
            }
            Ok(cluster.into())
        })
    }
}
