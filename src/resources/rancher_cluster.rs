//! `pnap_rancher_cluster`: Rancher server deployments.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::require_id;
use crate::api::PnapClient;
use crate::api::rancher::{
    Cluster, ClusterCertificates, ClusterConfiguration, ClusterMetadata, NodePool, SshConfig,
    WorkloadConfiguration,
};
use crate::provider::{HandlerFuture, ProviderError, ResourceHandler};
use crate::schema::{Attribute, Schema, ValueType};
use crate::state::{block, non_empty};
use crate::wait::{StateWaiter, WaitSettings};

const SUBJECT: &str = "cluster";

/// SSH access to the pool's nodes.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct SshConfigState {
    /// Install the account's default ssh keys.
    pub install_default_keys: bool,
    /// Ssh public keys installed on the nodes.
    pub keys: Vec<String>,
    /// Ssh key identifiers installed on the nodes.
    pub key_ids: Vec<String>,
}

/// Server behind a cluster node.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct NodeState {
    /// Server backing the node.
    pub server_id: String,
}

/// The cluster's node pool.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct NodePoolState {
    /// Pool name.
    pub name: String,
    /// Number of nodes.
    pub node_count: i64,
    /// Server type such as `s1.c1.small`.
    pub server_type: String,
    /// Ssh settings for the nodes.
    #[serde(with = "block")]
    pub ssh_config: Option<SshConfigState>,
    /// Servers in the pool.
    pub nodes: Vec<NodeState>,
}

impl NodePoolState {
    /// Overlays a reported pool onto this one.
    pub(crate) fn overlay(mut self, pool: NodePool) -> Self {
        if let Some(name) = pool.name {
            self.name = name;
        }
        if let Some(count) = pool.node_count {
            self.node_count = count;
        }
        if let Some(server_type) = pool.server_type {
            self.server_type = server_type;
        }
        self.nodes = pool
            .nodes
            .into_iter()
            .map(|node| NodeState {
                server_id: node.server_id.unwrap_or_default(),
            })
            .collect();
        self
    }

    fn request(&self) -> NodePool {
        NodePool {
            name: non_empty(&self.name),
            node_count: (self.node_count > 0).then_some(self.node_count),
            server_type: non_empty(&self.server_type),
            ssh_config: self.ssh_config.as_ref().map(|ssh| SshConfig {
                install_default_keys: ssh.install_default_keys,
                keys: ssh.keys.clone(),
                key_ids: ssh.key_ids.clone(),
            }),
            nodes: Vec::new(),
        }
    }
}

/// Custom TLS material.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct CertificatesState {
    /// CA certificate in PEM form.
    pub ca_certificate: String,
    /// Server certificate in PEM form.
    pub certificate: String,
    /// Private key of the server certificate.
    pub certificate_key: String,
}

/// Rancher server settings.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ConfigurationState {
    /// Cluster join token.
    pub token: String,
    /// Extra subject alternative name for the TLS certificate.
    pub tls_san: String,
    /// Cron schedule for etcd snapshots.
    pub etcd_snapshot_schedule_cron: String,
    /// Number of etcd snapshots kept.
    pub etcd_snapshot_retention: i64,
    /// Taint applied to server nodes.
    pub node_taint: String,
    /// Internal cluster domain.
    pub cluster_domain: String,
    /// Custom TLS certificates.
    #[serde(with = "block")]
    pub certificates: Option<CertificatesState>,
}

impl ConfigurationState {
    fn request(&self) -> ClusterConfiguration {
        let certificates = self.certificates.as_ref().and_then(|certs| {
            let request = ClusterCertificates {
                ca_certificate: non_empty(&certs.ca_certificate),
                certificate: non_empty(&certs.certificate),
                certificate_key: non_empty(&certs.certificate_key),
            };
            (request != ClusterCertificates::default()).then_some(request)
        });
        ClusterConfiguration {
            token: non_empty(&self.token),
            tls_san: non_empty(&self.tls_san),
            etcd_snapshot_schedule_cron: non_empty(&self.etcd_snapshot_schedule_cron),
            etcd_snapshot_retention: Some(self.etcd_snapshot_retention),
            node_taint: non_empty(&self.node_taint),
            cluster_domain: non_empty(&self.cluster_domain),
            certificates,
        }
    }
}

/// Workload cluster provisioned with the Rancher server.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct WorkloadConfigurationState {
    /// Workload cluster name.
    pub name: String,
    /// Number of servers.
    pub server_count: i64,
    /// Server type such as `s1.c1.small`.
    pub server_type: String,
    /// Location code such as `PHX`.
    pub location: String,
}

/// Access details, only returned by the create call.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct MetadataState {
    /// Rancher UI address.
    pub url: String,
    /// Rancher UI username.
    pub username: String,
    /// Rancher UI password.
    pub password: String,
}

impl From<ClusterMetadata> for MetadataState {
    fn from(metadata: ClusterMetadata) -> Self {
        Self {
            url: metadata.url.unwrap_or_default(),
            username: metadata.username.unwrap_or_default(),
            password: metadata.password.unwrap_or_default(),
        }
    }
}

/// State of a Rancher cluster.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct RancherClusterState {
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
    #[serde(with = "block")]
    pub node_pools: Option<NodePoolState>,
    /// Rancher server configuration.
    #[serde(with = "block")]
    pub configuration: Option<ConfigurationState>,
    /// Access details for the Rancher UI.
    #[serde(with = "block")]
    pub metadata: Option<MetadataState>,
    /// Workload cluster settings.
    #[serde(with = "block")]
    pub workload_configuration: Option<WorkloadConfigurationState>,
    /// Cluster status.
    pub status_description: String,
}

impl RancherClusterState {
    fn request(&self) -> Cluster {
        Cluster {
            name: non_empty(&self.name),
            description: non_empty(&self.description),
            location: self.location.clone(),
            node_pools: self.node_pools.iter().map(NodePoolState::request).collect(),
            configuration: self.configuration.as_ref().map(ConfigurationState::request),
            workload_configuration: self.workload_configuration.as_ref().map(|workload| {
                WorkloadConfiguration {
                    name: non_empty(&workload.name),
                    server_count: Some(workload.server_count),
                    server_type: workload.server_type.clone(),
                    location: workload.location.clone(),
                }
            }),
            ..Cluster::default()
        }
    }

    /// Refreshes the reported attributes, keeping configuration-only values.
    fn overlay(mut self, cluster: Cluster) -> Result<Self, ProviderError> {
        self.id = require_id(cluster.id, SUBJECT)?;
        if let Some(name) = cluster.name {
            self.name = name;
        }
        if let Some(description) = cluster.description {
            self.description = description;
        }
        self.location = cluster.location;
        if let Some(version) = cluster.initial_cluster_version {
            self.initial_cluster_version = version;
        }
        if let Some(pool) = cluster.node_pools.into_iter().next() {
            self.node_pools = Some(self.node_pools.take().unwrap_or_default().overlay(pool));
        }
        if let Some(status) = cluster.status_description {
            self.status_description = status;
        }
        Ok(self)
    }
}

/// Handler for `pnap_rancher_cluster`.
#[derive(Clone, Copy, Debug)]
pub struct RancherClusterResource {
    wait: WaitSettings,
}

impl RancherClusterResource {
    /// Creates the handler with the provisioning cadence.
    #[must_use]
    pub const fn new(wait: WaitSettings) -> Self {
        Self { wait }
    }

    async fn refresh(
        client: &PnapClient,
        prior: RancherClusterState,
    ) -> Result<RancherClusterState, ProviderError> {
        let cluster = client.get_cluster(&prior.id).await?;
        prior.overlay(cluster)
    }
}

impl ResourceHandler for RancherClusterResource {
    type State = RancherClusterState;

    const TYPE_NAME: &'static str = "pnap_rancher_cluster";

    fn schema(&self) -> Schema {
        let ssh_config = Schema::new()
            .attr("install_default_keys", Attribute::optional(ValueType::Bool))
            .attr("keys", Attribute::optional(ValueType::string_set()))
            .attr("key_ids", Attribute::optional(ValueType::string_set()));
        let node_pool = Schema::new()
            .attr("name", Attribute::optional(ValueType::String))
            .attr("node_count", Attribute::optional(ValueType::Int))
            .attr("server_type", Attribute::optional(ValueType::String))
            .attr("ssh_config", Attribute::optional(ValueType::block(ssh_config)))
            .attr(
                "nodes",
                Attribute::computed(ValueType::blocks(
                    Schema::new().attr("server_id", Attribute::computed(ValueType::String)),
                )),
            );
        let certificates = Schema::new()
            .attr("ca_certificate", Attribute::optional(ValueType::String))
            .attr("certificate", Attribute::optional(ValueType::String))
            .attr("certificate_key", Attribute::optional(ValueType::String));
        let configuration = Schema::new()
            .attr("token", Attribute::optional(ValueType::String).sensitive())
            .attr("tls_san", Attribute::optional(ValueType::String))
            .attr("etcd_snapshot_schedule_cron", Attribute::optional(ValueType::String))
            .attr(
                "etcd_snapshot_retention",
                Attribute::optional(ValueType::Int).default(5),
            )
            .attr("node_taint", Attribute::optional(ValueType::String))
            .attr("cluster_domain", Attribute::optional(ValueType::String))
            .attr("certificates", Attribute::optional(ValueType::block(certificates)));
        let metadata = Schema::new()
            .attr("url", Attribute::computed(ValueType::String))
            .attr("username", Attribute::computed(ValueType::String).sensitive())
            .attr("password", Attribute::computed(ValueType::String).sensitive());
        let workload = Schema::new()
            .attr("name", Attribute::optional(ValueType::String))
            .attr("server_count", Attribute::optional(ValueType::Int).default(1))
            .attr("server_type", Attribute::required(ValueType::String))
            .attr("location", Attribute::required(ValueType::String));
        Schema::new()
            .attr("name", Attribute::optional_computed(ValueType::String))
            .attr("description", Attribute::optional(ValueType::String))
            .attr("location", Attribute::required(ValueType::String))
            .attr("initial_cluster_version", Attribute::computed(ValueType::String))
            .attr("node_pools", Attribute::optional_computed(ValueType::block(node_pool)))
            .attr("configuration", Attribute::optional(ValueType::block(configuration)))
            .attr("metadata", Attribute::computed(ValueType::block(metadata)))
            .attr(
                "workload_configuration",
                Attribute::optional(ValueType::block(workload)),
            )
            .attr("status_description", Attribute::computed(ValueType::String))
    }

    fn create<'a>(
        &'a self,
        client: &'a PnapClient,
        plan: RancherClusterState,
    ) -> HandlerFuture<'a, RancherClusterState> {
        Box::pin(async move {
            let created = client.create_cluster(&plan.request()).await?;
            let id = require_id(created.id, SUBJECT)?;
            info!(resource = Self::TYPE_NAME, id = %id, "rancher cluster requested");
            let provisioned = RancherClusterState {
                id,
                metadata: created.metadata.map(Into::into),
                ..plan
            };
            let subject = provisioned.id.as_str();
            StateWaiter::new(&["Creating"], &["Ready"], self.wait)
                .with_failure(&["Error"])
                .wait(move || async move {
                    client
                        .get_cluster(subject)
                        .await
                        .map(|cluster| cluster.status_description.unwrap_or_default())
                })
                .await
                .map_err(|source| {
                    ProviderError::Wait {
                        context: format!(
                            "error waiting for cluster ({subject}) to switch to target state"
                        ),
                        source,
                    }
                    .with_state(&provisioned)
                })?;
            Self::refresh(client, provisioned.clone())
                .await
                .map_err(|err| err.with_state(&provisioned))
        })
    }

    fn read<'a>(
        &'a self,
        client: &'a PnapClient,
        prior: RancherClusterState,
    ) -> HandlerFuture<'a, RancherClusterState> {
        Box::pin(Self::refresh(client, prior))
    }

    fn update<'a>(
        &'a self,
        client: &'a PnapClient,
        prior: RancherClusterState,
        plan: RancherClusterState,
    ) -> HandlerFuture<'a, RancherClusterState> {
        Box::pin(async move {
            if plan.location != prior.location
                || plan.name != prior.name
                || plan.description != prior.description
            {
                return Err(ProviderError::UnsupportedAction);
            }
            let current = RancherClusterState {
                id: prior.id,
                metadata: prior.metadata,
                ..plan
            };
            Self::refresh(client, current).await
        })
    }

    fn delete<'a>(
        &'a self,
        client: &'a PnapClient,
        prior: RancherClusterState,
    ) -> HandlerFuture<'a, ()> {
        Box::pin(async move {
            client.delete_cluster(&prior.id).await?;
            info!(resource = Self::TYPE_NAME, id = %prior.id, "rancher cluster deleted");
            Ok(())
        })
    }
}
