//! Rancher solution clusters.

use serde::{Deserialize, Serialize};

use super::{ApiError, ApiRequest, Method, PnapClient, Service};

/// Rancher cluster as returned by the API and accepted on create.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Cluster {
    /// Cluster identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Cluster name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Free-form description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Location code such as `PHX`.
    pub location: String,
    /// Rancher version the cluster was created with.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_cluster_version: Option<String>,
    /// Node pools of the cluster.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub node_pools: Vec<NodePool>,
    /// Rancher server configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration: Option<ClusterConfiguration>,
    /// Workload cluster settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workload_configuration: Option<WorkloadConfiguration>,
    /// Access details for the Rancher UI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ClusterMetadata>,
    /// Cluster status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_description: Option<String>,
}

/// Group of identically sized cluster nodes.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct NodePool {
    /// Pool name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Number of nodes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_count: Option<i64>,
    /// Server type such as `s1.c1.small`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_type: Option<String>,
    /// Ssh settings for the nodes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_config: Option<SshConfig>,
    /// Servers in the pool.
    #[serde(skip_serializing)]
    pub nodes: Vec<Node>,
}

/// SSH access to pool nodes.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct SshConfig {
    /// Install the account's default ssh keys.
    pub install_default_keys: bool,
    /// Ssh public keys installed on the nodes.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub keys: Vec<String>,
    /// Ssh key identifiers installed on the nodes.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub key_ids: Vec<String>,
}

/// Server backing one cluster node.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Node {
    /// Server backing the node.
    pub server_id: Option<String>,
}

/// Rancher server settings.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ClusterConfiguration {
    /// Cluster join token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Extra subject alternative name for the TLS certificate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls_san: Option<String>,
    /// Cron schedule for etcd snapshots.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etcd_snapshot_schedule_cron: Option<String>,
    /// Number of etcd snapshots kept.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etcd_snapshot_retention: Option<i64>,
    /// Taint applied to server nodes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_taint: Option<String>,
    /// Internal cluster domain.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_domain: Option<String>,
    /// Custom TLS certificates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificates: Option<ClusterCertificates>,
}

/// Custom TLS material for the Rancher server.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ClusterCertificates {
    /// CA certificate in PEM form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_certificate: Option<String>,
    /// Server certificate in PEM form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate: Option<String>,
    /// Private key of the server certificate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_key: Option<String>,
}

/// Workload cluster provisioned alongside the Rancher server.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkloadConfiguration {
    /// Workload cluster name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Number of servers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_count: Option<i64>,
    /// Server type such as `s1.c1.small`.
    pub server_type: String,
    /// Location code such as `PHX`.
    pub location: String,
}

/// Access details of the Rancher server. Credentials are only returned on
/// create.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ClusterMetadata {
    /// Rancher UI address.
    pub url: Option<String>,
    /// Rancher UI username.
    pub username: Option<String>,
    /// Rancher UI password.
    pub password: Option<String>,
}

impl PnapClient {
    /// Lists Rancher clusters.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn list_clusters(&self) -> Result<Vec<Cluster>, ApiError> {
        self.call(ApiRequest::new(Service::Rancher, Method::Get, "clusters"))
            .await
    }

    /// Fetches one cluster.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn get_cluster(&self, id: &str) -> Result<Cluster, ApiError> {
        let path = format!("clusters/{id}");
        self.call(ApiRequest::new(Service::Rancher, Method::Get, path))
            .await
    }

    /// Deploys a cluster.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn create_cluster(&self, request: &Cluster) -> Result<Cluster, ApiError> {
        let call = ApiRequest::new(Service::Rancher, Method::Post, "clusters").json(request)?;
        self.call(call).await
    }

    /// Deletes a cluster.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn delete_cluster(&self, id: &str) -> Result<(), ApiError> {
        let path = format!("clusters/{id}");
        self.call_empty(ApiRequest::new(Service::Rancher, Method::Delete, path))
            .await
    }
}
