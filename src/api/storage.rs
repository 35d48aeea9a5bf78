//! Network storage service.

use serde::{Deserialize, Serialize};

use super::tags::{TagAssignment, TagAssignmentRequest};
use super::{ApiError, ApiRequest, Method, PnapClient, Service};

/// Storage network record.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageNetwork {
    /// Identifier.
    pub id: Option<String>,
    /// Name.
    pub name: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Provisioning status.
    pub status: Option<String>,
    /// Location code such as `PHX`.
    pub location: Option<String>,
    /// Private network backing the storage network.
    pub network_id: Option<String>,
    /// Addresses of the storage endpoints.
    pub ips: Vec<String>,
    /// Creation timestamp.
    pub created_on: Option<String>,
    /// When deletion was requested.
    pub delete_requested_on: Option<String>,
    /// Volumes on the storage network.
    pub volumes: Vec<Volume>,
}

/// Volume exported by a storage network.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Volume {
    /// Volume identifier.
    pub id: Option<String>,
    /// Volume name.
    pub name: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Mount path.
    pub path: Option<String>,
    /// Suffix appended to the volume path.
    pub path_suffix: Option<String>,
    /// Provisioned capacity in GB.
    pub capacity_in_gb: Option<i64>,
    /// Capacity in use in GB.
    pub used_capacity_in_gb: Option<i64>,
    /// Access protocol.
    pub protocol: Option<String>,
    /// Volume status.
    pub status: Option<String>,
    /// Creation timestamp.
    pub created_on: Option<String>,
    /// Access permissions.
    pub permissions: Option<Permissions>,
    /// Tags assigned to the volume.
    pub tags: Vec<TagAssignment>,
}

/// Access rules of a volume.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Permissions {
    /// NFS export permissions.
    pub nfs: Option<NfsPermissions>,
}

/// NFS export rules, each a list of client addresses.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct NfsPermissions {
    /// Hosts with read-write access.
    pub read_write: Vec<String>,
    /// Hosts with read-only access.
    pub read_only: Vec<String>,
    /// Hosts whose root user is mapped to anonymous.
    pub root_squash: Vec<String>,
    /// Hosts whose root user keeps its privileges.
    pub no_squash: Vec<String>,
    /// Hosts whose users are all mapped to the anonymous user.
    pub all_squash: Vec<String>,
}

/// Body of the storage network create call.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StorageNetworkCreate {
    /// Name.
    pub name: String,
    /// Free-form description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Location code such as `PHX`.
    pub location: String,
    /// VLAN the storage network attaches to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_vlan: Option<i64>,
    /// Volumes on the storage network.
    pub volumes: Vec<VolumeCreate>,
}

/// Volume provisioned together with a storage network.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VolumeCreate {
    /// Volume name.
    pub name: String,
    /// Free-form description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Suffix appended to the volume path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path_suffix: Option<String>,
    /// Provisioned capacity in GB.
    pub capacity_in_gb: i64,
    /// Tags to assign.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<TagAssignmentRequest>,
}

/// Body of the storage network patch call.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StorageNetworkUpdate {
    /// New name.
    pub name: String,
    /// New description.
    pub description: String,
}

impl PnapClient {
    /// Lists storage networks.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn list_storage_networks(&self) -> Result<Vec<StorageNetwork>, ApiError> {
        self.call(ApiRequest::new(
            Service::NetworkStorage,
            Method::Get,
            "storage-networks",
        ))
        .await
    }

    /// Fetches one storage network.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn get_storage_network(&self, id: &str) -> Result<StorageNetwork, ApiError> {
        let path = format!("storage-networks/{id}");
        self.call(ApiRequest::new(Service::NetworkStorage, Method::Get, path))
            .await
    }

    /// Creates a storage network with its volumes.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn create_storage_network(
        &self,
        request: &StorageNetworkCreate,
    ) -> Result<StorageNetwork, ApiError> {
        let call = ApiRequest::new(Service::NetworkStorage, Method::Post, "storage-networks")
            .json(request)?;
        self.call(call).await
    }

    /// Renames or redescribes a storage network.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn update_storage_network(
        &self,
        id: &str,
        request: &StorageNetworkUpdate,
    ) -> Result<StorageNetwork, ApiError> {
        let path = format!("storage-networks/{id}");
        let call = ApiRequest::new(Service::NetworkStorage, Method::Patch, path).json(request)?;
        self.call(call).await
    }

    /// Deletes a storage network.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn delete_storage_network(&self, id: &str) -> Result<(), ApiError> {
        let path = format!("storage-networks/{id}");
        self.call_empty(ApiRequest::new(Service::NetworkStorage, Method::Delete, path))
            .await
    }
}
