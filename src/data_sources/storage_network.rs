//! `pnap_storage_network` data source: looks up a storage network by id or
//! name.

use serde::{Deserialize, Serialize};

use super::key_matches;
use crate::api::PnapClient;
use crate::api::storage::{StorageNetwork, Volume};
use crate::provider::{DataSourceHandler, HandlerFuture};
use crate::resources::storage_network::{PermissionsState, permissions_attribute};
use crate::schema::{Attribute, Schema, ValueType};
use crate::state::{block, find_unique};

/// Volume as exposed by the data source.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct DataVolumeState {
    /// Volume identifier.
    pub id: String,
    /// Volume name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Suffix appended to the volume path.
    pub path_suffix: String,
    /// Provisioned capacity in GB.
    pub capacity_in_gb: i64,
    /// Mount path.
    pub path: String,
    /// Access protocol.
    pub protocol: String,
    /// Volume status.
    pub status: String,
    /// Creation timestamp.
    pub created_on: String,
    /// Access permissions.
    #[serde(with = "block")]
    pub permissions: Option<PermissionsState>,
}

impl From<Volume> for DataVolumeState {
    fn from(volume: Volume) -> Self {
        Self {
            id: volume.id.unwrap_or_default(),
            name: volume.name.unwrap_or_default(),
            description: volume.description.unwrap_or_default(),
            path_suffix: volume.path_suffix.unwrap_or_default(),
            capacity_in_gb: volume.capacity_in_gb.unwrap_or_default(),
            path: volume.path.unwrap_or_default(),
            protocol: volume.protocol.unwrap_or_default(),
            status: volume.status.unwrap_or_default(),
            created_on: volume.created_on.unwrap_or_default(),
            permissions: volume.permissions.map(|permissions| PermissionsState {
                nfs: permissions.nfs.map(Into::into),
            }),
        }
    }
}

/// Storage network as exposed by the data source.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct StorageNetworkDataState {
    /// Identifier.
    pub id: String,
    /// Name.
    pub name: String,
    /// Location code such as `PHX`.
    pub location: String,
    /// Free-form description.
    pub description: String,
    /// Provisioning status.
    pub status: String,
    /// Private network backing the storage network.
    pub network_id: String,
    /// Addresses of the storage endpoints.
    pub ips: Vec<String>,
    /// Creation timestamp.
    pub created_on: String,
    /// Volumes on the storage network.
    pub volumes: Vec<DataVolumeState>,
}

impl From<StorageNetwork> for StorageNetworkDataState {
    fn from(network: StorageNetwork) -> Self {
        Self {
            id: network.id.unwrap_or_default(),
            name: network.name.unwrap_or_default(),
            location: network.location.unwrap_or_default(),
            description: network.description.unwrap_or_default(),
            status: network.status.unwrap_or_default(),
            network_id: network.network_id.unwrap_or_default(),
            ips: network.ips,
            created_on: network.created_on.unwrap_or_default(),
            volumes: network.volumes.into_iter().map(Into::into).collect(),
        }
    }
}

fn volume_schema() -> Schema {
    Schema::new()
        .attr("id", Attribute::computed(ValueType::String))
        .attr("name", Attribute::computed(ValueType::String))
        .attr("description", Attribute::computed(ValueType::String))
        .attr("path_suffix", Attribute::computed(ValueType::String))
        .attr("capacity_in_gb", Attribute::computed(ValueType::Int))
        .attr("path", Attribute::computed(ValueType::String))
        .attr("protocol", Attribute::computed(ValueType::String))
        .attr("status", Attribute::computed(ValueType::String))
        .attr("created_on", Attribute::computed(ValueType::String))
        .attr("permissions", permissions_attribute())
}

/// Handler for the `pnap_storage_network` data source.
#[derive(Clone, Copy, Debug, Default)]
pub struct StorageNetworkDataSource;

impl DataSourceHandler for StorageNetworkDataSource {
    type State = StorageNetworkDataState;

    const TYPE_NAME: &'static str = "pnap_storage_network";

    fn schema(&self) -> Schema {
        Schema::new()
            .attr(
                "id",
                Attribute::optional_computed(ValueType::String).conflicts_with(&["name"]),
            )
            .attr(
                "name",
                Attribute::optional_computed(ValueType::String).conflicts_with(&["id"]),
            )
            .attr("location", Attribute::computed(ValueType::String))
            .attr("description", Attribute::computed(ValueType::String))
            .attr("status", Attribute::computed(ValueType::String))
            .attr("network_id", Attribute::computed(ValueType::String))
            .attr("ips", Attribute::computed(ValueType::string_list()))
            .attr("created_on", Attribute::computed(ValueType::String))
            .attr("volumes", Attribute::computed(ValueType::blocks(volume_schema())))
    }

    fn read<'a>(
        &'a self,
        client: &'a PnapClient,
        config: StorageNetworkDataState,
    ) -> HandlerFuture<'a, StorageNetworkDataState> {
        Box::pin(async move {
            let networks = client.list_storage_networks().await?;
            let found = find_unique(
                networks,
                |network| {
                    network
                        .name
                        .as_deref()
                        .is_some_and(|name| key_matches(&config.name, name))
                        || network
                            .id
                            .as_deref()
                            .is_some_and(|id| key_matches(&config.id, id))
                },
                format!("storage networks with name {}", config.name),
            )?;
            Ok(found.map_or_else(
                || StorageNetworkDataState {
                    id: String::new(),
                    ..config
                },
                StorageNetworkDataState::from,
            ))
        })
    }
}
