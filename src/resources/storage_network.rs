//! `pnap_storage_network`: NFS storage networks and their volumes.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{TagEntry, merge_tags, require_id, tag_requests, tags_attribute};
use crate::api::PnapClient;
use crate::api::storage::{
    NfsPermissions, StorageNetwork, StorageNetworkCreate, StorageNetworkUpdate, Volume,
    VolumeCreate,
};
use crate::provider::{HandlerFuture, ProviderError, ResourceHandler};
use crate::schema::{Attribute, Schema, ValueType};
use crate::state::{block, non_empty};
use crate::wait::{StateWaiter, WaitSettings};

const SUBJECT: &str = "storage network";

/// NFS export rules of a volume.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct NfsState {
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

impl From<NfsPermissions> for NfsState {
    fn from(nfs: NfsPermissions) -> Self {
        Self {
            read_write: nfs.read_write,
            read_only: nfs.read_only,
            root_squash: nfs.root_squash,
            no_squash: nfs.no_squash,
            all_squash: nfs.all_squash,
        }
    }
}

/// Access rules of a volume.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct PermissionsState {
    /// NFS export permissions.
    #[serde(with = "block")]
    pub nfs: Option<NfsState>,
}

/// Volume exported by the network.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct VolumeState {
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
    /// Capacity in use in GB.
    pub used_capacity_in_gb: i64,
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
    /// Tags assigned to the volume.
    pub tags: Vec<TagEntry>,
}

impl VolumeState {
    /// Flattens a reported volume, overlaying its tags onto `configured`.
    pub(crate) fn flatten(volume: Volume, configured: Vec<TagEntry>) -> Self {
        Self {
            tags: merge_tags(configured, &volume.tags),
            id: volume.id.unwrap_or_default(),
            name: volume.name.unwrap_or_default(),
            description: volume.description.unwrap_or_default(),
            path_suffix: volume.path_suffix.unwrap_or_default(),
            capacity_in_gb: volume.capacity_in_gb.unwrap_or_default(),
            used_capacity_in_gb: volume.used_capacity_in_gb.unwrap_or_default(),
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

/// One entry of `volumes`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct VolumeEntry {
    /// Storage volume.
    #[serde(with = "block")]
    pub volume: Option<VolumeState>,
}

/// Schema of `permissions`, shared with the storage network data source.
pub(crate) fn permissions_attribute() -> Attribute {
    let nfs = Schema::new()
        .attr("read_write", Attribute::computed(ValueType::string_list()))
        .attr("read_only", Attribute::computed(ValueType::string_list()))
        .attr("root_squash", Attribute::computed(ValueType::string_list()))
        .attr("no_squash", Attribute::computed(ValueType::string_list()))
        .attr("all_squash", Attribute::computed(ValueType::string_list()));
    Attribute::computed(ValueType::block(
        Schema::new().attr("nfs", Attribute::computed(ValueType::block(nfs))),
    ))
}

fn volume_schema() -> Schema {
    Schema::new()
        .attr("id", Attribute::computed(ValueType::String))
        .attr("name", Attribute::required(ValueType::String))
        .attr("description", Attribute::optional(ValueType::String))
        .attr("path_suffix", Attribute::optional_computed(ValueType::String))
        .attr("capacity_in_gb", Attribute::required(ValueType::Int))
        .attr("used_capacity_in_gb", Attribute::computed(ValueType::Int))
        .attr("path", Attribute::computed(ValueType::String))
        .attr("protocol", Attribute::computed(ValueType::String))
        .attr("status", Attribute::computed(ValueType::String))
        .attr("created_on", Attribute::computed(ValueType::String))
        .attr("permissions", permissions_attribute())
        .attr("tags", tags_attribute())
}

/// Pairs reported volumes with configured ones by name so configured tags
/// survive the refresh.
fn merge_volumes(configured: Vec<VolumeEntry>, reported: Vec<Volume>) -> Vec<VolumeEntry> {
    let mut remaining: Vec<VolumeState> = configured
        .into_iter()
        .filter_map(|entry| entry.volume)
        .collect();
    reported
        .into_iter()
        .map(|volume| {
            let name = volume.name.clone().unwrap_or_default();
            let tags = remaining
                .iter()
                .position(|candidate| candidate.name == name)
                .map(|index| remaining.swap_remove(index).tags)
                .unwrap_or_default();
            VolumeEntry {
                volume: Some(VolumeState::flatten(volume, tags)),
            }
        })
        .collect()
}

fn volume_request(volume: &VolumeState) -> VolumeCreate {
    VolumeCreate {
        name: volume.name.clone(),
        description: non_empty(&volume.description),
        path_suffix: non_empty(&volume.path_suffix),
        capacity_in_gb: volume.capacity_in_gb,
        tags: tag_requests(&volume.tags),
    }
}

/// State of a storage network.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct StorageNetworkState {
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
    /// VLAN the storage network attaches to.
    pub client_vlan: Option<i64>,
    /// Volumes on the storage network.
    pub volumes: Vec<VolumeEntry>,
}

impl StorageNetworkState {
    fn flatten(
        network: StorageNetwork,
        configured: Vec<VolumeEntry>,
        client_vlan: Option<i64>,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            id: require_id(network.id, SUBJECT)?,
            name: network.name.unwrap_or_default(),
            location: network.location.unwrap_or_default(),
            description: network.description.unwrap_or_default(),
            status: network.status.unwrap_or_default(),
            network_id: network.network_id.unwrap_or_default(),
            ips: network.ips,
            created_on: network.created_on.unwrap_or_default(),
            client_vlan,
            volumes: merge_volumes(configured, network.volumes),
        })
    }
}

/// Handler for `pnap_storage_network`.
#[derive(Clone, Copy, Debug)]
pub struct StorageNetworkResource {
    wait: WaitSettings,
}

impl StorageNetworkResource {
    /// Creates the handler with the provisioning cadence.
    #[must_use]
    pub const fn new(wait: WaitSettings) -> Self {
        Self { wait }
    }

    async fn refresh(
        client: &PnapClient,
        id: &str,
        configured: Vec<VolumeEntry>,
        client_vlan: Option<i64>,
    ) -> Result<StorageNetworkState, ProviderError> {
        let network = client.get_storage_network(id).await?;
        StorageNetworkState::flatten(network, configured, client_vlan)
    }
}

impl ResourceHandler for StorageNetworkResource {
    type State = StorageNetworkState;

    const TYPE_NAME: &'static str = "pnap_storage_network";

    fn schema(&self) -> Schema {
        let entry = Schema::new().attr(
            "volume",
            Attribute::required(ValueType::block(volume_schema())),
        );
        Schema::new()
            .attr("name", Attribute::required(ValueType::String))
            .attr("location", Attribute::required(ValueType::String))
            .attr("description", Attribute::optional(ValueType::String))
            .attr("status", Attribute::computed(ValueType::String))
            .attr("network_id", Attribute::computed(ValueType::String))
            .attr("ips", Attribute::computed(ValueType::string_list()))
            .attr("created_on", Attribute::computed(ValueType::String))
            .attr("client_vlan", Attribute::optional(ValueType::Int))
            .attr("volumes", Attribute::required(ValueType::blocks(entry)))
    }

    fn create<'a>(
        &'a self,
        client: &'a PnapClient,
        plan: StorageNetworkState,
    ) -> HandlerFuture<'a, StorageNetworkState> {
        Box::pin(async move {
            let request = StorageNetworkCreate {
                name: plan.name.clone(),
                description: non_empty(&plan.description),
                location: plan.location.clone(),
                client_vlan: plan.client_vlan,
                volumes: plan
                    .volumes
                    .iter()
                    .filter_map(|entry| entry.volume.as_ref())
                    .map(volume_request)
                    .collect(),
            };
            let created = client.create_storage_network(&request).await?;
            let id = require_id(created.id, SUBJECT)?;
            info!(resource = Self::TYPE_NAME, id = %id, "storage network requested");
            let requested = StorageNetworkState { id, ..plan };
            let subject = requested.id.as_str();
            StateWaiter::new(&["BUSY"], &["READY"], self.wait)
                .wait(move || async move {
                    client
                        .get_storage_network(subject)
                        .await
                        .map(|network| network.status.unwrap_or_default())
                })
                .await
                .map_err(|source| {
                    ProviderError::Wait {
                        context: format!(
                            "error waiting for storage network ({subject}) to switch to target state"
                        ),
                        source,
                    }
                    .with_state(&requested)
                })?;
            Self::refresh(
                client,
                subject,
                requested.volumes.clone(),
                requested.client_vlan,
            )
            .await
            .map_err(|err| err.with_state(&requested))
        })
    }

    fn read<'a>(
        &'a self,
        client: &'a PnapClient,
        prior: StorageNetworkState,
    ) -> HandlerFuture<'a, StorageNetworkState> {
        Box::pin(async move {
            Self::refresh(client, &prior.id, prior.volumes, prior.client_vlan).await
        })
    }

    fn update<'a>(
        &'a self,
        client: &'a PnapClient,
        prior: StorageNetworkState,
        plan: StorageNetworkState,
    ) -> HandlerFuture<'a, StorageNetworkState> {
        Box::pin(async move {
            if plan.name == prior.name && plan.description == prior.description {
                return Err(ProviderError::UnsupportedAction);
            }
            let request = StorageNetworkUpdate {
                name: plan.name,
                description: plan.description,
            };
            client.update_storage_network(&prior.id, &request).await?;
            Self::refresh(client, &prior.id, plan.volumes, plan.client_vlan).await
        })
    }

    fn delete<'a>(
        &'a self,
        client: &'a PnapClient,
        prior: StorageNetworkState,
    ) -> HandlerFuture<'a, ()> {
        Box::pin(async move {
            client.delete_storage_network(&prior.id).await?;
            info!(resource = Self::TYPE_NAME, id = %prior.id, "storage network deleted");
            Ok(())
        })
    }
}
