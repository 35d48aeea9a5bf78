//! Managed resource types.
//!
//! Every resource follows the same four steps: declare a schema, marshal
//! typed state into an API request, invoke one client method, and flatten
//! the response back into state.

pub mod bgp_peer_group;
pub mod ip_block;
pub mod private_network;
pub mod public_network;
pub mod rancher_cluster;
pub mod reservation;
pub mod server;
pub mod ssh_key;
pub mod storage_network;
pub mod tag;
#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};

use crate::api::tags::{TagAssignment, TagAssignmentRequest};
use crate::provider::{Provider, ProviderError, ProviderSettings};
use crate::schema::{Attribute, Schema, ValueType};
use crate::state::{block, non_empty};

pub use bgp_peer_group::BgpPeerGroupResource;
pub use ip_block::IpBlockResource;
pub use private_network::PrivateNetworkResource;
pub use public_network::PublicNetworkResource;
pub use rancher_cluster::RancherClusterResource;
pub use reservation::ReservationResource;
pub use server::ServerResource;
pub use ssh_key::SshKeyResource;
pub use storage_network::StorageNetworkResource;
pub use tag::TagResource;

/// Registers every resource type with its wait cadence.
pub fn register(provider: &mut Provider, settings: &ProviderSettings) {
    provider.register_resource(ServerResource::new(settings.server_wait));
    provider.register_resource(SshKeyResource);
    provider.register_resource(PrivateNetworkResource::new(settings.network_wait));
    provider.register_resource(PublicNetworkResource::new(
        settings.network_wait,
        settings.ip_block_wait,
    ));
    provider.register_resource(StorageNetworkResource::new(settings.provisioning_wait));
    provider.register_resource(IpBlockResource::new(settings.ip_block_wait));
    provider.register_resource(ReservationResource);
    provider.register_resource(TagResource);
    provider.register_resource(BgpPeerGroupResource);
    provider.register_resource(RancherClusterResource::new(settings.provisioning_wait));
}

/// One entry of a `tags` list.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct TagEntry {
    /// The assignment itself.
    #[serde(with = "block")]
    pub tag_assignment: Option<TagAssignmentState>,
}

/// Tag assigned to a resource.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct TagAssignmentState {
    /// Tag identifier.
    pub id: String,
    /// Tag name.
    pub name: String,
    /// Assigned value.
    pub value: String,
    /// Whether the tag drives billing reports.
    pub is_billing_tag: bool,
    /// Creator, `USER` or `SYSTEM`.
    pub created_by: String,
}

impl TagEntry {
    /// Entry naming a tag and value, as written in configuration.
    #[must_use]
    pub fn named(name: &str, value: &str) -> Self {
        Self {
            tag_assignment: Some(TagAssignmentState {
                name: name.to_owned(),
                value: value.to_owned(),
                ..TagAssignmentState::default()
            }),
        }
    }
}

/// Schema of the `tags` list shared by servers, IP blocks and volumes.
#[must_use]
pub fn tags_attribute() -> Attribute {
    let assignment = Schema::new()
        .attr("id", Attribute::computed(ValueType::String))
        .attr("name", Attribute::required(ValueType::String))
        .attr("value", Attribute::optional(ValueType::String))
        .attr("is_billing_tag", Attribute::computed(ValueType::Bool))
        .attr("created_by", Attribute::computed(ValueType::String));
    let entry = Schema::new().attr(
        "tag_assignment",
        Attribute::optional_computed(ValueType::block(assignment)),
    );
    Attribute::optional(ValueType::blocks(entry))
}

/// Converts configured entries into API assignment requests. Empty values
/// are omitted.
#[must_use]
pub fn tag_requests(entries: &[TagEntry]) -> Vec<TagAssignmentRequest> {
    entries
        .iter()
        .filter_map(|entry| entry.tag_assignment.as_ref())
        .map(|assignment| TagAssignmentRequest {
            name: assignment.name.clone(),
            value: non_empty(&assignment.value),
        })
        .collect()
}

/// Overlays assignments reported by the API onto the configured entries,
/// matching by tag name. Entries without a match keep their configured
/// values; tags absent from configuration are not imported.
#[must_use]
pub fn merge_tags(mut entries: Vec<TagEntry>, reported: &[TagAssignment]) -> Vec<TagEntry> {
    for assignment in entries
        .iter_mut()
        .filter_map(|entry| entry.tag_assignment.as_mut())
    {
        if let Some(found) = reported.iter().find(|tag| tag.name == assignment.name) {
            assignment.id.clone_from(&found.id);
            assignment.value = found.value.clone().unwrap_or_default();
            assignment.is_billing_tag = found.is_billing_tag;
            assignment.created_by = found.created_by.clone().unwrap_or_default();
        }
    }
    entries
}

/// Rejects an empty identifier returned by a create call.
pub(crate) fn require_id(id: Option<String>, subject: &str) -> Result<String, ProviderError> {
    id.filter(|value| !value.is_empty())
        .ok_or_else(|| ProviderError::invalid(format!("unknown {subject} identifier")))
}
