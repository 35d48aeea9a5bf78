//! `pnap_ip_block`: public IP allocations.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{TagEntry, merge_tags, tag_requests, tags_attribute};
use crate::api::PnapClient;
use crate::api::ips::{IpBlock, IpBlockCreate, IpBlockPatch};
use crate::provider::{HandlerFuture, ProviderError, ResourceHandler};
use crate::schema::{Attribute, Schema, ValueType};
use crate::state::non_empty;
use crate::wait::{StateWaiter, WaitSettings};

/// State of an IP block.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct IpBlockState {
    /// IP block identifier.
    pub id: String,
    /// Location code such as `PHX`.
    pub location: String,
    /// Prefix length such as `/31`.
    pub cidr_block_size: String,
    /// Free-form description.
    pub description: String,
    /// Tags assigned to the block.
    pub tags: Vec<TagEntry>,
    /// CIDR notation of the range.
    pub cidr: String,
    /// Assignment status.
    pub status: String,
    /// Resource the record is assigned to, if any.
    pub assigned_resource_id: String,
    /// Kind of the assigned resource.
    pub assigned_resource_type: String,
    /// Whether the resource was brought by the customer.
    pub is_bring_your_own: bool,
    /// Creation timestamp.
    pub created_on: String,
}

impl IpBlockState {
    fn flatten(block: IpBlock, configured_tags: Vec<TagEntry>) -> Self {
        Self {
            tags: merge_tags(configured_tags, &block.tags),
            id: block.id,
            location: block.location,
            cidr_block_size: block.cidr_block_size,
            description: block.description.unwrap_or_default(),
            cidr: block.cidr,
            status: block.status,
            assigned_resource_id: block.assigned_resource_id.unwrap_or_default(),
            assigned_resource_type: block.assigned_resource_type.unwrap_or_default(),
            is_bring_your_own: block.is_bring_your_own,
            created_on: block.created_on.unwrap_or_default(),
        }
    }
}

/// Waits until an IP block leaves the `assigning`/`unassigning` states.
pub(crate) async fn wait_for_ip_block(
    client: &PnapClient,
    id: &str,
    settings: WaitSettings,
) -> Result<(), ProviderError> {
    StateWaiter::new(&["unassigning", "assigning"], &["unassigned", "assigned"], settings)
        .wait(move || async move { client.get_ip_block(id).await.map(|block| block.status) })
        .await
        .map_err(ProviderError::wait(format!(
            "error waiting for ip block ({id}) to be unassigned"
        )))?;
    Ok(())
}

/// Handler for `pnap_ip_block`.
#[derive(Clone, Copy, Debug)]
pub struct IpBlockResource {
    wait: WaitSettings,
}

impl IpBlockResource {
    /// Creates the handler with the IP block assignment cadence.
    #[must_use]
    pub const fn new(wait: WaitSettings) -> Self {
        Self { wait }
    }

    async fn refresh(
        client: &PnapClient,
        id: &str,
        configured_tags: Vec<TagEntry>,
    ) -> Result<IpBlockState, ProviderError> {
        let block = client.get_ip_block(id).await?;
        Ok(IpBlockState::flatten(block, configured_tags))
    }
}

impl ResourceHandler for IpBlockResource {
    type State = IpBlockState;

    const TYPE_NAME: &'static str = "pnap_ip_block";

    fn schema(&self) -> Schema {
        Schema::new()
            .attr("location", Attribute::required(ValueType::String))
            .attr("cidr_block_size", Attribute::required(ValueType::String))
            .attr("description", Attribute::optional(ValueType::String))
            .attr("tags", tags_attribute())
            .attr("cidr", Attribute::computed(ValueType::String))
            .attr("status", Attribute::computed(ValueType::String))
            .attr("assigned_resource_id", Attribute::computed(ValueType::String))
            .attr("assigned_resource_type", Attribute::computed(ValueType::String))
            .attr("is_bring_your_own", Attribute::computed(ValueType::Bool))
            .attr("created_on", Attribute::computed(ValueType::String))
    }

    fn create<'a>(
        &'a self,
        client: &'a PnapClient,
        plan: IpBlockState,
    ) -> HandlerFuture<'a, IpBlockState> {
        Box::pin(async move {
            let request = IpBlockCreate {
                location: plan.location.clone(),
                cidr_block_size: plan.cidr_block_size.clone(),
                description: non_empty(&plan.description),
                tags: tag_requests(&plan.tags),
            };
            let created = client.create_ip_block(&request).await?;
            info!(resource = Self::TYPE_NAME, id = %created.id, "ip block allocated");
            Self::refresh(client, &created.id, plan.tags).await
        })
    }

    fn read<'a>(
        &'a self,
        client: &'a PnapClient,
        prior: IpBlockState,
    ) -> HandlerFuture<'a, IpBlockState> {
        Box::pin(async move { Self::refresh(client, &prior.id, prior.tags).await })
    }

    fn update<'a>(
        &'a self,
        client: &'a PnapClient,
        prior: IpBlockState,
        plan: IpBlockState,
    ) -> HandlerFuture<'a, IpBlockState> {
        Box::pin(async move {
            let planned_tags = tag_requests(&plan.tags);
            if plan.description != prior.description {
                let patch = IpBlockPatch {
                    description: plan.description.clone(),
                };
                client.patch_ip_block(&prior.id, &patch).await?;
            } else if planned_tags != tag_requests(&prior.tags) {
                client.set_ip_block_tags(&prior.id, &planned_tags).await?;
            } else {
                return Err(ProviderError::UnsupportedAction);
            }
            Self::refresh(client, &prior.id, plan.tags).await
        })
    }

    fn delete<'a>(&'a self, client: &'a PnapClient, prior: IpBlockState) -> HandlerFuture<'a, ()> {
        Box::pin(async move {
            wait_for_ip_block(client, &prior.id, self.wait).await?;
            client.delete_ip_block(&prior.id).await?;
            info!(resource = Self::TYPE_NAME, id = %prior.id, "ip block released");
            Ok(())
        })
    }
}
