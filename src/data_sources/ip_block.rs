//! `pnap_ip_block` data source: looks up an IP block by id or CIDR.

use serde::{Deserialize, Serialize};

use super::{DataTagState, data_tags_attribute, key_matches};
use crate::api::PnapClient;
use crate::api::ips::IpBlock;
use crate::provider::{DataSourceHandler, HandlerFuture};
use crate::schema::{Attribute, Schema, ValueType};
use crate::state::find_unique;

/// IP block as exposed by the data source.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct IpBlockDataState {
    /// IP block identifier.
    pub id: String,
    /// CIDR notation of the range.
    pub cidr: String,
    /// Location code such as `PHX`.
    pub location: String,
    /// Prefix length such as `/31`.
    pub cidr_block_size: String,
    /// IP version (`V4` or `V6`).
    pub ip_version: String,
    /// Assignment status.
    pub status: String,
    /// Resource the record is assigned to, if any.
    pub assigned_resource_id: String,
    /// Kind of the assigned resource.
    pub assigned_resource_type: String,
    /// Free-form description.
    pub description: String,
    /// Tags assigned to the block.
    pub tags: Vec<DataTagState>,
    /// Whether the resource was brought by the customer.
    pub is_bring_your_own: bool,
    /// Creation timestamp.
    pub created_on: String,
}

impl From<IpBlock> for IpBlockDataState {
    fn from(block: IpBlock) -> Self {
        Self {
            id: block.id,
            cidr: block.cidr,
            location: block.location,
            cidr_block_size: block.cidr_block_size,
            ip_version: block.ip_version.unwrap_or_default(),
            status: block.status,
            assigned_resource_id: block.assigned_resource_id.unwrap_or_default(),
            assigned_resource_type: block.assigned_resource_type.unwrap_or_default(),
            description: block.description.unwrap_or_default(),
            tags: block.tags.into_iter().map(Into::into).collect(),
            is_bring_your_own: block.is_bring_your_own,
            created_on: block.created_on.unwrap_or_default(),
        }
    }
}

/// Handler for the `pnap_ip_block` data source.
#[derive(Clone, Copy, Debug, Default)]
pub struct IpBlockDataSource;

impl DataSourceHandler for IpBlockDataSource {
    type State = IpBlockDataState;

    const TYPE_NAME: &'static str = "pnap_ip_block";

    fn schema(&self) -> Schema {
        Schema::new()
            .attr(
                "id",
                Attribute::optional_computed(ValueType::String).conflicts_with(&["cidr"]),
            )
            .attr(
                "cidr",
                Attribute::optional_computed(ValueType::String).conflicts_with(&["id"]),
            )
            .attr("location", Attribute::computed(ValueType::String))
            .attr("cidr_block_size", Attribute::computed(ValueType::String))
            .attr("ip_version", Attribute::computed(ValueType::String))
            .attr("status", Attribute::computed(ValueType::String))
            .attr("assigned_resource_id", Attribute::computed(ValueType::String))
            .attr("assigned_resource_type", Attribute::computed(ValueType::String))
            .attr("description", Attribute::computed(ValueType::String))
            .attr("tags", data_tags_attribute())
            .attr("is_bring_your_own", Attribute::computed(ValueType::Bool))
            .attr("created_on", Attribute::computed(ValueType::String))
    }

    fn read<'a>(
        &'a self,
        client: &'a PnapClient,
        config: IpBlockDataState,
    ) -> HandlerFuture<'a, IpBlockDataState> {
        Box::pin(async move {
            let subject = if config.cidr.is_empty() {
                format!("IP Blocks with ID {}", config.id)
            } else {
                format!("IP Blocks with CIDR {}", config.cidr)
            };
            let blocks = client.list_ip_blocks().await?;
            let found = find_unique(
                blocks,
                |block| {
                    key_matches(&config.cidr, &block.cidr) || key_matches(&config.id, &block.id)
                },
                subject,
            )?;
            Ok(found.map_or_else(
                || IpBlockDataState {
                    id: String::new(),
                    ..config
                },
                IpBlockDataState::from,
            ))
        })
    }
}
