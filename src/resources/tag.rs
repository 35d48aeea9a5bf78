//! `pnap_tag`: tag definitions managed through the tag manager.

use serde::{Deserialize, Serialize};

use crate::api::PnapClient;
use crate::api::tags::{Tag, TagWrite};
use crate::provider::{HandlerFuture, ProviderError, ResourceHandler};
use crate::schema::{Attribute, Schema, ValueType};
use crate::state::non_empty;

/// Resource carrying the tag.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ResourceAssignmentState {
    /// Resource carrying the tag.
    pub resource_name: String,
    /// Value assigned on that resource.
    pub value: String,
}

/// State of a tag definition.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct TagState {
    /// Tag identifier.
    pub id: String,
    /// Tag name.
    pub name: String,
    /// Values in use across resources.
    pub values: Vec<String>,
    /// Tag description.
    pub description: String,
    /// Whether the tag appears on invoices.
    pub is_billing_tag: bool,
    /// Resources carrying the tag.
    pub resource_assignments: Vec<ResourceAssignmentState>,
    /// Who created the record.
    pub created_by: String,
}

impl From<Tag> for TagState {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
            values: tag.values,
            description: tag.description.unwrap_or_default(),
            is_billing_tag: tag.is_billing_tag,
            resource_assignments: tag
                .resource_assignments
                .into_iter()
                .map(|assignment| ResourceAssignmentState {
                    resource_name: assignment.resource_name,
                    value: assignment.value.unwrap_or_default(),
                })
                .collect(),
            created_by: tag.created_by.unwrap_or_default(),
        }
    }
}

/// Schema of `resource_assignments`, shared with the tag data source.
pub(crate) fn resource_assignments_attribute() -> Attribute {
    Attribute::computed(ValueType::blocks(
        Schema::new()
            .attr("resource_name", Attribute::computed(ValueType::String))
            .attr("value", Attribute::computed(ValueType::String)),
    ))
}

/// Handler for `pnap_tag`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TagResource;

impl ResourceHandler for TagResource {
    type State = TagState;

    const TYPE_NAME: &'static str = "pnap_tag";

    fn schema(&self) -> Schema {
        Schema::new()
            .attr("name", Attribute::required(ValueType::String))
            .attr("values", Attribute::computed(ValueType::string_list()))
            .attr("description", Attribute::optional(ValueType::String))
            .attr("is_billing_tag", Attribute::required(ValueType::Bool))
            .attr("resource_assignments", resource_assignments_attribute())
            .attr("created_by", Attribute::computed(ValueType::String))
    }

    fn create<'a>(&'a self, client: &'a PnapClient, plan: TagState) -> HandlerFuture<'a, TagState> {
        Box::pin(async move {
            let request = TagWrite {
                name: plan.name,
                description: non_empty(&plan.description),
                is_billing_tag: plan.is_billing_tag,
            };
            let created = client.create_tag(&request).await?;
            Ok(client.get_tag(&created.id).await?.into())
        })
    }

    fn read<'a>(&'a self, client: &'a PnapClient, prior: TagState) -> HandlerFuture<'a, TagState> {
        Box::pin(async move { Ok(client.get_tag(&prior.id).await?.into()) })
    }

    fn update<'a>(
        &'a self,
        client: &'a PnapClient,
        prior: TagState,
        plan: TagState,
    ) -> HandlerFuture<'a, TagState> {
        Box::pin(async move {
            let changed = plan.name != prior.name
                || plan.is_billing_tag != prior.is_billing_tag
                || plan.description != prior.description;
            if !changed {
                return Err(ProviderError::UnsupportedAction);
            }
            let request = TagWrite {
                name: plan.name,
                description: Some(plan.description),
                is_billing_tag: plan.is_billing_tag,
            };
            client.update_tag(&prior.id, &request).await?;
            Ok(client.get_tag(&prior.id).await?.into())
        })
    }

    fn delete<'a>(&'a self, client: &'a PnapClient, prior: TagState) -> HandlerFuture<'a, ()> {
        Box::pin(async move {
            client.delete_tag(&prior.id).await?;
            Ok(())
        })
    }
}
