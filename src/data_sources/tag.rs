//! `pnap_tag` data source: looks up a tag definition by name.

use crate::api::PnapClient;
use crate::provider::{DataSourceHandler, HandlerFuture};
use crate::resources::tag::{TagState, resource_assignments_attribute};
use crate::schema::{Attribute, Schema, ValueType};
use crate::state::find_unique;

/// Handler for the `pnap_tag` data source.
#[derive(Clone, Copy, Debug, Default)]
pub struct TagDataSource;

impl DataSourceHandler for TagDataSource {
    type State = TagState;

    const TYPE_NAME: &'static str = "pnap_tag";

    fn schema(&self) -> Schema {
        Schema::new()
            .attr("name", Attribute::required(ValueType::String))
            .attr("values", Attribute::computed(ValueType::string_list()))
            .attr("description", Attribute::computed(ValueType::String))
            .attr("is_billing_tag", Attribute::computed(ValueType::Bool))
            .attr("resource_assignments", resource_assignments_attribute())
            .attr("created_by", Attribute::computed(ValueType::String))
    }

    fn read<'a>(&'a self, client: &'a PnapClient, config: TagState) -> HandlerFuture<'a, TagState> {
        Box::pin(async move {
            let tags = client.list_tags(Some(config.name.as_str())).await?;
            let found = find_unique(
                tags,
                |tag| tag.name == config.name,
                format!("tags with name {}", config.name),
            )?;
            Ok(found.map_or_else(
                || TagState {
                    id: String::new(),
                    ..config
                },
                TagState::from,
            ))
        })
    }
}
