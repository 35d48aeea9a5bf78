//! `pnap_ssh_key` data source: looks up a key by name.

use crate::api::PnapClient;
use crate::provider::{DataSourceHandler, HandlerFuture};
use crate::resources::ssh_key::SshKeyState;
use crate::schema::{Attribute, Schema, ValueType};
use crate::state::find_unique;

/// Handler for the `pnap_ssh_key` data source.
#[derive(Clone, Copy, Debug, Default)]
pub struct SshKeyDataSource;

impl DataSourceHandler for SshKeyDataSource {
    type State = SshKeyState;

    const TYPE_NAME: &'static str = "pnap_ssh_key";

    fn schema(&self) -> Schema {
        Schema::new()
            .attr("name", Attribute::required(ValueType::String))
            .attr("default", Attribute::computed(ValueType::Bool))
            .attr("key", Attribute::computed(ValueType::String))
            .attr("fingerprint", Attribute::computed(ValueType::String))
            .attr("created_on", Attribute::computed(ValueType::String))
            .attr("last_updated_on", Attribute::computed(ValueType::String))
    }

    fn read<'a>(
        &'a self,
        client: &'a PnapClient,
        config: SshKeyState,
    ) -> HandlerFuture<'a, SshKeyState> {
        Box::pin(async move {
            let keys = client.list_ssh_keys().await?;
            let found = find_unique(
                keys,
                |key| key.name == config.name,
                format!("ssh keys with name {}", config.name),
            )?;
            Ok(found.map_or_else(
                || SshKeyState {
                    id: String::new(),
                    ..config
                },
                SshKeyState::from,
            ))
        })
    }
}
