//! `pnap_ssh_key`: account-level SSH public keys.

use serde::{Deserialize, Serialize};

use crate::api::PnapClient;
use crate::api::bmc::{SshKey, SshKeyCreate, SshKeyUpdate};
use crate::provider::{HandlerFuture, ProviderError, ResourceHandler};
use crate::schema::{Attribute, Schema, ValueType};

/// State of an SSH key.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct SshKeyState {
    /// Key identifier.
    pub id: String,
    /// Whether the key is installed on new servers by default.
    pub default: bool,
    /// Friendly key name.
    pub name: String,
    /// Public key in OpenSSH format.
    pub key: String,
    /// Key fingerprint.
    pub fingerprint: String,
    /// Creation timestamp.
    pub created_on: String,
    /// Last update timestamp.
    pub last_updated_on: String,
}

impl From<SshKey> for SshKeyState {
    fn from(key: SshKey) -> Self {
        Self {
            id: key.id,
            default: key.default,
            name: key.name,
            key: key.key,
            fingerprint: key.fingerprint,
            created_on: key.created_on,
            last_updated_on: key.last_updated_on,
        }
    }
}

/// Handler for `pnap_ssh_key`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SshKeyResource;

impl ResourceHandler for SshKeyResource {
    type State = SshKeyState;

    const TYPE_NAME: &'static str = "pnap_ssh_key";

    fn schema(&self) -> Schema {
        Schema::new()
            .attr("default", Attribute::required(ValueType::Bool))
            .attr("name", Attribute::required(ValueType::String))
            .attr("key", Attribute::required(ValueType::String))
            .attr("fingerprint", Attribute::computed(ValueType::String))
            .attr("created_on", Attribute::computed(ValueType::String))
            .attr("last_updated_on", Attribute::computed(ValueType::String))
    }

    fn create<'a>(
        &'a self,
        client: &'a PnapClient,
        plan: SshKeyState,
    ) -> HandlerFuture<'a, SshKeyState> {
        Box::pin(async move {
            let request = SshKeyCreate {
                default: plan.default,
                name: plan.name,
                key: plan.key,
            };
            let created = client.create_ssh_key(&request).await?;
            Ok(client.get_ssh_key(&created.id).await?.into())
        })
    }

    fn read<'a>(
        &'a self,
        client: &'a PnapClient,
        prior: SshKeyState,
    ) -> HandlerFuture<'a, SshKeyState> {
        Box::pin(async move { Ok(client.get_ssh_key(&prior.id).await?.into()) })
    }

    fn update<'a>(
        &'a self,
        client: &'a PnapClient,
        prior: SshKeyState,
        plan: SshKeyState,
    ) -> HandlerFuture<'a, SshKeyState> {
        Box::pin(async move {
            if plan.name == prior.name && plan.default == prior.default {
                return Err(ProviderError::UnsupportedAction);
            }
            let request = SshKeyUpdate {
                default: plan.default,
                name: plan.name,
            };
            client.update_ssh_key(&prior.id, &request).await?;
            Ok(client.get_ssh_key(&prior.id).await?.into())
        })
    }

    fn delete<'a>(&'a self, client: &'a PnapClient, prior: SshKeyState) -> HandlerFuture<'a, ()> {
        Box::pin(async move {
            client.delete_ssh_key(&prior.id).await?;
            Ok(())
        })
    }
}
