//! Provider catalog and the handler traits behind it.
//!
//! Each resource implements [`ResourceHandler`] against its own typed state;
//! each data source implements [`DataSourceHandler`]. The [`Provider`] erases
//! both behind JSON-valued adapters so the host can address them by type
//! name.

mod error;
mod settings;
#[cfg(test)]
mod tests;

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

use crate::api::{HttpTransport, PnapClient};
use crate::config::ProviderConfig;
use crate::data_sources;
use crate::resources;
use crate::schema::{Attribute, OperationTimeouts, Schema, ValueType};
use crate::state::prune_nulls;

pub use error::ProviderError;
pub use settings::ProviderSettings;

/// Future returned by handler operations.
pub type HandlerFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ProviderError>> + Send + 'a>>;

/// Lifecycle of one managed resource type.
pub trait ResourceHandler: Send + Sync {
    /// Typed state; field names match the schema's attribute names.
    type State: Serialize + DeserializeOwned + Default + Send + 'static;

    /// Registered type name, for example `pnap_server`.
    const TYPE_NAME: &'static str;

    /// Attribute metadata.
    fn schema(&self) -> Schema;

    /// Budgets declared to the host.
    fn timeouts(&self) -> OperationTimeouts {
        OperationTimeouts::default()
    }

    /// Creates the remote object and returns the refreshed state.
    fn create<'a>(&'a self, client: &'a PnapClient, plan: Self::State)
    -> HandlerFuture<'a, Self::State>;

    /// Refreshes `prior` from the API.
    fn read<'a>(&'a self, client: &'a PnapClient, prior: Self::State)
    -> HandlerFuture<'a, Self::State>;

    /// Applies the difference between `prior` and `plan`.
    fn update<'a>(
        &'a self,
        client: &'a PnapClient,
        prior: Self::State,
        plan: Self::State,
    ) -> HandlerFuture<'a, Self::State>;

    /// Destroys the remote object.
    fn delete<'a>(&'a self, client: &'a PnapClient, prior: Self::State) -> HandlerFuture<'a, ()>;
}

/// Read-only query of one data source type.
pub trait DataSourceHandler: Send + Sync {
    /// Typed state; field names match the schema's attribute names.
    type State: Serialize + DeserializeOwned + Default + Send + 'static;

    /// Registered type name, for example `pnap_events`.
    const TYPE_NAME: &'static str;

    /// Attribute metadata.
    fn schema(&self) -> Schema;

    /// Resolves the configured filters into state.
    fn read<'a>(&'a self, client: &'a PnapClient, config: Self::State)
    -> HandlerFuture<'a, Self::State>;
}

/// Object-safe view of a [`ResourceHandler`] over JSON values.
pub trait DynResource: Send + Sync {
    /// Registered type name.
    fn type_name(&self) -> &'static str;
    /// Schema including the computed `id`.
    fn schema(&self) -> Schema;
    /// Declared budgets.
    fn timeouts(&self) -> OperationTimeouts;
    /// Default state, used to check that state and schema agree.
    fn blank_state(&self) -> Result<Value, ProviderError>;
    /// See [`ResourceHandler::create`].
    fn create<'a>(&'a self, client: &'a PnapClient, plan: Value) -> HandlerFuture<'a, Value>;
    /// See [`ResourceHandler::read`].
    fn read<'a>(&'a self, client: &'a PnapClient, prior: Value) -> HandlerFuture<'a, Value>;
    /// See [`ResourceHandler::update`].
    fn update<'a>(
        &'a self,
        client: &'a PnapClient,
        prior: Value,
        plan: Value,
    ) -> HandlerFuture<'a, Value>;
    /// See [`ResourceHandler::delete`].
    fn delete<'a>(&'a self, client: &'a PnapClient, prior: Value) -> HandlerFuture<'a, ()>;
}

/// Object-safe view of a [`DataSourceHandler`] over JSON values.
pub trait DynDataSource: Send + Sync {
    /// Registered type name.
    fn type_name(&self) -> &'static str;
    /// Schema including the computed `id`.
    fn schema(&self) -> Schema;
    /// Default state, used to check that state and schema agree.
    fn blank_state(&self) -> Result<Value, ProviderError>;
    /// See [`DataSourceHandler::read`].
    fn read<'a>(&'a self, client: &'a PnapClient, config: Value) -> HandlerFuture<'a, Value>;
}

fn with_id(schema: Schema) -> Schema {
    if schema.get("id").is_some() {
        return schema;
    }
    schema.attr("id", Attribute::computed(ValueType::String))
}

/// Fills defaults, optionally validates, then decodes `value` into typed
/// state.
fn decode<S: DeserializeOwned>(
    type_name: &str,
    schema: &Schema,
    mut value: Value,
    validate: bool,
) -> Result<S, ProviderError> {
    schema.apply_defaults(&mut value);
    if validate {
        schema
            .validate(&value)
            .map_err(|source| ProviderError::Schema {
                type_name: type_name.to_owned(),
                source,
            })?;
    }
    prune_nulls(&mut value);
    serde_json::from_value(value).map_err(|err| ProviderError::State {
        type_name: type_name.to_owned(),
        message: err.to_string(),
    })
}

fn encode<S: Serialize>(type_name: &str, state: &S) -> Result<Value, ProviderError> {
    serde_json::to_value(state).map_err(|err| ProviderError::State {
        type_name: type_name.to_owned(),
        message: err.to_string(),
    })
}

/// Erases a [`ResourceHandler`].
struct ResourceAdapter<H>(H);

impl<H: ResourceHandler> DynResource for ResourceAdapter<H> {
    fn type_name(&self) -> &'static str {
        H::TYPE_NAME
    }

    fn schema(&self) -> Schema {
        with_id(self.0.schema())
    }

    fn timeouts(&self) -> OperationTimeouts {
        self.0.timeouts()
    }

    fn blank_state(&self) -> Result<Value, ProviderError> {
        encode(H::TYPE_NAME, &H::State::default())
    }

    fn create<'a>(&'a self, client: &'a PnapClient, plan: Value) -> HandlerFuture<'a, Value> {
        Box::pin(async move {
            let typed: H::State = decode(H::TYPE_NAME, &self.schema(), plan, true)?;
            let created = self.0.create(client, typed).await?;
            encode(H::TYPE_NAME, &created)
        })
    }

    fn read<'a>(&'a self, client: &'a PnapClient, prior: Value) -> HandlerFuture<'a, Value> {
        Box::pin(async move {
            let typed: H::State = decode(H::TYPE_NAME, &self.schema(), prior, false)?;
            let refreshed = self.0.read(client, typed).await?;
            encode(H::TYPE_NAME, &refreshed)
        })
    }

    fn update<'a>(
        &'a self,
        client: &'a PnapClient,
        prior: Value,
        plan: Value,
    ) -> HandlerFuture<'a, Value> {
        Box::pin(async move {
            let schema = self.schema();
            let before: H::State = decode(H::TYPE_NAME, &schema, prior, false)?;
            let after: H::State = decode(H::TYPE_NAME, &schema, plan, true)?;
            let updated = self.0.update(client, before, after).await?;
            encode(H::TYPE_NAME, &updated)
        })
    }

    fn delete<'a>(&'a self, client: &'a PnapClient, prior: Value) -> HandlerFuture<'a, ()> {
        Box::pin(async move {
            let typed: H::State = decode(H::TYPE_NAME, &self.schema(), prior, false)?;
            self.0.delete(client, typed).await
        })
    }
}

/// Erases a [`DataSourceHandler`].
struct DataSourceAdapter<H>(H);

impl<H: DataSourceHandler> DynDataSource for DataSourceAdapter<H> {
    fn type_name(&self) -> &'static str {
        H::TYPE_NAME
    }

    fn schema(&self) -> Schema {
        with_id(self.0.schema())
    }

    fn blank_state(&self) -> Result<Value, ProviderError> {
        encode(H::TYPE_NAME, &H::State::default())
    }

    fn read<'a>(&'a self, client: &'a PnapClient, config: Value) -> HandlerFuture<'a, Value> {
        Box::pin(async move {
            let typed: H::State = decode(H::TYPE_NAME, &self.schema(), config, true)?;
            let resolved = self.0.read(client, typed).await?;
            encode(H::TYPE_NAME, &resolved)
        })
    }
}

/// Schema and budgets of one resource type, as exported to the host.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResourceSchema {
    /// Attributes.
    pub schema: Schema,
    /// Declared budgets.
    pub timeouts: OperationTimeouts,
}

/// Everything the host needs to plan against the provider.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CatalogSchema {
    /// Provider block attributes.
    pub provider: Schema,
    /// Resource schemas by type name.
    pub resources: BTreeMap<&'static str, ResourceSchema>,
    /// Data source schemas by type name.
    pub data_sources: BTreeMap<&'static str, Schema>,
}

/// Registration table plus the configured API client.
pub struct Provider {
    resources: BTreeMap<&'static str, Box<dyn DynResource>>,
    data_sources: BTreeMap<&'static str, Box<dyn DynDataSource>>,
    settings: ProviderSettings,
    client: Option<PnapClient>,
}

impl std::fmt::Debug for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider")
            .field("resources", &self.resources.keys().collect::<Vec<_>>())
            .field("data_sources", &self.data_sources.keys().collect::<Vec<_>>())
            .field("settings", &self.settings)
            .field("configured", &self.client.is_some())
            .finish()
    }
}

impl Default for Provider {
    fn default() -> Self {
        Self::new(ProviderSettings::default())
    }
}

impl Provider {
    /// Registers every resource and data source. The provider must be
    /// configured before lifecycle calls.
    #[must_use]
    pub fn new(settings: ProviderSettings) -> Self {
        let mut provider = Self {
            resources: BTreeMap::new(),
            data_sources: BTreeMap::new(),
            settings,
            client: None,
        };
        resources::register(&mut provider, &settings);
        data_sources::register(&mut provider);
        provider
    }

    /// Registers a provider around an already built client.
    #[must_use]
    pub fn with_client(client: PnapClient, settings: ProviderSettings) -> Self {
        let mut provider = Self::new(settings);
        provider.client = Some(client);
        provider
    }

    /// Adds a resource type, replacing any handler with the same name.
    pub fn register_resource<H: ResourceHandler + 'static>(&mut self, handler: H) {
        self.resources
            .insert(H::TYPE_NAME, Box::new(ResourceAdapter(handler)));
    }

    /// Adds a data source type, replacing any handler with the same name.
    pub fn register_data_source<H: DataSourceHandler + 'static>(&mut self, handler: H) {
        self.data_sources
            .insert(H::TYPE_NAME, Box::new(DataSourceAdapter(handler)));
    }

    /// Wait cadences in effect.
    #[must_use]
    pub const fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    /// Resolves credentials and builds the HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Config`] when credentials cannot be resolved
    /// and [`ProviderError::Api`] when the HTTP client cannot be built.
    pub fn configure(&mut self, config: &ProviderConfig) -> Result<(), ProviderError> {
        let transport_settings = config.resolve_credentials()?;
        info!(api = %transport_settings.api_base_url, "configuring provider");
        let transport = HttpTransport::new(transport_settings)?;
        self.client = Some(PnapClient::new(Arc::new(transport)));
        Ok(())
    }

    /// Returns `true` once a client is available.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    /// Registered resource type names in order.
    #[must_use]
    pub fn resource_types(&self) -> Vec<&'static str> {
        self.resources.keys().copied().collect()
    }

    /// Registered data source type names in order.
    #[must_use]
    pub fn data_source_types(&self) -> Vec<&'static str> {
        self.data_sources.keys().copied().collect()
    }

    /// Looks up a resource type.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::UnknownType`] for unregistered names.
    pub fn resource(&self, type_name: &str) -> Result<&dyn DynResource, ProviderError> {
        self.resources
            .get(type_name)
            .map(Box::as_ref)
            .ok_or_else(|| ProviderError::UnknownType {
                kind: "resource",
                type_name: type_name.to_owned(),
            })
    }

    /// Looks up a data source type.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::UnknownType`] for unregistered names.
    pub fn data_source(&self, type_name: &str) -> Result<&dyn DynDataSource, ProviderError> {
        self.data_sources
            .get(type_name)
            .map(Box::as_ref)
            .ok_or_else(|| ProviderError::UnknownType {
                kind: "data source",
                type_name: type_name.to_owned(),
            })
    }

    fn client(&self) -> Result<&PnapClient, ProviderError> {
        self.client.as_ref().ok_or(ProviderError::NotConfigured)
    }

    /// Attributes of the provider block.
    #[must_use]
    pub fn config_schema() -> Schema {
        Schema::new()
            .attr("client_id", Attribute::optional(ValueType::String))
            .attr(
                "client_secret",
                Attribute::optional(ValueType::String).sensitive(),
            )
            .attr("config_file_path", Attribute::optional(ValueType::String))
            .attr("token_url", Attribute::optional(ValueType::String))
            .attr("api_base_url", Attribute::optional(ValueType::String))
            .attr("user_agent", Attribute::optional(ValueType::String))
            .attr("request_timeout_secs", Attribute::optional(ValueType::Int))
    }

    /// Exports every schema.
    #[must_use]
    pub fn schemas(&self) -> CatalogSchema {
        CatalogSchema {
            provider: Self::config_schema(),
            resources: self
                .resources
                .iter()
                .map(|(name, resource)| {
                    (
                        *name,
                        ResourceSchema {
                            schema: resource.schema(),
                            timeouts: resource.timeouts(),
                        },
                    )
                })
                .collect(),
            data_sources: self
                .data_sources
                .iter()
                .map(|(name, source)| (*name, source.schema()))
                .collect(),
        }
    }

    /// Creates a resource from its planned configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when the type is unknown, the provider is
    /// unconfigured, the plan is invalid or the handler fails.
    pub async fn create(&self, type_name: &str, plan: Value) -> Result<Value, ProviderError> {
        let resource = self.resource(type_name)?;
        let client = self.client()?;
        info!(resource = type_name, "creating resource");
        resource.create(client, plan).await
    }

    /// Refreshes a resource from its prior state.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when the type is unknown, the provider is
    /// unconfigured, the state is undecodable or the handler fails.
    pub async fn read(&self, type_name: &str, prior: Value) -> Result<Value, ProviderError> {
        let resource = self.resource(type_name)?;
        let client = self.client()?;
        debug!(resource = type_name, "reading resource");
        resource.read(client, prior).await
    }

    /// Applies a planned change.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when the type is unknown, the provider is
    /// unconfigured, the plan is invalid or the handler fails.
    pub async fn update(
        &self,
        type_name: &str,
        prior: Value,
        plan: Value,
    ) -> Result<Value, ProviderError> {
        let resource = self.resource(type_name)?;
        let client = self.client()?;
        info!(resource = type_name, "updating resource");
        resource.update(client, prior, plan).await
    }

    /// Destroys a resource.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when the type is unknown, the provider is
    /// unconfigured, the state is undecodable or the handler fails.
    pub async fn delete(&self, type_name: &str, prior: Value) -> Result<(), ProviderError> {
        let resource = self.resource(type_name)?;
        let client = self.client()?;
        info!(resource = type_name, "deleting resource");
        resource.delete(client, prior).await
    }

    /// Evaluates a data source.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when the type is unknown, the provider is
    /// unconfigured, the configuration is invalid or the handler fails.
    pub async fn read_data_source(
        &self,
        type_name: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        let source = self.data_source(type_name)?;
        let client = self.client()?;
        debug!(data_source = type_name, "reading data source");
        source.read(client, config).await
    }
}
