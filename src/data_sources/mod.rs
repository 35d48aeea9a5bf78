//! Read-only data sources.
//!
//! Lookup data sources list records and keep the single one matching the
//! configured key; zero matches leave the state untouched and more than one
//! fails. Query data sources forward their filters and report the whole
//! result set under a synthetic identifier.

pub mod bgp_peer_group;
pub mod events;
pub mod invoices;
pub mod ip_block;
pub mod locations;
pub mod private_network;
pub mod product_availability;
pub mod products;
pub mod public_network;
pub mod quota;
pub mod rancher_cluster;
pub mod reservation;
pub mod server;
pub mod ssh_key;
pub mod storage_network;
pub mod tag;
pub mod transactions;
#[cfg(test)]
mod tests;

use chrono::DateTime;
use serde::{Deserialize, Serialize};

use crate::api::tags::TagAssignment;
use crate::provider::{Provider, ProviderError};
use crate::schema::{Attribute, Schema, ValueType};
use crate::state::non_empty;

pub use bgp_peer_group::BgpPeerGroupDataSource;
pub use events::EventsDataSource;
pub use invoices::InvoicesDataSource;
pub use ip_block::IpBlockDataSource;
pub use locations::LocationsDataSource;
pub use private_network::PrivateNetworkDataSource;
pub use product_availability::ProductAvailabilityDataSource;
pub use products::ProductsDataSource;
pub use public_network::PublicNetworkDataSource;
pub use quota::QuotaDataSource;
pub use rancher_cluster::RancherClusterDataSource;
pub use reservation::ReservationDataSource;
pub use server::ServerDataSource;
pub use ssh_key::SshKeyDataSource;
pub use storage_network::StorageNetworkDataSource;
pub use tag::TagDataSource;
pub use transactions::TransactionsDataSource;

/// Registers every data source type.
pub fn register(provider: &mut Provider) {
    provider.register_data_source(SshKeyDataSource);
    provider.register_data_source(ServerDataSource);
    provider.register_data_source(PrivateNetworkDataSource);
    provider.register_data_source(PublicNetworkDataSource);
    provider.register_data_source(StorageNetworkDataSource);
    provider.register_data_source(IpBlockDataSource);
    provider.register_data_source(ReservationDataSource);
    provider.register_data_source(RancherClusterDataSource);
    provider.register_data_source(EventsDataSource);
    provider.register_data_source(TagDataSource);
    provider.register_data_source(ProductsDataSource);
    provider.register_data_source(ProductAvailabilityDataSource);
    provider.register_data_source(QuotaDataSource);
    provider.register_data_source(LocationsDataSource);
    provider.register_data_source(InvoicesDataSource);
    provider.register_data_source(TransactionsDataSource);
    provider.register_data_source(BgpPeerGroupDataSource);
}

/// Tag reported on a looked-up record. Unlike resource tags, these are
/// flat and always imported in full.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct DataTagState {
    /// Tag identifier.
    pub id: String,
    /// Tag name.
    pub name: String,
    /// Tag value.
    pub value: String,
    /// Whether the tag appears on invoices.
    pub is_billing_tag: bool,
    /// Who created the record.
    pub created_by: String,
}

impl From<TagAssignment> for DataTagState {
    fn from(tag: TagAssignment) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
            value: tag.value.unwrap_or_default(),
            is_billing_tag: tag.is_billing_tag,
            created_by: tag.created_by.unwrap_or_default(),
        }
    }
}

/// Schema of the flat `tags` list of lookup data sources.
pub(crate) fn data_tags_attribute() -> Attribute {
    Attribute::computed(ValueType::blocks(
        Schema::new()
            .attr("id", Attribute::computed(ValueType::String))
            .attr("name", Attribute::computed(ValueType::String))
            .attr("value", Attribute::computed(ValueType::String))
            .attr("is_billing_tag", Attribute::computed(ValueType::Bool))
            .attr("created_by", Attribute::computed(ValueType::String)),
    ))
}

/// True when `key` is configured and equals `candidate`.
pub(crate) fn key_matches(key: &str, candidate: &str) -> bool {
    !key.is_empty() && key == candidate
}

/// Checks an optional RFC 3339 filter and returns it for the query.
pub(crate) fn timestamp_filter(
    attribute: &str,
    value: &str,
) -> Result<Option<String>, ProviderError> {
    if value.is_empty() {
        return Ok(None);
    }
    DateTime::parse_from_rfc3339(value).map_err(|err| {
        ProviderError::invalid(format!(
            "{attribute} '{value}' is not an RFC 3339 timestamp: {err}"
        ))
    })?;
    Ok(non_empty(value))
}

/// Positive integers are forwarded; zero means unset.
pub(crate) const fn positive(value: i64) -> Option<i64> {
    if value > 0 { Some(value) } else { None }
}
