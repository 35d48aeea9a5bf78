//! `pnap_quota` data source: looks up an account quota by id or name.

use serde::{Deserialize, Serialize};

use super::key_matches;
use crate::api::PnapClient;
use crate::api::bmc::{Quota, QuotaEditLimitRequestDetails};
use crate::provider::{DataSourceHandler, HandlerFuture};
use crate::schema::{Attribute, Schema, ValueType};
use crate::state::find_unique;

/// Pending request to raise the quota.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct QuotaRequestState {
    /// Requested limit.
    pub limit: i64,
    /// Reason given for the request.
    pub reason: String,
    /// When the change was requested.
    pub requested_on: String,
}

impl From<QuotaEditLimitRequestDetails> for QuotaRequestState {
    fn from(request: QuotaEditLimitRequestDetails) -> Self {
        Self {
            limit: request.limit,
            reason: request.reason,
            requested_on: request.requested_on,
        }
    }
}

/// Quota as exposed by the data source.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct QuotaState {
    /// Identifier.
    pub id: String,
    /// Quota name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Whether the quota is enforced.
    pub status: String,
    /// Current limit.
    pub limit: i64,
    /// Unit the limit is counted in.
    pub unit: String,
    /// Amount in use.
    pub used: i64,
    /// Pending limit change requests.
    pub quota_edit_limit_request_details: Vec<QuotaRequestState>,
}

impl From<Quota> for QuotaState {
    fn from(quota: Quota) -> Self {
        Self {
            id: quota.id,
            name: quota.name,
            description: quota.description,
            status: quota.status,
            limit: quota.limit,
            unit: quota.unit,
            used: quota.used,
            quota_edit_limit_request_details: quota
                .quota_edit_limit_request_details
                .into_iter()
                .map(Into::into)
                .collect(),
        }
    }
}

/// Handler for the `pnap_quota` data source.
#[derive(Clone, Copy, Debug, Default)]
pub struct QuotaDataSource;

impl DataSourceHandler for QuotaDataSource {
    type State = QuotaState;

    const TYPE_NAME: &'static str = "pnap_quota";

    fn schema(&self) -> Schema {
        let request = Schema::new()
            .attr("limit", Attribute::computed(ValueType::Int))
            .attr("reason", Attribute::computed(ValueType::String))
            .attr("requested_on", Attribute::computed(ValueType::String));
        Schema::new()
            .attr(
                "id",
                Attribute::optional_computed(ValueType::String).conflicts_with(&["name"]),
            )
            .attr(
                "name",
                Attribute::optional_computed(ValueType::String).conflicts_with(&["id"]),
            )
            .attr("description", Attribute::computed(ValueType::String))
            .attr("status", Attribute::computed(ValueType::String))
            .attr("limit", Attribute::computed(ValueType::Int))
            .attr("unit", Attribute::computed(ValueType::String))
            .attr("used", Attribute::computed(ValueType::Int))
            .attr(
                "quota_edit_limit_request_details",
                Attribute::computed(ValueType::blocks(request)),
            )
    }

    fn read<'a>(
        &'a self,
        client: &'a PnapClient,
        config: QuotaState,
    ) -> HandlerFuture<'a, QuotaState> {
        Box::pin(async move {
            let quotas = client.list_quotas().await?;
            let found = find_unique(
                quotas,
                |quota| {
                    key_matches(&config.name, &quota.name) || key_matches(&config.id, &quota.id)
                },
                format!("Quotas with name {}", config.name),
            )?;
            Ok(found.map_or_else(
                || QuotaState {
                    id: String::new(),
                    ..config
                },
                QuotaState::from,
            ))
        })
    }
}
