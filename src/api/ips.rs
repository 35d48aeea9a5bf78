//! IP block service.

use serde::{Deserialize, Serialize};

use super::tags::{TagAssignment, TagAssignmentRequest};
use super::{ApiError, ApiRequest, Method, PnapClient, Service};

/// IP block record.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct IpBlock {
    /// Identifier.
    pub id: String,
    /// Location code such as `PHX`.
    pub location: String,
    /// Prefix length such as `/31`.
    pub cidr_block_size: String,
    /// CIDR notation of the range.
    pub cidr: String,
    /// IP version (`V4` or `V6`).
    pub ip_version: Option<String>,
    /// Assignment status.
    pub status: String,
    /// Resource the record is assigned to, if any.
    pub assigned_resource_id: Option<String>,
    /// Kind of the assigned resource.
    pub assigned_resource_type: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Tags assigned to the block.
    pub tags: Vec<TagAssignment>,
    /// Whether the resource was brought by the customer.
    pub is_bring_your_own: bool,
    /// Creation timestamp.
    pub created_on: Option<String>,
}

/// IP block allocation request.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IpBlockCreate {
    /// Location code such as `PHX`.
    pub location: String,
    /// Prefix length such as `/31`.
    pub cidr_block_size: String,
    /// Free-form description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Tags to assign.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<TagAssignmentRequest>,
}

/// IP block description patch.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IpBlockPatch {
    /// New description.
    pub description: String,
}

impl PnapClient {
    /// Lists IP blocks.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn list_ip_blocks(&self) -> Result<Vec<IpBlock>, ApiError> {
        self.call(ApiRequest::new(Service::Ips, Method::Get, "ip-blocks"))
            .await
    }

    /// Fetches one IP block.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn get_ip_block(&self, id: &str) -> Result<IpBlock, ApiError> {
        self.call(ApiRequest::new(Service::Ips, Method::Get, format!("ip-blocks/{id}")))
            .await
    }

    /// Allocates an IP block.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn create_ip_block(&self, request: &IpBlockCreate) -> Result<IpBlock, ApiError> {
        let call = ApiRequest::new(Service::Ips, Method::Post, "ip-blocks").json(request)?;
        self.call(call).await
    }

    /// Updates the description.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn patch_ip_block(
        &self,
        id: &str,
        request: &IpBlockPatch,
    ) -> Result<IpBlock, ApiError> {
        let call =
            ApiRequest::new(Service::Ips, Method::Patch, format!("ip-blocks/{id}")).json(request)?;
        self.call(call).await
    }

    /// Replaces the tag assignments.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn set_ip_block_tags(
        &self,
        id: &str,
        tags: &[TagAssignmentRequest],
    ) -> Result<IpBlock, ApiError> {
        let call =
            ApiRequest::new(Service::Ips, Method::Put, format!("ip-blocks/{id}/tags")).json(&tags)?;
        self.call(call).await
    }

    /// Releases the IP block.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn delete_ip_block(&self, id: &str) -> Result<(), ApiError> {
        self.call_empty(ApiRequest::new(Service::Ips, Method::Delete, format!("ip-blocks/{id}")))
            .await
    }
}
