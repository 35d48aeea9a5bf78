//! Tag manager service and the tag assignment shapes shared by other services.

use serde::{Deserialize, Serialize};

use super::{ApiError, ApiRequest, Method, PnapClient, Service};

/// Tag attached to a resource, as reported by the owning service.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct TagAssignment {
    /// Tag identifier.
    pub id: String,
    /// Tag name.
    pub name: String,
    /// Tag value.
    pub value: Option<String>,
    /// Whether the tag appears on invoices.
    pub is_billing_tag: bool,
    /// Who created the record.
    pub created_by: Option<String>,
}

/// Tag assignment sent when creating or re-tagging a resource.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TagAssignmentRequest {
    /// Tag name.
    pub name: String,
    /// Tag value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Tag definition.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Tag {
    /// Tag identifier.
    pub id: String,
    /// Tag name.
    pub name: String,
    /// Values in use across resources.
    pub values: Vec<String>,
    /// Tag description.
    pub description: Option<String>,
    /// Whether the tag appears on invoices.
    pub is_billing_tag: bool,
    /// Resources carrying the tag.
    pub resource_assignments: Vec<ResourceAssignment>,
    /// Who created the record.
    pub created_by: Option<String>,
}

/// Resource carrying a tag.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourceAssignment {
    /// Resource carrying the tag.
    pub resource_name: String,
    /// Value assigned on that resource.
    pub value: Option<String>,
}

/// Body for creating or replacing a tag definition.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TagWrite {
    /// Tag name.
    pub name: String,
    /// Tag description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the tag appears on invoices.
    pub is_billing_tag: bool,
}

impl PnapClient {
    /// Lists tags, optionally filtered by exact name.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn list_tags(&self, name: Option<&str>) -> Result<Vec<Tag>, ApiError> {
        let call = ApiRequest::new(Service::Tags, Method::Get, "tags").query_opt("name", name);
        self.call(call).await
    }

    /// Fetches one tag.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn get_tag(&self, id: &str) -> Result<Tag, ApiError> {
        self.call(ApiRequest::new(Service::Tags, Method::Get, format!("tags/{id}")))
            .await
    }

    /// Creates a tag.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn create_tag(&self, request: &TagWrite) -> Result<Tag, ApiError> {
        let call = ApiRequest::new(Service::Tags, Method::Post, "tags").json(request)?;
        self.call(call).await
    }

    /// Replaces a tag definition.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn update_tag(&self, id: &str, request: &TagWrite) -> Result<Tag, ApiError> {
        let call =
            ApiRequest::new(Service::Tags, Method::Patch, format!("tags/{id}")).json(request)?;
        self.call(call).await
    }

    /// Deletes a tag.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn delete_tag(&self, id: &str) -> Result<(), ApiError> {
        self.call_empty(ApiRequest::new(Service::Tags, Method::Delete, format!("tags/{id}")))
            .await
    }
}
