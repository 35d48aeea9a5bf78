//! Invoicing service.

use serde::Deserialize;

use super::{ApiError, ApiRequest, Method, PnapClient, Service};

/// Invoice record.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Invoice {
    /// Identifier.
    pub id: String,
    /// Invoice number.
    pub number: String,
    /// ISO currency code.
    pub currency: String,
    /// Invoiced amount.
    pub amount: f64,
    /// Amount still to be paid.
    pub outstanding_amount: f64,
    /// Payment status.
    pub status: String,
    /// When the invoice was sent.
    pub sent_on: String,
    /// Payment due date.
    pub due_date: String,
}

/// One page of invoices.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PaginatedInvoices {
    /// Page size.
    pub limit: i64,
    /// Records skipped before this page.
    pub offset: i64,
    /// Total number of matching records.
    pub total: i64,
    /// Records on this page.
    pub results: Vec<Invoice>,
}

/// Invoice list filters. Dates are RFC 3339 strings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InvoiceQuery {
    /// Invoice number filter.
    pub number: Option<String>,
    /// Invoice status filter.
    pub status: Option<String>,
    /// Lower bound on the sent date.
    pub sent_on_from: Option<String>,
    /// Upper bound on the sent date.
    pub sent_on_to: Option<String>,
    /// Maximum number of invoices.
    pub limit: Option<i64>,
    /// Number of records to skip.
    pub offset: Option<i64>,
    /// Field to sort by.
    pub sort_field: Option<String>,
    /// Sort direction.
    pub sort_direction: Option<String>,
}

impl PnapClient {
    /// Lists invoices matching the filters.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn list_invoices(&self, query: &InvoiceQuery) -> Result<PaginatedInvoices, ApiError> {
        let call = ApiRequest::new(Service::Invoicing, Method::Get, "invoices")
            .query_opt("number", query.number.as_deref())
            .query_opt("status", query.status.as_deref())
            .query_opt("sentOnFrom", query.sent_on_from.as_deref())
            .query_opt("sentOnTo", query.sent_on_to.as_deref())
            .query_opt("limit", query.limit)
            .query_opt("offset", query.offset)
            .query_opt("sortField", query.sort_field.as_deref())
            .query_opt("sortDirection", query.sort_direction.as_deref());
        self.call(call).await
    }

    /// Fetches one invoice.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn get_invoice(&self, id: &str) -> Result<Invoice, ApiError> {
        let path = format!("invoices/{id}");
        self.call(ApiRequest::new(Service::Invoicing, Method::Get, path))
            .await
    }

    /// Renders the invoice as PDF and returns the document bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn generate_invoice_pdf(&self, id: &str) -> Result<Vec<u8>, ApiError> {
        let path = format!("invoices/{id}/actions/generate-pdf");
        self.call_bytes(ApiRequest::new(Service::Invoicing, Method::Post, path))
            .await
    }
}
