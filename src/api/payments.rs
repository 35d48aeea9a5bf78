//! Payments service.

use serde::Deserialize;

use super::{ApiError, ApiRequest, Method, PnapClient, Service};

/// Payment transaction record.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Transaction {
    /// Identifier.
    pub id: String,
    /// Payment status.
    pub status: String,
    /// Reason for a failed transaction.
    pub details: Option<String>,
    /// Charged amount.
    pub amount: f64,
    /// ISO currency code.
    pub currency: String,
    /// Timestamp of the transaction.
    pub date: String,
    /// Invoice the transaction settles.
    pub metadata: TransactionMetadata,
    /// Card used for the payment.
    pub card_payment_method_details: CardPaymentMethodDetails,
}

/// Invoice a transaction settles.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct TransactionMetadata {
    /// Invoice settled by the transaction.
    pub invoice_id: String,
    /// Number of the settled invoice.
    pub invoice_number: Option<String>,
    /// Whether the charge was automatic.
    pub is_auto_charge: bool,
}

/// Card used for a transaction.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct CardPaymentMethodDetails {
    /// Card brand.
    pub card_type: String,
    /// Last four digits of the card.
    pub last_four_digits: String,
}

/// One page of transactions.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PaginatedTransactions {
    /// Page size.
    pub limit: i64,
    /// Records skipped before this page.
    pub offset: i64,
    /// Total number of matching records.
    pub total: i64,
    /// Records on this page.
    pub results: Vec<Transaction>,
}

/// Transaction list filters. Dates are RFC 3339 strings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionQuery {
    /// Maximum number of transactions.
    pub limit: Option<i64>,
    /// Number of records to skip.
    pub offset: Option<i64>,
    /// Sort direction.
    pub sort_direction: Option<String>,
    /// Field to sort by.
    pub sort_field: Option<String>,
    /// Lower bound of the time window (RFC 3339).
    pub from: Option<String>,
    /// Upper bound of the time window (RFC 3339).
    pub to: Option<String>,
}

impl PnapClient {
    /// Lists transactions matching the filters.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn list_transactions(
        &self,
        query: &TransactionQuery,
    ) -> Result<PaginatedTransactions, ApiError> {
        let call = ApiRequest::new(Service::Payments, Method::Get, "transactions")
            .query_opt("limit", query.limit)
            .query_opt("offset", query.offset)
            .query_opt("sortDirection", query.sort_direction.as_deref())
            .query_opt("sortField", query.sort_field.as_deref())
            .query_opt("from", query.from.as_deref())
            .query_opt("to", query.to.as_deref());
        self.call(call).await
    }

    /// Fetches one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn get_transaction(&self, id: &str) -> Result<Transaction, ApiError> {
        let path = format!("transactions/{id}");
        self.call(ApiRequest::new(Service::Payments, Method::Get, path))
            .await
    }
}
