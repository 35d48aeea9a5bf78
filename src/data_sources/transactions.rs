//! `pnap_transactions` data source: queries payment transactions.

use serde::{Deserialize, Serialize};

use super::{positive, timestamp_filter};
use crate::api::PnapClient;
use crate::api::payments::{PaginatedTransactions, Transaction, TransactionQuery};
use crate::provider::{DataSourceHandler, HandlerFuture, ProviderError};
use crate::schema::{Attribute, Schema, ValueType};
use crate::state::{block, find_unique, non_empty, round_to, synthetic_id};

const AMOUNT_PLACES: i32 = 2;

/// Invoice settled by a transaction.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct TransactionMetadataState {
    /// Invoice settled by the transaction.
    pub invoice_id: String,
    /// Number of the settled invoice.
    pub invoice_number: String,
    /// Whether the charge was automatic.
    pub is_auto_charge: bool,
}

/// Card charged by a transaction.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct CardPaymentState {
    /// Card brand.
    pub card_type: String,
    /// Last four digits of the card.
    pub last_four_digits: String,
}

/// Transaction record.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TransactionState {
    /// Identifier.
    pub id: String,
    /// Payment status.
    pub status: String,
    /// Reason for a failed transaction.
    pub details: String,
    /// Charged amount, rounded to cents.
    pub amount: f64,
    /// ISO currency code.
    pub currency: String,
    /// Timestamp of the transaction.
    pub date: String,
    /// Invoice the transaction settles.
    #[serde(with = "block")]
    pub metadata: Option<TransactionMetadataState>,
    /// Card used for the payment.
    #[serde(with = "block")]
    pub card_payment_method_details: Option<CardPaymentState>,
}

impl From<Transaction> for TransactionState {
    fn from(transaction: Transaction) -> Self {
        Self {
            id: transaction.id,
            status: transaction.status,
            details: transaction.details.unwrap_or_default(),
            amount: round_to(transaction.amount, AMOUNT_PLACES),
            currency: transaction.currency,
            date: transaction.date,
            metadata: Some(TransactionMetadataState {
                invoice_id: transaction.metadata.invoice_id,
                invoice_number: transaction.metadata.invoice_number.unwrap_or_default(),
                is_auto_charge: transaction.metadata.is_auto_charge,
            }),
            card_payment_method_details: Some(CardPaymentState {
                card_type: transaction.card_payment_method_details.card_type,
                last_four_digits: transaction.card_payment_method_details.last_four_digits,
            }),
        }
    }
}

/// One page of transactions.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct PaginatedTransactionsState {
    /// Page size.
    pub limit: i64,
    /// Records skipped before this page.
    pub offset: i64,
    /// Total number of matching records.
    pub total: i64,
    /// Records on this page.
    pub results: Vec<TransactionState>,
}

impl From<PaginatedTransactions> for PaginatedTransactionsState {
    fn from(page: PaginatedTransactions) -> Self {
        Self {
            limit: page.limit,
            offset: page.offset,
            total: page.total,
            results: page.results.into_iter().map(Into::into).collect(),
        }
    }
}

/// Filters and results of a transaction query.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TransactionsState {
    /// Transaction to look up; synthetic when listing.
    pub id: String,
    /// Maximum number of transactions.
    pub limit: i64,
    /// Number of records to skip.
    pub offset: i64,
    /// Sort direction.
    pub sort_direction: String,
    /// Field to sort by.
    pub sort_field: String,
    /// Lower bound of the time window (RFC 3339).
    pub from: String,
    /// Upper bound of the time window (RFC 3339).
    pub to: String,
    /// Page of matching transactions.
    #[serde(with = "block")]
    pub paginated_transactions: Option<PaginatedTransactionsState>,
}

impl TransactionsState {
    fn query(&self) -> Result<TransactionQuery, ProviderError> {
        Ok(TransactionQuery {
            limit: positive(self.limit),
            offset: positive(self.offset),
            sort_direction: non_empty(&self.sort_direction),
            sort_field: non_empty(&self.sort_field),
            from: timestamp_filter("from", &self.from)?,
            to: timestamp_filter("to", &self.to)?,
        })
    }
}

/// Handler for the `pnap_transactions` data source.
#[derive(Clone, Copy, Debug, Default)]
pub struct TransactionsDataSource;

impl DataSourceHandler for TransactionsDataSource {
    type State = TransactionsState;

    const TYPE_NAME: &'static str = "pnap_transactions";

    fn schema(&self) -> Schema {
        let metadata = Schema::new()
            .attr("invoice_id", Attribute::computed(ValueType::String))
            .attr("invoice_number", Attribute::computed(ValueType::String))
            .attr("is_auto_charge", Attribute::computed(ValueType::Bool));
        let card = Schema::new()
            .attr("card_type", Attribute::computed(ValueType::String))
            .attr("last_four_digits", Attribute::computed(ValueType::String));
        let transaction = Schema::new()
            .attr("id", Attribute::computed(ValueType::String))
            .attr("status", Attribute::computed(ValueType::String))
            .attr("details", Attribute::computed(ValueType::String))
            .attr("amount", Attribute::computed(ValueType::Float))
            .attr("currency", Attribute::computed(ValueType::String))
            .attr("date", Attribute::computed(ValueType::String))
            .attr("metadata", Attribute::computed(ValueType::block(metadata)))
            .attr(
                "card_payment_method_details",
                Attribute::computed(ValueType::block(card)),
            );
        let page = Schema::new()
            .attr("limit", Attribute::computed(ValueType::Int))
            .attr("offset", Attribute::computed(ValueType::Int))
            .attr("total", Attribute::computed(ValueType::Int))
            .attr("results", Attribute::computed(ValueType::blocks(transaction)));
        Schema::new()
            .attr("limit", Attribute::optional(ValueType::Int))
            .attr("offset", Attribute::optional(ValueType::Int))
            .attr("sort_direction", Attribute::optional(ValueType::String))
            .attr("sort_field", Attribute::optional(ValueType::String))
            .attr("from", Attribute::optional(ValueType::String))
            .attr("to", Attribute::optional(ValueType::String))
            .attr("id", Attribute::optional_computed(ValueType::String))
            .attr(
                "paginated_transactions",
                Attribute::computed(ValueType::block(page)),
            )
    }

    fn read<'a>(
        &'a self,
        client: &'a PnapClient,
        config: TransactionsState,
    ) -> HandlerFuture<'a, TransactionsState> {
        Box::pin(async move {
            let page = client.list_transactions(&config.query()?).await?;
            if config.id.is_empty() {
                return Ok(TransactionsState {
                    id: synthetic_id(),
                    paginated_transactions: Some(page.into()),
                    ..config
                });
            }

            let PaginatedTransactions {
                limit,
                offset,
                results,
                ..
            } = page;
            let found = find_unique(
                results,
                |transaction| transaction.id == config.id,
                format!("transactions with id {}", config.id),
            )?;
            let Some(transaction) = found else {
                return Ok(TransactionsState {
                    id: String::new(),
                    ..config
                });
            };
            Ok(TransactionsState {
                paginated_transactions: Some(PaginatedTransactionsState {
                    limit,
                    offset,
                    total: 1,
                    results: vec![transaction.into()],
                }),
                ..config
            })
        })
    }
}
