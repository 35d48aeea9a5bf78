//! `pnap_invoices` data source: queries invoices and optionally saves their
//! PDFs.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8::Dir};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{positive, timestamp_filter};
use crate::api::PnapClient;
use crate::api::invoicing::{Invoice, InvoiceQuery, PaginatedInvoices};
use crate::provider::{DataSourceHandler, HandlerFuture, ProviderError};
use crate::schema::{Attribute, Schema, ValueType};
use crate::state::{block, find_unique, non_empty, round_to, synthetic_id};

const AMOUNT_PLACES: i32 = 2;

/// Invoice record.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct InvoiceState {
    /// Identifier.
    pub id: String,
    /// Invoice number.
    pub number: String,
    /// ISO currency code.
    pub currency: String,
    /// Invoiced amount, rounded to cents.
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

impl From<Invoice> for InvoiceState {
    fn from(invoice: Invoice) -> Self {
        Self {
            id: invoice.id,
            number: invoice.number,
            currency: invoice.currency,
            amount: round_to(invoice.amount, AMOUNT_PLACES),
            outstanding_amount: round_to(invoice.outstanding_amount, AMOUNT_PLACES),
            status: invoice.status,
            sent_on: invoice.sent_on,
            due_date: invoice.due_date,
        }
    }
}

/// One page of invoices.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct PaginatedInvoicesState {
    /// Page size.
    pub limit: i64,
    /// Records skipped before this page.
    pub offset: i64,
    /// Total number of matching records.
    pub total: i64,
    /// Records on this page.
    pub results: Vec<InvoiceState>,
}

impl From<PaginatedInvoices> for PaginatedInvoicesState {
    fn from(page: PaginatedInvoices) -> Self {
        Self {
            limit: page.limit,
            offset: page.offset,
            total: page.total,
            results: page.results.into_iter().map(Into::into).collect(),
        }
    }
}

/// Filters and results of an invoice query.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct InvoicesState {
    /// Invoice to look up; synthetic when listing.
    pub id: String,
    /// Invoice number filter.
    pub number: String,
    /// Invoice status filter.
    pub status: String,
    /// Lower bound on the sent date.
    pub sent_on_from: String,
    /// Upper bound on the sent date.
    pub sent_on_to: String,
    /// Maximum number of invoices.
    pub limit: i64,
    /// Number of records to skip.
    pub offset: i64,
    /// Field to sort by.
    pub sort_field: String,
    /// Sort direction.
    pub sort_direction: String,
    /// Folder prefix where invoice PDFs are written.
    pub pdf_folder_path: String,
    /// Page of matching invoices.
    #[serde(with = "block")]
    pub paginated_invoices: Option<PaginatedInvoicesState>,
}

impl InvoicesState {
    fn query(&self) -> Result<InvoiceQuery, ProviderError> {
        Ok(InvoiceQuery {
            number: non_empty(&self.number),
            status: non_empty(&self.status),
            sent_on_from: timestamp_filter("sent_on_from", &self.sent_on_from)?,
            sent_on_to: timestamp_filter("sent_on_to", &self.sent_on_to)?,
            limit: positive(self.limit),
            offset: positive(self.offset),
            sort_field: non_empty(&self.sort_field),
            sort_direction: non_empty(&self.sort_direction),
        })
    }
}

fn io_error(path: &Utf8Path) -> impl FnOnce(std::io::Error) -> ProviderError + '_ {
    move |err| ProviderError::Io {
        path: path.to_string(),
        message: err.to_string(),
    }
}

/// Writes `<folder><number>.pdf`. The folder is used as a plain prefix, so
/// it normally ends with a separator.
fn write_pdf(folder: &str, number: &str, contents: &[u8]) -> Result<Utf8PathBuf, ProviderError> {
    let path = Utf8PathBuf::from(format!("{folder}{number}.pdf"));
    let parent = path
        .parent()
        .filter(|dir| !dir.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let file_name = path.file_name().ok_or_else(|| ProviderError::Io {
        path: path.to_string(),
        message: String::from("invoice path is missing a filename"),
    })?;
    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(io_error(parent))?;
    dir.write(file_name, contents).map_err(io_error(&path))?;
    Ok(path)
}

/// Handler for the `pnap_invoices` data source.
#[derive(Clone, Copy, Debug, Default)]
pub struct InvoicesDataSource;

impl InvoicesDataSource {
    async fn save_pdfs(
        client: &PnapClient,
        folder: &str,
        invoices: &[Invoice],
    ) -> Result<(), ProviderError> {
        if folder.is_empty() {
            return Ok(());
        }
        for invoice in invoices {
            let contents = client.generate_invoice_pdf(&invoice.id).await?;
            let written = write_pdf(folder, &invoice.number, &contents)?;
            info!(id = %invoice.id, path = %written, "invoice pdf saved");
        }
        Ok(())
    }
}

impl DataSourceHandler for InvoicesDataSource {
    type State = InvoicesState;

    const TYPE_NAME: &'static str = "pnap_invoices";

    fn schema(&self) -> Schema {
        let invoice = Schema::new()
            .attr("id", Attribute::computed(ValueType::String))
            .attr("number", Attribute::computed(ValueType::String))
            .attr("currency", Attribute::computed(ValueType::String))
            .attr("amount", Attribute::computed(ValueType::Float))
            .attr("outstanding_amount", Attribute::computed(ValueType::Float))
            .attr("status", Attribute::computed(ValueType::String))
            .attr("sent_on", Attribute::computed(ValueType::String))
            .attr("due_date", Attribute::computed(ValueType::String));
        let page = Schema::new()
            .attr("limit", Attribute::computed(ValueType::Int))
            .attr("offset", Attribute::computed(ValueType::Int))
            .attr("total", Attribute::computed(ValueType::Int))
            .attr("results", Attribute::computed(ValueType::blocks(invoice)));
        Schema::new()
            .attr("number", Attribute::optional(ValueType::String))
            .attr("status", Attribute::optional(ValueType::String))
            .attr("sent_on_from", Attribute::optional(ValueType::String))
            .attr("sent_on_to", Attribute::optional(ValueType::String))
            .attr("limit", Attribute::optional(ValueType::Int))
            .attr("offset", Attribute::optional(ValueType::Int))
            .attr("sort_field", Attribute::optional(ValueType::String))
            .attr("sort_direction", Attribute::optional(ValueType::String))
            .attr("id", Attribute::optional_computed(ValueType::String))
            .attr("pdf_folder_path", Attribute::optional(ValueType::String))
            .attr("paginated_invoices", Attribute::computed(ValueType::block(page)))
    }

    fn read<'a>(
        &'a self,
        client: &'a PnapClient,
        config: InvoicesState,
    ) -> HandlerFuture<'a, InvoicesState> {
        Box::pin(async move {
            let page = client.list_invoices(&config.query()?).await?;
            if config.id.is_empty() {
                Self::save_pdfs(client, &config.pdf_folder_path, &page.results).await?;
                return Ok(InvoicesState {
                    id: synthetic_id(),
                    paginated_invoices: Some(page.into()),
                    ..config
                });
            }

            let PaginatedInvoices {
                limit,
                offset,
                results,
                ..
            } = page;
            let found = find_unique(
                results,
                |invoice| invoice.id == config.id,
                format!("invoices with id {}", config.id),
            )?;
            let Some(invoice) = found else {
                return Ok(InvoicesState {
                    id: String::new(),
                    ..config
                });
            };
            Self::save_pdfs(client, &config.pdf_folder_path, std::slice::from_ref(&invoice)).await?;
            Ok(InvoicesState {
                paginated_invoices: Some(PaginatedInvoicesState {
                    limit,
                    offset,
                    total: 1,
                    results: vec![invoice.into()],
                }),
                ..config
            })
        })
    }
}
