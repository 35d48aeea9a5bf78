//! `pnap_reservation`: billing reservations purchased by SKU.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::PnapClient;
use crate::api::billing::{AutoRenewDisable, Reservation, ReservationSku};
use crate::provider::{HandlerFuture, ProviderError, ResourceHandler};
use crate::schema::{Attribute, Schema, ValueType};
use crate::state::{non_empty, round_to};

/// Decimal places kept for reservation prices.
pub(crate) const PRICE_PLACES: i32 = 5;

/// State of a reservation.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ReservationState {
    /// Reservation identifier.
    pub id: String,
    /// Product code.
    pub product_code: String,
    /// Product category.
    pub product_category: String,
    /// Location code such as `PHX`.
    pub location: String,
    /// Reservation model.
    pub reservation_model: String,
    /// Invoicing model for the first period.
    pub initial_invoice_model: String,
    /// Start of the reservation term.
    pub start_date_time: String,
    /// End of the reservation term.
    pub end_date_time: String,
    /// Last renewal.
    pub last_renewal_date_time: String,
    /// Next renewal.
    pub next_renewal_date_time: String,
    /// Whether the reservation renews automatically.
    pub auto_renew: bool,
    /// SKU code.
    pub sku: String,
    /// Reservation price, rounded to five places.
    pub price: f64,
    /// Unit the price applies to.
    pub price_unit: String,
    /// Resource the record is assigned to, if any.
    pub assigned_resource_id: String,
    /// Next billing date.
    pub next_billing_date: String,
    /// Reason recorded when auto-renew is disabled.
    pub auto_renew_disable_reason: String,
}

impl ReservationState {
    fn flatten(reservation: Reservation, auto_renew_disable_reason: String) -> Self {
        Self {
            id: reservation.id,
            product_code: reservation.product_code,
            product_category: reservation.product_category,
            location: reservation.location,
            reservation_model: reservation.reservation_model,
            initial_invoice_model: reservation.initial_invoice_model.unwrap_or_default(),
            start_date_time: reservation.start_date_time,
            end_date_time: reservation.end_date_time.unwrap_or_default(),
            last_renewal_date_time: reservation.last_renewal_date_time.unwrap_or_default(),
            next_renewal_date_time: reservation.next_renewal_date_time.unwrap_or_default(),
            auto_renew: reservation.auto_renew,
            sku: reservation.sku,
            price: round_to(reservation.price, PRICE_PLACES),
            price_unit: reservation.price_unit,
            assigned_resource_id: reservation.assigned_resource_id.unwrap_or_default(),
            next_billing_date: reservation.next_billing_date.unwrap_or_default(),
            auto_renew_disable_reason,
        }
    }
}

/// Handler for `pnap_reservation`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReservationResource;

impl ReservationResource {
    async fn refresh(
        client: &PnapClient,
        id: &str,
        reason: String,
    ) -> Result<ReservationState, ProviderError> {
        let reservation = client.get_reservation(id).await?;
        Ok(ReservationState::flatten(reservation, reason))
    }
}

impl ResourceHandler for ReservationResource {
    type State = ReservationState;

    const TYPE_NAME: &'static str = "pnap_reservation";

    fn schema(&self) -> Schema {
        Schema::new()
            .attr("product_code", Attribute::computed(ValueType::String))
            .attr("product_category", Attribute::computed(ValueType::String))
            .attr("location", Attribute::computed(ValueType::String))
            .attr("reservation_model", Attribute::computed(ValueType::String))
            .attr("initial_invoice_model", Attribute::computed(ValueType::String))
            .attr("start_date_time", Attribute::computed(ValueType::String))
            .attr("end_date_time", Attribute::computed(ValueType::String))
            .attr("last_renewal_date_time", Attribute::computed(ValueType::String))
            .attr("next_renewal_date_time", Attribute::computed(ValueType::String))
            .attr("auto_renew", Attribute::optional_computed(ValueType::Bool))
            .attr("sku", Attribute::required(ValueType::String))
            .attr("price", Attribute::computed(ValueType::Float))
            .attr("price_unit", Attribute::computed(ValueType::String))
            .attr("assigned_resource_id", Attribute::computed(ValueType::String))
            .attr("next_billing_date", Attribute::computed(ValueType::String))
            .attr(
                "auto_renew_disable_reason",
                Attribute::optional(ValueType::String).default(""),
            )
    }

    fn create<'a>(
        &'a self,
        client: &'a PnapClient,
        plan: ReservationState,
    ) -> HandlerFuture<'a, ReservationState> {
        Box::pin(async move {
            let request = ReservationSku { sku: plan.sku };
            let created = client.create_reservation(&request).await?;
            info!(resource = Self::TYPE_NAME, id = %created.id, "reservation purchased");
            Self::refresh(client, &created.id, plan.auto_renew_disable_reason).await
        })
    }

    fn read<'a>(
        &'a self,
        client: &'a PnapClient,
        prior: ReservationState,
    ) -> HandlerFuture<'a, ReservationState> {
        Box::pin(async move {
            Self::refresh(client, &prior.id, prior.auto_renew_disable_reason).await
        })
    }

    fn update<'a>(
        &'a self,
        client: &'a PnapClient,
        prior: ReservationState,
        plan: ReservationState,
    ) -> HandlerFuture<'a, ReservationState> {
        Box::pin(async move {
            let id = if plan.sku != prior.sku {
                let request = ReservationSku {
                    sku: plan.sku.clone(),
                };
                let converted = client.convert_reservation(&prior.id, &request).await?;
                info!(
                    resource = Self::TYPE_NAME,
                    from = %prior.id,
                    to = %converted.id,
                    "reservation converted"
                );
                converted.id
            } else if plan.auto_renew != prior.auto_renew {
                if plan.auto_renew {
                    client.enable_reservation_auto_renew(&prior.id).await?;
                } else {
                    let request = AutoRenewDisable {
                        auto_renew_disable_reason: non_empty(&plan.auto_renew_disable_reason),
                    };
                    client
                        .disable_reservation_auto_renew(&prior.id, &request)
                        .await?;
                }
                prior.id
            } else {
                return Err(ProviderError::UnsupportedAction);
            };
            Self::refresh(client, &id, plan.auto_renew_disable_reason).await
        })
    }

    fn delete<'a>(
        &'a self,
        _client: &'a PnapClient,
        _prior: ReservationState,
    ) -> HandlerFuture<'a, ()> {
        Box::pin(async { Err(ProviderError::UnsupportedAction) })
    }
}
