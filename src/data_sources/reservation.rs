//! `pnap_reservation` data source: looks up a reservation by id, SKU or
//! both.

use serde::{Deserialize, Serialize};

use crate::api::PnapClient;
use crate::api::billing::{Quantity, Reservation};
use crate::provider::{DataSourceHandler, HandlerFuture};
use crate::resources::reservation::PRICE_PLACES;
use crate::schema::{Attribute, Schema, ValueType};
use crate::state::{block, find_unique, round_to};

/// Reserved quantity.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct QuantityState {
    /// Reserved amount.
    pub quantity: f64,
    /// Unit of measure.
    pub unit: String,
}

impl From<Quantity> for QuantityState {
    fn from(quantity: Quantity) -> Self {
        Self {
            quantity: quantity.quantity,
            unit: quantity.unit,
        }
    }
}

/// Reservation as exposed by the data source.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ReservationDataState {
    /// Reservation identifier.
    pub id: String,
    /// SKU code.
    pub sku: String,
    /// Product code.
    pub product_code: String,
    /// Product category.
    pub product_category: String,
    /// Location code such as `PHX`.
    pub location: String,
    /// Reservation model.
    pub reservation_model: String,
    /// Reservation state.
    pub reservation_state: String,
    /// Invoicing model for the first period.
    pub initial_invoice_model: String,
    /// Reserved quantity.
    #[serde(with = "block")]
    pub quantity: Option<QuantityState>,
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
    /// Reservation price, rounded to five places.
    pub price: f64,
    /// Unit the price applies to.
    pub price_unit: String,
    /// Resource the record is assigned to, if any.
    pub assigned_resource_id: String,
    /// Next billing date.
    pub next_billing_date: String,
}

impl From<Reservation> for ReservationDataState {
    fn from(reservation: Reservation) -> Self {
        Self {
            id: reservation.id,
            sku: reservation.sku,
            product_code: reservation.product_code,
            product_category: reservation.product_category,
            location: reservation.location,
            reservation_model: reservation.reservation_model,
            reservation_state: reservation.reservation_state.unwrap_or_default(),
            initial_invoice_model: reservation.initial_invoice_model.unwrap_or_default(),
            quantity: reservation.quantity.map(Into::into),
            start_date_time: reservation.start_date_time,
            end_date_time: reservation.end_date_time.unwrap_or_default(),
            last_renewal_date_time: reservation.last_renewal_date_time.unwrap_or_default(),
            next_renewal_date_time: reservation.next_renewal_date_time.unwrap_or_default(),
            auto_renew: reservation.auto_renew,
            price: round_to(reservation.price, PRICE_PLACES),
            price_unit: reservation.price_unit,
            assigned_resource_id: reservation.assigned_resource_id.unwrap_or_default(),
            next_billing_date: reservation.next_billing_date.unwrap_or_default(),
        }
    }
}

/// Handler for the `pnap_reservation` data source.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReservationDataSource;

impl DataSourceHandler for ReservationDataSource {
    type State = ReservationDataState;

    const TYPE_NAME: &'static str = "pnap_reservation";

    fn schema(&self) -> Schema {
        let quantity = Schema::new()
            .attr("quantity", Attribute::computed(ValueType::Float))
            .attr("unit", Attribute::computed(ValueType::String));
        Schema::new()
            .attr("id", Attribute::optional_computed(ValueType::String))
            .attr("sku", Attribute::optional_computed(ValueType::String))
            .attr("product_code", Attribute::computed(ValueType::String))
            .attr("product_category", Attribute::computed(ValueType::String))
            .attr("location", Attribute::computed(ValueType::String))
            .attr("reservation_model", Attribute::computed(ValueType::String))
            .attr("reservation_state", Attribute::computed(ValueType::String))
            .attr("initial_invoice_model", Attribute::computed(ValueType::String))
            .attr("quantity", Attribute::computed(ValueType::block(quantity)))
            .attr("start_date_time", Attribute::computed(ValueType::String))
            .attr("end_date_time", Attribute::computed(ValueType::String))
            .attr("last_renewal_date_time", Attribute::computed(ValueType::String))
            .attr("next_renewal_date_time", Attribute::computed(ValueType::String))
            .attr("auto_renew", Attribute::computed(ValueType::Bool))
            .attr("price", Attribute::computed(ValueType::Float))
            .attr("price_unit", Attribute::computed(ValueType::String))
            .attr("assigned_resource_id", Attribute::computed(ValueType::String))
            .attr("next_billing_date", Attribute::computed(ValueType::String))
    }

    fn read<'a>(
        &'a self,
        client: &'a PnapClient,
        config: ReservationDataState,
    ) -> HandlerFuture<'a, ReservationDataState> {
        Box::pin(async move {
            let reservations = client.list_reservations().await?;
            let by_id = !config.id.is_empty();
            let by_sku = !config.sku.is_empty();
            let subject = match (by_id, by_sku) {
                (true, true) => format!(
                    "reservations with id {} and sku {}",
                    config.id, config.sku
                ),
                (false, true) => format!("reservations with sku {}", config.sku),
                _ => format!("reservations with id {}", config.id),
            };
            let found = find_unique(
                reservations,
                |reservation| {
                    (by_id || by_sku)
                        && (!by_id || reservation.id == config.id)
                        && (!by_sku || reservation.sku == config.sku)
                },
                subject,
            )?;
            Ok(found.map_or_else(
                || ReservationDataState {
                    id: String::new(),
                    ..config
                },
                ReservationDataState::from,
            ))
        })
    }
}
