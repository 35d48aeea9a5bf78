//! `pnap_product_availability` data source: queries stock per location.

use serde::{Deserialize, Serialize};

use crate::api::PnapClient;
use crate::api::billing::{
    LocationAvailabilityDetail, ProductAvailability, ProductAvailabilityQuery,
};
use crate::provider::{DataSourceHandler, HandlerFuture};
use crate::schema::{Attribute, Schema, ValueType};
use crate::state::synthetic_id;

/// Availability of a product in one location.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LocationAvailabilityState {
    /// Location code.
    pub location: String,
    /// Requested minimum quantity.
    pub min_quantity_requested: f64,
    /// Whether the requested minimum is available.
    pub min_quantity_available: bool,
    /// Quantity currently available.
    pub available_quantity: f64,
    /// Solutions offered.
    pub solutions: Vec<String>,
}

impl From<LocationAvailabilityDetail> for LocationAvailabilityState {
    fn from(detail: LocationAvailabilityDetail) -> Self {
        Self {
            location: detail.location,
            min_quantity_requested: detail.min_quantity_requested,
            min_quantity_available: detail.min_quantity_available,
            available_quantity: detail.available_quantity,
            solutions: detail.solutions,
        }
    }
}

/// Availability of one product.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ProductAvailabilityState {
    /// Product code.
    pub product_code: String,
    /// Product category.
    pub product_category: String,
    /// Availability per location.
    pub location_availability_details: Vec<LocationAvailabilityState>,
}

impl From<ProductAvailability> for ProductAvailabilityState {
    fn from(availability: ProductAvailability) -> Self {
        Self {
            product_code: availability.product_code,
            product_category: availability.product_category,
            location_availability_details: availability
                .location_availability_details
                .into_iter()
                .map(Into::into)
                .collect(),
        }
    }
}

/// Filters and results of an availability query.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AvailabilityQueryState {
    /// Synthetic identifier.
    pub id: String,
    /// Product categories to check.
    pub product_category: Vec<String>,
    /// Product codes to check.
    pub product_code: Vec<String>,
    /// Only report locations meeting the minimum quantity.
    pub show_only_min_quantity_available: bool,
    /// Locations to check.
    pub location: Vec<String>,
    /// Solutions to filter by.
    pub solution: Vec<String>,
    /// Minimum quantity wanted.
    pub min_quantity: f64,
    /// Matching availability records.
    pub product_availabilities: Vec<ProductAvailabilityState>,
}

impl AvailabilityQueryState {
    fn query(&self) -> ProductAvailabilityQuery {
        ProductAvailabilityQuery {
            product_category: self.product_category.clone(),
            product_code: self.product_code.clone(),
            show_only_min_quantity_available: self.show_only_min_quantity_available,
            location: self.location.clone(),
            solution: self.solution.clone(),
            min_quantity: (self.min_quantity > 0.0).then_some(self.min_quantity),
        }
    }
}

/// Handler for the `pnap_product_availability` data source.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProductAvailabilityDataSource;

impl DataSourceHandler for ProductAvailabilityDataSource {
    type State = AvailabilityQueryState;

    const TYPE_NAME: &'static str = "pnap_product_availability";

    fn schema(&self) -> Schema {
        let detail = Schema::new()
            .attr("location", Attribute::computed(ValueType::String))
            .attr("min_quantity_requested", Attribute::computed(ValueType::Float))
            .attr("min_quantity_available", Attribute::computed(ValueType::Bool))
            .attr("available_quantity", Attribute::computed(ValueType::Float))
            .attr("solutions", Attribute::computed(ValueType::string_list()));
        let availability = Schema::new()
            .attr("product_code", Attribute::computed(ValueType::String))
            .attr("product_category", Attribute::computed(ValueType::String))
            .attr(
                "location_availability_details",
                Attribute::computed(ValueType::blocks(detail)),
            );
        Schema::new()
            .attr("product_category", Attribute::optional(ValueType::string_set()))
            .attr("product_code", Attribute::optional(ValueType::string_set()))
            .attr(
                "show_only_min_quantity_available",
                Attribute::optional(ValueType::Bool).default(true),
            )
            .attr("location", Attribute::optional(ValueType::string_set()))
            .attr("solution", Attribute::optional(ValueType::string_set()))
            .attr("min_quantity", Attribute::optional(ValueType::Float).default(1.0))
            .attr(
                "product_availabilities",
                Attribute::computed(ValueType::blocks(availability)),
            )
    }

    fn read<'a>(
        &'a self,
        client: &'a PnapClient,
        config: AvailabilityQueryState,
    ) -> HandlerFuture<'a, AvailabilityQueryState> {
        Box::pin(async move {
            let found = client.list_product_availability(&config.query()).await?;
            Ok(AvailabilityQueryState {
                id: synthetic_id(),
                product_availabilities: found.into_iter().map(Into::into).collect(),
                ..config
            })
        })
    }
}
