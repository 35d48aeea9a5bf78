//! `pnap_locations` data source: lists data centre locations.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::api::PnapClient;
use crate::api::locations::{Location, LocationCode, ProductCategoryCode};
use crate::provider::{DataSourceHandler, HandlerFuture, ProviderError};
use crate::schema::{Attribute, Schema, ValueType};
use crate::state::synthetic_id;

/// Product category offered in a location.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProductCategoryState {
    /// Product category.
    pub product_category: String,
    /// Human readable category name.
    pub product_category_description: String,
}

/// Location record.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct LocationState {
    /// Location code.
    pub location: String,
    /// Human readable location name.
    pub location_description: String,
    /// Product categories.
    pub product_categories: Vec<ProductCategoryState>,
}

impl From<Location> for LocationState {
    fn from(location: Location) -> Self {
        Self {
            location: location.location,
            location_description: location.location_description.unwrap_or_default(),
            product_categories: location
                .product_categories
                .into_iter()
                .map(|category| ProductCategoryState {
                    product_category: category.product_category,
                    product_category_description: category
                        .product_category_description
                        .unwrap_or_default(),
                })
                .collect(),
        }
    }
}

/// Filters and results of a location query.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct LocationsState {
    /// Synthetic identifier.
    pub id: String,
    /// Location filter.
    pub location: String,
    /// Product category filter.
    pub product_category: String,
    /// Matching locations.
    pub locations: Vec<LocationState>,
}

/// Parses an optional enum filter, rejecting unknown values before any call.
fn parse_filter<T>(value: &str) -> Result<Option<T>, ProviderError>
where
    T: FromStr,
    T::Err: ToString,
{
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|err: T::Err| ProviderError::invalid(err.to_string()))
}

/// Handler for the `pnap_locations` data source.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocationsDataSource;

impl DataSourceHandler for LocationsDataSource {
    type State = LocationsState;

    const TYPE_NAME: &'static str = "pnap_locations";

    fn schema(&self) -> Schema {
        let category = Schema::new()
            .attr("product_category", Attribute::computed(ValueType::String))
            .attr(
                "product_category_description",
                Attribute::computed(ValueType::String),
            );
        let location = Schema::new()
            .attr("location", Attribute::computed(ValueType::String))
            .attr("location_description", Attribute::computed(ValueType::String))
            .attr(
                "product_categories",
                Attribute::computed(ValueType::blocks(category)),
            );
        Schema::new()
            .attr("location", Attribute::optional(ValueType::String))
            .attr("product_category", Attribute::optional(ValueType::String))
            .attr("locations", Attribute::computed(ValueType::blocks(location)))
    }

    fn read<'a>(
        &'a self,
        client: &'a PnapClient,
        config: LocationsState,
    ) -> HandlerFuture<'a, LocationsState> {
        Box::pin(async move {
            let location = parse_filter::<LocationCode>(&config.location)?;
            let category = parse_filter::<ProductCategoryCode>(&config.product_category)?;
            let found = client.list_locations(location, category).await?;
            Ok(LocationsState {
                id: synthetic_id(),
                locations: found.into_iter().map(Into::into).collect(),
                ..config
            })
        })
    }
}
