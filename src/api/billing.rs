//! Billing service: reservations, products and product availability.

use serde::{Deserialize, Serialize};

use super::{ApiError, ApiRequest, Method, PnapClient, Service};

/// Reserved quantity of a product.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Quantity {
    /// Reserved amount.
    pub quantity: f64,
    /// Unit of measure.
    pub unit: String,
}

/// Reservation record.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Reservation {
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
    /// Reservation state.
    pub reservation_state: Option<String>,
    /// Invoicing model for the first period.
    pub initial_invoice_model: Option<String>,
    /// Reserved quantity.
    pub quantity: Option<Quantity>,
    /// Start of the reservation term.
    pub start_date_time: String,
    /// End of the reservation term.
    pub end_date_time: Option<String>,
    /// Last renewal.
    pub last_renewal_date_time: Option<String>,
    /// Next renewal.
    pub next_renewal_date_time: Option<String>,
    /// Whether the reservation renews automatically.
    pub auto_renew: bool,
    /// SKU code.
    pub sku: String,
    /// Reservation price.
    pub price: f64,
    /// Unit the price applies to.
    pub price_unit: String,
    /// Resource the record is assigned to, if any.
    pub assigned_resource_id: Option<String>,
    /// Next billing date.
    pub next_billing_date: Option<String>,
}

/// Body naming the SKU to reserve or convert to.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReservationSku {
    /// SKU to reserve or convert to.
    pub sku: String,
}

/// Body of the auto-renew disable action.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AutoRenewDisable {
    /// Reason recorded when auto-renew is disabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_renew_disable_reason: Option<String>,
}

/// Product catalogue entry.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Product {
    /// Product code.
    pub product_code: String,
    /// Product category.
    pub product_category: String,
    /// Pricing plans.
    pub plans: Vec<PricingPlan>,
    /// Hardware details for server products.
    pub metadata: Option<ServerProductMetadata>,
}

/// Price of a product under one pricing model.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PricingPlan {
    /// SKU code.
    pub sku: String,
    /// SKU description.
    pub sku_description: Option<String>,
    /// Location the plan is offered in.
    pub location: String,
    /// Pricing model such as `HOURLY`.
    pub pricing_model: String,
    /// Plan price.
    pub price: f64,
    /// Unit the price applies to.
    pub price_unit: String,
    /// Product code the plan applies to.
    pub correlated_product_code: Option<String>,
    /// Package size.
    pub package_quantity: Option<f64>,
    /// Package unit.
    pub package_unit: Option<String>,
}

/// Hardware description of server products.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerProductMetadata {
    /// Memory in GB.
    pub ram_in_gb: f64,
    /// CPU model.
    pub cpu: String,
    /// Number of CPUs.
    pub cpu_count: f64,
    /// Cores per CPU.
    pub cores_per_cpu: f64,
    /// CPU frequency in GHz.
    pub cpu_frequency: f64,
    /// Network capacity.
    pub network: String,
    /// Storage description.
    pub storage: String,
}

/// Filters of the product catalogue query.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProductQuery {
    /// Product code.
    pub product_code: Option<String>,
    /// Product category.
    pub product_category: Option<String>,
    /// SKU code.
    pub sku_code: Option<String>,
    /// Only plans in this location.
    pub location: Option<String>,
}

/// Availability of one product.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductAvailability {
    /// Product code.
    pub product_code: String,
    /// Product category.
    pub product_category: String,
    /// Availability per location.
    pub location_availability_details: Vec<LocationAvailabilityDetail>,
}

/// Availability of a product in one location.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct LocationAvailabilityDetail {
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

/// Filters of the availability query.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProductAvailabilityQuery {
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
    pub min_quantity: Option<f64>,
}

impl PnapClient {
    /// Lists reservations.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn list_reservations(&self) -> Result<Vec<Reservation>, ApiError> {
        self.call(ApiRequest::new(Service::Billing, Method::Get, "reservations"))
            .await
    }

    /// Fetches one reservation.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn get_reservation(&self, id: &str) -> Result<Reservation, ApiError> {
        let path = format!("reservations/{id}");
        self.call(ApiRequest::new(Service::Billing, Method::Get, path))
            .await
    }

    /// Reserves a SKU.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn create_reservation(
        &self,
        request: &ReservationSku,
    ) -> Result<Reservation, ApiError> {
        let call = ApiRequest::new(Service::Billing, Method::Post, "reservations").json(request)?;
        self.call(call).await
    }

    /// Converts a reservation to another SKU.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn convert_reservation(
        &self,
        id: &str,
        request: &ReservationSku,
    ) -> Result<Reservation, ApiError> {
        let path = format!("reservations/{id}/actions/convert");
        let call = ApiRequest::new(Service::Billing, Method::Post, path).json(request)?;
        self.call(call).await
    }

    /// Turns automatic renewal off.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn disable_reservation_auto_renew(
        &self,
        id: &str,
        request: &AutoRenewDisable,
    ) -> Result<Reservation, ApiError> {
        let path = format!("reservations/{id}/actions/auto-renew/disable");
        let call = ApiRequest::new(Service::Billing, Method::Post, path).json(request)?;
        self.call(call).await
    }

    /// Turns automatic renewal on.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn enable_reservation_auto_renew(&self, id: &str) -> Result<Reservation, ApiError> {
        let path = format!("reservations/{id}/actions/auto-renew/enable");
        self.call(ApiRequest::new(Service::Billing, Method::Post, path))
            .await
    }

    /// Queries the product catalogue.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn list_products(&self, query: &ProductQuery) -> Result<Vec<Product>, ApiError> {
        let call = ApiRequest::new(Service::Billing, Method::Get, "products")
            .query_opt("productCode", query.product_code.as_deref())
            .query_opt("productCategory", query.product_category.as_deref())
            .query_opt("skuCode", query.sku_code.as_deref())
            .query_opt("location", query.location.as_deref());
        self.call(call).await
    }

    /// Queries product availability.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn list_product_availability(
        &self,
        query: &ProductAvailabilityQuery,
    ) -> Result<Vec<ProductAvailability>, ApiError> {
        let call = ApiRequest::new(Service::Billing, Method::Get, "product-availability")
            .query_all("productCategory", &query.product_category)
            .query_all("productCode", &query.product_code)
            .query(
                "showOnlyMinQuantityAvailable",
                query.show_only_min_quantity_available,
            )
            .query_all("location", &query.location)
            .query_all("solution", &query.solution)
            .query_opt("minQuantity", query.min_quantity);
        self.call(call).await
    }
}
