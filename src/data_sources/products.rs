//! `pnap_products` data source: queries the product catalogue.

use serde::{Deserialize, Serialize};

use crate::api::PnapClient;
use crate::api::billing::{PricingPlan, Product, ProductQuery, ServerProductMetadata};
use crate::provider::{DataSourceHandler, HandlerFuture};
use crate::schema::{Attribute, Schema, ValueType};
use crate::state::{block, non_empty, round_to, synthetic_id};

/// Decimal places kept for prices and CPU frequencies.
const PLACES: i32 = 2;

/// Price of a product under one pricing model.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct PlanState {
    /// SKU code.
    pub sku: String,
    /// SKU description.
    pub sku_description: String,
    /// Location the plan is offered in.
    pub location: String,
    /// Pricing model such as `HOURLY`.
    pub pricing_model: String,
    /// Plan price, rounded to cents.
    pub price: f64,
    /// Unit the price applies to.
    pub price_unit: String,
    /// Product code the plan applies to.
    pub correlated_product_code: String,
    /// Package size.
    pub package_quantity: f64,
    /// Package unit.
    pub package_unit: String,
}

impl From<PricingPlan> for PlanState {
    fn from(plan: PricingPlan) -> Self {
        Self {
            sku: plan.sku,
            sku_description: plan.sku_description.unwrap_or_default(),
            location: plan.location,
            pricing_model: plan.pricing_model,
            price: round_to(plan.price, PLACES),
            price_unit: plan.price_unit,
            correlated_product_code: plan.correlated_product_code.unwrap_or_default(),
            package_quantity: plan.package_quantity.unwrap_or_default(),
            package_unit: plan.package_unit.unwrap_or_default(),
        }
    }
}

/// Hardware of a server product.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ProductMetadataState {
    /// Memory in GB.
    pub ram_in_gb: f64,
    /// CPU model.
    pub cpu: String,
    /// Number of CPUs.
    pub cpu_count: f64,
    /// Cores per CPU.
    pub cores_per_cpu: f64,
    /// CPU frequency in GHz, rounded to two places.
    pub cpu_frequency: f64,
    /// Network capacity.
    pub network: String,
    /// Storage description.
    pub storage: String,
}

impl From<ServerProductMetadata> for ProductMetadataState {
    fn from(metadata: ServerProductMetadata) -> Self {
        Self {
            ram_in_gb: metadata.ram_in_gb,
            cpu: metadata.cpu,
            cpu_count: metadata.cpu_count,
            cores_per_cpu: metadata.cores_per_cpu,
            cpu_frequency: round_to(metadata.cpu_frequency, PLACES),
            network: metadata.network,
            storage: metadata.storage,
        }
    }
}

/// Catalogue entry.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ProductState {
    /// Product code.
    pub product_code: String,
    /// Product category.
    pub product_category: String,
    /// Pricing plans.
    pub plans: Vec<PlanState>,
    /// Hardware details for server products.
    #[serde(with = "block")]
    pub metadata: Option<ProductMetadataState>,
}

impl From<Product> for ProductState {
    fn from(product: Product) -> Self {
        Self {
            product_code: product.product_code,
            product_category: product.product_category,
            plans: product.plans.into_iter().map(Into::into).collect(),
            metadata: product.metadata.map(Into::into),
        }
    }
}

/// Filters and results of a catalogue query.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ProductsState {
    /// Synthetic identifier.
    pub id: String,
    /// Product code.
    pub product_code: String,
    /// Product category.
    pub product_category: String,
    /// SKU code.
    pub sku_code: String,
    /// Only plans in this location.
    pub location: String,
    /// Matching products.
    pub products: Vec<ProductState>,
}

/// Handler for the `pnap_products` data source.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProductsDataSource;

impl DataSourceHandler for ProductsDataSource {
    type State = ProductsState;

    const TYPE_NAME: &'static str = "pnap_products";

    fn schema(&self) -> Schema {
        let plan = Schema::new()
            .attr("sku", Attribute::computed(ValueType::String))
            .attr("sku_description", Attribute::computed(ValueType::String))
            .attr("location", Attribute::computed(ValueType::String))
            .attr("pricing_model", Attribute::computed(ValueType::String))
            .attr("price", Attribute::computed(ValueType::Float))
            .attr("price_unit", Attribute::computed(ValueType::String))
            .attr("correlated_product_code", Attribute::computed(ValueType::String))
            .attr("package_quantity", Attribute::computed(ValueType::Float))
            .attr("package_unit", Attribute::computed(ValueType::String));
        let metadata = Schema::new()
            .attr("ram_in_gb", Attribute::computed(ValueType::Float))
            .attr("cpu", Attribute::computed(ValueType::String))
            .attr("cpu_count", Attribute::computed(ValueType::Float))
            .attr("cores_per_cpu", Attribute::computed(ValueType::Float))
            .attr("cpu_frequency", Attribute::computed(ValueType::Float))
            .attr("network", Attribute::computed(ValueType::String))
            .attr("storage", Attribute::computed(ValueType::String));
        let product = Schema::new()
            .attr("product_code", Attribute::computed(ValueType::String))
            .attr("product_category", Attribute::computed(ValueType::String))
            .attr("plans", Attribute::computed(ValueType::blocks(plan)))
            .attr("metadata", Attribute::computed(ValueType::block(metadata)));
        Schema::new()
            .attr("product_code", Attribute::optional(ValueType::String))
            .attr("product_category", Attribute::optional(ValueType::String))
            .attr("sku_code", Attribute::optional(ValueType::String))
            .attr("location", Attribute::optional(ValueType::String))
            .attr("products", Attribute::computed(ValueType::blocks(product)))
    }

    fn read<'a>(
        &'a self,
        client: &'a PnapClient,
        config: ProductsState,
    ) -> HandlerFuture<'a, ProductsState> {
        Box::pin(async move {
            let query = ProductQuery {
                product_code: non_empty(&config.product_code),
                product_category: non_empty(&config.product_category),
                sku_code: non_empty(&config.sku_code),
                location: non_empty(&config.location),
            };
            let products = client.list_products(&query).await?;
            Ok(ProductsState {
                id: synthetic_id(),
                products: products.into_iter().map(Into::into).collect(),
                ..config
            })
        })
    }
}
