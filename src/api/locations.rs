//! Location catalogue service.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use super::{ApiError, ApiRequest, Method, PnapClient, Service};

/// Location record.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Location {
    /// Location code.
    pub location: String,
    /// Human readable location name.
    pub location_description: Option<String>,
    /// Product categories.
    pub product_categories: Vec<ProductCategory>,
}

/// Product category offered in a location.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductCategory {
    /// Product category.
    pub product_category: String,
    /// Human readable category name.
    pub product_category_description: Option<String>,
}

/// Raised when a filter value is not a known enum member.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnknownValue {
    kind: &'static str,
    value: String,
}

impl fmt::Display for UnknownValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a valid value for {}", self.value, self.kind)
    }
}

impl std::error::Error for UnknownValue {}

macro_rules! api_enum {
    (
        $(#[$meta:meta])* $name:ident, $kind:literal,
        { $($variant:ident => $wire:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Eq, PartialEq)]
        pub enum $name {
            $(
                #[doc = $wire]
                $variant,
            )+
        }

        impl $name {
            /// Wire representation.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownValue;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($wire => Ok(Self::$variant),)+
                    _ => Err(UnknownValue {
                        kind: $kind,
                        value: value.to_owned(),
                    }),
                }
            }
        }
    };
}

api_enum!(
    /// Data centre location codes.
    LocationCode, "LocationEnum", {
        Phx => "PHX",
        Ash => "ASH",
        Sgp => "SGP",
        Nld => "NLD",
        Chi => "CHI",
        Sea => "SEA",
        Aus => "AUS",
        Global => "GLOBAL",
    }
);

api_enum!(
    /// Product category codes.
    ProductCategoryCode, "ProductCategoryEnum", {
        Server => "SERVER",
        Bandwidth => "BANDWIDTH",
        OperatingSystem => "OPERATING_SYSTEM",
        PublicIp => "PUBLIC_IP",
        Storage => "STORAGE",
    }
);

impl PnapClient {
    /// Lists locations, optionally filtered.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn list_locations(
        &self,
        location: Option<LocationCode>,
        product_category: Option<ProductCategoryCode>,
    ) -> Result<Vec<Location>, ApiError> {
        let call = ApiRequest::new(Service::Locations, Method::Get, "locations")
            .query_opt("location", location.map(LocationCode::as_str))
            .query_opt(
                "productCategory",
                product_category.map(ProductCategoryCode::as_str),
            );
        self.call(call).await
    }
}
