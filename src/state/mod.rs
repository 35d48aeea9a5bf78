//! Helpers shared by the typed state of resources and data sources.

#[cfg(test)]
mod tests;

use std::fmt::Display;

use serde_json::Value;

use crate::provider::ProviderError;

/// Serde adapter for max-one nested blocks.
///
/// The host models such blocks as lists holding zero or one element; the
/// typed state holds an `Option<T>`.
pub mod block {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Writes `Some(v)` as `[v]` and `None` as `[]`.
    ///
    /// # Errors
    ///
    /// Propagates serializer failures.
    pub fn serialize<S, T>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        value
            .as_ref()
            .map_or(&[][..], std::slice::from_ref)
            .serialize(serializer)
    }

    /// Reads the first element of a list; `null` and `[]` become `None`.
    ///
    /// # Errors
    ///
    /// Propagates deserializer failures.
    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        let items = Option::<Vec<T>>::deserialize(deserializer)?;
        Ok(items.and_then(|list| list.into_iter().next()))
    }
}

/// Rounds `value` to `places` decimal places, half away from zero.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "prices and amounts are reported by the API as floats"
)]
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10_f64.powi(places);
    (value * factor).round() / factor
}

/// Picks the single record matching `predicate`.
///
/// Returns `Ok(None)` when nothing matches.
///
/// # Errors
///
/// Returns [`ProviderError::Lookup`] reading `too many <subject> (found N,
/// expected 1)` when more than one record matches.
pub fn find_unique<T, P>(
    records: Vec<T>,
    predicate: P,
    subject: impl Display,
) -> Result<Option<T>, ProviderError>
where
    P: FnMut(&T) -> bool,
{
    let mut matches: Vec<T> = records.into_iter().filter(predicate).collect();
    if matches.len() > 1 {
        return Err(ProviderError::Lookup {
            message: format!(
                "too many {subject} (found {}, expected 1)",
                matches.len()
            ),
        });
    }
    Ok(matches.pop())
}

/// Removes `null` members from objects, recursively.
///
/// Typed state structs fall back to defaults for absent fields; hosts send
/// unset attributes as `null`.
pub fn prune_nulls(value: &mut Value) {
    match value {
        Value::Object(object) => {
            object.retain(|_, member| !member.is_null());
            object.values_mut().for_each(prune_nulls);
        }
        Value::Array(items) => items.iter_mut().for_each(prune_nulls),
        _ => {}
    }
}

/// Returns `Some` for non-empty strings.
#[must_use]
pub fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_owned())
    }
}

/// Current unix time in seconds, used as the identifier of query data
/// sources.
#[must_use]
pub fn synthetic_id() -> String {
    chrono::Utc::now().timestamp().to_string()
}
