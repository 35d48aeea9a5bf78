//! Declarative attribute metadata for resources and data sources.
//!
//! Schemas are exported to the host verbatim (`pnap-provider schema`) and
//! used locally to fill defaults and reject malformed configuration before
//! any API call is made.

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Scalar or nested element of a collection attribute.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Element {
    /// String element.
    String,
    /// Integer element.
    Int,
    /// Floating point element.
    Float,
    /// Boolean element.
    Bool,
    /// Nested block.
    Block(Schema),
}

/// Type of an attribute.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    /// UTF-8 string.
    String,
    /// 64-bit integer.
    Int,
    /// 64-bit float.
    Float,
    /// Boolean.
    Bool,
    /// Ordered collection.
    List {
        /// Element type.
        element: Element,
        /// Upper bound on the number of elements.
        #[serde(skip_serializing_if = "Option::is_none")]
        max_items: Option<usize>,
    },
    /// Unordered collection of unique elements.
    Set {
        /// Element type.
        element: Element,
    },
}

impl ValueType {
    /// List of strings.
    #[must_use]
    pub const fn string_list() -> Self {
        Self::List {
            element: Element::String,
            max_items: None,
        }
    }

    /// Set of strings.
    #[must_use]
    pub const fn string_set() -> Self {
        Self::Set {
            element: Element::String,
        }
    }

    /// List of nested blocks.
    #[must_use]
    pub const fn blocks(schema: Schema) -> Self {
        Self::List {
            element: Element::Block(schema),
            max_items: None,
        }
    }

    /// At most one nested block.
    #[must_use]
    pub const fn block(schema: Schema) -> Self {
        Self::List {
            element: Element::Block(schema),
            max_items: Some(1),
        }
    }

    const fn describe(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "integer",
            Self::Float => "number",
            Self::Bool => "boolean",
            Self::List { .. } => "list",
            Self::Set { .. } => "set",
        }
    }
}

/// Who supplies an attribute's value.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Must be set in configuration.
    Required,
    /// May be set in configuration.
    Optional,
    /// Set by the provider only.
    Computed,
    /// May be set in configuration, otherwise filled by the provider.
    OptionalComputed,
}

/// Metadata of one attribute.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Attribute {
    /// Attribute type.
    #[serde(rename = "type")]
    pub value_type: ValueType,
    /// Configuration mode.
    pub mode: Mode,
    /// Hide the value from plans and logs.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub sensitive: bool,
    /// Deprecation notice.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<&'static str>,
    /// Value used when configuration omits the attribute.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Attributes that may not be set together with this one.
    #[serde(skip_serializing_if = "no_conflicts")]
    pub conflicts_with: &'static [&'static str],
}

const fn no_conflicts(others: &&'static [&'static str]) -> bool {
    others.is_empty()
}

impl Attribute {
    const fn with_mode(value_type: ValueType, mode: Mode) -> Self {
        Self {
            value_type,
            mode,
            sensitive: false,
            deprecated: None,
            default: None,
            conflicts_with: &[],
        }
    }

    /// Required attribute.
    #[must_use]
    pub const fn required(value_type: ValueType) -> Self {
        Self::with_mode(value_type, Mode::Required)
    }

    /// Optional attribute.
    #[must_use]
    pub const fn optional(value_type: ValueType) -> Self {
        Self::with_mode(value_type, Mode::Optional)
    }

    /// Provider-populated attribute.
    #[must_use]
    pub const fn computed(value_type: ValueType) -> Self {
        Self::with_mode(value_type, Mode::Computed)
    }

    /// Optional attribute the provider fills when absent.
    #[must_use]
    pub const fn optional_computed(value_type: ValueType) -> Self {
        Self::with_mode(value_type, Mode::OptionalComputed)
    }

    /// Marks the attribute sensitive.
    #[must_use]
    pub const fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    /// Declares a default value.
    #[must_use]
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Declares conflicting sibling attributes.
    #[must_use]
    pub const fn conflicts_with(mut self, others: &'static [&'static str]) -> Self {
        self.conflicts_with = others;
        self
    }

    /// Marks the attribute deprecated.
    #[must_use]
    pub const fn deprecated(mut self, message: &'static str) -> Self {
        self.deprecated = Some(message);
        self
    }
}

/// Attribute table of a resource, data source or nested block.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Schema {
    attributes: BTreeMap<&'static str, Attribute>,
}

/// Per-operation timeouts declared by a resource.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct OperationTimeouts {
    /// Create budget.
    #[serde(with = "seconds")]
    pub create: Duration,
    /// Update budget.
    #[serde(with = "seconds")]
    pub update: Duration,
    /// Delete budget.
    #[serde(with = "seconds")]
    pub delete: Duration,
}

impl Default for OperationTimeouts {
    fn default() -> Self {
        Self {
            create: Duration::from_secs(100 * 60),
            update: Duration::from_secs(100 * 60),
            delete: Duration::from_secs(15 * 60),
        }
    }
}

mod seconds {
    use std::time::Duration;

    use serde::Serializer;

    pub(super) fn serialize<S: Serializer>(
        value: &Duration,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }
}

/// Errors raised while checking configuration against a schema.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum SchemaError {
    /// Raised when the configuration is not an object.
    #[error("{path}: expected an object")]
    NotAnObject {
        /// Attribute path, empty at the root.
        path: String,
    },
    /// Raised when a required attribute is absent.
    #[error("{path}: required attribute is missing")]
    MissingRequired {
        /// Attribute path.
        path: String,
    },
    /// Raised when two conflicting attributes are both set.
    #[error("{path}: conflicts with {other}")]
    Conflict {
        /// Attribute path.
        path: String,
        /// Conflicting sibling.
        other: String,
    },
    /// Raised when configuration names an undeclared attribute.
    #[error("{path}: unknown attribute")]
    UnknownAttribute {
        /// Attribute path.
        path: String,
    },
    /// Raised when a value has the wrong type.
    #[error("{path}: expected {expected}")]
    TypeMismatch {
        /// Attribute path.
        path: String,
        /// Expected type.
        expected: &'static str,
    },
    /// Raised when a collection exceeds its bound.
    #[error("{path}: at most {max} item(s) allowed")]
    TooManyItems {
        /// Attribute path.
        path: String,
        /// Declared bound.
        max: usize,
    },
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_owned()
    } else {
        format!("{prefix}.{key}")
    }
}

fn is_set(value: Option<&Value>) -> bool {
    matches!(value, Some(inner) if !inner.is_null())
}

impl Schema {
    /// Creates an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an attribute.
    #[must_use]
    pub fn attr(mut self, name: &'static str, attribute: Attribute) -> Self {
        self.attributes.insert(name, attribute);
        self
    }

    /// Looks up an attribute.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// Iterates over attributes in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Attribute)> {
        self.attributes.iter().map(|(name, attr)| (*name, attr))
    }

    /// Checks `value` against the schema.
    ///
    /// # Errors
    ///
    /// Returns the first [`SchemaError`] found, walking attributes in name
    /// order.
    pub fn validate(&self, value: &Value) -> Result<(), SchemaError> {
        self.validate_at("", value)
    }

    fn validate_at(&self, path: &str, value: &Value) -> Result<(), SchemaError> {
        let empty = Map::new();
        let object = match value {
            Value::Object(object) => object,
            Value::Null => &empty,
            _ => {
                return Err(SchemaError::NotAnObject {
                    path: path.to_owned(),
                });
            }
        };

        if let Some(key) = object.keys().find(|key| !self.attributes.contains_key(key.as_str())) {
            return Err(SchemaError::UnknownAttribute {
                path: join(path, key),
            });
        }

        for (name, attribute) in &self.attributes {
            let attr_path = join(path, name);
            let current = object.get(*name);
            if !is_set(current) {
                if attribute.mode == Mode::Required {
                    return Err(SchemaError::MissingRequired { path: attr_path });
                }
                continue;
            }
            if let Some(other) = attribute
                .conflicts_with
                .iter()
                .find(|other| is_set(object.get(**other)))
            {
                return Err(SchemaError::Conflict {
                    path: attr_path,
                    other: (*other).to_owned(),
                });
            }
            if let Some(inner) = current {
                check_type(&attr_path, &attribute.value_type, inner)?;
            }
        }
        Ok(())
    }

    /// Fills declared defaults for absent attributes, recursing into nested
    /// blocks that are present.
    pub fn apply_defaults(&self, value: &mut Value) {
        if value.is_null() {
            *value = Value::Object(Map::new());
        }
        let Value::Object(object) = value else {
            return;
        };
        for (name, attribute) in &self.attributes {
            if let Some(default) = &attribute.default {
                if !is_set(object.get(*name)) {
                    object.insert((*name).to_owned(), default.clone());
                }
            }
            let nested = match &attribute.value_type {
                ValueType::List {
                    element: Element::Block(schema),
                    ..
                }
                | ValueType::Set {
                    element: Element::Block(schema),
                } => schema,
                _ => continue,
            };
            if let Some(Value::Array(items)) = object.get_mut(*name) {
                for item in items.iter_mut().filter(|item| item.is_object()) {
                    nested.apply_defaults(item);
                }
            }
        }
    }
}

fn check_element(path: &str, element: &Element, value: &Value) -> Result<(), SchemaError> {
    let scalar = match element {
        Element::Block(schema) => return schema.validate_at(path, value),
        Element::String => ValueType::String,
        Element::Int => ValueType::Int,
        Element::Float => ValueType::Float,
        Element::Bool => ValueType::Bool,
    };
    check_type(path, &scalar, value)
}

fn check_type(path: &str, value_type: &ValueType, value: &Value) -> Result<(), SchemaError> {
    let matches = match value_type {
        ValueType::String => value.is_string(),
        ValueType::Int => value.is_i64() || value.is_u64(),
        ValueType::Float => value.is_number(),
        ValueType::Bool => value.is_boolean(),
        ValueType::List { element, max_items } => {
            let Value::Array(items) = value else {
                return Err(SchemaError::TypeMismatch {
                    path: path.to_owned(),
                    expected: value_type.describe(),
                });
            };
            if let Some(max) = *max_items {
                if items.len() > max {
                    return Err(SchemaError::TooManyItems {
                        path: path.to_owned(),
                        max,
                    });
                }
            }
            return check_items(path, element, items);
        }
        ValueType::Set { element } => {
            let Value::Array(items) = value else {
                return Err(SchemaError::TypeMismatch {
                    path: path.to_owned(),
                    expected: value_type.describe(),
                });
            };
            return check_items(path, element, items);
        }
    };
    if matches {
        Ok(())
    } else {
        Err(SchemaError::TypeMismatch {
            path: path.to_owned(),
            expected: value_type.describe(),
        })
    }
}

fn check_items(path: &str, element: &Element, items: &[Value]) -> Result<(), SchemaError> {
    items
        .iter()
        .enumerate()
        .try_for_each(|(index, item)| check_element(&format!("{path}.{index}"), element, item))
}
