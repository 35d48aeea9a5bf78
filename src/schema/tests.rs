//! Tests for schema validation and defaults.

use rstest::{fixture, rstest};
use serde_json::json;

use super::*;

#[fixture]
fn ip_block_like() -> Schema {
    Schema::new()
        .attr("location", Attribute::required(ValueType::String))
        .attr("cidr_block_size", Attribute::required(ValueType::String))
        .attr("description", Attribute::optional(ValueType::String))
        .attr("status", Attribute::computed(ValueType::String))
        .attr(
            "tags",
            Attribute::optional(ValueType::blocks(
                Schema::new()
                    .attr("name", Attribute::required(ValueType::String))
                    .attr("value", Attribute::optional(ValueType::String)),
            )),
        )
}

#[fixture]
fn lookup() -> Schema {
    Schema::new()
        .attr(
            "id",
            Attribute::optional(ValueType::String).conflicts_with(&["cidr"]),
        )
        .attr(
            "cidr",
            Attribute::optional(ValueType::String).conflicts_with(&["id"]),
        )
        .attr(
            "settings",
            Attribute::optional(ValueType::block(
                Schema::new()
                    .attr(
                        "install_default_keys",
                        Attribute::optional(ValueType::Bool).default(true),
                    )
                    .attr("count", Attribute::optional(ValueType::Int)),
            )),
        )
}

#[rstest]
fn accepts_complete_configuration(ip_block_like: Schema) {
    let config = json!({
        "location": "PHX",
        "cidr_block_size": "/31",
        "description": null,
        "tags": [{"name": "env", "value": "prod"}]
    });

    assert_eq!(ip_block_like.validate(&config), Ok(()));
}

#[rstest]
fn reports_missing_required_attribute(ip_block_like: Schema) {
    let err = ip_block_like
        .validate(&json!({"location": "PHX"}))
        .expect_err("cidr_block_size is required");

    assert_eq!(
        err,
        SchemaError::MissingRequired {
            path: String::from("cidr_block_size")
        }
    );
}

#[rstest]
fn reports_missing_attribute_inside_block(ip_block_like: Schema) {
    let config = json!({
        "location": "PHX",
        "cidr_block_size": "/31",
        "tags": [{"name": "a"}, {"value": "b"}]
    });

    let err = ip_block_like.validate(&config).expect_err("tag name missing");

    assert_eq!(err.to_string(), "tags.1.name: required attribute is missing");
}

#[rstest]
fn reports_unknown_attribute(ip_block_like: Schema) {
    let config = json!({"location": "PHX", "cidr_block_size": "/31", "size": 2});

    assert!(matches!(
        ip_block_like.validate(&config),
        Err(SchemaError::UnknownAttribute { ref path }) if path == "size"
    ));
}

#[rstest]
fn reports_conflicting_attributes(lookup: Schema) {
    let err = lookup
        .validate(&json!({"id": "a", "cidr": "10.0.0.0/31"}))
        .expect_err("id and cidr conflict");

    assert!(matches!(err, SchemaError::Conflict { .. }));
}

#[rstest]
#[case(json!({"id": 3}), "id: expected string")]
#[case(json!({"settings": [{"count": 1.5}]}), "settings.0.count: expected integer")]
#[case(json!({"settings": [{}, {}]}), "settings: at most 1 item(s) allowed")]
#[case(json!("oops"), ": expected an object")]
fn reports_type_errors(lookup: Schema, #[case] config: Value, #[case] message: &str) {
    let err = lookup.validate(&config).expect_err("invalid configuration");

    assert_eq!(err.to_string(), message);
}

#[rstest]
fn fills_defaults_in_nested_blocks(lookup: Schema) {
    let mut config = json!({"settings": [{"count": 2}]});

    lookup.apply_defaults(&mut config);

    assert_eq!(
        config,
        json!({"settings": [{"count": 2, "install_default_keys": true}]})
    );
}

#[rstest]
fn keeps_explicit_values_over_defaults(lookup: Schema) {
    let mut config = json!({"settings": [{"install_default_keys": false}]});

    lookup.apply_defaults(&mut config);

    assert_eq!(config, json!({"settings": [{"install_default_keys": false}]}));
}

#[rstest]
fn serialises_attribute_metadata() {
    let schema = Schema::new().attr(
        "password",
        Attribute::computed(ValueType::String).sensitive(),
    );

    assert_eq!(
        serde_json::to_value(&schema).unwrap_or_else(|err| panic!("serialise: {err}")),
        json!({"password": {"type": "string", "mode": "computed", "sensitive": true}})
    );
}

#[rstest]
fn operation_timeouts_default_to_long_create_and_short_delete() {
    let timeouts = OperationTimeouts::default();

    assert_eq!(timeouts.create, Duration::from_secs(6000));
    assert_eq!(timeouts.update, Duration::from_secs(6000));
    assert_eq!(timeouts.delete, Duration::from_secs(900));
}
