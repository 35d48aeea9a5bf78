//! Unit tests for the provider catalog.

use std::collections::BTreeSet;

use rstest::{fixture, rstest};
use serde_json::{Value, json};

use super::{Provider, ProviderError, ProviderSettings};
use crate::schema::SchemaError;
use crate::test_support::ScriptedTransport;

#[fixture]
fn transport() -> ScriptedTransport {
    ScriptedTransport::new()
}

fn object_keys(value: &Value) -> BTreeSet<String> {
    value
        .as_object()
        .map(|map| map.keys().cloned().collect())
        .unwrap_or_default()
}

#[test]
fn catalog_registers_every_type() {
    let provider = Provider::default();

    assert_eq!(
        provider.resource_types(),
        vec![
            "pnap_bgp_peer_group",
            "pnap_ip_block",
            "pnap_private_network",
            "pnap_public_network",
            "pnap_rancher_cluster",
            "pnap_reservation",
            "pnap_server",
            "pnap_ssh_key",
            "pnap_storage_network",
            "pnap_tag",
        ]
    );
    assert_eq!(
        provider.data_source_types(),
        vec![
            "pnap_bgp_peer_group",
            "pnap_events",
            "pnap_invoices",
            "pnap_ip_block",
            "pnap_locations",
            "pnap_private_network",
            "pnap_product_availability",
            "pnap_products",
            "pnap_public_network",
            "pnap_quota",
            "pnap_rancher_cluster",
            "pnap_reservation",
            "pnap_server",
            "pnap_ssh_key",
            "pnap_storage_network",
            "pnap_tag",
            "pnap_transactions",
        ]
    );
    assert!(!provider.is_configured());
}

#[test]
fn resource_state_matches_its_schema() {
    let provider = Provider::default();
    for name in provider.resource_types() {
        let resource = provider.resource(name).expect("registered");
        let blank = resource.blank_state().expect("blank state encodes");
        let declared: BTreeSet<String> = resource
            .schema()
            .iter()
            .map(|(attribute, _)| attribute.to_owned())
            .collect();
        assert_eq!(object_keys(&blank), declared, "{name}");
    }
}

#[test]
fn data_source_state_matches_its_schema() {
    let provider = Provider::default();
    for name in provider.data_source_types() {
        let source = provider.data_source(name).expect("registered");
        let blank = source.blank_state().expect("blank state encodes");
        let declared: BTreeSet<String> = source
            .schema()
            .iter()
            .map(|(attribute, _)| attribute.to_owned())
            .collect();
        assert_eq!(object_keys(&blank), declared, "{name}");
    }
}

#[test]
fn exported_schemas_carry_computed_ids() {
    let catalog = Provider::default().schemas();

    let tag = catalog.resources.get("pnap_tag").expect("tag resource");
    assert!(tag.schema.get("id").is_some());
    let events = catalog.data_sources.get("pnap_events").expect("events source");
    assert!(events.get("id").is_some());
    assert!(catalog.provider.get("client_secret").is_some());
}

#[test]
fn unknown_types_are_reported() {
    let provider = Provider::default();

    let err = provider
        .resource("pnap_volume")
        .map(|_| ())
        .expect_err("not registered");

    assert_eq!(err.to_string(), "unknown resource type 'pnap_volume'");
    assert!(matches!(
        provider.data_source("pnap_volume").map(|_| ()),
        Err(ProviderError::UnknownType { kind: "data source", .. })
    ));
}

#[tokio::test]
async fn lifecycle_calls_require_configuration() {
    let provider = Provider::default();

    let err = provider
        .read("pnap_ssh_key", json!({ "id": "key-1" }))
        .await
        .expect_err("no client yet");

    assert!(matches!(err, ProviderError::NotConfigured));
}

#[rstest]
#[tokio::test]
async fn create_rejects_unknown_attributes(transport: ScriptedTransport) {
    let provider = Provider::with_client(transport.client(), ProviderSettings::default());

    let err = provider
        .create(
            "pnap_ssh_key",
            json!({ "name": "laptop", "key": "ssh-ed25519 AAAA", "colour": "red" }),
        )
        .await
        .expect_err("colour is not an attribute");

    assert!(matches!(
        err,
        ProviderError::Schema {
            source: SchemaError::UnknownAttribute { .. },
            ..
        }
    ));
    assert!(transport.calls().is_empty());
}

#[rstest]
#[tokio::test]
async fn create_rejects_missing_required(transport: ScriptedTransport) {
    let provider = Provider::with_client(transport.client(), ProviderSettings::default());

    let err = provider
        .create("pnap_tag", json!({ "description": "no name" }))
        .await
        .expect_err("name is required");

    assert_eq!(err.to_string(), "pnap_tag: name: required attribute is missing");
    assert!(transport.calls().is_empty());
}

#[rstest]
#[tokio::test]
async fn data_source_rejects_conflicting_keys(transport: ScriptedTransport) {
    let provider = Provider::with_client(transport.client(), ProviderSettings::default());

    let err = provider
        .read_data_source(
            "pnap_server",
            json!({ "id": "srv-1", "hostname": "web-01" }),
        )
        .await
        .expect_err("id and hostname conflict");

    assert!(matches!(
        err,
        ProviderError::Schema {
            source: SchemaError::Conflict { .. },
            ..
        }
    ));
    assert!(transport.calls().is_empty());
}

#[rstest]
#[tokio::test]
async fn read_tolerates_null_attributes(transport: ScriptedTransport) {
    transport.push_json(&json!({
        "id": "key-1",
        "default": false,
        "name": "laptop",
        "key": "ssh-ed25519 AAAA",
        "fingerprint": "SHA256:abc",
        "createdOn": "2024-03-01T10:00:00Z",
        "lastUpdatedOn": "2024-03-02T10:00:00Z"
    }));
    let provider = Provider::with_client(transport.client(), ProviderSettings::default());

    let state = provider
        .read(
            "pnap_ssh_key",
            json!({ "id": "key-1", "name": "laptop", "fingerprint": null }),
        )
        .await
        .expect("read succeeds");

    assert_eq!(state.get("fingerprint"), Some(&json!("SHA256:abc")));
}
