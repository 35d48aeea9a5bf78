//! End-to-end IP block lifecycle through the provider catalog.

use std::time::Duration;

use pnap_provider::api::Method;
use pnap_provider::test_support::ScriptedTransport;
use pnap_provider::{Provider, ProviderSettings, WaitSettings};
use rstest::{fixture, rstest};
use serde_json::{Value, json};

fn block(status: &str, description: &str) -> Value {
    json!({
        "id": "ipb-1",
        "location": "PHX",
        "cidrBlockSize": "/31",
        "cidr": "10.1.1.0/31",
        "ipVersion": "V4",
        "status": status,
        "description": description,
        "isBringYourOwn": false,
        "createdOn": "2024-03-01T10:00:00Z",
        "tags": []
    })
}

#[fixture]
fn transport() -> ScriptedTransport {
    ScriptedTransport::new()
}

fn provider(transport: &ScriptedTransport) -> Provider {
    let fast = WaitSettings::immediate(Duration::from_millis(1), Duration::from_millis(200));
    Provider::with_client(transport.client(), ProviderSettings::uniform(fast))
}

#[rstest]
#[tokio::test]
async fn ip_block_create_update_delete(transport: ScriptedTransport) {
    let provider = provider(&transport);

    transport.push_json(&block("unassigned", ""));
    transport.push_json(&block("unassigned", ""));
    let created = provider
        .create(
            "pnap_ip_block",
            json!({ "location": "PHX", "cidr_block_size": "/31" }),
        )
        .await
        .expect("create succeeds");
    assert_eq!(created.get("cidr"), Some(&json!("10.1.1.0/31")));
    assert_eq!(created.get("status"), Some(&json!("unassigned")));
    assert_eq!(created.get("is_bring_your_own"), Some(&json!(false)));

    transport.push_json(&block("unassigned", ""));
    let refreshed = provider
        .read("pnap_ip_block", created.clone())
        .await
        .expect("read succeeds");
    assert_eq!(refreshed, created);

    let mut plan = refreshed.clone();
    if let Some(fields) = plan.as_object_mut() {
        fields.insert(String::from("description"), json!("edge"));
    }
    transport.push_json(&block("unassigned", "edge"));
    transport.push_json(&block("unassigned", "edge"));
    let updated = provider
        .update("pnap_ip_block", refreshed, plan)
        .await
        .expect("update succeeds");
    assert_eq!(updated.get("description"), Some(&json!("edge")));

    transport.push_json(&block("unassigning", "edge"));
    transport.push_json(&block("unassigned", "edge"));
    transport.push_empty();
    provider
        .delete("pnap_ip_block", updated)
        .await
        .expect("delete succeeds");

    let calls = transport.calls();
    let patch = calls
        .iter()
        .position(|(method, _)| *method == Method::Patch)
        .expect("description sent with PATCH");
    let delete = calls
        .iter()
        .position(|(method, _)| *method == Method::Delete)
        .expect("block released");
    assert!(patch < delete);
    assert_eq!(
        calls.get(delete.saturating_sub(1)),
        Some(&(Method::Get, String::from("ips/v1/ip-blocks/ipb-1")))
    );
    assert_eq!(transport.remaining(), 0);
}

#[rstest]
#[tokio::test]
async fn resizing_a_block_is_unsupported(transport: ScriptedTransport) {
    let provider = provider(&transport);
    let prior = json!({
        "id": "ipb-1",
        "location": "PHX",
        "cidr_block_size": "/31",
        "cidr": "10.1.1.0/31",
        "status": "unassigned"
    });
    let mut plan = prior.clone();
    if let Some(fields) = plan.as_object_mut() {
        fields.insert(String::from("cidr_block_size"), json!("/30"));
    }

    let err = provider
        .update("pnap_ip_block", prior, plan)
        .await
        .expect_err("size is immutable");

    assert_eq!(err.to_string(), "unsupported action");
    assert!(transport.calls().is_empty());
}
