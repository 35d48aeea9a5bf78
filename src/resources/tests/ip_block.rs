//! IP block lifecycle: allocation, refresh, updates and release.

use rstest::rstest;

use super::fixtures::{fast, ip_block_json, transport};
use crate::api::Method;
use crate::provider::{ProviderError, ResourceHandler};
use crate::resources::ip_block::IpBlockState;
use crate::resources::{IpBlockResource, TagEntry};
use crate::test_support::ScriptedTransport;
use crate::wait::WaitSettings;

fn planned() -> IpBlockState {
    IpBlockState {
        location: String::from("PHX"),
        cidr_block_size: String::from("/31"),
        ..IpBlockState::default()
    }
}

fn allocated() -> IpBlockState {
    IpBlockState {
        id: String::from("ipb-1"),
        cidr: String::from("10.1.1.0/31"),
        status: String::from("unassigned"),
        ..planned()
    }
}

#[rstest]
#[tokio::test]
async fn create_populates_computed_fields(transport: ScriptedTransport, fast: WaitSettings) {
    transport.push_json(&ip_block_json("unassigned", ""));
    transport.push_json(&ip_block_json("unassigned", ""));

    let state = IpBlockResource::new(fast)
        .create(&transport.client(), planned())
        .await
        .expect("create succeeds");

    assert_eq!(state.id, "ipb-1");
    assert_eq!(state.cidr, "10.1.1.0/31");
    assert_eq!(state.status, "unassigned");
    assert!(!state.is_bring_your_own);
    assert_eq!(state.created_on, "2024-03-01T10:00:00Z");
    assert_eq!(
        transport.calls(),
        vec![
            (Method::Post, String::from("ips/v1/ip-blocks")),
            (Method::Get, String::from("ips/v1/ip-blocks/ipb-1")),
        ]
    );
    let requests = transport.requests();
    let body = requests
        .first()
        .and_then(|request| request.body.as_ref())
        .expect("create body");
    assert_eq!(
        body,
        &serde_json::json!({ "location": "PHX", "cidrBlockSize": "/31" })
    );
}

#[rstest]
#[tokio::test]
async fn description_change_issues_patch(transport: ScriptedTransport, fast: WaitSettings) {
    transport.push_json(&ip_block_json("unassigned", "edge"));
    transport.push_json(&ip_block_json("unassigned", "edge"));
    let plan = IpBlockState {
        description: String::from("edge"),
        ..allocated()
    };

    let state = IpBlockResource::new(fast)
        .update(&transport.client(), allocated(), plan)
        .await
        .expect("update succeeds");

    assert_eq!(state.description, "edge");
    let requests = transport.requests();
    let patch = requests.first().expect("patch recorded");
    assert_eq!(patch.method, Method::Patch);
    assert_eq!(patch.full_path(), "ips/v1/ip-blocks/ipb-1");
    assert_eq!(
        patch.body,
        Some(serde_json::json!({ "description": "edge" }))
    );
}

#[rstest]
#[tokio::test]
async fn tag_change_replaces_assignments(transport: ScriptedTransport, fast: WaitSettings) {
    transport.push_json(&ip_block_json("unassigned", ""));
    transport.push_json(&ip_block_json("unassigned", ""));
    let plan = IpBlockState {
        tags: vec![TagEntry::named("env", "prod")],
        ..allocated()
    };

    IpBlockResource::new(fast)
        .update(&transport.client(), allocated(), plan)
        .await
        .expect("update succeeds");

    let requests = transport.requests();
    let put = requests.first().expect("tag update recorded");
    assert_eq!(put.method, Method::Put);
    assert_eq!(put.full_path(), "ips/v1/ip-blocks/ipb-1/tags");
    assert_eq!(
        put.body,
        Some(serde_json::json!([{ "name": "env", "value": "prod" }]))
    );
}

#[rstest]
#[tokio::test]
async fn unsupported_change_makes_no_call(transport: ScriptedTransport, fast: WaitSettings) {
    let plan = IpBlockState {
        cidr_block_size: String::from("/30"),
        ..allocated()
    };

    let err = IpBlockResource::new(fast)
        .update(&transport.client(), allocated(), plan)
        .await
        .expect_err("cidr size cannot change in place");

    assert!(matches!(err, ProviderError::UnsupportedAction));
    assert_eq!(err.to_string(), "unsupported action");
    assert!(transport.calls().is_empty());
}

#[rstest]
#[tokio::test]
async fn delete_waits_for_unassignment(transport: ScriptedTransport, fast: WaitSettings) {
    transport.push_json(&ip_block_json("unassigning", ""));
    transport.push_json(&ip_block_json("unassigned", ""));
    transport.push_empty();

    IpBlockResource::new(fast)
        .delete(&transport.client(), allocated())
        .await
        .expect("delete succeeds");

    assert_eq!(
        transport.calls(),
        vec![
            (Method::Get, String::from("ips/v1/ip-blocks/ipb-1")),
            (Method::Get, String::from("ips/v1/ip-blocks/ipb-1")),
            (Method::Delete, String::from("ips/v1/ip-blocks/ipb-1")),
        ]
    );
}

#[rstest]
#[tokio::test]
async fn delete_reports_stuck_block(transport: ScriptedTransport, fast: WaitSettings) {
    for _ in 0..500 {
        transport.push_json(&ip_block_json("unassigning", ""));
    }

    let err = IpBlockResource::new(fast)
        .delete(&transport.client(), allocated())
        .await
        .expect_err("wait times out");

    assert!(
        err.to_string()
            .starts_with("error waiting for ip block (ipb-1) to be unassigned: timeout"),
        "unexpected error: {err}"
    );
    assert!(
        transport
            .calls()
            .iter()
            .all(|(method, _)| *method == Method::Get)
    );
}
