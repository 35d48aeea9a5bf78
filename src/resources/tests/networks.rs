//! Private and public network handlers.

use rstest::rstest;
use serde_json::{Value, json};

use super::fixtures::{fast, ip_block_json, transport};
use crate::api::Method;
use crate::provider::{ProviderError, ResourceHandler};
use crate::resources::private_network::PrivateNetworkState;
use crate::resources::public_network::{IpBlockEntry, PublicNetworkState};
use crate::resources::{PrivateNetworkResource, PublicNetworkResource};
use crate::test_support::ScriptedTransport;
use crate::wait::WaitSettings;

fn private_json(members: &[&str]) -> Value {
    let memberships: Vec<Value> = members
        .iter()
        .map(|id| json!({ "resourceId": id, "resourceType": "server", "ips": ["10.0.0.11"] }))
        .collect();
    json!({
        "id": "pn-1",
        "type": "PRIVATE",
        "name": "backend",
        "location": "PHX",
        "locationDefault": false,
        "vlanId": 10,
        "cidr": "10.0.0.0/24",
        "servers": [],
        "memberships": memberships,
        "status": "READY",
        "createdOn": "2024-03-01T10:00:00Z"
    })
}

fn public_json(blocks: &[(&str, &str)]) -> Value {
    let ip_blocks: Vec<Value> = blocks
        .iter()
        .map(|(id, cidr)| json!({ "id": id, "cidr": cidr, "usedIpsCount": "2" }))
        .collect();
    json!({
        "id": "pub-1",
        "vlanId": 20,
        "memberships": [],
        "name": "edge",
        "location": "PHX",
        "status": "READY",
        "createdOn": "2024-03-01T10:00:00Z",
        "ipBlocks": ip_blocks,
        "raEnabled": false
    })
}

fn private_network() -> PrivateNetworkState {
    PrivateNetworkState {
        id: String::from("pn-1"),
        name: String::from("backend"),
        location: String::from("PHX"),
        cidr: String::from("10.0.0.0/24"),
        ..PrivateNetworkState::default()
    }
}

fn public_network(blocks: &[&str]) -> PublicNetworkState {
    PublicNetworkState {
        id: String::from("pub-1"),
        name: String::from("edge"),
        location: String::from("PHX"),
        ip_blocks: blocks.iter().map(|id| IpBlockEntry::with_id(id)).collect(),
        ..PublicNetworkState::default()
    }
}

fn private_resource(wait: WaitSettings) -> PrivateNetworkResource {
    PrivateNetworkResource::new(wait)
}

fn public_resource(wait: WaitSettings) -> PublicNetworkResource {
    PublicNetworkResource::new(wait, wait)
}

#[rstest]
#[tokio::test]
async fn private_create_forwards_force(transport: ScriptedTransport, fast: WaitSettings) {
    transport.push_json(&private_json(&[]));
    transport.push_json(&private_json(&["srv-1"]));
    let plan = PrivateNetworkState {
        id: String::new(),
        force: true,
        ..private_network()
    };

    let state = private_resource(fast)
        .create(&transport.client(), plan)
        .await
        .expect("create succeeds");

    assert_eq!(state.id, "pn-1");
    assert_eq!(state.network_type, "PRIVATE");
    assert_eq!(state.vlan_id, 10);
    assert!(state.force);
    let member = state.memberships.first().expect("membership");
    assert_eq!(member.resource_id, "srv-1");
    let requests = transport.requests();
    let create = requests.first().expect("create recorded");
    assert_eq!(create.query, vec![(String::from("force"), String::from("true"))]);
    assert_eq!(
        create.body,
        Some(json!({
            "name": "backend",
            "location": "PHX",
            "locationDefault": false,
            "cidr": "10.0.0.0/24"
        }))
    );
}

#[rstest]
#[tokio::test]
async fn private_update_replaces_settings(transport: ScriptedTransport, fast: WaitSettings) {
    transport.push_json(&private_json(&[]));
    transport.push_json(&private_json(&[]));
    let plan = PrivateNetworkState {
        description: String::from("db tier"),
        ..private_network()
    };

    private_resource(fast)
        .update(&transport.client(), private_network(), plan)
        .await
        .expect("update succeeds");

    let requests = transport.requests();
    let put = requests.first().expect("update recorded");
    assert_eq!(put.method, Method::Put);
    assert_eq!(
        put.body,
        Some(json!({ "name": "backend", "description": "db tier", "locationDefault": false }))
    );
}

#[rstest]
#[tokio::test]
async fn private_update_rejects_cidr_change(transport: ScriptedTransport, fast: WaitSettings) {
    let plan = PrivateNetworkState {
        cidr: String::from("10.9.0.0/24"),
        ..private_network()
    };

    let err = private_resource(fast)
        .update(&transport.client(), private_network(), plan)
        .await
        .expect_err("cidr is immutable");

    assert!(matches!(err, ProviderError::UnsupportedAction));
    assert!(transport.calls().is_empty());
}

#[rstest]
#[tokio::test]
async fn private_delete_waits_for_members_to_leave(
    transport: ScriptedTransport,
    fast: WaitSettings,
) {
    transport.push_json(&private_json(&["srv-1"]));
    transport.push_json(&private_json(&[]));
    transport.push_empty();

    private_resource(fast)
        .delete(&transport.client(), private_network())
        .await
        .expect("delete succeeds");

    assert_eq!(
        transport.calls(),
        vec![
            (Method::Get, String::from("networks/v1/private-networks/pn-1")),
            (Method::Get, String::from("networks/v1/private-networks/pn-1")),
            (Method::Delete, String::from("networks/v1/private-networks/pn-1")),
        ]
    );
}

#[rstest]
#[tokio::test]
async fn public_read_imports_blocks_when_none_configured(
    transport: ScriptedTransport,
    fast: WaitSettings,
) {
    transport.push_json(&public_json(&[("ipb-1", "198.51.100.0/31")]));

    let state = public_resource(fast)
        .read(&transport.client(), public_network(&[]))
        .await
        .expect("read succeeds");

    let assigned = state
        .ip_blocks
        .first()
        .and_then(|entry| entry.public_network_ip_block.as_ref())
        .expect("imported block");
    assert_eq!(assigned.id, "ipb-1");
    assert_eq!(assigned.cidr, "198.51.100.0/31");
    assert_eq!(assigned.used_ips_count, "2");
    assert_eq!(state.ra_enabled, Some(false));
}

#[rstest]
#[tokio::test]
async fn public_update_adds_then_removes_blocks(transport: ScriptedTransport, fast: WaitSettings) {
    // Add ipb-2 and wait for it, then remove ipb-1 and wait for it.
    transport.push_empty();
    transport.push_json(&ip_block_json("assigned", ""));
    transport.push_empty();
    transport.push_json(&ip_block_json("unassigned", ""));
    transport.push_json(&public_json(&[("ipb-2", "198.51.100.2/31")]));

    let state = public_resource(fast)
        .update(
            &transport.client(),
            public_network(&["ipb-1"]),
            PublicNetworkState {
                force: true,
                ..public_network(&["ipb-2"])
            },
        )
        .await
        .expect("update succeeds");

    assert_eq!(
        transport.calls(),
        vec![
            (Method::Post, String::from("networks/v1/public-networks/pub-1/ip-blocks")),
            (Method::Get, String::from("ips/v1/ip-blocks/ipb-2")),
            (Method::Delete, String::from("networks/v1/public-networks/pub-1/ip-blocks/ipb-1")),
            (Method::Get, String::from("ips/v1/ip-blocks/ipb-1")),
            (Method::Get, String::from("networks/v1/public-networks/pub-1")),
        ]
    );
    let requests = transport.requests();
    let removal = requests.get(2).expect("removal recorded");
    assert_eq!(removal.query, vec![(String::from("force"), String::from("true"))]);
    let kept = state
        .ip_blocks
        .first()
        .and_then(|entry| entry.public_network_ip_block.as_ref())
        .expect("configured block");
    assert_eq!(kept.cidr, "198.51.100.2/31");
}

#[rstest]
#[tokio::test]
async fn public_force_only_change_is_accepted_without_mutating_calls(
    transport: ScriptedTransport,
    fast: WaitSettings,
) {
    transport.push_json(&public_json(&[]));
    let plan = PublicNetworkState {
        force: true,
        ..public_network(&[])
    };

    let state = public_resource(fast)
        .update(&transport.client(), public_network(&[]), plan)
        .await
        .expect("force change accepted");

    assert!(state.force);
    assert_eq!(
        transport.calls(),
        vec![(Method::Get, String::from("networks/v1/public-networks/pub-1"))]
    );
}

#[rstest]
#[case(
    PublicNetworkState { description: String::from("dmz"), ..public_network(&[]) },
    json!({ "name": "edge", "description": "dmz" })
)]
#[case(
    PublicNetworkState { ra_enabled: Some(true), ..public_network(&[]) },
    json!({ "raEnabled": true })
)]
#[tokio::test]
async fn public_patch_carries_changed_fields(
    transport: ScriptedTransport,
    fast: WaitSettings,
    #[case] plan: PublicNetworkState,
    #[case] expected: Value,
) {
    transport.push_json(&public_json(&[]));
    transport.push_json(&public_json(&[]));

    public_resource(fast)
        .update(&transport.client(), public_network(&[]), plan)
        .await
        .expect("patch succeeds");

    let requests = transport.requests();
    let patch = requests.first().expect("patch recorded");
    assert_eq!(patch.method, Method::Patch);
    assert_eq!(patch.body, Some(expected));
}
