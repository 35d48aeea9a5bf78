//! Unique-key lookups.

use rstest::rstest;
use serde_json::json;

use super::fixtures::{ip_block_json, server_json, ssh_key_json, transport};
use crate::api::Method;
use crate::data_sources::ip_block::IpBlockDataState;
use crate::data_sources::quota::QuotaState;
use crate::data_sources::rancher_cluster::RancherClusterDataState;
use crate::data_sources::reservation::ReservationDataState;
use crate::data_sources::server::ServerDataState;
use crate::data_sources::{
    IpBlockDataSource, QuotaDataSource, RancherClusterDataSource, ReservationDataSource,
    ServerDataSource, SshKeyDataSource,
};
use crate::provider::{DataSourceHandler, ProviderError};
use crate::resources::ssh_key::SshKeyState;
use crate::test_support::ScriptedTransport;

fn named_key(name: &str) -> SshKeyState {
    SshKeyState {
        name: name.to_owned(),
        ..SshKeyState::default()
    }
}

#[rstest]
#[tokio::test]
async fn ssh_key_found_by_name(transport: ScriptedTransport) {
    transport.push_json(&json!([
        ssh_key_json("key-1", "desktop"),
        ssh_key_json("key-2", "laptop"),
    ]));

    let state = SshKeyDataSource
        .read(&transport.client(), named_key("laptop"))
        .await
        .expect("lookup succeeds");

    assert_eq!(state.id, "key-2");
    assert_eq!(state.fingerprint, "SHA256:abc");
    assert_eq!(transport.calls(), vec![(Method::Get, String::from("bmc/v1/ssh-keys"))]);
}

#[rstest]
#[tokio::test]
async fn ssh_key_without_match_leaves_id_unset(transport: ScriptedTransport) {
    transport.push_json(&json!([ssh_key_json("key-1", "desktop")]));

    let state = SshKeyDataSource
        .read(&transport.client(), named_key("laptop"))
        .await
        .expect("lookup succeeds");

    assert!(state.id.is_empty());
    assert_eq!(state.name, "laptop");
}

#[rstest]
#[tokio::test]
async fn ssh_key_duplicates_are_ambiguous(transport: ScriptedTransport) {
    transport.push_json(&json!([
        ssh_key_json("key-1", "laptop"),
        ssh_key_json("key-2", "laptop"),
    ]));

    let err = SshKeyDataSource
        .read(&transport.client(), named_key("laptop"))
        .await
        .expect_err("two keys share the name");

    assert_eq!(
        err.to_string(),
        "too many ssh keys with name laptop (found 2, expected 1)"
    );
}

#[rstest]
#[tokio::test]
async fn server_found_by_id_reports_primary_ip(transport: ScriptedTransport) {
    transport.push_json(&json!([
        server_json("srv-1", "web-01"),
        server_json("srv-2", "web-02"),
    ]));
    let config = ServerDataState {
        id: String::from("srv-2"),
        ..ServerDataState::default()
    };

    let state = ServerDataSource
        .read(&transport.client(), config)
        .await
        .expect("lookup succeeds");

    assert_eq!(state.hostname, "web-02");
    assert_eq!(state.primary_ip_address, "198.51.100.7");
    assert_eq!(state.server_type, "s1.c1.small");
    let tag = state.tags.first().expect("tag imported");
    assert_eq!((tag.name.as_str(), tag.value.as_str()), ("env", "prod"));
}

#[rstest]
#[case::by_cidr("10.1.1.0/31", "", "ipb-1")]
#[case::by_id("", "ipb-2", "ipb-2")]
#[tokio::test]
async fn ip_block_found_by_either_key(
    transport: ScriptedTransport,
    #[case] cidr: &str,
    #[case] id: &str,
    #[case] expected: &str,
) {
    transport.push_json(&json!([
        ip_block_json("ipb-1", "10.1.1.0/31"),
        ip_block_json("ipb-2", "10.2.2.0/31"),
    ]));
    let config = IpBlockDataState {
        id: id.to_owned(),
        cidr: cidr.to_owned(),
        ..IpBlockDataState::default()
    };

    let state = IpBlockDataSource
        .read(&transport.client(), config)
        .await
        .expect("lookup succeeds");

    assert_eq!(state.id, expected);
    assert_eq!(state.cidr_block_size, "/31");
}

#[rstest]
#[tokio::test]
async fn ip_block_ambiguity_names_the_cidr(transport: ScriptedTransport) {
    transport.push_json(&json!([
        ip_block_json("ipb-1", "10.1.1.0/31"),
        ip_block_json("ipb-2", "10.1.1.0/31"),
    ]));
    let config = IpBlockDataState {
        cidr: String::from("10.1.1.0/31"),
        ..IpBlockDataState::default()
    };

    let err = IpBlockDataSource
        .read(&transport.client(), config)
        .await
        .expect_err("duplicate cidr");

    assert!(matches!(err, ProviderError::Lookup { .. }));
    assert_eq!(
        err.to_string(),
        "too many IP Blocks with CIDR 10.1.1.0/31 (found 2, expected 1)"
    );
}

#[rstest]
#[tokio::test]
async fn ip_block_unknown_id_leaves_id_unset(transport: ScriptedTransport) {
    transport.push_json(&json!([ip_block_json("ipb-other", "10.1.1.0/31")]));
    let config = IpBlockDataState {
        id: String::from("ipb-missing"),
        ..IpBlockDataState::default()
    };

    let state = IpBlockDataSource
        .read(&transport.client(), config)
        .await
        .expect("lookup succeeds");

    assert!(state.id.is_empty(), "id: {}", state.id);
    assert!(state.cidr.is_empty());
}

#[rstest]
#[tokio::test]
async fn server_unknown_id_leaves_id_unset(transport: ScriptedTransport) {
    transport.push_json(&json!([server_json("srv-1", "web-01")]));
    let config = ServerDataState {
        id: String::from("srv-gone"),
        ..ServerDataState::default()
    };

    let state = ServerDataSource
        .read(&transport.client(), config)
        .await
        .expect("lookup succeeds");

    assert!(state.id.is_empty());
    assert!(state.hostname.is_empty());
}

#[rstest]
#[tokio::test]
async fn quota_found_by_name(transport: ScriptedTransport) {
    transport.push_json(&json!([{
        "id": "bmc.servers.max_count",
        "name": "Servers",
        "description": "Maximum servers",
        "status": "ON_LIMIT",
        "limit": 5,
        "unit": "COUNT",
        "used": 5,
        "quotaEditLimitRequestDetails": [{
            "limit": 10,
            "reason": "growth",
            "requestedOn": "2024-03-01T10:00:00Z"
        }]
    }]));
    let config = QuotaState {
        name: String::from("Servers"),
        ..QuotaState::default()
    };

    let state = QuotaDataSource
        .read(&transport.client(), config)
        .await
        .expect("lookup succeeds");

    assert_eq!(state.id, "bmc.servers.max_count");
    assert_eq!((state.limit, state.used), (5, 5));
    let request = state
        .quota_edit_limit_request_details
        .first()
        .expect("request imported");
    assert_eq!(request.limit, 10);
}

fn reservation_json(id: &str, sku: &str) -> serde_json::Value {
    json!({
        "id": id,
        "productCode": "s1.c1.small",
        "productCategory": "SERVER",
        "location": "PHX",
        "reservationModel": "ONE_MONTH_RESERVATION",
        "startDateTime": "2024-03-01T10:00:00Z",
        "autoRenew": true,
        "sku": sku,
        "price": 112.4567,
        "priceUnit": "MONTH"
    })
}

#[rstest]
#[tokio::test]
async fn reservation_requires_both_keys_when_both_are_set(transport: ScriptedTransport) {
    transport.push_json(&json!([
        reservation_json("res-1", "XXX-1"),
        reservation_json("res-2", "XXX-1"),
    ]));
    let config = ReservationDataState {
        id: String::from("res-2"),
        sku: String::from("XXX-1"),
        ..ReservationDataState::default()
    };

    let state = ReservationDataSource
        .read(&transport.client(), config)
        .await
        .expect("lookup succeeds");

    assert_eq!(state.id, "res-2");
    assert_eq!(state.price.to_string(), "112.46");
}

#[rstest]
#[tokio::test]
async fn reservation_sku_alone_can_be_ambiguous(transport: ScriptedTransport) {
    transport.push_json(&json!([
        reservation_json("res-1", "XXX-1"),
        reservation_json("res-2", "XXX-1"),
    ]));
    let config = ReservationDataState {
        sku: String::from("XXX-1"),
        ..ReservationDataState::default()
    };

    let err = ReservationDataSource
        .read(&transport.client(), config)
        .await
        .expect_err("sku shared by two reservations");

    assert_eq!(
        err.to_string(),
        "too many reservations with sku XXX-1 (found 2, expected 1)"
    );
}

#[rstest]
#[tokio::test]
async fn rancher_cluster_by_id_uses_get(transport: ScriptedTransport) {
    transport.push_json(&json!({
        "id": "rc-1",
        "name": "rancher-a",
        "location": "PHX",
        "nodePools": [{
            "name": "pool-1",
            "nodeCount": 1,
            "serverType": "s0.d1.small",
            "nodes": [{ "serverId": "srv-1" }]
        }],
        "metadata": { "url": "https://rancher.example" },
        "statusDescription": "Ready"
    }));
    let config = RancherClusterDataState {
        id: String::from("rc-1"),
        ..RancherClusterDataState::default()
    };

    let state = RancherClusterDataSource
        .read(&transport.client(), config)
        .await
        .expect("lookup succeeds");

    assert_eq!(state.name, "rancher-a");
    assert_eq!(
        state.metadata.map(|metadata| metadata.url),
        Some(String::from("https://rancher.example"))
    );
    assert_eq!(
        transport.calls(),
        vec![(Method::Get, String::from("solutions/rancher/v1beta/clusters/rc-1"))]
    );
}

#[rstest]
#[tokio::test]
async fn rancher_cluster_without_identifier_is_rejected(transport: ScriptedTransport) {
    transport.push_json(&json!({ "location": "PHX" }));
    let config = RancherClusterDataState {
        id: String::from("rc-1"),
        ..RancherClusterDataState::default()
    };

    let err = RancherClusterDataSource
        .read(&transport.client(), config)
        .await
        .expect_err("response lacks an id");

    assert_eq!(err.to_string(), "unknown cluster identifier");
}

#[rstest]
#[tokio::test]
async fn rancher_cluster_by_name_lists(transport: ScriptedTransport) {
    transport.push_json(&json!([
        { "id": "rc-1", "name": "rancher-a", "location": "PHX" },
        { "id": "rc-2", "name": "rancher-b", "location": "ASH" }
    ]));
    let config = RancherClusterDataState {
        name: String::from("rancher-b"),
        ..RancherClusterDataState::default()
    };

    let state = RancherClusterDataSource
        .read(&transport.client(), config)
        .await
        .expect("lookup succeeds");

    assert_eq!((state.id.as_str(), state.location.as_str()), ("rc-2", "ASH"));
    assert_eq!(
        transport.calls(),
        vec![(Method::Get, String::from("solutions/rancher/v1beta/clusters"))]
    );
}
