//! Server provisioning, power actions and deprovisioning.

use rstest::rstest;
use serde_json::json;

use super::fixtures::{fast, server_json, transport};
use crate::api::Method;
use crate::provider::{ProviderError, ResourceHandler};
use crate::resources::server::{
    CloudInitState, IpBlocksConfigurationState, NetworkConfigurationState, ServerIpBlockEntry,
    ServerIpBlockState, ServerState,
};
use crate::resources::{ServerResource, TagEntry};
use crate::test_support::ScriptedTransport;
use crate::wait::WaitSettings;

fn planned() -> ServerState {
    ServerState {
        hostname: String::from("web-01"),
        description: String::from("frontend"),
        os: String::from("ubuntu/jammy"),
        server_type: String::from("s1.c1.small"),
        location: String::from("PHX"),
        install_default_ssh_keys: true,
        ssh_keys: vec![String::from("ssh-ed25519 AAAA")],
        tags: vec![TagEntry::named("env", "prod")],
        ..ServerState::default()
    }
}

fn provisioned() -> ServerState {
    ServerState {
        id: String::from("srv-1"),
        status: String::from("powered-on"),
        pricing_model: String::from("HOURLY"),
        ..planned()
    }
}

fn created_json() -> serde_json::Value {
    json!({
        "id": "srv-1",
        "status": "creating",
        "password": "s3cret",
        "osConfiguration": { "rootPassword": "root-pw", "managementUiUrl": "https://esxi" }
    })
}

#[rstest]
#[tokio::test]
async fn create_waits_and_flattens_everything(transport: ScriptedTransport, fast: WaitSettings) {
    transport.push_json(&created_json());
    transport.push_json(&server_json("creating"));
    transport.push_json(&server_json("powered-on"));
    transport.push_json(&server_json("powered-on"));

    let state = ServerResource::new(fast)
        .create(&transport.client(), planned())
        .await
        .expect("create succeeds");

    assert_eq!(state.id, "srv-1");
    assert_eq!(state.status, "powered-on");
    assert_eq!(state.password, "s3cret");
    assert_eq!(state.root_password, "root-pw");
    assert_eq!(state.management_ui_url, "https://esxi");
    assert_eq!(state.cpu_count, 1);
    assert_eq!(state.cores_per_cpu, 6);
    assert!((3.79..3.81).contains(&state.cpu_frequency_in_ghz));
    assert_eq!(state.private_ip_addresses, vec![String::from("10.0.0.11")]);
    assert_eq!(state.provisioned_on, "2024-03-01T10:00:00Z");
    assert_eq!(state.action, "");
    let tag = state
        .tags
        .first()
        .and_then(|entry| entry.tag_assignment.as_ref())
        .expect("configured tag kept");
    assert_eq!(tag.id, "tag-1");
    assert_eq!(tag.created_by, "USER");
    assert_eq!(transport.remaining(), 0);
}

#[rstest]
#[tokio::test]
async fn failed_provisioning_still_reports_the_server(
    transport: ScriptedTransport,
    fast: WaitSettings,
) {
    transport.push_json(&created_json());
    transport.push_json(&server_json("error"));

    let err = ServerResource::new(fast)
        .create(&transport.client(), planned())
        .await
        .expect_err("provisioning failed");

    assert!(
        err.to_string()
            .starts_with("Error waiting for server (srv-1) to switch to target state"),
        "error: {err}"
    );
    let state = err.partial_state().expect("created server is tracked");
    assert_eq!(state.get("id"), Some(&json!("srv-1")));
    assert_eq!(state.get("password"), Some(&json!("s3cret")));
    assert_eq!(state.get("hostname"), Some(&json!("web-01")));
    assert!(matches!(err, ProviderError::Incomplete { .. }));
}

#[rstest]
#[tokio::test]
async fn create_body_omits_unset_os_configuration(
    transport: ScriptedTransport,
    fast: WaitSettings,
) {
    transport.push_json(&created_json());
    transport.push_json(&server_json("powered-on"));
    transport.push_json(&server_json("powered-on"));

    ServerResource::new(fast)
        .create(&transport.client(), planned())
        .await
        .expect("create succeeds");

    let requests = transport.requests();
    let create = requests.first().expect("create recorded");
    assert_eq!(create.query, vec![(String::from("force"), String::from("false"))]);
    let body = create.body.as_ref().expect("create body");
    assert!(body.get("osConfiguration").is_none());
    assert_eq!(body.get("installDefaultSshKeys"), Some(&json!(true)));
    assert_eq!(body.get("tags"), Some(&json!([{ "name": "env", "value": "prod" }])));
}

#[rstest]
#[tokio::test]
async fn create_sends_cloud_init_and_ram_install(transport: ScriptedTransport, fast: WaitSettings) {
    transport.push_json(&created_json());
    transport.push_json(&server_json("powered-on"));
    transport.push_json(&server_json("powered-on"));
    let plan = ServerState {
        install_os_to_ram: true,
        cloud_init: Some(CloudInitState {
            user_data: String::from("I2Nsb3VkLWNvbmZpZw=="),
        }),
        ..planned()
    };

    ServerResource::new(fast)
        .create(&transport.client(), plan)
        .await
        .expect("create succeeds");

    let requests = transport.requests();
    let body = requests
        .first()
        .and_then(|request| request.body.as_ref())
        .expect("create body");
    assert_eq!(
        body.get("osConfiguration"),
        Some(&json!({
            "installOsToRam": true,
            "cloudInit": { "userData": "I2Nsb3VkLWNvbmZpZw==" }
        }))
    );
}

#[rstest]
#[tokio::test]
async fn read_merges_network_configuration(transport: ScriptedTransport, fast: WaitSettings) {
    transport.push_json(&server_json("powered-on"));

    let state = ServerResource::new(fast)
        .read(&transport.client(), provisioned())
        .await
        .expect("read succeeds");

    let network = state.network_configuration.expect("network configuration");
    assert_eq!(network.gateway_address, "198.51.100.1");
    let private = network
        .private_network_configuration
        .expect("private configuration");
    assert_eq!(private.configuration_type, "USER_DEFINED");
    let attached = private
        .private_networks
        .first()
        .and_then(|entry| entry.server_private_network.as_ref())
        .expect("imported private network");
    assert_eq!(attached.id, "pn-1");
    assert_eq!(attached.status_description, "assigned");
    let blocks = network.ip_blocks_configuration.expect("ip blocks");
    assert_eq!(
        blocks.ip_blocks,
        vec![ServerIpBlockEntry {
            server_ip_block: Some(ServerIpBlockState {
                id: String::from("ipb-9"),
                vlan_id: Some(11),
            }),
        }]
    );
}

#[rstest]
#[case("powered-off", "power-off", "powered-on", "powered-off")]
#[case("powered-on", "power-on", "powered-off", "powered-on")]
#[case("shutdown", "shutdown", "powered-on", "powered-off")]
#[case("reboot", "reboot", "rebooting", "powered-on")]
#[tokio::test]
async fn power_actions_wait_for_outcome(
    transport: ScriptedTransport,
    fast: WaitSettings,
    #[case] action: &str,
    #[case] segment: &str,
    #[case] pending: &str,
    #[case] settled: &str,
) {
    transport.push_empty();
    transport.push_json(&server_json(pending));
    transport.push_json(&server_json(settled));
    transport.push_json(&server_json(settled));
    let plan = ServerState {
        action: action.to_owned(),
        ..provisioned()
    };

    let state = ServerResource::new(fast)
        .update(&transport.client(), provisioned(), plan)
        .await
        .expect("action succeeds");

    assert_eq!(state.status, settled);
    assert_eq!(state.action, "");
    let calls = transport.calls();
    assert_eq!(
        calls.first(),
        Some(&(Method::Post, format!("bmc/v1/servers/srv-1/actions/{segment}")))
    );
}

#[rstest]
#[tokio::test]
async fn reset_stores_new_credentials(transport: ScriptedTransport, fast: WaitSettings) {
    transport.push_json(&json!({
        "result": "Server is being reset",
        "password": "fresh",
        "osConfiguration": { "esxi": { "rootPassword": "root-2", "managementUiUrl": "https://ui" } }
    }));
    transport.push_json(&server_json("powered-on"));
    transport.push_json(&server_json("powered-on"));
    let prior = ServerState {
        os: String::from("esxi/esxi80"),
        management_access_allowed_ips: vec![String::from("203.0.113.0/24")],
        ..provisioned()
    };
    let plan = ServerState {
        action: String::from("reset"),
        ..prior.clone()
    };

    let state = ServerResource::new(fast)
        .update(&transport.client(), prior, plan)
        .await
        .expect("reset succeeds");

    assert_eq!(state.password, "fresh");
    assert_eq!(state.root_password, "root-2");
    assert_eq!(state.management_ui_url, "https://ui");
    let requests = transport.requests();
    let reset = requests.first().expect("reset recorded");
    assert_eq!(reset.full_path(), "bmc/v1/servers/srv-1/actions/reset");
    let body = reset.body.as_ref().expect("reset body");
    assert_eq!(
        body.get("osConfiguration"),
        Some(&json!({ "esxi": { "managementAccessAllowedIps": ["203.0.113.0/24"] } }))
    );
}

#[rstest]
#[tokio::test]
async fn unknown_action_is_unsupported(transport: ScriptedTransport, fast: WaitSettings) {
    let plan = ServerState {
        action: String::from("hibernate"),
        ..provisioned()
    };

    let err = ServerResource::new(fast)
        .update(&transport.client(), provisioned(), plan)
        .await
        .expect_err("unknown action");

    assert!(matches!(err, ProviderError::UnsupportedAction));
    assert!(transport.calls().is_empty());
}

#[rstest]
#[tokio::test]
async fn action_takes_priority_over_other_changes(
    transport: ScriptedTransport,
    fast: WaitSettings,
) {
    transport.push_empty();
    transport.push_json(&server_json("powered-off"));
    transport.push_json(&server_json("powered-off"));
    let plan = ServerState {
        action: String::from("powered-off"),
        hostname: String::from("web-02"),
        ..provisioned()
    };

    ServerResource::new(fast)
        .update(&transport.client(), provisioned(), plan)
        .await
        .expect("action succeeds");

    assert!(
        transport
            .calls()
            .iter()
            .all(|(method, _)| *method != Method::Patch)
    );
}

#[rstest]
#[case(
    ServerState { pricing_model: String::from("ONE_MONTH_RESERVATION"), ..provisioned() },
    Method::Post,
    "bmc/v1/servers/srv-1/actions/reserve"
)]
#[case(
    ServerState { tags: vec![TagEntry::named("env", "staging")], ..provisioned() },
    Method::Put,
    "bmc/v1/servers/srv-1/tags"
)]
#[case(
    ServerState { hostname: String::from("web-02"), ..provisioned() },
    Method::Patch,
    "bmc/v1/servers/srv-1"
)]
#[tokio::test]
async fn attribute_updates_use_dedicated_calls(
    transport: ScriptedTransport,
    fast: WaitSettings,
    #[case] plan: ServerState,
    #[case] method: Method,
    #[case] path: &str,
) {
    if method == Method::Patch {
        transport.push_json(&server_json("powered-on"));
    } else {
        transport.push_empty();
    }
    transport.push_json(&server_json("powered-on"));

    ServerResource::new(fast)
        .update(&transport.client(), provisioned(), plan)
        .await
        .expect("update succeeds");

    assert_eq!(transport.calls().first(), Some(&(method, path.to_owned())));
}

#[rstest]
#[case(None, true)]
#[case(Some(Vec::new()), true)]
#[case(Some(vec![String::from("ipb-9")]), false)]
#[tokio::test]
async fn deprovision_releases_undeclared_ip_blocks(
    transport: ScriptedTransport,
    fast: WaitSettings,
    #[case] declared: Option<Vec<String>>,
    #[case] delete_ip_blocks: bool,
) {
    transport.push_empty();
    let prior = ServerState {
        network_configuration: declared.map(|ids| NetworkConfigurationState {
            ip_blocks_configuration: Some(IpBlocksConfigurationState {
                configuration_type: String::from("USER_DEFINED"),
                ip_blocks: ids
                    .into_iter()
                    .map(|id| ServerIpBlockEntry {
                        server_ip_block: Some(ServerIpBlockState { id, vlan_id: None }),
                    })
                    .collect(),
            }),
            ..NetworkConfigurationState::default()
        }),
        ..provisioned()
    };

    ServerResource::new(fast)
        .delete(&transport.client(), prior)
        .await
        .expect("delete succeeds");

    let requests = transport.requests();
    let deprovision = requests.first().expect("deprovision recorded");
    assert_eq!(deprovision.full_path(), "bmc/v1/servers/srv-1/actions/deprovision");
    assert_eq!(
        deprovision.body,
        Some(json!({ "deleteIpBlocks": delete_ip_blocks }))
    );
}
