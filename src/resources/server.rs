//! `pnap_server`: bare metal servers.
//!
//! Provisioning and power actions are asynchronous; every call that moves
//! the server between power states waits for the status to settle before
//! refreshing state. Credentials are only reported by create and reset, so
//! refreshes keep the stored values.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{TagEntry, merge_tags, tag_requests, tags_attribute};
use crate::api::PnapClient;
use crate::api::bmc::{
    CloudInit, EsxiConfiguration, IpBlocksConfiguration, NetworkConfiguration, OsConfiguration,
    PrivateNetworkConfiguration, PublicNetworkConfiguration, RelinquishIpBlock,
    ResetOsConfiguration, Server, ServerAction, ServerCreate, ServerIpBlock, ServerPatch,
    ServerPrivateNetwork, ServerPublicNetwork, ServerReserve, ServerReset, WindowsConfiguration,
};
use crate::provider::{HandlerFuture, ProviderError, ResourceHandler};
use crate::schema::{Attribute, Schema, ValueType};
use crate::state::{block, non_empty, round_to};
use crate::wait::{StateWaiter, WaitSettings};

/// cloud-init settings.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct CloudInitState {
    /// User data passed to cloud-init.
    pub user_data: String,
}

/// Private network attached to the server.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerPrivateNetworkState {
    /// Private network identifier.
    pub id: String,
    /// Assigned addresses.
    pub ips: Vec<String>,
    /// Whether addresses are assigned through DHCP.
    pub dhcp: Option<bool>,
    /// Membership status.
    pub status_description: String,
}

impl ServerPrivateNetworkState {
    fn overlay(&mut self, reported: &ServerPrivateNetwork) {
        self.ips.clone_from(&reported.ips);
        if reported.dhcp.is_some() {
            self.dhcp = reported.dhcp;
        }
        if let Some(status) = &reported.status_description {
            self.status_description.clone_from(status);
        }
    }
}

/// One entry of `private_networks`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct PrivateNetworkEntry {
    /// Attached private network.
    #[serde(with = "block")]
    pub server_private_network: Option<ServerPrivateNetworkState>,
}

/// Private networking of the server.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct PrivateNetworkConfigurationState {
    /// Gateway address.
    pub gateway_address: String,
    /// How the networks are configured (`USE_OR_CREATE_DEFAULT`, `USER_DEFINED`, `NONE`).
    pub configuration_type: String,
    /// Attached private networks.
    pub private_networks: Vec<PrivateNetworkEntry>,
}

/// IP block attached to the server.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerIpBlockState {
    /// IP block identifier.
    pub id: String,
    /// VLAN the block is assigned on.
    pub vlan_id: Option<i64>,
}

/// One entry of `ip_blocks`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerIpBlockEntry {
    /// Attached IP block.
    #[serde(with = "block")]
    pub server_ip_block: Option<ServerIpBlockState>,
}

/// IP block assignment of the server.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct IpBlocksConfigurationState {
    /// How the networks are configured (`USE_OR_CREATE_DEFAULT`, `USER_DEFINED`, `NONE`).
    pub configuration_type: String,
    /// IP blocks assigned to the server.
    pub ip_blocks: Vec<ServerIpBlockEntry>,
}

/// Public network attached to the server.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerPublicNetworkState {
    /// Public network identifier.
    pub id: String,
    /// Assigned addresses.
    pub ips: Vec<String>,
    /// Membership status.
    pub status_description: String,
}

/// One entry of `public_networks`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct PublicNetworkEntry {
    /// Attached public network.
    #[serde(with = "block")]
    pub server_public_network: Option<ServerPublicNetworkState>,
}

/// Public networking of the server.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct PublicNetworkConfigurationState {
    /// Attached public networks.
    pub public_networks: Vec<PublicNetworkEntry>,
}

/// Network layout of the server.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct NetworkConfigurationState {
    /// Gateway address.
    pub gateway_address: String,
    /// Private network settings.
    #[serde(with = "block")]
    pub private_network_configuration: Option<PrivateNetworkConfigurationState>,
    /// Public IP block settings.
    #[serde(with = "block")]
    pub ip_blocks_configuration: Option<IpBlocksConfigurationState>,
    /// Public network settings.
    #[serde(with = "block")]
    pub public_network_configuration: Option<PublicNetworkConfigurationState>,
}

impl NetworkConfigurationState {
    fn request(&self) -> NetworkConfiguration {
        let private = self.private_network_configuration.as_ref().and_then(|config| {
            let networks: Vec<ServerPrivateNetwork> = config
                .private_networks
                .iter()
                .filter_map(|entry| entry.server_private_network.as_ref())
                .map(|network| ServerPrivateNetwork {
                    id: network.id.clone(),
                    ips: network.ips.clone(),
                    dhcp: Some(network.dhcp.unwrap_or_default()),
                    status_description: None,
                })
                .collect();
            let declared = !config.gateway_address.is_empty()
                || !config.configuration_type.is_empty()
                || !networks.is_empty();
            declared.then(|| PrivateNetworkConfiguration {
                gateway_address: non_empty(&config.gateway_address),
                configuration_type: non_empty(&config.configuration_type),
                private_networks: networks,
            })
        });
        let ip_blocks = self
            .ip_blocks_configuration
            .as_ref()
            .map(|config| IpBlocksConfiguration {
                configuration_type: non_empty(&config.configuration_type),
                ip_blocks: config
                    .ip_blocks
                    .iter()
                    .filter_map(|entry| entry.server_ip_block.as_ref())
                    .map(|assigned| ServerIpBlock {
                        id: assigned.id.clone(),
                        vlan_id: assigned.vlan_id,
                    })
                    .collect(),
            });
        let public = self
            .public_network_configuration
            .as_ref()
            .filter(|config| !config.public_networks.is_empty())
            .map(|config| PublicNetworkConfiguration {
                public_networks: config
                    .public_networks
                    .iter()
                    .filter_map(|entry| entry.server_public_network.as_ref())
                    .map(|network| ServerPublicNetwork {
                        id: network.id.clone(),
                        ips: network.ips.clone(),
                        status_description: None,
                    })
                    .collect(),
            });
        NetworkConfiguration {
            gateway_address: non_empty(&self.gateway_address),
            private_network_configuration: private,
            ip_blocks_configuration: ip_blocks,
            public_network_configuration: public,
        }
    }

    /// Whether the configuration names IP blocks to keep after deprovision.
    fn declares_ip_blocks(&self) -> bool {
        self.ip_blocks_configuration
            .as_ref()
            .is_some_and(|config| !config.ip_blocks.is_empty())
    }

    /// Overlays the reported layout. Configured networks are refreshed by
    /// id; with none configured the reported ones are imported. IP blocks
    /// always mirror the API.
    fn merge(mut self, reported: NetworkConfiguration) -> Self {
        if let Some(gateway) = reported.gateway_address {
            self.gateway_address = gateway;
        }
        if let Some(private) = reported.private_network_configuration {
            let mut config = self.private_network_configuration.take().unwrap_or_default();
            if let Some(gateway) = private.gateway_address {
                config.gateway_address = gateway;
            }
            if let Some(kind) = private.configuration_type.filter(|kind| !kind.is_empty()) {
                config.configuration_type = kind;
            }
            merge_private_networks(&mut config.private_networks, private.private_networks);
            self.private_network_configuration = Some(config);
        }
        if let Some(ip_blocks) = reported.ip_blocks_configuration {
            let mut config = self.ip_blocks_configuration.take().unwrap_or_default();
            if config.configuration_type.is_empty() {
                config.configuration_type = ip_blocks.configuration_type.unwrap_or_default();
            }
            config.ip_blocks = ip_blocks
                .ip_blocks
                .into_iter()
                .map(|assigned| ServerIpBlockEntry {
                    server_ip_block: Some(ServerIpBlockState {
                        id: assigned.id,
                        vlan_id: assigned.vlan_id,
                    }),
                })
                .collect();
            self.ip_blocks_configuration = Some(config);
        }
        if let Some(public) = reported.public_network_configuration {
            let mut config = self.public_network_configuration.take().unwrap_or_default();
            merge_public_networks(&mut config.public_networks, public.public_networks);
            self.public_network_configuration = Some(config);
        }
        self
    }
}

fn merge_private_networks(
    configured: &mut Vec<PrivateNetworkEntry>,
    reported: Vec<ServerPrivateNetwork>,
) {
    if configured.is_empty() {
        *configured = reported
            .into_iter()
            .map(|network| PrivateNetworkEntry {
                server_private_network: Some(ServerPrivateNetworkState {
                    id: network.id,
                    ips: network.ips,
                    dhcp: network.dhcp,
                    status_description: network.status_description.unwrap_or_default(),
                }),
            })
            .collect();
        return;
    }
    for network in configured
        .iter_mut()
        .filter_map(|entry| entry.server_private_network.as_mut())
    {
        if let Some(found) = reported.iter().find(|candidate| candidate.id == network.id) {
            network.overlay(found);
        }
    }
}

fn merge_public_networks(
    configured: &mut Vec<PublicNetworkEntry>,
    reported: Vec<ServerPublicNetwork>,
) {
    if configured.is_empty() {
        *configured = reported
            .into_iter()
            .map(|network| PublicNetworkEntry {
                server_public_network: Some(ServerPublicNetworkState {
                    id: network.id,
                    ips: network.ips,
                    status_description: network.status_description.unwrap_or_default(),
                }),
            })
            .collect();
        return;
    }
    for network in configured
        .iter_mut()
        .filter_map(|entry| entry.server_public_network.as_mut())
    {
        let status = reported
            .iter()
            .find(|candidate| candidate.id == network.id)
            .and_then(|found| found.status_description.clone());
        if let Some(description) = status {
            network.status_description = description;
        }
    }
}

/// State of a server.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ServerState {
    /// Server identifier.
    pub id: String,
    /// Power and provisioning status.
    pub status: String,
    /// Server hostname.
    pub hostname: String,
    /// Server description.
    pub description: String,
    /// Private addresses.
    pub private_ip_addresses: Vec<String>,
    /// Public addresses.
    pub public_ip_addresses: Vec<String>,
    /// Operating system.
    pub os: String,
    /// Server type such as `s1.c1.small`.
    #[serde(rename = "type")]
    pub server_type: String,
    /// Ssh public keys to install.
    pub ssh_keys: Vec<String>,
    /// Location code such as `PHX`.
    pub location: String,
    /// CPU model.
    pub cpu: String,
    /// Number of CPUs.
    pub cpu_count: i64,
    /// Cores per CPU.
    pub cores_per_cpu: i64,
    /// CPU frequency in GHz.
    pub cpu_frequency_in_ghz: f64,
    /// Memory size.
    pub ram: String,
    /// Storage description.
    pub storage: String,
    /// Power action to apply on the next update.
    pub action: String,
    /// Network type (`PUBLIC_AND_PRIVATE`, `PRIVATE_ONLY`, `USER_DEFINED`).
    pub network_type: String,
    /// Install the account's default ssh keys.
    pub install_default_ssh_keys: bool,
    /// Ssh key identifiers to install.
    pub ssh_key_ids: Vec<String>,
    /// Reservation backing the server.
    pub reservation_id: String,
    /// Pricing model such as `HOURLY`.
    pub pricing_model: String,
    /// Addresses allowed to reach RDP.
    pub rdp_allowed_ips: Vec<String>,
    /// Generated administrator password.
    pub password: String,
    /// Rancher cluster the server belongs to.
    pub cluster_id: String,
    /// Management UI address.
    pub management_ui_url: String,
    /// Generated root password.
    pub root_password: String,
    /// Addresses allowed to reach the management UI.
    pub management_access_allowed_ips: Vec<String>,
    /// Boot the OS into RAM.
    pub install_os_to_ram: bool,
    /// Cloud-init user data.
    #[serde(with = "block")]
    pub cloud_init: Option<CloudInitState>,
    /// Provisioning timestamp.
    pub provisioned_on: String,
    /// Bypass soft validations on create.
    pub force: bool,
    /// Tags assigned to the server.
    pub tags: Vec<TagEntry>,
    /// Network settings.
    #[serde(with = "block")]
    pub network_configuration: Option<NetworkConfigurationState>,
}

impl ServerState {
    fn user_data(&self) -> &str {
        self.cloud_init
            .as_ref()
            .map_or("", |cloud_init| cloud_init.user_data.as_str())
    }

    fn os_configuration(&self) -> Option<OsConfiguration> {
        let wanted = !self.rdp_allowed_ips.is_empty()
            || !self.management_access_allowed_ips.is_empty()
            || self.install_os_to_ram
            || !self.user_data().is_empty();
        wanted.then(|| OsConfiguration {
            windows: (!self.rdp_allowed_ips.is_empty()).then(|| WindowsConfiguration {
                rdp_allowed_ips: self.rdp_allowed_ips.clone(),
            }),
            management_access_allowed_ips: self.management_access_allowed_ips.clone(),
            install_os_to_ram: self.install_os_to_ram.then_some(true),
            cloud_init: non_empty(self.user_data()).map(|user_data| CloudInit {
                user_data: Some(user_data),
            }),
            ..OsConfiguration::default()
        })
    }

    fn create_request(&self) -> ServerCreate {
        ServerCreate {
            hostname: self.hostname.clone(),
            description: non_empty(&self.description),
            os: self.os.clone(),
            server_type: self.server_type.clone(),
            location: self.location.clone(),
            install_default_ssh_keys: self.install_default_ssh_keys,
            ssh_keys: self.ssh_keys.clone(),
            ssh_key_ids: self.ssh_key_ids.clone(),
            reservation_id: non_empty(&self.reservation_id),
            pricing_model: non_empty(&self.pricing_model),
            network_type: non_empty(&self.network_type),
            os_configuration: self.os_configuration(),
            tags: tag_requests(&self.tags),
            network_configuration: self
                .network_configuration
                .as_ref()
                .map(NetworkConfigurationState::request),
        }
    }

    fn reset_request(&self) -> ServerReset {
        let windows = self.os.contains("windows").then(|| WindowsConfiguration {
            rdp_allowed_ips: self.rdp_allowed_ips.clone(),
        });
        let esxi = self.os.contains("esxi").then(|| EsxiConfiguration {
            management_access_allowed_ips: self.management_access_allowed_ips.clone(),
            ..EsxiConfiguration::default()
        });
        let os_configuration = (windows.is_some() || esxi.is_some())
            .then_some(ResetOsConfiguration { windows, esxi });
        ServerReset {
            install_default_ssh_keys: self.install_default_ssh_keys,
            ssh_keys: self.ssh_keys.clone(),
            ssh_key_ids: self.ssh_key_ids.clone(),
            os_configuration,
        }
    }

    /// Refreshes the reported attributes and clears `action`.
    fn overlay(mut self, server: Server) -> Self {
        self.id = server.id;
        self.status = server.status;
        self.hostname = server.hostname;
        self.description = server.description.unwrap_or_default();
        self.os = server.os.unwrap_or_default();
        self.server_type = server.server_type;
        self.location = server.location;
        self.cpu = server.cpu;
        self.cpu_count = server.cpu_count;
        self.cores_per_cpu = server.cores_per_cpu;
        self.cpu_frequency_in_ghz = round_to(server.cpu_frequency, 2);
        self.ram = server.ram;
        self.storage = server.storage;
        self.network_type = server.network_type.unwrap_or_default();
        self.action = String::new();
        self.private_ip_addresses = server.private_ip_addresses;
        self.public_ip_addresses = server.public_ip_addresses;
        self.reservation_id = server.reservation_id.unwrap_or_default();
        self.pricing_model = server.pricing_model;
        self.cluster_id = server.cluster_id.unwrap_or_default();
        if let Some(os_configuration) = server.os_configuration {
            if !os_configuration.management_access_allowed_ips.is_empty() {
                self.management_access_allowed_ips = os_configuration.management_access_allowed_ips;
            }
            if let Some(windows) = os_configuration.windows {
                self.rdp_allowed_ips = windows.rdp_allowed_ips;
            }
            self.install_os_to_ram = os_configuration.install_os_to_ram.unwrap_or_default();
            if let Some(user_data) = os_configuration
                .cloud_init
                .and_then(|cloud_init| cloud_init.user_data)
            {
                self.cloud_init = Some(CloudInitState { user_data });
            }
        }
        if let Some(provisioned_on) = server.provisioned_on {
            self.provisioned_on = provisioned_on;
        }
        self.tags = merge_tags(self.tags, &server.tags);
        self.network_configuration = Some(
            self.network_configuration
                .take()
                .unwrap_or_default()
                .merge(server.network_configuration),
        );
        self
    }
}

/// Handler for `pnap_server`.
#[derive(Clone, Copy, Debug)]
pub struct ServerResource {
    wait: WaitSettings,
}

impl ServerResource {
    /// Creates the handler with the power transition cadence.
    #[must_use]
    pub const fn new(wait: WaitSettings) -> Self {
        Self { wait }
    }

    async fn refresh(
        client: &PnapClient,
        prior: ServerState,
    ) -> Result<ServerState, ProviderError> {
        let server = client.get_server(&prior.id).await?;
        Ok(prior.overlay(server))
    }

    async fn wait_for(
        &self,
        client: &PnapClient,
        id: &str,
        pending: &'static [&'static str],
        target: &'static [&'static str],
        goal: &str,
    ) -> Result<(), ProviderError> {
        StateWaiter::new(pending, target, self.wait)
            .wait(move || async move { client.get_server(id).await.map(|server| server.status) })
            .await
            .map_err(ProviderError::wait(format!(
                "Error waiting for server ({id}) to {goal}"
            )))?;
        Ok(())
    }

    async fn wait_for_provisioning(
        &self,
        client: &PnapClient,
        id: &str,
    ) -> Result<(), ProviderError> {
        self.wait_for(
            client,
            id,
            &["creating", "resetting", "rebooting"],
            &["powered-on", "powered-off"],
            "switch to target state",
        )
        .await
    }

    async fn wait_for_power_off(&self, client: &PnapClient, id: &str) -> Result<(), ProviderError> {
        self.wait_for(client, id, &["powered-on"], &["powered-off"], "power off")
            .await
    }

    /// Runs a power action and waits for its outcome. Reset returns fresh
    /// credentials, which are stored in `state`.
    async fn run_action(
        &self,
        client: &PnapClient,
        state: &mut ServerState,
    ) -> Result<(), ProviderError> {
        let id = state.id.clone();
        match state.action.as_str() {
            "powered-on" => {
                client.server_action(&id, ServerAction::PowerOn).await?;
                self.wait_for(client, &id, &["powered-off"], &["powered-on"], "power on")
                    .await
            }
            "powered-off" => {
                client.server_action(&id, ServerAction::PowerOff).await?;
                self.wait_for_power_off(client, &id).await
            }
            "reboot" => {
                client.server_action(&id, ServerAction::Reboot).await?;
                self.wait_for_provisioning(client, &id).await
            }
            "reset" => {
                let reset = client.reset_server(&id, &state.reset_request()).await?;
                state.password = reset.password.unwrap_or_default();
                if let Some(esxi) = reset.os_configuration.and_then(|config| config.esxi) {
                    state.root_password = esxi.root_password.unwrap_or_default();
                    state.management_ui_url = esxi.management_ui_url.unwrap_or_default();
                }
                self.wait_for_provisioning(client, &id).await
            }
            "shutdown" => {
                client.server_action(&id, ServerAction::Shutdown).await?;
                self.wait_for_power_off(client, &id).await
            }
            other => {
                debug!(resource = Self::TYPE_NAME, action = other, "action not recognised");
                Err(ProviderError::UnsupportedAction)
            }
        }
    }
}

fn cloud_init_schema() -> Schema {
    Schema::new().attr("user_data", Attribute::optional(ValueType::String))
}

fn network_configuration_schema() -> Schema {
    let private_network = Schema::new()
        .attr("id", Attribute::required(ValueType::String))
        .attr("ips", Attribute::optional_computed(ValueType::string_set()))
        .attr("dhcp", Attribute::optional_computed(ValueType::Bool))
        .attr("status_description", Attribute::computed(ValueType::String));
    let private = Schema::new()
        .attr(
            "gateway_address",
            Attribute::optional_computed(ValueType::String)
                .deprecated("use network_configuration.gateway_address instead"),
        )
        .attr("configuration_type", Attribute::optional_computed(ValueType::String))
        .attr(
            "private_networks",
            Attribute::optional_computed(ValueType::blocks(Schema::new().attr(
                "server_private_network",
                Attribute::optional_computed(ValueType::block(private_network)),
            ))),
        );
    let ip_block = Schema::new()
        .attr("id", Attribute::required(ValueType::String))
        .attr("vlan_id", Attribute::optional_computed(ValueType::Int));
    let ip_blocks = Schema::new()
        .attr("configuration_type", Attribute::optional_computed(ValueType::String))
        .attr(
            "ip_blocks",
            Attribute::optional_computed(ValueType::blocks(Schema::new().attr(
                "server_ip_block",
                Attribute::optional_computed(ValueType::block(ip_block)),
            ))),
        );
    let public_network = Schema::new()
        .attr("id", Attribute::required(ValueType::String))
        .attr("ips", Attribute::required(ValueType::string_set()))
        .attr("status_description", Attribute::computed(ValueType::String));
    let public = Schema::new().attr(
        "public_networks",
        Attribute::optional_computed(ValueType::blocks(Schema::new().attr(
            "server_public_network",
            Attribute::optional_computed(ValueType::block(public_network)),
        ))),
    );
    Schema::new()
        .attr("gateway_address", Attribute::optional_computed(ValueType::String))
        .attr(
            "private_network_configuration",
            Attribute::optional_computed(ValueType::block(private)),
        )
        .attr(
            "ip_blocks_configuration",
            Attribute::optional_computed(ValueType::block(ip_blocks)),
        )
        .attr(
            "public_network_configuration",
            Attribute::optional_computed(ValueType::block(public)),
        )
}

impl ResourceHandler for ServerResource {
    type State = ServerState;

    const TYPE_NAME: &'static str = "pnap_server";

    fn schema(&self) -> Schema {
        Schema::new()
            .attr("status", Attribute::computed(ValueType::String))
            .attr("hostname", Attribute::required(ValueType::String))
            .attr("description", Attribute::optional(ValueType::String))
            .attr("private_ip_addresses", Attribute::computed(ValueType::string_set()))
            .attr("public_ip_addresses", Attribute::computed(ValueType::string_set()))
            .attr("os", Attribute::required(ValueType::String))
            .attr("type", Attribute::required(ValueType::String))
            .attr("ssh_keys", Attribute::optional(ValueType::string_set()))
            .attr("location", Attribute::required(ValueType::String))
            .attr("cpu", Attribute::computed(ValueType::String))
            .attr("cpu_count", Attribute::computed(ValueType::Int))
            .attr("cores_per_cpu", Attribute::computed(ValueType::Int))
            .attr("cpu_frequency_in_ghz", Attribute::computed(ValueType::Float))
            .attr("ram", Attribute::computed(ValueType::String))
            .attr("storage", Attribute::computed(ValueType::String))
            .attr("action", Attribute::optional(ValueType::String))
            .attr("network_type", Attribute::optional_computed(ValueType::String))
            .attr(
                "install_default_ssh_keys",
                Attribute::optional(ValueType::Bool).default(true),
            )
            .attr("ssh_key_ids", Attribute::optional(ValueType::string_set()))
            .attr("reservation_id", Attribute::optional_computed(ValueType::String))
            .attr("pricing_model", Attribute::optional_computed(ValueType::String))
            .attr("rdp_allowed_ips", Attribute::optional_computed(ValueType::string_set()))
            .attr("password", Attribute::computed(ValueType::String).sensitive())
            .attr("cluster_id", Attribute::computed(ValueType::String))
            .attr("management_ui_url", Attribute::computed(ValueType::String))
            .attr("root_password", Attribute::computed(ValueType::String))
            .attr(
                "management_access_allowed_ips",
                Attribute::optional_computed(ValueType::string_set()),
            )
            .attr("install_os_to_ram", Attribute::optional_computed(ValueType::Bool))
            .attr(
                "cloud_init",
                Attribute::optional_computed(ValueType::block(cloud_init_schema())),
            )
            .attr("provisioned_on", Attribute::computed(ValueType::String))
            .attr("force", Attribute::optional(ValueType::Bool))
            .attr("tags", tags_attribute())
            .attr(
                "network_configuration",
                Attribute::optional_computed(ValueType::block(network_configuration_schema())),
            )
    }

    fn create<'a>(
        &'a self,
        client: &'a PnapClient,
        plan: ServerState,
    ) -> HandlerFuture<'a, ServerState> {
        Box::pin(async move {
            let created = client
                .create_server(&plan.create_request(), plan.force)
                .await?;
            info!(
                resource = Self::TYPE_NAME,
                id = %created.id,
                hostname = %plan.hostname,
                "server provisioning"
            );
            let mut provisioned = ServerState {
                id: created.id,
                password: created.password.unwrap_or_default(),
                ..plan
            };
            if let Some(os_configuration) = created.os_configuration {
                provisioned.root_password = os_configuration.root_password.unwrap_or_default();
                provisioned.management_ui_url =
                    os_configuration.management_ui_url.unwrap_or_default();
            }
            self.wait_for_provisioning(client, &provisioned.id)
                .await
                .map_err(|err| err.with_state(&provisioned))?;
            Self::refresh(client, provisioned.clone())
                .await
                .map_err(|err| err.with_state(&provisioned))
        })
    }

    fn read<'a>(
        &'a self,
        client: &'a PnapClient,
        prior: ServerState,
    ) -> HandlerFuture<'a, ServerState> {
        Box::pin(Self::refresh(client, prior))
    }

    fn update<'a>(
        &'a self,
        client: &'a PnapClient,
        prior: ServerState,
        plan: ServerState,
    ) -> HandlerFuture<'a, ServerState> {
        Box::pin(async move {
            let mut next = ServerState {
                id: prior.id.clone(),
                password: prior.password.clone(),
                root_password: prior.root_password.clone(),
                management_ui_url: prior.management_ui_url.clone(),
                ..plan
            };
            let planned_tags = tag_requests(&next.tags);
            if next.action != prior.action {
                self.run_action(client, &mut next).await?;
                info!(
                    resource = Self::TYPE_NAME,
                    id = %next.id,
                    action = %next.action,
                    "server action completed"
                );
            } else if next.pricing_model != prior.pricing_model {
                let request = ServerReserve {
                    pricing_model: next.pricing_model.clone(),
                };
                client.reserve_server(&next.id, &request).await?;
            } else if planned_tags != tag_requests(&prior.tags) {
                client.set_server_tags(&next.id, &planned_tags).await?;
            } else if next.hostname != prior.hostname || next.description != prior.description {
                let request = ServerPatch {
                    hostname: next.hostname.clone(),
                    description: next.description.clone(),
                };
                client.patch_server(&next.id, &request).await?;
            } else {
                return Err(ProviderError::UnsupportedAction);
            }
            Self::refresh(client, next).await
        })
    }

    fn delete<'a>(&'a self, client: &'a PnapClient, prior: ServerState) -> HandlerFuture<'a, ()> {
        Box::pin(async move {
            let keep_ip_blocks = prior
                .network_configuration
                .as_ref()
                .is_some_and(NetworkConfigurationState::declares_ip_blocks);
            let request = RelinquishIpBlock {
                delete_ip_blocks: !keep_ip_blocks,
            };
            client.deprovision_server(&prior.id, &request).await?;
            info!(
                resource = Self::TYPE_NAME,
                id = %prior.id,
                delete_ip_blocks = !keep_ip_blocks,
                "server deprovisioned"
            );
            Ok(())
        })
    }
}
