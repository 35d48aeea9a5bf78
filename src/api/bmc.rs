//! Bare Metal Cloud service: servers, ssh keys and quotas.

use serde::{Deserialize, Serialize};

use super::tags::{TagAssignment, TagAssignmentRequest};
use super::{ApiError, ApiRequest, Method, PnapClient, Service};

/// Server record returned by the API.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Server {
    /// Server identifier.
    pub id: String,
    /// Power and provisioning status.
    pub status: String,
    /// Server hostname.
    pub hostname: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Operating system.
    pub os: Option<String>,
    /// Server type such as `s1.c1.small`.
    #[serde(rename = "type")]
    pub server_type: String,
    /// Location code such as `PHX`.
    pub location: String,
    /// CPU model.
    pub cpu: String,
    /// Number of CPUs.
    pub cpu_count: i64,
    /// Cores per CPU.
    pub cores_per_cpu: i64,
    /// CPU frequency in GHz.
    pub cpu_frequency: f64,
    /// Memory size.
    pub ram: String,
    /// Storage description.
    pub storage: String,
    /// Private addresses.
    pub private_ip_addresses: Vec<String>,
    /// Public addresses.
    pub public_ip_addresses: Vec<String>,
    /// Reservation backing the server.
    pub reservation_id: Option<String>,
    /// Pricing model such as `HOURLY`.
    pub pricing_model: String,
    /// Generated administrator password.
    pub password: Option<String>,
    /// Network type (`PUBLIC_AND_PRIVATE`, `PRIVATE_ONLY`, `USER_DEFINED`).
    pub network_type: Option<String>,
    /// Rancher cluster the server belongs to.
    pub cluster_id: Option<String>,
    /// Tags assigned to the server.
    pub tags: Vec<TagAssignment>,
    /// Provisioning timestamp.
    pub provisioned_on: Option<String>,
    /// Operating system settings.
    pub os_configuration: Option<OsConfiguration>,
    /// Network settings.
    pub network_configuration: NetworkConfiguration,
}

/// Operating system settings of a server.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct OsConfiguration {
    /// Windows specific settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub windows: Option<WindowsConfiguration>,
    /// Generated root password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_password: Option<String>,
    /// Management UI address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub management_ui_url: Option<String>,
    /// Addresses allowed to reach the management UI.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub management_access_allowed_ips: Vec<String>,
    /// Boot the OS into RAM.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_os_to_ram: Option<bool>,
    /// Cloud-init user data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_init: Option<CloudInit>,
}

/// Windows specific settings.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct WindowsConfiguration {
    /// Addresses allowed to reach RDP.
    pub rdp_allowed_ips: Vec<String>,
}

/// ESXi specific settings used by the reset action.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct EsxiConfiguration {
    /// Generated root password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_password: Option<String>,
    /// Management UI address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub management_ui_url: Option<String>,
    /// Addresses allowed to reach the management UI.
    pub management_access_allowed_ips: Vec<String>,
}

/// cloud-init payload.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct CloudInit {
    /// User data passed to cloud-init.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_data: Option<String>,
}

/// Networking layout of a server.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct NetworkConfiguration {
    /// Gateway address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_address: Option<String>,
    /// Private network settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_network_configuration: Option<PrivateNetworkConfiguration>,
    /// Public IP block settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_blocks_configuration: Option<IpBlocksConfiguration>,
    /// Public network settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_network_configuration: Option<PublicNetworkConfiguration>,
}

/// Private network attachments of a server.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct PrivateNetworkConfiguration {
    /// Gateway address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_address: Option<String>,
    /// How the networks are configured (`USE_OR_CREATE_DEFAULT`, `USER_DEFINED`, `NONE`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration_type: Option<String>,
    /// Attached private networks.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub private_networks: Vec<ServerPrivateNetwork>,
}

/// One private network attached to a server.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerPrivateNetwork {
    /// Private network identifier.
    pub id: String,
    /// Assigned addresses.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ips: Vec<String>,
    /// Whether addresses are assigned through DHCP.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dhcp: Option<bool>,
    /// Membership status.
    #[serde(skip_serializing)]
    pub status_description: Option<String>,
}

/// IP block attachments of a server.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct IpBlocksConfiguration {
    /// How the networks are configured (`USE_OR_CREATE_DEFAULT`, `USER_DEFINED`, `NONE`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration_type: Option<String>,
    /// IP blocks assigned to the server.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ip_blocks: Vec<ServerIpBlock>,
}

/// One IP block attached to a server.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerIpBlock {
    /// IP block identifier.
    pub id: String,
    /// VLAN the block is assigned on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vlan_id: Option<i64>,
}

/// Public network attachments of a server.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct PublicNetworkConfiguration {
    /// Attached public networks.
    pub public_networks: Vec<ServerPublicNetwork>,
}

/// One public network attached to a server.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerPublicNetwork {
    /// Public network identifier.
    pub id: String,
    /// Assigned addresses.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ips: Vec<String>,
    /// Membership status.
    #[serde(skip_serializing)]
    pub status_description: Option<String>,
}

/// Body of the server provisioning request.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServerCreate {
    /// Server hostname.
    pub hostname: String,
    /// Server description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Operating system.
    pub os: String,
    /// Server type such as `s1.c1.small`.
    #[serde(rename = "type")]
    pub server_type: String,
    /// Location code such as `PHX`.
    pub location: String,
    /// Install the account's default ssh keys.
    pub install_default_ssh_keys: bool,
    /// Ssh public keys to install.
    pub ssh_keys: Vec<String>,
    /// Ssh key identifiers to install.
    pub ssh_key_ids: Vec<String>,
    /// Reservation backing the server.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reservation_id: Option<String>,
    /// Pricing model such as `HOURLY`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pricing_model: Option<String>,
    /// Network type (`PUBLIC_AND_PRIVATE`, `PRIVATE_ONLY`, `USER_DEFINED`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_type: Option<String>,
    /// Operating system settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os_configuration: Option<OsConfiguration>,
    /// Tags to assign.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<TagAssignmentRequest>,
    /// Network settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_configuration: Option<NetworkConfiguration>,
}

/// Hostname/description patch.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServerPatch {
    /// New hostname.
    pub hostname: String,
    /// New description.
    pub description: String,
}

/// Body of the deprecated reset action.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServerReset {
    /// Install the account's default ssh keys.
    pub install_default_ssh_keys: bool,
    /// Ssh public keys to install.
    pub ssh_keys: Vec<String>,
    /// Ssh key identifiers to install.
    pub ssh_key_ids: Vec<String>,
    /// Operating system settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os_configuration: Option<ResetOsConfiguration>,
}

/// OS settings accepted by the reset action.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ResetOsConfiguration {
    /// Windows specific settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub windows: Option<WindowsConfiguration>,
    /// ESXi specific settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub esxi: Option<EsxiConfiguration>,
}

/// Outcome of a reset action.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ResetResult {
    /// Outcome message.
    pub result: String,
    /// New administrator password.
    pub password: Option<String>,
    /// Operating system settings.
    pub os_configuration: Option<ResetOsConfiguration>,
}

/// Outcome of create: credentials only reported once.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerCreated {
    /// Server identifier.
    pub id: String,
    /// Generated administrator password.
    pub password: Option<String>,
    /// Operating system settings.
    pub os_configuration: Option<OsConfiguration>,
}

/// Switches a server to a reserved pricing model.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServerReserve {
    /// Reserved pricing model to switch to.
    pub pricing_model: String,
}

/// Deprovision options.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RelinquishIpBlock {
    /// Release the server's IP blocks together with it.
    pub delete_ip_blocks: bool,
}

/// Power and lifecycle actions exposed under `servers/{id}/actions`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ServerAction {
    /// Power the server on.
    PowerOn,
    /// Hard power off.
    PowerOff,
    /// Reboot.
    Reboot,
    /// Graceful ACPI shutdown.
    Shutdown,
}

impl ServerAction {
    const fn path_segment(self) -> &'static str {
        match self {
            Self::PowerOn => "power-on",
            Self::PowerOff => "power-off",
            Self::Reboot => "reboot",
            Self::Shutdown => "shutdown",
        }
    }
}

/// SSH key record.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct SshKey {
    /// Key identifier.
    pub id: String,
    /// Whether the key is installed on new servers by default.
    pub default: bool,
    /// Friendly key name.
    pub name: String,
    /// Public key in OpenSSH format.
    pub key: String,
    /// Key fingerprint.
    pub fingerprint: String,
    /// Creation timestamp.
    pub created_on: String,
    /// Last update timestamp.
    pub last_updated_on: String,
}

/// SSH key creation request.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SshKeyCreate {
    /// Whether the key is installed on new servers by default.
    pub default: bool,
    /// Friendly key name.
    pub name: String,
    /// Public key in OpenSSH format.
    pub key: String,
}

/// SSH key update request.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SshKeyUpdate {
    /// Whether the key is installed on new servers by default.
    pub default: bool,
    /// Friendly key name.
    pub name: String,
}

/// Account quota record.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Quota {
    /// Identifier.
    pub id: String,
    /// Quota name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Whether the quota is enforced.
    pub status: String,
    /// Current limit.
    pub limit: i64,
    /// Unit the limit is counted in.
    pub unit: String,
    /// Amount in use.
    pub used: i64,
    /// Pending limit change requests.
    pub quota_edit_limit_request_details: Vec<QuotaEditLimitRequestDetails>,
}

/// Pending quota increase request.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct QuotaEditLimitRequestDetails {
    /// Requested limit.
    pub limit: i64,
    /// Reason given for the request.
    pub reason: String,
    /// When the change was requested.
    pub requested_on: String,
}

impl PnapClient {
    /// Lists all servers of the account.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn list_servers(&self) -> Result<Vec<Server>, ApiError> {
        self.call(ApiRequest::new(Service::Bmc, Method::Get, "servers"))
            .await
    }

    /// Fetches a single server.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn get_server(&self, id: &str) -> Result<Server, ApiError> {
        self.call(ApiRequest::new(Service::Bmc, Method::Get, format!("servers/{id}")))
            .await
    }

    /// Provisions a server. `force` overrides capacity and reservation checks.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn create_server(
        &self,
        request: &ServerCreate,
        force: bool,
    ) -> Result<ServerCreated, ApiError> {
        let call = ApiRequest::new(Service::Bmc, Method::Post, "servers")
            .query("force", force)
            .json(request)?;
        self.call(call).await
    }

    /// Updates hostname and description.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn patch_server(&self, id: &str, request: &ServerPatch) -> Result<Server, ApiError> {
        let call =
            ApiRequest::new(Service::Bmc, Method::Patch, format!("servers/{id}")).json(request)?;
        self.call(call).await
    }

    /// Triggers a power action.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn server_action(&self, id: &str, action: ServerAction) -> Result<(), ApiError> {
        let path = format!("servers/{id}/actions/{}", action.path_segment());
        self.call_empty(ApiRequest::new(Service::Bmc, Method::Post, path))
            .await
    }

    /// Reinstalls the operating system (deprecated API action).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn reset_server(
        &self,
        id: &str,
        request: &ServerReset,
    ) -> Result<ResetResult, ApiError> {
        let call = ApiRequest::new(
            Service::Bmc,
            Method::Post,
            format!("servers/{id}/actions/reset"),
        )
        .json(request)?;
        self.call(call).await
    }

    /// Moves the server to a reserved pricing model.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn reserve_server(&self, id: &str, request: &ServerReserve) -> Result<(), ApiError> {
        let call = ApiRequest::new(
            Service::Bmc,
            Method::Post,
            format!("servers/{id}/actions/reserve"),
        )
        .json(request)?;
        self.call_empty(call).await
    }

    /// Replaces the server's tag assignments.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn set_server_tags(
        &self,
        id: &str,
        tags: &[TagAssignmentRequest],
    ) -> Result<(), ApiError> {
        let call =
            ApiRequest::new(Service::Bmc, Method::Put, format!("servers/{id}/tags")).json(&tags)?;
        self.call_empty(call).await
    }

    /// Deprovisions the server, optionally releasing its IP blocks.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn deprovision_server(
        &self,
        id: &str,
        request: &RelinquishIpBlock,
    ) -> Result<(), ApiError> {
        let call = ApiRequest::new(
            Service::Bmc,
            Method::Post,
            format!("servers/{id}/actions/deprovision"),
        )
        .json(request)?;
        self.call_empty(call).await
    }

    /// Lists ssh keys.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn list_ssh_keys(&self) -> Result<Vec<SshKey>, ApiError> {
        self.call(ApiRequest::new(Service::Bmc, Method::Get, "ssh-keys"))
            .await
    }

    /// Fetches one ssh key.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn get_ssh_key(&self, id: &str) -> Result<SshKey, ApiError> {
        self.call(ApiRequest::new(Service::Bmc, Method::Get, format!("ssh-keys/{id}")))
            .await
    }

    /// Uploads an ssh key.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn create_ssh_key(&self, request: &SshKeyCreate) -> Result<SshKey, ApiError> {
        let call = ApiRequest::new(Service::Bmc, Method::Post, "ssh-keys").json(request)?;
        self.call(call).await
    }

    /// Renames an ssh key or toggles its default flag.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn update_ssh_key(
        &self,
        id: &str,
        request: &SshKeyUpdate,
    ) -> Result<SshKey, ApiError> {
        let call =
            ApiRequest::new(Service::Bmc, Method::Put, format!("ssh-keys/{id}")).json(request)?;
        self.call(call).await
    }

    /// Deletes an ssh key. A key that is already gone is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn delete_ssh_key(&self, id: &str) -> Result<(), ApiError> {
        match self
            .call_empty(ApiRequest::new(Service::Bmc, Method::Delete, format!("ssh-keys/{id}")))
            .await
        {
            Err(err) if err.is_not_found() => Ok(()),
            other => other,
        }
    }

    /// Lists account quotas.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn list_quotas(&self) -> Result<Vec<Quota>, ApiError> {
        self.call(ApiRequest::new(Service::Bmc, Method::Get, "quotas"))
            .await
    }

    /// Fetches one quota.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn get_quota(&self, id: &str) -> Result<Quota, ApiError> {
        self.call(ApiRequest::new(Service::Bmc, Method::Get, format!("quotas/{id}")))
            .await
    }
}
