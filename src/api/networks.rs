//! Networks service: private networks, public networks and BGP peer groups.

use serde::{Deserialize, Serialize};

use super::{ApiError, ApiRequest, Method, PnapClient, Service};

/// Resource attached to a network.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct NetworkMembership {
    /// Attached resource.
    pub resource_id: String,
    /// Kind of the attached resource.
    pub resource_type: String,
    /// Assigned addresses.
    pub ips: Vec<String>,
}

/// Server attached to a private network (legacy view of memberships).
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct PrivateNetworkServer {
    /// Server identifier.
    pub id: String,
    /// Assigned addresses.
    pub ips: Vec<String>,
}

/// Private network record.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct PrivateNetwork {
    /// Identifier.
    pub id: String,
    /// Network type (`PRIVATE`).
    #[serde(rename = "type")]
    pub network_type: String,
    /// Name.
    pub name: String,
    /// Location code such as `PHX`.
    pub location: String,
    /// Whether this is the default network for its location.
    pub location_default: bool,
    /// Free-form description.
    pub description: Option<String>,
    /// VLAN identifier.
    pub vlan_id: i64,
    /// CIDR notation of the range.
    pub cidr: String,
    /// Servers on the network.
    pub servers: Vec<PrivateNetworkServer>,
    /// Resources attached to the network.
    pub memberships: Vec<NetworkMembership>,
    /// Provisioning status.
    pub status: String,
    /// Creation timestamp.
    pub created_on: String,
}

/// Private network creation request.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PrivateNetworkCreate {
    /// Name.
    pub name: String,
    /// Location code such as `PHX`.
    pub location: String,
    /// Whether this is the default network for its location.
    pub location_default: bool,
    /// Free-form description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// CIDR notation of the range.
    pub cidr: String,
    /// VLAN identifier; omitted to let the API choose.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vlan_id: Option<i64>,
}

/// Private network update request.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PrivateNetworkModify {
    /// New name.
    pub name: String,
    /// New description.
    pub description: String,
    /// Whether this is the default network for its location.
    pub location_default: bool,
}

/// IP block assigned to a public network.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct PublicNetworkIpBlock {
    /// IP block identifier.
    pub id: String,
    /// CIDR of the block.
    pub cidr: String,
    /// Number of addresses in use.
    pub used_ips_count: String,
}

/// Public network record.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct PublicNetwork {
    /// Identifier.
    pub id: String,
    /// VLAN identifier.
    pub vlan_id: i64,
    /// Resources attached to the network.
    pub memberships: Vec<NetworkMembership>,
    /// Name.
    pub name: String,
    /// Location code such as `PHX`.
    pub location: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Provisioning status.
    pub status: String,
    /// Creation timestamp.
    pub created_on: String,
    /// Attached IP blocks.
    pub ip_blocks: Vec<PublicNetworkIpBlock>,
    /// Whether router advertisement is enabled.
    pub ra_enabled: Option<bool>,
}

/// Reference to an existing IP block.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PublicNetworkIpBlockRef {
    /// IP block identifier.
    pub id: String,
}

/// Public network creation request.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PublicNetworkCreate {
    /// Name.
    pub name: String,
    /// Location code such as `PHX`.
    pub location: String,
    /// Free-form description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// VLAN identifier; omitted to let the API choose.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vlan_id: Option<i64>,
    /// IP blocks to attach.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ip_blocks: Vec<PublicNetworkIpBlockRef>,
    /// Whether router advertisement is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ra_enabled: Option<bool>,
}

/// Public network patch. Absent fields stay untouched.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PublicNetworkModify {
    /// New name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New router advertisement setting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ra_enabled: Option<bool>,
}

/// IPv4 prefix advertised by a BGP peer group.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct BgpIpv4Prefix {
    /// Allocation identifier.
    pub ipv4_allocation_id: String,
    /// CIDR notation of the range.
    pub cidr: String,
    /// Prefix status.
    pub status: String,
    /// Whether the prefix was brought by the customer.
    pub is_bring_your_own_ip: bool,
    /// Whether the prefix is in use.
    pub in_use: bool,
}

/// IP prefix advertised by a BGP peer group.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct BgpIpPrefix {
    /// Allocation identifier.
    pub ip_allocation_id: String,
    /// CIDR notation of the range.
    pub cidr: String,
    /// IP version (`V4` or `V6`).
    pub ip_version: String,
    /// Prefix status.
    pub status: String,
}

/// ASN verification details.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct AsnDetails {
    /// Autonomous system number.
    pub asn: i64,
    /// Whether the resource was brought by the customer.
    pub is_bring_your_own: bool,
    /// ASN verification status.
    pub verification_status: String,
    /// Why verification failed.
    pub verification_reason: Option<String>,
}

/// BGP peer group record.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct BgpPeerGroup {
    /// Identifier.
    pub id: String,
    /// Peering status.
    pub status: String,
    /// Location code such as `PHX`.
    pub location: String,
    /// Announced IPv4 prefixes.
    pub ipv4_prefixes: Vec<BgpIpv4Prefix>,
    /// Announced IP prefixes.
    pub ip_prefixes: Vec<BgpIpPrefix>,
    /// ASN requested for the peering session.
    pub target_asn_details: AsnDetails,
    /// ASN currently active on the peering session.
    pub active_asn_details: Option<AsnDetails>,
    /// BGP session password.
    pub password: String,
    /// Which routes are advertised to the peer (`DEFAULT` or `NONE`).
    pub advertised_routes: String,
    /// RPKI ROA origin ASN.
    pub rpki_roa_origin_asn: i64,
    /// eBGP multi-hop count.
    pub e_bgp_multi_hop: i64,
    /// IPv4 peering loopbacks.
    pub peering_loopbacks_v4: Vec<String>,
    /// IPv6 peering loopbacks.
    pub peering_loopbacks_v6: Vec<String>,
    /// BGP keep-alive timer in seconds.
    pub keep_alive_timer_seconds: i64,
    /// BGP hold timer in seconds.
    pub hold_timer_seconds: i64,
    /// Creation timestamp.
    pub created_on: Option<String>,
    /// Last update timestamp.
    pub last_updated_on: Option<String>,
}

/// BGP peer group creation request.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BgpPeerGroupCreate {
    /// Location code such as `PHX`.
    pub location: String,
    /// Autonomous system number.
    pub asn: i64,
    /// BGP session password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Which routes are advertised to the peer (`DEFAULT` or `NONE`).
    pub advertised_routes: String,
}

/// BGP peer group patch carrying only the changed fields.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BgpPeerGroupPatch {
    /// New ASN.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asn: Option<i64>,
    /// New BGP session password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// New advertised routes setting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advertised_routes: Option<String>,
}

impl PnapClient {
    /// Lists private networks.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn list_private_networks(&self) -> Result<Vec<PrivateNetwork>, ApiError> {
        self.call(ApiRequest::new(Service::Networks, Method::Get, "private-networks"))
            .await
    }

    /// Fetches one private network.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn get_private_network(&self, id: &str) -> Result<PrivateNetwork, ApiError> {
        let path = format!("private-networks/{id}");
        self.call(ApiRequest::new(Service::Networks, Method::Get, path))
            .await
    }

    /// Creates a private network.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn create_private_network(
        &self,
        request: &PrivateNetworkCreate,
        force: bool,
    ) -> Result<PrivateNetwork, ApiError> {
        let call = ApiRequest::new(Service::Networks, Method::Post, "private-networks")
            .query("force", force)
            .json(request)?;
        self.call(call).await
    }

    /// Replaces the mutable settings of a private network.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn update_private_network(
        &self,
        id: &str,
        request: &PrivateNetworkModify,
    ) -> Result<PrivateNetwork, ApiError> {
        let call = ApiRequest::new(Service::Networks, Method::Put, format!("private-networks/{id}"))
            .json(request)?;
        self.call(call).await
    }

    /// Deletes a private network.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn delete_private_network(&self, id: &str) -> Result<(), ApiError> {
        let path = format!("private-networks/{id}");
        self.call_empty(ApiRequest::new(Service::Networks, Method::Delete, path))
            .await
    }

    /// Lists public networks.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn list_public_networks(&self) -> Result<Vec<PublicNetwork>, ApiError> {
        self.call(ApiRequest::new(Service::Networks, Method::Get, "public-networks"))
            .await
    }

    /// Fetches one public network.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn get_public_network(&self, id: &str) -> Result<PublicNetwork, ApiError> {
        let path = format!("public-networks/{id}");
        self.call(ApiRequest::new(Service::Networks, Method::Get, path))
            .await
    }

    /// Creates a public network.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn create_public_network(
        &self,
        request: &PublicNetworkCreate,
    ) -> Result<PublicNetwork, ApiError> {
        let call =
            ApiRequest::new(Service::Networks, Method::Post, "public-networks").json(request)?;
        self.call(call).await
    }

    /// Patches a public network.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn patch_public_network(
        &self,
        id: &str,
        request: &PublicNetworkModify,
    ) -> Result<PublicNetwork, ApiError> {
        let path = format!("public-networks/{id}");
        let call = ApiRequest::new(Service::Networks, Method::Patch, path).json(request)?;
        self.call(call).await
    }

    /// Deletes a public network.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn delete_public_network(&self, id: &str) -> Result<(), ApiError> {
        let path = format!("public-networks/{id}");
        self.call_empty(ApiRequest::new(Service::Networks, Method::Delete, path))
            .await
    }

    /// Assigns an IP block to a public network.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn add_public_network_ip_block(
        &self,
        network_id: &str,
        ip_block_id: &str,
    ) -> Result<(), ApiError> {
        let path = format!("public-networks/{network_id}/ip-blocks");
        let body = PublicNetworkIpBlockRef {
            id: ip_block_id.to_owned(),
        };
        let call = ApiRequest::new(Service::Networks, Method::Post, path).json(&body)?;
        self.call_empty(call).await
    }

    /// Removes an IP block from a public network.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn remove_public_network_ip_block(
        &self,
        network_id: &str,
        ip_block_id: &str,
        force: bool,
    ) -> Result<(), ApiError> {
        let path = format!("public-networks/{network_id}/ip-blocks/{ip_block_id}");
        let call = ApiRequest::new(Service::Networks, Method::Delete, path).query("force", force);
        self.call_empty(call).await
    }

    /// Lists BGP peer groups, optionally in one location.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn list_bgp_peer_groups(
        &self,
        location: Option<&str>,
    ) -> Result<Vec<BgpPeerGroup>, ApiError> {
        let call = ApiRequest::new(Service::Networks, Method::Get, "bgp-peer-groups")
            .query_opt("location", location);
        self.call(call).await
    }

    /// Fetches one BGP peer group.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn get_bgp_peer_group(&self, id: &str) -> Result<BgpPeerGroup, ApiError> {
        let path = format!("bgp-peer-groups/{id}");
        self.call(ApiRequest::new(Service::Networks, Method::Get, path))
            .await
    }

    /// Creates a BGP peer group.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn create_bgp_peer_group(
        &self,
        request: &BgpPeerGroupCreate,
    ) -> Result<BgpPeerGroup, ApiError> {
        let call =
            ApiRequest::new(Service::Networks, Method::Post, "bgp-peer-groups").json(request)?;
        self.call(call).await
    }

    /// Patches a BGP peer group.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn patch_bgp_peer_group(
        &self,
        id: &str,
        request: &BgpPeerGroupPatch,
    ) -> Result<BgpPeerGroup, ApiError> {
        let path = format!("bgp-peer-groups/{id}");
        let call = ApiRequest::new(Service::Networks, Method::Patch, path).json(request)?;
        self.call(call).await
    }

    /// Deletes a BGP peer group.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn delete_bgp_peer_group(&self, id: &str) -> Result<(), ApiError> {
        let path = format!("bgp-peer-groups/{id}");
        self.call_empty(ApiRequest::new(Service::Networks, Method::Delete, path))
            .await
    }
}
