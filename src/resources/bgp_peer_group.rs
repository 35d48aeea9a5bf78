//! `pnap_bgp_peer_group`: BGP sessions advertising customer prefixes.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::PnapClient;
use crate::api::networks::{
    AsnDetails, BgpIpPrefix, BgpIpv4Prefix, BgpPeerGroup, BgpPeerGroupCreate, BgpPeerGroupPatch,
};
use crate::provider::{HandlerFuture, ProviderError, ResourceHandler};
use crate::schema::{Attribute, Schema, ValueType};
use crate::state::{block, non_empty};

/// IPv4 prefix advertised by the group.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Ipv4PrefixState {
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

impl From<BgpIpv4Prefix> for Ipv4PrefixState {
    fn from(prefix: BgpIpv4Prefix) -> Self {
        Self {
            ipv4_allocation_id: prefix.ipv4_allocation_id,
            cidr: prefix.cidr,
            status: prefix.status,
            is_bring_your_own_ip: prefix.is_bring_your_own_ip,
            in_use: prefix.in_use,
        }
    }
}

/// IPv4 or IPv6 prefix advertised by the group.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct IpPrefixState {
    /// Allocation identifier.
    pub ip_allocation_id: String,
    /// CIDR notation of the range.
    pub cidr: String,
    /// IP version (`V4` or `V6`).
    pub ip_version: String,
    /// Prefix status.
    pub status: String,
}

impl From<BgpIpPrefix> for IpPrefixState {
    fn from(prefix: BgpIpPrefix) -> Self {
        Self {
            ip_allocation_id: prefix.ip_allocation_id,
            cidr: prefix.cidr,
            ip_version: prefix.ip_version,
            status: prefix.status,
        }
    }
}

/// ASN and its verification outcome.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct AsnDetailsState {
    /// Autonomous system number.
    pub asn: i64,
    /// Whether the resource was brought by the customer.
    pub is_bring_your_own: bool,
    /// ASN verification status.
    pub verification_status: String,
    /// Why verification failed.
    pub verification_reason: String,
}

impl From<AsnDetails> for AsnDetailsState {
    fn from(details: AsnDetails) -> Self {
        Self {
            asn: details.asn,
            is_bring_your_own: details.is_bring_your_own,
            verification_status: details.verification_status,
            verification_reason: details.verification_reason.unwrap_or_default(),
        }
    }
}

/// State of a BGP peer group.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct BgpPeerGroupState {
    /// Identifier.
    pub id: String,
    /// Location code such as `PHX`.
    pub location: String,
    /// Autonomous system number.
    pub asn: i64,
    /// BGP session password.
    pub password: String,
    /// Which routes are advertised to the peer (`DEFAULT` or `NONE`).
    pub advertised_routes: String,
    /// Peering status.
    pub status: String,
    /// Announced IPv4 prefixes.
    pub ipv4_prefixes: Vec<Ipv4PrefixState>,
    /// Announced IP prefixes.
    pub ip_prefixes: Vec<IpPrefixState>,
    /// ASN requested for the peering session.
    #[serde(with = "block")]
    pub target_asn_details: Option<AsnDetailsState>,
    /// ASN currently active on the peering session.
    #[serde(with = "block")]
    pub active_asn_details: Option<AsnDetailsState>,
    /// RPKI ROA origin ASN.
    pub rpki_roa_origin_asn: i64,
    /// eBGP multi-hop count.
    pub ebgp_multi_hop: i64,
    /// IPv4 peering loopbacks.
    pub peering_loopbacks_v4: Vec<String>,
    /// IPv6 peering loopbacks.
    pub peering_loopbacks_v6: Vec<String>,
    /// BGP keep-alive timer in seconds.
    pub keep_alive_timer_seconds: i64,
    /// BGP hold timer in seconds.
    pub hold_timer_seconds: i64,
    /// Creation timestamp.
    pub created_on: String,
    /// Last update timestamp.
    pub last_updated_on: String,
}

impl BgpPeerGroupState {
    /// Flattens an API record. `asn` comes from the configuration since the
    /// API reports it inside the ASN details only.
    pub(crate) fn flatten(group: BgpPeerGroup, asn: i64) -> Self {
        Self {
            id: group.id,
            location: group.location,
            asn,
            password: group.password,
            advertised_routes: group.advertised_routes,
            status: group.status,
            ipv4_prefixes: group.ipv4_prefixes.into_iter().map(Into::into).collect(),
            ip_prefixes: group.ip_prefixes.into_iter().map(Into::into).collect(),
            target_asn_details: Some(group.target_asn_details.into()),
            active_asn_details: group.active_asn_details.map(Into::into),
            rpki_roa_origin_asn: group.rpki_roa_origin_asn,
            ebgp_multi_hop: group.e_bgp_multi_hop,
            peering_loopbacks_v4: group.peering_loopbacks_v4,
            peering_loopbacks_v6: group.peering_loopbacks_v6,
            keep_alive_timer_seconds: group.keep_alive_timer_seconds,
            hold_timer_seconds: group.hold_timer_seconds,
            created_on: group.created_on.unwrap_or_default(),
            last_updated_on: group.last_updated_on.unwrap_or_default(),
        }
    }
}

fn asn_details_schema() -> Schema {
    Schema::new()
        .attr("asn", Attribute::computed(ValueType::Int))
        .attr("is_bring_your_own", Attribute::computed(ValueType::Bool))
        .attr("verification_status", Attribute::computed(ValueType::String))
        .attr("verification_reason", Attribute::computed(ValueType::String))
}

/// Computed attributes shared with the BGP peer group data source.
pub(crate) fn computed_attributes(schema: Schema) -> Schema {
    let ipv4_prefix = Schema::new()
        .attr("ipv4_allocation_id", Attribute::computed(ValueType::String))
        .attr("cidr", Attribute::computed(ValueType::String))
        .attr("status", Attribute::computed(ValueType::String))
        .attr("is_bring_your_own_ip", Attribute::computed(ValueType::Bool))
        .attr("in_use", Attribute::computed(ValueType::Bool));
    let ip_prefix = Schema::new()
        .attr("ip_allocation_id", Attribute::computed(ValueType::String))
        .attr("cidr", Attribute::computed(ValueType::String))
        .attr("ip_version", Attribute::computed(ValueType::String))
        .attr("status", Attribute::computed(ValueType::String));
    schema
        .attr("status", Attribute::computed(ValueType::String))
        .attr(
            "ipv4_prefixes",
            Attribute::computed(ValueType::blocks(ipv4_prefix))
                .deprecated("use ip_prefixes instead"),
        )
        .attr("ip_prefixes", Attribute::computed(ValueType::blocks(ip_prefix)))
        .attr(
            "target_asn_details",
            Attribute::computed(ValueType::block(asn_details_schema())),
        )
        .attr(
            "active_asn_details",
            Attribute::computed(ValueType::block(asn_details_schema())),
        )
        .attr("rpki_roa_origin_asn", Attribute::computed(ValueType::Int))
        .attr("ebgp_multi_hop", Attribute::computed(ValueType::Int))
        .attr("peering_loopbacks_v4", Attribute::computed(ValueType::string_list()))
        .attr("peering_loopbacks_v6", Attribute::computed(ValueType::string_list()))
        .attr("keep_alive_timer_seconds", Attribute::computed(ValueType::Int))
        .attr("hold_timer_seconds", Attribute::computed(ValueType::Int))
        .attr("created_on", Attribute::computed(ValueType::String))
        .attr("last_updated_on", Attribute::computed(ValueType::String))
}

/// Handler for `pnap_bgp_peer_group`.
#[derive(Clone, Copy, Debug, Default)]
pub struct BgpPeerGroupResource;

impl BgpPeerGroupResource {
    async fn refresh(
        client: &PnapClient,
        id: &str,
        asn: i64,
    ) -> Result<BgpPeerGroupState, ProviderError> {
        let group = client.get_bgp_peer_group(id).await?;
        Ok(BgpPeerGroupState::flatten(group, asn))
    }
}

impl ResourceHandler for BgpPeerGroupResource {
    type State = BgpPeerGroupState;

    const TYPE_NAME: &'static str = "pnap_bgp_peer_group";

    fn schema(&self) -> Schema {
        computed_attributes(
            Schema::new()
                .attr("location", Attribute::required(ValueType::String))
                .attr("asn", Attribute::required(ValueType::Int))
                .attr(
                    "password",
                    Attribute::optional_computed(ValueType::String).sensitive(),
                )
                .attr("advertised_routes", Attribute::required(ValueType::String)),
        )
    }

    fn create<'a>(
        &'a self,
        client: &'a PnapClient,
        plan: BgpPeerGroupState,
    ) -> HandlerFuture<'a, BgpPeerGroupState> {
        Box::pin(async move {
            let request = BgpPeerGroupCreate {
                location: plan.location,
                asn: plan.asn,
                password: non_empty(&plan.password),
                advertised_routes: plan.advertised_routes,
            };
            let created = client.create_bgp_peer_group(&request).await?;
            info!(resource = Self::TYPE_NAME, id = %created.id, "bgp peer group created");
            Self::refresh(client, &created.id, plan.asn).await
        })
    }

    fn read<'a>(
        &'a self,
        client: &'a PnapClient,
        prior: BgpPeerGroupState,
    ) -> HandlerFuture<'a, BgpPeerGroupState> {
        Box::pin(async move { Self::refresh(client, &prior.id, prior.asn).await })
    }

    fn update<'a>(
        &'a self,
        client: &'a PnapClient,
        prior: BgpPeerGroupState,
        plan: BgpPeerGroupState,
    ) -> HandlerFuture<'a, BgpPeerGroupState> {
        Box::pin(async move {
            let patch = BgpPeerGroupPatch {
                asn: (plan.asn != prior.asn).then_some(plan.asn),
                password: (plan.password != prior.password).then(|| plan.password.clone()),
                advertised_routes: (plan.advertised_routes != prior.advertised_routes)
                    .then(|| plan.advertised_routes.clone()),
            };
            if patch == BgpPeerGroupPatch::default() {
                return Err(ProviderError::UnsupportedAction);
            }
            client.patch_bgp_peer_group(&prior.id, &patch).await?;
            Self::refresh(client, &prior.id, plan.asn).await
        })
    }

    fn delete<'a>(
        &'a self,
        client: &'a PnapClient,
        prior: BgpPeerGroupState,
    ) -> HandlerFuture<'a, ()> {
        Box::pin(async move {
            client.delete_bgp_peer_group(&prior.id).await?;
            info!(resource = Self::TYPE_NAME, id = %prior.id, "bgp peer group deleted");
            Ok(())
        })
    }
}
