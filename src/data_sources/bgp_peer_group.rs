//! `pnap_bgp_peer_group` data source: looks up a peer group by id, or the
//! single group of a location.

use crate::api::PnapClient;
use crate::api::networks::BgpPeerGroup;
use crate::provider::{DataSourceHandler, HandlerFuture};
use crate::resources::bgp_peer_group::{BgpPeerGroupState, computed_attributes};
use crate::schema::{Attribute, Schema, ValueType};
use crate::state::{find_unique, non_empty};

fn flatten(group: BgpPeerGroup) -> BgpPeerGroupState {
    let asn = group.target_asn_details.asn;
    BgpPeerGroupState::flatten(group, asn)
}

/// Handler for the `pnap_bgp_peer_group` data source.
#[derive(Clone, Copy, Debug, Default)]
pub struct BgpPeerGroupDataSource;

impl DataSourceHandler for BgpPeerGroupDataSource {
    type State = BgpPeerGroupState;

    const TYPE_NAME: &'static str = "pnap_bgp_peer_group";

    fn schema(&self) -> Schema {
        computed_attributes(
            Schema::new()
                .attr(
                    "id",
                    Attribute::optional_computed(ValueType::String).conflicts_with(&["location"]),
                )
                .attr(
                    "location",
                    Attribute::optional_computed(ValueType::String).conflicts_with(&["id"]),
                )
                .attr("asn", Attribute::computed(ValueType::Int))
                .attr("password", Attribute::computed(ValueType::String).sensitive())
                .attr("advertised_routes", Attribute::computed(ValueType::String)),
        )
    }

    fn read<'a>(
        &'a self,
        client: &'a PnapClient,
        config: BgpPeerGroupState,
    ) -> HandlerFuture<'a, BgpPeerGroupState> {
        Box::pin(async move {
            let found = if config.id.is_empty() {
                let location = non_empty(&config.location);
                let groups = client.list_bgp_peer_groups(location.as_deref()).await?;
                find_unique(
                    groups,
                    |_| true,
                    format!("BGP Peer Groups with location {}", config.location),
                )?
            } else {
                let groups = client.list_bgp_peer_groups(None).await?;
                find_unique(
                    groups,
                    |group| group.id == config.id,
                    format!("BGP Peer Groups with id {}", config.id),
                )?
            };
            Ok(found.map_or_else(
                || BgpPeerGroupState {
                    id: String::new(),
                    ..config
                },
                flatten,
            ))
        })
    }
}
