use std::net::IpAddr;

use tracing::info;

use super::route::ip_address;
use super::succeeded;
use super::Agent;
use crate::proto::ndk::next_hop::ResolutionType;
use crate::proto::ndk::next_hop::ResolveToType;
use crate::proto::ndk::NextHop;
use crate::proto::ndk::NextHopGroup;
use crate::proto::ndk::NextHopGroupDeleteRequest;
use crate::proto::ndk::NextHopGroupInfo;
use crate::proto::ndk::NextHopGroupKey;
use crate::proto::ndk::NextHopGroupRequest;
use crate::NextHopGroupError;
use crate::Result;

/// Builds a next hop group. The daemon expects `name` to end in `_sdk`.
pub fn next_hop_group(
    network_instance: &str,
    name: &str,
    next_hops: Vec<NextHop>,
) -> NextHopGroupInfo {
    NextHopGroupInfo {
        key: Some(NextHopGroupKey {
            name: name.to_string(),
            network_instance_name: network_instance.to_string(),
        }),
        data: Some(NextHopGroup { next_hop: next_hops }),
    }
}

/// Builds an IP next hop from a bare address (no prefix length).
pub fn ip_next_hop(
    address: &str,
    resolve_to: ResolveToType,
    resolution: ResolutionType,
) -> Result<NextHop> {
    mpls_next_hop(address, Vec::new(), resolve_to, resolution)
}

/// Builds an MPLS next hop carrying `labels` as its label stack.
pub fn mpls_next_hop(
    address: &str,
    labels: Vec<u32>,
    resolve_to: ResolveToType,
    resolution: ResolutionType,
) -> Result<NextHop> {
    let addr: IpAddr = address
        .parse()
        .map_err(|_| NextHopGroupError::InvalidAddress(address.to_string()))?;

    Ok(NextHop {
        ip_nexthop: Some(ip_address(addr)),
        mpls_labels: labels,
        resolve_to: resolve_to as i32,
        r#type: resolution as i32,
    })
}

impl Agent {
    /// Adds or updates next hop groups.
    pub async fn next_hop_group_add(
        &self,
        groups: Vec<NextHopGroupInfo>,
    ) -> Result<()> {
        info!(count = groups.len(), "adding or updating next hop groups");

        let req = NextHopGroupRequest { group_info: groups };
        let outcome = self.api()?.next_hop_group_add_or_update(req).await;
        if !succeeded("add or update next hop groups", &outcome) {
            return Err(NextHopGroupError::AddOrUpdate.into());
        }
        Ok(())
    }

    /// Replaces the agent's next hop groups with `groups` inside a sync
    /// window. Groups missing from `groups` are removed.
    pub async fn next_hop_group_update(
        &self,
        groups: Vec<NextHopGroupInfo>,
    ) -> Result<()> {
        self.next_hop_group_sync_start().await?;
        self.next_hop_group_add(groups).await?;
        self.next_hop_group_sync_end().await
    }

    pub async fn next_hop_group_delete(
        &self,
        network_instance: &str,
        name: &str,
    ) -> Result<()> {
        info!(network_instance, name, "deleting next hop group");

        let req = NextHopGroupDeleteRequest {
            group_key: vec![NextHopGroupKey {
                name: name.to_string(),
                network_instance_name: network_instance.to_string(),
            }],
        };
        let outcome = self.api()?.next_hop_group_delete(req).await;
        if !succeeded("delete next hop group", &outcome) {
            return Err(NextHopGroupError::Delete.into());
        }
        Ok(())
    }

    async fn next_hop_group_sync_start(&self) -> Result<()> {
        let outcome = self.api()?.next_hop_group_sync_start().await;
        if !succeeded("start next hop group sync", &outcome) {
            return Err(NextHopGroupError::SyncStart.into());
        }
        Ok(())
    }

    async fn next_hop_group_sync_end(&self) -> Result<()> {
        let outcome = self.api()?.next_hop_group_sync_end().await;
        if !succeeded("end next hop group sync", &outcome) {
            return Err(NextHopGroupError::SyncEnd.into());
        }
        Ok(())
    }
}
