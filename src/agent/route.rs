use std::net::IpAddr;

use tracing::error;
use tracing::info;

use super::succeeded;
use super::Agent;
use crate::proto::ndk::IpAddrPrefLen;
use crate::proto::ndk::IpAddress;
use crate::proto::ndk::RouteAddRequest;
use crate::proto::ndk::RouteData;
use crate::proto::ndk::RouteDeleteRequest;
use crate::proto::ndk::RouteInfo;
use crate::proto::ndk::RouteKey;
use crate::Result;
use crate::RouteError;

/// Builds a route towards an NDK next hop group with preference and metric
/// left at zero.
///
/// `prefix` is `ip/len`, e.g. `192.168.11.0/24` or `2001:db8::/64`. The
/// daemon expects `next_hop_group` to name a group programmed through this
/// agent, ending in `_sdk`.
pub fn route(
    network_instance: &str,
    prefix: &str,
    next_hop_group: &str,
) -> Result<RouteInfo> {
    route_with(network_instance, prefix, next_hop_group, 0, 0)
}

/// Same as [`route`] with an explicit route preference and metric.
pub fn route_with(
    network_instance: &str,
    prefix: &str,
    next_hop_group: &str,
    preference: u32,
    metric: u32,
) -> Result<RouteInfo> {
    Ok(RouteInfo {
        key: Some(RouteKey {
            net_inst_name: network_instance.to_string(),
            ip_prefix: Some(parse_prefix(prefix)?),
        }),
        data: Some(RouteData {
            preference,
            metric,
            nexthop_group_name: next_hop_group.to_string(),
        }),
    })
}

/// Parses `ip/len` into its wire form. IPv4 addresses are encoded on four
/// bytes, IPv6 on sixteen.
pub(crate) fn parse_prefix(prefix: &str) -> std::result::Result<IpAddrPrefLen, RouteError> {
    let invalid = || RouteError::InvalidPrefix(prefix.to_string());

    let (addr, len) = prefix.split_once('/').ok_or_else(invalid)?;
    let addr: IpAddr = addr.parse().map_err(|_| invalid())?;
    let len: u32 = len.parse().map_err(|_| invalid())?;

    let max_len = if addr.is_ipv4() { 32 } else { 128 };
    if len == 0 || len > max_len {
        return Err(invalid());
    }

    Ok(IpAddrPrefLen {
        ip_addr: Some(ip_address(addr)),
        prefix_length: len,
    })
}

pub(crate) fn ip_address(addr: IpAddr) -> IpAddress {
    let addr = match addr {
        IpAddr::V4(v4) => v4.octets().to_vec(),
        IpAddr::V6(v6) => v6.octets().to_vec(),
    };
    IpAddress { addr }
}

impl Agent {
    /// Adds or updates routes in the FIB.
    pub async fn route_add(
        &self,
        routes: Vec<RouteInfo>,
    ) -> Result<()> {
        info!(count = routes.len(), "adding or updating routes");

        let outcome = self.api()?.route_add_or_update(RouteAddRequest { routes }).await;
        if !succeeded("add or update routes", &outcome) {
            return Err(RouteError::AddOrUpdate.into());
        }
        Ok(())
    }

    /// Replaces the agent's routes with `routes`.
    ///
    /// Runs inside a sync window, so routes added earlier but missing here
    /// are removed from the FIB when the window closes.
    pub async fn route_update(
        &self,
        routes: Vec<RouteInfo>,
    ) -> Result<()> {
        self.route_sync_start().await?;
        self.route_add(routes).await?;
        self.route_sync_end().await
    }

    /// Deletes routes by prefix under one network instance.
    pub async fn route_delete(
        &self,
        network_instance: &str,
        prefixes: &[&str],
    ) -> Result<()> {
        let mut routes = Vec::with_capacity(prefixes.len());
        for prefix in prefixes {
            let ip_prefix = parse_prefix(prefix).map_err(|e| {
                error!("{}", e);
                e
            })?;
            routes.push(RouteKey {
                net_inst_name: network_instance.to_string(),
                ip_prefix: Some(ip_prefix),
            });
        }

        info!(network_instance, count = routes.len(), "deleting routes");
        let outcome = self.api()?.route_delete(RouteDeleteRequest { routes }).await;
        if !succeeded("delete routes", &outcome) {
            return Err(RouteError::Delete.into());
        }
        Ok(())
    }

    async fn route_sync_start(&self) -> Result<()> {
        let outcome = self.api()?.route_sync_start().await;
        if !succeeded("start route sync", &outcome) {
            return Err(RouteError::SyncStart.into());
        }
        Ok(())
    }

    async fn route_sync_end(&self) -> Result<()> {
        let outcome = self.api()?.route_sync_end().await;
        if !succeeded("end route sync", &outcome) {
            return Err(RouteError::SyncEnd.into());
        }
        Ok(())
    }
}
