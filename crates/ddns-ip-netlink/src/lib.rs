// # Netlink IP Source
//
// This crate provides an IP source that reads the address of a local
// network interface, for hosts whose interface carries the public address
// directly (PPPoE routers, VPS hosts, IPv6 hosts).
//
// ## Platform Support
//
// - **Linux**: rtnetlink `RTM_GETADDR` dump over `netlink-sys`
// - **Others**: construction succeeds, lookups fail
//
// ## Selection
//
// The first global unicast address of the requested family, in the order
// the kernel reports them. Private ranges count as global unicast.

#[cfg(target_os = "linux")]
mod dump;

use ddns_core::traits::{IpSource, IpVersion};
use ddns_core::{Error, Result};

use std::net::IpAddr;
use tokio_util::sync::CancellationToken;

/// IP source reading the address of one network interface
#[derive(Debug, Clone)]
pub struct InterfaceIpSource {
    device: String,
}

impl InterfaceIpSource {
    /// Create a source for interface `device` (e.g. "eth0")
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
        }
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    #[cfg(target_os = "linux")]
    async fn addresses(&self, version: IpVersion, cancel: &CancellationToken) -> Result<Vec<IpAddr>> {
        let device = self.device.clone();
        let lookup = tokio::task::spawn_blocking(move || {
            let index = dump::interface_index(&device)?;
            dump::interface_addresses(index, version)
        });

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Error::Cancelled),
            joined = lookup => joined
                .map_err(|e| Error::ip_source(format!("interface lookup task failed: {}", e)))?,
        }
    }

    #[cfg(not(target_os = "linux"))]
    async fn addresses(&self, _version: IpVersion, _cancel: &CancellationToken) -> Result<Vec<IpAddr>> {
        Err(Error::ip_source(format!(
            "could not get details about interface {:?}: interface lookup requires Linux netlink",
            self.device
        )))
    }
}

#[async_trait::async_trait]
impl IpSource for InterfaceIpSource {
    async fn current(&self, version: IpVersion, cancel: &CancellationToken) -> Result<IpAddr> {
        let addresses = self.addresses(version, cancel).await?;
        tracing::debug!(
            "Interface {} has {} {} address(es)",
            self.device,
            addresses.len(),
            version
        );

        first_global_unicast(&addresses, version).ok_or_else(|| {
            Error::ip_source(format!(
                "could not find global unicast address for interface {:?}",
                self.device
            ))
        })
    }

    fn source_name(&self) -> &'static str {
        "interface"
    }
}

/// First address of `version` that is global unicast
pub fn first_global_unicast(addresses: &[IpAddr], version: IpVersion) -> Option<IpAddr> {
    addresses
        .iter()
        .copied()
        .find(|ip| version.matches(ip) && is_global_unicast(ip))
}

/// Whether `ip` is a global unicast address
///
/// Excludes unspecified, loopback, multicast, link-local and broadcast
/// addresses. Private ranges are included.
pub fn is_global_unicast(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            !(v4.is_unspecified()
                || v4.is_loopback()
                || v4.is_multicast()
                || v4.is_link_local()
                || v4.is_broadcast())
        }
        IpAddr::V6(v6) => {
            let link_local = (v6.segments()[0] & 0xffc0) == 0xfe80;
            !(v6.is_unspecified() || v6.is_loopback() || v6.is_multicast() || link_local)
        }
    }
}
