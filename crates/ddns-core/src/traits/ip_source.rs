// # IP Source Trait
//
// Defines the interface for acquiring the host's current IP address.
//
// ## Implementations
//
// - External IP-echo service: `ddns-ip-http` crate
// - Network interface inspection (Linux): `ddns-ip-netlink` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::{IpSource, IpVersion};
// use tokio_util::sync::CancellationToken;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let source = /* IpSource implementation */;
//     let ip = source.current(IpVersion::V4, &CancellationToken::new()).await?;
//     println!("current IP: {ip}");
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use tokio_util::sync::CancellationToken;

/// IP version (v4 or v6)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpVersion {
    V4,
    V6,
}

impl IpVersion {
    /// Whether `ip` belongs to this version
    pub fn matches(&self, ip: &IpAddr) -> bool {
        match self {
            IpVersion::V4 => ip.is_ipv4(),
            IpVersion::V6 => ip.is_ipv6(),
        }
    }
}

impl fmt::Display for IpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpVersion::V4 => f.write_str("ip4"),
            IpVersion::V6 => f.write_str("ip6"),
        }
    }
}

/// Trait for IP source implementations
///
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Get the current IP address of the requested version
    ///
    /// # Returns
    ///
    /// - `Ok(IpAddr)`: The current IP address
    /// - `Err(Error)`: If no address of that version is available
    async fn current(
        &self,
        version: IpVersion,
        cancel: &CancellationToken,
    ) -> Result<IpAddr, crate::Error>;

    /// Short name used in logs
    fn source_name(&self) -> &'static str;
}
