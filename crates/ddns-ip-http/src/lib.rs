// # HTTP IP Source
//
// This crate provides an IP source backed by an IP-echo service: a plain
// GET whose response body is the caller's public address.
//
// ## Endpoints
//
// - IPv4: `https://api.ipify.org`
// - IPv6: `https://api6.ipify.org`
//
// Both can be overridden (tests, self-hosted echo services).
//
// ## Resilience
//
// Each fetch goes through `ddns_core::Retry` around `ddns_core::HttpExecutor`,
// so transport failures and 5xx answers are retried a bounded number of times.

use ddns_core::resilience::{DEFAULT_ATTEMPTS, DEFAULT_WAIT};
use ddns_core::transport::DEFAULT_HTTP_TIMEOUT;
use ddns_core::traits::{IpSource, IpVersion};
use ddns_core::{ApiRequest, Error, HttpExecutor, RequestExecutor, Result, Retry};

use std::net::IpAddr;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Default IPv4 echo endpoint
pub const IPV4_ENDPOINT: &str = "https://api.ipify.org";

/// Default IPv6 echo endpoint
pub const IPV6_ENDPOINT: &str = "https://api6.ipify.org";

/// IP source asking an external echo service
pub struct ExternalIpSource {
    v4_url: String,
    v6_url: String,
    executor: Box<dyn RequestExecutor>,
}

impl ExternalIpSource {
    /// Create a source with the default endpoints and request timeout
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_HTTP_TIMEOUT)
    }

    /// Create a source whose requests time out after `timeout`
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let http = HttpExecutor::new(timeout)?;
        Ok(Self {
            v4_url: IPV4_ENDPOINT.to_string(),
            v6_url: IPV6_ENDPOINT.to_string(),
            executor: Box::new(Retry::new(http, DEFAULT_ATTEMPTS, DEFAULT_WAIT)),
        })
    }

    /// Replace the echo endpoints
    pub fn with_endpoints(mut self, v4_url: impl Into<String>, v6_url: impl Into<String>) -> Self {
        self.v4_url = v4_url.into();
        self.v6_url = v6_url.into();
        self
    }

    /// Replace the request executor
    pub fn with_executor(mut self, executor: Box<dyn RequestExecutor>) -> Self {
        self.executor = executor;
        self
    }

    fn endpoint(&self, version: IpVersion) -> &str {
        match version {
            IpVersion::V4 => &self.v4_url,
            IpVersion::V6 => &self.v6_url,
        }
    }
}

#[async_trait::async_trait]
impl IpSource for ExternalIpSource {
    async fn current(&self, version: IpVersion, cancel: &CancellationToken) -> Result<IpAddr> {
        let url = self.endpoint(version);
        tracing::debug!("Fetching {} address from {}", version, url);

        let response = self
            .executor
            .execute(&ApiRequest::get(url), cancel)
            .await?;

        if response.status != 200 {
            return Err(Error::ip_source(format!(
                "unexpected status {} from {}",
                response.status, url
            )));
        }

        let text = response.text();
        let text = text.trim();
        let ip: IpAddr = text
            .parse()
            .map_err(|_| Error::ip_source(format!("invalid IP address: {:?}", text)))?;

        if !version.matches(&ip) {
            return Err(Error::ip_source(format!("expected {} address, got {}", version, ip)));
        }

        Ok(ip)
    }

    fn source_name(&self) -> &'static str {
        "ipify"
    }
}

impl std::fmt::Debug for ExternalIpSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExternalIpSource")
            .field("v4_url", &self.v4_url)
            .field("v6_url", &self.v6_url)
            .finish()
    }
}
