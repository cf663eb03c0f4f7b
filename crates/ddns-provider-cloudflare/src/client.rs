//! Cloudflare API v4 client
//!
//! API reference:
//! - List Zones: GET `/zones?name=...`
//! - List DNS Records: GET `/zones/:zone_id/dns_records?page=...&per_page=...`
//! - Update DNS Record: PUT `/zones/:zone_id/dns_records/:record_id`

use async_trait::async_trait;
use ddns_core::config::DdnsConfig;
use ddns_core::resilience::{DEFAULT_ATTEMPTS, DEFAULT_WAIT};
use ddns_core::transport::DEFAULT_HTTP_TIMEOUT;
use ddns_core::{
    ApiRequest, DnsProvider, Error, HttpExecutor, Record, RecordType, RequestExecutor, Result,
    Retry, UpdateRequest,
};
use reqwest::{Method, Url};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::envelope::{Envelope, Payload, decode_envelope, format_errors};

/// Cloudflare API base URL
pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Records requested per listing page
pub const PER_PAGE: u32 = 50;

/// A Cloudflare zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Settings of a [`CloudflareClient`]
#[derive(Clone)]
pub struct ClientConfig {
    /// API token with Zone:DNS:Edit permissions
    pub token: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Attempts per request
    pub attempts: u32,
    /// Pause between attempts
    pub wait: Duration,
    /// API base URL, overridden in tests
    pub base_url: String,
}

impl ClientConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            timeout: DEFAULT_HTTP_TIMEOUT,
            attempts: DEFAULT_ATTEMPTS,
            wait: DEFAULT_WAIT,
            base_url: CLOUDFLARE_API_BASE.to_string(),
        }
    }

    /// Client settings derived from the updater configuration
    pub fn from_ddns_config(config: &DdnsConfig) -> Self {
        Self {
            timeout: config.timeout(),
            attempts: config.retry.attempts,
            wait: config.retry.wait(),
            ..Self::new(config.token.clone())
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("token", &"<REDACTED>")
            .field("timeout", &self.timeout)
            .field("attempts", &self.attempts)
            .field("wait", &self.wait)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Cloudflare DNS client
///
/// Holds only immutable configuration and the request executor, so one
/// client can serve concurrent calls.
///
/// # Security
///
/// The Debug implementation does NOT expose the API token, and the token
/// never appears in logs or error messages.
pub struct CloudflareClient {
    /// ⚠️ NEVER log this value
    token: String,

    base_url: String,

    /// Outermost executor; a `Retry` around `HttpExecutor` in production
    executor: Box<dyn RequestExecutor>,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for CloudflareClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareClient")
            .field("token", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl CloudflareClient {
    /// Create a client sending over HTTP with bounded retries
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if the token is empty or the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = HttpExecutor::new(config.timeout)?;
        let executor = Retry::new(http, config.attempts, config.wait);
        Self::with_executor(config, Box::new(executor))
    }

    /// Create a client over a caller-supplied executor
    ///
    /// The executor is used as given; no retry layer is added.
    pub fn with_executor(config: ClientConfig, executor: Box<dyn RequestExecutor>) -> Result<Self> {
        if config.token.trim().is_empty() {
            return Err(Error::config("token is empty"));
        }

        Ok(Self {
            token: config.token,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            executor,
        })
    }

    /// Find the zone whose name is the registrable root of `domain`
    pub async fn resolve_zone(&self, domain: &str, cancel: &CancellationToken) -> Result<Zone> {
        let root = zone_root(domain)?;
        tracing::debug!("Looking up zone for domain: {}", root);

        let url = self.url("/zones", &[("name", root)])?;
        let payload: Payload<Vec<Zone>> = self.send(ApiRequest::get(url), cancel).await?;

        let zone = payload
            .result
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| {
                Error::not_found(format!("could not find zone that matches domain {:?}", domain))
            })?;

        tracing::debug!("Found zone ID: {}", zone.id);
        Ok(zone)
    }

    /// Find the single record named `domain` of type `record_type`
    ///
    /// Pages through the zone's records and stops as soon as a second match
    /// shows up.
    pub async fn get_record(
        &self,
        domain: &str,
        record_type: RecordType,
        cancel: &CancellationToken,
    ) -> Result<Record> {
        if record_type == RecordType::Unsupported {
            return Err(Error::invalid_input("cannot look up an unsupported record type"));
        }

        let zone = self
            .resolve_zone(domain, cancel)
            .await
            .map_err(|e| e.context("error getting zone information"))?;

        let path = format!("/zones/{}/dns_records", zone.id);
        let mut found: Option<Record> = None;
        let mut page: u32 = 1;

        loop {
            let url = self.url(
                &path,
                &[
                    ("page", page.to_string()),
                    ("per_page", PER_PAGE.to_string()),
                ],
            )?;
            let payload: Payload<Vec<Record>> = self.send(ApiRequest::get(url), cancel).await?;

            for record in payload.result.unwrap_or_default() {
                if record.name != domain || record.record_type != record_type {
                    continue;
                }
                if found.is_some() {
                    return Err(Error::duplicate(format!(
                        "found duplicate entry for {:?} and type {:?}",
                        domain,
                        record_type.as_str()
                    )));
                }
                found = Some(record);
            }

            let total_pages = payload.result_info.map_or(0, |info| info.total_pages);
            if page >= total_pages {
                break;
            }
            page += 1;
        }

        let record = found.ok_or_else(|| {
            Error::not_found(format!(
                "no record for {:?} of type {} found",
                domain, record_type
            ))
        })?;

        tracing::debug!("Found record ID: {} ({} pages read)", record.id, page);
        Ok(record)
    }

    /// Replace the content of record `record_id`
    ///
    /// The zone is resolved again from `request.name`.
    pub async fn update_record(
        &self,
        record_id: &str,
        request: UpdateRequest,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let request = request.normalized();

        let zone = self
            .resolve_zone(&request.name, cancel)
            .await
            .map_err(|e| e.context("error getting zone information"))?;

        let url = self.url(&format!("/zones/{}/dns_records/{}", zone.id, record_id), &[])?;
        let body = serde_json::to_vec(&request)?;

        tracing::info!(
            "Updating Cloudflare DNS record: {} -> {} ({})",
            request.name,
            request.content,
            request.record_type
        );

        let _: Payload<IgnoredAny> = self
            .send(ApiRequest::new(Method::PUT, url).with_body(body), cancel)
            .await?;

        tracing::info!(
            "DNS record updated successfully: {} -> {}",
            request.name,
            request.content
        );
        Ok(())
    }

    fn url(&self, path: &str, params: &[(&str, String)]) -> Result<String> {
        let base = format!("{}{}", self.base_url, path);
        let url = if params.is_empty() {
            Url::parse(&base)
        } else {
            Url::parse_with_params(&base, params.iter().map(|(k, v)| (*k, v.as_str())))
        }
        .map_err(|e| Error::config(format!("invalid API URL {:?}: {}", base, e)))?;

        Ok(url.into())
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
        cancel: &CancellationToken,
    ) -> Result<Payload<T>> {
        let request = request
            .with_header("Authorization", format!("Bearer {}", self.token))
            .with_header("Content-Type", "application/json");

        tracing::debug!(method = %request.method, url = %request.url, "Sending Cloudflare API request");
        let response = self.executor.execute(&request, cancel).await?;

        let envelope = decode_envelope::<T>(&response.body);

        // A 4xx is never a success, whatever its body says
        if response.is_client_error() {
            return Err(match envelope {
                Ok(Envelope::Failure(errors)) => Error::api(format_errors(&errors)),
                _ => Error::Client {
                    status: response.status,
                    body: response.text(),
                },
            });
        }

        envelope?.into_result()
    }
}

/// Registrable root of a domain: its last two labels
///
/// `home.nenad.dev` → `nenad.dev`. Multi-part public suffixes such as
/// `co.uk` are not recognized.
pub fn zone_root(domain: &str) -> Result<String> {
    let labels: Vec<&str> = domain.trim_end_matches('.').split('.').collect();

    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return Err(Error::invalid_input(format!(
            "domain {:?} has no registrable root",
            domain
        )));
    }

    Ok(labels[labels.len() - 2..].join("."))
}

#[async_trait]
impl DnsProvider for CloudflareClient {
    async fn get_record(
        &self,
        domain: &str,
        record_type: RecordType,
        cancel: &CancellationToken,
    ) -> Result<Record> {
        CloudflareClient::get_record(self, domain, record_type, cancel).await
    }

    async fn update_record(
        &self,
        record_id: &str,
        request: UpdateRequest,
        cancel: &CancellationToken,
    ) -> Result<()> {
        CloudflareClient::update_record(self, record_id, request, cancel).await
    }

    fn provider_name(&self) -> &'static str {
        "cloudflare"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_root() {
        assert_eq!(zone_root("home.nenad.dev").unwrap(), "nenad.dev");
        assert_eq!(zone_root("nenad.dev").unwrap(), "nenad.dev");
        assert_eq!(zone_root("a.b.c.example.com.").unwrap(), "example.com");
        assert!(matches!(zone_root("localhost"), Err(Error::InvalidInput(_))));
        assert!(matches!(zone_root(""), Err(Error::InvalidInput(_))));
        assert!(matches!(zone_root("nenad..dev"), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_empty_token_rejected() {
        let result = CloudflareClient::new(ClientConfig::new(""));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_api_token_not_exposed_in_debug() {
        let config = ClientConfig::new("secret_token_12345");
        assert!(!format!("{:?}", config).contains("secret_token"));

        let client = CloudflareClient::new(config).unwrap();
        let debug_str = format!("{:?}", client);
        assert!(!debug_str.contains("secret_token"));
        assert!(debug_str.contains("CloudflareClient"));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client =
            CloudflareClient::new(ClientConfig::new("token").with_base_url("http://127.0.0.1:9/v4/"))
                .unwrap();

        let url = client.url("/zones", &[("name", "nenad.dev".to_string())]).unwrap();
        assert_eq!(url, "http://127.0.0.1:9/v4/zones?name=nenad.dev");
    }

    #[test]
    fn test_provider_name() {
        let client = CloudflareClient::new(ClientConfig::new("token")).unwrap();
        assert_eq!(DnsProvider::provider_name(&client), "cloudflare");
    }

    #[test]
    fn test_from_ddns_config() {
        let mut ddns = DdnsConfig::new("home.nenad.dev", "token");
        ddns.timeout_secs = 3;
        ddns.retry.attempts = 5;

        let config = ClientConfig::from_ddns_config(&ddns);

        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.attempts, 5);
        assert_eq!(config.base_url, CLOUDFLARE_API_BASE);
    }
}
