//! Configuration types for the DDNS system
//!
//! [`DdnsConfig`] is built by the binary from flags and environment
//! variables, normalized, and validated before any network call is made.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::resilience::{DEFAULT_ATTEMPTS, DEFAULT_WAIT};
use crate::traits::{IpVersion, RecordType};

/// Timeout used when zero is configured
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// TTL used when zero is configured (1 = automatic)
pub const DEFAULT_TTL: u32 = 1;

/// Main DDNS configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct DdnsConfig {
    /// Fully-qualified name of the record to keep in sync
    pub domain: String,

    /// Cloudflare API token with Zone.Zone (Read) and Zone.DNS (Edit)
    /// ⚠️ NEVER log this value
    pub token: String,

    /// A for IPv4, AAAA for IPv6
    #[serde(default = "default_record_type")]
    pub record_type: RecordType,

    /// Request timeout for the provider and the IP-echo service (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Whether traffic is proxied through Cloudflare
    #[serde(default = "default_proxied")]
    pub proxied: bool,

    /// TTL written on update
    #[serde(default = "default_ttl")]
    pub ttl: u32,

    /// Read the IP from this network interface instead of the Internet
    #[serde(default)]
    pub interface: Option<String>,

    /// Cache the provider record on disk between runs
    #[serde(default)]
    pub cache_enabled: bool,

    /// Retry settings for provider calls
    #[serde(default)]
    pub retry: RetryConfig,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for DdnsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DdnsConfig")
            .field("domain", &self.domain)
            .field("token", &"<REDACTED>")
            .field("record_type", &self.record_type)
            .field("timeout_secs", &self.timeout_secs)
            .field("proxied", &self.proxied)
            .field("ttl", &self.ttl)
            .field("interface", &self.interface)
            .field("cache_enabled", &self.cache_enabled)
            .field("retry", &self.retry)
            .finish()
    }
}

impl DdnsConfig {
    /// Create a configuration with defaults for everything but domain and token
    pub fn new(domain: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            token: token.into(),
            record_type: default_record_type(),
            timeout_secs: default_timeout_secs(),
            proxied: default_proxied(),
            ttl: default_ttl(),
            interface: None,
            cache_enabled: false,
            retry: RetryConfig::default(),
        }
    }

    /// Set the record type
    pub fn with_record_type(mut self, record_type: RecordType) -> Self {
        self.record_type = record_type;
        self
    }

    /// Replace zero timeout and zero ttl with their defaults
    pub fn normalize(mut self) -> Self {
        if self.timeout_secs == 0 {
            self.timeout_secs = DEFAULT_TIMEOUT_SECS;
        }
        if self.ttl == 0 {
            self.ttl = DEFAULT_TTL;
        }
        if let Some(interface) = &self.interface
            && interface.trim().is_empty()
        {
            self.interface = None;
        }
        self
    }

    /// Validate the configuration
    ///
    /// Every problem is reported, joined with `; `.
    pub fn validate(&self) -> Result<(), crate::Error> {
        let mut errors = Vec::new();

        if self.token.is_empty() {
            errors.push("token is required and must not be empty".to_string());
        }
        if self.domain.is_empty() {
            errors.push("domain is required and must not be empty".to_string());
        } else if self.domain.split('.').filter(|l| !l.is_empty()).count() < 2 {
            errors.push(format!(
                "domain {:?} must have at least two labels",
                self.domain
            ));
        }
        if self.record_type.ip_version().is_none() {
            errors.push("type must be 'A' for IPv4 or 'AAAA' for IPv6".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(crate::Error::config(errors.join("; ")))
        }
    }

    /// IP version matching the record type
    pub fn ip_version(&self) -> IpVersion {
        self.record_type.ip_version().unwrap_or(IpVersion::V4)
    }

    /// Request timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Retry settings for the resilient executor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Attempts per request (0 means the default of 3)
    #[serde(default = "default_attempts")]
    pub attempts: u32,

    /// Constant wait between attempts in milliseconds (0 means one second)
    #[serde(default = "default_wait_ms")]
    pub wait_ms: u64,
}

impl RetryConfig {
    pub fn wait(&self) -> Duration {
        Duration::from_millis(self.wait_ms)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            wait_ms: default_wait_ms(),
        }
    }
}

fn default_record_type() -> RecordType {
    RecordType::A
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_proxied() -> bool {
    true
}

fn default_ttl() -> u32 {
    DEFAULT_TTL
}

fn default_attempts() -> u32 {
    DEFAULT_ATTEMPTS
}

fn default_wait_ms() -> u64 {
    DEFAULT_WAIT.as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_defaults() {
        let config = DdnsConfig::new("nenad.dev", "token").normalize();

        assert!(config.validate().is_ok());
        assert_eq!(config.record_type, RecordType::A);
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert!(config.proxied);
        assert_eq!(config.ttl, 1);
        assert_eq!(config.ip_version(), IpVersion::V4);
        assert_eq!(config.retry.attempts, 3);
    }

    #[test]
    fn test_normalize_zero_values() {
        let mut config = DdnsConfig::new("nenad.dev", "token");
        config.timeout_secs = 0;
        config.ttl = 0;
        config.interface = Some("  ".to_string());

        let config = config.normalize();
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.ttl, 1);
        assert_eq!(config.interface, None);
    }

    #[test]
    fn test_empty_config_reports_every_problem() {
        let err = DdnsConfig::new("", "").validate().unwrap_err().to_string();

        assert!(err.contains("domain"));
        assert!(err.contains("token"));
    }

    #[test]
    fn test_only_address_record_types() {
        let err = DdnsConfig::new("nenad.dev", "token")
            .with_record_type(RecordType::MX)
            .validate()
            .unwrap_err()
            .to_string();

        assert!(err.contains("type"));
        assert!(err.contains("AAAA"));

        let config = DdnsConfig::new("nenad.dev", "token").with_record_type(RecordType::AAAA);
        assert!(config.validate().is_ok());
        assert_eq!(config.ip_version(), IpVersion::V6);
    }

    #[test]
    fn test_single_label_domain_rejected() {
        assert!(DdnsConfig::new("localhost", "token").validate().is_err());
    }

    #[test]
    fn test_token_not_exposed_in_debug() {
        let config = DdnsConfig::new("nenad.dev", "secret_token_12345");

        let debug_str = format!("{:?}", config);
        assert!(!debug_str.contains("secret_token_12345"));
        assert!(debug_str.contains("DdnsConfig"));
    }
}
