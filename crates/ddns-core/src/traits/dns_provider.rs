// # DNS Provider Trait
//
// Defines the interface for locating and updating a DNS record via a
// provider API, plus the record values exchanged across it.
//
// ## Implementations
//
// - Cloudflare: `ddns-provider-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::{DnsProvider, RecordType, UpdateRequest};
// use tokio_util::sync::CancellationToken;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let provider = /* DnsProvider implementation */;
//     let cancel = CancellationToken::new();
//
//     let record = provider.get_record("home.example.com", RecordType::A, &cancel).await?;
//     let request = UpdateRequest::new(&record.name, record.record_type, "192.0.2.7", true, 1);
//     provider.update_record(&record.id, request, &cancel).await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tokio_util::sync::CancellationToken;

use super::ip_source::IpVersion;

/// DNS record type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordType {
    /// IPv4 address record
    A,
    /// IPv6 address record
    #[allow(clippy::upper_case_acronyms)]
    AAAA,
    /// Mail exchange record
    MX,
    /// Canonical name record
    CNAME,
    /// Text record
    TXT,
    /// Any other type the provider lists (NS, SRV, CAA, ...)
    #[serde(other)]
    Unsupported,
}

impl RecordType {
    /// Wire name of the record type
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::AAAA => "AAAA",
            RecordType::MX => "MX",
            RecordType::CNAME => "CNAME",
            RecordType::TXT => "TXT",
            RecordType::Unsupported => "UNSUPPORTED",
        }
    }

    /// IP version carried by an address record, `None` for other types
    pub fn ip_version(&self) -> Option<IpVersion> {
        match self {
            RecordType::A => Some(IpVersion::V4),
            RecordType::AAAA => Some(IpVersion::V6),
            _ => None,
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(RecordType::A),
            "AAAA" => Ok(RecordType::AAAA),
            "MX" => Ok(RecordType::MX),
            "CNAME" => Ok(RecordType::CNAME),
            "TXT" => Ok(RecordType::TXT),
            other => Err(crate::Error::invalid_input(format!(
                "unknown record type {:?}",
                other
            ))),
        }
    }
}

/// A DNS record as returned by the provider
///
/// Immutable snapshot; the core never persists it itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Provider-specific record id
    pub id: String,
    /// Record type
    #[serde(rename = "type")]
    pub record_type: RecordType,
    /// Fully-qualified record name
    pub name: String,
    /// Record content (an IP address for A/AAAA)
    pub content: String,
}

/// Body of a record content update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRequest {
    /// Fully-qualified record name
    pub name: String,
    /// Record type
    #[serde(rename = "type")]
    pub record_type: RecordType,
    /// New content
    pub content: String,
    /// Whether traffic is proxied through the provider
    pub proxied: bool,
    /// Time-to-live; 1 means "automatic" and 0 is never sent
    pub ttl: u32,
}

impl UpdateRequest {
    /// Create an update request, coercing a zero ttl to 1
    pub fn new(
        name: impl Into<String>,
        record_type: RecordType,
        content: impl Into<String>,
        proxied: bool,
        ttl: u32,
    ) -> Self {
        Self {
            name: name.into(),
            record_type,
            content: content.into(),
            proxied,
            ttl,
        }
        .normalized()
    }

    /// Return the request with a zero ttl replaced by 1
    pub fn normalized(mut self) -> Self {
        if self.ttl == 0 {
            self.ttl = 1;
        }
        self
    }
}

/// Trait for DNS provider implementations
///
/// Every call takes the cancellation token of the running sync cycle.
/// Implementations hold only immutable configuration, so one instance can
/// serve concurrent cycles.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Find the single record matching `domain` and `record_type`
    ///
    /// # Errors
    ///
    /// - [`crate::Error::NotFound`] when no zone or no record matches
    /// - [`crate::Error::Duplicate`] when more than one record matches
    async fn get_record(
        &self,
        domain: &str,
        record_type: RecordType,
        cancel: &CancellationToken,
    ) -> Result<Record, crate::Error>;

    /// Replace the content of the record `record_id`
    async fn update_record(
        &self,
        record_id: &str,
        request: UpdateRequest,
        cancel: &CancellationToken,
    ) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
