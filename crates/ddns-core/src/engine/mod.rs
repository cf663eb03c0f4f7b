//! One-shot sync engine
//!
//! The SyncEngine runs a single sync cycle:
//! - Obtain the current IP via IpSource
//! - Short-circuit when the RecordCache already holds that IP
//! - Locate the record via DnsProvider and update it if its content differs
//! - Remember the resulting record in the RecordCache
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐        ┌──────────────┐        ┌─────────────┐
//! │  IpSource   │──IP───▶│  SyncEngine  │◀──────▶│ RecordCache │
//! └─────────────┘        └──────────────┘        └─────────────┘
//!                               │
//!                               ▼
//!                        ┌──────────────┐
//!                        │ DnsProvider  │  get_record → update_record
//!                        └──────────────┘
//! ```
//!
//! Cache failures are logged and never fail the cycle; every other failure
//! is returned to the caller.

use std::net::IpAddr;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::DdnsConfig;
use crate::error::Result;
use crate::traits::{DnsProvider, IpSource, Record, RecordCache, UpdateRequest};

/// Result of one sync cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The record already pointed at the current IP
    Unchanged {
        /// The current IP address
        current_ip: IpAddr,
        /// Whether the answer came from the cache (no provider call)
        from_cache: bool,
    },
    /// The record content was replaced
    Updated {
        /// Content before the update
        previous_content: String,
        /// The new IP address
        new_ip: IpAddr,
    },
}

/// Core DDNS sync engine
///
/// Holds only immutable collaborators and settings, so one engine can run
/// cycles from several tasks at once.
pub struct SyncEngine {
    /// IP source for the current address
    ip_source: Box<dyn IpSource>,

    /// DNS provider for locating and updating the record
    provider: Box<dyn DnsProvider>,

    /// Cache of the record seen on a previous run
    cache: Box<dyn RecordCache>,

    /// Validated configuration
    config: DdnsConfig,
}

impl SyncEngine {
    /// Create a new sync engine
    ///
    /// The configuration is normalized and validated here.
    pub fn new(
        ip_source: Box<dyn IpSource>,
        provider: Box<dyn DnsProvider>,
        cache: Box<dyn RecordCache>,
        config: DdnsConfig,
    ) -> Result<Self> {
        let config = config.normalize();
        config.validate()?;

        Ok(Self {
            ip_source,
            provider,
            cache,
            config,
        })
    }

    /// Configuration the engine runs with
    pub fn config(&self) -> &DdnsConfig {
        &self.config
    }

    /// Run one sync cycle
    pub async fn sync_once(&self, cancel: &CancellationToken) -> Result<SyncOutcome> {
        let domain = self.config.domain.as_str();
        let record_type = self.config.record_type;
        let version = self.config.ip_version();

        let current_ip = self
            .ip_source
            .current(version, cancel)
            .await
            .map_err(|e| e.context("could not get IP"))?;
        debug!(
            source = self.ip_source.source_name(),
            %current_ip,
            "Current IP resolved"
        );

        match self.cache.get_record(domain, record_type).await {
            Ok(Some(cached)) if content_matches(&cached.content, current_ip) => {
                info!("No changes in IP for {} ({}), skipping update", domain, current_ip);
                return Ok(SyncOutcome::Unchanged {
                    current_ip,
                    from_cache: true,
                });
            }
            Ok(_) => {}
            Err(e) => warn!("Error while reading cache: {}", e),
        }

        let record = self
            .provider
            .get_record(domain, record_type, cancel)
            .await
            .map_err(|e| {
                e.context(format!(
                    "could not get {} record",
                    self.provider.provider_name()
                ))
            })?;

        if content_matches(&record.content, current_ip) {
            info!("Record {} already points to {}", domain, current_ip);
            self.remember(&record).await;
            return Ok(SyncOutcome::Unchanged {
                current_ip,
                from_cache: false,
            });
        }

        let request = UpdateRequest::new(
            record.name.clone(),
            record.record_type,
            current_ip.to_string(),
            self.config.proxied,
            self.config.ttl,
        );
        self.provider
            .update_record(&record.id, request, cancel)
            .await
            .map_err(|e| e.context("could not update record"))?;

        info!(
            "Updated {:?} to point from {} to {}",
            domain, record.content, current_ip
        );

        let updated = Record {
            content: current_ip.to_string(),
            ..record.clone()
        };
        self.remember(&updated).await;

        Ok(SyncOutcome::Updated {
            previous_content: record.content,
            new_ip: current_ip,
        })
    }

    async fn remember(&self, record: &Record) {
        if let Err(e) = self.cache.save_record(record).await {
            warn!("Could not save cached record: {}", e);
        }
    }
}

/// Whether record content denotes `ip`
fn content_matches(content: &str, ip: IpAddr) -> bool {
    match content.trim().parse::<IpAddr>() {
        Ok(parsed) => parsed == ip,
        Err(_) => content == ip.to_string(),
    }
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("ip_source", &self.ip_source.source_name())
            .field("provider", &self.provider.provider_name())
            .field("config", &self.config)
            .finish()
    }
}
