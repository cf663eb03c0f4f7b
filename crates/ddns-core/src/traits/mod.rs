//! Core traits for the DDNS system
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`IpSource`]: Acquire the current IP address
//! - [`DnsProvider`]: Locate and update a DNS record via a provider API
//! - [`RecordCache`]: Remember the record seen on a previous run

pub mod dns_provider;
pub mod ip_source;
pub mod record_cache;

pub use dns_provider::{DnsProvider, Record, RecordType, UpdateRequest};
pub use ip_source::{IpSource, IpVersion};
pub use record_cache::RecordCache;
