//! Test doubles and common utilities for sync engine contract tests
//!
//! This module provides minimal test doubles that record how the engine
//! drives its collaborators.

#![allow(dead_code)]

use ddns_core::error::{Error, Result};
use ddns_core::traits::{
    DnsProvider, IpSource, IpVersion, Record, RecordCache, RecordType, UpdateRequest,
};
use ddns_core::{CancellationToken, DdnsConfig};
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// An IpSource that always returns the same address
pub struct FixedIpSource {
    ip: IpAddr,
    requested: Arc<Mutex<Vec<IpVersion>>>,
}

impl FixedIpSource {
    pub fn new(ip: IpAddr) -> Self {
        Self {
            ip,
            requested: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Versions requested so far (shared with clones of the handle)
    pub fn requested(&self) -> Arc<Mutex<Vec<IpVersion>>> {
        Arc::clone(&self.requested)
    }
}

#[async_trait::async_trait]
impl IpSource for FixedIpSource {
    async fn current(&self, version: IpVersion, _cancel: &CancellationToken) -> Result<IpAddr> {
        self.requested.lock().unwrap().push(version);
        Ok(self.ip)
    }

    fn source_name(&self) -> &'static str {
        "fixed"
    }
}

/// An IpSource that is never able to answer
pub struct UnavailableIpSource;

#[async_trait::async_trait]
impl IpSource for UnavailableIpSource {
    async fn current(&self, _version: IpVersion, _cancel: &CancellationToken) -> Result<IpAddr> {
        Err(Error::ip_source("no route to ipify"))
    }

    fn source_name(&self) -> &'static str {
        "unavailable"
    }
}

/// Shared counters of a MockDnsProvider
#[derive(Clone, Default)]
pub struct ProviderCalls {
    pub get_calls: Arc<AtomicUsize>,
    pub updates: Arc<Mutex<Vec<(String, UpdateRequest)>>>,
}

impl ProviderCalls {
    pub fn get_count(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn updates(&self) -> Vec<(String, UpdateRequest)> {
        self.updates.lock().unwrap().clone()
    }
}

/// A mock DnsProvider serving one record
pub struct MockDnsProvider {
    record: Option<Record>,
    fail_update: bool,
    calls: ProviderCalls,
}

impl MockDnsProvider {
    pub fn with_record(record: Record) -> (Self, ProviderCalls) {
        let calls = ProviderCalls::default();
        let provider = Self {
            record: Some(record),
            fail_update: false,
            calls: calls.clone(),
        };
        (provider, calls)
    }

    pub fn empty() -> (Self, ProviderCalls) {
        let calls = ProviderCalls::default();
        let provider = Self {
            record: None,
            fail_update: false,
            calls: calls.clone(),
        };
        (provider, calls)
    }

    pub fn failing_updates(mut self) -> Self {
        self.fail_update = true;
        self
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn get_record(
        &self,
        domain: &str,
        record_type: RecordType,
        _cancel: &CancellationToken,
    ) -> Result<Record> {
        self.calls.get_calls.fetch_add(1, Ordering::SeqCst);
        match &self.record {
            Some(record) if record.name == domain && record.record_type == record_type => {
                Ok(record.clone())
            }
            _ => Err(Error::not_found(format!(
                "no record for {:?} of type {} found",
                domain, record_type
            ))),
        }
    }

    async fn update_record(
        &self,
        record_id: &str,
        request: UpdateRequest,
        _cancel: &CancellationToken,
    ) -> Result<()> {
        self.calls
            .updates
            .lock()
            .unwrap()
            .push((record_id.to_string(), request));
        if self.fail_update {
            return Err(Error::api("[9109] Invalid access token"));
        }
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// A RecordCache whose every operation fails
pub struct BrokenCache;

#[async_trait::async_trait]
impl RecordCache for BrokenCache {
    async fn get_record(&self, _domain: &str, _record_type: RecordType) -> Result<Option<Record>> {
        Err(Error::cache("disk on fire"))
    }

    async fn save_record(&self, _record: &Record) -> Result<()> {
        Err(Error::cache("disk on fire"))
    }
}

/// A record in the shape the provider returns
pub fn record(name: &str, content: &str) -> Record {
    Record {
        id: "a3bf".to_string(),
        record_type: RecordType::A,
        name: name.to_string(),
        content: content.to_string(),
    }
}

/// Minimal valid configuration for tests
pub fn minimal_config(domain: &str) -> DdnsConfig {
    DdnsConfig::new(domain, "test_token")
}
