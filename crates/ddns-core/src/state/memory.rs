// # Memory Record Cache
//
// In-memory implementation of RecordCache.
//
// ## Purpose
//
// Keeps records for the lifetime of the process only. Useful for tests and
// for embedding the sync engine in a longer-running program.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::Error;
use crate::traits::{Record, RecordCache, RecordType};

/// In-memory record cache
///
/// Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordCache {
    inner: Arc<RwLock<HashMap<(String, RecordType), Record>>>,
}

impl MemoryRecordCache {
    /// Create a new empty memory cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of cached records
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Check if the cache is empty
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait]
impl RecordCache for MemoryRecordCache {
    async fn get_record(
        &self,
        domain: &str,
        record_type: RecordType,
    ) -> Result<Option<Record>, Error> {
        let guard = self.inner.read().await;
        Ok(guard.get(&(domain.to_string(), record_type)).cloned())
    }

    async fn save_record(&self, record: &Record) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard.insert((record.name.clone(), record.record_type), record.clone());
        Ok(())
    }
}

/// Cache used when caching is disabled: always misses, never stores
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRecordCache;

#[async_trait]
impl RecordCache for NoopRecordCache {
    async fn get_record(
        &self,
        _domain: &str,
        _record_type: RecordType,
    ) -> Result<Option<Record>, Error> {
        Ok(None)
    }

    async fn save_record(&self, _record: &Record) -> Result<(), Error> {
        Ok(())
    }
}
