// # Record Cache Trait
//
// Defines the interface for remembering the record seen on a previous run.
//
// ## Purpose
//
// When the cached record already carries the current IP the sync cycle
// ends without any provider call. A cache is optional: the noop
// implementation always misses.
//
// ## Implementations
//
// - File-based: one JSON file per record under the user cache directory
// - Memory: process-local, for tests and embedding
// - Noop: caching disabled

use async_trait::async_trait;

use super::dns_provider::{Record, RecordType};

/// Trait for record cache implementations
///
/// # Thread Safety
///
/// All methods must be safe to call concurrently from multiple tasks.
#[async_trait]
pub trait RecordCache: Send + Sync {
    /// Get the cached record for `domain` and `record_type`
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Record))`: A previously saved record
    /// - `Ok(None)`: Cache miss
    /// - `Err(Error)`: Storage error
    async fn get_record(
        &self,
        domain: &str,
        record_type: RecordType,
    ) -> Result<Option<Record>, crate::Error>;

    /// Save a record, keyed by its own name and type
    async fn save_record(&self, record: &Record) -> Result<(), crate::Error>;
}
