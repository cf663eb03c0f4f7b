// # Record Cache Implementations
//
// This module provides implementations of the RecordCache trait for
// different persistence strategies.

pub mod file;
pub mod memory;

pub use file::FileRecordCache;
pub use memory::{MemoryRecordCache, NoopRecordCache};
