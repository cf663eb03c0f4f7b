// # ddns-core
//
// Core library for the Cloudflare DDNS updater.
//
// ## Architecture Overview
//
// This library provides the pieces shared by the provider client, the IP
// sources and the binary:
// - **RequestExecutor**: Single-request execution seam; `HttpExecutor` sends over the network
// - **Retry**: Bounded-retry decorator for any executor, honoring cancellation
// - **IpSource**: Trait for acquiring the current IP address
// - **DnsProvider**: Trait for locating and updating one DNS record
// - **RecordCache**: Trait for remembering the record between runs
// - **SyncEngine**: One sync cycle: IP → cache check → locate → update
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from implementations
// 2. **Explicit Composition**: Executors wrap executors, built once at construction
// 3. **Cooperative Cancellation**: A `CancellationToken` is threaded through every call
// 4. **Library-First**: All core functionality can be used as a library

pub mod config;
pub mod engine;
pub mod error;
pub mod resilience;
pub mod state;
pub mod traits;
pub mod transport;

// Re-export core types for convenience
pub use config::{DdnsConfig, RetryConfig};
pub use engine::{SyncEngine, SyncOutcome};
pub use error::{Error, Result};
pub use resilience::Retry;
pub use state::{FileRecordCache, MemoryRecordCache, NoopRecordCache};
pub use traits::{DnsProvider, IpSource, IpVersion, Record, RecordCache, RecordType, UpdateRequest};
pub use transport::{ApiRequest, ApiResponse, HttpExecutor, RequestExecutor};

// Re-exported so implementors name the same token type
pub use tokio_util::sync::CancellationToken;
