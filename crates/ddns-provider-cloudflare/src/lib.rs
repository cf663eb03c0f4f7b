// # Cloudflare DNS Provider
//
// This crate provides the Cloudflare API v4 client used by the DDNS updater.
//
// ## Operations
//
// - **Zone resolution**: registrable root of the domain → zone id
// - **Record lookup**: paginated listing of the zone's records, rejecting
//   duplicates and reporting missing records
// - **Record update**: PUT of `{name, type, content, proxied, ttl}`
//
// Every response goes through the envelope decoder, which turns
// `success: false` responses into one error naming every provider error code.
//
// ## Resilience
//
// Requests are sent through `ddns_core::Retry` wrapping
// `ddns_core::HttpExecutor`: transport failures and 5xx responses are retried
// a bounded number of times with a constant wait. 4xx responses are final.
//
// ## Security Requirements
//
// - API token NEVER appears in logs
// - Client construction fails fast if the token is empty

pub mod client;
pub mod envelope;

pub use client::{CLOUDFLARE_API_BASE, ClientConfig, CloudflareClient, PER_PAGE, Zone, zone_root};
pub use envelope::{ApiError, Envelope, Payload, ResultInfo, decode_envelope, format_errors};
