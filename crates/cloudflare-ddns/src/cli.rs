// Command-line and environment configuration.
//
// Every flag can also be set through its `DDNS_*` environment variable;
// flags win over the environment.

use clap::{ArgAction, Parser};
use ddns_core::{DdnsConfig, RecordType};
use tracing::Level;

#[derive(Parser, Debug)]
#[command(name = "cloudflare-ddns")]
#[command(version)]
#[command(about = "Point a Cloudflare DNS record at this host's current IP address")]
pub struct Cli {
    /// Cloudflare API token with Zone:DNS:Edit permissions
    #[arg(long, env = "DDNS_TOKEN", hide_env_values = true, default_value = "")]
    pub token: String,

    /// Fully-qualified record name, e.g. home.example.com
    #[arg(long, env = "DDNS_DOMAIN", default_value = "")]
    pub domain: String,

    /// Record type to update (A or AAAA)
    #[arg(
        long = "type",
        env = "DDNS_TYPE",
        default_value = "A",
        value_parser = parse_record_type
    )]
    pub record_type: RecordType,

    /// Read the address from this network interface instead of an echo service
    #[arg(long, env = "DDNS_INTERFACE")]
    pub interface: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "DDNS_TIMEOUT", default_value_t = 10)]
    pub timeout: u64,

    /// Record TTL in seconds; 1 means automatic
    #[arg(long, env = "DDNS_TTL", default_value_t = 1)]
    pub ttl: u32,

    /// Proxy traffic through Cloudflare
    #[arg(
        long,
        env = "DDNS_PROXIED",
        default_value_t = true,
        action = ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub proxied: bool,

    /// Remember the record between runs and skip the API when nothing changed
    #[arg(
        long,
        env = "DDNS_CACHE",
        default_value_t = false,
        action = ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub cache: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "DDNS_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Cli {
    /// Updater configuration, normalized but not yet validated
    pub fn to_config(&self) -> DdnsConfig {
        let mut config = DdnsConfig::new(self.domain.trim(), self.token.trim())
            .with_record_type(self.record_type);
        config.timeout_secs = self.timeout;
        config.ttl = self.ttl;
        config.proxied = self.proxied;
        config.interface = self.interface.clone();
        config.cache_enabled = self.cache;
        config.normalize()
    }

    pub fn level(&self) -> Result<Level, String> {
        self.log_level.parse::<Level>().map_err(|_| {
            format!(
                "log level {:?} is not valid. Valid levels: trace, debug, info, warn, error",
                self.log_level
            )
        })
    }
}

fn parse_record_type(value: &str) -> Result<RecordType, String> {
    value
        .to_ascii_uppercase()
        .parse::<RecordType>()
        .map_err(|e| e.to_string())
}
