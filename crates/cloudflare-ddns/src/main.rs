// # cloudflare-ddns
//
// Runs one sync cycle: find this host's IP address and point a Cloudflare
// DNS record at it. Meant to be run periodically (cron, systemd timer).
//
// This binary is a thin integration layer: it reads the configuration,
// initializes logging and the runtime, wires the collaborators together and
// runs the `SyncEngine` from ddns-core once.
//
// ## Configuration
//
// Flags or environment variables:
//
// - `--token` / `DDNS_TOKEN`: Cloudflare API token (required)
// - `--domain` / `DDNS_DOMAIN`: record name (required)
// - `--type` / `DDNS_TYPE`: A or AAAA (default A)
// - `--interface` / `DDNS_INTERFACE`: read the IP from this interface
// - `--timeout` / `DDNS_TIMEOUT`: request timeout in seconds (default 10)
// - `--ttl` / `DDNS_TTL`: record TTL, 1 = automatic (default 1)
// - `--proxied` / `DDNS_PROXIED`: proxy through Cloudflare (default true)
// - `--cache` / `DDNS_CACHE`: cache the record between runs (default false)
// - `--log-level` / `DDNS_LOG_LEVEL`: log level (default info)
//
// ## Example
//
// ```bash
// export DDNS_TOKEN=your_token
// cloudflare-ddns --domain home.example.com --type AAAA --cache
// ```

mod cli;

use anyhow::Result;
use clap::Parser;
use ddns_core::traits::{IpSource, RecordCache};
use ddns_core::{DdnsConfig, FileRecordCache, NoopRecordCache, SyncEngine, SyncOutcome};
use ddns_ip_http::ExternalIpSource;
use ddns_ip_netlink::InterfaceIpSource;
use ddns_provider_cloudflare::{ClientConfig, CloudflareClient};
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

use crate::cli::Cli;

/// Exit codes for different termination scenarios
///
/// - 0: Sync cycle completed
/// - 1: Configuration or startup error
/// - 2: Runtime error (the cycle failed or was cancelled)
#[derive(Debug, Clone, Copy)]
enum DdnsExitCode {
    Success = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                DdnsExitCode::ConfigError.into()
            } else {
                DdnsExitCode::Success.into()
            };
        }
    };

    let log_level = match cli.level() {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    let config = cli.to_config();
    if let Err(e) = config.validate() {
        error!("{}", e);
        return DdnsExitCode::ConfigError.into();
    }

    let engine = match build_engine(config) {
        Ok(engine) => engine,
        Err(e) => {
            error!("{}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        match run(engine).await {
            Ok(SyncOutcome::Unchanged { current_ip, .. }) => {
                info!("Record is up to date ({})", current_ip);
                DdnsExitCode::Success
            }
            Ok(SyncOutcome::Updated {
                previous_content,
                new_ip,
            }) => {
                info!("Record updated from {} to {}", previous_content, new_ip);
                DdnsExitCode::Success
            }
            Err(e) => {
                error!("{}", e);
                DdnsExitCode::RuntimeError
            }
        }
    });

    result.into()
}

/// Wire the collaborators together
///
/// Runs before the runtime is started, so every failure here is a startup error.
fn build_engine(config: DdnsConfig) -> Result<SyncEngine> {
    let ip_source = build_ip_source(&config)?;
    let cache = build_cache(&config)?;
    let provider = CloudflareClient::new(ClientConfig::from_ddns_config(&config))
        .map_err(|e| anyhow::anyhow!("could not create Cloudflare client: {}", e))?;

    info!(
        "Syncing {} record {} (source: {})",
        config.record_type,
        config.domain,
        ip_source.source_name()
    );

    let engine = SyncEngine::new(ip_source, Box::new(provider), cache, config)
        .map_err(|e| anyhow::anyhow!("invalid configuration: {}", e))?;
    Ok(engine)
}

/// Run one sync cycle, cancelled on shutdown signals
async fn run(engine: SyncEngine) -> ddns_core::Result<SyncOutcome> {
    let cancel = CancellationToken::new();
    let signals = tokio::spawn(cancel_on_shutdown(cancel.clone()));

    let outcome = engine.sync_once(&cancel).await;

    signals.abort();
    outcome
}

fn build_ip_source(config: &DdnsConfig) -> Result<Box<dyn IpSource>> {
    match &config.interface {
        Some(device) => Ok(Box::new(InterfaceIpSource::new(device.clone()))),
        None => {
            let source = ExternalIpSource::with_timeout(config.timeout())
                .map_err(|e| anyhow::anyhow!("could not create IP echo source: {}", e))?;
            Ok(Box::new(source))
        }
    }
}

fn build_cache(config: &DdnsConfig) -> Result<Box<dyn RecordCache>> {
    if !config.cache_enabled {
        return Ok(Box::new(NoopRecordCache));
    }

    let cache = FileRecordCache::in_user_cache_dir()
        .map_err(|e| anyhow::anyhow!("could not set up record cache: {}", e))?;
    info!("Using record cache in {}", cache.dir().display());
    Ok(Box::new(cache))
}

/// Cancel `cancel` on SIGTERM or SIGINT
#[cfg(unix)]
async fn cancel_on_shutdown(cancel: CancellationToken) {
    let (mut sigterm, mut sigint) = match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(term), Ok(int)) => (term, int),
        (Err(e), _) | (_, Err(e)) => {
            warn!("Failed to set up signal handlers: {}", e);
            return;
        }
    };

    let name = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };

    warn!("Received {}, cancelling", name);
    cancel.cancel();
}

/// Cancel `cancel` on CTRL-C
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn cancel_on_shutdown(cancel: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            warn!("Received CTRL-C, cancelling");
            cancel.cancel();
        }
        Err(e) => warn!("Failed to wait for CTRL-C: {}", e),
    }
}
