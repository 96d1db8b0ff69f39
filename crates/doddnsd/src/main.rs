// # doddnsd - DigitalOcean dynamic DNS daemon
//
// Keeps the A (IPv4) or AAAA (IPv6) record of one hostname hosted on
// DigitalOcean DNS pointed at this machine's public address.
//
// The daemon is a thin integration layer:
// 1. Parse flags / environment into a `DdnsConfig`
// 2. Initialize tracing
// 3. Build the HTTP IP source and the DigitalOcean provider
// 4. Run the engine until SIGINT/SIGTERM or the first error
//
// ## Configuration
//
// Every flag falls back to an environment variable:
//
// - `--hostname` / `DODDNS_HOSTNAME`: hostname to manage (required)
// - `-f, --token-file` / `DODDNS_API_TOKEN_FILE`: file holding the API token (required)
// - `-s, --service` / `DODDNS_SERVICES`: IP lookup services (space separated in env)
// - `-i, --check-interval` / `DODDNS_CHECK_INTERVAL_MINUTES`: minutes between checks
// - `--ttl` / `DODDNS_RECORD_TTL`: TTL of the managed record
// - `--log-level` / `DODDNS_LOG_LEVEL`: trace, debug, info, warn, error
// - `--api-base` / `DODDNS_API_BASE`: DigitalOcean API endpoint override
//
// ## Example
//
// ```bash
// export DODDNS_HOSTNAME=home.example.com
// export DODDNS_API_TOKEN_FILE=/run/secrets/digitalocean-token
//
// doddnsd --check-interval 5
// ```

use anyhow::{Context, Result};
use clap::Parser;
use doddns_core::config::DEFAULT_IP_SERVICES;
use doddns_core::{DdnsConfig, DdnsEngine, EngineConfig, IpLookupConfig, ProviderConfig};
use doddns_ip_http::HttpIpSource;
use doddns_provider_digitalocean::DigitalOceanProvider;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DdnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (lookup, provider or resolution failure)
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Keep a DigitalOcean DNS record pointed at this host's public IP
#[derive(Debug, Parser)]
#[command(name = "doddnsd")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Hostname to update, e.g. home.example.com
    #[arg(long, env = "DODDNS_HOSTNAME")]
    hostname: String,

    /// File containing the DigitalOcean API token
    #[arg(short = 'f', long = "token-file", env = "DODDNS_API_TOKEN_FILE")]
    token_file: PathBuf,

    /// Service returning the public IP as plain text (can be specified multiple times)
    #[arg(
        short = 's',
        long = "service",
        value_name = "URL",
        env = "DODDNS_SERVICES",
        value_delimiter = ' '
    )]
    services: Vec<String>,

    /// Minutes between IP checks
    #[arg(short = 'i', long = "check-interval", env = "DODDNS_CHECK_INTERVAL_MINUTES", default_value_t = 1)]
    check_interval_minutes: u64,

    /// TTL of the managed record, in seconds
    #[arg(long, env = "DODDNS_RECORD_TTL", default_value_t = 300)]
    ttl: u32,

    /// Log level: trace, debug, info, warn or error
    #[arg(long = "log-level", env = "DODDNS_LOG_LEVEL", default_value = "info", value_parser = parse_log_level)]
    log_level: Level,

    /// DigitalOcean API endpoint override
    #[arg(long = "api-base", env = "DODDNS_API_BASE")]
    api_base: Option<String>,
}

fn parse_log_level(value: &str) -> Result<Level, String> {
    value.parse::<Level>().map_err(|_| {
        format!(
            "'{}' is not a valid log level. Valid levels: trace, debug, info, warn, error",
            value
        )
    })
}

impl Cli {
    /// Build the validated daemon configuration
    fn into_config(self) -> Result<DdnsConfig> {
        let api_token = read_token_file(&self.token_file)?;

        let check_interval_secs = self
            .check_interval_minutes
            .checked_mul(60)
            .context("Check interval is too large")?;

        // Runs of spaces in DODDNS_SERVICES split into empty entries
        let services: Vec<String> = self
            .services
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let services = if services.is_empty() {
            DEFAULT_IP_SERVICES.iter().map(|s| s.to_string()).collect()
        } else {
            services
        };

        let config = DdnsConfig {
            hostname: self.hostname,
            ip_lookup: IpLookupConfig {
                services,
                ..IpLookupConfig::default()
            },
            provider: ProviderConfig::DigitalOcean {
                api_token,
                api_base: self.api_base,
            },
            engine: EngineConfig {
                check_interval_secs,
                ttl: self.ttl,
            },
        };

        config.validate()?;
        Ok(config)
    }
}

/// Read the API token, trimming surrounding whitespace
fn read_token_file(path: &Path) -> Result<String> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read API token from file {}", path.display()))?;

    let token = contents.trim();
    if token.is_empty() {
        anyhow::bail!("API token file {} is empty", path.display());
    }

    Ok(token.to_string())
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                DdnsExitCode::ConfigError.into()
            } else {
                // --help / --version
                DdnsExitCode::CleanShutdown.into()
            };
        }
    };

    let log_level = cli.log_level;

    let config = match cli.into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    info!("Starting doddnsd for hostname [{}]", config.hostname);

    // One cycle at a time; a single thread is all the engine needs
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    rt.block_on(run_daemon(config)).into()
}

/// Build the components and run the engine to completion
async fn run_daemon(config: DdnsConfig) -> DdnsExitCode {
    let engine = match build_engine(&config) {
        Ok(engine) => engine,
        Err(e) => {
            error!("Startup error: {:#}", e);
            return DdnsExitCode::ConfigError;
        }
    };

    match engine.run().await {
        Ok(()) => {
            info!("Shutting down daemon");
            DdnsExitCode::CleanShutdown
        }
        Err(e) => {
            error!("Daemon error: {}", e);
            DdnsExitCode::RuntimeError
        }
    }
}

fn build_engine(config: &DdnsConfig) -> Result<DdnsEngine> {
    let ip_source = HttpIpSource::from_config(&config.ip_lookup)?;
    let provider = DigitalOceanProvider::from_config(&config.provider)?;

    info!(
        "Using {} provider and {} IP lookup service(s), checking every {}s",
        config.provider.type_name(),
        ip_source.services().len(),
        config.engine.check_interval_secs
    );

    Ok(DdnsEngine::new(
        Box::new(ip_source),
        Box::new(provider),
        config,
    )?)
}
