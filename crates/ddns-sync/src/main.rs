// # ddns-sync - Single-Shot Dynamic DNS Sync
//
// Points a Cloudflare A record (and optionally its "www" sibling) at the
// machine's current public IPv4 address, then exits.
//
// This binary is a THIN integration layer:
// 1. Parse flags / environment
// 2. Initialise logging
// 3. Wire the Cloudflare provider and the HTTP IP source into the reconciler
// 4. Run once and map the outcome to an exit code
//
// All reconciliation logic lives in ddns-core.
//
// ## Example
//
// ```bash
// export DDNS_API_TOKEN=your_token
// ddns-sync --domain-name example.com --handle-www --log-level info
// ```

use anyhow::{Context, Result};
use clap::Parser;
use ddns_core::config::{DEFAULT_IP_ENDPOINT, DEFAULT_TIMEOUT_SECS};
use ddns_core::{DuplicateRecordPolicy, LogLevel, Reconciler, RunOutcome, SyncConfig};
use ddns_ip_http::HttpIpSource;
use ddns_provider_cloudflare::CloudflareProvider;
use std::process::ExitCode;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for the different termination scenarios
///
/// - 0: No-op, update or dry run completed
/// - 1: Configuration error caught before the run started (nothing was sent)
/// - 2: Any failure once the run started, whatever its kind
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

/// Keep a Cloudflare A record pointed at this machine's public IPv4 address
#[derive(Parser, Debug)]
#[command(name = "ddns-sync", version, about)]
struct Cli {
    /// Cloudflare API token (Zone:Read, DNS:Edit)
    #[arg(long, env = "DDNS_API_TOKEN", hide_env_values = true)]
    token: String,

    /// Domain whose A record is managed (must also be the zone name)
    #[arg(long, alias = "domainName", env = "DDNS_DOMAIN")]
    domain_name: String,

    /// Log verbosity: info, warn, error or fatal
    #[arg(long, alias = "logLevel", env = "DDNS_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Also manage the www.<domain> A record
    #[arg(long, alias = "handleWWW", env = "DDNS_HANDLE_WWW")]
    handle_www: bool,

    /// Plain-text public IP service
    #[arg(long, env = "DDNS_IP_ENDPOINT", default_value = DEFAULT_IP_ENDPOINT)]
    ip_endpoint: String,

    /// Deadline for each outbound call, in seconds
    #[arg(long, env = "DDNS_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Fail instead of picking the last record when a name is duplicated
    #[arg(long, env = "DDNS_STRICT_RECORDS")]
    strict_records: bool,

    /// Report what would change without writing anything
    #[arg(long, env = "DDNS_DRY_RUN")]
    dry_run: bool,
}

impl Cli {
    fn to_config(&self) -> SyncConfig {
        let policy = if self.strict_records {
            DuplicateRecordPolicy::Reject
        } else {
            DuplicateRecordPolicy::LastWins
        };

        let mut config = SyncConfig::new(self.token.clone(), self.domain_name.clone())
            .with_handle_www(self.handle_www)
            .with_duplicate_records(policy)
            .with_dry_run(self.dry_run);
        config.ip_endpoint = self.ip_endpoint.clone();
        config.timeout_secs = self.timeout_secs;
        config
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version land here too
            let _ = e.print();
            return if e.use_stderr() {
                DdnsExitCode::ConfigError.into()
            } else {
                DdnsExitCode::Success.into()
            };
        }
    };

    // Initialize tracing
    let log_level = LogLevel::from_name(&cli.log_level);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level.tracing_level())
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    let config = cli.to_config();
    debug!("Configuration: {:?}", config);

    let reconciler = match build_reconciler(config) {
        Ok(reconciler) => reconciler,
        Err(e) => {
            error!("Configuration error: {:#}", e);
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

    rt.block_on(run_once(reconciler)).into()
}

/// Wire the concrete collaborators into a reconciler
fn build_reconciler(
    config: SyncConfig,
) -> Result<(Reconciler, tokio::sync::mpsc::Receiver<ddns_core::SyncEvent>)> {
    // Validated up front so bad input never reaches a client constructor
    config.validate()?;

    let provider = CloudflareProvider::new(config.api_token.clone(), config.timeout())
        .context("Failed to create Cloudflare provider")?;
    let ip_source = HttpIpSource::with_timeout(&config.ip_endpoint, config.timeout())
        .context("Failed to create IP source")?;

    let reconciler = Reconciler::new(Box::new(provider), Box::new(ip_source), config)?;
    Ok(reconciler)
}

async fn run_once(
    (reconciler, mut events_rx): (Reconciler, tokio::sync::mpsc::Receiver<ddns_core::SyncEvent>),
) -> DdnsExitCode {
    let events = tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            debug!("Sync event: {:?}", event);
        }
    });

    let result = reconciler.run().await;

    // Closing the sender lets the event task finish
    drop(reconciler);
    if let Err(e) = events.await {
        warn!("Event logging task ended abnormally: {}", e);
    }

    exit_code_for(result)
}

/// The reconciler already logged the failing stage; only the code is left
///
/// Lookups start concurrently, so an error of any kind coming out of a run
/// may follow network traffic and maps to a runtime error.
fn exit_code_for(result: ddns_core::Result<RunOutcome>) -> DdnsExitCode {
    match result {
        Ok(RunOutcome::Unchanged { address }) => {
            info!("Record already points at {}; no update needed", address);
            DdnsExitCode::Success
        }
        Ok(RunOutcome::Updated { records, .. }) => {
            for record in &records {
                info!("Updated {} to {}", record.name, record.content);
            }
            DdnsExitCode::Success
        }
        Ok(RunOutcome::DryRun { address, records }) => {
            info!(
                "Dry run: {} record(s) would be set to {}",
                records.len(),
                address
            );
            DdnsExitCode::Success
        }
        Err(e) => {
            debug!("Run failed with {:?} error", e.kind());
            DdnsExitCode::RuntimeError
        }
    }
}
