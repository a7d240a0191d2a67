use clap::Parser;
use lake_mock::application::ledger::LedgerEngine;
use lake_mock::application::router::Router;
use lake_mock::config::{BusConfig, DEFAULT_EGRESS, DEFAULT_INGRESS};
use lake_mock::infrastructure::bus::LakeBus;
use lake_mock::interfaces::csv::account_reader::load_accounts;
use lake_mock::interfaces::csv::account_writer::AccountWriter;
use lake_mock::logging;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Address producers push frames to
    #[arg(long, env = "LAKE_INGRESS", default_value = DEFAULT_INGRESS)]
    ingress: String,

    /// Address subscribers receive frames from
    #[arg(long, env = "LAKE_EGRESS", default_value = DEFAULT_EGRESS)]
    egress: String,

    /// CSV file of accounts to open at startup (tenant,account,currency,balance_check)
    #[arg(long, env = "LAKE_ACCOUNTS")]
    accounts: Option<PathBuf>,

    /// Upper bound of one listener receive, in milliseconds
    #[arg(long, env = "LAKE_POLL_INTERVAL_MS", default_value_t = 1000)]
    poll_interval_ms: u64,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, env = "LAKE_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, env = "LAKE_LOG_JSON")]
    log_json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level, cli.log_json);

    let engine = Arc::new(LedgerEngine::new());
    if let Some(path) = cli.accounts {
        let file = File::open(path).into_diagnostic()?;
        load_accounts(&engine, file).await.into_diagnostic()?;
    }

    let config = BusConfig {
        ingress: cli.ingress,
        egress: cli.egress,
        poll_interval: Duration::from_millis(cli.poll_interval_ms),
        ..BusConfig::default()
    };
    let bus = LakeBus::new(config, Arc::new(Router::new(Arc::clone(&engine))));
    bus.start().await.into_diagnostic()?;

    tokio::signal::ctrl_c().await.into_diagnostic()?;
    info!("shutdown requested");
    bus.stop().await;

    // Output final state
    let accounts = engine.accounts().await;
    let stdout = io::stdout();
    let mut writer = AccountWriter::new(stdout.lock());
    writer.write_accounts(&accounts).into_diagnostic()?;

    Ok(())
}
