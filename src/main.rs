//! Khata main entry point

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use khata_api::start_server;
use khata_config::{Config, ConfigError};
use khata_core::store::{open_local, open_remote, RecordStore};
use khata_core::{build_store, DateRange, Khata, Summary};
use khata_utils::{format_currency, format_date};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "khata")]
#[command(version = "0.1.0")]
#[command(about = "A small credit/debit ledger for people and the organization", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API (default)
    Serve,
    /// Print totals for the organization or one person
    Summary {
        /// Person id; omit for the organization-wide summary
        #[arg(long)]
        person: Option<i64>,
        /// First date to include (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Last date to include (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,
    },
    /// Copy every local record into the remote store
    Migrate,
}

/// Config failure with its code, field and suggestions
fn config_failure(path: &Path, error: ConfigError) -> anyhow::Error {
    anyhow::anyhow!("Failed to load {}\n{}", path.display(), error.to_details())
}

/// Load the config file, or run on defaults when it does not exist
async fn load_config(path: &Path) -> anyhow::Result<(Config, bool)> {
    match Config::load(path).await {
        Ok(config) => Ok((config, true)),
        Err(ConfigError::FileNotFound { .. }) => {
            let mut config = Config::default();
            config.apply_env_overrides(|key| std::env::var(key).ok());
            config.validate().map_err(|e| config_failure(path, e))?;
            Ok((config, false))
        }
        Err(e) => Err(config_failure(path, e)),
    }
}

fn print_summary(title: &str, summary: &Summary, config: &Config) {
    let money = |amount| format_currency(amount, &config.currency.symbol, config.currency.decimal_places);
    println!("{}", title);
    println!("  Total credit: {}", money(summary.total_credit));
    println!("  Total debit:  {}", money(summary.total_debit));
    println!("  Balance:      {}", money(summary.balance));
}

async fn run_summary(khata: &Khata, config: &Config, person: Option<i64>, range: DateRange) -> anyhow::Result<()> {
    match person {
        Some(id) => {
            let (person, mut ledger) = khata.person_ledger(id).await?;
            ledger.set_range(range);
            print_summary(
                &format!("{} ({})", person.name, range.description()),
                &ledger.summary(),
                config,
            );
            for entry in ledger.entries() {
                println!(
                    "  {:>4}  {}  {:<6}  {:>14}  {}",
                    entry.id,
                    format_date(entry.date),
                    entry.entry_type,
                    format_currency(entry.amount, &config.currency.symbol, config.currency.decimal_places),
                    entry.description.as_deref().unwrap_or("")
                );
            }
        }
        None => {
            let summary = khata.factory_summary(range).await?;
            print_summary(&format!("Organization ({})", range.description()), &summary, config);
        }
    }
    Ok(())
}

async fn run_migrate(config: &Config) -> anyhow::Result<()> {
    let remote = open_remote(&config.storage)?
        .context("No remote store configured; set storage.remote or KHATA_REMOTE_URL and KHATA_REMOTE_API_KEY")?;
    let local = open_local(&config.storage);
    local.initialize().await?;

    let report = remote.migrate_from(&local).await?;
    println!("Migrated {} persons and {} entries", report.persons, report.entries);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let rt = Runtime::new()?;

    rt.block_on(async {
        let (config, from_file) = load_config(&args.config).await?;

        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.logging.level)).init();
        if from_file {
            log::info!("Config loaded from {}", args.config.display());
        } else {
            log::warn!("Config file {} not found, using defaults", args.config.display());
        }

        if let Some(Command::Migrate) = args.command {
            return run_migrate(&config).await;
        }

        let khata = Khata::new(build_store(&config.storage)?);
        khata.initialize().await?;

        match args.command {
            Some(Command::Summary { person, start, end }) => {
                run_summary(&khata, &config, person, DateRange::new(start, end)).await
            }
            _ => start_server(config, Arc::new(khata)).await,
        }
    })
}
