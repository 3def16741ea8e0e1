pub mod aggregate;
pub mod cli;
pub mod config;
pub mod data;
pub mod dataset;
pub mod derive;
pub mod error;
pub mod io_utils;
pub mod mapping;
pub mod normalize;
pub mod normalize_cmd;
pub mod period;
pub mod pipeline;
pub mod preview;
pub mod record;
pub mod report;
pub mod summary;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::{LevelFilter, info};

use crate::cli::{Cli, Commands};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("vat_estimator", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Summary(args) => summary::execute(&args),
        Commands::Normalize(args) => normalize_cmd::execute(&args),
        Commands::Preview(args) => preview::execute(&args),
        Commands::Rates(args) => handle_rates(&args),
    }
}

fn handle_rates(args: &cli::RatesArgs) -> Result<()> {
    let config = config::Config::load_or_default(args.config.as_deref())?;
    let settings = config.settings();
    let headers = vec!["country".to_string(), "standard_rate".to_string()];
    let rows = settings
        .rates
        .iter()
        .map(|(code, rate)| vec![code.to_string(), format!("{rate:.2}")])
        .collect::<Vec<_>>();
    table::print_table(&headers, &rows, &[table::Align::Left, table::Align::Right]);
    match &settings.excluded_territory {
        Some(territory) => info!("{territory} is excluded from summaries"),
        None => info!("No territory is excluded from summaries"),
    }
    Ok(())
}
