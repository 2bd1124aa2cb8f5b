//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::subscriber::SetGlobalDefaultError;
use tracing::Level;

use crate::adapters::blob_store_adapter::FsBlobStore;
use crate::adapters::cached_price_adapter::CachedPriceAdapter;
use crate::adapters::console_report::ConsoleReportAdapter;
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::trade_log_csv::CsvTradeLogAdapter;
use crate::domain::asset::{Asset, AssetClass};
use crate::domain::config_validation::{
    read_date, read_double, read_int, validate_data_config, validate_engine_config,
    DATA_SECTION, ENGINE_SECTION,
};
use crate::domain::engine::{run_backtest, BacktestResult, EngineConfig};
use crate::domain::error::DcaError;
use crate::domain::summary::ReportSummary;
use crate::ports::config_port::ConfigPort;
use crate::ports::price_port::PricePort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "dcatrader", about = "Dollar-cost-averaging strategy backtester")]
pub struct Cli {
    /// Log level for engine tracing (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest for one asset
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        asset: String,
        /// Override [data] start_date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,
        /// Override [data] end_date (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,
        /// Write the trade log as CSV to this path
        #[arg(long)]
        trades: Option<PathBuf>,
        /// Print every trade event before the summary
        #[arg(long)]
        show_trades: bool,
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List supported assets
    Assets,
    /// List symbols available in a price directory
    Symbols {
        #[arg(short, long)]
        dir: PathBuf,
    },
}

/// Install the stderr tracing subscriber. Unknown levels fall back to WARN.
///
/// Fails if a global subscriber is already installed.
pub fn init_logging(level: &str) -> Result<(), SetGlobalDefaultError> {
    let level = level.parse::<Level>().unwrap_or(Level::WARN);
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            asset,
            start,
            end,
            trades,
            show_trades,
            dry_run,
        } => {
            if dry_run {
                run_dry_run(&config, &asset)
            } else {
                run_backtest_command(
                    &config,
                    &asset,
                    start.as_deref(),
                    end.as_deref(),
                    trades.as_ref(),
                    show_trades,
                )
            }
        }
        Command::Validate { config } => run_validate(&config),
        Command::Assets => run_assets(),
        Command::Symbols { dir } => run_symbols(&dir),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = DcaError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn fail(err: DcaError) -> ExitCode {
    eprintln!("error: {err}");
    (&err).into()
}

fn run_backtest_command(
    config_path: &PathBuf,
    asset_name: &str,
    start_override: Option<&str>,
    end_override: Option<&str>,
    trades_path: Option<&PathBuf>,
    show_trades: bool,
) -> ExitCode {
    // Stage 1: Load config
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    // Stage 2: Resolve asset
    let asset: Asset = match asset_name.parse() {
        Ok(a) => a,
        Err(e) => return fail(e),
    };

    // Stage 3: Validate and build engine config
    if let Err(e) = validate_engine_config(&adapter) {
        return fail(e);
    }
    let engine_config = match build_engine_config(&adapter, asset.class()) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };

    // Stage 4: Resolve date range and price source
    let (start_date, end_date) = match resolve_dates(&adapter, start_override, end_override) {
        Ok(r) => r,
        Err(e) => return fail(e),
    };
    let price_port = match build_price_port(&adapter, asset.class()) {
        Ok(p) => p,
        Err(e) => return fail(e),
    };

    // Stage 5: Reports
    let show_trades = show_trades || adapter.get_bool("report", "show_trades", false);
    let console = ConsoleReportAdapter::new(io::stdout(), show_trades);
    let trades_path = trades_path
        .cloned()
        .or_else(|| adapter.get_string("report", "trades_csv").map(PathBuf::from));
    let trade_log = trades_path.clone().map(CsvTradeLogAdapter::new);

    let mut reports: Vec<&dyn ReportPort> = vec![&console];
    if let Some(ref log) = trade_log {
        reports.push(log);
    }

    eprintln!(
        "Running {} ({}) from {} to {}",
        asset,
        asset.symbol(),
        start_date,
        end_date
    );

    match run_backtest_pipeline(
        price_port.as_ref(),
        asset,
        &engine_config,
        start_date,
        end_date,
        &reports,
    ) {
        Ok(result) => {
            eprintln!(
                "  Processed {} of {} samples",
                result.samples_processed, result.samples_total
            );
            if let Some(path) = trades_path {
                eprintln!("Trade log written to: {}", path.display());
            }
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}

/// Fetch, simulate and report. Returns the run result for inspection.
pub fn run_backtest_pipeline(
    price_port: &dyn PricePort,
    asset: Asset,
    engine_config: &EngineConfig,
    start_date: NaiveDate,
    end_date: NaiveDate,
    reports: &[&dyn ReportPort],
) -> Result<BacktestResult, DcaError> {
    let samples = price_port.fetch_prices(asset.symbol(), start_date, end_date)?;
    if samples.is_empty() {
        return Err(DcaError::NoData {
            symbol: asset.symbol().to_string(),
        });
    }

    let result = run_backtest(&samples, engine_config)?;

    let summary = ReportSummary::from_result(asset.name(), &result);
    for report in reports {
        report.write(&summary, &result.events)?;
    }
    Ok(result)
}

pub fn build_engine_config(
    adapter: &dyn ConfigPort,
    class: AssetClass,
) -> Result<EngineConfig, DcaError> {
    let defaults = EngineConfig::default();
    let s = ENGINE_SECTION;

    let max_holding_days = read_int(adapter, s, "max_holding_days", defaults.max_holding_days)?;
    let reseed_day = read_int(
        adapter,
        s,
        "reseed_interval_day_of_month",
        defaults.reseed_interval_day_of_month as i64,
    )?;
    let warmup = read_int(adapter, s, "warmup_samples", defaults.warmup_samples as i64)?;

    let config = EngineConfig {
        initial_cash: read_double(adapter, s, "initial_cash", defaults.initial_cash)?,
        fee_rate: read_double(adapter, s, "fee_rate", defaults.fee_rate)?,
        stop_loss_threshold_percent: read_double(
            adapter,
            s,
            "stop_loss_threshold_percent",
            defaults.stop_loss_threshold_percent,
        )?,
        max_holding_days,
        reseed_amount: read_double(adapter, s, "reseed_amount", defaults.reseed_amount)?,
        reseed_interval_day_of_month: u32::try_from(reseed_day).map_err(|_| {
            DcaError::ConfigInvalid {
                section: s.into(),
                key: "reseed_interval_day_of_month".into(),
                reason: "must be between 1 and 31".into(),
            }
        })?,
        profit_threshold_percent: read_double(
            adapter,
            s,
            "profit_threshold_percent",
            class.default_profit_threshold_percent(),
        )?,
        warmup_samples: usize::try_from(warmup).map_err(|_| DcaError::ConfigInvalid {
            section: s.into(),
            key: "warmup_samples".into(),
            reason: "must be non-negative".into(),
        })?,
    };

    config.validate()?;
    Ok(config)
}

pub fn resolve_dates(
    adapter: &dyn ConfigPort,
    start_override: Option<&str>,
    end_override: Option<&str>,
) -> Result<(NaiveDate, NaiveDate), DcaError> {
    let parse = |raw: &str, key: &str| {
        NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| DcaError::ConfigInvalid {
            section: DATA_SECTION.into(),
            key: key.into(),
            reason: format!("invalid {} format, expected YYYY-MM-DD", key),
        })
    };

    let start = match start_override {
        Some(raw) => parse(raw, "start_date")?,
        None => read_date(adapter, DATA_SECTION, "start_date")?,
    };
    let end = match end_override {
        Some(raw) => parse(raw, "end_date")?,
        None => read_date(adapter, DATA_SECTION, "end_date")?,
    };

    if start >= end {
        return Err(DcaError::ConfigInvalid {
            section: DATA_SECTION.into(),
            key: "start_date".into(),
            reason: "start_date must be before end_date".into(),
        });
    }
    Ok((start, end))
}

/// CSV prices for the asset class, wrapped in a file cache when
/// `[data] cache_dir` is set.
pub fn build_price_port(
    adapter: &dyn ConfigPort,
    class: AssetClass,
) -> Result<Box<dyn PricePort>, DcaError> {
    let key = class.data_dir_key();
    let dir = adapter
        .get_string(DATA_SECTION, key)
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| DcaError::ConfigMissing {
            section: DATA_SECTION.into(),
            key: key.into(),
        })?;
    let csv = CsvAdapter::new(PathBuf::from(dir.trim()));

    match adapter
        .get_string(DATA_SECTION, "cache_dir")
        .filter(|d| !d.trim().is_empty())
    {
        Some(cache_dir) => {
            let store = FsBlobStore::new(PathBuf::from(cache_dir.trim()));
            Ok(Box::new(CachedPriceAdapter::new(csv, store)))
        }
        None => Ok(Box::new(csv)),
    }
}

pub fn run_dry_run(config_path: &PathBuf, asset_name: &str) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let asset: Asset = match asset_name.parse() {
        Ok(a) => a,
        Err(e) => return fail(e),
    };
    if let Err(e) = validate_engine_config(&adapter) {
        return fail(e);
    }
    if let Err(e) = validate_data_config(&adapter) {
        return fail(e);
    }
    let config = match build_engine_config(&adapter, asset.class()) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };
    eprintln!("Config validated successfully");

    eprintln!("\nAsset:");
    eprintln!("  {} ({}, {})", asset, asset.symbol(), asset.class());

    eprintln!("\nEngine:");
    eprintln!("  initial_cash:                 {}", config.initial_cash);
    eprintln!("  fee_rate:                     {}", config.fee_rate);
    eprintln!(
        "  stop_loss_threshold_percent:  {}",
        config.stop_loss_threshold_percent
    );
    eprintln!("  max_holding_days:             {}", config.max_holding_days);
    eprintln!("  reseed_amount:                {}", config.reseed_amount);
    eprintln!(
        "  reseed_interval_day_of_month: {}",
        config.reseed_interval_day_of_month
    );
    eprintln!(
        "  profit_threshold_percent:     {}",
        config.profit_threshold_percent
    );
    eprintln!("  warmup_samples:               {}", config.warmup_samples);

    eprintln!("\nDry run complete: configuration is valid");
    ExitCode::SUCCESS
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_engine_config(&adapter) {
        return fail(e);
    }
    if let Err(e) = validate_data_config(&adapter) {
        return fail(e);
    }

    eprintln!("Configuration is valid.");
    ExitCode::SUCCESS
}

fn run_assets() -> ExitCode {
    for asset in Asset::ALL {
        println!(
            "{:<10} {:<10} {:<7} take-profit {}%",
            asset.name(),
            asset.symbol(),
            asset.class(),
            asset.class().default_profit_threshold_percent()
        );
    }
    ExitCode::SUCCESS
}

fn run_symbols(dir: &PathBuf) -> ExitCode {
    let adapter = CsvAdapter::new(dir.clone());
    match adapter.list_symbols() {
        Ok(symbols) if symbols.is_empty() => {
            eprintln!("No symbols found in {}", dir.display());
            ExitCode::SUCCESS
        }
        Ok(symbols) => {
            for symbol in &symbols {
                println!("{}", symbol);
            }
            eprintln!("{} symbols found", symbols.len());
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}
