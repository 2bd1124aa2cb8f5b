//! Configuration validation.
//!
//! Checks the `[engine]` and `[data]` sections of a config file before a run
//! starts. Missing engine keys fall back to [`EngineConfig::default`]; keys
//! that are present must parse and be in range.

use crate::domain::engine::EngineConfig;
use crate::domain::error::DcaError;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub const ENGINE_SECTION: &str = "engine";
pub const DATA_SECTION: &str = "data";

pub fn validate_engine_config(config: &dyn ConfigPort) -> Result<(), DcaError> {
    validate_initial_cash(config)?;
    validate_fee_rate(config)?;
    validate_stop_loss(config)?;
    validate_max_holding_days(config)?;
    validate_reseed(config)?;
    validate_profit_threshold(config)?;
    validate_warmup(config)?;
    Ok(())
}

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), DcaError> {
    validate_dates(config)?;
    validate_data_dirs(config)?;
    Ok(())
}

/// Read a float, using `default` when absent and failing when unparsable.
pub fn read_double(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, DcaError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<f64>().map_err(|_| DcaError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: format!("expected a number, got {:?}", raw),
        }),
    }
}

/// Read an integer, using `default` when absent and failing when unparsable.
pub fn read_int(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<i64, DcaError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<i64>().map_err(|_| DcaError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: format!("expected an integer, got {:?}", raw),
        }),
    }
}

pub fn read_date(config: &dyn ConfigPort, section: &str, key: &str) -> Result<NaiveDate, DcaError> {
    let raw = config
        .get_string(section, key)
        .ok_or_else(|| DcaError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        })?;
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| DcaError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: format!("invalid {} format, expected YYYY-MM-DD", key),
    })
}

fn engine_invalid(key: &str, reason: &str) -> DcaError {
    DcaError::ConfigInvalid {
        section: ENGINE_SECTION.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn validate_initial_cash(config: &dyn ConfigPort) -> Result<(), DcaError> {
    let value = read_double(
        config,
        ENGINE_SECTION,
        "initial_cash",
        EngineConfig::default().initial_cash,
    )?;
    if !value.is_finite() || value <= 0.0 {
        return Err(engine_invalid("initial_cash", "initial_cash must be positive"));
    }
    Ok(())
}

fn validate_fee_rate(config: &dyn ConfigPort) -> Result<(), DcaError> {
    let value = read_double(
        config,
        ENGINE_SECTION,
        "fee_rate",
        EngineConfig::default().fee_rate,
    )?;
    if !value.is_finite() || !(0.0..1.0).contains(&value) {
        return Err(engine_invalid(
            "fee_rate",
            "fee_rate is a fraction between 0 and 1 (0.001 = 0.1%)",
        ));
    }
    Ok(())
}

fn validate_stop_loss(config: &dyn ConfigPort) -> Result<(), DcaError> {
    let value = read_double(
        config,
        ENGINE_SECTION,
        "stop_loss_threshold_percent",
        EngineConfig::default().stop_loss_threshold_percent,
    )?;
    if !value.is_finite() || value <= 0.0 {
        return Err(engine_invalid(
            "stop_loss_threshold_percent",
            "stop_loss_threshold_percent must be positive",
        ));
    }
    Ok(())
}

fn validate_max_holding_days(config: &dyn ConfigPort) -> Result<(), DcaError> {
    let value = read_int(
        config,
        ENGINE_SECTION,
        "max_holding_days",
        EngineConfig::default().max_holding_days,
    )?;
    if value < 1 {
        return Err(engine_invalid(
            "max_holding_days",
            "max_holding_days must be at least 1",
        ));
    }
    Ok(())
}

fn validate_reseed(config: &dyn ConfigPort) -> Result<(), DcaError> {
    let defaults = EngineConfig::default();
    let amount = read_double(config, ENGINE_SECTION, "reseed_amount", defaults.reseed_amount)?;
    if !amount.is_finite() || amount < 0.0 {
        return Err(engine_invalid(
            "reseed_amount",
            "reseed_amount must be non-negative",
        ));
    }
    let day = read_int(
        config,
        ENGINE_SECTION,
        "reseed_interval_day_of_month",
        defaults.reseed_interval_day_of_month as i64,
    )?;
    if !(1..=31).contains(&day) {
        return Err(engine_invalid(
            "reseed_interval_day_of_month",
            "reseed_interval_day_of_month must be between 1 and 31",
        ));
    }
    Ok(())
}

fn validate_profit_threshold(config: &dyn ConfigPort) -> Result<(), DcaError> {
    let value = read_double(config, ENGINE_SECTION, "profit_threshold_percent", 0.0)?;
    if !value.is_finite() {
        return Err(engine_invalid(
            "profit_threshold_percent",
            "profit_threshold_percent must be finite",
        ));
    }
    Ok(())
}

fn validate_warmup(config: &dyn ConfigPort) -> Result<(), DcaError> {
    let value = read_int(
        config,
        ENGINE_SECTION,
        "warmup_samples",
        EngineConfig::default().warmup_samples as i64,
    )?;
    if value < 0 {
        return Err(engine_invalid(
            "warmup_samples",
            "warmup_samples must be non-negative",
        ));
    }
    Ok(())
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), DcaError> {
    let start_date = read_date(config, DATA_SECTION, "start_date")?;
    let end_date = read_date(config, DATA_SECTION, "end_date")?;

    if start_date >= end_date {
        return Err(DcaError::ConfigInvalid {
            section: DATA_SECTION.to_string(),
            key: "start_date".to_string(),
            reason: "start_date must be before end_date".to_string(),
        });
    }
    Ok(())
}

fn validate_data_dirs(config: &dyn ConfigPort) -> Result<(), DcaError> {
    if config.has(DATA_SECTION, "crypto_dir") || config.has(DATA_SECTION, "stock_dir") {
        return Ok(());
    }
    Err(DcaError::ConfigMissing {
        section: DATA_SECTION.to_string(),
        key: "crypto_dir".to_string(),
    })
}
