#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use dcatrader::domain::engine::EngineConfig;
use dcatrader::domain::error::DcaError;
use dcatrader::domain::event::TradeEvent;
pub use dcatrader::domain::price::PriceSample;
use dcatrader::domain::summary::ReportSummary;
use dcatrader::ports::price_port::PricePort;
use dcatrader::ports::report_port::ReportPort;
use std::cell::RefCell;
use std::collections::HashMap;

pub struct MockPricePort {
    pub data: HashMap<String, Vec<PriceSample>>,
    pub errors: HashMap<String, String>,
}

impl MockPricePort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_samples(mut self, symbol: &str, samples: Vec<PriceSample>) -> Self {
        self.data.insert(symbol.to_string(), samples);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl PricePort for MockPricePort {
    fn fetch_prices(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceSample>, DcaError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(DcaError::PriceData {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(symbol)
            .map(|samples| {
                samples
                    .iter()
                    .filter(|s| s.date() >= start_date && s.date() <= end_date)
                    .copied()
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// Captures what a report adapter would have received.
#[derive(Default)]
pub struct RecordingReport {
    pub summaries: RefCell<Vec<ReportSummary>>,
    pub event_counts: RefCell<Vec<usize>>,
}

impl ReportPort for RecordingReport {
    fn write(&self, summary: &ReportSummary, events: &[TradeEvent]) -> Result<(), DcaError> {
        self.summaries.borrow_mut().push(summary.clone());
        self.event_counts.borrow_mut().push(events.len());
        Ok(())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(h, 0, 0).unwrap()
}

pub fn make_sample(day: &str, price: f64) -> PriceSample {
    PriceSample::daily(NaiveDate::parse_from_str(day, "%Y-%m-%d").unwrap(), price)
}

/// `count` consecutive daily samples at a constant price.
pub fn flat_series(start: &str, count: usize, price: f64) -> Vec<PriceSample> {
    let start = NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap();
    (0..count)
        .map(|i| PriceSample::daily(start + chrono::Duration::days(i as i64), price))
        .collect()
}

pub fn reference_config() -> EngineConfig {
    EngineConfig {
        initial_cash: 1000.0,
        fee_rate: 0.001,
        stop_loss_threshold_percent: 75.0,
        max_holding_days: 30,
        reseed_amount: 300.0,
        reseed_interval_day_of_month: 28,
        profit_threshold_percent: 1.0,
        warmup_samples: 30,
    }
}

pub fn no_warmup_config() -> EngineConfig {
    EngineConfig {
        warmup_samples: 0,
        ..reference_config()
    }
}
