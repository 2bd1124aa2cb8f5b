//! CSV file price adapter.
//!
//! Each symbol lives in `<base_path>/<SYMBOL>.csv` with a `timestamp,price`
//! header. Timestamps are `YYYY-MM-DD` or `YYYY-MM-DD HH:MM:SS`.

use crate::domain::error::DcaError;
use crate::domain::price::PriceSample;
use crate::ports::price_port::PricePort;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol.to_uppercase()))
    }

    pub fn list_symbols(&self) -> Result<Vec<String>, DcaError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| DcaError::PriceData {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| DcaError::PriceData {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(symbol) = name_str.strip_suffix(".csv") {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}

pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, DcaError> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d").map(|d| d.and_time(chrono::NaiveTime::MIN))
        })
        .map_err(|e| DcaError::PriceData {
            reason: format!("invalid timestamp {:?}: {}", raw, e),
        })
}

/// Parse `timestamp,price` CSV text into samples sorted by timestamp.
///
/// Rows whose calendar date falls outside `range` are dropped; a repeated
/// timestamp keeps the last row seen.
pub fn parse_price_csv(
    content: &[u8],
    range: Option<(NaiveDate, NaiveDate)>,
) -> Result<Vec<PriceSample>, DcaError> {
    let mut rdr = csv::Reader::from_reader(content);
    let mut by_timestamp: BTreeMap<NaiveDateTime, f64> = BTreeMap::new();

    for result in rdr.records() {
        let record = result.map_err(|e| DcaError::PriceData {
            reason: format!("CSV parse error: {}", e),
        })?;

        let ts_str = record.get(0).ok_or_else(|| DcaError::PriceData {
            reason: "missing timestamp column".into(),
        })?;
        let timestamp = parse_timestamp(ts_str)?;

        if let Some((start, end)) = range {
            let date = timestamp.date();
            if date < start || date > end {
                continue;
            }
        }

        let price: f64 = record
            .get(1)
            .ok_or_else(|| DcaError::PriceData {
                reason: "missing price column".into(),
            })?
            .trim()
            .parse()
            .map_err(|e| DcaError::PriceData {
                reason: format!("invalid price value: {}", e),
            })?;

        if !(price.is_finite() && price > 0.0) {
            return Err(DcaError::PriceData {
                reason: format!("non-positive price {} at {}", price, timestamp),
            });
        }

        by_timestamp.insert(timestamp, price);
    }

    Ok(by_timestamp
        .into_iter()
        .map(|(timestamp, price)| PriceSample::new(timestamp, price))
        .collect())
}

impl PricePort for CsvAdapter {
    fn fetch_prices(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceSample>, DcaError> {
        let path = self.csv_path(symbol);
        let content = fs::read(&path).map_err(|e| DcaError::PriceData {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        parse_price_csv(&content, Some((start_date, end_date)))
    }
}
