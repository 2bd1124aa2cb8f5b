//! Caching decorator for any [`PricePort`].

use crate::adapters::csv_adapter::parse_price_csv;
use crate::domain::error::DcaError;
use crate::domain::price::PriceSample;
use crate::ports::blob_store::BlobStore;
use crate::ports::price_port::PricePort;
use chrono::NaiveDate;
use tracing::debug;

/// Serves a series from `store` when present, otherwise fetches it from
/// `inner` and stores it as `timestamp,price` CSV.
pub struct CachedPriceAdapter<P, S> {
    inner: P,
    store: S,
}

impl<P: PricePort, S: BlobStore> CachedPriceAdapter<P, S> {
    pub fn new(inner: P, store: S) -> Self {
        Self { inner, store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// `<SYMBOL>_<start>_<end>.csv`. ASCII alphanumerics pass through
    /// uppercased; every other byte becomes `_XX` hex, so distinct symbols
    /// never share a key.
    pub fn cache_key(symbol: &str, start_date: NaiveDate, end_date: NaiveDate) -> String {
        let mut safe = String::new();
        for b in symbol.to_uppercase().bytes() {
            if b.is_ascii_alphanumeric() {
                safe.push(char::from(b));
            } else {
                safe.push_str(&format!("_{:02X}", b));
            }
        }
        format!("{}_{}_{}.csv", safe, start_date, end_date)
    }
}

fn encode(samples: &[PriceSample]) -> Result<Vec<u8>, DcaError> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    let to_err = |e: csv::Error| DcaError::PriceData {
        reason: format!("CSV write error: {}", e),
    };
    wtr.write_record(["timestamp", "price"]).map_err(to_err)?;
    for s in samples {
        wtr.write_record([
            s.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            s.price.to_string(),
        ])
        .map_err(to_err)?;
    }
    wtr.into_inner().map_err(|e| DcaError::PriceData {
        reason: format!("CSV flush error: {}", e),
    })
}

impl<P: PricePort, S: BlobStore> PricePort for CachedPriceAdapter<P, S> {
    fn fetch_prices(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceSample>, DcaError> {
        let key = Self::cache_key(symbol, start_date, end_date);

        if let Some(bytes) = self.store.get(&key)? {
            debug!(%key, "price cache hit");
            return parse_price_csv(&bytes, None);
        }

        debug!(%key, "price cache miss");
        let samples = self.inner.fetch_prices(symbol, start_date, end_date)?;
        if !samples.is_empty() {
            self.store.put(&key, &encode(&samples)?)?;
        }
        Ok(samples)
    }
}
