//! Price series port trait.

use crate::domain::error::DcaError;
use crate::domain::price::PriceSample;
use chrono::NaiveDate;

/// Source of historical prices for one symbol.
///
/// Implementations return samples sorted ascending by timestamp, without
/// duplicate timestamps, with strictly positive prices, and with every
/// sample's calendar date inside `[start_date, end_date]`.
pub trait PricePort {
    fn fetch_prices(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceSample>, DcaError>;
}

impl<P: PricePort + ?Sized> PricePort for &P {
    fn fetch_prices(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceSample>, DcaError> {
        (**self).fetch_prices(symbol, start_date, end_date)
    }
}
