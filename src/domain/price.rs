//! Price sample representation.

use chrono::{NaiveDate, NaiveDateTime};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceSample {
    pub timestamp: NaiveDateTime,
    pub price: f64,
}

impl PriceSample {
    pub fn new(timestamp: NaiveDateTime, price: f64) -> Self {
        PriceSample { timestamp, price }
    }

    /// Sample at midnight of the given calendar day.
    pub fn daily(date: NaiveDate, price: f64) -> Self {
        PriceSample {
            timestamp: date.and_time(chrono::NaiveTime::MIN),
            price,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

/// Stable ascending sort by timestamp; equal timestamps keep their input order.
pub fn sort_samples(samples: &mut [PriceSample]) {
    samples.sort_by_key(|s| s.timestamp);
}
