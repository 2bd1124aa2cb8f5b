//! Decision engine and run driver.
//!
//! The engine is a FLAT/HOLDING state machine folded over an ordered price
//! series. Each processed sample first gets a reseed check, then either a buy
//! (when flat) or an exit check (when holding). A run always ends flat: the
//! driver liquidates any open holding at the last sample.

use chrono::{Datelike, NaiveDateTime};
use tracing::{debug, info, warn};

use super::error::DcaError;
use super::event::{SellReason, TradeEvent};
use super::position::{Position, PositionState};
use super::price::{sort_samples, PriceSample};

pub const DEFAULT_WARMUP_SAMPLES: usize = 30;
pub const DEFAULT_RESEED_DAY_OF_MONTH: u32 = 28;

/// Engine parameters.
///
/// `fee_rate` is a plain fraction: `0.001` means 0.1% per trade. All
/// `*_percent` fields are percentages: `75.0` means 75%.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub initial_cash: f64,
    pub fee_rate: f64,
    pub stop_loss_threshold_percent: f64,
    pub max_holding_days: i64,
    pub reseed_amount: f64,
    pub reseed_interval_day_of_month: u32,
    pub profit_threshold_percent: f64,
    pub warmup_samples: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            initial_cash: 1000.0,
            fee_rate: 0.001,
            stop_loss_threshold_percent: 75.0,
            max_holding_days: 30,
            reseed_amount: 300.0,
            reseed_interval_day_of_month: DEFAULT_RESEED_DAY_OF_MONTH,
            profit_threshold_percent: 1.0,
            warmup_samples: DEFAULT_WARMUP_SAMPLES,
        }
    }
}

fn invalid(field: &str, reason: &str) -> DcaError {
    DcaError::InvalidConfiguration {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), DcaError> {
        if !(self.initial_cash.is_finite() && self.initial_cash > 0.0) {
            return Err(invalid("initial_cash", "must be positive"));
        }
        if !(self.fee_rate.is_finite() && (0.0..1.0).contains(&self.fee_rate)) {
            return Err(invalid(
                "fee_rate",
                "must be a fraction in [0, 1), e.g. 0.001 for 0.1%",
            ));
        }
        if !(self.stop_loss_threshold_percent.is_finite() && self.stop_loss_threshold_percent > 0.0)
        {
            return Err(invalid("stop_loss_threshold_percent", "must be positive"));
        }
        if self.max_holding_days < 1 {
            return Err(invalid("max_holding_days", "must be at least 1"));
        }
        if !(self.reseed_amount.is_finite() && self.reseed_amount >= 0.0) {
            return Err(invalid("reseed_amount", "must be non-negative"));
        }
        if !(1..=31).contains(&self.reseed_interval_day_of_month) {
            return Err(invalid(
                "reseed_interval_day_of_month",
                "must be between 1 and 31",
            ));
        }
        if !self.profit_threshold_percent.is_finite() {
            return Err(invalid("profit_threshold_percent", "must be a finite number"));
        }
        Ok(())
    }

    /// True when a sample on this day of the month is due a reseed.
    ///
    /// An interval of 0 never matches; [`EngineConfig::validate`] rejects it.
    pub fn is_reseed_day(&self, timestamp: NaiveDateTime) -> bool {
        timestamp.day().checked_rem(self.reseed_interval_day_of_month) == Some(0)
    }

    /// Price gain since entry minus a round-trip fee allowance, in percent.
    pub fn net_increase_percent(&self, entry_price: f64, price: f64) -> f64 {
        let price_increase_percent = (price - entry_price) / entry_price * 100.0;
        price_increase_percent - self.fee_rate * 100.0 * 2.0
    }

    /// Stop rule: stop-loss first, then max holding period.
    pub fn stop_signal(
        &self,
        entry_price: f64,
        entry_timestamp: NaiveDateTime,
        price: f64,
        timestamp: NaiveDateTime,
    ) -> Option<SellReason> {
        let price_decrease_percent = (entry_price - price) / entry_price * 100.0;
        if price_decrease_percent >= self.stop_loss_threshold_percent {
            info!(
                decrease = price_decrease_percent,
                %timestamp,
                "stop-loss triggered"
            );
            return Some(SellReason::StopLoss);
        }

        let held_days = (timestamp - entry_timestamp).num_days();
        if held_days >= self.max_holding_days {
            info!(
                held_days,
                max = self.max_holding_days,
                %timestamp,
                "max holding period reached"
            );
            return Some(SellReason::MaxHoldingPeriod);
        }

        None
    }

    /// Full exit decision for a holding: take-profit wins over the stop rule.
    pub fn exit_signal(
        &self,
        entry_price: f64,
        entry_timestamp: NaiveDateTime,
        sample: &PriceSample,
    ) -> Option<SellReason> {
        if self.net_increase_percent(entry_price, sample.price) >= self.profit_threshold_percent {
            return Some(SellReason::TakeProfit);
        }
        self.stop_signal(entry_price, entry_timestamp, sample.price, sample.timestamp)
    }
}

/// Incremental engine over post-warm-up samples.
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
    position: Position,
    events: Vec<TradeEvent>,
    last_timestamp: Option<NaiveDateTime>,
    samples_processed: usize,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self, DcaError> {
        config.validate()?;
        let position = Position::new(config.initial_cash);
        Ok(Engine {
            config,
            position,
            events: Vec::new(),
            last_timestamp: None,
            samples_processed: 0,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn events(&self) -> &[TradeEvent] {
        &self.events
    }

    pub fn samples_processed(&self) -> usize {
        self.samples_processed
    }

    /// Process one sample. Timestamps must be non-decreasing across calls.
    pub fn step(&mut self, sample: &PriceSample) -> Result<(), DcaError> {
        if let Some(previous) = self.last_timestamp {
            if sample.timestamp < previous {
                return Err(DcaError::OutOfOrderSample {
                    previous,
                    current: sample.timestamp,
                });
            }
        }
        self.last_timestamp = Some(sample.timestamp);

        self.apply_reseed_rule(sample.timestamp);

        match self.position.state {
            PositionState::Flat if self.position.cash <= 0.0 => {
                warn!(
                    cash = self.position.cash,
                    timestamp = %sample.timestamp,
                    "cash exhausted, staying flat until the next reseed"
                );
            }
            PositionState::Flat => {
                let event = self
                    .position
                    .buy(sample.price, sample.timestamp, self.config.fee_rate)?;
                debug!(?event, "bought");
                self.events.push(event);
            }
            PositionState::Holding {
                entry_price,
                entry_timestamp,
                ..
            } => {
                if let Some(reason) = self.config.exit_signal(entry_price, entry_timestamp, sample)
                {
                    self.sell(sample, reason)?;
                }
            }
        }

        self.samples_processed += 1;
        Ok(())
    }

    /// Liquidate any open holding at `last`. No-op when already flat.
    pub fn finish(&mut self, last: &PriceSample) -> Result<(), DcaError> {
        if !self.position.is_flat() {
            self.sell(last, SellReason::FinalLiquidation)?;
        }
        Ok(())
    }

    pub fn into_result(self, samples_total: usize) -> BacktestResult {
        BacktestResult {
            config: self.config,
            position: self.position,
            events: self.events,
            samples_total,
            samples_processed: self.samples_processed,
        }
    }

    fn apply_reseed_rule(&mut self, timestamp: NaiveDateTime) {
        if !self.config.is_reseed_day(timestamp) || self.position.reseeded_on(timestamp.date()) {
            return;
        }
        let event = self
            .position
            .apply_reseed(timestamp, self.config.reseed_amount);
        debug!(?event, count = self.position.reseed_count, "reseeded");
        self.events.push(event);
    }

    fn sell(&mut self, sample: &PriceSample, reason: SellReason) -> Result<(), DcaError> {
        let event =
            self.position
                .sell(sample.price, sample.timestamp, self.config.fee_rate, reason)?;
        debug!(?event, "sold");
        self.events.push(event);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub config: EngineConfig,
    pub position: Position,
    pub events: Vec<TradeEvent>,
    pub samples_total: usize,
    pub samples_processed: usize,
}

impl BacktestResult {
    pub fn net_profit(&self) -> f64 {
        self.position
            .net_profit(self.config.initial_cash, self.config.reseed_amount)
    }

    pub fn total_reseeded(&self) -> f64 {
        self.position.total_reseeded(self.config.reseed_amount)
    }

    pub fn buy_count(&self) -> usize {
        self.events.iter().filter(|e| e.is_buy()).count()
    }

    pub fn sell_count(&self) -> usize {
        self.events.iter().filter(|e| e.is_sell()).count()
    }

    /// Completed round trips.
    pub fn trade_count(&self) -> usize {
        self.sell_count()
    }

    pub fn sells_by_reason(&self, reason: SellReason) -> usize {
        self.events
            .iter()
            .filter(|e| e.sell_reason() == Some(reason))
            .count()
    }
}

/// Run a full simulation over `samples`.
///
/// Samples are sorted by timestamp first. The first `warmup_samples` are
/// skipped entirely. A series with no samples past the warm-up window yields
/// the untouched initial position and no events.
pub fn run_backtest(
    samples: &[PriceSample],
    config: &EngineConfig,
) -> Result<BacktestResult, DcaError> {
    let mut engine = Engine::new(config.clone())?;

    let mut sorted = samples.to_vec();
    sort_samples(&mut sorted);

    if sorted.len() <= config.warmup_samples {
        warn!(
            samples = sorted.len(),
            warmup = config.warmup_samples,
            "series too short to trade after warm-up"
        );
        return Ok(engine.into_result(sorted.len()));
    }

    for sample in &sorted[config.warmup_samples..] {
        engine.step(sample)?;
    }
    if let Some(last) = sorted.last() {
        engine.finish(last)?;
    }

    Ok(engine.into_result(sorted.len()))
}
