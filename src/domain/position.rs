//! Position and cash ledger for a single-asset run.

use chrono::{NaiveDate, NaiveDateTime};
use std::collections::BTreeSet;

use super::error::DcaError;
use super::event::{SellReason, TradeEvent};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PositionState {
    Flat,
    Holding {
        units: f64,
        entry_price: f64,
        entry_timestamp: NaiveDateTime,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub cash: f64,
    pub state: PositionState,
    pub reseed_count: u32,
    pub reseed_seen_dates: BTreeSet<NaiveDate>,
}

impl Position {
    pub fn new(initial_cash: f64) -> Self {
        Position {
            cash: initial_cash,
            state: PositionState::Flat,
            reseed_count: 0,
            reseed_seen_dates: BTreeSet::new(),
        }
    }

    pub fn is_flat(&self) -> bool {
        matches!(self.state, PositionState::Flat)
    }

    pub fn holding_units(&self) -> f64 {
        match self.state {
            PositionState::Flat => 0.0,
            PositionState::Holding { units, .. } => units,
        }
    }

    /// Zero while flat.
    pub fn entry_price(&self) -> f64 {
        match self.state {
            PositionState::Flat => 0.0,
            PositionState::Holding { entry_price, .. } => entry_price,
        }
    }

    pub fn entry_timestamp(&self) -> Option<NaiveDateTime> {
        match self.state {
            PositionState::Flat => None,
            PositionState::Holding {
                entry_timestamp, ..
            } => Some(entry_timestamp),
        }
    }

    /// Spend the whole cash balance at `price`.
    ///
    /// The fee is charged on top of the notional, so with a non-zero
    /// `fee_rate` the balance ends slightly below zero.
    pub fn buy(
        &mut self,
        price: f64,
        timestamp: NaiveDateTime,
        fee_rate: f64,
    ) -> Result<TradeEvent, DcaError> {
        if !self.is_flat() {
            return Err(DcaError::PreconditionViolation {
                operation: "buy",
                reason: format!("already holding {} units", self.holding_units()),
            });
        }
        if self.cash.is_nan() || self.cash <= 0.0 {
            return Err(DcaError::PreconditionViolation {
                operation: "buy",
                reason: format!("cash balance {} is not positive", self.cash),
            });
        }

        let units = self.cash / price;
        let fee = self.cash * fee_rate;
        self.state = PositionState::Holding {
            units,
            entry_price: price,
            entry_timestamp: timestamp,
        };
        self.cash -= price * units + fee;

        Ok(TradeEvent::Buy {
            price,
            timestamp,
            units,
            fee,
            remaining_cash: self.cash,
        })
    }

    /// Close the whole holding at `price`.
    pub fn sell(
        &mut self,
        price: f64,
        timestamp: NaiveDateTime,
        fee_rate: f64,
        reason: SellReason,
    ) -> Result<TradeEvent, DcaError> {
        let units = match self.state {
            PositionState::Flat => {
                return Err(DcaError::PreconditionViolation {
                    operation: "sell",
                    reason: "no open position".to_string(),
                });
            }
            PositionState::Holding { units, .. } => units,
        };

        let revenue = price * units;
        let fee = revenue * fee_rate;
        self.cash += revenue - fee;
        self.state = PositionState::Flat;

        Ok(TradeEvent::Sell {
            price,
            timestamp,
            units_sold: units,
            fee,
            total_cash: self.cash,
            reason,
        })
    }

    /// Credit a cash injection. Whether one is due is the engine's call.
    pub fn apply_reseed(&mut self, timestamp: NaiveDateTime, amount: f64) -> TradeEvent {
        self.cash += amount;
        self.reseed_count += 1;
        self.reseed_seen_dates.insert(timestamp.date());
        TradeEvent::Reseed { timestamp, amount }
    }

    pub fn reseeded_on(&self, date: NaiveDate) -> bool {
        self.reseed_seen_dates.contains(&date)
    }

    pub fn total_reseeded(&self, reseed_amount: f64) -> f64 {
        self.reseed_count as f64 * reseed_amount
    }

    /// Realized profit net of injected capital; ignores any open holding.
    pub fn net_profit(&self, initial_cash: f64, reseed_amount: f64) -> f64 {
        self.cash - initial_cash - self.total_reseeded(reseed_amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ts(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn new_position_is_flat() {
        let pos = Position::new(1000.0);
        assert!(pos.is_flat());
        assert_eq!(pos.holding_units(), 0.0);
        assert_eq!(pos.entry_price(), 0.0);
        assert_eq!(pos.entry_timestamp(), None);
        assert_eq!(pos.reseed_count, 0);
        assert!(pos.reseed_seen_dates.is_empty());
    }

    #[test]
    fn buy_spends_cash_plus_fee() {
        let mut pos = Position::new(1000.0);
        let event = pos.buy(100.0, ts(1), 0.001).unwrap();

        assert_relative_eq!(pos.holding_units(), 10.0);
        assert_eq!(pos.entry_price(), 100.0);
        assert_eq!(pos.entry_timestamp(), Some(ts(1)));
        assert_relative_eq!(pos.cash, -1.0, epsilon = 1e-9);

        match event {
            TradeEvent::Buy {
                units,
                fee,
                remaining_cash,
                ..
            } => {
                assert_relative_eq!(units, 10.0);
                assert_relative_eq!(fee, 1.0);
                assert_relative_eq!(remaining_cash, -1.0, epsilon = 1e-9);
            }
            other => panic!("expected buy, got {other:?}"),
        }
    }

    #[test]
    fn buy_without_fee_leaves_zero_cash() {
        let mut pos = Position::new(500.0);
        pos.buy(25.0, ts(1), 0.0).unwrap();
        assert_relative_eq!(pos.cash, 0.0, epsilon = 1e-9);
        assert_relative_eq!(pos.holding_units(), 20.0);
    }

    #[test]
    fn buy_while_holding_is_rejected() {
        let mut pos = Position::new(1000.0);
        pos.buy(100.0, ts(1), 0.0).unwrap();
        let err = pos.buy(90.0, ts(2), 0.0).unwrap_err();
        assert!(matches!(
            err,
            DcaError::PreconditionViolation { operation: "buy", .. }
        ));
        assert_eq!(pos.entry_price(), 100.0);
    }

    #[test]
    fn buy_with_overdrawn_cash_is_rejected() {
        let mut pos = Position::new(1000.0);
        pos.buy(1000.0, ts(1), 0.01).unwrap();
        pos.sell(1.0, ts(2), 0.01, SellReason::StopLoss).unwrap();
        assert_relative_eq!(pos.cash, -9.01, epsilon = 1e-9);

        let err = pos.buy(1.0, ts(3), 0.01).unwrap_err();
        assert!(matches!(
            err,
            DcaError::PreconditionViolation { operation: "buy", .. }
        ));
        assert!(pos.is_flat());
    }

    #[test]
    fn buy_with_zero_cash_is_rejected() {
        let mut pos = Position::new(0.0);
        assert!(pos.buy(10.0, ts(1), 0.0).is_err());
        assert_eq!(pos.holding_units(), 0.0);
    }

    #[test]
    fn sell_credits_revenue_net_of_fee() {
        let mut pos = Position::new(1000.0);
        pos.buy(100.0, ts(1), 0.001).unwrap();
        let event = pos
            .sell(110.0, ts(5), 0.001, SellReason::TakeProfit)
            .unwrap();

        // -1 + 1100 - 1.1
        assert_relative_eq!(pos.cash, 1097.9, epsilon = 1e-9);
        assert!(pos.is_flat());
        assert_eq!(pos.entry_timestamp(), None);
        assert_eq!(pos.entry_price(), 0.0);
        assert_eq!(event.sell_reason(), Some(SellReason::TakeProfit));
        match event {
            TradeEvent::Sell {
                units_sold, fee, ..
            } => {
                assert_relative_eq!(units_sold, 10.0);
                assert_relative_eq!(fee, 1.1, epsilon = 1e-9);
            }
            other => panic!("expected sell, got {other:?}"),
        }
    }

    #[test]
    fn sell_while_flat_is_rejected() {
        let mut pos = Position::new(1000.0);
        let err = pos
            .sell(100.0, ts(1), 0.001, SellReason::FinalLiquidation)
            .unwrap_err();
        assert!(matches!(
            err,
            DcaError::PreconditionViolation { operation: "sell", .. }
        ));
        assert_eq!(pos.cash, 1000.0);
    }

    #[test]
    fn reseed_credits_cash_and_records_date() {
        let mut pos = Position::new(1000.0);
        let event = pos.apply_reseed(ts(28), 300.0);
        assert_eq!(pos.cash, 1300.0);
        assert_eq!(pos.reseed_count, 1);
        assert!(pos.reseeded_on(ts(28).date()));
        assert!(!pos.reseeded_on(ts(27).date()));
        assert_eq!(
            event,
            TradeEvent::Reseed {
                timestamp: ts(28),
                amount: 300.0
            }
        );
    }

    #[test]
    fn net_profit_excludes_reseeded_capital() {
        let mut pos = Position::new(1000.0);
        pos.apply_reseed(ts(28), 300.0);
        pos.cash += 50.0;
        assert_relative_eq!(pos.total_reseeded(300.0), 300.0);
        assert_relative_eq!(pos.net_profit(1000.0, 300.0), 50.0);
    }

    #[test]
    fn round_trip_at_same_price_loses_two_fees() {
        let mut pos = Position::new(1000.0);
        pos.buy(100.0, ts(1), 0.001).unwrap();
        pos.sell(100.0, ts(1), 0.001, SellReason::FinalLiquidation)
            .unwrap();
        assert_relative_eq!(pos.net_profit(1000.0, 0.0), -2.0, epsilon = 1e-9);
    }
}
