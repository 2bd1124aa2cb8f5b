//! Trade events emitted by the decision engine.

use chrono::NaiveDateTime;
use std::fmt;

/// Why a holding was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SellReason {
    TakeProfit,
    StopLoss,
    MaxHoldingPeriod,
    FinalLiquidation,
}

impl SellReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SellReason::TakeProfit => "take_profit",
            SellReason::StopLoss => "stop_loss",
            SellReason::MaxHoldingPeriod => "max_holding_period",
            SellReason::FinalLiquidation => "final_liquidation",
        }
    }
}

impl fmt::Display for SellReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TradeEvent {
    Buy {
        price: f64,
        timestamp: NaiveDateTime,
        units: f64,
        fee: f64,
        remaining_cash: f64,
    },
    Sell {
        price: f64,
        timestamp: NaiveDateTime,
        units_sold: f64,
        fee: f64,
        total_cash: f64,
        reason: SellReason,
    },
    Reseed {
        timestamp: NaiveDateTime,
        amount: f64,
    },
}

impl TradeEvent {
    pub fn timestamp(&self) -> NaiveDateTime {
        match self {
            TradeEvent::Buy { timestamp, .. }
            | TradeEvent::Sell { timestamp, .. }
            | TradeEvent::Reseed { timestamp, .. } => *timestamp,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            TradeEvent::Buy { .. } => "buy",
            TradeEvent::Sell { .. } => "sell",
            TradeEvent::Reseed { .. } => "reseed",
        }
    }

    pub fn is_buy(&self) -> bool {
        matches!(self, TradeEvent::Buy { .. })
    }

    pub fn is_sell(&self) -> bool {
        matches!(self, TradeEvent::Sell { .. })
    }

    pub fn is_reseed(&self) -> bool {
        matches!(self, TradeEvent::Reseed { .. })
    }

    pub fn sell_reason(&self) -> Option<SellReason> {
        match self {
            TradeEvent::Sell { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}
