//! Terminal figures of a run, as handed to report adapters.

use super::engine::BacktestResult;

#[derive(Debug, Clone, PartialEq)]
pub struct ReportSummary {
    pub label: String,
    pub initial_cash: f64,
    pub final_cash: f64,
    pub final_holding_units: f64,
    pub reseed_count: u32,
    pub reseed_amount: f64,
    pub total_reseeded: f64,
    pub net_profit: f64,
    pub trades: usize,
}

impl ReportSummary {
    pub fn from_result(label: impl Into<String>, result: &BacktestResult) -> Self {
        ReportSummary {
            label: label.into(),
            initial_cash: result.config.initial_cash,
            final_cash: result.position.cash,
            final_holding_units: result.position.holding_units(),
            reseed_count: result.position.reseed_count,
            reseed_amount: result.config.reseed_amount,
            total_reseeded: result.total_reseeded(),
            net_profit: result.net_profit(),
            trades: result.trade_count(),
        }
    }
}
