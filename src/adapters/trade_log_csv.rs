//! CSV export of the trade event log.

use crate::domain::error::DcaError;
use crate::domain::event::TradeEvent;
use crate::domain::summary::ReportSummary;
use crate::ports::report_port::ReportPort;
use std::path::PathBuf;

const HEADER: [&str; 8] = [
    "kind", "timestamp", "price", "units", "fee", "cash", "amount", "reason",
];

pub struct CsvTradeLogAdapter {
    path: PathBuf,
}

impl CsvTradeLogAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

fn event_record(event: &TradeEvent) -> [String; 8] {
    let ts = |t: &chrono::NaiveDateTime| t.format("%Y-%m-%d %H:%M:%S").to_string();
    match event {
        TradeEvent::Buy {
            price,
            timestamp,
            units,
            fee,
            remaining_cash,
        } => [
            event.kind().to_string(),
            ts(timestamp),
            price.to_string(),
            units.to_string(),
            fee.to_string(),
            remaining_cash.to_string(),
            String::new(),
            String::new(),
        ],
        TradeEvent::Sell {
            price,
            timestamp,
            units_sold,
            fee,
            total_cash,
            reason,
        } => [
            event.kind().to_string(),
            ts(timestamp),
            price.to_string(),
            units_sold.to_string(),
            fee.to_string(),
            total_cash.to_string(),
            String::new(),
            reason.to_string(),
        ],
        TradeEvent::Reseed { timestamp, amount } => [
            event.kind().to_string(),
            ts(timestamp),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            amount.to_string(),
            String::new(),
        ],
    }
}

impl ReportPort for CsvTradeLogAdapter {
    fn write(&self, _summary: &ReportSummary, events: &[TradeEvent]) -> Result<(), DcaError> {
        let to_err = |e: csv::Error| DcaError::Io(std::io::Error::other(e));
        let mut wtr = csv::Writer::from_path(&self.path).map_err(to_err)?;
        wtr.write_record(HEADER).map_err(to_err)?;
        for event in events {
            wtr.write_record(event_record(event)).map_err(to_err)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event::SellReason;
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::TempDir;

    fn summary() -> ReportSummary {
        ReportSummary {
            label: "nvda".into(),
            initial_cash: 1000.0,
            final_cash: 998.0,
            final_holding_units: 0.0,
            reseed_count: 0,
            reseed_amount: 300.0,
            total_reseeded: 0.0,
            net_profit: -2.0,
            trades: 1,
        }
    }

    #[test]
    fn writes_one_row_per_event() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trades.csv");
        let ts = NaiveDate::from_ymd_opt(2024, 1, 31)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let events = vec![
            TradeEvent::Buy {
                price: 100.0,
                timestamp: ts,
                units: 10.0,
                fee: 1.0,
                remaining_cash: -1.0,
            },
            TradeEvent::Sell {
                price: 100.0,
                timestamp: ts,
                units_sold: 10.0,
                fee: 1.0,
                total_cash: 998.0,
                reason: SellReason::FinalLiquidation,
            },
        ];

        CsvTradeLogAdapter::new(path.clone())
            .write(&summary(), &events)
            .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "kind,timestamp,price,units,fee,cash,amount,reason");
        assert_eq!(lines[1], "buy,2024-01-31 00:00:00,100,10,1,-1,,");
        assert_eq!(
            lines[2],
            "sell,2024-01-31 00:00:00,100,10,1,998,,final_liquidation"
        );
    }

    #[test]
    fn unwritable_path_errors() {
        let adapter = CsvTradeLogAdapter::new(PathBuf::from("/nonexistent/dir/trades.csv"));
        assert!(adapter.write(&summary(), &[]).is_err());
    }
}
