//! Plain-text report writer.

use crate::domain::error::DcaError;
use crate::domain::event::TradeEvent;
use crate::domain::summary::ReportSummary;
use crate::ports::report_port::ReportPort;
use std::cell::RefCell;
use std::io::Write;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct ConsoleReportAdapter<W: Write> {
    out: RefCell<W>,
    show_trades: bool,
}

impl<W: Write> ConsoleReportAdapter<W> {
    pub fn new(out: W, show_trades: bool) -> Self {
        Self {
            out: RefCell::new(out),
            show_trades,
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

pub fn format_event(event: &TradeEvent) -> String {
    match event {
        TradeEvent::Buy {
            price,
            timestamp,
            units,
            remaining_cash,
            ..
        } => format!(
            "{}  BUY    {:.6} units @ {:.2}, cash left {:.2}",
            timestamp.format(TIMESTAMP_FORMAT),
            units,
            price,
            remaining_cash
        ),
        TradeEvent::Sell {
            price,
            timestamp,
            units_sold,
            total_cash,
            reason,
            ..
        } => format!(
            "{}  SELL   {:.6} units @ {:.2}, cash {:.2} ({})",
            timestamp.format(TIMESTAMP_FORMAT),
            units_sold,
            price,
            total_cash,
            reason
        ),
        TradeEvent::Reseed { timestamp, amount } => format!(
            "{}  RESEED +{:.2}",
            timestamp.format(TIMESTAMP_FORMAT),
            amount
        ),
    }
}

impl<W: Write> ReportPort for ConsoleReportAdapter<W> {
    fn write(&self, summary: &ReportSummary, events: &[TradeEvent]) -> Result<(), DcaError> {
        let mut out = self.out.borrow_mut();

        if self.show_trades && !events.is_empty() {
            writeln!(out, "=== Trades ===")?;
            for event in events {
                writeln!(out, "{}", format_event(event))?;
            }
            writeln!(out)?;
        }

        writeln!(out, "=== Results: {} ===", summary.label)?;
        writeln!(out, "Initial cash:     {:.2}", summary.initial_cash)?;
        writeln!(out, "Final cash:       {:.2}", summary.final_cash)?;
        writeln!(out, "Final holdings:   {:.6} units", summary.final_holding_units)?;
        writeln!(out, "Round trips:      {}", summary.trades)?;
        writeln!(
            out,
            "Reseeds:          {} x {:.2} = {:.2}",
            summary.reseed_count, summary.reseed_amount, summary.total_reseeded
        )?;
        writeln!(out, "Net profit:       {:.2}", summary.net_profit)?;
        out.flush()?;
        Ok(())
    }
}
