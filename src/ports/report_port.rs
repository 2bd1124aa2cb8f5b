//! Report generation port trait.

use crate::domain::error::DcaError;
use crate::domain::event::TradeEvent;
use crate::domain::summary::ReportSummary;

/// Port for writing the outcome of a run.
pub trait ReportPort {
    fn write(&self, summary: &ReportSummary, events: &[TradeEvent]) -> Result<(), DcaError>;
}
