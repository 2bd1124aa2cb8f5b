//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod file_config_adapter;
pub mod blob_store_adapter;
pub mod cached_price_adapter;
pub mod console_report;
pub mod trade_log_csv;
