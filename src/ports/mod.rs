//! Port traits implemented by [`crate::adapters`].

pub mod config_port;
pub mod price_port;
pub mod blob_store;
pub mod report_port;
