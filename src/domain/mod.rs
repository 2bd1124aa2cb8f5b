//! Core domain types and logic.

pub mod price;
pub mod position;
pub mod event;
pub mod engine;
pub mod asset;
pub mod summary;
pub mod config_validation;
pub mod error;
