//! Core domain types and logic.

pub mod price_bar;
pub mod signal;
pub mod returns;
pub mod engine;
pub mod preset;
pub mod metrics;
pub mod config_validation;
pub mod error;
