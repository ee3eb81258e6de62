//! Configuration validation.
//!
//! Validates all config fields before any price data is fetched.

use crate::domain::error::LookaheadError;
use crate::domain::preset::Preset;
use crate::domain::signal::{RuleKind, TimingOffset};
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;
use std::path::Path;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), LookaheadError> {
    validate_required(config, "data", "dir")?;
    validate_required(config, "data", "symbol")?;
    validate_dates(config)?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), LookaheadError> {
    validate_strategy_choice(config)?;
    validate_risk_free_rate(config)?;
    validate_output(config)?;
    Ok(())
}

fn validate_required(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), LookaheadError> {
    match config.get_string(section, key) {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(LookaheadError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }),
    }
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), LookaheadError> {
    let start_str = config.get_string("data", "start_date");
    let end_str = config.get_string("data", "end_date");

    let start_date = parse_date(start_str.as_deref(), "start_date")?;
    let end_date = parse_date(end_str.as_deref(), "end_date")?;

    if start_date >= end_date {
        return Err(LookaheadError::config_invalid(
            "data",
            "start_date",
            "start_date must be before end_date",
        ));
    }
    Ok(())
}

pub fn parse_date(value: Option<&str>, field: &str) -> Result<NaiveDate, LookaheadError> {
    match value {
        None => Err(LookaheadError::ConfigMissing {
            section: "data".to_string(),
            key: field.to_string(),
        }),
        Some(s) => NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).map_err(|_| {
            LookaheadError::config_invalid(
                "data",
                field,
                format!("invalid {} format, expected YYYY-MM-DD", field),
            )
        }),
    }
}

fn validate_strategy_choice(config: &dyn ConfigPort) -> Result<(), LookaheadError> {
    if let Some(preset) = non_empty(config.get_string("strategy", "preset")) {
        preset
            .parse::<Preset>()
            .map_err(|reason| LookaheadError::config_invalid("strategy", "preset", reason))?;
        return Ok(());
    }

    let rule = non_empty(config.get_string("strategy", "rule")).ok_or_else(|| {
        LookaheadError::ConfigMissing {
            section: "strategy".to_string(),
            key: "preset".to_string(),
        }
    })?;
    rule.parse::<RuleKind>()
        .map_err(|reason| LookaheadError::config_invalid("strategy", "rule", reason))?;

    let timing = non_empty(config.get_string("strategy", "timing")).ok_or_else(|| {
        LookaheadError::ConfigMissing {
            section: "strategy".to_string(),
            key: "timing".to_string(),
        }
    })?;
    timing
        .parse::<TimingOffset>()
        .map_err(|reason| LookaheadError::config_invalid("strategy", "timing", reason))?;

    Ok(())
}

fn validate_risk_free_rate(config: &dyn ConfigPort) -> Result<(), LookaheadError> {
    let value = config.get_double("metrics", "risk_free_rate", 0.0);
    if !(0.0..1.0).contains(&value) {
        return Err(LookaheadError::config_invalid(
            "metrics",
            "risk_free_rate",
            "risk_free_rate must be between 0 and 1",
        ));
    }
    Ok(())
}

fn validate_output(config: &dyn ConfigPort) -> Result<(), LookaheadError> {
    match non_empty(config.get_string("report", "output")) {
        None => Ok(()),
        Some(path) => validate_output_path(Path::new(&path)),
    }
}

/// Report paths must name a format a writer exists for.
pub fn validate_output_path(path: &Path) -> Result<(), LookaheadError> {
    let supported = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg") || ext.eq_ignore_ascii_case("csv"));
    if supported {
        Ok(())
    } else {
        Err(LookaheadError::config_invalid(
            "report",
            "output",
            "output must end in .svg or .csv",
        ))
    }
}

pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
