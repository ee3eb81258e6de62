//! Return-series strategy engine.
//!
//! Chains signal -> daily return -> cumulative return over one finalized
//! price series. Each stage is order-preserving and produces one value per
//! input bar.

use chrono::NaiveDate;
use log::debug;

use super::error::LookaheadError;
use super::price_bar::{validate_series, PriceBar};
use super::returns::{apply_signals, compute_cumulative_return, realizable_returns};
use super::signal::{check_minimum_bars, signals_from_raw, RuleKind, Signal, TimingOffset};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrategySpec {
    pub rule: RuleKind,
    pub timing: TimingOffset,
}

impl StrategySpec {
    pub fn new(rule: RuleKind, timing: TimingOffset) -> Self {
        Self { rule, timing }
    }

    /// Human-readable label for charts and summaries.
    pub fn label(&self) -> &'static str {
        match self.timing {
            TimingOffset::SameBar => "with lookahead bias",
            TimingOffset::PriorBar => "without lookahead bias",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DerivedRow {
    pub date: NaiveDate,
    pub raw: Option<f64>,
    pub signal: Option<Signal>,
    pub daily_return: Option<f64>,
    pub cumulative_return: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DerivedSeries {
    pub label: String,
    pub spec: StrategySpec,
    pub rows: Vec<DerivedRow>,
}

impl DerivedSeries {
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn cumulative_curve(&self) -> Vec<(NaiveDate, f64)> {
        self.rows
            .iter()
            .map(|r| (r.date, r.cumulative_return))
            .collect()
    }

    pub fn daily_returns(&self) -> Vec<Option<f64>> {
        self.rows.iter().map(|r| r.daily_return).collect()
    }

    /// Last cumulative value; 1.0 for an empty series.
    pub fn final_value(&self) -> f64 {
        self.rows.last().map(|r| r.cumulative_return).unwrap_or(1.0)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub struct ReturnSeriesStrategyEngine {
    spec: StrategySpec,
}

impl ReturnSeriesStrategyEngine {
    pub fn new(spec: StrategySpec) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> StrategySpec {
        self.spec
    }

    pub fn run(&self, bars: &[PriceBar]) -> Result<DerivedSeries, LookaheadError> {
        let StrategySpec { rule, timing } = self.spec;

        validate_series(bars)?;
        check_minimum_bars(bars, rule, timing)?;

        let raw = rule.raw_values(bars);
        let signals = signals_from_raw(&raw, timing);
        let daily = apply_signals(&signals, &realizable_returns(bars, rule, &raw));
        let cumulative = compute_cumulative_return(&daily)?;

        let rows: Vec<DerivedRow> = bars
            .iter()
            .enumerate()
            .map(|(i, bar)| DerivedRow {
                date: bar.date,
                raw: raw[i],
                signal: signals[i],
                daily_return: daily[i],
                cumulative_return: cumulative[i],
            })
            .collect();

        debug!(
            "{rule}/{timing}: {} bars, {} traded, final {:.4}",
            rows.len(),
            rows.iter().filter(|r| r.signal.is_some()).count(),
            cumulative[cumulative.len() - 1],
        );

        Ok(DerivedSeries {
            label: self.spec.label().to_string(),
            spec: self.spec,
            rows,
        })
    }
}
