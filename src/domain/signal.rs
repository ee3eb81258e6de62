//! Signal rules and timing policies.
//!
//! A rule turns each bar into a raw signal input; the timing policy decides
//! which row's raw value the signal for bar `t` may read:
//!
//! - `SameBar` reads `raw[t]`. For both rules that value is only final after
//!   the decision point, so this is the lookahead-biased formulation.
//! - `PriorBar` reads `raw[t - 1]`, which is finalized before bar `t` opens.
//!   The first row has no prior value and carries no signal.

use std::fmt;
use std::str::FromStr;

use super::error::LookaheadError;
use super::price_bar::{validate_series, PriceBar};

/// Directional trading decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Long,
    Short,
}

impl Signal {
    /// `raw > 0` goes long; zero and negative values go short.
    pub fn from_raw(raw: f64) -> Self {
        if raw > 0.0 { Signal::Long } else { Signal::Short }
    }

    /// +1.0 for long, -1.0 for short.
    pub fn direction(self) -> f64 {
        match self {
            Signal::Long => 1.0,
            Signal::Short => -1.0,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Long => write!(f, "1"),
            Signal::Short => write!(f, "-1"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    /// Sign of the close-to-close return from `t` to `t + 1`.
    NextReturnSign,
    /// Sign of `close[t] - open[t]`.
    CloseMinusOpenSign,
}

impl RuleKind {
    pub fn name(self) -> &'static str {
        match self {
            RuleKind::NextReturnSign => "next_return",
            RuleKind::CloseMinusOpenSign => "close_minus_open",
        }
    }

    /// Raw signal input per row, `None` where the row has no value.
    pub fn raw_values(self, bars: &[PriceBar]) -> Vec<Option<f64>> {
        match self {
            RuleKind::NextReturnSign => shift(&pct_change(bars), -1),
            RuleKind::CloseMinusOpenSign => {
                bars.iter().map(|b| Some(b.close_minus_open())).collect()
            }
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RuleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "next_return" | "next_return_sign" => Ok(RuleKind::NextReturnSign),
            "close_minus_open" | "close_minus_open_sign" => Ok(RuleKind::CloseMinusOpenSign),
            other => Err(format!(
                "unknown rule '{other}' (expected next_return or close_minus_open)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingOffset {
    /// Offset 0: the signal reads its own row.
    SameBar,
    /// LAG_1: the signal reads the previous row.
    PriorBar,
}

impl TimingOffset {
    pub fn lag(self) -> isize {
        match self {
            TimingOffset::SameBar => 0,
            TimingOffset::PriorBar => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TimingOffset::SameBar => "same_bar",
            TimingOffset::PriorBar => "prior_bar",
        }
    }
}

impl fmt::Display for TimingOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TimingOffset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "0" | "same_bar" | "biased" => Ok(TimingOffset::SameBar),
            "1" | "lag_1" | "prior_bar" | "unbiased" => Ok(TimingOffset::PriorBar),
            other => Err(format!(
                "unknown timing '{other}' (expected same_bar or prior_bar)"
            )),
        }
    }
}

/// Value at index `t - k` for every `t`, `None` when that index falls outside
/// the slice. Negative `k` looks forward.
pub fn shift<T: Copy>(values: &[Option<T>], k: isize) -> Vec<Option<T>> {
    (0..values.len())
        .map(|t| {
            let src = t as isize - k;
            if src < 0 {
                None
            } else {
                values.get(src as usize).copied().flatten()
            }
        })
        .collect()
}

/// Close-to-close return ending at each row; the first row has none.
pub fn pct_change(bars: &[PriceBar]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(bars.len());
    for i in 0..bars.len() {
        if i == 0 {
            out.push(None);
        } else {
            let prev = bars[i - 1].realizable_close();
            out.push(Some(bars[i].realizable_close() / prev - 1.0));
        }
    }
    out
}

/// Smallest series the rule/timing pair can produce a signal for.
pub fn minimum_bars(rule: RuleKind, timing: TimingOffset) -> usize {
    match (rule, timing) {
        (RuleKind::CloseMinusOpenSign, TimingOffset::SameBar) => 1,
        _ => 2,
    }
}

/// Signal per bar, `None` where the timing policy has no legal input.
pub fn compute_signal(
    bars: &[PriceBar],
    rule: RuleKind,
    timing: TimingOffset,
) -> Result<Vec<Option<Signal>>, LookaheadError> {
    validate_series(bars)?;
    check_minimum_bars(bars, rule, timing)?;
    Ok(signals_from_raw(&rule.raw_values(bars), timing))
}

pub(crate) fn check_minimum_bars(
    bars: &[PriceBar],
    rule: RuleKind,
    timing: TimingOffset,
) -> Result<(), LookaheadError> {
    let minimum = minimum_bars(rule, timing);
    if bars.len() < minimum {
        return Err(LookaheadError::InsufficientData {
            requirement: format!("{rule} signal with {timing} timing"),
            bars: bars.len(),
            minimum,
        });
    }
    Ok(())
}

/// Lags already computed raw values and takes their sign.
pub(crate) fn signals_from_raw(raw: &[Option<f64>], timing: TimingOffset) -> Vec<Option<Signal>> {
    shift(raw, timing.lag())
        .into_iter()
        .map(|v| v.map(Signal::from_raw))
        .collect()
}
