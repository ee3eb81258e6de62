//! Per-period strategy returns and their compounded curve.
//!
//! A row without a signal does not trade: its daily return is `None` and it
//! contributes a factor of 1 to the running product. Rows are never dropped,
//! so every output lines up index-for-index with the input bars.

use super::error::LookaheadError;
use super::price_bar::{validate_series, PriceBar};
use super::signal::{RuleKind, Signal};

/// Realized strategy return per bar for the given signals.
///
/// - `NextReturnSign`: `signal[t] * (close*[t+1] / close*[t] - 1)`
/// - `CloseMinusOpenSign`: `signal[t] * (close[t] / open[t] - 1)`, entering
///   at the open and exiting at the close of the same bar.
pub fn compute_daily_return(
    bars: &[PriceBar],
    signals: &[Option<Signal>],
    rule: RuleKind,
) -> Result<Vec<Option<f64>>, LookaheadError> {
    validate_series(bars)?;
    if bars.len() != signals.len() {
        return Err(LookaheadError::LengthMismatch {
            left: bars.len(),
            right: signals.len(),
        });
    }

    let realizable = realizable_returns(bars, rule, &rule.raw_values(bars));
    Ok(apply_signals(signals, &realizable))
}

/// Return a position opened on each row actually earns. For the next-return
/// rule this is the raw series itself.
pub(crate) fn realizable_returns(
    bars: &[PriceBar],
    rule: RuleKind,
    raw: &[Option<f64>],
) -> Vec<Option<f64>> {
    match rule {
        RuleKind::NextReturnSign => raw.to_vec(),
        RuleKind::CloseMinusOpenSign => bars.iter().map(|b| Some(b.intraday_return())).collect(),
    }
}

pub(crate) fn apply_signals(signals: &[Option<Signal>], realizable: &[Option<f64>]) -> Vec<Option<f64>> {
    signals
        .iter()
        .zip(realizable)
        .map(|(signal, ret)| match (signal, ret) {
            (Some(s), Some(r)) => Some(s.direction() * r),
            _ => None,
        })
        .collect()
}

/// Running product of `1 + daily_return`, with `None` treated as no trade.
pub fn compute_cumulative_return(daily_returns: &[Option<f64>]) -> Result<Vec<f64>, LookaheadError> {
    if daily_returns.is_empty() {
        return Err(LookaheadError::EmptySeries);
    }

    let mut cumulative = Vec::with_capacity(daily_returns.len());
    let mut value = 1.0_f64;
    for r in daily_returns {
        value *= 1.0 + r.unwrap_or(0.0);
        cumulative.push(value);
    }
    Ok(cumulative)
}
