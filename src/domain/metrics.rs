//! Performance summary of a derived return series.

use super::engine::DerivedSeries;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub total_return: f64,
    pub annualized_return: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub max_drawdown: f64,
    pub max_drawdown_duration: usize,
    pub traded_periods: usize,
    pub winning_periods: usize,
    pub hit_rate: f64,
}

impl Metrics {
    pub fn compute(series: &DerivedSeries, risk_free_rate: f64) -> Self {
        let curve: Vec<f64> = series.rows.iter().map(|r| r.cumulative_return).collect();
        let final_value = series.final_value();
        let total_return = final_value - 1.0;

        let years = curve.len() as f64 / TRADING_DAYS_PER_YEAR;
        let annualized_return = if years > 0.0 && final_value > 0.0 && final_value.is_finite() {
            final_value.powf(1.0 / years) - 1.0
        } else {
            0.0
        };

        let (max_drawdown, max_drawdown_duration) = compute_drawdown(&curve);

        let returns: Vec<f64> = series
            .rows
            .iter()
            .map(|r| r.daily_return.unwrap_or(0.0))
            .collect();
        let daily_rf = risk_free_rate / TRADING_DAYS_PER_YEAR;
        let (sharpe_ratio, sortino_ratio) = compute_risk_adjusted(&returns, daily_rf);

        let traded: Vec<f64> = series.rows.iter().filter_map(|r| r.daily_return).collect();
        let traded_periods = traded.len();
        let winning_periods = traded.iter().filter(|&&r| r > 0.0).count();
        let hit_rate = if traded_periods > 0 {
            winning_periods as f64 / traded_periods as f64
        } else {
            0.0
        };

        Metrics {
            total_return,
            annualized_return,
            sharpe_ratio,
            sortino_ratio,
            max_drawdown,
            max_drawdown_duration,
            traded_periods,
            winning_periods,
            hit_rate,
        }
    }
}

/// Largest peak-to-trough fall as a fraction of the peak, and the longest
/// run of bars spent below a prior peak.
fn compute_drawdown(curve: &[f64]) -> (f64, usize) {
    let Some(&first) = curve.first() else {
        return (0.0, 0);
    };

    let mut peak = first;
    let mut max_dd = 0.0_f64;
    let mut max_duration = 0usize;
    let mut duration = 0usize;

    for &value in curve {
        if value >= peak {
            peak = value;
            duration = 0;
        } else if peak > 0.0 {
            max_dd = max_dd.max((peak - value) / peak);
            duration += 1;
            max_duration = max_duration.max(duration);
        }
    }

    (max_dd, max_duration)
}

fn compute_risk_adjusted(returns: &[f64], daily_rf: f64) -> (f64, f64) {
    if returns.len() < 2 {
        return (0.0, 0.0);
    }

    let n = returns.len() as f64;
    let mean: f64 = returns.iter().sum::<f64>() / n;
    let variance: f64 = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();

    let excess_return = mean - daily_rf;

    let sharpe = if stddev > 0.0 {
        (excess_return / stddev) * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        0.0
    };

    let downside: f64 = returns
        .iter()
        .filter(|&&r| r < daily_rf)
        .map(|&r| (r - daily_rf).powi(2))
        .sum::<f64>();
    let downside_stddev = (downside / n).sqrt();

    let sortino = if downside_stddev > 0.0 {
        (excess_return / downside_stddev) * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        0.0
    };

    (sharpe, sortino)
}
