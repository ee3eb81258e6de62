//! Daily price bar representation and series validation.

use super::error::LookaheadError;
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub close: f64,
    pub adjusted_close: Option<f64>,
}

impl PriceBar {
    pub fn new(date: NaiveDate, open: f64, close: f64) -> Self {
        Self {
            date,
            open,
            close,
            adjusted_close: None,
        }
    }

    pub fn with_adjusted_close(mut self, adjusted_close: f64) -> Self {
        self.adjusted_close = Some(adjusted_close);
        self
    }

    /// Close used for close-to-close returns: adjusted when available.
    pub fn realizable_close(&self) -> f64 {
        self.adjusted_close.unwrap_or(self.close)
    }

    /// close - open
    pub fn close_minus_open(&self) -> f64 {
        self.close - self.open
    }

    /// Return from entering at the open and exiting at the close.
    pub fn intraday_return(&self) -> f64 {
        self.close / self.open - 1.0
    }
}

/// Checks the series is non-empty, strictly increasing by date, and that
/// every price is finite and positive.
pub fn validate_series(bars: &[PriceBar]) -> Result<(), LookaheadError> {
    if bars.is_empty() {
        return Err(LookaheadError::EmptySeries);
    }

    for (index, bar) in bars.iter().enumerate() {
        check_price(index, bar, "open", bar.open)?;
        check_price(index, bar, "close", bar.close)?;
        if let Some(adj) = bar.adjusted_close {
            check_price(index, bar, "adjusted_close", adj)?;
        }
        if index > 0 && bar.date <= bars[index - 1].date {
            return Err(LookaheadError::UnorderedSeries {
                index,
                date: bar.date,
            });
        }
    }

    Ok(())
}

fn check_price(
    index: usize,
    bar: &PriceBar,
    field: &'static str,
    value: f64,
) -> Result<(), LookaheadError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(LookaheadError::InvalidPrice {
            index,
            date: bar.date,
            field,
            value,
        })
    }
}
