//! Price data access port trait.

use crate::domain::error::LookaheadError;
use crate::domain::price_bar::PriceBar;
use chrono::NaiveDate;

/// Supplies finalized daily bars, sorted ascending by date.
pub trait DataPort {
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, LookaheadError>;

    fn list_symbols(&self) -> Result<Vec<String>, LookaheadError>;

    /// First date, last date and bar count, or `None` if the symbol has no bars.
    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, LookaheadError>;
}
