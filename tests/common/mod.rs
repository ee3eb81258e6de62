#![allow(dead_code)]

use chrono::NaiveDate;
use lookahead::domain::engine::DerivedSeries;
use lookahead::domain::error::LookaheadError;
pub use lookahead::domain::price_bar::PriceBar;
use lookahead::ports::data_port::DataPort;
use lookahead::ports::report_port::ReportPort;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, LookaheadError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(LookaheadError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(symbol)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.date >= start_date && b.date <= end_date)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn list_symbols(&self) -> Result<Vec<String>, LookaheadError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, LookaheadError> {
        match self.data.get(symbol) {
            Some(bars) if !bars.is_empty() => Ok(Some((
                bars[0].date,
                bars[bars.len() - 1].date,
                bars.len(),
            ))),
            _ => Ok(None),
        }
    }
}

/// Captures what would have been written instead of touching the filesystem.
#[derive(Default)]
pub struct RecordingReportPort {
    pub writes: RefCell<Vec<(Vec<DerivedSeries>, String, PathBuf)>>,
}

impl ReportPort for RecordingReportPort {
    fn write(
        &self,
        series: &[&DerivedSeries],
        title: &str,
        output_path: &Path,
    ) -> Result<(), LookaheadError> {
        self.writes.borrow_mut().push((
            series.iter().map(|s| (*s).clone()).collect(),
            title.to_string(),
            output_path.to_path_buf(),
        ));
        Ok(())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Bars on consecutive days from 2024-01-01.
pub fn make_bars(opens: &[f64], closes: &[f64]) -> Vec<PriceBar> {
    let start = date(2024, 1, 1);
    opens
        .iter()
        .zip(closes)
        .enumerate()
        .map(|(i, (&open, &close))| {
            PriceBar::new(start + chrono::Duration::days(i as i64), open, close)
        })
        .collect()
}

/// Deterministic series on consecutive days: every third bar closes below
/// its open, the rest close above.
pub fn generate_bars(count: usize, start_price: f64) -> Vec<PriceBar> {
    let start = date(2024, 1, 1);
    let mut price = start_price;
    (0..count)
        .map(|i| {
            let open = price;
            let step = if i % 3 == 0 { -0.8 } else { 1.1 };
            let close = open + step;
            price = close + if i % 2 == 0 { 0.3 } else { -0.2 };
            PriceBar::new(start + chrono::Duration::days(i as i64), open, close)
        })
        .collect()
}
