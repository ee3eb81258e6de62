//! CSV file price data adapter.
//!
//! Reads `<dir>/<SYMBOL>.csv` in the layout of a daily download: a header
//! row with at least `Date`, `Open` and `Close`, and optionally `Adj Close`.
//! Header lookup ignores case, spaces and underscores.

use crate::domain::error::LookaheadError;
use crate::domain::price_bar::PriceBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

pub struct CsvAdapter {
    base_path: PathBuf,
}

struct Columns {
    date: usize,
    open: usize,
    close: usize,
    adjusted_close: Option<usize>,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    /// `<dir>/<symbol>.csv`, falling back to a file whose stem matches the
    /// symbol ignoring case.
    fn csv_path(&self, symbol: &str) -> PathBuf {
        let exact = self.base_path.join(format!("{}.csv", symbol));
        if exact.exists() {
            return exact;
        }

        let Ok(entries) = fs::read_dir(&self.base_path) else {
            return exact;
        };
        entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .find(|path| {
                is_csv(path)
                    && path
                        .file_stem()
                        .is_some_and(|stem| stem.eq_ignore_ascii_case(symbol))
            })
            .unwrap_or(exact)
    }

    fn read_all(&self, symbol: &str) -> Result<Vec<PriceBar>, LookaheadError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| LookaheadError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr.headers().map_err(|e| LookaheadError::Data {
            reason: format!("CSV header error: {}", e),
        })?;
        let columns = locate_columns(headers)?;

        let mut bars = Vec::new();
        for (line, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| LookaheadError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date = parse_date(field(&record, columns.date, "date")?)?;
            let open = field(&record, columns.open, "open")?;
            let close = field(&record, columns.close, "close")?;
            if open.is_empty() || close.is_empty() {
                warn!("{}: skipping row {} ({}) with missing prices", symbol, line + 1, date);
                continue;
            }

            let mut bar = PriceBar::new(date, parse_price(open, "open")?, parse_price(close, "close")?);
            if let Some(idx) = columns.adjusted_close {
                let adj = field(&record, idx, "adjusted close")?;
                if !adj.is_empty() {
                    bar = bar.with_adjusted_close(parse_price(adj, "adjusted close")?);
                }
            }
            bars.push(bar);
        }

        bars.sort_by_key(|b| b.date);
        debug!("{}: read {} bars from {}", symbol, bars.len(), path.display());
        Ok(bars)
    }
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

fn normalize(header: &str) -> String {
    header
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .collect::<String>()
        .to_lowercase()
}

fn position(headers: &csv::StringRecord, names: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| names.contains(&normalize(h).as_str()))
}

fn require(headers: &csv::StringRecord, names: &[&str], label: &str) -> Result<usize, LookaheadError> {
    position(headers, names).ok_or_else(|| LookaheadError::Data {
        reason: format!("missing {} column", label),
    })
}

fn locate_columns(headers: &csv::StringRecord) -> Result<Columns, LookaheadError> {
    Ok(Columns {
        date: require(headers, &["date"], "date")?,
        open: require(headers, &["open"], "open")?,
        close: require(headers, &["close"], "close")?,
        adjusted_close: position(headers, &["adjclose", "adjustedclose"]),
    })
}

fn field<'r>(record: &'r csv::StringRecord, idx: usize, label: &str) -> Result<&'r str, LookaheadError> {
    record
        .get(idx)
        .map(str::trim)
        .ok_or_else(|| LookaheadError::Data {
            reason: format!("missing {} value", label),
        })
}

/// Accepts `YYYY-MM-DD`, ignoring any trailing time component.
fn parse_date(value: &str) -> Result<NaiveDate, LookaheadError> {
    let day = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|e| LookaheadError::Data {
        reason: format!("invalid date '{}': {}", value, e),
    })
}

fn parse_price(value: &str, label: &str) -> Result<f64, LookaheadError> {
    value.parse().map_err(|e| LookaheadError::Data {
        reason: format!("invalid {} value '{}': {}", label, value, e),
    })
}

impl DataPort for CsvAdapter {
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, LookaheadError> {
        Ok(self
            .read_all(symbol)?
            .into_iter()
            .filter(|b| b.date >= start_date && b.date <= end_date)
            .collect())
    }

    fn list_symbols(&self) -> Result<Vec<String>, LookaheadError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| LookaheadError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| LookaheadError::Data {
                reason: format!("directory entry error: {}", e),
            })?;

            let path = entry.path();
            if let (true, Some(stem)) = (is_csv(&path), path.file_stem()) {
                symbols.push(stem.to_string_lossy().into_owned());
            }
        }

        symbols.sort();
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, LookaheadError> {
        if !self.csv_path(symbol).exists() {
            return Ok(None);
        }
        let bars = self.read_all(symbol)?;
        Ok(match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date, bars.len())),
            _ => None,
        })
    }
}
