//! CSV export of derived series.
//!
//! Long format, one row per bar per series. Null values are empty cells.

use std::path::Path;

use crate::domain::engine::DerivedSeries;
use crate::domain::error::LookaheadError;
use crate::ports::report_port::ReportPort;

pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CsvReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn report_err(e: impl std::fmt::Display) -> LookaheadError {
    LookaheadError::Report {
        reason: e.to_string(),
    }
}

impl ReportPort for CsvReportAdapter {
    /// The title is not part of the CSV layout.
    fn write(
        &self,
        series: &[&DerivedSeries],
        _title: &str,
        output_path: &Path,
    ) -> Result<(), LookaheadError> {
        let mut wtr = csv::Writer::from_path(output_path).map_err(report_err)?;
        wtr.write_record([
            "label",
            "date",
            "raw",
            "signal",
            "daily_return",
            "cumulative_return",
        ])
        .map_err(report_err)?;

        for s in series {
            for row in &s.rows {
                wtr.write_record([
                    s.label.clone(),
                    row.date.to_string(),
                    cell(row.raw),
                    row.signal.map(|sig| sig.to_string()).unwrap_or_default(),
                    cell(row.daily_return),
                    row.cumulative_return.to_string(),
                ])
                .map_err(report_err)?;
            }
        }

        wtr.flush()?;
        Ok(())
    }
}
