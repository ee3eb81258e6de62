//! Report generation port trait.

use crate::domain::engine::DerivedSeries;
use crate::domain::error::LookaheadError;
use std::path::Path;

/// Port for writing one or more labeled cumulative-return series.
pub trait ReportPort {
    fn write(
        &self,
        series: &[&DerivedSeries],
        title: &str,
        output_path: &Path,
    ) -> Result<(), LookaheadError>;
}
