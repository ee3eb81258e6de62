//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod csv_report_adapter;
pub mod file_config_adapter;
pub mod svg_report_adapter;

use std::path::Path;

use crate::ports::report_port::ReportPort;

/// Report writer for an output path: CSV for `.csv`, SVG otherwise.
pub fn report_for_path(path: &Path) -> Box<dyn ReportPort> {
    let is_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if is_csv {
        Box::new(csv_report_adapter::CsvReportAdapter::new())
    } else {
        Box::new(svg_report_adapter::SvgReportAdapter::new())
    }
}
