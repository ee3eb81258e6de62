//! SVG line chart of cumulative-return curves.
//!
//! One polyline per series on shared axes, with title, axis labels, a legend
//! keyed by series label and horizontal grid lines.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use log::debug;

use crate::domain::engine::DerivedSeries;
use crate::domain::error::LookaheadError;
use crate::ports::report_port::ReportPort;

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 450.0;
const PADDING: f64 = 60.0;
const GRID_LINES: usize = 5;
const COLORS: [&str; 4] = ["#1f77b4", "#ff7f0e", "#2ca02c", "#d62728"];

pub struct SvgReportAdapter;

impl SvgReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SvgReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPort for SvgReportAdapter {
    fn write(
        &self,
        series: &[&DerivedSeries],
        title: &str,
        output_path: &Path,
    ) -> Result<(), LookaheadError> {
        let svg = render_chart(series, title);
        fs::write(output_path, svg).map_err(|e| LookaheadError::Report {
            reason: format!("failed to write {}: {}", output_path.display(), e),
        })?;
        debug!("wrote {} series to {}", series.len(), output_path.display());
        Ok(())
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn render_chart(series: &[&DerivedSeries], title: &str) -> String {
    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH:.0}" height="{HEIGHT:.0}" viewBox="0 0 {WIDTH:.0} {HEIGHT:.0}">"#
    );
    let _ = writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#);
    let _ = writeln!(
        svg,
        r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="18">{}</text>"#,
        WIDTH / 2.0,
        PADDING / 2.0,
        escape(title)
    );

    let values: Vec<f64> = series
        .iter()
        .flat_map(|s| s.rows.iter().map(|r| r.cumulative_return))
        .collect();
    let longest = series.iter().map(|s| s.len()).max().unwrap_or(0);

    if values.is_empty() {
        let _ = writeln!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="middle">No return data available.</text>"#,
            WIDTH / 2.0,
            HEIGHT / 2.0
        );
        svg.push_str("</svg>\n");
        return svg;
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (min, max) = if max > min { (min, max) } else { (min - 0.5, max + 0.5) };

    let plot_width = WIDTH - 2.0 * PADDING;
    let plot_height = HEIGHT - 2.0 * PADDING;
    let scale_y = plot_height / (max - min);
    let scale_x = if longest > 1 {
        plot_width / (longest - 1) as f64
    } else {
        0.0
    };
    let y_of = |v: f64| HEIGHT - PADDING - (v - min) * scale_y;

    // Grid and y-axis ticks
    for i in 0..=GRID_LINES {
        let v = min + (max - min) * i as f64 / GRID_LINES as f64;
        let y = y_of(v);
        let _ = writeln!(
            svg,
            r##"<line x1="{PADDING:.1}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}" stroke="#dddddd" stroke-width="1"/>"##,
            WIDTH - PADDING
        );
        let _ = writeln!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="end" font-size="11">{v:.3}</text>"#,
            PADDING - 6.0,
            y + 4.0
        );
    }

    // Axes
    let _ = writeln!(
        svg,
        r#"<line x1="{PADDING:.1}" y1="{PADDING:.1}" x2="{PADDING:.1}" y2="{:.1}" stroke="black"/>"#,
        HEIGHT - PADDING
    );
    let _ = writeln!(
        svg,
        r#"<line x1="{PADDING:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="black"/>"#,
        HEIGHT - PADDING,
        WIDTH - PADDING,
        HEIGHT - PADDING
    );
    let _ = writeln!(
        svg,
        r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="13">Date</text>"#,
        WIDTH / 2.0,
        HEIGHT - PADDING / 4.0
    );
    let _ = writeln!(
        svg,
        r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="13" transform="rotate(-90 {:.1} {:.1})">Portfolio Value</text>"#,
        PADDING / 4.0,
        HEIGHT / 2.0,
        PADDING / 4.0,
        HEIGHT / 2.0
    );

    // First and last dates of the longest series
    if let Some(longest_series) = series.iter().find(|s| s.len() == longest) {
        if let (Some(first), Some(last)) = (longest_series.rows.first(), longest_series.rows.last()) {
            let _ = writeln!(
                svg,
                r#"<text x="{PADDING:.1}" y="{:.1}" text-anchor="start" font-size="11">{}</text>"#,
                HEIGHT - PADDING + 16.0,
                first.date
            );
            let _ = writeln!(
                svg,
                r#"<text x="{:.1}" y="{:.1}" text-anchor="end" font-size="11">{}</text>"#,
                WIDTH - PADDING,
                HEIGHT - PADDING + 16.0,
                last.date
            );
        }
    }

    for (idx, s) in series.iter().enumerate() {
        let color = COLORS[idx % COLORS.len()];
        let points: Vec<String> = s
            .rows
            .iter()
            .enumerate()
            .map(|(i, r)| format!("{:.1},{:.1}", PADDING + i as f64 * scale_x, y_of(r.cumulative_return)))
            .collect();
        let _ = writeln!(
            svg,
            r#"<polyline fill="none" stroke="{color}" stroke-width="1.5" points="{}"/>"#,
            points.join(" ")
        );

        let legend_y = PADDING + 16.0 + idx as f64 * 18.0;
        let _ = writeln!(
            svg,
            r#"<line x1="{:.1}" y1="{legend_y:.1}" x2="{:.1}" y2="{legend_y:.1}" stroke="{color}" stroke-width="2"/>"#,
            PADDING + 10.0,
            PADDING + 30.0
        );
        let _ = writeln!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" font-size="12">{}</text>"#,
            PADDING + 36.0,
            legend_y + 4.0,
            escape(&s.label)
        );
    }

    svg.push_str("</svg>\n");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::engine::{ReturnSeriesStrategyEngine, StrategySpec};
    use crate::domain::price_bar::PriceBar;
    use crate::domain::signal::{RuleKind, TimingOffset};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn sample_series(timing: TimingOffset) -> DerivedSeries {
        let bars: Vec<PriceBar> = [(10.0, 11.0), (11.0, 10.0), (9.0, 10.0), (10.0, 10.5)]
            .iter()
            .enumerate()
            .map(|(i, &(o, c))| {
                PriceBar::new(NaiveDate::from_ymd_opt(2024, 3, (i + 1) as u32).unwrap(), o, c)
            })
            .collect();
        ReturnSeriesStrategyEngine::new(StrategySpec::new(RuleKind::CloseMinusOpenSign, timing))
            .run(&bars)
            .unwrap()
    }

    #[test]
    fn chart_has_title_axes_and_legend() {
        let biased = sample_series(TimingOffset::SameBar);
        let unbiased = sample_series(TimingOffset::PriorBar);
        let svg = render_chart(&[&biased, &unbiased], "Close-Open Strategy");

        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains("Close-Open Strategy"));
        assert!(svg.contains(">Date<"));
        assert!(svg.contains(">Portfolio Value<"));
        assert!(svg.contains("with lookahead bias"));
        assert!(svg.contains("without lookahead bias"));
        assert_eq!(svg.matches("<polyline").count(), 2);
        assert!(svg.contains("2024-03-01"));
        assert!(svg.contains("2024-03-04"));
    }

    #[test]
    fn empty_chart_has_placeholder() {
        let svg = render_chart(&[], "Nothing");
        assert!(svg.contains("No return data available."));
        assert!(!svg.contains("<polyline"));
    }

    #[test]
    fn title_is_escaped() {
        let s = sample_series(TimingOffset::SameBar);
        let svg = render_chart(&[&s], "Close < Open & more");
        assert!(svg.contains("Close &lt; Open &amp; more"));
    }

    #[test]
    fn write_creates_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chart.svg");
        let s = sample_series(TimingOffset::PriorBar);

        SvgReportAdapter::new().write(&[&s], "Chart", &path).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("<polyline"));
    }

    #[test]
    fn write_to_missing_directory_is_report_error() {
        let s = sample_series(TimingOffset::PriorBar);
        let err = SvgReportAdapter::new()
            .write(&[&s], "Chart", Path::new("/nonexistent/dir/chart.svg"))
            .unwrap_err();
        assert!(matches!(err, LookaheadError::Report { .. }));
    }
}
