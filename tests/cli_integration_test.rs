//! CLI integration tests for run planning and orchestration.
//!
//! Tests cover:
//! - Strategy resolution (preset override, config preset, rule + timing)
//! - Run plan construction and defaults
//! - End-to-end runs over CSV files on disk, writing SVG and CSV reports

mod common;

use clap::Parser;
use common::*;
use lookahead::adapters::csv_adapter::CsvAdapter;
use lookahead::adapters::file_config_adapter::FileConfigAdapter;
use lookahead::adapters::report_for_path;
use lookahead::cli::{self, Cli, Command};
use lookahead::domain::engine::StrategySpec;
use lookahead::domain::error::LookaheadError;
use lookahead::domain::preset::Preset;
use lookahead::domain::signal::{RuleKind, TimingOffset};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const VALID_INI: &str = r#"
[data]
dir = ./prices
symbol = aapl
start_date = 2024-01-01
end_date = 2024-11-18

[strategy]
preset = close_open_biased

[metrics]
risk_free_rate = 0.02
"#;

fn adapter(content: &str) -> FileConfigAdapter {
    FileConfigAdapter::from_string(content).unwrap()
}

mod strategy_resolution {
    use super::*;

    #[test]
    fn config_preset() {
        let spec = cli::resolve_strategy(&adapter(VALID_INI), None).unwrap();
        assert_eq!(spec, Preset::CloseOpenBiased.spec());
    }

    #[test]
    fn override_wins_over_config() {
        let spec = cli::resolve_strategy(&adapter(VALID_INI), Some("crystal_ball")).unwrap();
        assert_eq!(spec, Preset::CrystalBall.spec());
    }

    #[test]
    fn rule_and_timing() {
        let ini = "[strategy]\nrule = close_minus_open\ntiming = LAG_1\n";
        let spec = cli::resolve_strategy(&adapter(ini), None).unwrap();
        assert_eq!(
            spec,
            StrategySpec::new(RuleKind::CloseMinusOpenSign, TimingOffset::PriorBar)
        );
    }

    #[test]
    fn unknown_override() {
        let err = cli::resolve_strategy(&adapter(VALID_INI), Some("tea_leaves")).unwrap_err();
        assert!(matches!(err, LookaheadError::ConfigInvalid { ref key, .. } if key == "preset"));
    }

    #[test]
    fn nothing_configured() {
        let err = cli::resolve_strategy(&adapter("[strategy]\n"), None).unwrap_err();
        assert!(matches!(err, LookaheadError::ConfigMissing { .. }));
    }
}

mod run_plan {
    use super::*;

    #[test]
    fn plan_from_config_defaults() {
        let plan = cli::build_plan(&adapter(VALID_INI), None, None, None, false).unwrap();

        assert_eq!(plan.data_dir, PathBuf::from("./prices"));
        assert_eq!(plan.symbol, "AAPL");
        assert_eq!(plan.start_date, date(2024, 1, 1));
        assert_eq!(plan.end_date, date(2024, 11, 18));
        assert_eq!(plan.specs, vec![Preset::CloseOpenBiased.spec()]);
        assert_eq!(plan.title, "AAPL Close-Open Strategy with Lookahead Bias");
        assert_eq!(plan.output, PathBuf::from("AAPL_close_open_biased.svg"));
        assert!((plan.risk_free_rate - 0.02).abs() < f64::EPSILON);
    }

    #[test]
    fn compare_adds_counterpart() {
        let plan = cli::build_plan(&adapter(VALID_INI), None, None, None, true).unwrap();

        assert_eq!(
            plan.specs,
            vec![
                Preset::CloseOpenBiased.spec(),
                Preset::CloseOpenUnbiased.spec()
            ]
        );
        assert_eq!(
            plan.title,
            "AAPL (close_open_biased vs close_open_unbiased)"
        );
        assert_eq!(
            plan.output,
            PathBuf::from("AAPL_close_open_biased_compare.svg")
        );
    }

    #[test]
    fn overrides_and_report_section() {
        let ini = format!("{VALID_INI}\n[report]\ntitle = Custom\noutput = from_config.csv\n");
        let plan = cli::build_plan(
            &adapter(&ini),
            Some("crystal_ball"),
            Some("msft"),
            Some(PathBuf::from("cli.svg")),
            false,
        )
        .unwrap();

        assert_eq!(plan.symbol, "MSFT");
        assert_eq!(plan.specs, vec![Preset::CrystalBall.spec()]);
        assert_eq!(plan.title, "Custom");
        assert_eq!(plan.output, PathBuf::from("cli.svg"));

        let plan = cli::build_plan(&adapter(&ini), None, None, None, false).unwrap();
        assert_eq!(plan.output, PathBuf::from("from_config.csv"));
    }

    #[test]
    fn output_override_with_unknown_extension() {
        let err = cli::build_plan(
            &adapter(VALID_INI),
            None,
            None,
            Some(PathBuf::from("chart.png")),
            false,
        )
        .unwrap_err();
        assert!(matches!(err, LookaheadError::ConfigInvalid { ref key, .. } if key == "output"));
    }

    #[test]
    fn missing_dates() {
        let ini = "[data]\ndir = p\nsymbol = A\n[strategy]\npreset = crystal_ball\n";
        let err = cli::build_plan(&adapter(ini), None, None, None, false).unwrap_err();
        assert!(matches!(err, LookaheadError::ConfigMissing { ref key, .. } if key == "start_date"));
    }
}

mod end_to_end {
    use super::*;

    fn write_prices(dir: &Path) {
        let mut csv = String::from("Date,Open,High,Low,Close,Adj Close,Volume\n");
        for bar in generate_bars(40, 180.0) {
            csv.push_str(&format!(
                "{},{},{},{},{},{},1000000\n",
                bar.date,
                bar.open,
                bar.open.max(bar.close) + 1.0,
                bar.open.min(bar.close) - 1.0,
                bar.close,
                bar.close * 0.995
            ));
        }
        fs::write(dir.join("AAPL.csv"), csv).unwrap();
    }

    fn plan_for(dir: &TempDir, output: &str, compare: bool) -> cli::RunPlan {
        let ini = format!(
            "[data]\ndir = {}\nsymbol = AAPL\nstart_date = 2024-01-01\nend_date = 2024-12-31\n\
             [strategy]\npreset = close_open_unbiased\n",
            dir.path().display()
        );
        cli::build_plan(
            &adapter(&ini),
            None,
            None,
            Some(dir.path().join(output)),
            compare,
        )
        .unwrap()
    }

    #[test]
    fn compare_writes_svg_with_both_curves() {
        let dir = TempDir::new().unwrap();
        write_prices(dir.path());
        let plan = plan_for(&dir, "compare.svg", true);

        let data_port = CsvAdapter::new(plan.data_dir.clone());
        let report_port = report_for_path(&plan.output);
        let outcomes = cli::execute_plan(&data_port, report_port.as_ref(), &plan).unwrap();

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].series.spec, Preset::CloseOpenUnbiased.spec());
        assert_eq!(outcomes[1].series.spec, Preset::CloseOpenBiased.spec());
        assert!(outcomes[1].series.final_value() > outcomes[0].series.final_value());

        let svg = fs::read_to_string(&plan.output).unwrap();
        assert_eq!(svg.matches("<polyline").count(), 2);
        assert!(svg.contains("without lookahead bias"));
        assert!(svg.contains("with lookahead bias"));
    }

    #[test]
    fn run_writes_csv_series() {
        let dir = TempDir::new().unwrap();
        write_prices(dir.path());
        let plan = plan_for(&dir, "series.csv", false);

        let data_port = CsvAdapter::new(plan.data_dir.clone());
        let report_port = report_for_path(&plan.output);
        cli::execute_plan(&data_port, report_port.as_ref(), &plan).unwrap();

        let content = fs::read_to_string(&plan.output).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 41);
        assert!(lines[0].starts_with("label,date,raw,signal"));
        assert!(lines[1].contains("2024-01-01"));
    }

    #[test]
    fn cli_run_command_writes_report() {
        let dir = TempDir::new().unwrap();
        write_prices(dir.path());
        let config_path = dir.path().join("config.ini");
        fs::write(
            &config_path,
            format!(
                "[data]\ndir = {}\nsymbol = AAPL\nstart_date = 2024-01-01\nend_date = 2024-12-31\n\
                 [strategy]\nrule = next_return\ntiming = 0\n",
                dir.path().display()
            ),
        )
        .unwrap();
        let output = dir.path().join("crystal.svg");

        let parsed = Cli::try_parse_from([
            "lookahead",
            "run",
            "--config",
            config_path.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
        ])
        .unwrap();
        assert!(matches!(parsed.command, Command::Run { .. }));

        let _ = cli::run(parsed);
        assert!(output.exists());
    }

    #[test]
    fn missing_data_file_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let plan = plan_for(&dir, "none.svg", false);

        let data_port = CsvAdapter::new(plan.data_dir.clone());
        let report_port = report_for_path(&plan.output);
        let err = cli::execute_plan(&data_port, report_port.as_ref(), &plan).unwrap_err();

        assert!(matches!(err, LookaheadError::Data { .. }));
        assert!(!plan.output.exists());
    }
}
