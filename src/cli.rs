//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use log::debug;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::report_for_path;
use crate::domain::config_validation::{
    non_empty, parse_date, validate_data_config, validate_output_path, validate_strategy_config,
};
use crate::domain::engine::{DerivedSeries, ReturnSeriesStrategyEngine, StrategySpec};
use crate::domain::error::LookaheadError;
use crate::domain::metrics::Metrics;
use crate::domain::preset::Preset;
use crate::domain::signal::{RuleKind, TimingOffset};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "lookahead", about = "Demonstrate lookahead bias in daily strategy backtests")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one strategy and chart its cumulative return
    Run {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        preset: Option<String>,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run a strategy and its opposite-timing counterpart on one chart
    Compare {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        preset: Option<String>,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List the built-in strategy presets
    Presets,
    /// Show the data range for a symbol
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
    },
    /// List symbols available in the data directory
    Symbols {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Everything needed to fetch one symbol and run one or more strategies on it.
#[derive(Debug, Clone, PartialEq)]
pub struct RunPlan {
    pub data_dir: PathBuf,
    pub symbol: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub specs: Vec<StrategySpec>,
    pub title: String,
    pub output: PathBuf,
    pub risk_free_rate: f64,
}

#[derive(Debug)]
pub struct RunOutcome {
    pub series: DerivedSeries,
    pub metrics: Metrics,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Run {
            config,
            preset,
            symbol,
            output,
        } => run_backtest(&config, preset.as_deref(), symbol.as_deref(), output, false),
        Command::Compare {
            config,
            preset,
            symbol,
            output,
        } => run_backtest(&config, preset.as_deref(), symbol.as_deref(), output, true),
        Command::Validate { config } => run_validate(&config),
        Command::Presets => run_presets(),
        Command::Info { config, symbol } => run_info(&config, symbol.as_deref()),
        Command::Symbols { config } => run_symbols(&config),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = LookaheadError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// Strategy chosen by `preset_override`, `[strategy] preset`, or
/// `[strategy] rule` + `timing`, in that order.
pub fn resolve_strategy(
    config: &dyn ConfigPort,
    preset_override: Option<&str>,
) -> Result<StrategySpec, LookaheadError> {
    let preset = preset_override
        .map(str::to_string)
        .or_else(|| non_empty(config.get_string("strategy", "preset")));

    if let Some(name) = preset {
        let preset = name
            .parse::<Preset>()
            .map_err(|reason| LookaheadError::config_invalid("strategy", "preset", reason))?;
        return Ok(preset.spec());
    }

    let rule = non_empty(config.get_string("strategy", "rule"))
        .ok_or_else(|| LookaheadError::ConfigMissing {
            section: "strategy".into(),
            key: "preset".into(),
        })?
        .parse::<RuleKind>()
        .map_err(|reason| LookaheadError::config_invalid("strategy", "rule", reason))?;
    let timing = non_empty(config.get_string("strategy", "timing"))
        .ok_or_else(|| LookaheadError::ConfigMissing {
            section: "strategy".into(),
            key: "timing".into(),
        })?
        .parse::<TimingOffset>()
        .map_err(|reason| LookaheadError::config_invalid("strategy", "timing", reason))?;

    Ok(StrategySpec::new(rule, timing))
}

pub fn build_plan(
    config: &dyn ConfigPort,
    preset_override: Option<&str>,
    symbol_override: Option<&str>,
    output_override: Option<PathBuf>,
    compare: bool,
) -> Result<RunPlan, LookaheadError> {
    let data_dir = non_empty(config.get_string("data", "dir")).ok_or_else(|| {
        LookaheadError::ConfigMissing {
            section: "data".into(),
            key: "dir".into(),
        }
    })?;
    let symbol = match symbol_override {
        Some(s) => s.trim().to_uppercase(),
        None => non_empty(config.get_string("data", "symbol"))
            .map(|s| s.trim().to_uppercase())
            .ok_or_else(|| LookaheadError::ConfigMissing {
                section: "data".into(),
                key: "symbol".into(),
            })?,
    };
    let start_date = parse_date(config.get_string("data", "start_date").as_deref(), "start_date")?;
    let end_date = parse_date(config.get_string("data", "end_date").as_deref(), "end_date")?;

    let spec = resolve_strategy(config, preset_override)?;
    let preset = Preset::from_spec(spec);

    let mut specs = vec![spec];
    if compare {
        specs.push(preset.counterpart().spec());
    }

    let title = match non_empty(config.get_string("report", "title")) {
        Some(t) => t,
        None if compare => format!("{} ({} vs {})", symbol, preset, preset.counterpart()),
        None => format!("{} {}", symbol, preset.title()),
    };

    let output = output_override
        .or_else(|| non_empty(config.get_string("report", "output")).map(PathBuf::from))
        .unwrap_or_else(|| {
            let suffix = if compare { "_compare" } else { "" };
            PathBuf::from(format!("{}_{}{}.svg", symbol, preset, suffix))
        });
    validate_output_path(&output)?;

    Ok(RunPlan {
        data_dir: PathBuf::from(data_dir),
        symbol,
        start_date,
        end_date,
        specs,
        title,
        output,
        risk_free_rate: config.get_double("metrics", "risk_free_rate", 0.0),
    })
}

/// Fetches the plan's bars once, runs every strategy on them, and writes one
/// report containing all resulting series.
pub fn execute_plan(
    data_port: &dyn DataPort,
    report_port: &dyn ReportPort,
    plan: &RunPlan,
) -> Result<Vec<RunOutcome>, LookaheadError> {
    let bars = data_port.fetch_bars(&plan.symbol, plan.start_date, plan.end_date)?;
    if bars.is_empty() {
        return Err(LookaheadError::NoData {
            symbol: plan.symbol.clone(),
        });
    }
    eprintln!(
        "Loaded {} bars for {} ({} to {})",
        bars.len(),
        plan.symbol,
        bars[0].date,
        bars[bars.len() - 1].date
    );

    let mut outcomes = Vec::with_capacity(plan.specs.len());
    for spec in &plan.specs {
        debug!("running {} / {}", spec.rule, spec.timing);
        let series = ReturnSeriesStrategyEngine::new(*spec).run(&bars)?;
        let metrics = Metrics::compute(&series, plan.risk_free_rate);
        outcomes.push(RunOutcome { series, metrics });
    }

    let refs: Vec<&DerivedSeries> = outcomes.iter().map(|o| &o.series).collect();
    report_port.write(&refs, &plan.title, &plan.output)?;

    Ok(outcomes)
}

fn print_summary(outcome: &RunOutcome) {
    let m = &outcome.metrics;
    let spec = outcome.series.spec;
    eprintln!(
        "\n=== {} ({} / {}) ===",
        outcome.series.label, spec.rule, spec.timing
    );
    eprintln!("Final Value:      {:.4}", outcome.series.final_value());
    eprintln!("Total Return:     {:.2}%", m.total_return * 100.0);
    eprintln!("Annualized:       {:.2}%", m.annualized_return * 100.0);
    eprintln!("Sharpe Ratio:     {:.2}", m.sharpe_ratio);
    eprintln!("Sortino Ratio:    {:.2}", m.sortino_ratio);
    eprintln!("Max Drawdown:     -{:.1}%", m.max_drawdown * 100.0);
    eprintln!("Traded Periods:   {}", m.traded_periods);
    eprintln!("Hit Rate:         {:.1}%", m.hit_rate * 100.0);
}

fn run_backtest(
    config_path: &Path,
    preset: Option<&str>,
    symbol: Option<&str>,
    output: Option<PathBuf>,
    compare: bool,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    if preset.is_none() {
        if let Err(e) = validate_strategy_config(&config) {
            eprintln!("error: {e}");
            return (&e).into();
        }
    }

    let plan = match build_plan(&config, preset, symbol, output, compare) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let data_port = CsvAdapter::new(plan.data_dir.clone());
    let report_port = report_for_path(&plan.output);

    match execute_plan(&data_port, report_port.as_ref(), &plan) {
        Ok(outcomes) => {
            for outcome in &outcomes {
                print_summary(outcome);
            }
            eprintln!("\nReport written to: {}", plan.output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let checks = validate_data_config(&config)
        .and_then(|()| validate_strategy_config(&config))
        .and_then(|()| resolve_strategy(&config, None));

    match checks {
        Ok(spec) => {
            let preset = Preset::from_spec(spec);
            eprintln!("  rule:    {}", spec.rule);
            eprintln!("  timing:  {}", spec.timing);
            eprintln!("  preset:  {} ({})", preset, spec.label());
            eprintln!("\nConfiguration is valid.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_presets() -> ExitCode {
    for preset in Preset::ALL {
        let spec = preset.spec();
        println!(
            "{:<22} {:<17} {:<10} {}",
            preset.name(),
            spec.rule,
            spec.timing,
            preset.description()
        );
    }
    ExitCode::SUCCESS
}

fn data_dir(config: &dyn ConfigPort) -> Result<PathBuf, LookaheadError> {
    non_empty(config.get_string("data", "dir"))
        .map(PathBuf::from)
        .ok_or_else(|| LookaheadError::ConfigMissing {
            section: "data".into(),
            key: "dir".into(),
        })
}

fn run_info(config_path: &Path, symbol: Option<&str>) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let dir = match data_dir(&config) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let symbol = match symbol
        .map(str::to_string)
        .or_else(|| non_empty(config.get_string("data", "symbol")))
    {
        Some(s) => s.trim().to_uppercase(),
        None => {
            eprintln!("error: symbol is required (use --symbol or set [data] symbol)");
            return ExitCode::from(2);
        }
    };

    match CsvAdapter::new(dir).get_data_range(&symbol) {
        Ok(Some((first, last, count))) => {
            println!("{}: {} bars, {} to {}", symbol, count, first, last);
            ExitCode::SUCCESS
        }
        Ok(None) => {
            eprintln!("{}: no data found", symbol);
            ExitCode::from(3)
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_symbols(config_path: &Path) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let dir = match data_dir(&config) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    match CsvAdapter::new(dir).list_symbols() {
        Ok(symbols) if symbols.is_empty() => {
            eprintln!("No symbols found");
            ExitCode::SUCCESS
        }
        Ok(symbols) => {
            for symbol in &symbols {
                println!("{}", symbol);
            }
            eprintln!("{} symbols found", symbols.len());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}
