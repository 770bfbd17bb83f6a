//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::drift_oracle::DriftOracle;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::replay_oracle::ReplayOracle;
use crate::domain::backtest::{run_backtest, BacktestConfig};
use crate::domain::config_validation::{validate_backtest_config, validate_signal_config};
use crate::domain::error::FortunaError;
use crate::domain::execution::ExecutionConfig;
use crate::domain::metrics::{comparison_rows, ForecastStats, Metrics};
use crate::domain::series::PriceSeries;
use crate::domain::signal::{generate_signals_with_progress, SignalParams, SignalRun};
use crate::domain::strategy::Rebalance;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::oracle_port::OraclePort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "fortuna", about = "Walk-forward forecast signal backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate signals and run the backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        start_date: Option<NaiveDate>,
        #[arg(long)]
        rebalance: Option<Rebalance>,
        /// Comparison CSV output path (overrides [report] output_path)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Generate the signal series only and export it
    Signals {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show data range for configured or all symbols
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            symbol,
            start_date,
            rebalance,
            output,
            dry_run,
        } => run_backtest_command(
            &config,
            symbol.as_deref(),
            start_date,
            rebalance,
            output.as_deref(),
            dry_run,
        ),
        Command::Signals {
            config,
            symbol,
            output,
        } => run_signals_command(&config, symbol.as_deref(), output.as_deref()),
        Command::Info { config, symbol } => run_info(&config, symbol.as_deref()),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &std::path::Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = FortunaError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// Assemble the backtest configuration, applying CLI overrides on top of the
/// `[backtest]` section.
pub fn build_backtest_config(
    config: &dyn ConfigPort,
    symbol_override: Option<&str>,
    start_override: Option<NaiveDate>,
    rebalance_override: Option<Rebalance>,
) -> Result<BacktestConfig, FortunaError> {
    let symbol = match symbol_override {
        Some(s) => s.to_string(),
        None => config
            .get_string("backtest", "symbol")
            .ok_or_else(|| FortunaError::ConfigMissing {
                section: "backtest".into(),
                key: "symbol".into(),
            })?,
    };

    let start_date = match start_override {
        Some(d) => d,
        None => config
            .get_date("backtest", "start_date")
            .ok_or_else(|| FortunaError::ConfigMissing {
                section: "backtest".into(),
                key: "start_date".into(),
            })?,
    };

    let rebalance = match rebalance_override {
        Some(r) => r,
        None => match config.get_string("backtest", "rebalance") {
            Some(s) => s.parse().map_err(|e: crate::domain::strategy::ParseRebalanceError| {
                FortunaError::ConfigInvalid {
                    section: "backtest".into(),
                    key: "rebalance".into(),
                    reason: e.to_string(),
                }
            })?,
            None => Rebalance::Daily,
        },
    };

    Ok(BacktestConfig {
        symbol,
        start_date,
        initial_capital: config.get_double("backtest", "initial_capital", 10000.0),
        rebalance,
        execution: ExecutionConfig {
            position_size: config.get_double("backtest", "position_size", 0.95),
            commission_per_trade: config.get_double("backtest", "commission_per_trade", 0.0),
            commission_pct: config.get_double("backtest", "commission_pct", 0.0),
            slippage_pct: config.get_double("backtest", "slippage_pct", 0.0),
        },
    })
}

/// Assemble signal generation parameters from the `[signals]` section.
pub fn build_signal_params(
    config: &dyn ConfigPort,
    start_date: NaiveDate,
) -> Result<SignalParams, FortunaError> {
    let lookback = config.get_int("signals", "lookback", 126);
    let pred_len = config.get_int("signals", "pred_len", 21);

    Ok(SignalParams {
        start_date,
        lookback: lookback as usize,
        pred_len: pred_len as usize,
        threshold: config.get_double("signals", "threshold", 0.0),
    })
}

/// Select the oracle backend named by `[signals] oracle`.
pub fn build_oracle(config: &dyn ConfigPort) -> Result<Box<dyn OraclePort>, FortunaError> {
    match config
        .get_string("signals", "oracle")
        .as_deref()
        .unwrap_or("drift")
    {
        "drift" => Ok(Box::new(DriftOracle::new())),
        "replay" => {
            let path = config.get_string("signals", "replay_path").ok_or_else(|| {
                FortunaError::ConfigMissing {
                    section: "signals".into(),
                    key: "replay_path".into(),
                }
            })?;
            Ok(Box::new(ReplayOracle::from_file(std::path::Path::new(
                &path,
            ))?))
        }
        other => Err(FortunaError::ConfigInvalid {
            section: "signals".into(),
            key: "oracle".into(),
            reason: format!("unknown oracle backend: {other}"),
        }),
    }
}

fn build_data_port(config: &dyn ConfigPort) -> Result<CsvAdapter, FortunaError> {
    let csv_dir = config
        .get_string("data", "csv_dir")
        .ok_or_else(|| FortunaError::ConfigMissing {
            section: "data".into(),
            key: "csv_dir".into(),
        })?;
    Ok(CsvAdapter::new(PathBuf::from(csv_dir)))
}

fn validate_all(config: &dyn ConfigPort) -> Result<(), FortunaError> {
    validate_backtest_config(config)?;
    validate_signal_config(config)?;
    Ok(())
}

/// Load the full available history for `symbol` as a validated series.
pub fn load_series(data_port: &dyn DataPort, symbol: &str) -> Result<PriceSeries, FortunaError> {
    let bars = data_port.fetch_ohlcv(symbol, NaiveDate::MIN, NaiveDate::MAX)?;
    if bars.is_empty() {
        return Err(FortunaError::NoData {
            symbol: symbol.to_string(),
        });
    }
    PriceSeries::new(bars)
}

fn generate_with_stderr_progress(
    series: &PriceSeries,
    oracle: &dyn OraclePort,
    params: &SignalParams,
) -> SignalRun {
    eprintln!(
        "Generating signals from {} (lookback {}, horizon {})...",
        params.start_date, params.lookback, params.pred_len
    );
    let run = generate_signals_with_progress(series, oracle, params, &mut |p| {
        if p.step % 10 == 0 || p.step == p.total_steps {
            eprintln!(
                "  {}/{} {} pred_return {:.4} signal {}",
                p.step, p.total_steps, p.date, p.predicted_return, p.signal
            );
        }
    });
    eprintln!(
        "Evaluated {} days ({} oracle failures)",
        run.evaluated, run.oracle_failures
    );
    if run.evaluated == 0 {
        eprintln!("warning: no eligible days; start date outside history or insufficient bars");
    }
    run
}

pub fn run_backtest_command(
    config_path: &std::path::Path,
    symbol_override: Option<&str>,
    start_override: Option<NaiveDate>,
    rebalance_override: Option<Rebalance>,
    output_override: Option<&std::path::Path>,
    dry_run: bool,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_all(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let bt_config = match build_backtest_config(
        &adapter,
        symbol_override,
        start_override,
        rebalance_override,
    ) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let data_port = match build_data_port(&adapter) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    if dry_run {
        return run_dry_run(&data_port, &bt_config);
    }

    let series = match load_series(&data_port, &bt_config.symbol) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    if let (Some(first), Some(last)) = (series.first_date(), series.last_date()) {
        eprintln!(
            "Loaded {} bars for {} ({first} to {last})",
            series.len(),
            bt_config.symbol
        );
    }

    let params = match build_signal_params(&adapter, bt_config.start_date) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let oracle = match build_oracle(&adapter) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let run = generate_with_stderr_progress(&series, oracle.as_ref(), &params);

    eprintln!("Running {} backtest for {}...", bt_config.rebalance, bt_config.symbol);
    let result = run_backtest(&series, &run.signals, &bt_config);
    if result.entries_skipped > 0 {
        eprintln!(
            "warning: {} entry fills skipped (insufficient capital)",
            result.entries_skipped
        );
    }

    let risk_free_rate = adapter.get_double("backtest", "risk_free_rate", 0.0);
    let metrics = Metrics::compute(&result.portfolio, risk_free_rate);
    print_metrics(&bt_config, result.bars_simulated, &metrics);

    let rows = comparison_rows(&series, &run.signals, bt_config.start_date, params.pred_len);
    if let Some(stats) = ForecastStats::compute(&rows) {
        println!();
        println!("--- Forecast Quality ---");
        println!("Samples:              {}", stats.samples);
        println!("Correlation:          {:.4}", stats.correlation);
        println!("RMSE:                 {:.4}", stats.rmse);
        println!("Directional accuracy: {:.2}%", stats.directional_accuracy * 100.0);
    }

    let output_path = output_override
        .map(|p| p.to_path_buf())
        .or_else(|| adapter.get_string("report", "output_path").map(PathBuf::from));
    if let Some(path) = output_path {
        let report = CsvReportAdapter::new();
        if let Err(e) = report.write_comparison(&path, &rows) {
            eprintln!("error: {e}");
            return (&e).into();
        }
        eprintln!("Comparison data saved to {}", path.display());
    }

    ExitCode::SUCCESS
}

pub fn run_dry_run(data_port: &dyn DataPort, bt_config: &BacktestConfig) -> ExitCode {
    match data_port.get_data_range(&bt_config.symbol) {
        Ok(Some((first, last, count))) => {
            println!(
                "Config OK. {}: {} bars, {} to {}",
                bt_config.symbol, count, first, last
            );
            if bt_config.start_date > last {
                eprintln!(
                    "warning: start_date {} is after the last bar {}",
                    bt_config.start_date, last
                );
            }
            ExitCode::SUCCESS
        }
        Ok(None) => {
            let e = FortunaError::NoData {
                symbol: bt_config.symbol.clone(),
            };
            eprintln!("error: {e}");
            (&e).into()
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_signals_command(
    config_path: &std::path::Path,
    symbol_override: Option<&str>,
    output_override: Option<&std::path::Path>,
) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_all(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let bt_config = match build_backtest_config(&adapter, symbol_override, None, None) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let result: Result<(SignalRun, PriceSeries, SignalParams), FortunaError> = (|| {
        let data_port = build_data_port(&adapter)?;
        let series = load_series(&data_port, &bt_config.symbol)?;
        let params = build_signal_params(&adapter, bt_config.start_date)?;
        let oracle = build_oracle(&adapter)?;
        let run = generate_with_stderr_progress(&series, oracle.as_ref(), &params);
        Ok((run, series, params))
    })();

    let (run, series, params) = match result {
        Ok(v) => v,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let rows = comparison_rows(&series, &run.signals, bt_config.start_date, params.pred_len);
    let output_path = output_override
        .map(|p| p.to_path_buf())
        .or_else(|| adapter.get_string("report", "output_path").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(format!("{}_signals.csv", bt_config.symbol)));

    let report = CsvReportAdapter::new();
    if let Err(e) = report.write_comparison(&output_path, &rows) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    eprintln!("Signals saved to {}", output_path.display());
    ExitCode::SUCCESS
}

fn run_info(config_path: &std::path::Path, symbol_override: Option<&str>) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let data_port = match build_data_port(&adapter) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let symbols = match symbol_override {
        Some(s) => vec![s.to_string()],
        None => match data_port.list_symbols() {
            Ok(s) => s,
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        },
    };

    for symbol in symbols {
        match data_port.get_data_range(&symbol) {
            Ok(Some((first, last, count))) => {
                println!("{symbol}: {count} bars, {first} to {last}");
            }
            Ok(None) => println!("{symbol}: no data"),
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        }
    }

    ExitCode::SUCCESS
}

fn run_validate(config_path: &std::path::Path) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    match validate_all(&adapter) {
        Ok(()) => {
            println!("Config OK");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn print_metrics(config: &BacktestConfig, bars_simulated: usize, metrics: &Metrics) {
    println!("--- Backtest Results ---");
    println!("Symbol:               {}", config.symbol);
    println!("Rebalance:            {}", config.rebalance);
    println!("Bars simulated:       {bars_simulated}");
    println!("Total return:         {:.2}%", metrics.total_return * 100.0);
    println!(
        "Annualized return:    {:.2}%",
        metrics.annualized_return * 100.0
    );
    println!("Sharpe ratio:         {:.2}", metrics.sharpe_ratio);
    println!("Max drawdown:         {:.2}%", metrics.max_drawdown * 100.0);
    println!(
        "Max drawdown length:  {} days",
        metrics.max_drawdown_duration
    );
    println!(
        "Trades (won/lost):    {}/{}",
        metrics.trades_won, metrics.trades_lost
    );
    println!("Win rate:             {:.2}%", metrics.win_rate * 100.0);
    println!("Profit factor:        {:.2}", metrics.profit_factor);
}
