//! CLI definition and dispatch.

use chrono::Duration;
use clap::{Args, Parser, Subcommand};
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::fidelity_csv_adapter::FidelityCsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::sqlite_adapter::SqliteAdapter;
use crate::adapters::tables;
use crate::domain::bar::group_by_symbol;
use crate::domain::config_validation::{load_settings, Settings};
use crate::domain::error::ScoutError;
use crate::domain::fifo::match_lots;
use crate::domain::reconcile::reconcile;
use crate::domain::reference::SymbolProfile;
use crate::domain::scoring::{
    self, analyze_universe, BasePatternScorer, BullishScorer, MomentumScorer, SymbolAnalysis,
    TightBaseScorer, WedgeScorer,
};
use crate::domain::universe::{is_common_stock, parse_symbols, resolve_universe, Universe};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::ledger_port::LedgerPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "trailscout", about = "End-of-day stock screener and trade reconciler")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    #[arg(short, long)]
    pub config: PathBuf,
    /// Output file, `-` for stdout; defaults to `[report] output_dir`
    #[arg(short, long)]
    pub output: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct LedgerArgs {
    #[command(flatten)]
    pub report: ReportArgs,
    /// Read executions from a brokerage export instead of the database
    #[arg(long)]
    pub trades: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the reference date, universe size and stored data ranges
    Info {
        #[command(flatten)]
        report: ReportArgs,
        /// Comma-separated symbols to report instead of the whole universe
        #[arg(long)]
        symbols: Option<String>,
    },
    /// Three-day close streaks
    Momentum(ReportArgs),
    /// Tight consolidations near the 20-day high
    TightBase(ReportArgs),
    /// Support/resistance trend line score
    Trendline(ReportArgs),
    /// Trend line candidates forming a wedge
    Wedge(ReportArgs),
    /// Base-pattern score over tight-base survivors
    BaseScore(ReportArgs),
    /// Closed round trips with realized gains
    Reconcile(LedgerArgs),
    /// First-in first-out lot matching
    Fifo(LedgerArgs),
    /// Import a brokerage activity export into the trade ledger
    ImportTrades {
        #[arg(short, long)]
        config: PathBuf,
        file: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Dispatches one command.
pub fn execute(cli: Cli) -> Result<(), ScoutError> {
    match cli.command {
        Command::Info { report, symbols } => run_info(&report, symbols.as_deref()),
        Command::Momentum(args) => run_momentum(&args),
        Command::TightBase(args) => run_tight_base(&args),
        Command::Trendline(args) => run_trendline(&args),
        Command::Wedge(args) => run_wedge(&args),
        Command::BaseScore(args) => run_base_score(&args),
        Command::Reconcile(args) => run_reconcile(&args),
        Command::Fifo(args) => run_fifo(&args),
        Command::ImportTrades { config, file } => run_import_trades(&config, file),
    }
}

/// Loads the INI file and validates every setting.
pub fn load_config(path: &PathBuf) -> Result<(FileConfigAdapter, Settings), ScoutError> {
    info!(path = %path.display(), "loading config");
    let config = FileConfigAdapter::from_file(path)?;
    let settings = load_settings(&config)?;
    Ok((config, settings))
}

/// `[csv] price_dir` selects per-symbol CSV files; otherwise SQLite.
pub fn open_data_port(config: &dyn ConfigPort) -> Result<Box<dyn DataPort>, ScoutError> {
    match config.get_string("csv", "price_dir") {
        Some(dir) => {
            info!(dir = %dir, "reading prices from CSV files");
            Ok(Box::new(CsvAdapter::new(PathBuf::from(dir))))
        }
        None => Ok(Box::new(SqliteAdapter::from_config(config)?)),
    }
}

fn open_report(config: &dyn ConfigPort, output: Option<&str>) -> CsvReportAdapter {
    let dir = config
        .get_string("report", "output_dir")
        .unwrap_or_else(|| ".".to_string());
    CsvReportAdapter::from_output(output, PathBuf::from(dir))
}

/// The universe after the optional common-stock filter.
pub fn build_universe(data: &dyn DataPort, settings: &Settings) -> Result<Universe, ScoutError> {
    let mut universe = resolve_universe(data, settings.min_symbols)?;
    if settings.common_only {
        let before = universe.count();
        universe.retain(is_common_stock);
        info!(
            removed = before - universe.count(),
            remaining = universe.count(),
            "applied common-stock filter"
        );
    }
    if universe.is_empty() {
        warn!("universe is empty; results will be empty");
    }
    Ok(universe)
}

/// Everything a scorer run needs: analyses of the universe plus the
/// reference data to join.
pub struct Screen {
    pub settings: Settings,
    pub universe: Universe,
    pub analyses: Vec<SymbolAnalysis>,
    pub profiles: HashMap<String, SymbolProfile>,
}

pub fn prepare_screen(data: &dyn DataPort, settings: Settings) -> Result<Screen, ScoutError> {
    let universe = build_universe(data, &settings)?;
    let Some(reference_date) = universe.reference_date else {
        return Ok(Screen {
            settings,
            universe,
            analyses: Vec::new(),
            profiles: HashMap::new(),
        });
    };

    let start = reference_date - Duration::days(settings.history_days);
    let mut bars = data.fetch_all_bars(start, reference_date)?;
    bars.retain(|b| universe.contains(&b.symbol));
    info!(
        bars = bars.len(),
        %start,
        end = %reference_date,
        "loaded price history"
    );

    let series = group_by_symbol(bars);
    let analyses = analyze_universe(&universe, &series, settings.trendline_days);

    let symbols: Vec<String> = analyses.iter().map(|a| a.symbol().to_string()).collect();
    let profiles = data.fetch_profiles(&symbols)?;

    Ok(Screen {
        settings,
        universe,
        analyses,
        profiles,
    })
}

fn open_screen(args: &ReportArgs) -> Result<(Screen, CsvReportAdapter), ScoutError> {
    let (config, settings) = load_config(&args.config)?;
    let data = open_data_port(&config)?;
    let screen = prepare_screen(data.as_ref(), settings)?;
    Ok((screen, open_report(&config, args.output.as_deref())))
}

fn run_momentum(args: &ReportArgs) -> Result<(), ScoutError> {
    let (screen, report) = open_screen(args)?;
    let candidates = scoring::run(&MomentumScorer, &screen.analyses, &screen.profiles);
    report.write_table(&tables::candidates_table("momentum", &candidates))
}

fn run_tight_base(args: &ReportArgs) -> Result<(), ScoutError> {
    let (screen, report) = open_screen(args)?;
    let scorer = TightBaseScorer::new(screen.settings.tight_base);
    let candidates = scoring::run(&scorer, &screen.analyses, &screen.profiles);
    report.write_table(&tables::candidates_table("tight_base", &candidates))
}

fn run_trendline(args: &ReportArgs) -> Result<(), ScoutError> {
    let (screen, report) = open_screen(args)?;
    let candidates = scoring::run(&BullishScorer, &screen.analyses, &screen.profiles);
    report.write_table(&tables::candidates_table("trendline", &candidates))
}

fn run_wedge(args: &ReportArgs) -> Result<(), ScoutError> {
    let (screen, report) = open_screen(args)?;
    let scorer = WedgeScorer::new(screen.settings.wedge);
    let candidates = scoring::run(&scorer, &screen.analyses, &screen.profiles);
    report.write_table(&tables::candidates_table("wedge", &candidates))
}

fn run_base_score(args: &ReportArgs) -> Result<(), ScoutError> {
    let (screen, report) = open_screen(args)?;

    let survivors: BTreeSet<String> = scoring::run(
        &TightBaseScorer::new(screen.settings.tight_base),
        &screen.analyses,
        &screen.profiles,
    )
    .into_iter()
    .map(|c| c.profile.symbol)
    .collect();

    let analyses: Vec<SymbolAnalysis> = screen
        .analyses
        .into_iter()
        .filter(|a| survivors.contains(a.symbol()))
        .collect();

    let scorer = BasePatternScorer::new(screen.settings.base_pattern);
    let candidates = scoring::run(&scorer, &analyses, &screen.profiles);
    report.write_table(&tables::candidates_table("base_score", &candidates))
}

fn run_info(args: &ReportArgs, symbols: Option<&str>) -> Result<(), ScoutError> {
    let (config, settings) = load_config(&args.config)?;
    let data = open_data_port(&config)?;
    let universe = build_universe(data.as_ref(), &settings)?;

    let symbols: Vec<String> = match symbols {
        Some(list) => parse_symbols(list).map_err(|e| ScoutError::ConfigInvalid {
            section: "cli".into(),
            key: "symbols".into(),
            reason: e.to_string(),
        })?,
        None => universe.symbols.iter().cloned().collect(),
    };

    let mut ranges = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        let range = data.get_data_range(&symbol)?;
        ranges.push((symbol, range));
    }

    let report = open_report(&config, args.output.as_deref());
    report.write_table(&tables::info_table(&universe, &ranges))
}

fn open_ledger(
    config: &dyn ConfigPort,
    trades: Option<&PathBuf>,
) -> Result<Box<dyn LedgerPort>, ScoutError> {
    match trades {
        Some(path) => Ok(Box::new(FidelityCsvAdapter::new(path.clone()))),
        None => Ok(Box::new(SqliteAdapter::from_config(config)?)),
    }
}

fn run_reconcile(args: &LedgerArgs) -> Result<(), ScoutError> {
    let (config, settings) = load_config(&args.report.config)?;
    let executions = open_ledger(&config, args.trades.as_ref())?.fetch_executions()?;

    let result = reconcile(&executions, settings.close_tolerance);
    info!(
        executions = executions.len(),
        closed = result.details.len(),
        "reconciled ledger"
    );

    let report = open_report(&config, args.report.output.as_deref());
    report.write_table(&tables::reconciliation_table(&result))
}

fn run_fifo(args: &LedgerArgs) -> Result<(), ScoutError> {
    let (config, _settings) = load_config(&args.report.config)?;
    let executions = open_ledger(&config, args.trades.as_ref())?.fetch_executions()?;

    let lots = match_lots(&executions);
    info!(
        executions = executions.len(),
        lots = lots.len(),
        "matched lots"
    );

    let report = open_report(&config, args.report.output.as_deref());
    report.write_table(&tables::lots_table(&lots))
}

fn run_import_trades(config_path: &PathBuf, file: PathBuf) -> Result<(), ScoutError> {
    let (config, _settings) = load_config(config_path)?;
    let executions = FidelityCsvAdapter::new(file).read()?;
    let store = SqliteAdapter::from_config(&config)?;

    let (inserted, skipped) = store.insert_executions(&executions)?;
    info!(inserted, skipped, "imported executions");
    println!("imported {inserted} executions ({skipped} already present)");
    Ok(())
}
