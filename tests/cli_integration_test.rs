//! CLI integration tests with real INI, SQLite and CSV files on disk.
//!
//! Tests cover:
//! - Argument parsing for every subcommand
//! - Scorer commands against a SQLite store and a CSV price directory
//! - Reconcile/FIFO from a brokerage export and from the ledger table
//! - Import idempotence
//! - Config and import failures mapping to their exit statuses

mod common;

use clap::Parser;
use common::*;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use trailscout::adapters::file_config_adapter::FileConfigAdapter;
use trailscout::adapters::sqlite_adapter::SqliteAdapter;
use trailscout::cli::{self, Cli, Command};
use trailscout::ports::ledger_port::LedgerPort;

const EXPORT: &str = "\
Run Date,Account,Account Number,Action,Symbol,Quantity,Price ($),Amount ($),Settlement Date
01/02/2024,Individual,X1,YOU BOUGHT ACME CORP,ACME,100,10,-1000,01/04/2024
01/12/2024,Individual,X1,YOU SOLD ACME CORP,ACME,-100,12,1200,01/16/2024
01/15/2024,Individual,X1,DIVIDEND RECEIVED,ACME,,,3.50,
";

fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    let mut file = fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("trailscout").chain(args.iter().copied())).unwrap()
}

fn execute(args: &[&str]) -> Result<(), trailscout::domain::error::ScoutError> {
    cli::execute(parse(args))
}

/// A workspace with a seeded SQLite store and a config pointing at it.
struct Workspace {
    dir: TempDir,
    config: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let db = dir.path().join("prices.db");
        let config = write_file(
            dir.path(),
            "trailscout.ini",
            &format!(
                "[sqlite]\npath = {}\n\n[universe]\nmin_symbols = 3\n\n[report]\noutput_dir = {}\n",
                db.display(),
                dir.path().join("reports").display()
            ),
        );

        let store =
            SqliteAdapter::from_config(&FileConfigAdapter::from_file(&config).unwrap()).unwrap();
        let mut bars = series_bars("TGT", &tight_closes());
        bars.extend(series_bars("UPP", &rising_closes(20)));
        bars.extend(series_bars("DWN", &falling_closes(20)));
        store.insert_bars(&bars).unwrap();

        Self { dir, config }
    }

    fn config(&self) -> &str {
        self.config.to_str().unwrap()
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn read(&self, name: &str) -> String {
        fs::read_to_string(self.path(name)).unwrap()
    }
}

mod argument_parsing {
    use super::*;

    #[test]
    fn scorer_commands_take_config_and_output() {
        match parse(&["tight-base", "--config", "a.ini", "--output", "-"]).command {
            Command::TightBase(args) => {
                assert_eq!(args.config, PathBuf::from("a.ini"));
                assert_eq!(args.output.as_deref(), Some("-"));
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert!(matches!(
            parse(&["base-score", "-c", "a.ini"]).command,
            Command::BaseScore(_)
        ));
    }

    #[test]
    fn ledger_commands_accept_trades_export() {
        match parse(&["reconcile", "-c", "a.ini", "--trades", "History.csv"]).command {
            Command::Reconcile(args) => {
                assert_eq!(args.trades, Some(PathBuf::from("History.csv")));
                assert_eq!(args.report.output, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn import_requires_a_file() {
        assert!(Cli::try_parse_from(["trailscout", "import-trades", "-c", "a.ini"]).is_err());
        assert!(matches!(
            parse(&["import-trades", "-c", "a.ini", "History.csv"]).command,
            Command::ImportTrades { .. }
        ));
    }

    #[test]
    fn config_is_required() {
        assert!(Cli::try_parse_from(["trailscout", "momentum"]).is_err());
    }
}

mod screening_commands {
    use super::*;

    #[test]
    fn momentum_writes_csv_file() {
        let ws = Workspace::new();
        let out = ws.path("momentum.csv");
        execute(&["momentum", "-c", ws.config(), "-o", out.to_str().unwrap()]).unwrap();

        let content = ws.read("momentum.csv");
        let lines: Vec<&str> = content.lines().collect();
        assert!(lines[0].starts_with("symbol,company_name,sector"));
        assert!(lines[0].ends_with(",score"));
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("TGT,"));
        assert!(lines[2].starts_with("UPP,"));
    }

    #[test]
    fn default_output_goes_to_report_dir() {
        let ws = Workspace::new();
        execute(&["tight-base", "-c", ws.config()]).unwrap();

        let content = ws.read("reports/tight_base.csv");
        let rows: Vec<&str> = content.lines().skip(1).collect();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].starts_with("TGT,"));
    }

    #[test]
    fn every_scorer_runs() {
        let ws = Workspace::new();
        for command in ["trendline", "wedge", "base-score", "info"] {
            execute(&[command, "-c", ws.config()]).unwrap();
        }
        for name in ["trendline", "wedge", "base_score", "info"] {
            assert!(ws.path(&format!("reports/{name}.csv")).is_file(), "{name}");
        }
        assert!(ws.read("reports/trendline.csv").contains("\nUPP,"));
        let info = ws.read("reports/info.csv");
        assert_eq!(info.lines().count(), 4);
        assert!(info.contains("2024-01-20,3,DWN,2024-01-01,2024-01-20,20"));
    }

    #[test]
    fn info_for_named_symbols() {
        let ws = Workspace::new();
        execute(&["info", "-c", ws.config(), "--symbols", "upp,nope"]).unwrap();
        let info = ws.read("reports/info.csv");
        assert!(info.contains(",UPP,2024-01-01,2024-01-20,20"));
        assert!(info.contains(",NOPE,,,"));
    }

    /// Writes the three fixture series as CSV files and returns a config
    /// pointing at them.
    fn csv_price_dir(dir: &Path, file_name: fn(&str) -> String) -> PathBuf {
        let prices = dir.join("prices");
        fs::create_dir(&prices).unwrap();
        for (symbol, closes) in [
            ("TGT", tight_closes()),
            ("UPP", rising_closes(20)),
            ("DWN", falling_closes(20)),
        ] {
            let mut content = String::from("date,open,high,low,close,volume\n");
            for bar in series_bars(symbol, &closes) {
                content.push_str(&format!(
                    "{},{},{},{},{},{}\n",
                    bar.date, bar.open, bar.high, bar.low, bar.close, bar.volume
                ));
            }
            write_file(&prices, &file_name(symbol), &content);
        }
        write_file(
            dir,
            "csv.ini",
            &format!(
                "[csv]\nprice_dir = {}\n[universe]\nmin_symbols = 3\n",
                prices.display()
            ),
        )
    }

    #[test]
    fn csv_price_directory_replaces_sqlite() {
        let dir = TempDir::new().unwrap();
        let config = csv_price_dir(dir.path(), |symbol| format!("{symbol}.csv"));
        let out = dir.path().join("out.csv");
        execute(&[
            "momentum",
            "-c",
            config.to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
        ])
        .unwrap();
        assert_eq!(fs::read_to_string(out).unwrap().lines().count(), 3);
    }

    #[test]
    fn lower_case_price_files_are_screened() {
        let dir = TempDir::new().unwrap();
        let config = csv_price_dir(dir.path(), |symbol| {
            format!("{}.csv", symbol.to_lowercase())
        });
        let out = dir.path().join("out.csv");
        execute(&[
            "tight-base",
            "-c",
            config.to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
        ])
        .unwrap();
        let content = fs::read_to_string(out).unwrap();
        let rows: Vec<&str> = content.lines().skip(1).collect();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].starts_with("TGT,"));
    }

    #[test]
    fn thin_store_yields_header_only() {
        let ws = Workspace::new();
        let strict = write_file(
            ws.dir.path(),
            "strict.ini",
            &fs::read_to_string(&ws.config)
                .unwrap()
                .replace("min_symbols = 3", "min_symbols = 50"),
        );
        let out = ws.path("empty.csv");
        execute(&[
            "trendline",
            "-c",
            strict.to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
        ])
        .unwrap();
        assert_eq!(ws.read("empty.csv").lines().count(), 1);
    }
}

mod ledger_commands {
    use super::*;

    #[test]
    fn reconcile_from_export() {
        let ws = Workspace::new();
        let export = write_file(ws.dir.path(), "History.csv", EXPORT);
        let out = ws.path("reconcile.csv");
        execute(&[
            "reconcile",
            "-c",
            ws.config(),
            "--trades",
            export.to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
        ])
        .unwrap();

        let content = ws.read("reconcile.csv");
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[1], "ACME,X1,100,100,0,1000,1200,200,20,2024-01-02,2024-01-12,10");
        assert!(lines[2].starts_with("gains total,"));
        assert!(lines[3].starts_with("losses total,"));
        assert!(lines[4].starts_with("net total,"));
    }

    #[test]
    fn import_then_fifo_from_ledger() {
        let ws = Workspace::new();
        let export = write_file(ws.dir.path(), "History.csv", EXPORT);
        let export = export.to_str().unwrap();

        execute(&["import-trades", "-c", ws.config(), export]).unwrap();
        execute(&["import-trades", "-c", ws.config(), export]).unwrap();

        let store =
            SqliteAdapter::from_config(&FileConfigAdapter::from_file(&ws.config).unwrap())
                .unwrap();
        assert_eq!(store.fetch_executions().unwrap().len(), 2);

        execute(&["fifo", "-c", ws.config()]).unwrap();
        let lots = ws.read("reports/fifo.csv");
        assert_eq!(lots.lines().count(), 2);
        assert!(lots.contains("ACME,X1,2024-01-02,2024-01-12,100,10,12,1000,1200,200,10"));
    }

    #[test]
    fn bad_export_is_import_failure() {
        let ws = Workspace::new();
        let export = write_file(ws.dir.path(), "prices.csv", "date,close\n2024-01-01,1\n");
        let err = execute(&["import-trades", "-c", ws.config(), export.to_str().unwrap()])
            .unwrap_err();
        assert_eq!(err.exit_status(), 4);
    }
}

mod config_failures {
    use super::*;

    #[test]
    fn missing_config_file() {
        let err = execute(&["momentum", "-c", "/nonexistent/trailscout.ini"]).unwrap_err();
        assert_eq!(err.exit_status(), 2);
    }

    #[test]
    fn invalid_threshold_stops_before_work() {
        let dir = TempDir::new().unwrap();
        let config = write_file(dir.path(), "bad.ini", "[tight_base]\nmax_range_pct = -1\n");
        let err = execute(&["tight-base", "-c", config.to_str().unwrap()]).unwrap_err();
        assert_eq!(err.exit_status(), 2);
        assert!(err.to_string().contains("max_range_pct"));
    }

    #[test]
    fn sqlite_path_required_without_price_dir() {
        let dir = TempDir::new().unwrap();
        let config = write_file(dir.path(), "nodb.ini", "[universe]\nmin_symbols = 3\n");
        let err = execute(&["momentum", "-c", config.to_str().unwrap()]).unwrap_err();
        assert!(err.to_string().contains("[sqlite] path"));
    }
}
