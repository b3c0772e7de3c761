//! Integration tests for the screening pipeline and the trade ledger.
//!
//! Tests cover:
//! - Universe gate feeding per-symbol analysis
//! - Each scorer end-to-end over mock ports, with reference data joined
//! - Rerun idempotence
//! - The empty-universe degenerate case
//! - Reconciliation and FIFO matching through the ledger port
//! - SQLite store round trip through the same pipeline

mod common;

use approx::assert_relative_eq;
use common::*;
use trailscout::adapters::sqlite_adapter::SqliteAdapter;
use trailscout::adapters::tables;
use trailscout::cli::{build_universe, prepare_screen};
use trailscout::domain::config_validation::Settings;
use trailscout::domain::execution::Action;
use trailscout::domain::fifo::match_lots;
use trailscout::domain::reconcile::{reconcile, SummaryKind, DEFAULT_CLOSE_TOLERANCE};
use trailscout::domain::reference::SymbolProfile;
use trailscout::domain::scoring::{
    self, BullishScorer, MomentumScorer, TightBaseScorer, WedgeScorer,
};
use trailscout::ports::ledger_port::LedgerPort;
use trailscout::ports::report_port::ReportPort;

fn settings(min_symbols: usize) -> Settings {
    Settings {
        min_symbols,
        ..Settings::default()
    }
}

/// Three symbols over twenty days plus a straggler reporting alone on day 20.
fn market() -> MockDataPort {
    let mut tech = SymbolProfile::bare("UPP");
    tech.company_name = Some("Upward Corp".into());
    tech.sector = Some("Technology".into());

    MockDataPort::new()
        .with_bars(series_bars("TGT", &tight_closes()))
        .with_bars(series_bars("UPP", &rising_closes(20)))
        .with_bars(series_bars("DWN", &falling_closes(20)))
        .with_bars(vec![make_bar("LATE", day(20), 50.0, 500)])
        .with_profile(tech)
}

mod universe_and_analysis {
    use super::*;

    #[test]
    fn reference_date_skips_thin_days() {
        let universe = build_universe(&market(), &settings(3)).unwrap();
        assert_eq!(universe.reference_date, Some(day(19)));
        assert_eq!(universe.count(), 3);
        assert!(!universe.contains("LATE"));
    }

    #[test]
    fn analyses_cover_the_universe_in_symbol_order() {
        let screen = prepare_screen(&market(), settings(3)).unwrap();
        let symbols: Vec<&str> = screen.analyses.iter().map(|a| a.symbol()).collect();
        assert_eq!(symbols, vec!["DWN", "TGT", "UPP"]);
        for a in &screen.analyses {
            assert_eq!(a.snapshot.date, day(19));
            assert_eq!(a.series.len(), 20);
        }
    }

    #[test]
    fn common_only_drops_preferred_shares() {
        let data = market()
            .with_bars(series_bars("ABC-PA", &rising_closes(20)))
            .with_bars(series_bars("XYZ-WS", &rising_closes(20)));
        let all = build_universe(&data, &settings(3)).unwrap();
        assert_eq!(all.count(), 5);

        let common = build_universe(
            &data,
            &Settings {
                common_only: true,
                ..settings(3)
            },
        )
        .unwrap();
        assert_eq!(common.count(), 3);
        assert!(!common.contains("ABC-PA"));
    }

    #[test]
    fn store_failure_propagates() {
        let err = build_universe(&market().failing(), &settings(3)).unwrap_err();
        assert_eq!(err.exit_status(), 3);
    }
}

mod scorers_end_to_end {
    use super::*;

    #[test]
    fn momentum_keeps_positive_streaks() {
        let screen = prepare_screen(&market(), settings(3)).unwrap();
        let candidates = scoring::run(&MomentumScorer, &screen.analyses, &screen.profiles);

        let picked: Vec<(&str, f64)> = candidates.iter().map(|c| (c.symbol(), c.score)).collect();
        assert_eq!(picked, vec![("TGT", 2.0), ("UPP", 3.0)]);
    }

    #[test]
    fn tight_base_admits_only_the_consolidation() {
        let screen = prepare_screen(&market(), settings(3)).unwrap();
        let scorer = TightBaseScorer::new(screen.settings.tight_base);
        let candidates = scoring::run(&scorer, &screen.analyses, &screen.profiles);

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].symbol(), "TGT");
        assert_relative_eq!(candidates[0].metrics.range_pct_5, 1.0 / 101.0);
        assert_eq!(candidates[0].score, candidates[0].metrics.range_pct_5);
    }

    #[test]
    fn trendline_joins_reference_data() {
        let screen = prepare_screen(&market(), settings(3)).unwrap();
        let candidates = scoring::run(&BullishScorer, &screen.analyses, &screen.profiles);

        let upp = candidates.iter().find(|c| c.symbol() == "UPP").unwrap();
        assert_eq!(upp.profile.sector.as_deref(), Some("Technology"));
        assert_eq!(upp.profile.company_name.as_deref(), Some("Upward Corp"));
        assert!(upp.metrics.resistance.is_some());
        assert!(candidates.iter().all(|c| c.symbol() != "DWN"));
    }

    #[test]
    fn wedge_is_a_subset_of_trendline() {
        let screen = prepare_screen(&market(), settings(3)).unwrap();
        let trend = scoring::run(&BullishScorer, &screen.analyses, &screen.profiles);
        let wedge = scoring::run(
            &WedgeScorer::new(screen.settings.wedge),
            &screen.analyses,
            &screen.profiles,
        );
        assert!(wedge
            .iter()
            .all(|w| trend.iter().any(|t| t.symbol() == w.symbol())));
    }

    #[test]
    fn reruns_are_identical() {
        let data = market();
        let first = prepare_screen(&data, settings(3)).unwrap();
        let second = prepare_screen(&data, settings(3)).unwrap();
        assert_eq!(first.analyses, second.analyses);

        let a = scoring::run(&BullishScorer, &first.analyses, &first.profiles);
        let b = scoring::run(&BullishScorer, &second.analyses, &second.profiles);
        assert_eq!(a, b);
        assert_eq!(
            tables::candidates_table("trendline", &a),
            tables::candidates_table("trendline", &b)
        );
    }
}

mod empty_universe {
    use super::*;

    #[test]
    fn no_qualifying_date_yields_empty_results() {
        let screen = prepare_screen(&market(), settings(50)).unwrap();
        assert!(screen.universe.is_empty());
        assert_eq!(screen.universe.reference_date, None);
        assert!(screen.analyses.is_empty());

        let momentum = scoring::run(&MomentumScorer, &screen.analyses, &screen.profiles);
        assert!(momentum.is_empty());

        let report = RecordingReport::new();
        report
            .write_table(&tables::candidates_table("momentum", &momentum))
            .unwrap();
        let written = report.tables.borrow();
        assert_eq!(written.len(), 1);
        assert!(written[0].is_empty());
        assert_eq!(written[0].headers[0], "symbol");
    }

    #[test]
    fn empty_store_is_not_an_error() {
        let screen = prepare_screen(&MockDataPort::new(), settings(1)).unwrap();
        assert!(screen.analyses.is_empty());
    }
}

mod ledger {
    use super::*;

    fn ledger() -> MockLedger {
        MockLedger {
            executions: vec![
                execution("AAA", "X1", Action::Buy, 100.0, 10.0, day(0)),
                execution("AAA", "X1", Action::Sell, 100.0, 12.0, day(9)),
                execution("BBB", "X1", Action::Buy, 10.0, 50.0, day(1)),
                execution("BBB", "X1", Action::Sell, 9.5, 40.0, day(2)),
                // still open: 50 of 100 sold
                execution("CCC", "X1", Action::Buy, 100.0, 5.0, day(1)),
                execution("CCC", "X1", Action::Sell, 50.0, 6.0, day(3)),
                execution("AAA", "Z9", Action::Buy, 10.0, 20.0, day(4)),
                execution("AAA", "Z9", Action::Sell, 10.0, 22.0, day(5)),
            ],
        }
    }

    #[test]
    fn reconciliation_orders_details_then_summaries() {
        let executions = ledger().fetch_executions().unwrap();
        let report = reconcile(&executions, DEFAULT_CLOSE_TOLERANCE);

        let keys: Vec<(&str, &str)> = report
            .details
            .iter()
            .map(|t| (t.account.as_str(), t.symbol.as_str()))
            .collect();
        assert_eq!(keys, vec![("X1", "AAA"), ("X1", "BBB"), ("Z9", "AAA")]);

        let aaa = &report.details[0];
        assert_eq!(aaa.net_gain, 200.0);
        assert_eq!(aaa.pct_gain, Some(20.0));
        assert_eq!(aaa.holding_days, 9);

        let kinds: Vec<SummaryKind> = report.summary.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SummaryKind::GainsTotal,
                SummaryKind::LossesTotal,
                SummaryKind::NetTotal
            ]
        );
        // gains: 200 + 20 on 1200 cost; losses: 380 - 500 on 500 cost
        assert_eq!(report.summary[0].net_gain, 220.0);
        assert_eq!(report.summary[1].net_gain, -120.0);
        assert_eq!(report.summary[2].net_gain, 100.0);
        assert_eq!(report.summary[2].total_cost, 1700.0);

        let table = tables::reconciliation_table(&report);
        assert_eq!(table.len(), 6);
        assert_eq!(table.rows[5][0], "net total");
    }

    #[test]
    fn fifo_matches_partial_sells() {
        let lots = match_lots(&ledger().fetch_executions().unwrap());
        let ccc: Vec<_> = lots.iter().filter(|l| l.symbol == "CCC").collect();
        assert_eq!(ccc.len(), 1);
        assert_eq!(ccc[0].quantity, 50.0);
        assert_eq!(ccc[0].gain, 50.0);
        assert_eq!(tables::lots_table(&lots).len(), lots.len());
    }
}

mod sqlite_pipeline {
    use super::*;

    #[test]
    fn stored_bars_and_profiles_flow_through_screening() {
        let store = SqliteAdapter::in_memory().unwrap();
        let data = market();
        store.insert_bars(&data.bars).unwrap();
        store
            .insert_profiles(&data.profiles.values().cloned().collect::<Vec<_>>())
            .unwrap();

        let from_store = prepare_screen(&store, settings(3)).unwrap();
        let from_mock = prepare_screen(&data, settings(3)).unwrap();
        assert_eq!(from_store.universe, from_mock.universe);
        assert_eq!(from_store.analyses, from_mock.analyses);

        let candidates =
            scoring::run(&BullishScorer, &from_store.analyses, &from_store.profiles);
        let upp = candidates.iter().find(|c| c.symbol() == "UPP").unwrap();
        assert_eq!(upp.profile.sector.as_deref(), Some("Technology"));
    }
}
