//! End-to-end import pipeline tests: CSV text through parsing, matching
//! and persistence to statistics, over both the mock store and the real
//! SQLite adapter.

mod common;

use approx::assert_relative_eq;
use common::*;
use tradelog::adapters::csv_import::read_orders;
use tradelog::adapters::sqlite_store::SqliteStore;
use tradelog::domain::import::import_orders;
use tradelog::domain::order::Side;
use tradelog::domain::stats::TradingStats;
use tradelog::domain::trade::{Direction, ExitType};
use tradelog::ports::store_port::StorePort;

fn sqlite_store() -> SqliteStore {
    let store = SqliteStore::in_memory().unwrap();
    store.initialize_schema().unwrap();
    store
}

mod round_trip_import {
    use super::*;

    #[test]
    fn csv_to_matched_trade_end_to_end() {
        let store = sqlite_store();
        let orders = read_orders(round_trip_csv().as_bytes()).unwrap();
        assert_eq!(orders.len(), 2);

        let summary = import_orders(&store, &orders, "export.csv").unwrap();
        assert_eq!(summary.order_count, 2);
        assert_eq!(summary.trade_count, 1);

        let trades = store.fetch_trades().unwrap();
        assert_eq!(trades.len(), 1);
        let trade = &trades[0];
        assert_eq!(trade.position_id, "P1");
        assert_eq!(trade.direction, Direction::Long);
        assert_eq!(trade.entry_time, ts("2026-01-01 10:00:00"));
        assert_eq!(trade.exit_time, Some(ts("2026-01-01 10:05:00")));
        assert_eq!(trade.pnl, Some(25.0));
        assert_eq!(trade.net_pnl, Some(24.0));
        assert_eq!(trade.duration_seconds, Some(300));
        assert_eq!(trade.exit_type, Some(ExitType::Manual));
        assert!(trade.is_closed);
    }

    #[test]
    fn reimport_grows_nothing() {
        let store = sqlite_store();
        let orders = read_orders(round_trip_csv().as_bytes()).unwrap();

        let first = import_orders(&store, &orders, "export.csv").unwrap();
        assert_eq!(first.order_count, 2);
        assert_eq!(first.trade_count, 1);

        let second = import_orders(&store, &orders, "export.csv").unwrap();
        assert_eq!(second.order_count, 0);
        assert_eq!(second.trade_count, 0);

        assert_eq!(store.fetch_trades().unwrap().len(), 1);
        // Both uploads are still audited.
        assert_eq!(store.fetch_imports().unwrap().len(), 2);
    }

    #[test]
    fn position_without_realized_pnl_produces_no_trade() {
        let store = sqlite_store();
        let csv = format!(
            "{CSV_HEADER}\n\
             BTCUSDT,Buy,Limit,1,0,41000,,,,0,2026-01-01 10:00:00,A,,P1,0,,,\n\
             BTCUSDT,Sell,Take Profit,1,0,,,43000,,0,2026-01-01 10:00:01,B,,P1,0,,,\n"
        );
        let orders = read_orders(csv.as_bytes()).unwrap();

        let summary = import_orders(&store, &orders, "pending.csv").unwrap();
        assert_eq!(summary.order_count, 2);
        assert_eq!(summary.trade_count, 0);
        assert!(store.fetch_trades().unwrap().is_empty());
    }

    #[test]
    fn rows_missing_symbol_or_order_id_are_not_counted() {
        let store = sqlite_store();
        let csv = format!(
            "{CSV_HEADER}\n\
             ,Buy,Market,1,1,,,,,100,2026-01-01 10:00:00,A,,P1,0,,,\n\
             BTCUSDT,Buy,Market,1,1,,,,,100,2026-01-01 10:00:00,,,P1,0,,,\n\
             BTCUSDT,Buy,Market,1,1,,,,,100,2026-01-01 10:00:00,C,,P1,0,5.0,,\n"
        );
        let orders = read_orders(csv.as_bytes()).unwrap();
        assert_eq!(orders.len(), 1);

        let summary = import_orders(&store, &orders, "noisy.csv").unwrap();
        assert_eq!(summary.order_count, 1);
        assert_eq!(summary.trade_count, 1);
    }

    #[test]
    fn stop_loss_exit_is_classified() {
        let store = sqlite_store();
        let csv = format!(
            "{CSV_HEADER}\n\
             ETHUSDT,Sell,Market,2,2,,,,,2500,2026-02-01 09:00:00,A,,P9,-0.5,,,\n\
             ETHUSDT,Buy,Stop Loss,2,2,,,,,2550,2026-02-01 09:30:00,B,,P9,-0.5,-100.0,-101.0,\n"
        );
        let orders = read_orders(csv.as_bytes()).unwrap();
        import_orders(&store, &orders, "sl.csv").unwrap();

        let trade = &store.fetch_trades().unwrap()[0];
        assert_eq!(trade.direction, Direction::Short);
        assert_eq!(trade.exit_type, Some(ExitType::StopLoss));
        assert_eq!(trade.pnl, Some(-100.0));
        assert_relative_eq!(trade.commission, -1.0);
        assert_eq!(trade.net_pnl, Some(-101.0));
    }
}

mod stats_over_store {
    use super::*;

    #[test]
    fn stats_from_imported_trades() {
        let store = sqlite_store();
        let csv = format!(
            "{CSV_HEADER}\n\
             BTCUSDT,Buy,Market,1,1,,,,,100,2026-01-01 10:00:00,A1,,P1,0,,,\n\
             BTCUSDT,Sell,Market,1,1,,,,,200,2026-01-01 11:00:00,A2,,P1,0,100.0,100.0,\n\
             BTCUSDT,Buy,Market,1,1,,,,,200,2026-01-02 10:00:00,B1,,P2,0,,,\n\
             BTCUSDT,Sell,Market,1,1,,,,,50,2026-01-02 11:00:00,B2,,P2,0,-150.0,-150.0,\n\
             ETHUSDT,Buy,Market,1,1,,,,,50,2026-01-03 10:00:00,C1,,P3,0,,,\n\
             ETHUSDT,Sell,Market,1,1,,,,,100,2026-01-03 11:00:00,C2,,P3,0,50.0,50.0,\n"
        );
        let orders = read_orders(csv.as_bytes()).unwrap();
        import_orders(&store, &orders, "history.csv").unwrap();

        let closed = store.fetch_closed_trades().unwrap();
        let stats = TradingStats::compute(&closed);

        assert_eq!(stats.total_trades, 3);
        assert_eq!(stats.winning_trades, 2);
        assert_eq!(stats.losing_trades, 1);
        let curve: Vec<f64> = stats.pnl_curve.iter().map(|p| p.pnl).collect();
        assert_eq!(curve, vec![100.0, -50.0, 0.0]);
        assert_relative_eq!(stats.max_equity, 100.0);
        assert_relative_eq!(stats.min_equity, -50.0);
        assert_relative_eq!(stats.avg_trades_per_day, 1.0);
        assert_eq!(stats.symbol_stats.len(), 2);
    }

    #[test]
    fn empty_store_yields_zero_stats() {
        let store = sqlite_store();
        let stats = TradingStats::compute(&store.fetch_closed_trades().unwrap());
        assert_eq!(stats, TradingStats::default());
    }
}

mod mock_store_parity {
    use super::*;

    #[test]
    fn import_counts_match_sqlite_behaviour() {
        let mock = MockStore::new();
        let orders = read_orders(round_trip_csv().as_bytes()).unwrap();

        let summary = import_orders(&mock, &orders, "export.csv").unwrap();
        assert_eq!(summary.order_count, 2);
        assert_eq!(summary.trade_count, 1);
        assert_eq!(mock.order_count(), 2);
        assert_eq!(mock.trade_count(), 1);

        let again = import_orders(&mock, &orders, "export.csv").unwrap();
        assert_eq!(again.order_count, 0);
        assert_eq!(again.trade_count, 0);
        assert_eq!(mock.trade_count(), 1);
    }

    #[test]
    fn duplicate_order_ids_within_one_batch_insert_once() {
        let mock = MockStore::new();
        let orders = vec![
            make_order("A", "P1", Side::Buy, "2026-01-01 10:00:00"),
            make_order("A", "P1", Side::Buy, "2026-01-01 10:00:00"),
        ];
        let summary = import_orders(&mock, &orders, "dup.csv").unwrap();
        assert_eq!(summary.order_count, 1);
    }
}
