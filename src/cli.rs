//! CLI definition and dispatch.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use crate::adapters::csv_import;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::sqlite_store::SqliteStore;
use crate::domain::error::TradelogError;
use crate::domain::import::import_orders;
use crate::domain::stats::TradingStats;
use crate::ports::config_port::ConfigPort;
use crate::ports::store_port::StorePort;

#[derive(Parser, Debug)]
#[command(name = "tradelog", about = "Broker CSV import and trade analytics")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Import a broker order CSV export
    Import {
        /// CSV file to import
        file: PathBuf,
        #[arg(short, long, default_value = "tradelog.ini")]
        config: PathBuf,
    },
    /// Print summary statistics over closed trades
    Stats {
        #[arg(short, long, default_value = "tradelog.ini")]
        config: PathBuf,
    },
    /// List matched trades, newest exit first
    Trades {
        #[arg(short, long, default_value = "tradelog.ini")]
        config: PathBuf,
    },
    /// Show the import audit log
    History {
        #[arg(short, long, default_value = "tradelog.ini")]
        config: PathBuf,
    },
    /// Delete all orders, trades and import records
    Clear {
        #[arg(short, long, default_value = "tradelog.ini")]
        config: PathBuf,
    },
    /// Start the web server
    Serve {
        #[arg(short, long, default_value = "tradelog.ini")]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Import { file, config } => run_import(&file, &config),
        Command::Stats { config } => run_stats(&config),
        Command::Trades { config } => run_trades(&config),
        Command::History { config } => run_history(&config),
        Command::Clear { config } => run_clear(&config),
        Command::Serve { config } => run_serve(&config),
    }
}

fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = TradelogError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn open_store(config_path: &PathBuf) -> Result<SqliteStore, ExitCode> {
    let config = load_config(config_path)?;
    let store = SqliteStore::from_config(&config).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })?;
    store.initialize_schema().map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })?;
    Ok(store)
}

fn run_import(file: &PathBuf, config_path: &PathBuf) -> ExitCode {
    let store = match open_store(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };

    eprintln!("Reading {}", file.display());
    let orders = match csv_import::read_orders_from_path(file) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    eprintln!("Parsed {} orders", orders.len());

    let filename = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string());

    match import_orders(&store, &orders, &filename) {
        Ok(summary) => {
            println!(
                "Imported {} orders and matched {} trades",
                summary.order_count, summary.trade_count
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_stats(config_path: &PathBuf) -> ExitCode {
    let store = match open_store(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let closed = match store.fetch_closed_trades() {
        Ok(t) => t,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let stats = TradingStats::compute(&closed);

    println!("Trades:          {}", stats.total_trades);
    println!(
        "Win rate:        {:.1}% ({} won / {} lost)",
        stats.win_rate, stats.winning_trades, stats.losing_trades
    );
    println!("Total P&L:       {:.2}", stats.total_pnl);
    println!("Total net P&L:   {:.2}", stats.total_net_pnl);
    println!("Profit factor:   {:.2}", stats.profit_factor);
    println!(
        "Best / worst:    {:.2} / {:.2}",
        stats.max_profit, stats.max_loss
    );
    println!(
        "Avg win / loss:  {:.2} / {:.2}",
        stats.avg_profit, stats.avg_loss
    );
    println!(
        "Streaks:         {} wins max, {} losses max",
        stats.max_win_streak, stats.max_lose_streak
    );
    println!("Trades per day:  {:.2}", stats.avg_trades_per_day);
    println!(
        "Equity range:    {:.2} .. {:.2}",
        stats.min_equity, stats.max_equity
    );

    if !stats.symbol_stats.is_empty() {
        println!();
        println!("Per symbol:");
        for (symbol, s) in &stats.symbol_stats {
            println!(
                "  {symbol:<12} {:>3}W {:>3}L  {:.2}",
                s.wins, s.losses, s.pnl
            );
        }
    }

    ExitCode::SUCCESS
}

fn run_trades(config_path: &PathBuf) -> ExitCode {
    let store = match open_store(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let trades = match store.fetch_trades() {
        Ok(t) => t,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    for trade in &trades {
        let exit = trade
            .exit_time
            .map(|t| t.format("%Y-%m-%dT%H:%M:%S").to_string())
            .unwrap_or_else(|| "open".to_string());
        let net = trade
            .net_pnl
            .map(|p| format!("{p:.2}"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<12} {:<5} {} -> {}  net {}",
            trade.symbol,
            trade.direction.as_str(),
            trade.entry_time.format("%Y-%m-%dT%H:%M:%S"),
            exit,
            net
        );
    }
    eprintln!("{} trades", trades.len());

    ExitCode::SUCCESS
}

fn run_history(config_path: &PathBuf) -> ExitCode {
    let store = match open_store(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let imports = match store.fetch_imports() {
        Ok(i) => i,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    for record in &imports {
        println!(
            "{}  {:<30} {} orders, {} trades",
            record.imported_at, record.filename, record.order_count, record.trade_count
        );
    }
    eprintln!("{} imports", imports.len());

    ExitCode::SUCCESS
}

fn run_clear(config_path: &PathBuf) -> ExitCode {
    let store = match open_store(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };

    match store.clear_all() {
        Ok(()) => {
            println!("All data cleared");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_serve(config_path: &PathBuf) -> ExitCode {
    use std::net::SocketAddr;
    use std::sync::Arc;

    use crate::adapters::web::{AppState, build_router};

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let store = match SqliteStore::from_config(&config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    if let Err(e) = store.initialize_schema() {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let addr: SocketAddr = config
        .get_string("server", "listen")
        .unwrap_or_else(|| "127.0.0.1:3000".to_string())
        .parse()
        .unwrap_or_else(|_| "127.0.0.1:3000".parse().expect("valid fallback address"));

    let state = AppState {
        store: Arc::new(store),
    };
    let router = build_router(state);

    tracing::info!("listening on {addr}");

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(1);
        }
    };

    let result: Result<(), std::io::Error> = runtime.block_on(async {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, router).await
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(1)
        }
    }
}
