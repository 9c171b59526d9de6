//! SQLite persistence adapter.

use chrono::NaiveDateTime;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;

use crate::domain::error::TradelogError;
use crate::domain::import::ImportRecord;
use crate::domain::order::Order;
use crate::domain::trade::{Direction, ExitType, Trade};
use crate::ports::config_port::ConfigPort;
use crate::ports::store_port::StorePort;

/// Timestamps are persisted as local-clock ISO text, no timezone
/// normalization: `2026-01-23T20:23:50`.
const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub struct SqliteStore {
    pool: Pool<SqliteConnectionManager>,
}

fn format_time(t: NaiveDateTime) -> String {
    t.format(ISO_FORMAT).to_string()
}

fn parse_time(column: usize, value: &str) -> Result<NaiveDateTime, rusqlite::Error> {
    NaiveDateTime::parse_from_str(value, ISO_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e))
    })
}

impl SqliteStore {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, TradelogError> {
        let db_path =
            config
                .get_string("database", "path")
                .ok_or_else(|| TradelogError::ConfigMissing {
                    section: "database".into(),
                    key: "path".into(),
                })?;

        let pool_size = config.get_int("database", "pool_size", 4) as u32;

        let manager = SqliteConnectionManager::file(&db_path);
        let pool =
            Pool::builder()
                .max_size(pool_size)
                .build(manager)
                .map_err(|e: r2d2::Error| TradelogError::Database {
                    reason: e.to_string(),
                })?;

        Ok(Self { pool })
    }

    pub fn in_memory() -> Result<Self, TradelogError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e: r2d2::Error| TradelogError::Database {
                reason: e.to_string(),
            })?;

        Ok(Self { pool })
    }

    pub fn initialize_schema(&self) -> Result<(), TradelogError> {
        let conn = self
            .pool
            .get()
            .map_err(|e: r2d2::Error| TradelogError::Database {
                reason: e.to_string(),
            })?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS orders (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                symbol TEXT NOT NULL,
                side TEXT NOT NULL,
                order_type TEXT NOT NULL,
                qty REAL NOT NULL,
                filled_qty REAL NOT NULL,
                limit_price REAL,
                stop_price REAL,
                take_profit REAL,
                stop_loss REAL,
                avg_fill_price REAL NOT NULL,
                update_time TEXT NOT NULL,
                order_id TEXT NOT NULL UNIQUE,
                expiry TEXT,
                position_id TEXT NOT NULL,
                commission REAL NOT NULL DEFAULT 0,
                closed_pnl REAL,
                net_closed_pnl REAL,
                expiry_time TEXT
            );
            CREATE TABLE IF NOT EXISTS trades (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                position_id TEXT NOT NULL UNIQUE,
                symbol TEXT NOT NULL,
                direction TEXT NOT NULL,
                entry_time TEXT NOT NULL,
                exit_time TEXT,
                entry_price REAL NOT NULL,
                exit_price REAL,
                qty REAL NOT NULL,
                pnl REAL,
                commission REAL NOT NULL DEFAULT 0,
                net_pnl REAL,
                duration_seconds INTEGER,
                exit_type TEXT,
                is_closed INTEGER NOT NULL DEFAULT 0
            );
            CREATE TABLE IF NOT EXISTS imports (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                filename TEXT NOT NULL,
                imported_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
                order_count INTEGER NOT NULL,
                trade_count INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_orders_position ON orders(position_id);
            CREATE INDEX IF NOT EXISTS idx_orders_update_time ON orders(update_time);
            CREATE INDEX IF NOT EXISTS idx_trades_exit_time ON trades(exit_time);
            CREATE INDEX IF NOT EXISTS idx_trades_symbol ON trades(symbol);",
        )
        .map_err(|e: rusqlite::Error| TradelogError::DatabaseQuery {
            reason: e.to_string(),
        })?;

        Ok(())
    }

    fn conn(
        &self,
    ) -> Result<r2d2::PooledConnection<SqliteConnectionManager>, TradelogError> {
        self.pool
            .get()
            .map_err(|e: r2d2::Error| TradelogError::Database {
                reason: e.to_string(),
            })
    }
}

fn trade_from_row(row: &rusqlite::Row<'_>) -> Result<Trade, rusqlite::Error> {
    let direction: String = row.get(2)?;
    let entry_time: String = row.get(3)?;
    let exit_time: Option<String> = row.get(4)?;
    let exit_type: Option<String> = row.get(13)?;

    Ok(Trade {
        position_id: row.get(0)?,
        symbol: row.get(1)?,
        direction: Direction::parse(&direction),
        entry_time: parse_time(3, &entry_time)?,
        exit_time: match exit_time {
            Some(t) => Some(parse_time(4, &t)?),
            None => None,
        },
        entry_price: row.get(5)?,
        exit_price: row.get(6)?,
        qty: row.get(7)?,
        pnl: row.get(8)?,
        commission: row.get(9)?,
        net_pnl: row.get(10)?,
        duration_seconds: row.get(11)?,
        exit_type: exit_type.as_deref().map(ExitType::parse),
        is_closed: row.get(12)?,
    })
}

const TRADE_COLUMNS: &str = "position_id, symbol, direction, entry_time, exit_time, \
     entry_price, exit_price, qty, pnl, commission, net_pnl, duration_seconds, \
     is_closed, exit_type";

impl SqliteStore {
    fn query_trades(&self, sql: &str) -> Result<Vec<Trade>, TradelogError> {
        let conn = self.conn()?;

        let mut stmt =
            conn.prepare(sql)
                .map_err(|e: rusqlite::Error| TradelogError::DatabaseQuery {
                    reason: e.to_string(),
                })?;

        let rows = stmt.query_map([], trade_from_row).map_err(
            |e: rusqlite::Error| TradelogError::DatabaseQuery {
                reason: e.to_string(),
            },
        )?;

        let mut trades = Vec::new();
        for row in rows {
            trades.push(
                row.map_err(|e: rusqlite::Error| TradelogError::DatabaseQuery {
                    reason: e.to_string(),
                })?,
            );
        }

        Ok(trades)
    }
}

impl StorePort for SqliteStore {
    fn insert_order(&self, order: &Order) -> Result<bool, TradelogError> {
        let conn = self.conn()?;

        let changed = conn
            .execute(
                "INSERT OR IGNORE INTO orders (
                    symbol, side, order_type, qty, filled_qty, limit_price, stop_price,
                    take_profit, stop_loss, avg_fill_price, update_time, order_id, expiry,
                    position_id, commission, closed_pnl, net_closed_pnl, expiry_time
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
                params![
                    order.symbol,
                    order.side.as_str(),
                    order.order_type,
                    order.qty,
                    order.filled_qty,
                    order.limit_price,
                    order.stop_price,
                    order.take_profit,
                    order.stop_loss,
                    order.avg_fill_price,
                    format_time(order.update_time),
                    order.order_id,
                    order.expiry,
                    order.position_id,
                    order.commission,
                    order.closed_pnl,
                    order.net_closed_pnl,
                    order.expiry_time,
                ],
            )
            .map_err(|e: rusqlite::Error| TradelogError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        Ok(changed > 0)
    }

    fn trade_exists(&self, position_id: &str) -> Result<bool, TradelogError> {
        let conn = self.conn()?;

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM trades WHERE position_id = ?1",
                params![position_id],
                |row| row.get(0),
            )
            .map_err(|e: rusqlite::Error| TradelogError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        Ok(count > 0)
    }

    fn insert_trade(&self, trade: &Trade) -> Result<(), TradelogError> {
        let conn = self.conn()?;

        conn.execute(
            "INSERT INTO trades (
                position_id, symbol, direction, entry_time, exit_time, entry_price,
                exit_price, qty, pnl, commission, net_pnl, duration_seconds, exit_type,
                is_closed
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                trade.position_id,
                trade.symbol,
                trade.direction.as_str(),
                format_time(trade.entry_time),
                trade.exit_time.map(format_time),
                trade.entry_price,
                trade.exit_price,
                trade.qty,
                trade.pnl,
                trade.commission,
                trade.net_pnl,
                trade.duration_seconds,
                trade.exit_type.map(|t| t.as_str()),
                trade.is_closed,
            ],
        )
        .map_err(|e: rusqlite::Error| TradelogError::DatabaseQuery {
            reason: e.to_string(),
        })?;

        Ok(())
    }

    fn fetch_closed_trades(&self) -> Result<Vec<Trade>, TradelogError> {
        self.query_trades(&format!(
            "SELECT {TRADE_COLUMNS} FROM trades
             WHERE is_closed = 1 AND pnl IS NOT NULL
             ORDER BY exit_time ASC"
        ))
    }

    fn fetch_trades(&self) -> Result<Vec<Trade>, TradelogError> {
        // Open trades have no exit time and sort last.
        self.query_trades(&format!(
            "SELECT {TRADE_COLUMNS} FROM trades
             ORDER BY exit_time IS NULL ASC, exit_time DESC"
        ))
    }

    fn record_import(
        &self,
        filename: &str,
        order_count: usize,
        trade_count: usize,
    ) -> Result<(), TradelogError> {
        let conn = self.conn()?;

        conn.execute(
            "INSERT INTO imports (filename, order_count, trade_count) VALUES (?1, ?2, ?3)",
            params![filename, order_count as i64, trade_count as i64],
        )
        .map_err(|e: rusqlite::Error| TradelogError::DatabaseQuery {
            reason: e.to_string(),
        })?;

        Ok(())
    }

    fn fetch_imports(&self) -> Result<Vec<ImportRecord>, TradelogError> {
        let conn = self.conn()?;

        let mut stmt = conn
            .prepare(
                "SELECT filename, imported_at, order_count, trade_count
                 FROM imports ORDER BY id DESC",
            )
            .map_err(|e: rusqlite::Error| TradelogError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        let rows = stmt
            .query_map([], |row| {
                Ok(ImportRecord {
                    filename: row.get(0)?,
                    imported_at: row.get(1)?,
                    order_count: row.get(2)?,
                    trade_count: row.get(3)?,
                })
            })
            .map_err(|e: rusqlite::Error| TradelogError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        let mut imports = Vec::new();
        for row in rows {
            imports.push(
                row.map_err(|e: rusqlite::Error| TradelogError::DatabaseQuery {
                    reason: e.to_string(),
                })?,
            );
        }

        Ok(imports)
    }

    fn clear_all(&self) -> Result<(), TradelogError> {
        let conn = self.conn()?;

        conn.execute_batch("DELETE FROM orders; DELETE FROM trades; DELETE FROM imports;")
            .map_err(|e: rusqlite::Error| TradelogError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        Ok(())
    }
}
