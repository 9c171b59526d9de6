//! Persistence gateway port trait.
//!
//! The store exclusively owns persisted orders, trades and import records;
//! domain code only ever appends through this trait. Constructed once at
//! process start and injected, never reached through global state.

use crate::domain::error::TradelogError;
use crate::domain::import::ImportRecord;
use crate::domain::order::Order;
use crate::domain::trade::Trade;

pub trait StorePort {
    /// Insert an order unless one with the same order id already exists.
    /// Returns whether a row was actually written.
    fn insert_order(&self, order: &Order) -> Result<bool, TradelogError>;

    /// Whether a trade has already been recorded for this position id.
    fn trade_exists(&self, position_id: &str) -> Result<bool, TradelogError>;

    fn insert_trade(&self, trade: &Trade) -> Result<(), TradelogError>;

    /// Closed trades with a gross P&L, ascending by exit time.
    fn fetch_closed_trades(&self) -> Result<Vec<Trade>, TradelogError>;

    /// All trades, descending by exit time; open trades (null exit) last.
    fn fetch_trades(&self) -> Result<Vec<Trade>, TradelogError>;

    fn record_import(
        &self,
        filename: &str,
        order_count: usize,
        trade_count: usize,
    ) -> Result<(), TradelogError>;

    /// The import audit log, most recent first.
    fn fetch_imports(&self) -> Result<Vec<ImportRecord>, TradelogError>;

    /// Delete all orders, trades and import records.
    fn clear_all(&self) -> Result<(), TradelogError>;
}
