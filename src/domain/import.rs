//! Import orchestration: persist orders, match trades, record the upload.

use serde::{Deserialize, Serialize};

use crate::domain::error::TradelogError;
use crate::domain::matcher;
use crate::domain::order::Order;
use crate::ports::store_port::StorePort;

/// Counts reported back to the caller after one import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub order_count: usize,
    pub trade_count: usize,
}

/// One row of the append-only import audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRecord {
    pub filename: String,
    pub imported_at: String,
    pub order_count: i64,
    pub trade_count: i64,
}

/// Import one parsed batch: insert orders (duplicates by order id are
/// ignored), match and insert trades (duplicates by position id are
/// ignored), then append the audit row. Re-importing an overlapping
/// export is safe and reports zero growth.
pub fn import_orders(
    store: &dyn StorePort,
    orders: &[Order],
    filename: &str,
) -> Result<ImportSummary, TradelogError> {
    let mut order_count = 0;
    for order in orders {
        if store.insert_order(order)? {
            order_count += 1;
        }
    }

    let trade_count = matcher::match_trades(store, orders)?;

    store.record_import(filename, order_count, trade_count)?;

    Ok(ImportSummary {
        order_count,
        trade_count,
    })
}
