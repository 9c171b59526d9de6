//! Broker CSV export parsing.
//!
//! Normalizes the loosely-typed export into strict [`Order`] records at
//! the boundary. Broker exports are noisy: unparsable numerics fall back
//! to `0` (required fields) or `null` (optional fields), and rows missing
//! a symbol, order id or usable timestamp are dropped without error.
//! Structural CSV failures abort the whole import.

use std::io::Read;
use std::path::Path;

use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::domain::error::TradelogError;
use crate::domain::order::{Order, Side};

const UPDATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One raw CSV row, column names as the broker writes them.
#[derive(Debug, Default, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "Symbol", default)]
    pub symbol: String,
    #[serde(rename = "Side", default)]
    pub side: String,
    #[serde(rename = "Type", default)]
    pub order_type: String,
    #[serde(rename = "Qty", default)]
    pub qty: String,
    #[serde(rename = "Filled Qty", default)]
    pub filled_qty: String,
    #[serde(rename = "Limit Price", default)]
    pub limit_price: String,
    #[serde(rename = "Stop Price", default)]
    pub stop_price: String,
    #[serde(rename = "Take Profit", default)]
    pub take_profit: String,
    #[serde(rename = "Stop Loss", default)]
    pub stop_loss: String,
    #[serde(rename = "Avg Fill Price", default)]
    pub avg_fill_price: String,
    #[serde(rename = "Update Time", default)]
    pub update_time: String,
    #[serde(rename = "Order ID", default)]
    pub order_id: String,
    #[serde(rename = "Expiry", default)]
    pub expiry: String,
    #[serde(rename = "Position ID", default)]
    pub position_id: String,
    #[serde(rename = "Commission", default)]
    pub commission: String,
    #[serde(rename = "Closed P&L", default)]
    pub closed_pnl: String,
    #[serde(rename = "Net Closed P&L", default)]
    pub net_closed_pnl: String,
    #[serde(rename = "Expiry Time", default)]
    pub expiry_time: String,
}

fn required_f64(value: &str) -> f64 {
    value.trim().parse().unwrap_or(0.0)
}

fn optional_f64(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse().ok()
}

fn optional_string(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Normalize one raw row into an [`Order`].
///
/// Returns `None` for rows missing `Symbol` or `Order ID`, or whose
/// `Update Time` is not `YYYY-MM-DD HH:MM:SS`. Such rows are expected
/// export noise, not errors.
pub fn parse_record(raw: &RawRecord) -> Option<Order> {
    let symbol = raw.symbol.trim();
    let order_id = raw.order_id.trim();
    if symbol.is_empty() || order_id.is_empty() {
        return None;
    }

    let update_time =
        NaiveDateTime::parse_from_str(raw.update_time.trim(), UPDATE_TIME_FORMAT).ok()?;

    Some(Order {
        symbol: symbol.to_string(),
        side: Side::parse(&raw.side),
        order_type: raw.order_type.trim().to_string(),
        qty: required_f64(&raw.qty),
        filled_qty: required_f64(&raw.filled_qty),
        limit_price: optional_f64(&raw.limit_price),
        stop_price: optional_f64(&raw.stop_price),
        take_profit: optional_f64(&raw.take_profit),
        stop_loss: optional_f64(&raw.stop_loss),
        avg_fill_price: required_f64(&raw.avg_fill_price),
        update_time,
        order_id: order_id.to_string(),
        expiry: optional_string(&raw.expiry),
        position_id: raw.position_id.trim().to_string(),
        commission: required_f64(&raw.commission),
        closed_pnl: optional_f64(&raw.closed_pnl),
        net_closed_pnl: optional_f64(&raw.net_closed_pnl),
        expiry_time: optional_string(&raw.expiry_time),
    })
}

/// Read a whole CSV export into orders.
///
/// Headers are trimmed before matching. A structural CSV error fails the
/// whole batch; no orders from a malformed file are returned.
pub fn read_orders<R: Read>(reader: R) -> Result<Vec<Order>, TradelogError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let mut orders = Vec::new();
    for result in rdr.deserialize::<RawRecord>() {
        let raw = result.map_err(|e| TradelogError::CsvParse {
            reason: e.to_string(),
        })?;
        if let Some(order) = parse_record(&raw) {
            orders.push(order);
        }
    }

    Ok(orders)
}

pub fn read_orders_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Order>, TradelogError> {
    let file = std::fs::File::open(path)?;
    read_orders(file)
}
