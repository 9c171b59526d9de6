//! Broker order records as normalized from a CSV export.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Order side as reported by the broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// `Buy` maps to itself; any other value is treated as a sell.
    pub fn parse(value: &str) -> Self {
        if value.trim() == "Buy" {
            Side::Buy
        } else {
            Side::Sell
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "Buy",
            Side::Sell => "Sell",
        }
    }
}

/// One broker order fill/update, parsed from a single CSV row.
///
/// Immutable once persisted. The order id is globally unique and is the
/// deduplication key on re-import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub symbol: String,
    pub side: Side,
    /// Broker order type: `Market`, `Limit`, `Stop Loss`, `Take Profit`, ...
    /// Kept as text since the set is open-ended.
    pub order_type: String,
    pub qty: f64,
    pub filled_qty: f64,
    pub limit_price: Option<f64>,
    pub stop_price: Option<f64>,
    pub take_profit: Option<f64>,
    pub stop_loss: Option<f64>,
    pub avg_fill_price: f64,
    pub update_time: NaiveDateTime,
    pub order_id: String,
    pub expiry: Option<String>,
    pub position_id: String,
    pub commission: f64,
    /// Broker-reported realized P&L, present only on closing orders.
    pub closed_pnl: Option<f64>,
    pub net_closed_pnl: Option<f64>,
    pub expiry_time: Option<String>,
}
