//! Derived round-trip trades.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Position direction, derived from the entry order's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Long => "Long",
            Direction::Short => "Short",
        }
    }

    pub fn parse(value: &str) -> Self {
        if value == "Long" {
            Direction::Long
        } else {
            Direction::Short
        }
    }
}

/// How a closed position was exited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitType {
    #[serde(rename = "Stop Loss")]
    StopLoss,
    #[serde(rename = "Take Profit")]
    TakeProfit,
    Manual,
}

impl ExitType {
    /// Classify an exit order by its broker order type.
    pub fn from_order_type(order_type: &str) -> Self {
        match order_type {
            "Stop Loss" => ExitType::StopLoss,
            "Take Profit" => ExitType::TakeProfit,
            _ => ExitType::Manual,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExitType::StopLoss => "Stop Loss",
            ExitType::TakeProfit => "Take Profit",
            ExitType::Manual => "Manual",
        }
    }

    pub fn parse(value: &str) -> Self {
        Self::from_order_type(value)
    }
}

/// One matched round-trip: at most one per position id.
///
/// An open trade (`is_closed = false`) has null exit fields and duration.
/// Never mutated after insertion; removed only by a full data clear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub position_id: String,
    pub symbol: String,
    pub direction: Direction,
    pub entry_time: NaiveDateTime,
    pub exit_time: Option<NaiveDateTime>,
    pub entry_price: f64,
    pub exit_price: Option<f64>,
    pub qty: f64,
    /// Broker-reported gross P&L, taken verbatim from the closing order.
    pub pnl: Option<f64>,
    /// Sum of commissions across every order in the position.
    pub commission: f64,
    /// `pnl + commission` (broker reports commission as a negative amount).
    pub net_pnl: Option<f64>,
    pub duration_seconds: Option<i64>,
    pub exit_type: Option<ExitType>,
    pub is_closed: bool,
}
