//! Portfolio statistics over the closed-trade set.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::trade::Trade;

/// One point of the cumulative equity curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PnlPoint {
    pub time: NaiveDateTime,
    pub pnl: f64,
    pub symbol: String,
}

/// Win/loss/P&L accumulation for a single symbol.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SymbolStats {
    pub wins: usize,
    pub losses: usize,
    pub pnl: f64,
}

/// Summary metrics over all closed trades, in exit-time order.
///
/// Every division-by-zero case is defined: an empty trade set yields the
/// all-zero default, never an error. `profit_factor` is `f64::INFINITY`
/// for an all-winning set (serde_json renders that as `null`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradingStats {
    pub total_trades: usize,
    pub avg_trades_per_day: f64,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub win_rate: f64,
    pub total_pnl: f64,
    pub total_net_pnl: f64,
    pub max_profit: f64,
    pub max_loss: f64,
    pub avg_profit: f64,
    pub avg_loss: f64,
    pub max_win_streak: usize,
    pub max_lose_streak: usize,
    pub current_win_streak: usize,
    pub current_lose_streak: usize,
    pub avg_duration: f64,
    pub min_duration: i64,
    pub max_duration: i64,
    pub profit_factor: f64,
    pub max_equity: f64,
    pub min_equity: f64,
    pub pnl_curve: Vec<PnlPoint>,
    pub symbol_stats: BTreeMap<String, SymbolStats>,
}

impl TradingStats {
    /// Reduce closed trades into summary metrics.
    ///
    /// Expects trades sorted ascending by exit time; trades that are not
    /// closed or carry no gross P&L are ignored.
    pub fn compute(trades: &[Trade]) -> Self {
        let closed: Vec<&Trade> = trades
            .iter()
            .filter(|t| t.is_closed && t.pnl.is_some() && t.exit_time.is_some())
            .collect();

        if closed.is_empty() {
            return Self::default();
        }

        let total_trades = closed.len();

        let mut winning_trades = 0usize;
        let mut losing_trades = 0usize;
        let mut total_pnl = 0.0;
        let mut total_net_pnl = 0.0;
        let mut max_profit = 0.0_f64;
        let mut max_loss = 0.0_f64;
        let mut gross_profit = 0.0;
        let mut gross_loss = 0.0;

        let mut current_win_streak = 0usize;
        let mut current_lose_streak = 0usize;
        let mut max_win_streak = 0usize;
        let mut max_lose_streak = 0usize;

        let mut cumulative = 0.0;
        let mut max_equity = 0.0_f64;
        let mut min_equity = 0.0_f64;
        let mut pnl_curve = Vec::with_capacity(total_trades);

        let mut symbol_stats: BTreeMap<String, SymbolStats> = BTreeMap::new();
        let mut trading_days: std::collections::HashSet<chrono::NaiveDate> =
            std::collections::HashSet::new();

        let mut durations: Vec<i64> = Vec::new();

        for trade in &closed {
            let pnl = trade.pnl.unwrap_or(0.0);
            let exit_time = trade.exit_time.unwrap_or(trade.entry_time);

            total_pnl += pnl;
            total_net_pnl += trade.net_pnl.unwrap_or(0.0);
            max_profit = max_profit.max(pnl);
            max_loss = max_loss.min(pnl);

            if pnl > 0.0 {
                gross_profit += pnl;
                winning_trades += 1;
                current_win_streak += 1;
                current_lose_streak = 0;
                max_win_streak = max_win_streak.max(current_win_streak);
            } else if pnl < 0.0 {
                gross_loss += pnl.abs();
                losing_trades += 1;
                current_lose_streak += 1;
                current_win_streak = 0;
                max_lose_streak = max_lose_streak.max(current_lose_streak);
            } else {
                // A break-even trade interrupts both streaks.
                current_win_streak = 0;
                current_lose_streak = 0;
            }

            cumulative += trade.net_pnl.or(trade.pnl).unwrap_or(0.0);
            max_equity = max_equity.max(cumulative);
            min_equity = min_equity.min(cumulative);
            pnl_curve.push(PnlPoint {
                time: exit_time,
                pnl: cumulative,
                symbol: trade.symbol.clone(),
            });

            let entry = symbol_stats.entry(trade.symbol.clone()).or_default();
            entry.pnl += pnl;
            if pnl > 0.0 {
                entry.wins += 1;
            } else if pnl < 0.0 {
                entry.losses += 1;
            }

            trading_days.insert(exit_time.date());

            if let Some(d) = trade.duration_seconds {
                durations.push(d);
            }
        }

        let win_rate = winning_trades as f64 / total_trades as f64 * 100.0;

        let avg_profit = if winning_trades > 0 {
            gross_profit / winning_trades as f64
        } else {
            0.0
        };
        let avg_loss = if losing_trades > 0 {
            -gross_loss / losing_trades as f64
        } else {
            0.0
        };

        let profit_factor = if gross_loss > 0.0 {
            gross_profit / gross_loss
        } else if gross_profit > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        let avg_trades_per_day = if trading_days.is_empty() {
            0.0
        } else {
            total_trades as f64 / trading_days.len() as f64
        };

        let (avg_duration, min_duration, max_duration) = if durations.is_empty() {
            (0.0, 0, 0)
        } else {
            (
                durations.iter().sum::<i64>() as f64 / durations.len() as f64,
                *durations.iter().min().unwrap_or(&0),
                *durations.iter().max().unwrap_or(&0),
            )
        };

        TradingStats {
            total_trades,
            avg_trades_per_day,
            winning_trades,
            losing_trades,
            win_rate,
            total_pnl,
            total_net_pnl,
            max_profit,
            max_loss,
            avg_profit,
            avg_loss,
            max_win_streak,
            max_lose_streak,
            current_win_streak,
            current_lose_streak,
            avg_duration,
            min_duration,
            max_duration,
            profit_factor,
            max_equity,
            min_equity,
            pnl_curve,
            symbol_stats,
        }
    }
}
