//! Trade matching: grouping raw orders into round-trip trades.

use crate::domain::error::TradelogError;
use crate::domain::order::{Order, Side};
use crate::domain::trade::{Direction, ExitType, Trade};
use crate::ports::store_port::StorePort;

/// Bucket a batch of orders by position id, preserving first-encounter
/// order of the positions themselves.
pub fn group_by_position(orders: &[Order]) -> Vec<Vec<Order>> {
    let mut keys: Vec<String> = Vec::new();
    let mut groups: std::collections::HashMap<String, Vec<Order>> =
        std::collections::HashMap::new();

    for order in orders {
        let bucket = groups.entry(order.position_id.clone()).or_insert_with(|| {
            keys.push(order.position_id.clone());
            Vec::new()
        });
        bucket.push(order.clone());
    }

    keys.into_iter()
        .filter_map(|k| groups.remove(&k))
        .collect()
}

/// Derive zero or one trade from all orders sharing a position id.
///
/// A position with no order carrying a realized P&L is skipped entirely:
/// it is still open, or a pending conditional order with no result yet.
pub fn match_position(orders: &mut [Order]) -> Option<Trade> {
    if orders.is_empty() {
        return None;
    }

    // Stable sort, ties keep encounter order.
    orders.sort_by_key(|o| o.update_time);

    let pnl_order = orders.iter().find(|o| o.closed_pnl.is_some())?;
    let pnl = pnl_order.closed_pnl;

    // Chronologically earliest order is the entry.
    let entry = &orders[0];
    let direction = match entry.side {
        Side::Buy => Direction::Long,
        Side::Sell => Direction::Short,
    };

    let closing_side = match direction {
        Direction::Long => Side::Sell,
        Direction::Short => Side::Buy,
    };

    // First order in time order that realized P&L or flipped the position.
    let exit = orders
        .iter()
        .find(|o| o.closed_pnl.is_some() || o.side == closing_side);

    let commission: f64 = orders.iter().map(|o| o.commission).sum();

    // Broker clock skew can make this negative or zero; taken literally.
    let duration_seconds = exit.map(|e| (e.update_time - entry.update_time).num_seconds());

    Some(Trade {
        position_id: entry.position_id.clone(),
        symbol: entry.symbol.clone(),
        direction,
        entry_time: entry.update_time,
        exit_time: exit.map(|e| e.update_time),
        entry_price: entry.avg_fill_price,
        exit_price: exit.map(|e| e.avg_fill_price),
        qty: entry.qty,
        pnl,
        commission,
        net_pnl: pnl.map(|p| p + commission),
        duration_seconds,
        exit_type: exit.map(|e| ExitType::from_order_type(&e.order_type)),
        is_closed: exit.is_some(),
    })
}

/// Match every position in a batch and persist the resulting trades.
///
/// Insertion is idempotent per position id: a position that already has a
/// recorded trade is skipped, never duplicated or updated. Returns the
/// count of newly inserted trades.
pub fn match_trades(store: &dyn StorePort, orders: &[Order]) -> Result<usize, TradelogError> {
    let mut inserted = 0;

    for mut group in group_by_position(orders) {
        let Some(trade) = match_position(&mut group) else {
            continue;
        };

        if store.trade_exists(&trade.position_id)? {
            continue;
        }

        store.insert_trade(&trade)?;
        inserted += 1;
    }

    Ok(inserted)
}
