#![allow(dead_code)]

use std::sync::Mutex;

use chrono::NaiveDateTime;
use tradelog::domain::error::TradelogError;
use tradelog::domain::import::ImportRecord;
use tradelog::domain::order::{Order, Side};
use tradelog::domain::trade::Trade;
use tradelog::ports::store_port::StorePort;

pub fn ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

pub fn make_order(order_id: &str, position_id: &str, side: Side, time: &str) -> Order {
    Order {
        symbol: "BTCUSDT".to_string(),
        side,
        order_type: "Market".to_string(),
        qty: 1.0,
        filled_qty: 1.0,
        limit_price: None,
        stop_price: None,
        take_profit: None,
        stop_loss: None,
        avg_fill_price: 100.0,
        update_time: ts(time),
        order_id: order_id.to_string(),
        expiry: None,
        position_id: position_id.to_string(),
        commission: 0.0,
        closed_pnl: None,
        net_closed_pnl: None,
        expiry_time: None,
    }
}

#[derive(Default)]
struct MockStoreInner {
    orders: Vec<Order>,
    trades: Vec<Trade>,
    imports: Vec<ImportRecord>,
}

/// In-memory store double mirroring the SQLite adapter's query contracts.
#[derive(Default)]
pub struct MockStore {
    inner: Mutex<MockStoreInner>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn order_count(&self) -> usize {
        self.inner.lock().unwrap().orders.len()
    }

    pub fn trade_count(&self) -> usize {
        self.inner.lock().unwrap().trades.len()
    }
}

impl StorePort for MockStore {
    fn insert_order(&self, order: &Order) -> Result<bool, TradelogError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.orders.iter().any(|o| o.order_id == order.order_id) {
            return Ok(false);
        }
        inner.orders.push(order.clone());
        Ok(true)
    }

    fn trade_exists(&self, position_id: &str) -> Result<bool, TradelogError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.trades.iter().any(|t| t.position_id == position_id))
    }

    fn insert_trade(&self, trade: &Trade) -> Result<(), TradelogError> {
        self.inner.lock().unwrap().trades.push(trade.clone());
        Ok(())
    }

    fn fetch_closed_trades(&self) -> Result<Vec<Trade>, TradelogError> {
        let inner = self.inner.lock().unwrap();
        let mut closed: Vec<Trade> = inner
            .trades
            .iter()
            .filter(|t| t.is_closed && t.pnl.is_some())
            .cloned()
            .collect();
        closed.sort_by_key(|t| t.exit_time);
        Ok(closed)
    }

    fn fetch_trades(&self) -> Result<Vec<Trade>, TradelogError> {
        let inner = self.inner.lock().unwrap();
        let mut trades = inner.trades.clone();
        // Newest exit first, open trades last.
        trades.sort_by(|a, b| match (a.exit_time, b.exit_time) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        Ok(trades)
    }

    fn record_import(
        &self,
        filename: &str,
        order_count: usize,
        trade_count: usize,
    ) -> Result<(), TradelogError> {
        self.inner.lock().unwrap().imports.push(ImportRecord {
            filename: filename.to_string(),
            imported_at: "2026-01-01 00:00:00".to_string(),
            order_count: order_count as i64,
            trade_count: trade_count as i64,
        });
        Ok(())
    }

    fn fetch_imports(&self) -> Result<Vec<ImportRecord>, TradelogError> {
        let inner = self.inner.lock().unwrap();
        let mut imports = inner.imports.clone();
        imports.reverse();
        Ok(imports)
    }

    fn clear_all(&self) -> Result<(), TradelogError> {
        let mut inner = self.inner.lock().unwrap();
        inner.orders.clear();
        inner.trades.clear();
        inner.imports.clear();
        Ok(())
    }
}

pub const CSV_HEADER: &str = "Symbol,Side,Type,Qty,Filled Qty,Limit Price,Stop Price,Take Profit,Stop Loss,Avg Fill Price,Update Time,Order ID,Expiry,Position ID,Commission,Closed P&L,Net Closed P&L,Expiry Time";

/// Two-order round trip on position P1: Buy entry, Sell exit five minutes
/// later carrying 25.0 realized P&L and -1.0 commission.
pub fn round_trip_csv() -> String {
    format!(
        "{CSV_HEADER}\n\
         BTCUSDT,Buy,Market,1,1,,,,,42000,2026-01-01 10:00:00,A,,P1,0,,,\n\
         BTCUSDT,Sell,Market,1,1,,,,,42025,2026-01-01 10:05:00,B,,P1,-1.0,25.0,24.0,\n"
    )
}
