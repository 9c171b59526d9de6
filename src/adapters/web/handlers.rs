//! HTTP request handlers for the web adapter.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, State},
};
use serde::Serialize;

use crate::adapters::csv_import;
use crate::domain::import::{import_orders, ImportRecord};
use crate::domain::stats::TradingStats;
use crate::domain::trade::Trade;

use super::{ApiError, AppState};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub order_count: usize,
    pub trade_count: usize,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub success: bool,
    pub message: String,
}

/// `POST /upload` — multipart form with a `file` field holding the CSV.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.to_string()))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or("upload.csv").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(e.to_string()))?;
            file = Some((filename, bytes.to_vec()));
            break;
        }
    }

    let Some((filename, bytes)) = file else {
        return Err(ApiError::bad_request("No file provided"));
    };

    let orders = csv_import::read_orders(bytes.as_slice())?;
    let summary = import_orders(state.store.as_ref(), &orders, &filename)?;

    tracing::info!(
        %filename,
        orders = summary.order_count,
        trades = summary.trade_count,
        "import complete"
    );

    Ok(Json(UploadResponse {
        success: true,
        order_count: summary.order_count,
        trade_count: summary.trade_count,
        message: format!(
            "Imported {} orders and matched {} trades",
            summary.order_count, summary.trade_count
        ),
    }))
}

/// `GET /trades` — every trade, newest exit first, open trades last.
pub async fn trades(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Trade>>, ApiError> {
    Ok(Json(state.store.fetch_trades()?))
}

/// `GET /stats` — summary metrics over the closed-trade set.
pub async fn stats(State(state): State<Arc<AppState>>) -> Result<Json<TradingStats>, ApiError> {
    let closed = state.store.fetch_closed_trades()?;
    Ok(Json(TradingStats::compute(&closed)))
}

/// `GET /imports` — the upload audit log, most recent first.
pub async fn imports(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ImportRecord>>, ApiError> {
    Ok(Json(state.store.fetch_imports()?))
}

/// `POST /clear` — delete all orders, trades and import records.
pub async fn clear(State(state): State<Arc<AppState>>) -> Result<Json<ClearResponse>, ApiError> {
    state.store.clear_all()?;
    tracing::warn!("all data cleared");
    Ok(Json(ClearResponse {
        success: true,
        message: "All data cleared".to_string(),
    }))
}
