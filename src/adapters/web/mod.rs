//! Web server adapter.
//!
//! JSON API consumed by the dashboard frontend: CSV upload, trade list,
//! statistics, import history and data clearing.

mod error;
mod handlers;

pub use error::ApiError;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::ports::store_port::StorePort;

pub struct AppState {
    pub store: Arc<dyn StorePort + Send + Sync>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/upload", post(handlers::upload))
        .route("/trades", get(handlers::trades))
        .route("/stats", get(handlers::stats))
        .route("/imports", get(handlers::imports))
        .route("/clear", post(handlers::clear))
        .with_state(Arc::new(state))
}
