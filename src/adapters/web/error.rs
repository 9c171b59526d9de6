//! JSON error responses for the web adapter.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::domain::error::TradelogError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl From<TradelogError> for ApiError {
    fn from(err: TradelogError) -> Self {
        match err {
            TradelogError::CsvParse { reason } => {
                Self::bad_request("CSV parsing error").with_details(reason)
            }
            err @ (TradelogError::ConfigParse { .. }
            | TradelogError::ConfigMissing { .. }
            | TradelogError::ConfigInvalid { .. }) => Self::bad_request(err.to_string()),
            other => Self::internal("Failed to process request").with_details(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.message,
            "details": self.details,
        });
        (self.status, Json(body)).into_response()
    }
}
