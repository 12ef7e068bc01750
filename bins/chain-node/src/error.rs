//! Top-level error aggregation and the HTTP status mapping.
//!
//! Each crate keeps its own closed `thiserror` enum
//! ([`chain_core::error::EntityError`], [`chain_engine::EngineError`],
//! [`chain_store::StoreError`]); this binary aggregates them once, at the
//! HTTP boundary, into the status codes assigned to each error kind.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use chain_core::error::EntityError;
use chain_engine::EngineError;
use chain_store::StoreError;

#[derive(Error, Debug)]
pub enum ChainError {
    #[error(transparent)]
    Entity(#[from] EntityError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0} not found")]
    NotFound(String),
}

impl IntoResponse for ChainError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ChainError::Entity(_) | ChainError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ChainError::Engine(EngineError::Store(_)) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
            ChainError::Engine(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ChainError::Store(StoreError::NotFound { .. }) => (StatusCode::NOT_FOUND, self.to_string()),
            ChainError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
            ChainError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %message, "request failed");
        } else {
            warn!(status = status.as_u16(), error = %message, "request rejected");
        }
        (status, Json(json!({ "error": message }))).into_response()
    }
}
