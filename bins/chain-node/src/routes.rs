//! The REST request surface as an `axum` router
//! (`Router::new().route(...).layer(cors).with_state(...)`).

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use chain_engine::{admit_to_mempool, create_block, delete_block};

use crate::dto::{BlockRequest, TransactionRequest};
use crate::error::ChainError;
use crate::reassemble::{block_from_record, hash_from_query, transaction_from_record};
use crate::AppState;

pub fn router(state: AppState) -> Router {
    use tower_http::cors::{Any, CorsLayer};
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/block", post(submit_block))
        .route("/block/current", get(get_current_block).delete(delete_current_block))
        .route("/transaction", get(get_transaction))
        .route("/transaction/mempool", post(submit_mempool_transaction))
        .route("/transaction/mempool/list", get(list_mempool_transactions))
        .layer(cors)
        .with_state(state)
}

async fn submit_block(
    State(state): State<AppState>,
    Json(request): Json<BlockRequest>,
) -> Result<impl IntoResponse, ChainError> {
    let block = request.into_block()?;
    let accepted = create_block(state.store.as_ref(), &state.engine_config, block)?;
    info!(height = accepted.height, hash = %accepted.hash, "block accepted");
    Ok((StatusCode::CREATED, Json(accepted)))
}

async fn get_current_block(State(state): State<AppState>) -> Result<impl IntoResponse, ChainError> {
    let tip = state.store.get_tip()?.ok_or_else(|| ChainError::NotFound("current block".to_string()))?;
    let block = block_from_record(state.store.as_ref(), tip)?;
    Ok(Json(block))
}

async fn delete_current_block(State(state): State<AppState>) -> Result<impl IntoResponse, ChainError> {
    let tip =
        state.store.get_tip()?.ok_or_else(|| ChainError::BadRequest("no current block to delete".to_string()))?;
    delete_block(state.store.as_ref(), &tip.hash)?;
    info!(hash = %tip.hash, "block deleted from tip");
    Ok(Json(json!(true)))
}

#[derive(Debug, Deserialize)]
struct TransactionQuery {
    txid: String,
}

async fn get_transaction(
    State(state): State<AppState>,
    Query(query): Query<TransactionQuery>,
) -> Result<impl IntoResponse, ChainError> {
    let txid = hash_from_query(&query.txid)?;
    // Deliberately 400, not 404, for a missing txid.
    let record = state
        .store
        .get_transaction(&txid)?
        .ok_or_else(|| ChainError::BadRequest(format!("transaction {} not found", query.txid)))?;
    let tx = transaction_from_record(state.store.as_ref(), record)?;
    Ok(Json(tx))
}

async fn submit_mempool_transaction(
    State(state): State<AppState>,
    Json(request): Json<TransactionRequest>,
) -> Result<impl IntoResponse, ChainError> {
    let tx = request.into_transaction()?;
    let now = (state.now)();
    let admitted = admit_to_mempool(state.store.as_ref(), tx, now)?;
    info!(txid = %admitted.txid, "transaction admitted to mempool");
    Ok((StatusCode::CREATED, Json(admitted)))
}

async fn list_mempool_transactions(State(state): State<AppState>) -> Result<impl IntoResponse, ChainError> {
    let records = state.store.query_mempool_transactions()?;
    let transactions: Result<Vec<_>, ChainError> =
        records.into_iter().map(|r| transaction_from_record(state.store.as_ref(), r)).collect();
    Ok(Json(transactions?))
}
