use alloy::primitives::{Address, B256};
use atlas_store::Store;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::{ApiConfig, ApiError};

/// Hard cap on the `limit` path segment of list endpoints.
pub const MAX_LIMIT: usize = 1000;

type Ctx = State<Arc<dyn Store>>;

/// `{items, total}` wrapper of every list endpoint.
#[derive(Debug, Serialize)]
struct ListResponse<T> {
    items: Vec<T>,
    total: u64,
}

/// Builds the API router over a store.
pub fn router(store: Arc<dyn Store>) -> Router {
    Router::new()
        .route("/status", get(status))
        .route("/block/{number}", get(block_by_number))
        .route("/blockbyhash/{hash}", get(block_by_hash))
        .route("/latest", get(latest_block))
        .route("/latestblocks/{limit}", get(latest_blocks))
        .route("/latestforkedblocks/{limit}", get(latest_forked_blocks))
        .route("/transaction/{hash}", get(transaction_by_hash))
        .route("/latesttransactions/{limit}", get(latest_transactions))
        .route("/latestaccounttxns/{hash}", get(latest_account_txns))
        .route("/latestaccounttokentxns/{hash}", get(latest_account_token_txns))
        .route("/latesttokentransfers/{limit}", get(latest_token_transfers))
        .route("/latestuncles/{limit}", get(latest_uncles))
        .route("/uncle/{hash}", get(uncle_by_hash))
        .layer(CorsLayer::permissive())
        .with_state(store)
}

/// Binds the configured port and serves the router until the process ends.
pub async fn serve(store: Arc<dyn Store>, config: &ApiConfig) -> std::io::Result<()> {
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "starting api");
    axum::serve(listener, router(store)).await
}

fn parse_limit(segment: &str) -> Result<usize, ApiError> {
    let limit: usize =
        segment.parse().map_err(|_| ApiError::BadRequest(format!("invalid limit: {segment}")))?;
    Ok(limit.min(MAX_LIMIT))
}

fn parse_hash(segment: &str) -> Result<B256, ApiError> {
    segment.parse().map_err(|_| ApiError::BadRequest(format!("invalid hash: {segment}")))
}

fn parse_address(segment: &str) -> Result<Address, ApiError> {
    segment.parse().map_err(|_| ApiError::BadRequest(format!("invalid address: {segment}")))
}

async fn status(State(store): Ctx) -> Result<Response, ApiError> {
    Ok(Json(store.store_status().await?).into_response())
}

async fn block_by_number(
    State(store): Ctx,
    Path(number): Path<String>,
) -> Result<Response, ApiError> {
    let number: u64 = number
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid block number: {number}")))?;
    Ok(Json(store.block_by_number(number).await?).into_response())
}

async fn block_by_hash(
    State(store): Ctx,
    Path(hash): Path<String>,
) -> Result<Response, ApiError> {
    Ok(Json(store.block_by_hash(parse_hash(&hash)?).await?).into_response())
}

async fn latest_block(State(store): Ctx) -> Result<Response, ApiError> {
    Ok(Json(store.latest_block().await?).into_response())
}

async fn latest_blocks(
    State(store): Ctx,
    Path(limit): Path<String>,
) -> Result<Response, ApiError> {
    let items = store.latest_blocks(parse_limit(&limit)?).await?;
    let total = store.total_block_count().await?;
    Ok(Json(ListResponse { items, total }).into_response())
}

async fn latest_forked_blocks(
    State(store): Ctx,
    Path(limit): Path<String>,
) -> Result<Response, ApiError> {
    let items = store.latest_forked_blocks(parse_limit(&limit)?).await?;
    let total = store.total_forked_count().await?;
    Ok(Json(ListResponse { items, total }).into_response())
}

async fn transaction_by_hash(
    State(store): Ctx,
    Path(hash): Path<String>,
) -> Result<Response, ApiError> {
    Ok(Json(store.transaction_by_hash(parse_hash(&hash)?).await?).into_response())
}

async fn latest_transactions(
    State(store): Ctx,
    Path(limit): Path<String>,
) -> Result<Response, ApiError> {
    let items = store.latest_transactions(parse_limit(&limit)?).await?;
    let total = store.total_txn_count().await?;
    Ok(Json(ListResponse { items, total }).into_response())
}

async fn latest_account_txns(
    State(store): Ctx,
    Path(hash): Path<String>,
) -> Result<Response, ApiError> {
    let account = parse_address(&hash)?;
    let items = store.latest_transactions_by_account(account).await?;
    let total = store.txn_count(account).await?;
    Ok(Json(ListResponse { items, total }).into_response())
}

async fn latest_account_token_txns(
    State(store): Ctx,
    Path(hash): Path<String>,
) -> Result<Response, ApiError> {
    let account = parse_address(&hash)?;
    let items = store.latest_token_transfers_by_account(account).await?;
    let total = store.token_transfer_count(account).await?;
    Ok(Json(ListResponse { items, total }).into_response())
}

async fn latest_token_transfers(
    State(store): Ctx,
    Path(limit): Path<String>,
) -> Result<Response, ApiError> {
    let items = store.latest_token_transfers(parse_limit(&limit)?).await?;
    let total = store.total_token_transfer_count().await?;
    Ok(Json(ListResponse { items, total }).into_response())
}

async fn latest_uncles(
    State(store): Ctx,
    Path(limit): Path<String>,
) -> Result<Response, ApiError> {
    let items = store.latest_uncles(parse_limit(&limit)?).await?;
    let total = store.total_uncle_count().await?;
    Ok(Json(ListResponse { items, total }).into_response())
}

async fn uncle_by_hash(
    State(store): Ctx,
    Path(hash): Path<String>,
) -> Result<Response, ApiError> {
    Ok(Json(store.uncle_by_hash(parse_hash(&hash)?).await?).into_response())
}
