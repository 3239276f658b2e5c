//! REST endpoints: token list, single token, stats, manual analysis.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::constants::is_valid_mint;
use crate::logger::{self, LogTag};
use crate::monitor::MonitorStats;
use crate::tokens::types::TokenRecord;

use super::types::{error_response, ApiResponse};
use super::AppState;

const DEFAULT_LIMIT: usize = 50;
const MAX_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
pub struct TokensQuery {
    passed: Option<bool>,
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokensPayload {
    pub tokens: Vec<Arc<TokenRecord>>,
    pub stats: MonitorStats,
    pub count: usize,
    pub is_connected: bool,
}

/// `GET /tokens` — current history, newest first. Starts the monitor on
/// first use.
pub async fn list_tokens(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TokensQuery>,
) -> Response {
    if !state.monitor.is_running() {
        state.monitor.start();
    }

    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let tokens = state.monitor.history_snapshot(limit, query.passed);
    let count = tokens.len();

    ApiResponse::ok(TokensPayload {
        tokens,
        stats: state.monitor.stats(),
        count,
        is_connected: state.monitor.is_upstream_connected(),
    })
    .into_response()
}

/// `GET /tokens/{address}` — one record or 404.
pub async fn get_token(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
) -> Response {
    match state.monitor.get(&address) {
        Some(record) => ApiResponse::ok(record).into_response(),
        None => error_response(
            StatusCode::NOT_FOUND,
            format!("token {} not found in history", address),
        ),
    }
}

/// `GET /stats`.
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Response {
    ApiResponse::ok(state.monitor.stats()).into_response()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    token_address: String,
    creator: Option<String>,
}

/// `POST /analyze` — run the full enrichment + scoring path once for a
/// mint and return the record.
pub async fn analyze_token(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalyzeRequest>,
) -> Response {
    let mint = request.token_address.trim();
    if !is_valid_mint(mint) {
        return error_response(
            StatusCode::BAD_REQUEST,
            format!("invalid token address: {}", mint),
        );
    }

    logger::info(LogTag::Webserver, &format!("Manual analysis for {}", mint));
    let record = state.monitor.analyze_once(mint, request.creator).await;

    let score = record.analysis.score;
    if !(0..=100).contains(&score) {
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "analysis produced an invalid score",
        );
    }

    ApiResponse::ok(record).into_response()
}

/// Fallback for unknown paths.
pub async fn not_found() -> Response {
    error_response(
        StatusCode::NOT_FOUND,
        "unknown endpoint; see /tokens, /stats, /stream",
    )
}
