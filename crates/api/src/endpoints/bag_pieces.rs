//! Bag piece endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use baggage_common::AppResult;
use baggage_db::entities::bag_piece::{BagStatus, Model as BagPieceModel};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::scans::{ScanLogResponse, ScanOutcomeResponse};
use crate::{response::ApiResponse, state::AppState};

/// Bag piece response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BagPieceResponse {
    pub id: String,
    pub bag_set_id: String,
    pub tag_full: String,
    pub piece_index: i32,
    pub status: BagStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_scan_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub station: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boarding_pass_id: Option<String>,
}

impl From<BagPieceModel> for BagPieceResponse {
    fn from(p: BagPieceModel) -> Self {
        Self {
            id: p.id,
            bag_set_id: p.bag_set_id,
            tag_full: p.tag_full,
            piece_index: p.piece_index,
            status: p.status,
            last_scan_at: p.last_scan_at.map(|t| t.to_rfc3339()),
            station: p.station,
            boarding_pass_id: p.boarding_pass_id,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingQuery {
    pub flight_id: Option<String>,
    pub station: Option<String>,
}

/// Bag pieces reported missing.
async fn missing(
    State(state): State<AppState>,
    Query(query): Query<MissingQuery>,
) -> AppResult<ApiResponse<Vec<BagPieceResponse>>> {
    let pieces = state
        .reconciliation_service
        .list_missing_bag_pieces(query.flight_id.as_deref(), query.station.as_deref())
        .await?;
    Ok(ApiResponse::ok(pieces.into_iter().map(Into::into).collect()))
}

/// Scan history of one tag, oldest first.
async fn history(
    State(state): State<AppState>,
    Path(tag): Path<String>,
) -> AppResult<ApiResponse<Vec<ScanLogResponse>>> {
    let logs = state.scan_service.audit_trail(&tag).await?;
    Ok(ApiResponse::ok(logs.into_iter().map(Into::into).collect()))
}

/// Supervisor correction request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CorrectionRequest {
    pub status: BagStatus,

    #[validate(length(min = 1, max = 64))]
    pub agent: String,

    #[validate(length(min = 3, max = 4))]
    pub station: String,
}

/// Set a bag piece's status on a supervisor's authority.
async fn correct(
    State(state): State<AppState>,
    Path(tag): Path<String>,
    Json(req): Json<CorrectionRequest>,
) -> AppResult<ApiResponse<ScanOutcomeResponse>> {
    req.validate()?;

    let outcome = state
        .scan_service
        .correct_status(&tag, req.status, &req.agent, &req.station, Utc::now())
        .await?;
    Ok(ApiResponse::ok(outcome.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/missing", get(missing))
        .route("/{tag}/history", get(history))
        .route("/{tag}/correction", post(correct))
}
