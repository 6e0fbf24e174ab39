//! Scan endpoints.

use axum::{Json, Router, extract::State, routing::post};
use baggage_common::AppResult;
use baggage_core::{ScanInput, ScanOutcome};
use baggage_db::entities::{
    bag_piece::BagStatus,
    bag_set::BagSetStatus,
    scan_log::{Model as ScanLogModel, ScanAction},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::bag_pieces::BagPieceResponse;
use crate::{response::ApiResponse, state::AppState};

/// Scan log response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanLogResponse {
    pub id: String,
    pub bag_piece_id: String,
    pub action: ScanAction,
    pub previous_status: BagStatus,
    pub status: BagStatus,
    pub agent: String,
    pub station: String,
    pub scanned_at: String,
}

impl From<ScanLogModel> for ScanLogResponse {
    fn from(l: ScanLogModel) -> Self {
        Self {
            id: l.id,
            bag_piece_id: l.bag_piece_id,
            action: l.action,
            previous_status: l.previous_status,
            status: l.status,
            agent: l.agent,
            station: l.station,
            scanned_at: l.scanned_at.to_rfc3339(),
        }
    }
}

/// Result of a scan or correction.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanOutcomeResponse {
    pub piece: BagPieceResponse,
    pub log: ScanLogResponse,
    pub bag_set_status: BagSetStatus,
}

impl From<ScanOutcome> for ScanOutcomeResponse {
    fn from(outcome: ScanOutcome) -> Self {
        Self {
            piece: outcome.piece.into(),
            log: outcome.log.into(),
            bag_set_status: outcome.bag_set_status,
        }
    }
}

/// Record scan request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ScanRequest {
    #[validate(length(min = 1, max = 32))]
    pub tag_full: String,

    pub action: ScanAction,

    #[validate(length(min = 1, max = 64))]
    pub agent: String,

    /// IATA or ICAO station code
    #[validate(length(min = 3, max = 4))]
    pub station: String,

    #[validate(length(min = 1, max = 64))]
    pub boarding_pass_id: Option<String>,
}

/// Record an agent scan.
async fn record_scan(
    State(state): State<AppState>,
    Json(req): Json<ScanRequest>,
) -> AppResult<ApiResponse<ScanOutcomeResponse>> {
    req.validate()?;

    let input = ScanInput {
        tag_full: req.tag_full,
        action: req.action,
        agent: req.agent,
        station: req.station,
        boarding_pass_id: req.boarding_pass_id,
    };

    let outcome = state.scan_service.record_scan(input, Utc::now()).await?;
    Ok(ApiResponse::ok(outcome.into()))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(record_scan))
}
