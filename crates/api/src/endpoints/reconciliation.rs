//! Reconciliation pass endpoint.

use axum::{Json, Router, extract::State, routing::post};
use baggage_common::AppResult;
use baggage_core::{PassContext, PassReport};
use serde::{Deserialize, Serialize};

use super::notifications::NotificationResponse;
use crate::{response::ApiResponse, state::AppState};

/// Run pass request.
#[derive(Debug, Default, Deserialize)]
pub struct RunPassRequest {
    /// Only flights departing from this station.
    pub station: Option<String>,
}

/// A flight the pass could not evaluate.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedFlightResponse {
    pub flight_id: String,
    pub reason: String,
}

/// Error attached to a partially successful pass.
#[derive(Debug, Serialize)]
pub struct PassErrorResponse {
    pub code: &'static str,
    pub message: String,
}

/// Pass report response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassReportResponse {
    pub notifications: Vec<NotificationResponse>,
    pub created: usize,
    pub candidates: usize,
    pub skipped_flights: Vec<SkippedFlightResponse>,
    pub failed_writes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<PassErrorResponse>,
}

impl From<PassReport> for PassReportResponse {
    fn from(report: PassReport) -> Self {
        let error = report.error().map(|e| PassErrorResponse {
            code: e.error_code(),
            message: e.to_string(),
        });

        Self {
            created: report.created.len(),
            candidates: report.candidates,
            failed_writes: report.failed_writes.len(),
            skipped_flights: report
                .skipped_flights
                .into_iter()
                .map(|s| SkippedFlightResponse {
                    flight_id: s.flight_id,
                    reason: s.reason,
                })
                .collect(),
            notifications: report.notifications.into_iter().map(Into::into).collect(),
            error,
        }
    }
}

/// Run one reconciliation pass.
///
/// The body is optional; without one every station is evaluated.
/// A partially successful pass still answers 200 with the notifications it
/// could produce; the skipped flights and failed writes are reported inline.
async fn run_pass(
    State(state): State<AppState>,
    req: Option<Json<RunPassRequest>>,
) -> AppResult<ApiResponse<PassReportResponse>> {
    let req = req.map(|Json(req)| req).unwrap_or_default();
    let report = state
        .pass_service
        .run_reconciliation_pass(&PassContext::new(req.station))
        .await?;

    if let Some(error) = report.error() {
        tracing::warn!(error = %error, "Reconciliation pass partially failed");
    }

    Ok(ApiResponse::ok(report.into()))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/pass", post(run_pass))
}
