//! Bag set endpoints.

use axum::{
    Router,
    extract::{Query, State},
    routing::get,
};
use baggage_common::AppResult;
use baggage_db::entities::bag_set::{BagSetStatus, Model as BagSetModel};
use serde::{Deserialize, Serialize};

use crate::{response::ApiResponse, state::AppState};

/// Bag set response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BagSetResponse {
    pub id: String,
    pub passenger_id: String,
    pub flight_id: String,
    pub base_tag: String,
    pub pieces_expected: i32,
    pub status: BagSetStatus,
    pub created_at: String,
}

impl From<BagSetModel> for BagSetResponse {
    fn from(s: BagSetModel) -> Self {
        Self {
            id: s.id,
            passenger_id: s.passenger_id,
            flight_id: s.flight_id,
            base_tag: s.base_tag,
            pieces_expected: s.pieces_expected,
            status: s.status,
            created_at: s.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncompleteQuery {
    pub flight_id: Option<String>,
}

/// Bag sets that are not complete.
async fn incomplete(
    State(state): State<AppState>,
    Query(query): Query<IncompleteQuery>,
) -> AppResult<ApiResponse<Vec<BagSetResponse>>> {
    let sets = state
        .reconciliation_service
        .list_incomplete_bag_sets(query.flight_id.as_deref())
        .await?;
    Ok(ApiResponse::ok(sets.into_iter().map(Into::into).collect()))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/incomplete", get(incomplete))
}
