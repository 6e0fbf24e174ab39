//! Statistics endpoints.

use axum::{
    Router,
    extract::{Path, Query, State},
    routing::get,
};
use baggage_common::AppResult;
use baggage_core::{FlightStats, StationStats};
use serde::Deserialize;

use crate::{response::ApiResponse, state::AppState};

/// Baggage rollup for one flight.
async fn flight_statistics(
    State(state): State<AppState>,
    Path(flight_id): Path<String>,
) -> AppResult<ApiResponse<FlightStats>> {
    let stats = state
        .statistics_service
        .get_flight_statistics(&flight_id)
        .await?;
    Ok(ApiResponse::ok(stats))
}

#[derive(Debug, Deserialize)]
pub struct StationStatsQuery {
    pub station: Option<String>,
}

/// Baggage rollups per departure station.
async fn station_statistics(
    State(state): State<AppState>,
    Query(query): Query<StationStatsQuery>,
) -> AppResult<ApiResponse<Vec<StationStats>>> {
    let stats = state
        .statistics_service
        .get_station_statistics(query.station.as_deref())
        .await?;
    Ok(ApiResponse::ok(stats))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/flights/{id}/statistics", get(flight_statistics))
        .route("/statistics/stations", get(station_statistics))
}
