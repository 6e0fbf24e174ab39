//! API endpoints.

mod bag_pieces;
mod bag_sets;
mod notifications;
mod reconciliation;
mod scans;
mod statistics;

pub use bag_pieces::BagPieceResponse;
pub use bag_sets::BagSetResponse;
pub use notifications::NotificationResponse;
pub use scans::ScanLogResponse;

use axum::Router;

use crate::state::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/reconciliation", reconciliation::router())
        .nest("/notifications", notifications::router())
        .nest("/bag-sets", bag_sets::router())
        .nest("/bag-pieces", bag_pieces::router())
        .nest("/scans", scans::router())
        .merge(statistics::router())
}
