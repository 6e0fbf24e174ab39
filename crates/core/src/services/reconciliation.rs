//! Reconciliation evaluator.
//!
//! Classifies bag sets as complete or incomplete and collects missing bag
//! pieces. [`evaluate_bag_set`] is pure; the loaders walk
//! Flight → Passenger → `BagSet` → `BagPiece` through the entity store.

use std::collections::BTreeSet;
use std::time::Duration;

use baggage_common::{AppError, AppResult, ReconciliationConfig};
use baggage_db::entities::{bag_piece, bag_piece::BagStatus, bag_set, flight, passenger};
use serde::Serialize;

use super::store::{EntityStore, SharedStore, bounded};

/// Result of evaluating one bag set against its pieces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BagSetEvaluation {
    pub complete: bool,
    /// Indices in `1..=pieces_expected` with no piece at all.
    pub missing_indices: Vec<i32>,
    /// In-range pieces that are neither `created` nor `missing`.
    pub scanned_count: usize,
}

/// Evaluate a bag set.
///
/// Pieces whose index lies outside `1..=pieces_expected` are ignored, so a set
/// expecting zero pieces is always complete.
#[must_use]
pub fn evaluate_bag_set(bag_set: &bag_set::Model, pieces: &[bag_piece::Model]) -> BagSetEvaluation {
    let expected = bag_set.pieces_expected.max(0);
    let in_range = |p: &&bag_piece::Model| (1..=expected).contains(&p.piece_index);

    let present: BTreeSet<i32> = pieces.iter().filter(in_range).map(|p| p.piece_index).collect();
    let missing_indices: Vec<i32> = (1..=expected).filter(|i| !present.contains(i)).collect();
    let scanned_count = pieces
        .iter()
        .filter(in_range)
        .filter(|p| p.status.is_scanned())
        .count();

    BagSetEvaluation {
        complete: scanned_count == expected as usize && missing_indices.is_empty(),
        missing_indices,
        scanned_count,
    }
}

/// A bag set with its pieces and evaluation.
#[derive(Debug, Clone)]
pub struct BagSetSnapshot {
    pub bag_set: bag_set::Model,
    pub pieces: Vec<bag_piece::Model>,
    pub evaluation: BagSetEvaluation,
}

/// A passenger with their bag set, if any.
#[derive(Debug, Clone)]
pub struct PassengerSnapshot {
    pub passenger: passenger::Model,
    pub bag_set: Option<BagSetSnapshot>,
}

/// Everything the detectors and statistics need about one flight.
#[derive(Debug, Clone)]
pub struct FlightSnapshot {
    pub flight: flight::Model,
    pub passengers: Vec<PassengerSnapshot>,
}

impl FlightSnapshot {
    pub fn bag_sets(&self) -> impl Iterator<Item = &BagSetSnapshot> {
        self.passengers.iter().filter_map(|p| p.bag_set.as_ref())
    }

    pub fn incomplete_bag_sets(&self) -> impl Iterator<Item = &BagSetSnapshot> {
        self.bag_sets().filter(|s| !s.evaluation.complete)
    }

    /// Pieces currently in the terminal `missing` state.
    pub fn missing_pieces(&self) -> impl Iterator<Item = (&BagSetSnapshot, &bag_piece::Model)> {
        self.bag_sets().flat_map(|s| {
            s.pieces
                .iter()
                .filter(|p| p.status == BagStatus::Missing)
                .map(move |p| (s, p))
        })
    }
}

/// Load a flight's passengers, bag sets and pieces.
///
/// Each store call is bounded by `call_timeout`. A bag set that violates an
/// invariant or references missing rows is logged and left out; store
/// failures are returned unchanged.
pub async fn load_flight_snapshot(
    store: &dyn EntityStore,
    flight: flight::Model,
    call_timeout: Duration,
) -> AppResult<FlightSnapshot> {
    let passengers = bounded(call_timeout, store.get_passengers_by_flight(&flight.id)).await?;

    let mut snapshots = Vec::with_capacity(passengers.len());
    for passenger in passengers {
        let bag_set = match load_bag_set(store, &passenger, call_timeout).await {
            Ok(bag_set) => bag_set,
            Err(e) if e.is_entity_error() => {
                tracing::warn!(
                    flight_id = %flight.id,
                    passenger_id = %passenger.id,
                    error = %e,
                    "Skipping bag set"
                );
                None
            }
            Err(e) => return Err(e),
        };
        snapshots.push(PassengerSnapshot { passenger, bag_set });
    }

    Ok(FlightSnapshot {
        flight,
        passengers: snapshots,
    })
}

async fn load_bag_set(
    store: &dyn EntityStore,
    passenger: &passenger::Model,
    call_timeout: Duration,
) -> AppResult<Option<BagSetSnapshot>> {
    let Some(bag_set) = bounded(call_timeout, store.get_bag_set_by_passenger(&passenger.id)).await?
    else {
        return Ok(None);
    };

    if bag_set.flight_id != passenger.flight_id {
        return Err(AppError::InvalidState(format!(
            "bag set {} is on flight {} but passenger {} is on flight {}",
            bag_set.id, bag_set.flight_id, passenger.id, passenger.flight_id
        )));
    }

    let pieces = bounded(call_timeout, store.get_bag_pieces_by_set(&bag_set.id)).await?;

    let mut seen = BTreeSet::new();
    for piece in &pieces {
        if piece.bag_set_id != bag_set.id {
            return Err(AppError::NotFound(format!(
                "bag piece {} references bag set {}",
                piece.id, piece.bag_set_id
            )));
        }
        if !seen.insert(piece.piece_index) {
            return Err(AppError::InvalidState(format!(
                "duplicate piece index {} in bag set {}",
                piece.piece_index, bag_set.id
            )));
        }
    }

    let evaluation = evaluate_bag_set(&bag_set, &pieces);
    tracing::debug!(
        bag_set_id = %bag_set.id,
        complete = evaluation.complete,
        scanned = evaluation.scanned_count,
        expected = bag_set.pieces_expected,
        "Evaluated bag set"
    );

    Ok(Some(BagSetSnapshot {
        bag_set,
        pieces,
        evaluation,
    }))
}

/// Read-path reconciliation queries for supervisor views.
#[derive(Clone)]
pub struct ReconciliationService {
    store: SharedStore,
    config: ReconciliationConfig,
}

impl ReconciliationService {
    #[must_use]
    pub const fn new(store: SharedStore, config: ReconciliationConfig) -> Self {
        Self { store, config }
    }

    /// Snapshots for one flight, or for every flight when `flight_id` is `None`.
    pub async fn flight_snapshots(
        &self,
        flight_id: Option<&str>,
    ) -> AppResult<Vec<FlightSnapshot>> {
        let timeout = self.config.store_timeout();
        let flights = match flight_id {
            Some(id) => {
                let flight = bounded(timeout, self.store.get_flight(id))
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("Flight {id} not found")))?;
                vec![flight]
            }
            None => bounded(timeout, self.store.get_flights()).await?,
        };

        let mut snapshots = Vec::with_capacity(flights.len());
        for flight in flights {
            snapshots.push(load_flight_snapshot(self.store.as_ref(), flight, timeout).await?);
        }
        Ok(snapshots)
    }

    /// Bag sets that are not complete.
    pub async fn list_incomplete_bag_sets(
        &self,
        flight_id: Option<&str>,
    ) -> AppResult<Vec<bag_set::Model>> {
        let snapshots = self.flight_snapshots(flight_id).await?;

        Ok(snapshots
            .iter()
            .flat_map(FlightSnapshot::incomplete_bag_sets)
            .map(|s| s.bag_set.clone())
            .collect())
    }

    /// Bag pieces in the `missing` state, optionally limited to a flight
    /// and to the station of their last scan.
    pub async fn list_missing_bag_pieces(
        &self,
        flight_id: Option<&str>,
        station: Option<&str>,
    ) -> AppResult<Vec<bag_piece::Model>> {
        let snapshots = self.flight_snapshots(flight_id).await?;

        Ok(snapshots
            .iter()
            .flat_map(FlightSnapshot::missing_pieces)
            .map(|(_, piece)| piece)
            .filter(|piece| station.is_none_or(|s| piece.station.as_deref() == Some(s)))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Builders shared by the service tests.

    use super::*;
    use crate::services::memory_store::InMemoryStore;
    use baggage_db::entities::{bag_set::BagSetStatus, passenger::PassengerStatus};
    use chrono::{DateTime, Duration as ChronoDuration, Utc};

    pub fn flight(id: &str, origin: &str, scheduled_at: DateTime<Utc>) -> flight::Model {
        flight::Model {
            id: id.to_string(),
            code: "BA117".to_string(),
            origin: origin.to_string(),
            destination: "JFK".to_string(),
            scheduled_at: scheduled_at.into(),
            gate_closes_at: None,
            created_at: (scheduled_at - ChronoDuration::days(1)).into(),
        }
    }

    pub fn passenger(id: &str, flight_id: &str, pieces_declared: i32) -> passenger::Model {
        passenger::Model {
            id: id.to_string(),
            flight_id: flight_id.to_string(),
            name: format!("Passenger {id}"),
            pnr: None,
            pieces_declared,
            status: PassengerStatus::CheckedIn,
            created_at: Utc::now().into(),
        }
    }

    pub fn bag_set(id: &str, passenger_id: &str, flight_id: &str, expected: i32) -> bag_set::Model {
        bag_set::Model {
            id: id.to_string(),
            passenger_id: passenger_id.to_string(),
            flight_id: flight_id.to_string(),
            base_tag: format!("0125{id}"),
            pieces_expected: expected,
            status: BagSetStatus::InProgress,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    pub fn piece(bag_set_id: &str, index: i32, status: BagStatus) -> bag_piece::Model {
        bag_piece::Model {
            id: format!("{bag_set_id}-p{index}"),
            bag_set_id: bag_set_id.to_string(),
            tag_full: format!("0125{bag_set_id}{index:02}"),
            piece_index: index,
            status,
            last_scan_at: None,
            station: Some("LHR".to_string()),
            boarding_pass_id: None,
            created_at: Utc::now().into(),
        }
    }

    /// Seed one passenger with a bag set whose pieces have the given
    /// indices and statuses.
    pub async fn seed_bag_set(
        store: &InMemoryStore,
        flight_id: &str,
        set_id: &str,
        expected: i32,
        pieces: &[(i32, BagStatus)],
    ) {
        let passenger_id = format!("pax-{set_id}");
        store
            .insert_passenger(passenger(&passenger_id, flight_id, expected))
            .await;
        store
            .insert_bag_set(bag_set(set_id, &passenger_id, flight_id, expected))
            .await;
        for (index, status) in pieces {
            store.insert_bag_piece(piece(set_id, *index, *status)).await;
        }
    }
}
