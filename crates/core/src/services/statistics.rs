//! Statistics aggregator for supervisor dashboards.

use std::collections::BTreeMap;

use baggage_common::{AppError, AppResult};
use baggage_db::entities::bag_piece::BagStatus;
use serde::Serialize;

use super::reconciliation::{FlightSnapshot, ReconciliationService};

/// `round(scanned / expected * 100)`, 0 when nothing is expected.
#[must_use]
pub fn completion_rate(scanned: u32, expected: u32) -> u32 {
    if expected == 0 {
        return 0;
    }
    (f64::from(scanned) / f64::from(expected) * 100.0).round() as u32
}

/// Per-flight baggage rollup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightStats {
    pub flight_id: String,
    pub flight_code: String,
    pub station: String,
    pub passenger_count: u32,
    pub bags_expected: u32,
    pub bags_scanned: u32,
    pub bags_loaded: u32,
    pub bags_arrived: u32,
    pub bags_missing: u32,
    pub incomplete_sets: u32,
    pub completion_rate: u32,
}

impl FlightStats {
    /// Roll up one flight snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: &FlightSnapshot) -> Self {
        let mut stats = Self {
            flight_id: snapshot.flight.id.clone(),
            flight_code: snapshot.flight.code.clone(),
            station: snapshot.flight.origin.clone(),
            passenger_count: snapshot.passengers.len() as u32,
            bags_expected: 0,
            bags_scanned: 0,
            bags_loaded: 0,
            bags_arrived: 0,
            bags_missing: 0,
            incomplete_sets: 0,
            completion_rate: 0,
        };

        for passenger in &snapshot.passengers {
            let Some(set) = &passenger.bag_set else {
                stats.bags_expected += passenger.passenger.pieces_declared.max(0) as u32;
                continue;
            };

            stats.bags_expected += set.bag_set.pieces_expected.max(0) as u32;
            stats.bags_scanned += set.evaluation.scanned_count as u32;
            if !set.evaluation.complete {
                stats.incomplete_sets += 1;
            }

            for piece in &set.pieces {
                match piece.status {
                    BagStatus::Loaded => stats.bags_loaded += 1,
                    BagStatus::Arrived => stats.bags_arrived += 1,
                    BagStatus::Missing => stats.bags_missing += 1,
                    _ => {}
                }
            }
        }

        stats.completion_rate = completion_rate(stats.bags_scanned, stats.bags_expected);
        stats
    }
}

/// Rollup of every flight departing from one station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StationStats {
    pub station: String,
    pub flight_count: u32,
    pub passenger_count: u32,
    pub bags_expected: u32,
    pub bags_scanned: u32,
    pub bags_loaded: u32,
    pub bags_arrived: u32,
    pub bags_missing: u32,
    pub incomplete_sets: u32,
    pub completion_rate: u32,
}

impl StationStats {
    fn empty(station: &str) -> Self {
        Self {
            station: station.to_string(),
            flight_count: 0,
            passenger_count: 0,
            bags_expected: 0,
            bags_scanned: 0,
            bags_loaded: 0,
            bags_arrived: 0,
            bags_missing: 0,
            incomplete_sets: 0,
            completion_rate: 0,
        }
    }

    fn add(&mut self, flight: &FlightStats) {
        self.flight_count += 1;
        self.passenger_count += flight.passenger_count;
        self.bags_expected += flight.bags_expected;
        self.bags_scanned += flight.bags_scanned;
        self.bags_loaded += flight.bags_loaded;
        self.bags_arrived += flight.bags_arrived;
        self.bags_missing += flight.bags_missing;
        self.incomplete_sets += flight.incomplete_sets;
        self.completion_rate = completion_rate(self.bags_scanned, self.bags_expected);
    }
}

/// Statistics service.
#[derive(Clone)]
pub struct StatisticsService {
    reconciliation: ReconciliationService,
}

impl StatisticsService {
    #[must_use]
    pub const fn new(reconciliation: ReconciliationService) -> Self {
        Self { reconciliation }
    }

    pub async fn get_flight_statistics(&self, flight_id: &str) -> AppResult<FlightStats> {
        let snapshots = self.reconciliation.flight_snapshots(Some(flight_id)).await?;

        snapshots
            .first()
            .map(FlightStats::from_snapshot)
            .ok_or_else(|| AppError::NotFound(format!("Flight {flight_id} not found")))
    }

    /// Per-station rollups ordered by station code. With a station given the
    /// result holds exactly that station, zeroed when it has no flights.
    pub async fn get_station_statistics(
        &self,
        station: Option<&str>,
    ) -> AppResult<Vec<StationStats>> {
        let snapshots = self.reconciliation.flight_snapshots(None).await?;

        let mut by_station: BTreeMap<String, StationStats> = BTreeMap::new();
        if let Some(station) = station {
            by_station.insert(station.to_string(), StationStats::empty(station));
        }

        for snapshot in &snapshots {
            let origin = &snapshot.flight.origin;
            if station.is_some_and(|s| s != origin.as_str()) {
                continue;
            }
            by_station
                .entry(origin.clone())
                .or_insert_with(|| StationStats::empty(origin))
                .add(&FlightStats::from_snapshot(snapshot));
        }

        Ok(by_station.into_values().collect())
    }
}
