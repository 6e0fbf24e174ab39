//! Reconciliation pass.
//!
//! One pass loads every flight in scope, derives candidate notifications,
//! persists the new ones and returns the list agents should see.

use std::collections::HashMap;
use std::time::Duration;

use baggage_common::{AppError, AppResult, ReconciliationConfig};
use baggage_db::entities::notification::{self, NaturalKey};
use chrono::{DateTime, Utc};
use tokio::time::Instant;

use super::alert::{AlertDeriver, dedupe_by_natural_key};
use super::notification::{FailedWrite, NotificationService, filter_expired};
use super::reconciliation::{FlightSnapshot, load_flight_snapshot};
use super::store::{SharedStore, bounded};

/// Inputs of one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassContext {
    /// Only flights departing from this station.
    pub station: Option<String>,
    /// Clock the detectors measure against.
    pub now: DateTime<Utc>,
    /// Upper bound for the whole pass; the configured default when `None`.
    pub deadline: Option<Duration>,
}

impl PassContext {
    #[must_use]
    pub fn new(station: Option<String>) -> Self {
        Self {
            station,
            now: Utc::now(),
            deadline: None,
        }
    }

    #[must_use]
    pub const fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    #[must_use]
    pub const fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// A flight the pass could not evaluate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFlight {
    pub flight_id: String,
    pub reason: String,
}

/// Outcome of one pass.
#[derive(Debug, Clone, Default)]
pub struct PassReport {
    /// Unread, unexpired notifications, one per natural key, most urgent first.
    pub notifications: Vec<notification::Model>,
    pub created: Vec<notification::Model>,
    pub candidates: usize,
    pub skipped_flights: Vec<SkippedFlight>,
    pub failed_writes: Vec<FailedWrite>,
}

impl PassReport {
    /// The error a caller should surface, if the pass was only partially
    /// successful.
    #[must_use]
    pub fn error(&self) -> Option<AppError> {
        if !self.skipped_flights.is_empty() {
            let ids: Vec<&str> = self
                .skipped_flights
                .iter()
                .map(|s| s.flight_id.as_str())
                .collect();
            return Some(AppError::flights_skipped(&ids));
        }

        if !self.failed_writes.is_empty() {
            return Some(AppError::PartialPersistFailure {
                failed: self.failed_writes.len(),
                attempted: self.created.len() + self.failed_writes.len(),
            });
        }

        None
    }
}

/// Runs reconciliation passes.
#[derive(Clone)]
pub struct ReconciliationPassService {
    store: SharedStore,
    config: ReconciliationConfig,
    deriver: AlertDeriver,
    notifications: NotificationService,
}

impl ReconciliationPassService {
    #[must_use]
    pub fn new(store: SharedStore, config: ReconciliationConfig) -> Self {
        Self {
            deriver: AlertDeriver::new(config.clone()),
            notifications: NotificationService::new(store.clone(), config.clone()),
            store,
            config,
        }
    }

    /// Run one pass.
    ///
    /// Fails only when the flight list or the stored notifications cannot be
    /// read. Flights that fail to load are skipped and listed in the report.
    pub async fn run_reconciliation_pass(&self, ctx: &PassContext) -> AppResult<PassReport> {
        let started = Instant::now();
        let deadline = started + ctx.deadline.unwrap_or_else(|| self.config.pass_deadline());
        let store_timeout = self.config.store_timeout();

        let flights = bounded(
            store_timeout.min(deadline.saturating_duration_since(Instant::now())),
            self.store.get_flights(),
        )
        .await?;

        let mut report = PassReport::default();
        let mut snapshots: Vec<FlightSnapshot> = Vec::new();

        for flight in flights {
            if ctx
                .station
                .as_ref()
                .is_some_and(|station| *station != flight.origin)
            {
                continue;
            }

            let flight_id = flight.id.clone();
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                report.skipped_flights.push(SkippedFlight {
                    flight_id,
                    reason: "pass deadline exceeded".to_string(),
                });
                continue;
            }

            match bounded(
                remaining,
                load_flight_snapshot(self.store.as_ref(), flight, store_timeout),
            )
            .await
            {
                Ok(snapshot) => snapshots.push(snapshot),
                Err(e) => {
                    tracing::warn!(flight_id = %flight_id, error = %e, "Skipping flight");
                    report.skipped_flights.push(SkippedFlight {
                        flight_id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        let candidates = dedupe_by_natural_key(self.deriver.derive(&snapshots, ctx.now));
        report.candidates = candidates.len();
        let current: HashMap<NaturalKey, notification::Model> = candidates
            .iter()
            .map(|c| (c.natural_key(), c.clone()))
            .collect();

        if let Err(e) = self.notifications.purge_expired(ctx.now).await {
            tracing::warn!(error = %e, "Failed to purge expired notifications");
        }

        let outcome = self
            .notifications
            .persist(candidates, ctx.station.as_deref(), ctx.now, Some(deadline))
            .await?;

        let mut visible = refresh_from_candidates(outcome.existing, &current);
        visible.extend(outcome.created.iter().cloned());
        visible.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        report.notifications = dedupe_by_natural_key(filter_expired(visible, ctx.now));
        report.created = outcome.created;
        report.failed_writes = outcome.failed;

        tracing::info!(
            station = ?ctx.station,
            flights = snapshots.len(),
            skipped = report.skipped_flights.len(),
            candidates = report.candidates,
            created = report.created.len(),
            already_present = outcome.skipped,
            failed = report.failed_writes.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Reconciliation pass finished"
        );

        Ok(report)
    }
}

/// Stored rows keep the priority and wording of the pass that wrote them.
/// Report the current candidate's instead; nothing is written back.
fn refresh_from_candidates(
    existing: Vec<notification::Model>,
    current: &HashMap<NaturalKey, notification::Model>,
) -> Vec<notification::Model> {
    existing
        .into_iter()
        .map(|mut row| {
            if let Some(candidate) = current.get(&row.natural_key()) {
                row.priority = candidate.priority;
                row.title.clone_from(&candidate.title);
                row.message.clone_from(&candidate.message);
            }
            row
        })
        .collect()
}
