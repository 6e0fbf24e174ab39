//! Scan recording and audit trail.
//!
//! Bag pieces change status only here: through agent scans or supervisor
//! corrections. Every change appends a scan log and recomputes the owning
//! bag set's status.

use baggage_common::{AppError, AppResult, IdGenerator};
use baggage_db::entities::{
    bag_piece::{self, BagStatus},
    bag_set::BagSetStatus,
    scan_log::{self, ScanAction},
};
use chrono::{DateTime, Utc};

use super::reconciliation::evaluate_bag_set;
use super::store::SharedStore;

/// A scan performed by an agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanInput {
    pub tag_full: String,
    pub action: ScanAction,
    pub agent: String,
    pub station: String,
    pub boarding_pass_id: Option<String>,
}

/// The state after a recorded scan or correction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOutcome {
    pub piece: bag_piece::Model,
    pub log: scan_log::Model,
    pub bag_set_status: BagSetStatus,
}

/// Status a scan moves a piece to.
///
/// Progress only moves forward, skipping ahead is allowed and repeating the
/// current status is a refresh. `missing` can be reported from any state but
/// never left by a scan.
pub fn scan_transition(current: BagStatus, action: ScanAction) -> AppResult<BagStatus> {
    let target = action.target_status().ok_or_else(|| {
        AppError::BadRequest("corrections are not recorded as scans".to_string())
    })?;

    if target == BagStatus::Missing {
        return Ok(target);
    }

    match (current.progress_rank(), target.progress_rank()) {
        (Some(from), Some(to)) if to >= from => Ok(target),
        (None, _) => Err(AppError::InvalidState(format!(
            "bag is reported missing; a supervisor correction is required before {action:?}"
        ))),
        _ => Err(AppError::InvalidState(format!(
            "cannot move bag from {current:?} back to {target:?}"
        ))),
    }
}

/// Scan service.
#[derive(Clone)]
pub struct ScanService {
    store: SharedStore,
    id_gen: IdGenerator,
}

impl ScanService {
    #[must_use]
    pub const fn new(store: SharedStore) -> Self {
        Self {
            store,
            id_gen: IdGenerator::new(),
        }
    }

    /// Record an agent scan.
    pub async fn record_scan(
        &self,
        input: ScanInput,
        now: DateTime<Utc>,
    ) -> AppResult<ScanOutcome> {
        let mut piece = self.find_piece(&input.tag_full).await?;
        let previous = piece.status;
        let status = scan_transition(previous, input.action)?;

        piece.status = status;
        piece.last_scan_at = Some(now.into());
        piece.station = Some(input.station.clone());
        if input.boarding_pass_id.is_some() {
            piece.boarding_pass_id = input.boarding_pass_id;
        }

        let outcome = self
            .apply(piece, input.action, previous, input.agent, input.station, now)
            .await?;

        tracing::info!(
            tag = %input.tag_full,
            action = ?input.action,
            from = ?previous,
            to = ?status,
            "Scan recorded"
        );

        Ok(outcome)
    }

    /// Set a piece to any status on a supervisor's authority.
    pub async fn correct_status(
        &self,
        tag_full: &str,
        status: BagStatus,
        agent: &str,
        station: &str,
        now: DateTime<Utc>,
    ) -> AppResult<ScanOutcome> {
        let mut piece = self.find_piece(tag_full).await?;
        let previous = piece.status;

        piece.status = status;
        piece.last_scan_at = Some(now.into());
        piece.station = Some(station.to_string());

        let outcome = self
            .apply(
                piece,
                ScanAction::Correction,
                previous,
                agent.to_string(),
                station.to_string(),
                now,
            )
            .await?;

        tracing::info!(
            tag = %tag_full,
            agent = %agent,
            from = ?previous,
            to = ?status,
            "Status corrected"
        );

        Ok(outcome)
    }

    /// Scan logs of a piece, oldest first.
    pub async fn audit_trail(&self, tag_full: &str) -> AppResult<Vec<scan_log::Model>> {
        let piece = self.find_piece(tag_full).await?;
        self.store.get_scan_logs_by_piece(&piece.id).await
    }

    async fn find_piece(&self, tag_full: &str) -> AppResult<bag_piece::Model> {
        self.store
            .find_bag_piece_by_tag(tag_full)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Bag tag {tag_full} not found")))
    }

    async fn apply(
        &self,
        piece: bag_piece::Model,
        action: ScanAction,
        previous_status: BagStatus,
        agent: String,
        station: String,
        now: DateTime<Utc>,
    ) -> AppResult<ScanOutcome> {
        let piece = self.store.update_bag_piece(piece).await?;

        let log = self
            .store
            .append_scan_log(scan_log::Model {
                id: self.id_gen.generate(),
                bag_piece_id: piece.id.clone(),
                action,
                previous_status,
                status: piece.status,
                agent,
                station,
                scanned_at: now.into(),
            })
            .await?;

        let bag_set_status = self.refresh_bag_set(&piece.bag_set_id).await?;

        Ok(ScanOutcome {
            piece,
            log,
            bag_set_status,
        })
    }

    async fn refresh_bag_set(&self, bag_set_id: &str) -> AppResult<BagSetStatus> {
        let bag_set = self
            .store
            .get_bag_set(bag_set_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Bag set {bag_set_id} not found")))?;
        let pieces = self.store.get_bag_pieces_by_set(bag_set_id).await?;

        let status = if evaluate_bag_set(&bag_set, &pieces).complete {
            BagSetStatus::Complete
        } else {
            BagSetStatus::InProgress
        };

        if status != bag_set.status {
            self.store.update_bag_set_status(bag_set_id, status).await?;
            tracing::debug!(bag_set_id = %bag_set_id, status = ?status, "Bag set status changed");
        }

        Ok(status)
    }
}
