//! Alert deriver.
//!
//! Turns flight snapshots into candidate notifications. Four detectors run
//! per flight:
//!
//! 1. departure soon,
//! 2. gate closing while bags are incomplete or missing,
//! 3. incomplete bag set (only when detector 2 stayed quiet for the flight),
//! 4. bag missing.
//!
//! Candidates are created at the pass clock, so ordering among them falls
//! back to detector order.

use std::collections::HashSet;

use baggage_common::{IdGenerator, ReconciliationConfig};
use baggage_db::entities::{
    flight,
    notification::{self, NotificationPriority, NotificationType},
};
use chrono::{DateTime, Duration, Utc};

use super::reconciliation::FlightSnapshot;

/// Derives candidate notifications from reconciliation results and flight
/// timing.
#[derive(Debug, Clone)]
pub struct AlertDeriver {
    config: ReconciliationConfig,
    id_gen: IdGenerator,
}

struct Draft {
    notification_type: NotificationType,
    priority: NotificationPriority,
    title: String,
    message: String,
    bag_set_id: Option<String>,
    bag_piece_id: Option<String>,
    expires_at: DateTime<Utc>,
}

impl AlertDeriver {
    #[must_use]
    pub const fn new(config: ReconciliationConfig) -> Self {
        Self {
            config,
            id_gen: IdGenerator::new(),
        }
    }

    /// Estimated gate closing time.
    ///
    /// Uses the flight's own gate-closing timestamp when it has one, else the
    /// configured offset from the scheduled departure.
    #[must_use]
    pub fn closing_time(&self, flight: &flight::Model) -> DateTime<Utc> {
        flight.gate_closes_at.map_or_else(
            || {
                flight.scheduled_at.with_timezone(&Utc)
                    + Duration::minutes(self.config.closing_offset_minutes)
            },
            |closes_at| closes_at.with_timezone(&Utc),
        )
    }

    /// Candidates for every flight, sorted by priority then age.
    #[must_use]
    pub fn derive(
        &self,
        flights: &[FlightSnapshot],
        now: DateTime<Utc>,
    ) -> Vec<notification::Model> {
        let mut candidates = Vec::new();

        for snapshot in flights {
            if snapshot.passengers.is_empty() {
                continue;
            }

            let mut drafts = Vec::new();
            drafts.extend(self.departing_soon(snapshot, now));

            match self.closing_with_missing_bags(snapshot, now) {
                Some(draft) => drafts.push(draft),
                None => drafts.extend(self.incomplete_bag_sets(snapshot, now)),
            }

            drafts.extend(self.missing_bags(snapshot, now));

            for draft in drafts {
                tracing::debug!(
                    flight_id = %snapshot.flight.id,
                    notification_type = ?draft.notification_type,
                    priority = ?draft.priority,
                    "Derived candidate"
                );
                candidates.push(self.build(&snapshot.flight, draft, now));
            }
        }

        sort_notifications(&mut candidates);
        candidates
    }

    fn departing_soon(&self, snapshot: &FlightSnapshot, now: DateTime<Utc>) -> Option<Draft> {
        let flight = &snapshot.flight;
        let departs_at = flight.scheduled_at.with_timezone(&Utc);
        let minutes = (departs_at - now).num_minutes();

        if minutes <= 0 || minutes > self.config.departure_window_minutes {
            return None;
        }

        let priority = if minutes <= self.config.departure_high_minutes {
            NotificationPriority::High
        } else {
            NotificationPriority::Medium
        };

        Some(Draft {
            notification_type: NotificationType::FlightDepartingSoon,
            priority,
            title: format!("Flight {} departing soon", flight.code),
            message: format!(
                "Flight {} to {} departs in {minutes} minutes",
                flight.code, flight.destination
            ),
            bag_set_id: None,
            bag_piece_id: None,
            expires_at: departs_at,
        })
    }

    fn closing_with_missing_bags(
        &self,
        snapshot: &FlightSnapshot,
        now: DateTime<Utc>,
    ) -> Option<Draft> {
        let minutes = (self.closing_time(&snapshot.flight) - now).num_minutes();
        if minutes <= 0 || minutes > self.config.closing_window_minutes {
            return None;
        }

        let incomplete = snapshot.incomplete_bag_sets().count();
        let missing = snapshot.missing_pieces().count();
        if incomplete == 0 && missing == 0 {
            return None;
        }

        let priority = if minutes <= self.config.closing_urgent_minutes {
            NotificationPriority::Urgent
        } else if minutes <= self.config.closing_high_minutes {
            NotificationPriority::High
        } else {
            NotificationPriority::Medium
        };

        let flight = &snapshot.flight;
        Some(Draft {
            notification_type: NotificationType::FlightClosingWithMissingBags,
            priority,
            title: format!("Flight {} closing with missing bags", flight.code),
            message: format!(
                "Flight {} closes in {minutes} minutes: {incomplete} incomplete bag sets, {missing} missing bags",
                flight.code
            ),
            bag_set_id: None,
            bag_piece_id: None,
            expires_at: self.ttl_from(now),
        })
    }

    fn incomplete_bag_sets(&self, snapshot: &FlightSnapshot, now: DateTime<Utc>) -> Vec<Draft> {
        snapshot
            .passengers
            .iter()
            .filter_map(|p| p.bag_set.as_ref().map(|s| (&p.passenger, s)))
            .filter(|(_, s)| !s.evaluation.complete)
            .map(|(passenger, set)| Draft {
                notification_type: NotificationType::IncompleteBagSet,
                priority: NotificationPriority::Medium,
                title: format!("Incomplete bag set for {}", passenger.name),
                message: format!(
                    "{} of {} bags scanned for {} on flight {}",
                    set.evaluation.scanned_count,
                    set.bag_set.pieces_expected,
                    passenger.name,
                    snapshot.flight.code
                ),
                bag_set_id: Some(set.bag_set.id.clone()),
                bag_piece_id: None,
                expires_at: self.ttl_from(now),
            })
            .collect()
    }

    fn missing_bags(&self, snapshot: &FlightSnapshot, now: DateTime<Utc>) -> Vec<Draft> {
        let flight = &snapshot.flight;
        let minutes = (flight.scheduled_at.with_timezone(&Utc) - now).num_minutes();
        let priority = if (0..=self.config.missing_urgent_minutes).contains(&minutes) {
            NotificationPriority::Urgent
        } else {
            NotificationPriority::High
        };

        snapshot
            .missing_pieces()
            .map(|(set, piece)| Draft {
                notification_type: NotificationType::BagMissing,
                priority,
                title: format!("Bag {} missing", piece.tag_full),
                message: format!(
                    "Bag {} ({} of {}) for flight {} is reported missing",
                    piece.tag_full, piece.piece_index, set.bag_set.pieces_expected, flight.code
                ),
                bag_set_id: Some(set.bag_set.id.clone()),
                bag_piece_id: Some(piece.id.clone()),
                expires_at: self.ttl_from(now),
            })
            .collect()
    }

    fn ttl_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + Duration::hours(self.config.notification_ttl_hours)
    }

    fn build(
        &self,
        flight: &flight::Model,
        draft: Draft,
        now: DateTime<Utc>,
    ) -> notification::Model {
        notification::Model {
            id: self.id_gen.generate(),
            notification_type: draft.notification_type,
            priority: draft.priority,
            title: draft.title,
            message: draft.message,
            flight_id: Some(flight.id.clone()),
            bag_set_id: draft.bag_set_id,
            bag_piece_id: draft.bag_piece_id,
            station: Some(flight.origin.clone()),
            is_read: false,
            created_at: now.into(),
            expires_at: Some(draft.expires_at.into()),
        }
    }
}

/// Sort by priority, most urgent first, then oldest first, then by id.
pub fn sort_notifications(notifications: &mut [notification::Model]) {
    notifications.sort_by(|a, b| {
        b.priority
            .weight()
            .cmp(&a.priority.weight())
            .then_with(|| a.created_at.cmp(&b.created_at))
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Sort, then keep only the first notification per natural key.
#[must_use]
pub fn dedupe_by_natural_key(
    mut notifications: Vec<notification::Model>,
) -> Vec<notification::Model> {
    sort_notifications(&mut notifications);

    let mut seen = HashSet::new();
    notifications.retain(|n| seen.insert(n.natural_key()));
    notifications
}
