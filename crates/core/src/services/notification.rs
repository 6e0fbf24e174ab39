//! Notification persistence and read path.

use std::collections::HashSet;
use std::time::Duration;

use baggage_common::{AppResult, ReconciliationConfig};
use baggage_db::entities::notification::{self, NaturalKey, NotificationPriority};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::Instant;

use super::alert::sort_notifications;
use super::store::{NotificationFilter, NotificationPatch, SharedStore, bounded};

/// Whether the notification's expiry lies before `now`.
#[must_use]
pub fn is_expired(notification: &notification::Model, now: DateTime<Utc>) -> bool {
    notification
        .expires_at
        .is_some_and(|expires_at| expires_at.with_timezone(&Utc) < now)
}

/// Drop notifications that expired before `now`.
#[must_use]
pub fn filter_expired(
    mut notifications: Vec<notification::Model>,
    now: DateTime<Utc>,
) -> Vec<notification::Model> {
    notifications.retain(|n| !is_expired(n, now));
    notifications
}

/// Unread notifications per priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UnreadCounts {
    pub urgent: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub total: usize,
}

/// Tally unread notifications by priority.
#[must_use]
pub fn count_unread_by_priority(notifications: &[notification::Model]) -> UnreadCounts {
    notifications
        .iter()
        .filter(|n| !n.is_read)
        .fold(UnreadCounts::default(), |mut counts, n| {
            match n.priority {
                NotificationPriority::Urgent => counts.urgent += 1,
                NotificationPriority::High => counts.high += 1,
                NotificationPriority::Medium => counts.medium += 1,
                NotificationPriority::Low => counts.low += 1,
            }
            counts.total += 1;
            counts
        })
}

/// A candidate that could not be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedWrite {
    pub key: NaturalKey,
    pub reason: String,
}

/// Result of persisting a batch of candidates.
#[derive(Debug, Clone, Default)]
pub struct PersistOutcome {
    /// Unread, unexpired notifications that were already stored.
    pub existing: Vec<notification::Model>,
    pub created: Vec<notification::Model>,
    /// Candidates whose natural key was already present.
    pub skipped: usize,
    pub failed: Vec<FailedWrite>,
}

/// Notification service: deduplicating persister plus the read path.
#[derive(Clone)]
pub struct NotificationService {
    store: SharedStore,
    config: ReconciliationConfig,
}

impl NotificationService {
    #[must_use]
    pub const fn new(store: SharedStore, config: ReconciliationConfig) -> Self {
        Self { store, config }
    }

    /// Write the candidates whose natural key has no unread notification yet.
    ///
    /// Fails only when the existing notifications cannot be read. Each write
    /// is isolated: a failed write is logged and recorded, and the remaining
    /// candidates are still attempted. Writes not started before `deadline`
    /// are recorded as failed.
    pub async fn persist(
        &self,
        candidates: Vec<notification::Model>,
        station: Option<&str>,
        now: DateTime<Utc>,
        deadline: Option<Instant>,
    ) -> AppResult<PersistOutcome> {
        let existing = bounded(
            self.call_timeout(deadline),
            self.store
                .get_notifications(&NotificationFilter::unread(station)),
        )
        .await?;
        let existing = filter_expired(existing, now);

        let mut keys: HashSet<NaturalKey> = existing
            .iter()
            .map(notification::Model::natural_key)
            .collect();
        let mut outcome = PersistOutcome {
            existing,
            ..PersistOutcome::default()
        };

        for candidate in candidates {
            let key = candidate.natural_key();
            if keys.contains(&key) {
                tracing::debug!(
                    notification_type = ?key.notification_type,
                    flight_id = ?key.flight_id,
                    "Notification already present"
                );
                outcome.skipped += 1;
                continue;
            }

            if deadline.is_some_and(|d| Instant::now() >= d) {
                outcome.failed.push(FailedWrite {
                    key,
                    reason: "pass deadline exceeded".to_string(),
                });
                continue;
            }

            match bounded(
                self.call_timeout(deadline),
                self.store.create_notification(candidate),
            )
            .await
            {
                Ok(created) => {
                    keys.insert(key);
                    outcome.created.push(created);
                }
                Err(e) => {
                    tracing::warn!(
                        notification_type = ?key.notification_type,
                        flight_id = ?key.flight_id,
                        bag_set_id = ?key.bag_set_id,
                        bag_piece_id = ?key.bag_piece_id,
                        error = %e,
                        "Failed to persist notification"
                    );
                    outcome.failed.push(FailedWrite {
                        key,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(outcome)
    }

    /// Notifications matching the filter, unexpired, most urgent first.
    pub async fn list_notifications(
        &self,
        filter: &NotificationFilter,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<notification::Model>> {
        let notifications = self.store.get_notifications(filter).await?;
        let mut notifications = filter_expired(notifications, now);
        sort_notifications(&mut notifications);
        Ok(notifications)
    }

    pub async fn mark_as_read(&self, id: &str) -> AppResult<notification::Model> {
        self.store
            .update_notification(id, NotificationPatch { read: Some(true) })
            .await
    }

    pub async fn mark_all_as_read(&self, station: Option<&str>) -> AppResult<u64> {
        let updated = self.store.mark_all_notifications_read(station).await?;
        tracing::info!(station = ?station, updated = updated, "Marked notifications as read");
        Ok(updated)
    }

    pub async fn unread_counts(
        &self,
        station: Option<&str>,
        now: DateTime<Utc>,
    ) -> AppResult<UnreadCounts> {
        let unread = self
            .store
            .get_notifications(&NotificationFilter::unread(station))
            .await?;
        Ok(count_unread_by_priority(&filter_expired(unread, now)))
    }

    /// Physically delete expired notifications.
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let deleted = self.store.delete_expired_notifications(now).await?;
        if deleted > 0 {
            tracing::info!(deleted = deleted, "Purged expired notifications");
        }
        Ok(deleted)
    }

    fn call_timeout(&self, deadline: Option<Instant>) -> Duration {
        let limit = self.config.store_timeout();
        deadline.map_or(limit, |d| {
            limit.min(d.saturating_duration_since(Instant::now()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::memory_store::InMemoryStore;
    use baggage_db::entities::notification::NotificationType;
    use chrono::Duration as ChronoDuration;
    use proptest::prelude::*;
    use std::sync::Arc;

    fn candidate(
        id: &str,
        notification_type: NotificationType,
        bag_set_id: Option<&str>,
        priority: NotificationPriority,
    ) -> notification::Model {
        let now = Utc::now();
        notification::Model {
            id: id.to_string(),
            notification_type,
            priority,
            title: "Alert".to_string(),
            message: "Alert body".to_string(),
            flight_id: Some("f1".to_string()),
            bag_set_id: bag_set_id.map(ToString::to_string),
            bag_piece_id: None,
            station: Some("LHR".to_string()),
            is_read: false,
            created_at: now.into(),
            expires_at: Some((now + ChronoDuration::hours(24)).into()),
        }
    }

    fn service(store: Arc<InMemoryStore>) -> NotificationService {
        NotificationService::new(store, ReconciliationConfig::default())
    }

    #[test]
    fn test_count_unread_by_priority_skips_read() {
        let mut read = candidate(
            "n3",
            NotificationType::BagMissing,
            None,
            NotificationPriority::Urgent,
        );
        read.is_read = true;
        let notifications = vec![
            candidate("n1", NotificationType::BagMissing, None, NotificationPriority::Urgent),
            candidate("n2", NotificationType::IncompleteBagSet, None, NotificationPriority::Medium),
            read,
        ];

        let counts = count_unread_by_priority(&notifications);

        assert_eq!(
            counts,
            UnreadCounts {
                urgent: 1,
                high: 0,
                medium: 1,
                low: 0,
                total: 2
            }
        );
    }

    #[tokio::test]
    async fn test_persist_skips_existing_natural_key() {
        let store = Arc::new(InMemoryStore::new());
        store
            .insert_notification(candidate(
                "old",
                NotificationType::IncompleteBagSet,
                Some("s1"),
                NotificationPriority::Medium,
            ))
            .await;
        let service = service(store.clone());

        let outcome = service
            .persist(
                vec![
                    candidate(
                        "new1",
                        NotificationType::IncompleteBagSet,
                        Some("s1"),
                        NotificationPriority::Medium,
                    ),
                    candidate(
                        "new2",
                        NotificationType::IncompleteBagSet,
                        Some("s2"),
                        NotificationPriority::Medium,
                    ),
                ],
                Some("LHR"),
                Utc::now(),
                None,
            )
            .await
            .unwrap();

        assert_eq!(outcome.existing.len(), 1);
        assert_eq!(outcome.skipped, 1);
        assert_eq!(outcome.created.len(), 1);
        assert_eq!(outcome.created[0].id, "new2");
        assert_eq!(store.notification_writes(), 1);
    }

    #[tokio::test]
    async fn test_persist_ignores_read_and_expired_rows() {
        let store = Arc::new(InMemoryStore::new());
        let now = Utc::now();
        let mut read = candidate(
            "read",
            NotificationType::BagMissing,
            Some("s1"),
            NotificationPriority::High,
        );
        read.is_read = true;
        let mut expired = candidate(
            "expired",
            NotificationType::IncompleteBagSet,
            Some("s9"),
            NotificationPriority::Medium,
        );
        expired.expires_at = Some((now - ChronoDuration::minutes(5)).into());
        store.insert_notification(read).await;
        store.insert_notification(expired).await;

        let outcome = service(store.clone())
            .persist(
                vec![
                    candidate(
                        "n1",
                        NotificationType::BagMissing,
                        Some("s1"),
                        NotificationPriority::High,
                    ),
                    candidate(
                        "n2",
                        NotificationType::IncompleteBagSet,
                        Some("s1"),
                        NotificationPriority::Medium,
                    ),
                ],
                None,
                now,
                None,
            )
            .await
            .unwrap();

        assert!(outcome.existing.is_empty());
        assert_eq!(outcome.created.len(), 2);
    }

    #[tokio::test]
    async fn test_persist_isolates_failed_writes() {
        let store = Arc::new(InMemoryStore::new());
        store.fail_notification_writes(NotificationType::BagMissing).await;

        let outcome = service(store.clone())
            .persist(
                vec![
                    candidate(
                        "n1",
                        NotificationType::BagMissing,
                        Some("s1"),
                        NotificationPriority::Urgent,
                    ),
                    candidate(
                        "n2",
                        NotificationType::IncompleteBagSet,
                        Some("s1"),
                        NotificationPriority::Medium,
                    ),
                ],
                None,
                Utc::now(),
                None,
            )
            .await
            .unwrap();

        assert_eq!(outcome.failed.len(), 1);
        assert_eq!(outcome.failed[0].key.notification_type, NotificationType::BagMissing);
        assert_eq!(outcome.created.len(), 1);
        assert_eq!(store.notifications().await.len(), 1);
    }

    #[tokio::test]
    async fn test_persist_dedupes_within_batch() {
        let store = Arc::new(InMemoryStore::new());

        let outcome = service(store.clone())
            .persist(
                vec![
                    candidate(
                        "n1",
                        NotificationType::IncompleteBagSet,
                        Some("s1"),
                        NotificationPriority::Medium,
                    ),
                    candidate(
                        "n2",
                        NotificationType::IncompleteBagSet,
                        Some("s1"),
                        NotificationPriority::Medium,
                    ),
                ],
                None,
                Utc::now(),
                None,
            )
            .await
            .unwrap();

        assert_eq!(outcome.created.len(), 1);
        assert_eq!(outcome.skipped, 1);
        assert!(outcome.failed.is_empty());
    }

    #[tokio::test]
    async fn test_read_path() {
        let store = Arc::new(InMemoryStore::new());
        let now = Utc::now();
        let mut expired = candidate(
            "n0",
            NotificationType::BagMissing,
            Some("s0"),
            NotificationPriority::Urgent,
        );
        expired.expires_at = Some((now - ChronoDuration::seconds(1)).into());
        store.insert_notification(expired).await;
        store
            .insert_notification(candidate(
                "n1",
                NotificationType::IncompleteBagSet,
                Some("s1"),
                NotificationPriority::Medium,
            ))
            .await;
        store
            .insert_notification(candidate(
                "n2",
                NotificationType::BagMissing,
                Some("s2"),
                NotificationPriority::Urgent,
            ))
            .await;
        let service = service(store);

        let listed = service
            .list_notifications(&NotificationFilter::default(), now)
            .await
            .unwrap();
        assert_eq!(
            listed.iter().map(|n| n.id.as_str()).collect::<Vec<_>>(),
            vec!["n2", "n1"]
        );

        let counts = service.unread_counts(Some("LHR"), now).await.unwrap();
        assert_eq!(counts.total, 2);
        assert_eq!(counts.urgent, 1);

        let read = service.mark_as_read("n2").await.unwrap();
        assert!(read.is_read);
        assert_eq!(service.unread_counts(None, now).await.unwrap().total, 1);

        assert_eq!(service.mark_all_as_read(Some("LHR")).await.unwrap(), 2);
        assert_eq!(service.purge_expired(now).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_mark_unknown_as_read_is_not_found() {
        let service = service(Arc::new(InMemoryStore::new()));

        let result = service.mark_as_read("missing").await;

        assert!(matches!(result, Err(baggage_common::AppError::NotFound(_))));
    }

    proptest! {
        #[test]
        fn prop_filter_expired_never_returns_expired(
            offsets in proptest::collection::vec(proptest::option::of(-600i64..600), 0..30)
        ) {
            let now = Utc::now();
            let notifications: Vec<_> = offsets
                .iter()
                .enumerate()
                .map(|(i, offset)| {
                    let mut n = candidate(
                        &format!("n{i}"),
                        NotificationType::BagMissing,
                        None,
                        NotificationPriority::High,
                    );
                    n.expires_at = offset.map(|o| (now + ChronoDuration::seconds(o)).into());
                    n
                })
                .collect();

            let kept = filter_expired(notifications.clone(), now);

            prop_assert!(kept.iter().all(|n| !is_expired(n, now)));
            let expected_kept = offsets
                .iter()
                .filter(|o| o.is_none_or(|o| o >= 0))
                .count();
            prop_assert_eq!(kept.len(), expected_kept);
        }
    }
}
