//! Periodic reconciliation passes and notification cleanup.

use std::sync::Arc;
use std::time::Duration;

use baggage_core::{NotificationService, PassContext, ReconciliationPassService};
use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

/// Scheduled work the server runs on its own.
#[async_trait::async_trait]
pub trait JobExecutor: Send + Sync {
    /// Run one reconciliation pass over every station.
    async fn run_pass(&self) -> Result<PassSummary, Box<dyn std::error::Error + Send + Sync>>;

    /// Delete notifications past their expiry.
    async fn purge_expired_notifications(
        &self,
    ) -> Result<u64, Box<dyn std::error::Error + Send + Sync>>;
}

/// What a scheduled pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub visible: usize,
    pub created: usize,
    pub skipped_flights: usize,
    pub failed_writes: usize,
}

/// Executor backed by the engine's services.
pub struct ServiceExecutor {
    pass_service: ReconciliationPassService,
    notification_service: NotificationService,
}

impl ServiceExecutor {
    #[must_use]
    pub const fn new(
        pass_service: ReconciliationPassService,
        notification_service: NotificationService,
    ) -> Self {
        Self {
            pass_service,
            notification_service,
        }
    }
}

#[async_trait::async_trait]
impl JobExecutor for ServiceExecutor {
    async fn run_pass(&self) -> Result<PassSummary, Box<dyn std::error::Error + Send + Sync>> {
        let report = self
            .pass_service
            .run_reconciliation_pass(&PassContext::new(None))
            .await?;

        if let Some(error) = report.error() {
            tracing::warn!(error = %error, "Scheduled pass partially failed");
        }

        Ok(PassSummary {
            visible: report.notifications.len(),
            created: report.created.len(),
            skipped_flights: report.skipped_flights.len(),
            failed_writes: report.failed_writes.len(),
        })
    }

    async fn purge_expired_notifications(
        &self,
    ) -> Result<u64, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.notification_service.purge_expired(Utc::now()).await?)
    }
}

/// Spawn the pass loop and the cleanup loop.
///
/// A pass that overruns its interval delays the next tick instead of
/// queueing a burst of passes.
pub fn run_scheduler<E: JobExecutor + 'static>(
    pass_interval: Duration,
    cleanup_interval: Duration,
    executor: Arc<E>,
) -> Vec<JoinHandle<()>> {
    let executor_pass = executor.clone();
    let executor_cleanup = executor;

    let pass = tokio::spawn(async move {
        let mut interval = interval(pass_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            match executor_pass.run_pass().await {
                Ok(summary) => {
                    tracing::info!(
                        visible = summary.visible,
                        created = summary.created,
                        skipped_flights = summary.skipped_flights,
                        failed_writes = summary.failed_writes,
                        "Scheduled reconciliation pass finished"
                    );
                }
                Err(e) => {
                    tracing::error!(error = %e, "Scheduled reconciliation pass failed");
                }
            }
        }
    });

    let cleanup = tokio::spawn(async move {
        let mut interval = interval(cleanup_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            match executor_cleanup.purge_expired_notifications().await {
                Ok(count) => {
                    if count > 0 {
                        tracing::info!(count, "Cleaned up expired notifications");
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to cleanup expired notifications");
                }
            }
        }
    });

    vec![pass, cleanup]
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use baggage_common::ReconciliationConfig;
    use baggage_core::InMemoryStore;

    #[derive(Default)]
    struct CountingExecutor {
        passes: AtomicUsize,
        purges: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl JobExecutor for CountingExecutor {
        async fn run_pass(&self) -> Result<PassSummary, Box<dyn std::error::Error + Send + Sync>> {
            self.passes.fetch_add(1, Ordering::SeqCst);
            Ok(PassSummary::default())
        }

        async fn purge_expired_notifications(
            &self,
        ) -> Result<u64, Box<dyn std::error::Error + Send + Sync>> {
            self.purges.fetch_add(1, Ordering::SeqCst);
            Err("store down".into())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_loops_tick_on_their_own_intervals() {
        let executor = Arc::new(CountingExecutor::default());
        let handles = run_scheduler(
            Duration::from_secs(30),
            Duration::from_secs(3600),
            executor.clone(),
        );

        // Both intervals fire immediately, then passes every 30 seconds.
        tokio::time::sleep(Duration::from_secs(95)).await;

        assert_eq!(executor.passes.load(Ordering::SeqCst), 4);
        assert_eq!(executor.purges.load(Ordering::SeqCst), 1);

        for handle in handles {
            handle.abort();
        }
    }

    #[tokio::test]
    async fn test_service_executor_runs_pass_on_empty_store() {
        let store = Arc::new(InMemoryStore::new());
        let config = ReconciliationConfig::default();
        let executor = ServiceExecutor::new(
            ReconciliationPassService::new(store.clone(), config.clone()),
            NotificationService::new(store, config),
        );

        let summary = executor.run_pass().await.unwrap();
        let purged = executor.purge_expired_notifications().await.unwrap();

        assert_eq!(summary, PassSummary::default());
        assert_eq!(purged, 0);
    }
}
