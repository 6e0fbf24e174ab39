//! Shared handler state.

use baggage_common::ReconciliationConfig;
use baggage_core::{
    NotificationService, ReconciliationPassService, ReconciliationService, ScanService,
    SharedStore, StatisticsService,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub reconciliation_service: ReconciliationService,
    pub pass_service: ReconciliationPassService,
    pub notification_service: NotificationService,
    pub statistics_service: StatisticsService,
    pub scan_service: ScanService,
}

impl AppState {
    /// Build every service over one store.
    #[must_use]
    pub fn new(store: SharedStore, config: &ReconciliationConfig) -> Self {
        let reconciliation_service = ReconciliationService::new(store.clone(), config.clone());

        Self {
            pass_service: ReconciliationPassService::new(store.clone(), config.clone()),
            notification_service: NotificationService::new(store.clone(), config.clone()),
            statistics_service: StatisticsService::new(reconciliation_service.clone()),
            scan_service: ScanService::new(store),
            reconciliation_service,
        }
    }
}
