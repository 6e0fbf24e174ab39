//! Reconciliation and alerting services.

#![allow(missing_docs)]

pub mod alert;
pub mod memory_store;
pub mod notification;
pub mod pass;
pub mod reconciliation;
pub mod scan;
pub mod statistics;
pub mod store;

pub use alert::{AlertDeriver, dedupe_by_natural_key, sort_notifications};
pub use memory_store::InMemoryStore;
pub use notification::{
    FailedWrite, NotificationService, PersistOutcome, UnreadCounts, count_unread_by_priority,
    filter_expired, is_expired,
};
pub use pass::{PassContext, PassReport, ReconciliationPassService, SkippedFlight};
pub use reconciliation::{
    BagSetEvaluation, BagSetSnapshot, FlightSnapshot, PassengerSnapshot, ReconciliationService,
    evaluate_bag_set, load_flight_snapshot,
};
pub use scan::{ScanInput, ScanOutcome, ScanService, scan_transition};
pub use statistics::{FlightStats, StationStats, StatisticsService, completion_rate};
pub use store::{
    EntityStore, NotificationFilter, NotificationPatch, RepositoryStore, SharedStore, bounded,
};
