//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test -p baggage-db --features test-utils --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `baggage_test`)
//!   `TEST_DB_PASSWORD` (default: `baggage_test`)
//!   `TEST_DB_NAME` (default: `baggage_test`)

#![allow(clippy::unwrap_used, clippy::expect_used)]

use baggage_common::AppError;
use baggage_db::{
    entities::{
        bag_piece::{self, BagStatus},
        bag_set::{self, BagSetStatus},
        flight,
        notification::{self, NotificationPriority, NotificationType},
        passenger::{self, PassengerStatus},
    },
    repositories::{BagPieceRepository, BagSetRepository, NotificationRepository},
    test_utils::TestDatabase,
};
use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

async fn seed_bag_set(conn: &DatabaseConnection) {
    let now = Utc::now();

    flight::ActiveModel {
        id: Set("f1".to_string()),
        code: Set("BA117".to_string()),
        origin: Set("LHR".to_string()),
        destination: Set("JFK".to_string()),
        scheduled_at: Set((now + Duration::minutes(90)).into()),
        gate_closes_at: Set(None),
        created_at: Set(now.into()),
    }
    .insert(conn)
    .await
    .unwrap();

    passenger::ActiveModel {
        id: Set("pax1".to_string()),
        flight_id: Set("f1".to_string()),
        name: Set("Ada Lovelace".to_string()),
        pnr: Set(None),
        pieces_declared: Set(2),
        status: Set(PassengerStatus::CheckedIn),
        created_at: Set(now.into()),
    }
    .insert(conn)
    .await
    .unwrap();

    bag_set::ActiveModel {
        id: Set("s1".to_string()),
        passenger_id: Set("pax1".to_string()),
        flight_id: Set("f1".to_string()),
        base_tag: Set("0125000001".to_string()),
        pieces_expected: Set(2),
        status: Set(BagSetStatus::InProgress),
        created_at: Set(now.into()),
        updated_at: Set(None),
    }
    .insert(conn)
    .await
    .unwrap();
}

fn piece(id: &str, tag: &str, index: i32) -> bag_piece::ActiveModel {
    bag_piece::ActiveModel {
        id: Set(id.to_string()),
        bag_set_id: Set("s1".to_string()),
        tag_full: Set(tag.to_string()),
        piece_index: Set(index),
        status: Set(BagStatus::Created),
        last_scan_at: Set(None),
        station: Set(None),
        boarding_pass_id: Set(None),
        created_at: Set(Utc::now().into()),
    }
}

fn incomplete_alert(id: &str) -> notification::ActiveModel {
    let now = Utc::now();
    notification::ActiveModel {
        id: Set(id.to_string()),
        notification_type: Set(NotificationType::IncompleteBagSet),
        priority: Set(NotificationPriority::Medium),
        title: Set("Incomplete bag set for Ada Lovelace".to_string()),
        message: Set("1 of 2 bags scanned".to_string()),
        flight_id: Set(Some("f1".to_string())),
        bag_set_id: Set(Some("s1".to_string())),
        bag_piece_id: Set(None),
        station: Set(Some("LHR".to_string())),
        is_read: Set(false),
        created_at: Set(now.into()),
        expires_at: Set(Some((now + Duration::hours(24)).into())),
    }
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_unread_natural_key_is_unique() {
    let db = TestDatabase::new().await.expect("Failed to connect");
    db.cleanup().await.unwrap();
    seed_bag_set(db.connection()).await;
    let repo = NotificationRepository::new(db.shared());

    repo.create(incomplete_alert("n1")).await.unwrap();
    let duplicate = repo.create(incomplete_alert("n2")).await;
    assert!(matches!(duplicate, Err(AppError::StoreUnavailable(_))));

    // Once read, the same condition may alert again.
    repo.set_read("n1", true).await.unwrap();
    repo.create(incomplete_alert("n3")).await.unwrap();

    db.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_piece_index_is_unique_within_set() {
    let db = TestDatabase::new().await.expect("Failed to connect");
    db.cleanup().await.unwrap();
    seed_bag_set(db.connection()).await;

    piece("p1", "0125000001", 1)
        .insert(db.connection())
        .await
        .unwrap();
    let same_index = piece("p2", "0125000002", 1).insert(db.connection()).await;
    let same_tag = piece("p3", "0125000001", 2).insert(db.connection()).await;

    assert!(same_index.is_err());
    assert!(same_tag.is_err());

    db.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_scan_state_and_set_status_round_trip() {
    let db = TestDatabase::new().await.expect("Failed to connect");
    db.cleanup().await.unwrap();
    seed_bag_set(db.connection()).await;
    let conn = db.shared();
    let pieces = BagPieceRepository::new(conn.clone());
    let sets = BagSetRepository::new(conn);

    piece("p1", "0125000001", 1)
        .insert(db.connection())
        .await
        .unwrap();

    let mut scanned = pieces.find_by_tag("0125000001").await.unwrap().unwrap();
    scanned.status = BagStatus::Loaded;
    scanned.station = Some("LHR".to_string());
    scanned.last_scan_at = Some(Utc::now().into());
    pieces.update_scan_state(scanned).await.unwrap();

    let stored = pieces.find_by_set("s1").await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].status, BagStatus::Loaded);

    let set = sets.update_status("s1", BagSetStatus::Complete).await.unwrap();
    assert_eq!(set.status, BagSetStatus::Complete);
    assert!(set.updated_at.is_some());

    db.cleanup().await.unwrap();
}
