//! Booking admission integration tests
//!
//! Each test runs against its own tempfile-backed SQLite database so the
//! concurrency tests exercise real pool contention and real transactions.

use booking_server::DbService;
use booking_server::db::models::BookingCreate;
use booking_server::db::repository::{
    AdmitOutcome, BookingRepository, RejectReason, RepoError, RescheduleOutcome, SlotStatus,
};
use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

async fn setup() -> (tempfile::TempDir, BookingRepository) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("booking.db");
    let db = DbService::new(path.to_str().unwrap()).await.unwrap();

    sqlx::query(
        "INSERT INTO dining_table (id, name, capacity, is_active) VALUES
         (2, 'Window 2', 2, 1),
         (3, 'Booth 3', 8, 1)",
    )
    .execute(&db.write_pool)
    .await
    .unwrap();
    sqlx::query(
        "INSERT INTO customer (id, name, phone, email) VALUES
         (5, 'Dana Reyes', '555-0105', 'dana@example.com'),
         (6, 'Kofi Mensah', '555-0106', NULL)",
    )
    .execute(&db.write_pool)
    .await
    .unwrap();

    (dir, BookingRepository::new(db))
}

fn slot(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

fn request(table_id: i64, customer_id: i64, at: &str, party_size: i32) -> BookingCreate {
    BookingCreate {
        customer_id,
        table_id,
        slot: slot(at),
        party_size,
        notes: None,
    }
}

async fn admit(repo: &BookingRepository, data: BookingCreate) -> AdmitOutcome {
    repo.admit(data, &CancellationToken::new()).await.unwrap()
}

#[tokio::test]
async fn concurrent_admissions_admit_exactly_one() {
    let (_dir, repo) = setup().await;

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let repo = repo.clone();
            tokio::spawn(async move {
                let data = request(3, 5, "2022-11-12T19:00:00Z", 4);
                repo.admit(data, &CancellationToken::new()).await
            })
        })
        .collect();

    let mut admitted = 0;
    let mut rejected = 0;
    for result in futures::future::join_all(handles).await {
        match result.unwrap().unwrap() {
            AdmitOutcome::Admitted(booking) => {
                assert_eq!(booking.table_id, 3);
                assert_eq!(booking.slot, slot("2022-11-12T19:00:00Z"));
                admitted += 1;
            }
            AdmitOutcome::Rejected(reason) => {
                assert_eq!(reason, RejectReason::SlotTaken);
                assert_eq!(reason.message(), "table already booked");
                rejected += 1;
            }
        }
    }
    assert_eq!(admitted, 1);
    assert_eq!(rejected, 3);
}

#[tokio::test]
async fn duplicate_admission_is_rejected() {
    let (_dir, repo) = setup().await;

    let first = admit(&repo, request(3, 5, "2022-11-12T19:00:00Z", 4)).await;
    assert!(matches!(first, AdmitOutcome::Admitted(_)));

    // Identical arguments, including the same customer
    let second = admit(&repo, request(3, 5, "2022-11-12T19:00:00Z", 4)).await;
    assert!(matches!(
        second,
        AdmitOutcome::Rejected(RejectReason::SlotTaken)
    ));
}

#[tokio::test]
async fn different_slot_on_same_table_is_admitted() {
    let (_dir, repo) = setup().await;

    let first = admit(&repo, request(3, 5, "2022-11-12T19:00:00Z", 4)).await;
    assert!(matches!(first, AdmitOutcome::Admitted(_)));

    let later = admit(&repo, request(3, 6, "2022-11-12T21:00:00Z", 2)).await;
    assert!(matches!(later, AdmitOutcome::Admitted(_)));
}

#[tokio::test]
async fn cancellation_frees_the_slot() {
    let (_dir, repo) = setup().await;

    let booking = match admit(&repo, request(3, 5, "2022-11-12T19:00:00Z", 4)).await {
        AdmitOutcome::Admitted(b) => b,
        other => panic!("expected admission, got {other:?}"),
    };

    repo.cancel(booking.id).await.unwrap();

    let readmitted = admit(&repo, request(3, 6, "2022-11-12T19:00:00Z", 2)).await;
    assert!(matches!(readmitted, AdmitOutcome::Admitted(_)));

    // The cancelled booking is gone; a second cancel observes NotFound
    assert!(repo.find_by_id(booking.id).await.unwrap().is_none());
    assert!(matches!(
        repo.cancel(booking.id).await,
        Err(RepoError::NotFound(_))
    ));
}

#[tokio::test]
async fn reschedule_onto_occupied_slot_is_rejected_and_slot_unchanged() {
    let (_dir, repo) = setup().await;

    let occupied = admit(&repo, request(3, 5, "2022-11-12T19:00:00Z", 4)).await;
    assert!(matches!(occupied, AdmitOutcome::Admitted(_)));

    let moving = match admit(&repo, request(3, 6, "2022-11-12T21:00:00Z", 2)).await {
        AdmitOutcome::Admitted(b) => b,
        other => panic!("expected admission, got {other:?}"),
    };

    let outcome = repo
        .reschedule(
            moving.id,
            slot("2022-11-12T19:00:00Z"),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
    assert!(matches!(
        outcome,
        RescheduleOutcome::Rejected(RejectReason::SlotTaken)
    ));

    let unchanged = repo.find_by_id(moving.id).await.unwrap().unwrap();
    assert_eq!(unchanged.slot, slot("2022-11-12T21:00:00Z"));
}

#[tokio::test]
async fn reschedule_onto_free_slot_moves_the_booking() {
    let (_dir, repo) = setup().await;

    let booking = match admit(&repo, request(3, 5, "2022-11-12T19:00:00Z", 4)).await {
        AdmitOutcome::Admitted(b) => b,
        other => panic!("expected admission, got {other:?}"),
    };

    let outcome = repo
        .reschedule(
            booking.id,
            slot("2022-11-13T19:00:00Z"),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
    let moved = match outcome {
        RescheduleOutcome::Rescheduled(b) => b,
        other => panic!("expected reschedule, got {other:?}"),
    };
    assert_eq!(moved.slot, slot("2022-11-13T19:00:00Z"));

    let stored = repo.find_by_id(booking.id).await.unwrap().unwrap();
    assert_eq!(stored.slot, slot("2022-11-13T19:00:00Z"));

    // The old slot is free again
    let readmitted = admit(&repo, request(3, 6, "2022-11-12T19:00:00Z", 2)).await;
    assert!(matches!(readmitted, AdmitOutcome::Admitted(_)));
}

#[tokio::test]
async fn reschedule_onto_own_slot_is_a_noop_success() {
    let (_dir, repo) = setup().await;

    let booking = match admit(&repo, request(3, 5, "2022-11-12T19:00:00Z", 4)).await {
        AdmitOutcome::Admitted(b) => b,
        other => panic!("expected admission, got {other:?}"),
    };

    let outcome = repo
        .reschedule(
            booking.id,
            slot("2022-11-12T19:00:00Z"),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
    assert!(matches!(outcome, RescheduleOutcome::Rescheduled(_)));
}

#[tokio::test]
async fn reschedule_unknown_booking_is_not_found() {
    let (_dir, repo) = setup().await;

    let result = repo
        .reschedule(9, slot("2022-11-12T19:00:00Z"), &CancellationToken::new())
        .await;
    assert!(matches!(result, Err(RepoError::NotFound(_))));
}

#[tokio::test]
async fn availability_reflects_exact_slot_only() {
    let (_dir, repo) = setup().await;

    let admitted = admit(&repo, request(2, 5, "2022-10-11T20:00:00Z", 2)).await;
    assert!(matches!(admitted, AdmitOutcome::Admitted(_)));

    let occupied = repo
        .check_availability(2, slot("2022-10-11T20:00:00Z"))
        .await
        .unwrap();
    assert_eq!(occupied.status, SlotStatus::Occupied);
    assert!(occupied.message.contains('2'));

    // Any other slot on table 2 is still available
    let available = repo
        .check_availability(2, slot("2022-10-11T21:00:00Z"))
        .await
        .unwrap();
    assert_eq!(available.status, SlotStatus::Available);
    assert!(available.message.contains('2'));
}

#[tokio::test]
async fn availability_for_unknown_table_is_not_found() {
    let (_dir, repo) = setup().await;

    let result = repo.check_availability(99, slot("2022-10-11T20:00:00Z")).await;
    assert!(matches!(result, Err(RepoError::NotFound(_))));
}

#[tokio::test]
async fn over_capacity_party_is_rejected_without_state_change() {
    let (_dir, repo) = setup().await;

    // Table 2 seats two
    let outcome = admit(&repo, request(2, 5, "2022-10-11T20:00:00Z", 6)).await;
    assert!(matches!(
        outcome,
        AdmitOutcome::Rejected(RejectReason::OverCapacity { capacity: 2 })
    ));

    let still_free = repo
        .check_availability(2, slot("2022-10-11T20:00:00Z"))
        .await
        .unwrap();
    assert_eq!(still_free.status, SlotStatus::Available);
}

#[tokio::test]
async fn non_positive_party_size_is_invalid_input() {
    let (_dir, repo) = setup().await;

    let result = repo
        .admit(
            request(3, 5, "2022-11-12T19:00:00Z", 0),
            &CancellationToken::new(),
        )
        .await;
    assert!(matches!(result, Err(RepoError::InvalidInput(_))));

    // Rejected before any transaction; the slot stays free
    let free = repo
        .check_availability(3, slot("2022-11-12T19:00:00Z"))
        .await
        .unwrap();
    assert_eq!(free.status, SlotStatus::Available);
}

#[tokio::test]
async fn unknown_table_or_customer_is_not_found() {
    let (_dir, repo) = setup().await;

    let no_table = repo
        .admit(
            request(99, 5, "2022-11-12T19:00:00Z", 2),
            &CancellationToken::new(),
        )
        .await;
    assert!(matches!(no_table, Err(RepoError::NotFound(_))));

    // Customer existence is enforced by the storage layer's foreign key,
    // translated at the repository boundary
    let no_customer = repo
        .admit(
            request(3, 99, "2022-11-12T19:00:00Z", 2),
            &CancellationToken::new(),
        )
        .await;
    assert!(matches!(no_customer, Err(RepoError::NotFound(_))));
}
