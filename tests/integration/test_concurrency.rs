//! Concurrency tests: the booking check-then-act window must be serialized
//! per place.

use crate::common::{booking_err, harness, monday_at, register};
use waitline::{BookingError, Role};

#[tokio::test]
async fn test_concurrent_double_booking_one_wins() {
    let h = harness().await;
    let queue = h.coordinator.create_queue("Clinic").await.unwrap();
    let doctor = register(&h, "doctor1", Role::Employee).await;
    register(&h, "alice", Role::Client).await;
    register(&h, "bob", Role::Client).await;

    h.coordinator
        .add_place(&queue.id, &doctor.user_id)
        .await
        .unwrap();

    let time = monday_at(9, 0);
    let c1 = h.coordinator.clone();
    let c2 = h.coordinator.clone();
    let q1 = queue.id.clone();
    let q2 = queue.id.clone();
    let p1 = doctor.user_id.clone();
    let p2 = doctor.user_id.clone();

    let (a, b) = tokio::join!(
        tokio::spawn(async move { c1.book_appointment(&q1, "alice", &p1, time).await }),
        tokio::spawn(async move { c2.book_appointment(&q2, "bob", &p2, time).await }),
    );
    let results = [a.unwrap(), b.unwrap()];

    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one booking must win the slot");

    let loser = results.into_iter().find(|r| r.is_err()).unwrap();
    assert!(matches!(
        booking_err(loser.unwrap_err()),
        BookingError::Conflict(_)
    ));
}

#[tokio::test]
async fn test_concurrent_bookings_on_different_slots_both_succeed() {
    let h = harness().await;
    let queue = h.coordinator.create_queue("Clinic").await.unwrap();
    let doctor = register(&h, "doctor1", Role::Employee).await;
    register(&h, "alice", Role::Client).await;
    register(&h, "bob", Role::Client).await;

    h.coordinator
        .add_place(&queue.id, &doctor.user_id)
        .await
        .unwrap();

    let c1 = h.coordinator.clone();
    let c2 = h.coordinator.clone();
    let q1 = queue.id.clone();
    let q2 = queue.id.clone();
    let p1 = doctor.user_id.clone();
    let p2 = doctor.user_id.clone();

    let (a, b) = tokio::join!(
        tokio::spawn(async move { c1.book_appointment(&q1, "alice", &p1, monday_at(9, 0)).await }),
        tokio::spawn(async move { c2.book_appointment(&q2, "bob", &p2, monday_at(12, 0)).await }),
    );
    assert!(a.unwrap().is_ok());
    assert!(b.unwrap().is_ok());

    let roster = h.coordinator.find_queue(&queue.id).await.unwrap().unwrap();
    assert_eq!(roster.clients.len(), 2);
}

#[tokio::test]
async fn test_concurrent_bookings_on_different_places_are_independent() {
    let h = harness().await;
    let queue = h.coordinator.create_queue("Clinic").await.unwrap();
    let doctor1 = register(&h, "doctor1", Role::Employee).await;
    let doctor2 = register(&h, "doctor2", Role::Employee).await;
    register(&h, "alice", Role::Client).await;
    register(&h, "bob", Role::Client).await;

    h.coordinator
        .add_place(&queue.id, &doctor1.user_id)
        .await
        .unwrap();
    h.coordinator
        .add_place(&queue.id, &doctor2.user_id)
        .await
        .unwrap();

    let time = monday_at(9, 0);
    let c1 = h.coordinator.clone();
    let c2 = h.coordinator.clone();
    let q1 = queue.id.clone();
    let q2 = queue.id.clone();
    let p1 = doctor1.user_id.clone();
    let p2 = doctor2.user_id.clone();

    // Same minute, different places: no contention, both win.
    let (a, b) = tokio::join!(
        tokio::spawn(async move { c1.book_appointment(&q1, "alice", &p1, time).await }),
        tokio::spawn(async move { c2.book_appointment(&q2, "bob", &p2, time).await }),
    );
    assert!(a.unwrap().is_ok());
    assert!(b.unwrap().is_ok());
}
