//! Cascade integrity: place removal and queue deletion must never leave
//! dangling appointments or schedule records.

use crate::common::{booking_err, harness, monday_at, register};
use waitline::{BookingError, Role};

#[tokio::test]
async fn test_remove_place_strips_appointments() {
    let h = harness().await;
    let queue = h.coordinator.create_queue("Clinic").await.unwrap();
    let doctor = register(&h, "doctor1", Role::Employee).await;
    let alice = register(&h, "alice", Role::Client).await;
    let bob = register(&h, "bob", Role::Client).await;

    h.coordinator
        .add_place(&queue.id, &doctor.user_id)
        .await
        .unwrap();
    h.coordinator
        .book_appointment(&queue.id, "alice", &doctor.user_id, monday_at(9, 0))
        .await
        .unwrap();
    h.coordinator
        .book_appointment(&queue.id, "bob", &doctor.user_id, monday_at(12, 0))
        .await
        .unwrap();

    let updated = h
        .coordinator
        .remove_place(&queue.id, &doctor.user_id)
        .await
        .unwrap();

    // Clients stay in the queue, unappointed.
    assert!(updated.places.is_empty());
    assert_eq!(updated.clients.len(), 2);
    assert!(updated
        .clients
        .iter()
        .all(|c| c.appointment.is_none()));

    // The schedule record is gone.
    let err = h
        .coordinator
        .get_schedule(&doctor.user_id)
        .await
        .unwrap_err();
    assert!(matches!(booking_err(err), BookingError::NotFound(_)));
    assert!(h
        .coordinator
        .appointments_for_client(&alice.user_id)
        .await
        .unwrap()
        .is_empty());
    assert!(h
        .coordinator
        .appointments_for_client(&bob.user_id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_remove_place_keeps_other_places_intact() {
    let h = harness().await;
    let queue = h.coordinator.create_queue("Clinic").await.unwrap();
    let doctor1 = register(&h, "doctor1", Role::Employee).await;
    let doctor2 = register(&h, "doctor2", Role::Employee).await;
    let alice = register(&h, "alice", Role::Client).await;

    h.coordinator
        .add_place(&queue.id, &doctor1.user_id)
        .await
        .unwrap();
    h.coordinator
        .add_place(&queue.id, &doctor2.user_id)
        .await
        .unwrap();
    h.coordinator
        .book_appointment(&queue.id, "alice", &doctor2.user_id, monday_at(9, 0))
        .await
        .unwrap();

    let updated = h
        .coordinator
        .remove_place(&queue.id, &doctor1.user_id)
        .await
        .unwrap();

    // Alice's appointment points at doctor2 and survives.
    assert_eq!(updated.places.len(), 1);
    let entry = updated.client(&alice.user_id).unwrap();
    assert_eq!(
        entry.appointment.as_ref().map(|a| a.place.as_str()),
        Some(doctor2.user_id.as_str())
    );
    assert!(h.coordinator.get_schedule(&doctor2.user_id).await.is_ok());
}

#[tokio::test]
async fn test_remove_unknown_place() {
    let h = harness().await;
    let queue = h.coordinator.create_queue("Clinic").await.unwrap();
    let err = h
        .coordinator
        .remove_place(&queue.id, "nobody")
        .await
        .unwrap_err();
    assert!(matches!(booking_err(err), BookingError::NotFound(_)));
}

#[tokio::test]
async fn test_delete_queue_cascades_through_places() {
    let h = harness().await;
    let queue = h.coordinator.create_queue("Clinic").await.unwrap();
    let doctor1 = register(&h, "doctor1", Role::Employee).await;
    let doctor2 = register(&h, "doctor2", Role::Employee).await;
    register(&h, "alice", Role::Client).await;

    h.coordinator
        .add_place(&queue.id, &doctor1.user_id)
        .await
        .unwrap();
    h.coordinator
        .add_place(&queue.id, &doctor2.user_id)
        .await
        .unwrap();
    h.coordinator
        .book_appointment(&queue.id, "alice", &doctor1.user_id, monday_at(9, 0))
        .await
        .unwrap();

    h.coordinator.delete_queue(&queue.id).await.unwrap();

    assert!(h.coordinator.find_queue(&queue.id).await.unwrap().is_none());
    for doctor in [&doctor1, &doctor2] {
        let err = h
            .coordinator
            .get_schedule(&doctor.user_id)
            .await
            .unwrap_err();
        assert!(matches!(booking_err(err), BookingError::NotFound(_)));
    }
}

#[tokio::test]
async fn test_delete_unknown_queue() {
    let h = harness().await;
    let err = h.coordinator.delete_queue("no-such-queue").await.unwrap_err();
    assert!(matches!(booking_err(err), BookingError::NotFound(_)));
}

#[tokio::test]
async fn test_queue_name_freed_after_delete() {
    let h = harness().await;
    let queue = h.coordinator.create_queue("Clinic").await.unwrap();

    let err = h.coordinator.create_queue("Clinic").await.unwrap_err();
    assert!(matches!(booking_err(err), BookingError::Conflict(_)));

    h.coordinator.delete_queue(&queue.id).await.unwrap();
    h.coordinator.create_queue("Clinic").await.unwrap();
}
