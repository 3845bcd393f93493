// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Staff verification, dashboard and seeding tests.

use tablebook_domain::{Booking, BookingStatus, TableStatus};
use tablebook_persistence::Persistence;

use crate::{
    ApiError, BookingActionResponse, DashboardResponse, EditBookingRequest, RejectBookingRequest,
    ReserveBookingRequest, SeedTablesRequest, approve_booking, delete_booking, edit_booking,
    list_bookings, reject_booking, reserve_booking, seed_tables,
};

use super::helpers::{
    TEST_TABLE_COUNT, TEST_TABLE_PRICE, create_test_admin, create_test_attachment,
    create_test_persistence, create_test_slip, create_test_staff, create_test_store,
    create_unlimited_admission, create_valid_request, get_table, table_id_for,
};

/// Reserves table `number` and returns the booking id.
async fn reserve(persistence: &Persistence, number: u32, with_slip: bool) -> String {
    let table_id: i64 = table_id_for(persistence, number);
    let request = ReserveBookingRequest {
        slip: with_slip.then(|| create_test_slip(128)),
        ..create_valid_request(table_id)
    };

    reserve_booking(
        persistence,
        &create_test_attachment(&create_test_store()),
        &create_unlimited_admission(),
        "10.0.0.1",
        request,
    )
    .await
    .unwrap()
    .booking_id
}

fn stored_booking(persistence: &Persistence, booking_id: &str) -> Booking {
    persistence.get_booking(booking_id).unwrap().unwrap()
}

#[tokio::test]
async fn test_approve_marks_paid_and_books_table() {
    let persistence = create_test_persistence();
    let (actor, operator) = create_test_staff(&persistence);
    let booking_id: String = reserve(&persistence, 1, true).await;

    let response: BookingActionResponse =
        approve_booking(&persistence, &booking_id, &actor, &operator).unwrap();

    assert!(response.changed);
    assert_eq!(response.status.as_deref(), Some("PAID"));

    let booking: Booking = stored_booking(&persistence, &booking_id);
    assert_eq!(booking.status, BookingStatus::Paid);
    assert!(booking.verified_at.is_some());
    assert_eq!(booking.updated_by.as_deref(), Some("Front Desk"));
    assert_eq!(
        get_table(&persistence, booking.table_id.value()).status,
        TableStatus::Booked
    );

    let dashboard: DashboardResponse = list_bookings(&persistence, &actor).unwrap();
    assert_eq!(dashboard.stats.paid_count, 1);
    assert_eq!(dashboard.stats.pending_count, 0);
    assert_eq!(dashboard.stats.total_revenue, TEST_TABLE_PRICE);
}

#[tokio::test]
async fn test_approve_pending_payment_without_slip() {
    let persistence = create_test_persistence();
    let (actor, operator) = create_test_staff(&persistence);
    let booking_id: String = reserve(&persistence, 2, false).await;

    approve_booking(&persistence, &booking_id, &actor, &operator).unwrap();

    assert_eq!(
        stored_booking(&persistence, &booking_id).status,
        BookingStatus::Paid
    );
}

#[tokio::test]
async fn test_approving_twice_changes_nothing() {
    let persistence = create_test_persistence();
    let (actor, operator) = create_test_staff(&persistence);
    let booking_id: String = reserve(&persistence, 1, true).await;
    approve_booking(&persistence, &booking_id, &actor, &operator).unwrap();
    let first: Booking = stored_booking(&persistence, &booking_id);

    let response = approve_booking(&persistence, &booking_id, &actor, &operator).unwrap();

    assert!(!response.changed);
    assert_eq!(response.status.as_deref(), Some("PAID"));
    assert_eq!(stored_booking(&persistence, &booking_id), first);
}

#[tokio::test]
async fn test_reject_releases_table_and_keeps_record() {
    let persistence = create_test_persistence();
    let (actor, operator) = create_test_staff(&persistence);
    let booking_id: String = reserve(&persistence, 3, true).await;

    let response = reject_booking(
        &persistence,
        &booking_id,
        RejectBookingRequest {
            reason: Some(String::from("  Slip amount does not match  ")),
        },
        &actor,
        &operator,
    )
    .unwrap();

    assert!(response.changed);
    assert_eq!(response.status.as_deref(), Some("REJECTED"));

    let booking: Booking = stored_booking(&persistence, &booking_id);
    assert_eq!(booking.status, BookingStatus::Rejected);
    assert_eq!(
        booking.rejection_reason.as_deref(),
        Some("Slip amount does not match")
    );
    assert_eq!(
        get_table(&persistence, booking.table_id.value()).status,
        TableStatus::Available
    );

    // The table can be reserved again.
    reserve(&persistence, 3, false).await;
}

#[tokio::test]
async fn test_rejecting_twice_changes_nothing() {
    let persistence = create_test_persistence();
    let (actor, operator) = create_test_staff(&persistence);
    let booking_id: String = reserve(&persistence, 3, true).await;
    reject_booking(
        &persistence,
        &booking_id,
        RejectBookingRequest::default(),
        &actor,
        &operator,
    )
    .unwrap();

    let response = reject_booking(
        &persistence,
        &booking_id,
        RejectBookingRequest::default(),
        &actor,
        &operator,
    )
    .unwrap();

    assert!(!response.changed);
}

#[tokio::test]
async fn test_approving_rejected_booking_conflicts() {
    let persistence = create_test_persistence();
    let (actor, operator) = create_test_staff(&persistence);
    let booking_id: String = reserve(&persistence, 4, true).await;
    reject_booking(
        &persistence,
        &booking_id,
        RejectBookingRequest::default(),
        &actor,
        &operator,
    )
    .unwrap();

    let result = approve_booking(&persistence, &booking_id, &actor, &operator);

    assert!(matches!(result, Err(ApiError::Conflict { .. })));
    assert_eq!(
        stored_booking(&persistence, &booking_id).status,
        BookingStatus::Rejected
    );
}

#[tokio::test]
async fn test_rejecting_paid_booking_conflicts() {
    let persistence = create_test_persistence();
    let (actor, operator) = create_test_staff(&persistence);
    let booking_id: String = reserve(&persistence, 5, true).await;
    approve_booking(&persistence, &booking_id, &actor, &operator).unwrap();

    let result = reject_booking(
        &persistence,
        &booking_id,
        RejectBookingRequest::default(),
        &actor,
        &operator,
    );

    assert!(matches!(result, Err(ApiError::Conflict { .. })));
    let booking: Booking = stored_booking(&persistence, &booking_id);
    assert_eq!(booking.status, BookingStatus::Paid);
    assert_eq!(
        get_table(&persistence, booking.table_id.value()).status,
        TableStatus::Booked
    );
}

#[tokio::test]
async fn test_overlong_rejection_reason_is_invalid() {
    let persistence = create_test_persistence();
    let (actor, operator) = create_test_staff(&persistence);
    let booking_id: String = reserve(&persistence, 5, true).await;

    let result = reject_booking(
        &persistence,
        &booking_id,
        RejectBookingRequest {
            reason: Some("x".repeat(501)),
        },
        &actor,
        &operator,
    );

    let Err(ApiError::InvalidInput { field, .. }) = result else {
        panic!("expected InvalidInput, got {result:?}");
    };
    assert_eq!(field, "reason");
}

#[tokio::test]
async fn test_delete_removes_booking_and_frees_table() {
    let persistence = create_test_persistence();
    let (actor, operator) = create_test_staff(&persistence);
    let booking_id: String = reserve(&persistence, 6, true).await;
    approve_booking(&persistence, &booking_id, &actor, &operator).unwrap();
    let table_id: i64 = table_id_for(&persistence, 6);

    let response = delete_booking(&persistence, &booking_id, &actor, &operator).unwrap();

    assert!(response.changed);
    assert_eq!(response.status, None);
    assert!(persistence.get_booking(&booking_id).unwrap().is_none());
    assert_eq!(get_table(&persistence, table_id).status, TableStatus::Available);
}

#[tokio::test]
async fn test_deleting_rejected_booking_leaves_new_reservation_alone() {
    let persistence = create_test_persistence();
    let (actor, operator) = create_test_staff(&persistence);
    let rejected: String = reserve(&persistence, 7, true).await;
    reject_booking(
        &persistence,
        &rejected,
        RejectBookingRequest::default(),
        &actor,
        &operator,
    )
    .unwrap();
    let current: String = reserve(&persistence, 7, false).await;

    delete_booking(&persistence, &rejected, &actor, &operator).unwrap();

    assert!(persistence.get_booking(&rejected).unwrap().is_none());
    assert_eq!(
        stored_booking(&persistence, &current).status,
        BookingStatus::PendingPayment
    );
    assert_eq!(
        get_table(&persistence, table_id_for(&persistence, 7)).status,
        TableStatus::Locked
    );
}

#[tokio::test]
async fn test_edit_changes_only_given_fields() {
    let persistence = create_test_persistence();
    let (actor, operator) = create_test_staff(&persistence);
    let booking_id: String = reserve(&persistence, 8, true).await;

    let response = edit_booking(
        &persistence,
        &booking_id,
        EditBookingRequest {
            phone: Some(String::from("0898765432")),
            ..EditBookingRequest::default()
        },
        &actor,
        &operator,
    )
    .unwrap();

    assert!(response.changed);
    assert_eq!(response.status.as_deref(), Some("VERIFYING"));

    let booking: Booking = stored_booking(&persistence, &booking_id);
    assert_eq!(booking.details.phone(), "0898765432");
    assert_eq!(booking.details.name(), "Somchai Jaidee");
    assert_eq!(booking.details.batch(), "42");
    assert_eq!(booking.status, BookingStatus::Verifying);
    assert_eq!(booking.updated_by.as_deref(), Some("Front Desk"));
}

#[tokio::test]
async fn test_edit_validates_changes() {
    let persistence = create_test_persistence();
    let (actor, operator) = create_test_staff(&persistence);
    let booking_id: String = reserve(&persistence, 8, true).await;

    let empty = edit_booking(
        &persistence,
        &booking_id,
        EditBookingRequest::default(),
        &actor,
        &operator,
    );
    let bad_phone = edit_booking(
        &persistence,
        &booking_id,
        EditBookingRequest {
            phone: Some(String::from("12345")),
            ..EditBookingRequest::default()
        },
        &actor,
        &operator,
    );

    assert!(matches!(
        empty,
        Err(ApiError::InvalidInput { ref field, .. }) if field == "changes"
    ));
    assert!(matches!(
        bad_phone,
        Err(ApiError::InvalidInput { ref field, .. }) if field == "phone"
    ));
    assert_eq!(
        stored_booking(&persistence, &booking_id).details.phone(),
        "0812345678"
    );
}

#[test]
fn test_unknown_booking_is_not_found() {
    let persistence = create_test_persistence();
    let (actor, operator) = create_test_staff(&persistence);

    let approve = approve_booking(&persistence, "missing", &actor, &operator);
    let delete = delete_booking(&persistence, "missing", &actor, &operator);
    let blank = approve_booking(&persistence, "  ", &actor, &operator);

    assert!(matches!(approve, Err(ApiError::ResourceNotFound { .. })));
    assert!(matches!(delete, Err(ApiError::ResourceNotFound { .. })));
    assert!(matches!(blank, Err(ApiError::InvalidInput { .. })));
}

#[tokio::test]
async fn test_dashboard_lists_newest_first_with_stats() {
    let persistence = create_test_persistence();
    let (actor, operator) = create_test_staff(&persistence);
    let first: String = reserve(&persistence, 1, true).await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second: String = reserve(&persistence, 2, false).await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let third: String = reserve(&persistence, 3, true).await;
    approve_booking(&persistence, &first, &actor, &operator).unwrap();
    reject_booking(
        &persistence,
        &third,
        RejectBookingRequest {
            reason: Some(String::from("Blurry")),
        },
        &actor,
        &operator,
    )
    .unwrap();

    let dashboard: DashboardResponse = list_bookings(&persistence, &actor).unwrap();

    let ids: Vec<&str> = dashboard
        .bookings
        .iter()
        .map(|b| b.booking_id.as_str())
        .collect();
    assert_eq!(ids, vec![third.as_str(), second.as_str(), first.as_str()]);
    assert_eq!(dashboard.stats.paid_count, 1);
    assert_eq!(dashboard.stats.pending_count, 1);
    assert_eq!(dashboard.stats.total_revenue, TEST_TABLE_PRICE);

    let rejected = &dashboard.bookings[0];
    assert_eq!(rejected.status, "REJECTED");
    assert_eq!(rejected.rejection_reason.as_deref(), Some("Blurry"));
    assert_eq!(rejected.table_number, 3);
    assert_eq!(rejected.price, TEST_TABLE_PRICE);
    assert!(rejected.slip_url.is_some());
    assert_eq!(dashboard.bookings[1].slip_url, None);
}

#[test]
fn test_seed_is_idempotent() {
    let persistence = create_test_persistence();
    let (admin, _operator) = create_test_admin(&persistence);

    let response = seed_tables(
        &persistence,
        &SeedTablesRequest {
            count: Some(TEST_TABLE_COUNT + 5),
            price: None,
        },
        60,
        TEST_TABLE_PRICE,
        &admin,
    )
    .unwrap();

    assert_eq!(response.created, 5);
    assert_eq!(response.existing, TEST_TABLE_COUNT);
    assert_eq!(
        persistence.list_tables().unwrap().len(),
        (TEST_TABLE_COUNT + 5) as usize
    );

    let again = seed_tables(
        &persistence,
        &SeedTablesRequest::default(),
        TEST_TABLE_COUNT + 5,
        TEST_TABLE_PRICE,
        &admin,
    )
    .unwrap();
    assert_eq!(again.created, 0);
}

#[test]
fn test_seed_requires_admin() {
    let persistence = create_test_persistence();
    let (staff, _operator) = create_test_staff(&persistence);

    let result = seed_tables(
        &persistence,
        &SeedTablesRequest::default(),
        60,
        TEST_TABLE_PRICE,
        &staff,
    );

    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
    assert_eq!(
        persistence.list_tables().unwrap().len(),
        TEST_TABLE_COUNT as usize
    );
}

#[test]
fn test_seed_rejects_out_of_range_price() {
    let persistence = create_test_persistence();
    let (admin, _operator) = create_test_admin(&persistence);

    let result = seed_tables(
        &persistence,
        &SeedTablesRequest {
            count: Some(1),
            price: Some(u64::MAX),
        },
        60,
        TEST_TABLE_PRICE,
        &admin,
    );

    assert!(matches!(
        result,
        Err(ApiError::InvalidInput { ref field, .. }) if field == "price"
    ));
}
