// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{create_test_now, create_test_request, create_test_table};
use crate::{BookingWrite, CoreError, TableWrite, Transition, apply_reserve};
use tablebook_domain::{BookingId, BookingStatus, TableStatus};

#[test]
fn test_reserve_without_evidence_is_pending_payment() {
    let transition: Transition = apply_reserve(
        &create_test_table(TableStatus::Available),
        create_test_request(false),
        BookingId::new("b-1").unwrap(),
        create_test_now(),
    )
    .unwrap();

    let BookingWrite::Insert(booking) = &transition.booking else {
        panic!("expected an insert");
    };
    assert_eq!(booking.status, BookingStatus::PendingPayment);
    assert_eq!(booking.created_at, create_test_now());
    assert!(booking.evidence.is_none());
    assert!(booking.verified_at.is_none());
}

#[test]
fn test_reserve_with_evidence_is_verifying() {
    let transition: Transition = apply_reserve(
        &create_test_table(TableStatus::Available),
        create_test_request(true),
        BookingId::new("b-1").unwrap(),
        create_test_now(),
    )
    .unwrap();

    let BookingWrite::Insert(booking) = &transition.booking else {
        panic!("expected an insert");
    };
    assert_eq!(booking.status, BookingStatus::Verifying);
    assert!(booking.evidence.is_some());
}

#[test]
fn test_reserve_locks_table_only_if_still_available() {
    let table = create_test_table(TableStatus::Available);
    let transition: Transition = apply_reserve(
        &table,
        create_test_request(false),
        BookingId::new("b-1").unwrap(),
        create_test_now(),
    )
    .unwrap();

    assert_eq!(
        transition.table,
        Some(TableWrite {
            table_id: table.id,
            expected: TableStatus::Available,
            next: TableStatus::Locked,
        })
    );
}

#[test]
fn test_reserve_rejects_locked_and_booked_tables() {
    for status in [TableStatus::Locked, TableStatus::Booked] {
        let result: Result<Transition, CoreError> = apply_reserve(
            &create_test_table(status),
            create_test_request(false),
            BookingId::new("b-1").unwrap(),
            create_test_now(),
        );

        assert!(matches!(
            result,
            Err(CoreError::TableUnavailable { status: s, .. }) if s == status
        ));
    }
}
