// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{create_test_actor, create_test_booking, create_test_now, create_test_table};
use crate::{BookingWrite, Command, CoreError, TableWrite, Transition, TransitionResult, apply};
use tablebook_domain::{
    Booking, BookingStatus, DetailsPatch, DomainError, MAX_REJECTION_REASON_CHARS, Price, Table,
    TableId, TableNumber, TableStatus,
};

fn applied(result: Result<TransitionResult, CoreError>) -> Transition {
    match result.unwrap() {
        TransitionResult::Applied(transition) => transition,
        TransitionResult::Unchanged => panic!("expected an applied transition"),
    }
}

#[test]
fn test_approve_pending_books_table_and_stamps_actor() {
    let booking: Booking = create_test_booking(BookingStatus::Verifying);
    let table: Table = create_test_table(TableStatus::Locked);

    let transition: Transition = applied(apply(
        Command::Approve,
        &booking,
        &table,
        &create_test_actor(),
        create_test_now(),
    ));

    assert_eq!(
        transition.booking,
        BookingWrite::UpdateStatus {
            booking_id: booking.id.clone(),
            expected: BookingStatus::Verifying,
            next: BookingStatus::Paid,
            verified_at: Some(create_test_now()),
            rejection_reason: None,
            updated_by: String::from("Front Desk"),
        }
    );
    assert_eq!(
        transition.table,
        Some(TableWrite {
            table_id: table.id,
            expected: TableStatus::Locked,
            next: TableStatus::Booked,
        })
    );
}

#[test]
fn test_approve_paid_is_unchanged() {
    let result: TransitionResult = apply(
        Command::Approve,
        &create_test_booking(BookingStatus::Paid),
        &create_test_table(TableStatus::Booked),
        &create_test_actor(),
        create_test_now(),
    )
    .unwrap();

    assert_eq!(result, TransitionResult::Unchanged);
}

#[test]
fn test_approve_rejected_is_invalid() {
    let result: Result<TransitionResult, CoreError> = apply(
        Command::Approve,
        &create_test_booking(BookingStatus::Rejected),
        &create_test_table(TableStatus::Locked),
        &create_test_actor(),
        create_test_now(),
    );

    assert!(matches!(
        result,
        Err(CoreError::InvalidTransition {
            status: BookingStatus::Rejected,
            command: "approve",
            ..
        })
    ));
}

#[test]
fn test_reject_releases_table_and_keeps_reason() {
    let booking: Booking = create_test_booking(BookingStatus::PendingPayment);
    let transition: Transition = applied(apply(
        Command::Reject {
            reason: Some(String::from("  slip does not match  ")),
        },
        &booking,
        &create_test_table(TableStatus::Locked),
        &create_test_actor(),
        create_test_now(),
    ));

    let BookingWrite::UpdateStatus {
        next,
        rejection_reason,
        verified_at,
        ..
    } = transition.booking
    else {
        panic!("expected a status update");
    };
    assert_eq!(next, BookingStatus::Rejected);
    assert_eq!(rejection_reason.as_deref(), Some("slip does not match"));
    assert_eq!(verified_at, None);
    assert_eq!(
        transition.table.map(|t| t.next),
        Some(TableStatus::Available)
    );
}

#[test]
fn test_reject_rejected_is_unchanged_and_paid_is_invalid() {
    let unchanged: TransitionResult = apply(
        Command::Reject { reason: None },
        &create_test_booking(BookingStatus::Rejected),
        &create_test_table(TableStatus::Available),
        &create_test_actor(),
        create_test_now(),
    )
    .unwrap();
    assert_eq!(unchanged, TransitionResult::Unchanged);

    let invalid: Result<TransitionResult, CoreError> = apply(
        Command::Reject { reason: None },
        &create_test_booking(BookingStatus::Paid),
        &create_test_table(TableStatus::Booked),
        &create_test_actor(),
        create_test_now(),
    );
    assert!(matches!(invalid, Err(CoreError::InvalidTransition { .. })));
}

#[test]
fn test_reject_reason_too_long_is_a_domain_violation() {
    let result: Result<TransitionResult, CoreError> = apply(
        Command::Reject {
            reason: Some("x".repeat(MAX_REJECTION_REASON_CHARS + 1)),
        },
        &create_test_booking(BookingStatus::Verifying),
        &create_test_table(TableStatus::Locked),
        &create_test_actor(),
        create_test_now(),
    );

    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(
            DomainError::InvalidRejectionReason(_)
        ))
    ));
}

#[test]
fn test_delete_active_booking_frees_table() {
    let transition: Transition = applied(apply(
        Command::Delete,
        &create_test_booking(BookingStatus::Paid),
        &create_test_table(TableStatus::Booked),
        &create_test_actor(),
        create_test_now(),
    ));

    assert!(matches!(
        transition.booking,
        BookingWrite::Remove {
            expected: BookingStatus::Paid,
            ..
        }
    ));
    assert_eq!(
        transition.table,
        Some(TableWrite {
            table_id: TableId::new(7).unwrap(),
            expected: TableStatus::Booked,
            next: TableStatus::Available,
        })
    );
}

#[test]
fn test_delete_rejected_booking_leaves_table_alone() {
    // The table was released on rejection and now belongs to another booking.
    let transition: Transition = applied(apply(
        Command::Delete,
        &create_test_booking(BookingStatus::Rejected),
        &create_test_table(TableStatus::Locked),
        &create_test_actor(),
        create_test_now(),
    ));

    assert!(matches!(transition.booking, BookingWrite::Remove { .. }));
    assert_eq!(transition.table, None);
}

#[test]
fn test_edit_details_never_touches_status_or_table() {
    let transition: Transition = applied(apply(
        Command::EditDetails {
            changes: DetailsPatch {
                name: Some(String::from(" Somsri ")),
                batch: None,
                phone: None,
            },
        },
        &create_test_booking(BookingStatus::Paid),
        &create_test_table(TableStatus::Booked),
        &create_test_actor(),
        create_test_now(),
    ));

    let BookingWrite::UpdateDetails {
        changes,
        updated_by,
        ..
    } = transition.booking
    else {
        panic!("expected a details update");
    };
    assert_eq!(changes.name.as_deref(), Some("Somsri"));
    assert_eq!(changes.batch, None);
    assert_eq!(updated_by, "Front Desk");
    assert_eq!(transition.table, None);
}

#[test]
fn test_edit_with_no_fields_is_rejected() {
    let result: Result<TransitionResult, CoreError> = apply(
        Command::EditDetails {
            changes: DetailsPatch::default(),
        },
        &create_test_booking(BookingStatus::Verifying),
        &create_test_table(TableStatus::Locked),
        &create_test_actor(),
        create_test_now(),
    );

    assert_eq!(
        result,
        Err(CoreError::DomainViolation(DomainError::EmptyDetailsPatch))
    );
}

#[test]
fn test_command_against_wrong_table_is_rejected() {
    let other: Table = Table::new(
        TableId::new(8).unwrap(),
        TableNumber::new(8).unwrap(),
        Price::new(4000).unwrap(),
        TableStatus::Locked,
    );

    let result: Result<TransitionResult, CoreError> = apply(
        Command::Approve,
        &create_test_booking(BookingStatus::Verifying),
        &other,
        &create_test_actor(),
        create_test_now(),
    );

    assert!(matches!(result, Err(CoreError::TableMismatch { .. })));
}
