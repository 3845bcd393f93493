// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{BookingStatus, CustomerDetails, DetailsPatch, DomainError, TableStatus};
use std::str::FromStr;

#[test]
fn test_initial_status_depends_on_evidence() {
    assert_eq!(BookingStatus::initial(true), BookingStatus::Verifying);
    assert_eq!(BookingStatus::initial(false), BookingStatus::PendingPayment);
}

#[test]
fn test_paired_table_status() {
    assert_eq!(
        BookingStatus::PendingPayment.paired_table_status(),
        Some(TableStatus::Locked)
    );
    assert_eq!(
        BookingStatus::Verifying.paired_table_status(),
        Some(TableStatus::Locked)
    );
    assert_eq!(
        BookingStatus::Paid.paired_table_status(),
        Some(TableStatus::Booked)
    );
    assert_eq!(BookingStatus::Rejected.paired_table_status(), None);
}

#[test]
fn test_only_rejected_releases_table() {
    assert!(BookingStatus::PendingPayment.holds_table());
    assert!(BookingStatus::Verifying.holds_table());
    assert!(BookingStatus::Paid.holds_table());
    assert!(!BookingStatus::Rejected.holds_table());
}

#[test]
fn test_booking_status_parses_stored_text() {
    assert_eq!(
        BookingStatus::from_str("PENDING_PAYMENT").unwrap(),
        BookingStatus::PendingPayment
    );
    assert!(matches!(
        BookingStatus::from_str("CANCELLED"),
        Err(DomainError::InvalidBookingStatus { .. })
    ));
}

#[test]
fn test_customer_details_validates_every_field() {
    let details: CustomerDetails = CustomerDetails::new(" Ann ", " 12 ", "0812345678").unwrap();
    assert_eq!(details.name(), "Ann");
    assert_eq!(details.batch(), "12");
    assert_eq!(details.phone(), "0812345678");

    assert!(CustomerDetails::new("Ann", "", "0812345678").is_err());
    assert!(CustomerDetails::new("Ann", "12", "12345").is_err());
}

#[test]
fn test_empty_patch_is_rejected() {
    assert_eq!(
        DetailsPatch::default().validated(),
        Err(DomainError::EmptyDetailsPatch)
    );
}

#[test]
fn test_patch_validates_only_provided_fields() {
    let patch: DetailsPatch = DetailsPatch {
        name: None,
        batch: Some(String::from(" 7 ")),
        phone: None,
    }
    .validated()
    .unwrap();
    assert_eq!(patch.batch.as_deref(), Some("7"));

    let bad: Result<DetailsPatch, DomainError> = DetailsPatch {
        name: None,
        batch: None,
        phone: Some(String::from("not a phone")),
    }
    .validated();
    assert!(matches!(bad, Err(DomainError::InvalidPhone(_))));
}

#[test]
fn test_patch_applies_only_provided_fields() {
    let details: CustomerDetails = CustomerDetails::new("Ann", "12", "0812345678").unwrap();
    let patch: DetailsPatch = DetailsPatch {
        name: Some(String::from("Anne")),
        batch: None,
        phone: None,
    };

    let updated: CustomerDetails = patch.apply_to(&details);
    assert_eq!(updated.name(), "Anne");
    assert_eq!(updated.batch(), "12");
    assert_eq!(updated.phone(), "0812345678");
}
