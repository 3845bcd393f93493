// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{BookingWrite, ReserveRequest, Transition, apply_reserve};
use tablebook_domain::{
    Booking, BookingId, BookingStatus, CustomerDetails, EvidenceReference, Price, StaffActor,
    Table, TableId, TableNumber, TableStatus,
};
use time::OffsetDateTime;
use time::macros::datetime;

pub fn create_test_now() -> OffsetDateTime {
    datetime!(2026-03-01 10:00 UTC)
}

pub fn create_test_actor() -> StaffActor {
    StaffActor::new(String::from("STAFF1"), String::from("Front Desk"))
}

pub fn create_test_table(status: TableStatus) -> Table {
    Table::new(
        TableId::new(7).unwrap(),
        TableNumber::new(7).unwrap(),
        Price::new(4000).unwrap(),
        status,
    )
}

pub fn create_test_request(with_evidence: bool) -> ReserveRequest {
    ReserveRequest {
        details: CustomerDetails::new("Somchai", "42", "0812345678").unwrap(),
        evidence: with_evidence
            .then(|| EvidenceReference::new("https://store.example/slips/1700000000000_abc1234.jpg")),
    }
}

/// Returns a booking in the given status referencing table 7.
pub fn create_test_booking(status: BookingStatus) -> Booking {
    let transition: Transition = apply_reserve(
        &create_test_table(TableStatus::Available),
        create_test_request(false),
        BookingId::new("booking-1").unwrap(),
        create_test_now(),
    )
    .unwrap();

    let BookingWrite::Insert(mut booking) = transition.booking else {
        panic!("reserve must insert a booking");
    };
    booking.status = status;
    booking
}
