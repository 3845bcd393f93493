// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    BookingId, DomainError, Price, StaffActor, TableId, TableNumber, TableStatus,
    format_timestamp, parse_timestamp,
};
use std::str::FromStr;
use time::OffsetDateTime;
use time::macros::datetime;

#[test]
fn test_table_id_rejects_non_positive() {
    assert!(matches!(TableId::new(0), Err(DomainError::InvalidTableId(0))));
    assert!(matches!(
        TableId::new(-4),
        Err(DomainError::InvalidTableId(-4))
    ));
    assert_eq!(TableId::new(7).unwrap().value(), 7);
}

#[test]
fn test_table_number_orders_numerically() {
    let two: TableNumber = TableNumber::new(2).unwrap();
    let ten: TableNumber = TableNumber::new(10).unwrap();

    assert!(two < ten);
    assert_eq!(ten.to_string(), "10");
}

#[test]
fn test_table_number_rejects_zero_and_overflow() {
    assert!(TableNumber::new(0).is_err());
    assert!(TableNumber::new(i64::from(u32::MAX) + 1).is_err());
}

#[test]
fn test_price_rejects_negative() {
    assert!(matches!(Price::new(-1), Err(DomainError::InvalidPrice(-1))));
    assert_eq!(Price::new(4000).unwrap().amount(), 4000);
}

#[test]
fn test_booking_id_rejects_blank() {
    assert!(BookingId::new("   ").is_err());
    assert_eq!(BookingId::new("abc").unwrap().as_str(), "abc");
}

#[test]
fn test_table_status_round_trips_through_text() {
    for status in [
        TableStatus::Available,
        TableStatus::Locked,
        TableStatus::Booked,
    ] {
        assert_eq!(TableStatus::from_str(status.as_str()).unwrap(), status);
    }
    assert!(matches!(
        TableStatus::from_str("available"),
        Err(DomainError::InvalidTableStatus { .. })
    ));
}

#[test]
fn test_staff_actor_stamp_prefers_display_name() {
    let named: StaffActor = StaffActor::new(String::from("JDOE"), String::from("Jane Doe"));
    let unnamed: StaffActor = StaffActor::new(String::from("JDOE"), String::from("  "));

    assert_eq!(named.stamp(), "Jane Doe");
    assert_eq!(unnamed.stamp(), "JDOE");
}

#[test]
fn test_timestamp_text_is_fixed_width_and_parses_back() {
    let value: OffsetDateTime = datetime!(2026-03-01 09:05:00.25 UTC);
    let text: String = format_timestamp(value).unwrap();

    assert_eq!(text, "2026-03-01T09:05:00.250000Z");
    assert_eq!(parse_timestamp(&text).unwrap(), value);
}

#[test]
fn test_timestamp_text_sorts_chronologically() {
    let earlier: String = format_timestamp(datetime!(2026-03-01 09:05:00 UTC)).unwrap();
    let later: String = format_timestamp(datetime!(2026-03-01 09:05:00.000001 UTC)).unwrap();

    assert!(earlier < later);
}

#[test]
fn test_parse_timestamp_rejects_garbage() {
    assert!(matches!(
        parse_timestamp("yesterday"),
        Err(DomainError::InvalidTimestamp { .. })
    ));
}
