// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]


use std::path::PathBuf;
use tempfile::TempDir;
use tablebook::{ReserveRequest, Transition, apply_reserve};
use tablebook_domain::{BookingId, CustomerDetails, EvidenceReference, Price, StaffActor, Table};
use time::OffsetDateTime;

use crate::Persistence;

/// A file database path inside a directory removed (with its WAL files)
/// when the returned `TempDir` is dropped.
pub fn create_test_database() -> (TempDir, PathBuf) {
    let dir: TempDir = tempfile::tempdir().expect("Failed to create temp dir");
    let path: PathBuf = dir.path().join("tablebook.db");
    (dir, path)
}

pub fn create_test_price() -> Price {
    Price::new(4000).unwrap()
}

/// Returns an in-memory store seeded with `count` tables.
pub fn create_seeded_persistence(count: u32) -> Persistence {
    let persistence: Persistence = Persistence::new_in_memory().unwrap();
    persistence.seed_tables(count, create_test_price()).unwrap();
    persistence
}

pub fn create_test_actor() -> StaffActor {
    StaffActor::new(String::from("STAFF1"), String::from("Front Desk"))
}

pub fn create_test_request(with_evidence: bool) -> ReserveRequest {
    ReserveRequest {
        details: CustomerDetails::new("Somchai", "42", "0812345678").unwrap(),
        evidence: with_evidence
            .then(|| EvidenceReference::new("https://store.example/slips/1700000000000_abc1234.png")),
    }
}

/// Computes a reservation transition for the table as currently stored.
pub fn reserve_transition(table: &Table, booking_id: &str) -> Transition {
    apply_reserve(
        table,
        create_test_request(false),
        BookingId::new(booking_id).unwrap(),
        OffsetDateTime::now_utc(),
    )
    .unwrap()
}

/// Reserves the table with the given id and returns the booking id.
pub fn reserve(persistence: &Persistence, table_id: i64, booking_id: &str) -> String {
    let table: Table = persistence.get_table(table_id).unwrap().unwrap();
    persistence
        .apply_transition(&reserve_transition(&table, booking_id))
        .unwrap();
    booking_id.to_string()
}
