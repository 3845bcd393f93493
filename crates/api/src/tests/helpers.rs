// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;
use tablebook_domain::{Price, Table};
use tablebook_persistence::{OperatorData, Persistence};

use crate::{
    AuthenticatedActor, EvidenceAttachment, EvidenceStore, EvidenceUpload, ManualClock,
    MemoryEvidenceStore, RateLimitConfig, ReserveBookingRequest, Role, TokenBucketLimiter,
};

pub const TEST_TABLE_COUNT: u32 = 10;
pub const TEST_TABLE_PRICE: u64 = 4000;

/// Returns an in-memory store seeded with `TEST_TABLE_COUNT` tables.
pub fn create_test_persistence() -> Persistence {
    let persistence: Persistence = Persistence::new_in_memory().unwrap();
    persistence
        .seed_tables(
            TEST_TABLE_COUNT,
            Price::new(i64::try_from(TEST_TABLE_PRICE).unwrap()).unwrap(),
        )
        .unwrap();
    persistence
}

/// Returns the id of the table labelled `number`.
pub fn table_id_for(persistence: &Persistence, number: u32) -> i64 {
    persistence
        .list_tables()
        .unwrap()
        .into_iter()
        .find(|table| table.number.value() == number)
        .map(|table| table.id.value())
        .unwrap()
}

pub fn get_table(persistence: &Persistence, table_id: i64) -> Table {
    persistence.get_table(table_id).unwrap().unwrap()
}

pub fn create_test_store() -> Arc<MemoryEvidenceStore> {
    Arc::new(MemoryEvidenceStore::new())
}

pub fn create_test_attachment(store: &Arc<MemoryEvidenceStore>) -> EvidenceAttachment {
    let store: Arc<dyn EvidenceStore> = store.clone();
    EvidenceAttachment::new(store)
}

/// Returns a limiter with the default quota on a manual clock.
pub fn create_test_limiter() -> (Arc<ManualClock>, TokenBucketLimiter) {
    let clock: Arc<ManualClock> = Arc::new(ManualClock::new());
    let limiter: TokenBucketLimiter =
        TokenBucketLimiter::with_clock(RateLimitConfig::default(), clock.clone());
    (clock, limiter)
}

/// Returns a limiter that never rejects within a test.
pub fn create_unlimited_admission() -> TokenBucketLimiter {
    TokenBucketLimiter::new(RateLimitConfig {
        limit: 10_000,
        window: Duration::from_secs(1),
    })
}

pub fn create_valid_request(table_id: i64) -> ReserveBookingRequest {
    ReserveBookingRequest {
        table_id,
        name: String::from("Somchai Jaidee"),
        batch: String::from("42"),
        phone: String::from("0812345678"),
        slip: None,
    }
}

pub fn create_test_slip(len: usize) -> EvidenceUpload {
    EvidenceUpload::new("transfer slip.JPG", "image/jpeg", Bytes::from(vec![0xFF; len]))
}

fn create_operator(
    persistence: &Persistence,
    login_name: &str,
    display_name: &str,
    role: Role,
) -> (AuthenticatedActor, OperatorData) {
    persistence
        .create_operator(login_name, display_name, "password123", role.as_str())
        .unwrap();
    let operator: OperatorData = persistence
        .get_operator_by_login(login_name)
        .unwrap()
        .unwrap();
    (
        AuthenticatedActor::new(operator.login_name.clone(), role),
        operator,
    )
}

pub fn create_test_admin(persistence: &Persistence) -> (AuthenticatedActor, OperatorData) {
    create_operator(persistence, "admin", "Test Admin", Role::Admin)
}

pub fn create_test_staff(persistence: &Persistence) -> (AuthenticatedActor, OperatorData) {
    create_operator(persistence, "staff1", "Front Desk", Role::Staff)
}
