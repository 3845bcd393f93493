// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Domain types and field validation for the event table booking system.
//!
//! This crate is pure: it owns the value types shared by every other layer
//! (tables, bookings, their paired statuses, customer details) and the
//! aggregation rules used by listings. It performs no I/O.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod booking;
mod error;
mod stats;
mod table;
mod timestamp;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use booking::{Booking, BookingStatus, CustomerDetails, DetailsPatch};
pub use error::DomainError;
pub use stats::{AvailabilitySummary, BookingListing, DashboardStats};
pub use table::{Table, TableStatus};
pub use timestamp::{format_timestamp, parse_timestamp};
pub use types::{BookingId, EvidenceReference, Price, StaffActor, TableId, TableNumber};
pub use validation::{
    MAX_NAME_CHARS, MAX_REJECTION_REASON_CHARS, MIN_NAME_CHARS, normalize_rejection_reason,
    validate_batch, validate_customer_name, validate_phone,
};
