// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API boundary for the event table booking system.
//!
//! Every caller-visible operation lives here: reserving a table, staff
//! verification, listings, seeding and operator sessions. Operations accept
//! request DTOs, return response DTOs, and report failures as [`ApiError`].
//! Domain, core and persistence errors are translated explicitly and never
//! leak past this crate.

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
#![allow(clippy::multiple_crate_versions)]

mod admission;
mod auth;
mod error;
mod evidence;
mod handlers;
mod request_response;

#[cfg(test)]
mod tests;

pub use admission::{
    Admission, AdmissionControl, Clock, ManualClock, RateLimitConfig, SystemClock,
    TokenBucketLimiter,
};
pub use auth::{AuthenticatedActor, AuthenticationService, AuthorizationService, Role};
pub use error::{
    ApiError, AuthError, RETRY_MESSAGE, retry_after_secs, translate_core_error,
    translate_domain_error, translate_persistence_error,
};
pub use evidence::{
    DEFAULT_MAX_EVIDENCE_BYTES, DEFAULT_UPLOAD_TIMEOUT, EvidenceAttachment, EvidenceError,
    EvidenceStore, EvidenceUpload, LocalEvidenceStore, MemoryEvidenceStore,
    SupabaseEvidenceStore, storage_key,
};
pub use handlers::{
    admit_reservation, approve_booking, create_operator, delete_booking, edit_booking, list_bookings, list_tables,
    login, logout, reject_booking, reserve_admitted_booking, reserve_booking, seed_tables, whoami,
};
pub use request_response::{
    BookingActionResponse, BookingInfo, CreateOperatorRequest, CreateOperatorResponse,
    DashboardResponse, EditBookingRequest, ListTablesResponse, LoginRequest, LoginResponse,
    RejectBookingRequest, ReserveBookingRequest, ReserveBookingResponse, SeedTablesRequest,
    SeedTablesResponse, TableInfo, WhoAmIResponse,
};
