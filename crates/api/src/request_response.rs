// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.
//!
//! These types are the API contract. Domain types never cross this
//! boundary directly.

use tablebook_domain::{
    AvailabilitySummary, BookingListing, DashboardStats, DetailsPatch, Table, format_timestamp,
};

use crate::error::{ApiError, translate_domain_error};
use crate::evidence::EvidenceUpload;

/// API request to reserve a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReserveBookingRequest {
    /// The table to reserve.
    pub table_id: i64,
    /// The customer's name.
    pub name: String,
    /// The customer's cohort label.
    pub batch: String,
    /// The customer's phone number (9 or 10 digits).
    pub phone: String,
    /// The payment slip, if one was attached.
    pub slip: Option<EvidenceUpload>,
}

/// API response for a successful reservation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ReserveBookingResponse {
    /// The new booking's identifier.
    pub booking_id: String,
    /// The reserved table's identifier.
    pub table_id: i64,
    /// The reserved table's label.
    pub table_number: u32,
    /// The booking's initial status.
    pub status: String,
    /// Public URL of the stored slip, if one was attached.
    pub slip_url: Option<String>,
    /// A success message.
    pub message: String,
}

/// API request to reject a booking.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RejectBookingRequest {
    /// Optional reason recorded on the booking.
    #[serde(default)]
    pub reason: Option<String>,
}

/// API request to change customer details on a booking.
///
/// Only the fields that are present are changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EditBookingRequest {
    /// New customer name.
    #[serde(default)]
    pub name: Option<String>,
    /// New batch label.
    #[serde(default)]
    pub batch: Option<String>,
    /// New phone number.
    #[serde(default)]
    pub phone: Option<String>,
}

impl From<EditBookingRequest> for DetailsPatch {
    fn from(request: EditBookingRequest) -> Self {
        Self {
            name: request.name,
            batch: request.batch,
            phone: request.phone,
        }
    }
}

/// API response for a staff action on a booking.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BookingActionResponse {
    /// The booking the action targeted.
    pub booking_id: String,
    /// The booking's status after the action; absent once deleted.
    pub status: Option<String>,
    /// False if the booking was already in the requested state.
    pub changed: bool,
    /// A success message.
    pub message: String,
}

/// A table as shown to customers.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TableInfo {
    /// The table's identifier.
    pub table_id: i64,
    /// The table's label.
    pub table_number: u32,
    /// The table's price.
    pub price: u64,
    /// AVAILABLE, LOCKED or BOOKED.
    pub status: String,
}

impl From<&Table> for TableInfo {
    fn from(table: &Table) -> Self {
        Self {
            table_id: table.id.value(),
            table_number: table.number.value(),
            price: table.price.amount(),
            status: table.status.as_str().to_string(),
        }
    }
}

/// API response for the table listing.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ListTablesResponse {
    /// Tables ordered by label.
    pub tables: Vec<TableInfo>,
    /// Occupancy counts.
    pub summary: AvailabilitySummary,
}

/// A booking as shown on the staff dashboard.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BookingInfo {
    /// The booking's identifier.
    pub booking_id: String,
    /// The referenced table's identifier.
    pub table_id: i64,
    /// The referenced table's label.
    pub table_number: u32,
    /// The referenced table's price.
    pub price: u64,
    /// The customer's name.
    pub customer_name: String,
    /// The customer's cohort label.
    pub batch: String,
    /// The customer's phone number.
    pub phone: String,
    /// Public URL of the payment slip.
    pub slip_url: Option<String>,
    /// The booking's status.
    pub status: String,
    /// The reason recorded when the booking was rejected.
    pub rejection_reason: Option<String>,
    /// When the booking was created.
    pub created_at: String,
    /// When staff approved the booking.
    pub verified_at: Option<String>,
    /// The staff member who last modified the booking.
    pub updated_by: Option<String>,
}

impl TryFrom<&BookingListing> for BookingInfo {
    type Error = ApiError;

    fn try_from(listing: &BookingListing) -> Result<Self, Self::Error> {
        let booking = &listing.booking;
        Ok(Self {
            booking_id: booking.id.as_str().to_string(),
            table_id: booking.table_id.value(),
            table_number: listing.table_number.value(),
            price: listing.price.amount(),
            customer_name: booking.details.name().to_string(),
            batch: booking.details.batch().to_string(),
            phone: booking.details.phone().to_string(),
            slip_url: booking.evidence.as_ref().map(|e| e.url().to_string()),
            status: booking.status.as_str().to_string(),
            rejection_reason: booking.rejection_reason.clone(),
            created_at: format_timestamp(booking.created_at).map_err(translate_domain_error)?,
            verified_at: booking
                .verified_at
                .map(format_timestamp)
                .transpose()
                .map_err(translate_domain_error)?,
            updated_by: booking.updated_by.clone(),
        })
    }
}

/// API response for the staff dashboard.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DashboardResponse {
    /// Bookings, newest first.
    pub bookings: Vec<BookingInfo>,
    /// Aggregated counts and revenue.
    pub stats: DashboardStats,
}

/// API request to seed the capacity store.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SeedTablesRequest {
    /// Number of tables; the deployment default when absent.
    #[serde(default)]
    pub count: Option<u32>,
    /// Price per table; the deployment default when absent.
    #[serde(default)]
    pub price: Option<u64>,
}

/// API response for seeding.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SeedTablesResponse {
    /// Tables created by this run.
    pub created: u32,
    /// Tables that already existed.
    pub existing: u32,
    /// A success message.
    pub message: String,
}

/// API request to log in.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LoginRequest {
    /// The operator login name.
    pub login_name: String,
    /// The operator password.
    pub password: String,
}

/// API response for a successful login.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LoginResponse {
    /// The session token to send as `Authorization: Bearer <token>`.
    pub session_token: String,
    /// The operator login name.
    pub login_name: String,
    /// The operator display name.
    pub display_name: String,
    /// The operator role.
    pub role: String,
    /// When the session expires.
    pub expires_at: String,
}

/// API response describing the current operator.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct WhoAmIResponse {
    /// The operator login name.
    pub login_name: String,
    /// The operator display name.
    pub display_name: String,
    /// The operator role.
    pub role: String,
    /// Whether the operator is disabled.
    pub is_disabled: bool,
}

/// API request to create an operator.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CreateOperatorRequest {
    /// The login name (stored upper-case).
    pub login_name: String,
    /// The display name stamped on bookings.
    pub display_name: String,
    /// The initial password.
    pub password: String,
    /// The role: Admin or Staff.
    pub role: String,
}

/// API response for a successful operator creation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CreateOperatorResponse {
    /// The new operator's identifier.
    pub operator_id: i64,
    /// The stored login name.
    pub login_name: String,
    /// The display name.
    pub display_name: String,
    /// The role.
    pub role: String,
    /// A success message.
    pub message: String,
}
