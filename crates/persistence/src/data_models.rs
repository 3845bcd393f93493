// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::prelude::*;
use std::str::FromStr;
use tablebook_domain::{
    Booking, BookingId, BookingStatus, CustomerDetails, EvidenceReference, Price, Table, TableId,
    TableNumber, TableStatus, parse_timestamp,
};

use crate::diesel_schema::{bookings, event_tables};
use crate::error::PersistenceError;

/// Stored staff operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorData {
    pub operator_id: i64,
    pub login_name: String,
    pub display_name: String,
    pub password_hash: String,
    pub role: String,
    pub is_disabled: bool,
    pub created_at: String,
    pub disabled_at: Option<String>,
    pub last_login_at: Option<String>,
}

/// Stored login session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionData {
    pub session_id: i64,
    pub session_token: String,
    pub operator_id: i64,
    pub created_at: String,
    pub last_activity_at: String,
    pub expires_at: String,
}

/// Outcome of seeding the capacity store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedOutcome {
    /// Tables inserted by this run.
    pub created: u32,
    /// Tables that already existed and were left untouched.
    pub existing: u32,
}

/// Diesel Queryable struct for table rows.
#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = event_tables)]
pub(crate) struct TableRow {
    pub table_id: i64,
    pub table_number: i64,
    pub price: i64,
    pub status: String,
}

impl TryFrom<TableRow> for Table {
    type Error = PersistenceError;

    fn try_from(row: TableRow) -> Result<Self, Self::Error> {
        Ok(Self::new(
            TableId::new(row.table_id)?,
            TableNumber::new(row.table_number)?,
            Price::new(row.price)?,
            TableStatus::from_str(&row.status)?,
        ))
    }
}

/// Diesel Queryable struct for booking rows.
#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = bookings)]
pub(crate) struct BookingRow {
    pub booking_id: String,
    pub table_id: i64,
    pub customer_name: String,
    pub batch: String,
    pub phone: String,
    pub slip_url: Option<String>,
    pub status: String,
    pub rejection_reason: Option<String>,
    pub created_at: String,
    pub verified_at: Option<String>,
    pub updated_by: Option<String>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = PersistenceError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: BookingId::new(row.booking_id)?,
            table_id: TableId::new(row.table_id)?,
            details: CustomerDetails::from_stored(row.customer_name, row.batch, row.phone),
            evidence: row.slip_url.map(EvidenceReference::new),
            status: BookingStatus::from_str(&row.status)?,
            rejection_reason: row.rejection_reason,
            created_at: parse_timestamp(&row.created_at)?,
            verified_at: row
                .verified_at
                .as_deref()
                .map(parse_timestamp)
                .transpose()?,
            updated_by: row.updated_by,
        })
    }
}
