// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Atomic commit of state machine transitions.
//!
//! A transition is committed inside an immediate transaction, which takes
//! the database write lock up front. Each write is conditional on the
//! status the state machine read; if any condition fails the whole
//! transaction rolls back and the caller sees a conflict.

use diesel::SqliteConnection;
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use tablebook::{BookingWrite, TableWrite, Transition};
use tablebook_domain::{
    Booking, BookingId, BookingStatus, EvidenceReference, TableStatus, format_timestamp,
};
use tracing::debug;

use crate::diesel_schema::{bookings, event_tables};
use crate::error::PersistenceError;
use crate::queries::bookings::booking_exists;
use crate::queries::tables::get_table;

/// Only the provided fields are written; `None` leaves the column as stored.
#[derive(AsChangeset)]
#[diesel(table_name = bookings)]
struct DetailsChangeset<'a> {
    customer_name: Option<&'a str>,
    batch: Option<&'a str>,
    phone: Option<&'a str>,
    updated_by: Option<&'a str>,
}

/// Sets a table's status only if it currently has the expected status.
///
/// # Returns
///
/// `true` if the row was updated, `false` if the table is missing or its
/// status differs from `expected`.
///
/// # Errors
///
/// Returns an error if the database update fails.
pub fn update_table_status_if(
    conn: &mut SqliteConnection,
    table_id: i64,
    expected: TableStatus,
    next: TableStatus,
) -> Result<bool, PersistenceError> {
    let rows_affected: usize = diesel::update(event_tables::table)
        .filter(event_tables::table_id.eq(table_id))
        .filter(event_tables::status.eq(expected.as_str()))
        .set(event_tables::status.eq(next.as_str()))
        .execute(conn)?;

    debug!(table_id, %expected, %next, rows_affected, "Conditional table status update");
    Ok(rows_affected == 1)
}

/// Commits a transition as a single atomic unit.
///
/// # Errors
///
/// Returns an error, with nothing committed, if:
/// - The table or booking no longer has the expected status
/// - The table already has an active booking
/// - A referenced table or booking does not exist
/// - The database operation fails
pub fn apply_transition(
    conn: &mut SqliteConnection,
    transition: &Transition,
) -> Result<(), PersistenceError> {
    conn.immediate_transaction(|conn| {
        if let Some(write) = &transition.table {
            write_table(conn, write)?;
        }
        write_booking(conn, &transition.booking)
    })
}

fn write_table(conn: &mut SqliteConnection, write: &TableWrite) -> Result<(), PersistenceError> {
    let table_id: i64 = write.table_id.value();

    if update_table_status_if(conn, table_id, write.expected, write.next)? {
        return Ok(());
    }

    if get_table(conn, table_id)?.is_none() {
        return Err(PersistenceError::TableNotFound(table_id));
    }

    Err(PersistenceError::TableStatusConflict {
        table_id,
        expected: write.expected.to_string(),
    })
}

fn write_booking(conn: &mut SqliteConnection, write: &BookingWrite) -> Result<(), PersistenceError> {
    match write {
        BookingWrite::Insert(booking) => insert_booking(conn, booking),
        BookingWrite::UpdateStatus {
            booking_id,
            expected,
            next,
            verified_at,
            rejection_reason,
            updated_by,
        } => {
            let verified_at: Option<String> = verified_at.map(format_timestamp).transpose()?;

            let rows_affected: usize = diesel::update(bookings::table)
                .filter(bookings::booking_id.eq(booking_id.as_str()))
                .filter(bookings::status.eq(expected.as_str()))
                .set((
                    bookings::status.eq(next.as_str()),
                    bookings::verified_at.eq(verified_at),
                    bookings::rejection_reason.eq(rejection_reason.as_deref()),
                    bookings::updated_by.eq(updated_by.as_str()),
                ))
                .execute(conn)?;

            expect_one_booking_row(conn, rows_affected, booking_id, *expected)
        }
        BookingWrite::UpdateDetails {
            booking_id,
            changes,
            updated_by,
        } => {
            let changeset: DetailsChangeset<'_> = DetailsChangeset {
                customer_name: changes.name.as_deref(),
                batch: changes.batch.as_deref(),
                phone: changes.phone.as_deref(),
                updated_by: Some(updated_by.as_str()),
            };

            let rows_affected: usize = diesel::update(bookings::table)
                .filter(bookings::booking_id.eq(booking_id.as_str()))
                .set(&changeset)
                .execute(conn)?;

            if rows_affected == 0 {
                return Err(PersistenceError::BookingNotFound(booking_id.to_string()));
            }
            Ok(())
        }
        BookingWrite::Remove {
            booking_id,
            expected,
        } => {
            let rows_affected: usize = diesel::delete(bookings::table)
                .filter(bookings::booking_id.eq(booking_id.as_str()))
                .filter(bookings::status.eq(expected.as_str()))
                .execute(conn)?;

            expect_one_booking_row(conn, rows_affected, booking_id, *expected)
        }
    }
}

fn insert_booking(conn: &mut SqliteConnection, booking: &Booking) -> Result<(), PersistenceError> {
    let created_at: String = format_timestamp(booking.created_at)?;
    let verified_at: Option<String> = booking.verified_at.map(format_timestamp).transpose()?;
    let table_id: i64 = booking.table_id.value();

    let result: Result<usize, diesel::result::Error> = diesel::insert_into(bookings::table)
        .values((
            bookings::booking_id.eq(booking.id.as_str()),
            bookings::table_id.eq(table_id),
            bookings::customer_name.eq(booking.details.name()),
            bookings::batch.eq(booking.details.batch()),
            bookings::phone.eq(booking.details.phone()),
            bookings::slip_url.eq(booking.evidence.as_ref().map(EvidenceReference::url)),
            bookings::status.eq(booking.status.as_str()),
            bookings::rejection_reason.eq(booking.rejection_reason.as_deref()),
            bookings::created_at.eq(&created_at),
            bookings::verified_at.eq(verified_at),
            bookings::updated_by.eq(booking.updated_by.as_deref()),
        ))
        .execute(conn);

    match result {
        Ok(_) => Ok(()),
        Err(diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
            Err(PersistenceError::ActiveBookingExists(table_id))
        }
        Err(diesel::result::Error::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _)) => {
            Err(PersistenceError::TableNotFound(table_id))
        }
        Err(e) => Err(PersistenceError::from(e)),
    }
}

fn expect_one_booking_row(
    conn: &mut SqliteConnection,
    rows_affected: usize,
    booking_id: &BookingId,
    expected: BookingStatus,
) -> Result<(), PersistenceError> {
    if rows_affected == 1 {
        return Ok(());
    }

    if !booking_exists(conn, booking_id.as_str())? {
        return Err(PersistenceError::BookingNotFound(booking_id.to_string()));
    }

    Err(PersistenceError::BookingStatusConflict {
        booking_id: booking_id.to_string(),
        expected: expected.to_string(),
    })
}
