// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Reservation store queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tablebook_domain::{Booking, BookingListing, Price, Table, TableNumber};
use tracing::debug;

use crate::data_models::{BookingRow, TableRow};
use crate::diesel_schema::{bookings, event_tables};
use crate::error::PersistenceError;

/// Retrieves a booking by id.
///
/// # Errors
///
/// Returns an error if the query fails or the stored row is malformed.
/// Returns `Ok(None)` if the booking does not exist.
pub fn get_booking(
    conn: &mut SqliteConnection,
    booking_id: &str,
) -> Result<Option<Booking>, PersistenceError> {
    debug!(booking_id, "Looking up booking");

    let row: Option<BookingRow> = bookings::table
        .filter(bookings::booking_id.eq(booking_id))
        .select(BookingRow::as_select())
        .first(conn)
        .optional()?;

    row.map(Booking::try_from).transpose()
}

/// Retrieves a booking together with the table it references.
///
/// Both rows are read by one statement, so they come from the same
/// committed state.
///
/// # Errors
///
/// Returns an error if the query fails or a stored row is malformed.
/// Returns `Ok(None)` if the booking does not exist.
pub fn get_booking_with_table(
    conn: &mut SqliteConnection,
    booking_id: &str,
) -> Result<Option<(Booking, Table)>, PersistenceError> {
    debug!(booking_id, "Looking up booking with its table");

    let row: Option<(BookingRow, TableRow)> = bookings::table
        .inner_join(event_tables::table)
        .filter(bookings::booking_id.eq(booking_id))
        .select((BookingRow::as_select(), TableRow::as_select()))
        .first(conn)
        .optional()?;

    row.map(
        |(booking, table)| -> Result<(Booking, Table), PersistenceError> {
            Ok((Booking::try_from(booking)?, Table::try_from(table)?))
        },
    )
    .transpose()
}

/// Lists every booking, newest first, with its table's label and price.
///
/// # Errors
///
/// Returns an error if the query fails or a stored row is malformed.
pub fn list_bookings(conn: &mut SqliteConnection) -> Result<Vec<BookingListing>, PersistenceError> {
    debug!("Listing bookings");

    let rows: Vec<(BookingRow, i64, i64)> = bookings::table
        .inner_join(event_tables::table)
        .select((
            BookingRow::as_select(),
            event_tables::table_number,
            event_tables::price,
        ))
        .order_by((bookings::created_at.desc(), bookings::booking_id.asc()))
        .load(conn)?;

    rows.into_iter()
        .map(|(row, table_number, price)| -> Result<BookingListing, PersistenceError> {
            Ok(BookingListing {
                booking: Booking::try_from(row)?,
                table_number: TableNumber::new(table_number)?,
                price: Price::new(price)?,
            })
        })
        .collect()
}

/// Returns whether a booking row exists.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn booking_exists(conn: &mut SqliteConnection, booking_id: &str) -> Result<bool, PersistenceError> {
    let found: Option<String> = bookings::table
        .filter(bookings::booking_id.eq(booking_id))
        .select(bookings::booking_id)
        .first(conn)
        .optional()?;

    Ok(found.is_some())
}
