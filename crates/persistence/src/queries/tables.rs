// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Capacity store queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tablebook_domain::Table;
use tracing::debug;

use crate::data_models::TableRow;
use crate::diesel_schema::event_tables;
use crate::error::PersistenceError;

/// Retrieves a table by id.
///
/// # Errors
///
/// Returns an error if the query fails or the stored row is malformed.
/// Returns `Ok(None)` if the table does not exist.
pub fn get_table(conn: &mut SqliteConnection, table_id: i64) -> Result<Option<Table>, PersistenceError> {
    debug!(table_id, "Looking up table");

    let row: Option<TableRow> = event_tables::table
        .filter(event_tables::table_id.eq(table_id))
        .select(TableRow::as_select())
        .first(conn)
        .optional()?;

    row.map(Table::try_from).transpose()
}

/// Lists all tables ordered by their numeric label.
///
/// # Errors
///
/// Returns an error if the query fails or a stored row is malformed.
pub fn list_tables(conn: &mut SqliteConnection) -> Result<Vec<Table>, PersistenceError> {
    debug!("Listing tables");

    let rows: Vec<TableRow> = event_tables::table
        .select(TableRow::as_select())
        .order_by(event_tables::table_number.asc())
        .load(conn)?;

    rows.into_iter().map(Table::try_from).collect()
}
