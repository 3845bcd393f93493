// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tablebook_domain::{Price, TableStatus};
use tracing::info;

use crate::data_models::SeedOutcome;
use crate::diesel_schema::event_tables;
use crate::error::PersistenceError;

/// Creates tables numbered `1..=count` that do not already exist.
///
/// Existing tables are matched by label and left untouched, including
/// their price and status, so seeding can be re-run safely.
///
/// # Errors
///
/// Returns an error if the price does not fit the database column or the
/// insert fails. Nothing is committed on error.
pub fn seed_tables(
    conn: &mut SqliteConnection,
    count: u32,
    price: Price,
) -> Result<SeedOutcome, PersistenceError> {
    let price: i64 = i64::try_from(price.amount())
        .map_err(|_| PersistenceError::Other(format!("Price {} is too large", price.amount())))?;

    let outcome: SeedOutcome = conn.immediate_transaction(|conn| {
        let mut outcome: SeedOutcome = SeedOutcome::default();

        for number in 1..=count {
            let inserted: usize = diesel::insert_or_ignore_into(event_tables::table)
                .values((
                    event_tables::table_number.eq(i64::from(number)),
                    event_tables::price.eq(price),
                    event_tables::status.eq(TableStatus::Available.as_str()),
                ))
                .execute(conn)?;

            if inserted == 0 {
                outcome.existing += 1;
            } else {
                outcome.created += 1;
            }
        }

        Ok::<SeedOutcome, PersistenceError>(outcome)
    })?;

    info!(
        created = outcome.created,
        existing = outcome.existing,
        "Seeded event tables"
    );
    Ok(outcome)
}
