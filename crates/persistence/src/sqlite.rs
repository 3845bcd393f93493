// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! SQLite-specific connection setup.
//!
//! This module is limited to:
//! - Connection pool construction
//! - Per-connection configuration (PRAGMA statements)
//! - Migration execution
//! - SQLite-specific workarounds (e.g., `last_insert_rowid()`)
//!
//! Domain queries and mutations live in `queries/` or `mutations/`.

use diesel::connection::SimpleConnection;
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::sql_types::{BigInt, Integer};
use diesel::{RunQueryDsl, SqliteConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use std::time::Duration;
use tracing::info;

use crate::error::PersistenceError;

/// Embedded `SQLite` migrations.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// How long a connection waits on a locked database before failing.
const BUSY_TIMEOUT_MS: u32 = 5000;

/// Pool of `SQLite` connections.
pub type SqlitePool = Pool<ConnectionManager<SqliteConnection>>;

/// Helper row struct for PRAGMA queries.
///
/// This is a justified use of raw SQL as Diesel has no PRAGMA DSL.
#[derive(QueryableByName)]
struct PragmaRow {
    #[diesel(sql_type = Integer)]
    foreign_keys: i32,
}

/// Applies per-connection settings every time the pool opens a connection.
///
/// `SQLite` scopes `foreign_keys` and `busy_timeout` to the connection, so
/// they must be set on each one.
#[derive(Debug, Clone, Copy)]
struct ConnectionSettings;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionSettings {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        // NOTE: PRAGMA is raw SQL (justified - Diesel has no PRAGMA DSL)
        conn.batch_execute(&format!(
            "PRAGMA foreign_keys = ON; PRAGMA busy_timeout = {BUSY_TIMEOUT_MS};"
        ))
        .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Builds a connection pool for the given database URL.
///
/// In-memory databases keep exactly one connection alive for the life of
/// the pool; the database disappears when its last connection closes.
///
/// # Arguments
///
/// * `database_url` - The `SQLite` database URL or file path
/// * `max_size` - The maximum number of pooled connections
/// * `in_memory` - Whether the URL names a shared in-memory database
///
/// # Errors
///
/// Returns an error if the pool cannot open its connections.
pub fn build_pool(
    database_url: &str,
    max_size: u32,
    in_memory: bool,
) -> Result<SqlitePool, PersistenceError> {
    info!(database_url, max_size, "Opening SQLite connection pool");

    let manager: ConnectionManager<SqliteConnection> = ConnectionManager::new(database_url);
    let builder = SqlitePool::builder()
        .connection_customizer(Box::new(ConnectionSettings))
        .connection_timeout(Duration::from_secs(10));

    let builder = if in_memory {
        builder
            .max_size(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        builder.max_size(max_size.max(1))
    };

    builder
        .build(manager)
        .map_err(|e| PersistenceError::DatabaseConnectionFailed(e.to_string()))
}

/// Runs pending migrations on the provided connection.
///
/// # Errors
///
/// Returns an error if migration execution fails.
pub fn run_migrations(conn: &mut SqliteConnection) -> Result<(), PersistenceError> {
    info!("Running SQLite database migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| PersistenceError::MigrationFailed(e.to_string()))?;
    Ok(())
}

/// Enables WAL mode for file-based `SQLite` databases.
///
/// WAL lets readers proceed while a writer holds the database. The mode is
/// stored in the database file, so setting it once is enough.
///
/// # Errors
///
/// Returns an error if the PRAGMA statement fails.
pub fn enable_wal_mode(conn: &mut SqliteConnection) -> Result<(), PersistenceError> {
    // NOTE: PRAGMA is raw SQL (justified - Diesel has no PRAGMA DSL)
    conn.batch_execute("PRAGMA journal_mode = WAL")
        .map_err(|e| PersistenceError::InitializationError(e.to_string()))
}

/// Verifies that foreign key enforcement is enabled.
///
/// # Errors
///
/// Returns an error if foreign key enforcement is not enabled.
pub fn verify_foreign_key_enforcement(conn: &mut SqliteConnection) -> Result<(), PersistenceError> {
    // NOTE: PRAGMA is raw SQL (justified - Diesel has no PRAGMA DSL)
    let foreign_keys_enabled: i32 = diesel::sql_query("PRAGMA foreign_keys")
        .get_result::<PragmaRow>(conn)?
        .foreign_keys;

    if foreign_keys_enabled == 0 {
        return Err(PersistenceError::ForeignKeyEnforcementNotEnabled);
    }

    info!("SQLite foreign key enforcement is enabled");
    Ok(())
}

/// Returns the last inserted row ID.
///
/// This is a justified use of raw SQL as Diesel has no direct API for this.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_last_insert_rowid(conn: &mut SqliteConnection) -> Result<i64, PersistenceError> {
    Ok(diesel::select(sql::<BigInt>("last_insert_rowid()")).get_result(conn)?)
}
