// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the event table booking system.
//!
//! This crate provides the capacity store (tables), the reservation store
//! (bookings) and staff identity storage on Diesel and `SQLite`.
//!
//! ## Concurrency
//!
//! `Persistence` wraps a connection pool and is cheap to clone. Requests do
//! not coordinate with each other in process; correctness rests on the
//! database:
//!
//! - Every state machine step is committed by `apply_transition` inside an
//!   immediate transaction.
//! - Every write in a transition is conditional on the status the state
//!   machine read, so a lost race surfaces as a conflict, never as an
//!   overwrite.
//! - A partial unique index allows at most one active booking per table.
//!
//! File databases run in WAL mode so listings can read while a writer
//! commits. In-memory databases (used by tests) are served by a single
//! pooled connection.

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

use diesel::SqliteConnection;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tablebook::Transition;
use tablebook_domain::{Booking, BookingListing, Price, Table, TableStatus, format_timestamp};
use time::OffsetDateTime;

mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;
mod sqlite;

#[cfg(test)]
mod tests;

pub use data_models::{OperatorData, SeedOutcome, SessionData};
pub use error::PersistenceError;

/// Atomic counter for generating unique in-memory database names.
///
/// Each call to `new_in_memory()` receives a unique sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Default number of pooled connections for file databases.
pub const DEFAULT_POOL_SIZE: u32 = 8;

type Connection = PooledConnection<ConnectionManager<SqliteConnection>>;

/// Persistence adapter for tables, bookings, operators and sessions.
#[derive(Clone)]
pub struct Persistence {
    pool: sqlite::SqlitePool,
}

impl std::fmt::Debug for Persistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persistence")
            .field("connections", &self.pool.state().connections)
            .finish()
    }
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives a unique shared in-memory database, so tests are
    /// isolated from each other.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String = format!("file:memdb_{db_id}?mode=memory&cache=shared");

        let pool: sqlite::SqlitePool = sqlite::build_pool(&shared_memory_url, 1, true)?;
        let persistence: Self = Self { pool };
        persistence.initialize(false)?;
        Ok(persistence)
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    /// * `pool_size` - The maximum number of pooled connections
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P, pool_size: u32) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let pool: sqlite::SqlitePool = sqlite::build_pool(path_str, pool_size, false)?;
        let persistence: Self = Self { pool };
        persistence.initialize(true)?;
        Ok(persistence)
    }

    fn initialize(&self, wal: bool) -> Result<(), PersistenceError> {
        let mut conn: Connection = self.conn()?;
        if wal {
            sqlite::enable_wal_mode(&mut conn)?;
        }
        sqlite::run_migrations(&mut conn)?;
        sqlite::verify_foreign_key_enforcement(&mut conn)
    }

    fn conn(&self) -> Result<Connection, PersistenceError> {
        Ok(self.pool.get()?)
    }

    // ========================================================================
    // Capacity Store
    // ========================================================================

    /// Retrieves a table by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_table(&self, table_id: i64) -> Result<Option<Table>, PersistenceError> {
        queries::tables::get_table(&mut *self.conn()?, table_id)
    }

    /// Lists all tables ordered by their numeric label.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_tables(&self) -> Result<Vec<Table>, PersistenceError> {
        queries::tables::list_tables(&mut *self.conn()?)
    }

    /// Sets a table's status only if it still has the expected status.
    ///
    /// Returns `true` if the status was changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub fn update_table_status_if(
        &self,
        table_id: i64,
        expected: TableStatus,
        next: TableStatus,
    ) -> Result<bool, PersistenceError> {
        mutations::transition::update_table_status_if(&mut *self.conn()?, table_id, expected, next)
    }

    /// Creates tables numbered `1..=count` that do not already exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails; nothing is committed.
    pub fn seed_tables(&self, count: u32, price: Price) -> Result<SeedOutcome, PersistenceError> {
        mutations::seed::seed_tables(&mut *self.conn()?, count, price)
    }

    // ========================================================================
    // Reservation Store
    // ========================================================================

    /// Retrieves a booking by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_booking(&self, booking_id: &str) -> Result<Option<Booking>, PersistenceError> {
        queries::bookings::get_booking(&mut *self.conn()?, booking_id)
    }

    /// Retrieves a booking together with the table it references.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_booking_with_table(
        &self,
        booking_id: &str,
    ) -> Result<Option<(Booking, Table)>, PersistenceError> {
        queries::bookings::get_booking_with_table(&mut *self.conn()?, booking_id)
    }

    /// Lists every booking newest first, with its table's label and price.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_bookings(&self) -> Result<Vec<BookingListing>, PersistenceError> {
        queries::bookings::list_bookings(&mut *self.conn()?)
    }

    /// Commits a state machine transition atomically.
    ///
    /// # Errors
    ///
    /// Returns an error, with nothing committed, if any expected status no
    /// longer holds or the database operation fails.
    pub fn apply_transition(&self, transition: &Transition) -> Result<(), PersistenceError> {
        mutations::transition::apply_transition(&mut *self.conn()?, transition)
    }

    // ========================================================================
    // Operators & Sessions
    // ========================================================================

    /// Creates a new operator and returns its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the login name already exists or the insert fails.
    pub fn create_operator(
        &self,
        login_name: &str,
        display_name: &str,
        password: &str,
        role: &str,
    ) -> Result<i64, PersistenceError> {
        let now: String = now_text()?;
        mutations::operators::create_operator(
            &mut *self.conn()?,
            login_name,
            display_name,
            password,
            role,
            &now,
        )
    }

    /// Retrieves an operator by login name (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_operator_by_login(
        &self,
        login_name: &str,
    ) -> Result<Option<OperatorData>, PersistenceError> {
        queries::operators::get_operator_by_login(&mut *self.conn()?, login_name)
    }

    /// Retrieves an operator by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_operator_by_id(
        &self,
        operator_id: i64,
    ) -> Result<Option<OperatorData>, PersistenceError> {
        queries::operators::get_operator_by_id(&mut *self.conn()?, operator_id)
    }

    /// Records a successful login.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub fn update_last_login(&self, operator_id: i64) -> Result<(), PersistenceError> {
        let now: String = now_text()?;
        mutations::operators::update_last_login(&mut *self.conn()?, operator_id, &now)
    }

    /// Counts active admin operators.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn count_active_admin_operators(&self) -> Result<i64, PersistenceError> {
        queries::operators::count_active_admin_operators(&mut *self.conn()?)
    }

    /// Verifies a password against a stored hash.
    ///
    /// # Errors
    ///
    /// Returns an error if password verification fails.
    pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, PersistenceError> {
        queries::operators::verify_password(password, password_hash)
    }

    /// Creates a session that expires at `expires_at`.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be created.
    pub fn create_session(
        &self,
        session_token: &str,
        operator_id: i64,
        expires_at: OffsetDateTime,
    ) -> Result<i64, PersistenceError> {
        let now: String = now_text()?;
        let expires_at: String = format_timestamp(expires_at)?;
        mutations::operators::create_session(
            &mut *self.conn()?,
            session_token,
            operator_id,
            &now,
            &expires_at,
        )
    }

    /// Retrieves a session by token.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_session_by_token(
        &self,
        session_token: &str,
    ) -> Result<Option<SessionData>, PersistenceError> {
        queries::operators::get_session_by_token(&mut *self.conn()?, session_token)
    }

    /// Records activity on a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub fn update_session_activity(&self, session_id: i64) -> Result<(), PersistenceError> {
        let now: String = now_text()?;
        mutations::operators::update_session_activity(&mut *self.conn()?, session_id, &now)
    }

    /// Deletes a session by token.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub fn delete_session(&self, session_token: &str) -> Result<(), PersistenceError> {
        mutations::operators::delete_session(&mut *self.conn()?, session_token)
    }

    /// Deletes every session whose expiry has passed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub fn delete_expired_sessions(&self) -> Result<usize, PersistenceError> {
        let now: String = now_text()?;
        mutations::operators::delete_expired_sessions(&mut *self.conn()?, &now)
    }
}

fn now_text() -> Result<String, PersistenceError> {
    Ok(format_timestamp(OffsetDateTime::now_utc())?)
}
