// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use tablebook_domain::DomainError;

/// Errors that can occur during persistence operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// A database error occurred.
    DatabaseError(String),
    /// Database connection failed.
    DatabaseConnectionFailed(String),
    /// A connection could not be checked out of the pool.
    PoolError(String),
    /// Database migration failed.
    MigrationFailed(String),
    /// Initialization error.
    InitializationError(String),
    /// Foreign key enforcement is not enabled.
    ForeignKeyEnforcementNotEnabled,
    /// The requested table was not found.
    TableNotFound(i64),
    /// The requested booking was not found.
    BookingNotFound(String),
    /// A table no longer had the status a transition expected.
    TableStatusConflict {
        /// The table id.
        table_id: i64,
        /// The status the transition expected.
        expected: String,
    },
    /// A booking no longer had the status a transition expected.
    BookingStatusConflict {
        /// The booking id.
        booking_id: String,
        /// The status the transition expected.
        expected: String,
    },
    /// The table already has an active booking.
    ActiveBookingExists(i64),
    /// An operator with the same login name already exists.
    DuplicateOperator(String),
    /// A stored row could not be converted to a domain value.
    CorruptRecord(String),
    /// A general error occurred.
    Other(String),
}

impl PersistenceError {
    /// Returns true if the error reports a lost race against a concurrent writer.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::TableStatusConflict { .. }
                | Self::BookingStatusConflict { .. }
                | Self::ActiveBookingExists(_)
        )
    }
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::DatabaseConnectionFailed(msg) => {
                write!(f, "Database connection failed: {msg}")
            }
            Self::PoolError(msg) => write!(f, "Connection pool error: {msg}"),
            Self::MigrationFailed(msg) => write!(f, "Migration failed: {msg}"),
            Self::InitializationError(msg) => write!(f, "Initialization error: {msg}"),
            Self::ForeignKeyEnforcementNotEnabled => {
                write!(f, "Foreign key enforcement is not enabled")
            }
            Self::TableNotFound(id) => write!(f, "Table not found: {id}"),
            Self::BookingNotFound(id) => write!(f, "Booking not found: {id}"),
            Self::TableStatusConflict { table_id, expected } => {
                write!(f, "Table {table_id} is no longer {expected}")
            }
            Self::BookingStatusConflict {
                booking_id,
                expected,
            } => write!(f, "Booking {booking_id} is no longer {expected}"),
            Self::ActiveBookingExists(table_id) => {
                write!(f, "Table {table_id} already has an active booking")
            }
            Self::DuplicateOperator(login) => {
                write!(f, "Operator with login name '{login}' already exists")
            }
            Self::CorruptRecord(msg) => write!(f, "Corrupt record: {msg}"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<diesel::result::Error> for PersistenceError {
    fn from(err: diesel::result::Error) -> Self {
        Self::DatabaseError(err.to_string())
    }
}

impl From<diesel::ConnectionError> for PersistenceError {
    fn from(err: diesel::ConnectionError) -> Self {
        Self::DatabaseConnectionFailed(err.to_string())
    }
}

impl From<diesel::r2d2::PoolError> for PersistenceError {
    fn from(err: diesel::r2d2::PoolError) -> Self {
        Self::PoolError(err.to_string())
    }
}

impl From<DomainError> for PersistenceError {
    fn from(err: DomainError) -> Self {
        Self::CorruptRecord(err.to_string())
    }
}
