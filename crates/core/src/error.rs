// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use tablebook_domain::{BookingId, BookingStatus, DomainError, TableId, TableNumber, TableStatus};

/// Errors that can occur during state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A domain rule was violated.
    DomainViolation(DomainError),
    /// The table is not available for a new reservation.
    TableUnavailable {
        /// The table label.
        table_number: TableNumber,
        /// The status the table was found in.
        status: TableStatus,
    },
    /// The command is not valid for the booking's current status.
    InvalidTransition {
        /// The booking the command targeted.
        booking_id: BookingId,
        /// The booking's current status.
        status: BookingStatus,
        /// The command name.
        command: &'static str,
    },
    /// The table supplied does not belong to the booking.
    TableMismatch {
        /// The table the booking references.
        expected: TableId,
        /// The table that was supplied.
        actual: TableId,
    },
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomainViolation(err) => write!(f, "Domain violation: {err}"),
            Self::TableUnavailable {
                table_number,
                status,
            } => write!(f, "Table {table_number} is not available (status {status})"),
            Self::InvalidTransition {
                booking_id,
                status,
                command,
            } => write!(
                f,
                "Cannot {command} booking {booking_id} while it is {status}"
            ),
            Self::TableMismatch { expected, actual } => write!(
                f,
                "Booking references table {expected} but table {actual} was supplied"
            ),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        Self::DomainViolation(err)
    }
}
