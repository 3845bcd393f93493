// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use tablebook_domain::{Booking, BookingId, BookingStatus, DetailsPatch, TableId, TableStatus};
use time::OffsetDateTime;

/// A compare-and-commit write to a table's status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableWrite {
    /// The table to update.
    pub table_id: TableId,
    /// The status the table must still have at commit time.
    pub expected: TableStatus,
    /// The status to write.
    pub next: TableStatus,
}

/// A write to the bookings store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingWrite {
    /// Create a new booking.
    Insert(Booking),
    /// Move a booking to a new status.
    UpdateStatus {
        /// The booking to update.
        booking_id: BookingId,
        /// The status the booking must still have at commit time.
        expected: BookingStatus,
        /// The status to write.
        next: BookingStatus,
        /// Verification time to record.
        verified_at: Option<OffsetDateTime>,
        /// Rejection reason to record.
        rejection_reason: Option<String>,
        /// Staff identity to record.
        updated_by: String,
    },
    /// Change customer details.
    UpdateDetails {
        /// The booking to update.
        booking_id: BookingId,
        /// Validated changes; absent fields are left as stored.
        changes: DetailsPatch,
        /// Staff identity to record.
        updated_by: String,
    },
    /// Remove a booking.
    Remove {
        /// The booking to remove.
        booking_id: BookingId,
        /// The status the booking must still have at commit time.
        expected: BookingStatus,
    },
}

impl BookingWrite {
    /// Returns the id of the booking this write targets.
    #[must_use]
    pub const fn booking_id(&self) -> &BookingId {
        match self {
            Self::Insert(booking) => &booking.id,
            Self::UpdateStatus { booking_id, .. }
            | Self::UpdateDetails { booking_id, .. }
            | Self::Remove { booking_id, .. } => booking_id,
        }
    }
}

/// The paired writes of one state machine step.
///
/// A transition is committed all-or-nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// The booking write.
    pub booking: BookingWrite,
    /// The table write, if the step changes occupancy.
    pub table: Option<TableWrite>,
}

/// The outcome of applying a staff command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionResult {
    /// The command produced writes to commit.
    Applied(Transition),
    /// The booking is already in the requested state.
    Unchanged,
}
