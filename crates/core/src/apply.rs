// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::{Command, ReserveRequest};
use crate::error::CoreError;
use crate::state::{BookingWrite, TableWrite, Transition, TransitionResult};
use tablebook_domain::{
    Booking, BookingId, BookingStatus, DetailsPatch, StaffActor, Table, TableStatus,
    normalize_rejection_reason,
};
use time::OffsetDateTime;

/// Computes the transition that reserves a table.
///
/// The table must be `AVAILABLE` as read. The returned table write expects
/// `AVAILABLE` at commit time as well, so of two concurrent reservations
/// computed from the same read only one can commit.
///
/// # Arguments
///
/// * `table` - The table as currently stored
/// * `request` - Validated customer details and optional evidence
/// * `booking_id` - The identity to give the new booking
/// * `now` - The creation time
///
/// # Errors
///
/// Returns `CoreError::TableUnavailable` if the table is not available.
pub fn apply_reserve(
    table: &Table,
    request: ReserveRequest,
    booking_id: BookingId,
    now: OffsetDateTime,
) -> Result<Transition, CoreError> {
    if !table.status.is_available() {
        return Err(CoreError::TableUnavailable {
            table_number: table.number,
            status: table.status,
        });
    }

    let status: BookingStatus = BookingStatus::initial(request.evidence.is_some());
    let booking: Booking = Booking {
        id: booking_id,
        table_id: table.id,
        details: request.details,
        evidence: request.evidence,
        status,
        rejection_reason: None,
        created_at: now,
        verified_at: None,
        updated_by: None,
    };

    Ok(Transition {
        booking: BookingWrite::Insert(booking),
        table: Some(TableWrite {
            table_id: table.id,
            expected: TableStatus::Available,
            next: TableStatus::Locked,
        }),
    })
}

/// Applies a staff command to a booking and the table it references.
///
/// Approving a booking that is already paid, or rejecting one that is
/// already rejected, returns `TransitionResult::Unchanged`.
///
/// # Arguments
///
/// * `command` - The staff command
/// * `booking` - The booking as currently stored
/// * `table` - The table the booking references, as currently stored
/// * `actor` - The staff member issuing the command
/// * `now` - The time of the command
///
/// # Errors
///
/// Returns an error if:
/// - The table is not the booking's table
/// - The command is not valid from the booking's status
/// - A rejection reason or details patch fails validation
pub fn apply(
    command: Command,
    booking: &Booking,
    table: &Table,
    actor: &StaffActor,
    now: OffsetDateTime,
) -> Result<TransitionResult, CoreError> {
    if booking.table_id != table.id {
        return Err(CoreError::TableMismatch {
            expected: booking.table_id,
            actual: table.id,
        });
    }

    let command_name: &'static str = command.name();

    match command {
        Command::Approve => match booking.status {
            BookingStatus::Paid => Ok(TransitionResult::Unchanged),
            BookingStatus::Rejected => Err(invalid(booking, command_name)),
            BookingStatus::PendingPayment | BookingStatus::Verifying => {
                Ok(TransitionResult::Applied(Transition {
                    booking: BookingWrite::UpdateStatus {
                        booking_id: booking.id.clone(),
                        expected: booking.status,
                        next: BookingStatus::Paid,
                        verified_at: Some(now),
                        rejection_reason: None,
                        updated_by: actor.stamp(),
                    },
                    table: Some(TableWrite {
                        table_id: table.id,
                        expected: table.status,
                        next: TableStatus::Booked,
                    }),
                }))
            }
        },
        Command::Reject { reason } => match booking.status {
            BookingStatus::Rejected => Ok(TransitionResult::Unchanged),
            BookingStatus::Paid => Err(invalid(booking, command_name)),
            BookingStatus::PendingPayment | BookingStatus::Verifying => {
                let rejection_reason: Option<String> =
                    normalize_rejection_reason(reason.as_deref())?;

                Ok(TransitionResult::Applied(Transition {
                    booking: BookingWrite::UpdateStatus {
                        booking_id: booking.id.clone(),
                        expected: booking.status,
                        next: BookingStatus::Rejected,
                        verified_at: booking.verified_at,
                        rejection_reason,
                        updated_by: actor.stamp(),
                    },
                    table: Some(TableWrite {
                        table_id: table.id,
                        expected: table.status,
                        next: TableStatus::Available,
                    }),
                }))
            }
        },
        Command::Delete => {
            // A rejected booking already gave its table back, and the table
            // may since have been reserved by someone else.
            let table_write: Option<TableWrite> =
                booking.status.holds_table().then_some(TableWrite {
                    table_id: table.id,
                    expected: table.status,
                    next: TableStatus::Available,
                });

            Ok(TransitionResult::Applied(Transition {
                booking: BookingWrite::Remove {
                    booking_id: booking.id.clone(),
                    expected: booking.status,
                },
                table: table_write,
            }))
        }
        Command::EditDetails { changes } => {
            let changes: DetailsPatch = changes.validated()?;

            Ok(TransitionResult::Applied(Transition {
                booking: BookingWrite::UpdateDetails {
                    booking_id: booking.id.clone(),
                    changes,
                    updated_by: actor.stamp(),
                },
                table: None,
            }))
        }
    }
}

fn invalid(booking: &Booking, command: &'static str) -> CoreError {
    CoreError::InvalidTransition {
        booking_id: booking.id.clone(),
        status: booking.status,
        command,
    }
}
