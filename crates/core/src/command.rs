// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use tablebook_domain::{CustomerDetails, DetailsPatch, EvidenceReference};

/// A validated request to reserve a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReserveRequest {
    /// Customer contact data.
    pub details: CustomerDetails,
    /// Payment slip, already stored.
    pub evidence: Option<EvidenceReference>,
}

/// A staff command against an existing booking.
///
/// Commands are the only way to request booking state changes after a
/// reservation has been created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Mark the booking paid and the table booked.
    Approve,
    /// Mark the booking rejected and release the table.
    Reject {
        /// Optional reason shown to staff.
        reason: Option<String>,
    },
    /// Remove the booking record.
    Delete,
    /// Change customer details without touching status.
    EditDetails {
        /// The fields to change.
        changes: DetailsPatch,
    },
}

impl Command {
    /// Returns a short name for logging and errors.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject { .. } => "reject",
            Self::Delete => "delete",
            Self::EditDetails { .. } => "edit",
        }
    }
}
