// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking lifecycle state and customer data.

use crate::error::DomainError;
use crate::table::TableStatus;
use crate::types::{BookingId, EvidenceReference, TableId};
use crate::validation::{validate_batch, validate_customer_name, validate_phone};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::OffsetDateTime;

/// Verification status of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    /// Reserved without a payment slip.
    PendingPayment,
    /// Payment slip attached, awaiting staff verification.
    Verifying,
    /// Verified by staff. The table is held indefinitely.
    Paid,
    /// Rejected by staff. The table has been released.
    Rejected,
}

impl BookingStatus {
    /// Returns the persisted string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PendingPayment => "PENDING_PAYMENT",
            Self::Verifying => "VERIFYING",
            Self::Paid => "PAID",
            Self::Rejected => "REJECTED",
        }
    }

    /// Returns true if the booking currently holds its table.
    #[must_use]
    pub const fn holds_table(&self) -> bool {
        matches!(self, Self::PendingPayment | Self::Verifying | Self::Paid)
    }

    /// Returns true if the booking is waiting on staff.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::PendingPayment | Self::Verifying)
    }

    /// Returns the status a new booking starts in.
    ///
    /// Bookings created with evidence attached go straight to verification.
    #[must_use]
    pub const fn initial(has_evidence: bool) -> Self {
        if has_evidence {
            Self::Verifying
        } else {
            Self::PendingPayment
        }
    }

    /// Returns the table status that pairs with this booking status.
    ///
    /// A rejected booking no longer owns its table, so it has no pairing.
    #[must_use]
    pub const fn paired_table_status(&self) -> Option<TableStatus> {
        match self {
            Self::PendingPayment | Self::Verifying => Some(TableStatus::Locked),
            Self::Paid => Some(TableStatus::Booked),
            Self::Rejected => None,
        }
    }
}

impl FromStr for BookingStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING_PAYMENT" => Ok(Self::PendingPayment),
            "VERIFYING" => Ok(Self::Verifying),
            "PAID" => Ok(Self::Paid),
            "REJECTED" => Ok(Self::Rejected),
            _ => Err(DomainError::InvalidBookingStatus {
                status: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated customer contact data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    name: String,
    batch: String,
    phone: String,
}

impl CustomerDetails {
    /// Validates and constructs customer details.
    ///
    /// # Errors
    ///
    /// Returns an error if any field fails validation.
    pub fn new(name: &str, batch: &str, phone: &str) -> Result<Self, DomainError> {
        Ok(Self {
            name: validate_customer_name(name)?,
            batch: validate_batch(batch)?,
            phone: validate_phone(phone)?,
        })
    }

    /// Reconstructs details from storage without re-validating.
    #[must_use]
    pub const fn from_stored(name: String, batch: String, phone: String) -> Self {
        Self { name, batch, phone }
    }

    /// Returns the customer name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the cohort label.
    #[must_use]
    pub fn batch(&self) -> &str {
        &self.batch
    }

    /// Returns the phone number.
    #[must_use]
    pub fn phone(&self) -> &str {
        &self.phone
    }
}

/// A partial update to customer details.
///
/// Only the fields that are `Some` are changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailsPatch {
    /// New customer name.
    pub name: Option<String>,
    /// New batch label.
    pub batch: Option<String>,
    /// New phone number.
    pub phone: Option<String>,
}

impl DetailsPatch {
    /// Validates the provided fields and returns the normalized patch.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::EmptyDetailsPatch` if no field is provided, or
    /// the field error if any provided field is invalid.
    pub fn validated(self) -> Result<Self, DomainError> {
        if self.is_empty() {
            return Err(DomainError::EmptyDetailsPatch);
        }

        Ok(Self {
            name: self.name.as_deref().map(validate_customer_name).transpose()?,
            batch: self.batch.as_deref().map(validate_batch).transpose()?,
            phone: self.phone.as_deref().map(validate_phone).transpose()?,
        })
    }

    /// Returns true if the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.batch.is_none() && self.phone.is_none()
    }

    /// Applies the patch to a set of details.
    #[must_use]
    pub fn apply_to(&self, details: &CustomerDetails) -> CustomerDetails {
        CustomerDetails {
            name: self.name.clone().unwrap_or_else(|| details.name.clone()),
            batch: self.batch.clone().unwrap_or_else(|| details.batch.clone()),
            phone: self.phone.clone().unwrap_or_else(|| details.phone.clone()),
        }
    }
}

/// One customer's reservation attempt against a specific table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    /// Generated unique identity.
    pub id: BookingId,
    /// The table this booking references.
    pub table_id: TableId,
    /// Customer contact data.
    pub details: CustomerDetails,
    /// Uploaded payment slip, if any.
    pub evidence: Option<EvidenceReference>,
    /// Verification status.
    pub status: BookingStatus,
    /// Staff-supplied reason, recorded when the booking is rejected.
    pub rejection_reason: Option<String>,
    /// When the booking was created.
    pub created_at: OffsetDateTime,
    /// When staff approved the booking.
    pub verified_at: Option<OffsetDateTime>,
    /// The staff member who last modified the booking.
    pub updated_by: Option<String>,
}
