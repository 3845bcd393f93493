// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Stable database identity of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableId(i64);

impl TableId {
    /// Creates a table id.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTableId` if the id is not positive.
    pub const fn new(id: i64) -> Result<Self, DomainError> {
        if id <= 0 {
            return Err(DomainError::InvalidTableId(id));
        }
        Ok(Self(id))
    }

    /// Returns the raw id.
    #[must_use]
    pub const fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for TableId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Human-facing table label.
///
/// Labels are sequence numbers and order numerically, so table 2 sorts
/// before table 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableNumber(u32);

impl TableNumber {
    /// Creates a table number.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTableNumber` if the number is zero or
    /// does not fit a `u32`.
    pub fn new(number: i64) -> Result<Self, DomainError> {
        match u32::try_from(number) {
            Ok(n) if n > 0 => Ok(Self(n)),
            _ => Err(DomainError::InvalidTableNumber(number)),
        }
    }

    /// Returns the numeric label.
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for TableNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Price of a table in whole currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(u64);

impl Price {
    /// Creates a price from a stored value.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPrice` if the value is negative.
    pub fn new(amount: i64) -> Result<Self, DomainError> {
        u64::try_from(amount)
            .map(Self)
            .map_err(|_| DomainError::InvalidPrice(amount))
    }

    /// Returns the amount.
    #[must_use]
    pub const fn amount(&self) -> u64 {
        self.0
    }
}

/// Generated unique identity of a booking.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingId(String);

impl BookingId {
    /// Wraps a booking id.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidBookingId` if the id is blank.
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id: String = id.into();
        if id.trim().is_empty() {
            return Err(DomainError::InvalidBookingId(String::from(
                "Booking id cannot be empty",
            )));
        }
        Ok(Self(id))
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BookingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque, publicly resolvable reference to an uploaded payment slip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvidenceReference(String);

impl EvidenceReference {
    /// Wraps a reference URL returned by the object store.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// Returns the reference URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.0
    }
}

/// The staff member performing a verification or edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffActor {
    /// The operator's login name.
    pub login_name: String,
    /// The operator's display name.
    pub display_name: String,
}

impl StaffActor {
    /// Creates a staff actor.
    #[must_use]
    pub const fn new(login_name: String, display_name: String) -> Self {
        Self {
            login_name,
            display_name,
        }
    }

    /// Returns the identity recorded on bookings this actor modifies.
    ///
    /// The display name is preferred; the login name is used when the
    /// display name is blank.
    #[must_use]
    pub fn stamp(&self) -> String {
        if self.display_name.trim().is_empty() {
            self.login_name.clone()
        } else {
            self.display_name.clone()
        }
    }
}
