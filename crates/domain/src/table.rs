// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Table occupancy state.
//!
//! A table's status only ever changes through the booking state machine,
//! always in the same atomic unit as the booking that owns it.

use crate::error::DomainError;
use crate::types::{Price, TableId, TableNumber};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Occupancy status of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TableStatus {
    /// Free for a new reservation.
    Available,
    /// Held by a reservation awaiting payment or verification.
    Locked,
    /// Held by a paid reservation.
    Booked,
}

impl TableStatus {
    /// Returns the persisted string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "AVAILABLE",
            Self::Locked => "LOCKED",
            Self::Booked => "BOOKED",
        }
    }

    /// Returns true if a new reservation may claim the table.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }
}

impl FromStr for TableStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AVAILABLE" => Ok(Self::Available),
            "LOCKED" => Ok(Self::Locked),
            "BOOKED" => Ok(Self::Booked),
            _ => Err(DomainError::InvalidTableStatus {
                status: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for TableStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fixed-price, uniquely numbered seating unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    /// Stable database identity.
    pub id: TableId,
    /// Human-facing label.
    pub number: TableNumber,
    /// Price of the table.
    pub price: Price,
    /// Current occupancy status.
    pub status: TableStatus,
}

impl Table {
    /// Creates a table value.
    #[must_use]
    pub const fn new(id: TableId, number: TableNumber, price: Price, status: TableStatus) -> Self {
        Self {
            id,
            number,
            price,
            status,
        }
    }
}
