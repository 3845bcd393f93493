// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Aggregates shown on listings and the staff dashboard.

use crate::booking::{Booking, BookingStatus};
use crate::table::{Table, TableStatus};
use crate::types::{Price, TableNumber};
use serde::{Deserialize, Serialize};

/// A booking joined with the table it references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingListing {
    /// The booking.
    pub booking: Booking,
    /// Label of the referenced table.
    pub table_number: TableNumber,
    /// Price of the referenced table.
    pub price: Price,
}

/// Aggregated counts for the staff dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    /// Number of PAID bookings.
    pub paid_count: usize,
    /// Number of bookings awaiting payment or verification.
    pub pending_count: usize,
    /// Sum of table prices over PAID bookings.
    pub total_revenue: u64,
}

impl DashboardStats {
    /// Computes dashboard aggregates over a set of listings.
    #[must_use]
    pub fn from_listings(listings: &[BookingListing]) -> Self {
        listings
            .iter()
            .fold(Self::default(), |mut stats, listing| {
                match listing.booking.status {
                    BookingStatus::Paid => {
                        stats.paid_count += 1;
                        stats.total_revenue =
                            stats.total_revenue.saturating_add(listing.price.amount());
                    }
                    BookingStatus::PendingPayment | BookingStatus::Verifying => {
                        stats.pending_count += 1;
                    }
                    BookingStatus::Rejected => {}
                }
                stats
            })
    }
}

/// Occupancy counts across all tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilitySummary {
    /// Number of tables.
    pub total: usize,
    /// Tables free for reservation.
    pub available: usize,
    /// Tables held by an unpaid or unverified booking.
    pub locked: usize,
    /// Tables held by a paid booking.
    pub booked: usize,
    /// Tables held by any booking.
    pub taken: usize,
}

impl AvailabilitySummary {
    /// Computes occupancy counts over a set of tables.
    #[must_use]
    pub fn from_tables(tables: &[Table]) -> Self {
        let mut summary: Self = Self {
            total: tables.len(),
            ..Self::default()
        };

        for table in tables {
            match table.status {
                TableStatus::Available => summary.available += 1,
                TableStatus::Locked => summary.locked += 1,
                TableStatus::Booked => summary.booked += 1,
            }
        }

        summary.taken = summary.locked + summary.booked;
        summary
    }
}
