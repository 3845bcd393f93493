// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Customer name is empty, too short or too long.
    InvalidName(String),
    /// Batch label is empty or invalid.
    InvalidBatch(String),
    /// Phone number does not match the accepted pattern.
    InvalidPhone(String),
    /// Table identifier is not a positive integer.
    InvalidTableId(i64),
    /// Table number is not a positive integer.
    InvalidTableNumber(i64),
    /// Price is negative.
    InvalidPrice(i64),
    /// A stored table status could not be parsed.
    InvalidTableStatus {
        /// The unrecognised status value.
        status: String,
    },
    /// A stored booking status could not be parsed.
    InvalidBookingStatus {
        /// The unrecognised status value.
        status: String,
    },
    /// A booking identifier is empty.
    InvalidBookingId(String),
    /// A rejection reason exceeds the allowed length.
    InvalidRejectionReason(String),
    /// An edit request carried no fields to change.
    EmptyDetailsPatch,
    /// A stored timestamp could not be parsed or formatted.
    InvalidTimestamp {
        /// The offending value.
        value: String,
        /// The parser or formatter error.
        error: String,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName(msg) => write!(f, "Invalid name: {msg}"),
            Self::InvalidBatch(msg) => write!(f, "Invalid batch: {msg}"),
            Self::InvalidPhone(msg) => write!(f, "Invalid phone number: {msg}"),
            Self::InvalidTableId(id) => {
                write!(f, "Invalid table id: {id}. Must be a positive integer")
            }
            Self::InvalidTableNumber(number) => {
                write!(
                    f,
                    "Invalid table number: {number}. Must be a positive integer"
                )
            }
            Self::InvalidPrice(price) => {
                write!(f, "Invalid price: {price}. Must not be negative")
            }
            Self::InvalidTableStatus { status } => {
                write!(f, "Invalid table status: '{status}'")
            }
            Self::InvalidBookingStatus { status } => {
                write!(f, "Invalid booking status: '{status}'")
            }
            Self::InvalidBookingId(msg) => write!(f, "Invalid booking id: {msg}"),
            Self::InvalidRejectionReason(msg) => write!(f, "Invalid rejection reason: {msg}"),
            Self::EmptyDetailsPatch => {
                write!(f, "At least one of name, batch or phone must be provided")
            }
            Self::InvalidTimestamp { value, error } => {
                write!(f, "Invalid timestamp '{value}': {error}")
            }
        }
    }
}

impl std::error::Error for DomainError {}
