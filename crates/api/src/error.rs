// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use std::time::Duration;
use tablebook::CoreError;
use tablebook_domain::DomainError;
use tablebook_persistence::PersistenceError;
use tracing::error;

use crate::evidence::EvidenceError;

/// Message returned to callers when an infrastructure failure occurs.
///
/// The full detail is logged server-side.
pub const RETRY_MESSAGE: &str = "Something went wrong on our side. Please try again.";

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// Operator or session storage failed.
    Persistence(PersistenceError),
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
            Self::Persistence(err) => write!(f, "Authentication storage failed: {err}"),
        }
    }
}

impl std::error::Error for AuthError {}

/// API-level errors.
///
/// Every operation returns one of these instead of panicking or leaking a
/// lower-layer error. A failed operation never leaves a table and its
/// booking partially updated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Invalid input was provided. Nothing was changed.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// The table was not available when the reservation was committed.
    CapacityUnavailable {
        /// A corrective message for the customer.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// The payment slip could not be stored.
    UploadFailed {
        /// A human-readable description of the failure.
        message: String,
    },
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed - the actor does not have permission.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// The booking was changed by someone else, or the command does not
    /// apply to its current status.
    Conflict {
        /// A human-readable description of the conflict.
        message: String,
    },
    /// The caller has submitted too many requests.
    RateLimited {
        /// How long until the next request will be admitted.
        retry_after: Duration,
    },
    /// An internal error occurred.
    Internal {
        /// A description safe to show to the caller.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::CapacityUnavailable { message }
            | Self::UploadFailed { message }
            | Self::Conflict { message }
            | Self::Internal { message } => f.write_str(message),
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
            Self::RateLimited { retry_after } => {
                write!(
                    f,
                    "Too many requests. Please wait {} seconds and try again",
                    retry_after_secs(*retry_after)
                )
            }
        }
    }
}

impl std::error::Error for ApiError {}

/// Whole seconds a rate-limited caller should wait, rounded up.
#[must_use]
pub fn retry_after_secs(retry_after: Duration) -> u64 {
    let secs: u64 = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
    secs.max(1)
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Unauthorized {
                action,
                required_role,
            } => Self::Unauthorized {
                action,
                required_role,
            },
            AuthError::Persistence(err) => translate_persistence_error(err),
        }
    }
}

impl From<EvidenceError> for ApiError {
    fn from(err: EvidenceError) -> Self {
        match err {
            EvidenceError::NotAnImage { .. } | EvidenceError::TooLarge { .. } => {
                Self::InvalidInput {
                    field: String::from("slip"),
                    message: err.to_string(),
                }
            }
            EvidenceError::AlreadyExists(_)
            | EvidenceError::Storage(_)
            | EvidenceError::TimedOut(_) => {
                error!(error = %err, "Evidence upload failed");
                Self::UploadFailed {
                    message: format!("Upload failed: {err}"),
                }
            }
        }
    }
}

/// Translates a domain error into an API error.
///
/// Field errors become `InvalidInput`. Errors that can only come from a
/// corrupt stored record are internal.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    let invalid = |field: &str, message: String| ApiError::InvalidInput {
        field: field.to_string(),
        message,
    };

    match err {
        DomainError::InvalidName(msg) => invalid("name", msg),
        DomainError::InvalidBatch(msg) => invalid("batch", msg),
        DomainError::InvalidPhone(msg) => invalid("phone", msg),
        DomainError::InvalidBookingId(msg) => invalid("booking_id", msg),
        DomainError::InvalidRejectionReason(msg) => invalid("reason", msg),
        DomainError::InvalidTableId(_) => invalid("table_id", err.to_string()),
        DomainError::InvalidTableNumber(_) => invalid("table_number", err.to_string()),
        DomainError::InvalidPrice(_) => invalid("price", err.to_string()),
        DomainError::EmptyDetailsPatch => invalid("changes", err.to_string()),
        DomainError::InvalidTableStatus { .. }
        | DomainError::InvalidBookingStatus { .. }
        | DomainError::InvalidTimestamp { .. } => {
            error!(error = %err, "Domain error from stored data");
            ApiError::Internal {
                message: String::from(RETRY_MESSAGE),
            }
        }
    }
}

/// Translates a core error into an API error.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::TableUnavailable { table_number, .. } => ApiError::CapacityUnavailable {
            message: format!(
                "Table {table_number} has already been taken. Please choose another table"
            ),
        },
        CoreError::InvalidTransition { .. } => ApiError::Conflict {
            message: err.to_string(),
        },
        CoreError::TableMismatch { .. } => {
            error!(error = %err, "Booking and table do not match");
            ApiError::Internal {
                message: String::from(RETRY_MESSAGE),
            }
        }
    }
}

/// Translates a persistence error into an API error.
///
/// Infrastructure failures are logged with full detail and surface as a
/// generic retry message.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::TableNotFound(table_id) => ApiError::ResourceNotFound {
            resource_type: String::from("Table"),
            message: format!("Table {table_id} does not exist"),
        },
        PersistenceError::BookingNotFound(booking_id) => ApiError::ResourceNotFound {
            resource_type: String::from("Booking"),
            message: format!("Booking {booking_id} does not exist"),
        },
        PersistenceError::ActiveBookingExists(_) => ApiError::CapacityUnavailable {
            message: String::from(
                "This table has already been taken. Please choose another table",
            ),
        },
        PersistenceError::TableStatusConflict { .. }
        | PersistenceError::BookingStatusConflict { .. } => ApiError::Conflict {
            message: String::from(
                "The booking was changed by someone else. Refresh and try again",
            ),
        },
        PersistenceError::DuplicateOperator(login_name) => ApiError::InvalidInput {
            field: String::from("login_name"),
            message: format!("Operator '{login_name}' already exists"),
        },
        PersistenceError::DatabaseError(_)
        | PersistenceError::DatabaseConnectionFailed(_)
        | PersistenceError::PoolError(_)
        | PersistenceError::MigrationFailed(_)
        | PersistenceError::InitializationError(_)
        | PersistenceError::ForeignKeyEnforcementNotEnabled
        | PersistenceError::CorruptRecord(_)
        | PersistenceError::Other(_) => {
            error!(error = %err, "Persistence failure");
            ApiError::Internal {
                message: String::from(RETRY_MESSAGE),
            }
        }
    }
}
