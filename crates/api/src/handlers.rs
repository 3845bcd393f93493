// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions for state-changing and read-only operations.

use tablebook::{
    BookingWrite, Command, CoreError, ReserveRequest, Transition, TransitionResult, apply,
    apply_reserve,
};
use tablebook_domain::{
    AvailabilitySummary, Booking, BookingId, BookingListing, BookingStatus, CustomerDetails,
    DashboardStats, EvidenceReference, Price, Table, TableId,
};
use tablebook_persistence::{OperatorData, Persistence, SeedOutcome, SessionData};
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::admission::{Admission, AdmissionControl};
use crate::auth::{AuthenticatedActor, AuthenticationService, AuthorizationService, Role};
use crate::error::{
    ApiError, translate_core_error, translate_domain_error, translate_persistence_error,
};
use crate::evidence::{EvidenceAttachment, EvidenceUpload};
use crate::request_response::{
    BookingActionResponse, BookingInfo, CreateOperatorRequest, CreateOperatorResponse,
    DashboardResponse, EditBookingRequest, ListTablesResponse, LoginRequest, LoginResponse,
    RejectBookingRequest, ReserveBookingRequest, ReserveBookingResponse, SeedTablesRequest,
    SeedTablesResponse, TableInfo, WhoAmIResponse,
};

// ============================================================================
// Customer operations
// ============================================================================

/// Reserves a table for a customer.
///
/// The flow is:
/// 1. Admission control for the caller's identity
/// 2. Field and slip validation (no I/O)
/// 3. Table lookup, failing fast if the table is taken
/// 4. Slip upload, so a failed upload leaves nothing behind
/// 5. Atomic commit of the booking and the table lock
///
/// A concurrent reservation of the same table that commits first makes
/// step 5 fail with `CapacityUnavailable`; nothing is overwritten.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `evidence` - Slip validation and storage
/// * `admission` - The per-identity request throttle
/// * `identity` - The caller's identity (network origin)
/// * `request` - The reservation request
///
/// # Errors
///
/// Returns an error if:
/// - The caller is rate limited
/// - Any field or the slip is invalid
/// - The table does not exist or is not available
/// - The slip cannot be stored
/// - The database operation fails
pub async fn reserve_booking(
    persistence: &Persistence,
    evidence: &EvidenceAttachment,
    admission: &dyn AdmissionControl,
    identity: &str,
    request: ReserveBookingRequest,
) -> Result<ReserveBookingResponse, ApiError> {
    admit_reservation(admission, identity)?;
    reserve_admitted_booking(persistence, evidence, request).await
}

/// Spends one admission token for `identity`.
///
/// Transports that must read a large request body call this before
/// reading it, then call [`reserve_admitted_booking`].
///
/// # Errors
///
/// Returns `RateLimited` if the caller has no token left.
pub fn admit_reservation(admission: &dyn AdmissionControl, identity: &str) -> Result<(), ApiError> {
    if let Admission::Rejected { retry_after } = admission.admit(identity) {
        warn!(identity, ?retry_after, "Reservation rate limited");
        return Err(ApiError::RateLimited { retry_after });
    }
    Ok(())
}

/// Reserves a table for a caller already let through [`admit_reservation`].
///
/// # Errors
///
/// Same as [`reserve_booking`], except that no rate limit is applied.
pub async fn reserve_admitted_booking(
    persistence: &Persistence,
    evidence: &EvidenceAttachment,
    request: ReserveBookingRequest,
) -> Result<ReserveBookingResponse, ApiError> {

    let table_id: TableId = TableId::new(request.table_id).map_err(translate_domain_error)?;
    let details: CustomerDetails =
        CustomerDetails::new(&request.name, &request.batch, &request.phone)
            .map_err(translate_domain_error)?;
    let slip: Option<EvidenceUpload> = evidence.validate(request.slip)?;

    let table: Table = persistence
        .get_table(table_id.value())
        .map_err(translate_persistence_error)?
        .ok_or_else(|| table_not_found(table_id))?;

    if !table.status.is_available() {
        info!(table_id = %table.id, status = %table.status, "Table is not available");
        return Err(translate_core_error(CoreError::TableUnavailable {
            table_number: table.number,
            status: table.status,
        }));
    }

    let stored_slip: Option<EvidenceReference> = match &slip {
        Some(upload) => Some(evidence.store(upload).await?),
        None => None,
    };

    let booking_id: BookingId =
        BookingId::new(uuid::Uuid::new_v4().to_string()).map_err(translate_domain_error)?;

    let transition: Transition = apply_reserve(
        &table,
        ReserveRequest {
            details,
            evidence: stored_slip.clone(),
        },
        booking_id.clone(),
        OffsetDateTime::now_utc(),
    )
    .map_err(translate_core_error)?;

    let status: BookingStatus = BookingStatus::initial(stored_slip.is_some());

    if let Err(err) = persistence.apply_transition(&transition) {
        if err.is_conflict() {
            warn!(
                table_id = %table.id,
                orphaned_slip = stored_slip.as_ref().map(EvidenceReference::url),
                "Lost reservation race"
            );
            return Err(translate_core_error(CoreError::TableUnavailable {
                table_number: table.number,
                status: table.status,
            }));
        }
        return Err(translate_persistence_error(err));
    }

    info!(
        booking_id = %booking_id,
        table_id = %table.id,
        table_number = %table.number,
        status = %status,
        "Reserved table"
    );

    Ok(ReserveBookingResponse {
        booking_id: booking_id.as_str().to_string(),
        table_id: table.id.value(),
        table_number: table.number.value(),
        status: status.as_str().to_string(),
        slip_url: stored_slip.map(|slip| slip.url().to_string()),
        message: format!("Table {} reserved", table.number),
    })
}

/// Lists every table with occupancy counts.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_tables(persistence: &Persistence) -> Result<ListTablesResponse, ApiError> {
    let tables: Vec<Table> = persistence
        .list_tables()
        .map_err(translate_persistence_error)?;

    Ok(ListTablesResponse {
        summary: AvailabilitySummary::from_tables(&tables),
        tables: tables.iter().map(TableInfo::from).collect(),
    })
}

// ============================================================================
// Staff operations
// ============================================================================

/// Approves a booking: the booking becomes PAID and its table BOOKED.
///
/// Approving an already paid booking succeeds without changing anything.
///
/// # Errors
///
/// Returns an error if the booking does not exist, was rejected, or was
/// changed concurrently, or if the database operation fails.
pub fn approve_booking(
    persistence: &Persistence,
    booking_id: &str,
    authenticated_actor: &AuthenticatedActor,
    operator: &OperatorData,
) -> Result<BookingActionResponse, ApiError> {
    run_staff_command(
        persistence,
        booking_id,
        Command::Approve,
        authenticated_actor,
        operator,
    )
}

/// Rejects a booking: the booking becomes REJECTED and its table is
/// released. The record is retained.
///
/// Rejecting an already rejected booking succeeds without changing anything.
///
/// # Errors
///
/// Returns an error if the booking does not exist, is paid, or was changed
/// concurrently, if the reason is too long, or if the database operation
/// fails.
pub fn reject_booking(
    persistence: &Persistence,
    booking_id: &str,
    request: RejectBookingRequest,
    authenticated_actor: &AuthenticatedActor,
    operator: &OperatorData,
) -> Result<BookingActionResponse, ApiError> {
    run_staff_command(
        persistence,
        booking_id,
        Command::Reject {
            reason: request.reason,
        },
        authenticated_actor,
        operator,
    )
}

/// Removes a booking and returns its table to the pool.
///
/// # Errors
///
/// Returns an error if the booking does not exist or was changed
/// concurrently, or if the database operation fails.
pub fn delete_booking(
    persistence: &Persistence,
    booking_id: &str,
    authenticated_actor: &AuthenticatedActor,
    operator: &OperatorData,
) -> Result<BookingActionResponse, ApiError> {
    run_staff_command(
        persistence,
        booking_id,
        Command::Delete,
        authenticated_actor,
        operator,
    )
}

/// Changes the customer details on a booking.
///
/// # Errors
///
/// Returns an error if no field is provided, a field is invalid, the
/// booking does not exist, or the database operation fails.
pub fn edit_booking(
    persistence: &Persistence,
    booking_id: &str,
    request: EditBookingRequest,
    authenticated_actor: &AuthenticatedActor,
    operator: &OperatorData,
) -> Result<BookingActionResponse, ApiError> {
    run_staff_command(
        persistence,
        booking_id,
        Command::EditDetails {
            changes: request.into(),
        },
        authenticated_actor,
        operator,
    )
}

/// Lists every booking, newest first, with dashboard aggregates.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_bookings(
    persistence: &Persistence,
    authenticated_actor: &AuthenticatedActor,
) -> Result<DashboardResponse, ApiError> {
    AuthorizationService::authorize_manage_bookings(authenticated_actor)?;

    let listings: Vec<BookingListing> = persistence
        .list_bookings()
        .map_err(translate_persistence_error)?;

    let bookings: Vec<BookingInfo> = listings
        .iter()
        .map(BookingInfo::try_from)
        .collect::<Result<_, _>>()?;

    Ok(DashboardResponse {
        stats: DashboardStats::from_listings(&listings),
        bookings,
    })
}

/// Loads a booking and its table, runs a command through the state
/// machine, and commits the result.
fn run_staff_command(
    persistence: &Persistence,
    booking_id: &str,
    command: Command,
    authenticated_actor: &AuthenticatedActor,
    operator: &OperatorData,
) -> Result<BookingActionResponse, ApiError> {
    AuthorizationService::authorize_manage_bookings(authenticated_actor)?;

    let booking_id: BookingId = BookingId::new(booking_id).map_err(translate_domain_error)?;
    let command_name: &'static str = command.name();

    let (booking, table): (Booking, Table) = persistence
        .get_booking_with_table(booking_id.as_str())
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::ResourceNotFound {
            resource_type: String::from("Booking"),
            message: format!("Booking {booking_id} does not exist"),
        })?;

    let result: TransitionResult = apply(
        command,
        &booking,
        &table,
        &authenticated_actor.to_staff_actor(operator),
        OffsetDateTime::now_utc(),
    )
    .map_err(translate_core_error)?;

    let transition: Transition = match result {
        TransitionResult::Unchanged => {
            info!(
                booking_id = %booking_id,
                command = command_name,
                status = %booking.status,
                "Booking already in requested state"
            );
            return Ok(BookingActionResponse {
                booking_id: booking_id.as_str().to_string(),
                status: Some(booking.status.as_str().to_string()),
                changed: false,
                message: format!("Booking is already {}", booking.status),
            });
        }
        TransitionResult::Applied(transition) => transition,
    };

    persistence
        .apply_transition(&transition)
        .map_err(translate_persistence_error)?;

    let status: Option<BookingStatus> = match &transition.booking {
        BookingWrite::UpdateStatus { next, .. } => Some(*next),
        BookingWrite::Remove { .. } => None,
        BookingWrite::Insert(_) | BookingWrite::UpdateDetails { .. } => Some(booking.status),
    };

    info!(
        booking_id = %booking_id,
        table_id = %table.id,
        command = command_name,
        actor = %authenticated_actor.id,
        "Applied staff command"
    );

    Ok(BookingActionResponse {
        booking_id: booking_id.as_str().to_string(),
        status: status.map(|s| s.as_str().to_string()),
        changed: true,
        message: status.map_or_else(
            || format!("Booking {booking_id} deleted"),
            |s| format!("Booking {booking_id} is {s}"),
        ),
    })
}

// ============================================================================
// Capacity setup
// ============================================================================

/// Creates tables numbered `1..=count` that do not already exist.
///
/// Running the seed twice produces no duplicates.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin, the price is out of
/// range, or the database operation fails.
pub fn seed_tables(
    persistence: &Persistence,
    request: &SeedTablesRequest,
    default_count: u32,
    default_price: u64,
    authenticated_actor: &AuthenticatedActor,
) -> Result<SeedTablesResponse, ApiError> {
    AuthorizationService::authorize_seed_tables(authenticated_actor)?;

    let count: u32 = request.count.unwrap_or(default_count);
    let amount: u64 = request.price.unwrap_or(default_price);
    let price: Price = i64::try_from(amount)
        .map_err(|_| ApiError::InvalidInput {
            field: String::from("price"),
            message: format!("Price {amount} is too large"),
        })
        .and_then(|amount| Price::new(amount).map_err(translate_domain_error))?;

    let outcome: SeedOutcome = persistence
        .seed_tables(count, price)
        .map_err(translate_persistence_error)?;

    info!(
        count,
        created = outcome.created,
        existing = outcome.existing,
        actor = %authenticated_actor.id,
        "Seeded tables"
    );

    Ok(SeedTablesResponse {
        created: outcome.created,
        existing: outcome.existing,
        message: format!(
            "Created {} tables, {} already existed",
            outcome.created, outcome.existing
        ),
    })
}

// ============================================================================
// Operators & sessions
// ============================================================================

/// Authenticates an operator and creates a session.
///
/// # Errors
///
/// Returns an error if the credentials are invalid or the operator is
/// disabled.
pub fn login(persistence: &Persistence, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
    let (session_token, _authenticated_actor, operator): (
        String,
        AuthenticatedActor,
        OperatorData,
    ) = AuthenticationService::login(persistence, &request.login_name, &request.password)?;

    let session: Option<SessionData> = persistence
        .get_session_by_token(&session_token)
        .map_err(translate_persistence_error)?;

    let expires_at: String = session
        .ok_or_else(|| ApiError::Internal {
            message: String::from("Session not found after creation"),
        })?
        .expires_at;

    Ok(LoginResponse {
        session_token,
        login_name: operator.login_name,
        display_name: operator.display_name,
        role: operator.role,
        expires_at,
    })
}

/// Logs out by deleting the session.
///
/// # Errors
///
/// Returns an error if the logout fails.
pub fn logout(persistence: &Persistence, session_token: &str) -> Result<(), ApiError> {
    AuthenticationService::logout(persistence, session_token)?;
    Ok(())
}

/// Returns the current operator's information.
#[must_use]
pub fn whoami(operator: &OperatorData) -> WhoAmIResponse {
    WhoAmIResponse {
        login_name: operator.login_name.clone(),
        display_name: operator.display_name.clone(),
        role: operator.role.clone(),
        is_disabled: operator.is_disabled,
    }
}

/// Creates a new operator.
///
/// Only Admin actors may create operators.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not authorized (not an Admin)
/// - The login name is blank or already exists
/// - The role is invalid
/// - Database operations fail
pub fn create_operator(
    persistence: &Persistence,
    request: CreateOperatorRequest,
    authenticated_actor: &AuthenticatedActor,
) -> Result<CreateOperatorResponse, ApiError> {
    AuthorizationService::authorize_create_operator(authenticated_actor)?;

    let login_name: &str = request.login_name.trim();
    if login_name.is_empty() {
        return Err(ApiError::InvalidInput {
            field: String::from("login_name"),
            message: String::from("Login name cannot be empty"),
        });
    }

    if request.password.is_empty() {
        return Err(ApiError::InvalidInput {
            field: String::from("password"),
            message: String::from("Password cannot be empty"),
        });
    }

    let role: Role = Role::parse(&request.role).map_err(|_| ApiError::InvalidInput {
        field: String::from("role"),
        message: format!("Invalid role '{}'. Must be 'Admin' or 'Staff'", request.role),
    })?;

    let operator_id: i64 = persistence
        .create_operator(
            login_name,
            request.display_name.trim(),
            &request.password,
            role.as_str(),
        )
        .map_err(translate_persistence_error)?;

    info!(
        operator_id,
        login_name,
        actor = %authenticated_actor.id,
        "Created operator"
    );

    Ok(CreateOperatorResponse {
        operator_id,
        login_name: login_name.to_uppercase(),
        display_name: request.display_name.trim().to_string(),
        role: role.as_str().to_string(),
        message: format!("Created operator {}", login_name.to_uppercase()),
    })
}

fn table_not_found(table_id: TableId) -> ApiError {
    ApiError::ResourceNotFound {
        resource_type: String::from("Table"),
        message: format!("Table {table_id} does not exist"),
    }
}

