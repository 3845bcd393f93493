// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication and authorization types and services.

use tablebook_domain::{StaffActor, parse_timestamp};
use tablebook_persistence::{OperatorData, Persistence, PersistenceError, SessionData};
use time::{Duration, OffsetDateTime};
use tracing::{info, warn};

use crate::error::AuthError;

/// Operator roles for authorization.
///
/// Roles apply only to staff operators, never to customers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Admin role: may seed capacity and manage operators, in addition to
    /// everything staff may do.
    Admin,
    /// Staff role: verifies, rejects, edits and removes bookings.
    Staff,
}

impl Role {
    /// Returns the persisted string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Staff => "Staff",
        }
    }

    /// Parses a role name, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not a known role.
    pub fn parse(role: &str) -> Result<Self, AuthError> {
        match role.to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "staff" => Ok(Self::Staff),
            _ => Err(AuthError::AuthenticationFailed {
                reason: format!("Invalid role: {role}"),
            }),
        }
    }
}

/// An authenticated operator with an associated role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The operator's login name.
    pub id: String,
    /// The role assigned to this operator.
    pub role: Role,
}

impl AuthenticatedActor {
    /// Creates a new authenticated actor.
    #[must_use]
    pub const fn new(id: String, role: Role) -> Self {
        Self { id, role }
    }

    /// Converts this actor into the identity stamped on bookings it modifies.
    ///
    /// # Arguments
    ///
    /// * `operator` - The operator data carrying the display name
    #[must_use]
    pub fn to_staff_actor(&self, operator: &OperatorData) -> StaffActor {
        StaffActor::new(self.id.clone(), operator.display_name.clone())
    }
}

/// Authorization service for enforcing role-based access control.
pub struct AuthorizationService;

impl AuthorizationService {
    /// Checks if an actor may seed tables.
    ///
    /// Only Admin actors may seed tables.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor does not have the Admin role.
    pub fn authorize_seed_tables(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require_admin(actor, "seed_tables")
    }

    /// Checks if an actor may create operators.
    ///
    /// Only Admin actors may create operators.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor does not have the Admin role.
    pub fn authorize_create_operator(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require_admin(actor, "create_operator")
    }

    /// Checks if an actor may approve, reject, edit, delete or list bookings.
    ///
    /// # Errors
    ///
    /// Never fails today; every authenticated operator may manage bookings.
    pub const fn authorize_manage_bookings(_actor: &AuthenticatedActor) -> Result<(), AuthError> {
        // Both Admin and Staff may manage bookings
        Ok(())
    }

    fn require_admin(actor: &AuthenticatedActor, action: &str) -> Result<(), AuthError> {
        match actor.role {
            Role::Admin => Ok(()),
            Role::Staff => Err(AuthError::Unauthorized {
                action: action.to_string(),
                required_role: String::from("Admin"),
            }),
        }
    }
}

/// Authentication service for session-based authentication.
pub struct AuthenticationService;

impl AuthenticationService {
    /// Default session expiration duration (30 days).
    const DEFAULT_SESSION_EXPIRATION: Duration = Duration::days(30);

    /// Authenticates an operator and creates a session.
    ///
    /// Unknown login names and wrong passwords fail with the same reason.
    ///
    /// # Arguments
    ///
    /// * `persistence` - The persistence layer
    /// * `login_name` - The operator login name
    /// * `password` - The operator password
    ///
    /// # Returns
    ///
    /// A tuple of (`session_token`, `authenticated_actor`, `operator_data`)
    ///
    /// # Errors
    ///
    /// Returns an error if authentication fails.
    pub fn login(
        persistence: &Persistence,
        login_name: &str,
        password: &str,
    ) -> Result<(String, AuthenticatedActor, OperatorData), AuthError> {
        let invalid_credentials = || AuthError::AuthenticationFailed {
            reason: String::from("Invalid login name or password"),
        };

        let operator: OperatorData = persistence
            .get_operator_by_login(login_name)
            .map_err(AuthError::Persistence)?
            .ok_or_else(invalid_credentials)?;

        let password_matches: bool =
            Persistence::verify_password(password, &operator.password_hash)
                .map_err(AuthError::Persistence)?;
        if !password_matches {
            warn!(login_name = %operator.login_name, "Rejected login with wrong password");
            return Err(invalid_credentials());
        }

        if operator.is_disabled {
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Operator is disabled"),
            });
        }

        let role: Role = Role::parse(&operator.role)?;

        let session_token: String = Self::generate_session_token();
        let expires_at: OffsetDateTime =
            OffsetDateTime::now_utc() + Self::DEFAULT_SESSION_EXPIRATION;

        persistence
            .create_session(&session_token, operator.operator_id, expires_at)
            .map_err(AuthError::Persistence)?;

        persistence
            .update_last_login(operator.operator_id)
            .map_err(AuthError::Persistence)?;

        info!(login_name = %operator.login_name, "Operator logged in");

        let authenticated_actor: AuthenticatedActor =
            AuthenticatedActor::new(operator.login_name.clone(), role);

        Ok((session_token, authenticated_actor, operator))
    }

    /// Validates a session token and returns the authenticated actor.
    ///
    /// # Returns
    ///
    /// A tuple of (`authenticated_actor`, `operator_data`)
    ///
    /// # Errors
    ///
    /// Returns an error if the session is invalid or expired, or the
    /// operator has been disabled.
    pub fn validate_session(
        persistence: &Persistence,
        session_token: &str,
    ) -> Result<(AuthenticatedActor, OperatorData), AuthError> {
        let session: SessionData = persistence
            .get_session_by_token(session_token)
            .map_err(AuthError::Persistence)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("Invalid session token"),
            })?;

        let expires_at: OffsetDateTime =
            parse_timestamp(&session.expires_at).map_err(|e| {
                AuthError::Persistence(PersistenceError::CorruptRecord(format!(
                    "session {} expiration: {e}",
                    session.session_id
                )))
            })?;

        if OffsetDateTime::now_utc() > expires_at {
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Session expired"),
            });
        }

        let operator: OperatorData = persistence
            .get_operator_by_id(session.operator_id)
            .map_err(AuthError::Persistence)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("Operator not found"),
            })?;

        if operator.is_disabled {
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Operator is disabled"),
            });
        }

        let role: Role = Role::parse(&operator.role)?;

        persistence
            .update_session_activity(session.session_id)
            .map_err(AuthError::Persistence)?;

        let authenticated_actor: AuthenticatedActor =
            AuthenticatedActor::new(operator.login_name.clone(), role);

        Ok((authenticated_actor, operator))
    }

    /// Logs out by deleting the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the logout fails.
    pub fn logout(persistence: &Persistence, session_token: &str) -> Result<(), AuthError> {
        persistence
            .delete_session(session_token)
            .map_err(AuthError::Persistence)?;

        Ok(())
    }

    /// Creates the first admin operator if no operator has that login yet.
    ///
    /// Returns `true` if an operator was created.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup or insert fails.
    pub fn bootstrap_admin(
        persistence: &Persistence,
        login_name: &str,
        display_name: &str,
        password: &str,
    ) -> Result<bool, PersistenceError> {
        if persistence.get_operator_by_login(login_name)?.is_some() {
            info!(login_name, "Admin operator already exists");
            return Ok(false);
        }

        persistence.create_operator(login_name, display_name, password, Role::Admin.as_str())?;
        info!(login_name, "Created bootstrap admin operator");
        Ok(true)
    }

    /// Generates an opaque session token.
    fn generate_session_token() -> String {
        format!(
            "session_{}_{:016x}",
            uuid::Uuid::new_v4().simple(),
            rand::random::<u64>()
        )
    }
}
