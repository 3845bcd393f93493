// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Session extraction for staff endpoints.
//!
//! Every staff operation requires `Authorization: Bearer <token>` naming a
//! live session. Customers never authenticate.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use tablebook_api::{ApiError, AuthError, AuthenticatedActor, AuthenticationService};
use tablebook_persistence::OperatorData;
use tracing::{debug, warn};

use crate::{AppState, HttpError};

/// Extractor for authenticated operators.
///
/// # Usage
///
/// ```ignore
/// async fn my_handler(
///     SessionOperator(actor, operator): SessionOperator,
/// ) -> Result<Json<Response>, HttpError> {
///     // actor: AuthenticatedActor
///     // operator: OperatorData
///     Ok(Json(Response { ... }))
/// }
/// ```
///
/// # Errors
///
/// Rejects with HTTP 401 if the header is missing or malformed, or the
/// session is unknown, expired, or belongs to a disabled operator.
pub struct SessionOperator(pub AuthenticatedActor, pub OperatorData);

impl FromRequestParts<AppState> for SessionOperator {
    type Rejection = SessionError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token: &str = bearer_token(&parts.headers)?;

        let (actor, operator) = AuthenticationService::validate_session(&state.persistence, token)
            .map_err(|e| match e {
                AuthError::Persistence(_) => SessionError::Unavailable(ApiError::from(e)),
                other => {
                    warn!(error = %other, "Session validation failed");
                    SessionError::InvalidSession(other.to_string())
                }
            })?;

        debug!(
            login_name = %operator.login_name,
            role = ?actor.role,
            "Session validated"
        );

        Ok(Self(actor, operator))
    }
}

/// Returns the bearer token carried by the `Authorization` header.
///
/// # Errors
///
/// Returns an error if the header is missing or not a bearer token.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, SessionError> {
    let auth_header: &str = headers
        .get("Authorization")
        .ok_or_else(|| {
            debug!("Missing Authorization header");
            SessionError::MissingAuthorizationHeader
        })?
        .to_str()
        .map_err(|_| {
            warn!("Invalid Authorization header encoding");
            SessionError::InvalidAuthorizationHeader
        })?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            warn!("Authorization header is not a bearer token");
            SessionError::InvalidAuthorizationHeader
        })
}

/// Session extraction errors.
#[derive(Debug)]
pub enum SessionError {
    /// Authorization header is missing.
    MissingAuthorizationHeader,
    /// Authorization header format is invalid.
    InvalidAuthorizationHeader,
    /// Session validation failed.
    InvalidSession(String),
    /// The session could not be checked.
    Unavailable(ApiError),
}

impl From<SessionError> for HttpError {
    fn from(err: SessionError) -> Self {
        let message: String = match err {
            SessionError::Unavailable(api_err) => return Self::from(api_err),
            SessionError::MissingAuthorizationHeader => String::from("Missing Authorization header"),
            SessionError::InvalidAuthorizationHeader => {
                String::from("Invalid Authorization header format. Expected: 'Bearer <token>'")
            }
            SessionError::InvalidSession(reason) => format!("Session validation failed: {reason}"),
        };

        Self::new(StatusCode::UNAUTHORIZED, message)
    }
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        HttpError::from(self).into_response()
    }
}
