// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Signalboard

//! Authentication and authorization errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use super::policy::{Action, ResourceKind};

/// Typed domain errors for the session lifecycle and the policy engine.
///
/// Every variant carries a stable machine-readable code; the HTTP mapping
/// lives here and nowhere else. Credential and refresh-token failures are
/// deliberately coarse: the caller learns *that* authentication failed,
/// never *why*.
#[derive(Debug)]
pub enum AuthError {
    /// No authorization header or access-token cookie present
    MissingCredentials,
    /// Authorization header present but not `Bearer <token>`
    InvalidAuthHeader,
    /// Access token failed validation (malformed, tampered, or expired)
    InvalidAccessToken,
    /// Bad email/password pair, or the account has no local password.
    /// Identical for "no such user" and "wrong password".
    InvalidCredentials,
    /// Refresh token failed validation; collapses every reason into one
    InvalidRefreshToken,
    /// Referenced identity no longer exists (e.g. deleted after issuance)
    UserNotFound,
    /// Registration collision on email or username
    UserAlreadyExists,
    /// Email failed format validation
    InvalidEmail,
    /// Username failed format validation
    InvalidUsername,
    /// Policy evaluation rejected the (actor, action, resource) triple
    PermissionDenied {
        action: Action,
        subject: ResourceKind,
    },
    /// Internal error (storage failure, signing failure, corrupt hash)
    Internal(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Get the stable error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingCredentials => "missing_credentials",
            AuthError::InvalidAuthHeader => "invalid_auth_header",
            AuthError::InvalidAccessToken => "invalid_access_token",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::InvalidRefreshToken => "invalid_refresh_token",
            AuthError::UserNotFound => "user_not_found",
            AuthError::UserAlreadyExists => "user_already_exists",
            AuthError::InvalidEmail => "invalid_email",
            AuthError::InvalidUsername => "invalid_username",
            AuthError::PermissionDenied { .. } => "permission_denied",
            AuthError::Internal(_) => "internal_error",
        }
    }

    /// Get the HTTP status code for this error.
    ///
    /// `UserNotFound` maps to 401, not 404: a refresh caller must not be
    /// able to probe which accounts still exist.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingCredentials
            | AuthError::InvalidAuthHeader
            | AuthError::InvalidAccessToken
            | AuthError::InvalidCredentials
            | AuthError::InvalidRefreshToken
            | AuthError::UserNotFound => StatusCode::UNAUTHORIZED,
            AuthError::UserAlreadyExists => StatusCode::CONFLICT,
            AuthError::InvalidEmail | AuthError::InvalidUsername => StatusCode::BAD_REQUEST,
            AuthError::PermissionDenied { .. } => StatusCode::FORBIDDEN,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingCredentials => write!(f, "Authentication is required"),
            AuthError::InvalidAuthHeader => {
                write!(f, "Invalid authorization header format (expected 'Bearer <token>')")
            }
            AuthError::InvalidAccessToken => write!(f, "Access token is invalid or expired"),
            AuthError::InvalidCredentials => write!(f, "Invalid email or password"),
            AuthError::InvalidRefreshToken => write!(f, "Refresh token is invalid or expired"),
            AuthError::UserNotFound => write!(f, "User account is no longer available"),
            AuthError::UserAlreadyExists => write!(f, "An account with this email already exists"),
            AuthError::InvalidEmail => write!(f, "Email address is not valid"),
            AuthError::InvalidUsername => {
                write!(f, "Username must be at least 3 characters long")
            }
            AuthError::PermissionDenied { action, subject } => {
                write!(f, "Not allowed to {action} on {subject}")
            }
            AuthError::Internal(msg) => write!(f, "Internal authentication error: {msg}"),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<crate::storage::StorageError> for AuthError {
    fn from(err: crate::storage::StorageError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // Internal details go to the log, not to the client.
        let message = match &self {
            AuthError::Internal(msg) => {
                tracing::error!("auth internal error: {msg}");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        let body = Json(AuthErrorBody {
            error: message,
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}
