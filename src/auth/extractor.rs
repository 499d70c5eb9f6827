// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Signalboard

//! Axum extractors for authenticated requests.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user is AuthenticatedUser
//! }
//! ```
//!
//! The credential is taken from the `Authorization: Bearer` header when
//! present, falling back to the `accessToken` cookie the login endpoint
//! sets for browser clients.

use axum::{
    extract::FromRequestParts,
    http::{
        header::{AUTHORIZATION, COOKIE},
        request::Parts,
        HeaderMap,
    },
};

use super::roles::Role;
use super::AuthError;
use crate::storage::repository::UserRepository;
use crate::state::AppState;

/// Cookie carrying the access token for browser clients.
pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";
/// Cookie carrying the refresh token for browser clients.
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

/// The identity attached to a request after token verification.
///
/// Profile fields come from the user store, not the token, so a rename
/// or role change takes effect on the next request rather than at the
/// next token refresh.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.role.has_privilege(Role::Admin)
    }
}

/// Extractor that requires a valid access token.
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?
            .map(str::to_owned)
            .or_else(|| cookie_value(&parts.headers, ACCESS_TOKEN_COOKIE))
            .ok_or(AuthError::MissingCredentials)?;

        let claims = state.auth.tokens().verify_access(&token)?;

        // The token may outlive the account it was minted for.
        let user = UserRepository::new(&state.storage)
            .find_by_id(claims.sub)?
            .ok_or(AuthError::UserNotFound)?;

        Ok(Auth(AuthenticatedUser {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
        }))
    }
}

/// Extractor that additionally requires the admin role.
pub struct AdminOnly(pub AuthenticatedUser);

impl FromRequestParts<AppState> for AdminOnly {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Auth(user) = Auth::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(AuthError::PermissionDenied {
                action: super::policy::Action::Manage,
                subject: super::policy::ResourceKind::All,
            });
        }
        Ok(AdminOnly(user))
    }
}

/// The bearer token from the Authorization header, if any.
///
/// A present but malformed header is an error rather than a silent
/// fallback to the cookie.
fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, AuthError> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value.to_str().map_err(|_| AuthError::InvalidAuthHeader)?;
    value
        .strip_prefix("Bearer ")
        .map(Some)
        .ok_or(AuthError::InvalidAuthHeader)
}

/// Look up one cookie by name across all `Cookie` headers.
pub(crate) fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| {
            let (key, val) = pair.trim().split_once('=')?;
            (key == name).then(|| val.to_string())
        })
        .next()
}
