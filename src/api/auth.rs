// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Signalboard

//! Session endpoints: register, login, refresh, logout, rules.
//!
//! Token pairs travel both ways: in the JSON body for API clients and
//! as `HttpOnly` cookies for browsers. Cookie attributes are fixed
//! (`Path=/; HttpOnly; SameSite=Lax`) with `Secure` appended when
//! configured; `Max-Age` tracks each token class's TTL so the cookie
//! and the JWT expire together.

use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap, HeaderName, StatusCode},
    response::AppendHeaders,
    Json,
};

use crate::auth::extractor::{cookie_value, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};
use crate::auth::policy::{rules_for, Rule};
use crate::auth::{Auth, AuthError, TokenPair};
use crate::error::ApiError;
use crate::models::{
    LoginRequest, RefreshRequest, RegisterRequest, TokenPairResponse, UserResponse,
};
use crate::state::AppState;

type CookiePair = AppendHeaders<[(HeaderName, String); 2]>;

/// Both session cookies for an issued pair.
fn session_cookies(state: &AppState, pair: &TokenPair) -> CookiePair {
    let config = state.auth.tokens().config();
    AppendHeaders([
        (
            SET_COOKIE,
            cookie(
                ACCESS_TOKEN_COOKIE,
                &pair.access_token,
                config.access_ttl_secs,
                config.cookie_secure,
            ),
        ),
        (
            SET_COOKIE,
            cookie(
                REFRESH_TOKEN_COOKIE,
                &pair.refresh_token,
                config.refresh_ttl_secs,
                config.cookie_secure,
            ),
        ),
    ])
}

/// Both session cookies expired, for logout.
fn cleared_cookies(state: &AppState) -> CookiePair {
    let secure = state.auth.tokens().config().cookie_secure;
    AppendHeaders([
        (SET_COOKIE, cookie(ACCESS_TOKEN_COOKIE, "", 0, secure)),
        (SET_COOKIE, cookie(REFRESH_TOKEN_COOKIE, "", 0, secure)),
    ])
}

fn cookie(name: &str, value: &str, max_age: i64, secure: bool) -> String {
    let secure = if secure { "; Secure" } else { "" };
    format!("{name}={value}; Path=/; Max-Age={max_age}; HttpOnly; SameSite=Lax{secure}")
}

/// The refresh token from the request body, falling back to the cookie.
fn presented_refresh_token(
    headers: &HeaderMap,
    body: Option<&RefreshRequest>,
) -> Option<String> {
    body.and_then(|b| b.refresh_token.clone())
        .or_else(|| cookie_value(headers, REFRESH_TOKEN_COOKIE))
}

#[utoipa::path(
    post,
    path = "/v1/auth/register",
    request_body = RegisterRequest,
    tag = "Auth",
    responses(
        (status = 201, body = UserResponse),
        (status = 400, description = "Malformed email or username"),
        (status = 409, description = "Email or username already taken")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let user = state.auth.register(
        &request.username,
        &request.email,
        &request.full_name,
        &request.password,
    )?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[utoipa::path(
    post,
    path = "/v1/auth/login",
    request_body = LoginRequest,
    tag = "Auth",
    responses(
        (status = 200, body = TokenPairResponse),
        (status = 401, description = "Unknown email or wrong password")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<(CookiePair, Json<TokenPairResponse>), ApiError> {
    let pair = state.auth.login(&request.email, &request.password)?;
    Ok((session_cookies(&state, &pair), Json(pair.into())))
}

#[utoipa::path(
    post,
    path = "/v1/auth/refresh",
    request_body = RefreshRequest,
    tag = "Auth",
    responses(
        (status = 200, body = TokenPairResponse),
        (status = 401, description = "Missing, invalid or expired refresh token")
    )
)]
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<RefreshRequest>>,
) -> Result<(CookiePair, Json<TokenPairResponse>), ApiError> {
    let token = presented_refresh_token(&headers, body.as_ref().map(|Json(b)| b))
        .ok_or(AuthError::MissingCredentials)?;
    let pair = state.auth.refresh(&token)?;
    Ok((session_cookies(&state, &pair), Json(pair.into())))
}

/// Logout never fails: an unknown or already-consumed token clears the
/// cookies all the same.
#[utoipa::path(
    post,
    path = "/v1/auth/logout",
    request_body = RefreshRequest,
    tag = "Auth",
    responses((status = 204, description = "Session revoked, cookies cleared"))
)]
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<RefreshRequest>>,
) -> Result<(StatusCode, CookiePair), ApiError> {
    if let Some(token) = presented_refresh_token(&headers, body.as_ref().map(|Json(b)| b)) {
        state.auth.logout(&token)?;
    }
    Ok((StatusCode::NO_CONTENT, cleared_cookies(&state)))
}

/// The caller's effective authorization rules, for client-side UI hints.
/// The server re-checks every action regardless.
#[utoipa::path(
    get,
    path = "/v1/auth/rules",
    tag = "Auth",
    responses(
        (status = 200, body = [Rule]),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn rules(Auth(user): Auth) -> Json<Vec<Rule>> {
    Json(rules_for(&user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::state::test_support::test_state;

    fn register_request() -> RegisterRequest {
        RegisterRequest {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            full_name: "Alice Doe".to_string(),
            password: "Secret123".to_string(),
        }
    }

    async fn login_pair(state: &AppState) -> TokenPairResponse {
        register(State(state.clone()), Json(register_request()))
            .await
            .unwrap();
        let (_, Json(pair)) = login(
            State(state.clone()),
            Json(LoginRequest {
                email: "alice@example.com".to_string(),
                password: "Secret123".to_string(),
            }),
        )
        .await
        .unwrap();
        pair
    }

    #[tokio::test]
    async fn register_returns_201_without_secrets() {
        let (_dir, state) = test_state();
        let (status, Json(user)) = register(State(state), Json(register_request()))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(user.username, "alice");
        assert_eq!(user.role, Role::User);
    }

    #[tokio::test]
    async fn login_sets_both_session_cookies() {
        let (_dir, state) = test_state();
        register(State(state.clone()), Json(register_request()))
            .await
            .unwrap();

        let (cookies, Json(pair)) = login(
            State(state),
            Json(LoginRequest {
                email: "alice@example.com".to_string(),
                password: "Secret123".to_string(),
            }),
        )
        .await
        .unwrap();

        let AppendHeaders([(_, access), (_, refresh)]) = cookies;
        assert!(access.starts_with(&format!("accessToken={}", pair.access_token)));
        assert!(refresh.starts_with(&format!("refreshToken={}", pair.refresh_token)));
        for cookie in [&access, &refresh] {
            assert!(cookie.contains("HttpOnly"));
            assert!(cookie.contains("SameSite=Lax"));
            assert!(cookie.contains("Path=/"));
            // Secure is off in the test config.
            assert!(!cookie.contains("Secure"));
        }
        assert!(access.contains("Max-Age=900"));
        assert!(refresh.contains("Max-Age=604800"));
    }

    #[tokio::test]
    async fn refresh_accepts_token_from_body() {
        let (_dir, state) = test_state();
        let pair = login_pair(&state).await;

        let (_, Json(rotated)) = refresh(
            State(state),
            HeaderMap::new(),
            Some(Json(RefreshRequest {
                refresh_token: Some(pair.refresh_token.clone()),
            })),
        )
        .await
        .unwrap();
        assert_ne!(rotated.access_token, pair.access_token);
    }

    #[tokio::test]
    async fn refresh_accepts_token_from_cookie() {
        let (_dir, state) = test_state();
        let pair = login_pair(&state).await;

        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::COOKIE,
            format!("refreshToken={}", pair.refresh_token).parse().unwrap(),
        );
        let result = refresh(State(state), headers, None).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn refresh_without_any_token_is_401() {
        let (_dir, state) = test_state();
        let err = refresh(State(state), HeaderMap::new(), None)
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn logout_clears_cookies_even_for_unknown_tokens() {
        let (_dir, state) = test_state();
        let (status, cookies) = logout(
            State(state),
            HeaderMap::new(),
            Some(Json(RefreshRequest {
                refresh_token: Some("never-issued".to_string()),
            })),
        )
        .await
        .unwrap();

        assert_eq!(status, StatusCode::NO_CONTENT);
        let AppendHeaders([(_, access), (_, refresh)]) = cookies;
        assert!(access.starts_with("accessToken=;"));
        assert!(refresh.starts_with("refreshToken=;"));
        assert!(access.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn refresh_does_not_require_a_live_session_row() {
        let (_dir, state) = test_state();
        let pair = login_pair(&state).await;

        logout(
            State(state.clone()),
            HeaderMap::new(),
            Some(Json(RefreshRequest {
                refresh_token: Some(pair.refresh_token.clone()),
            })),
        )
        .await
        .unwrap();

        // Refresh validates the token itself; session rows are
        // bookkeeping for bulk revocation, not a gate.
        let result = refresh(
            State(state),
            HeaderMap::new(),
            Some(Json(RefreshRequest {
                refresh_token: Some(pair.refresh_token),
            })),
        )
        .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn rules_reflect_the_actor_role() {
        let (_dir, state) = test_state();
        login_pair(&state).await;
        let user = crate::auth::AuthenticatedUser {
            id: 1,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            role: Role::User,
        };
        let Json(user_rules) = rules(Auth(user.clone())).await;
        assert!(user_rules.len() > 1);

        let admin = crate::auth::AuthenticatedUser {
            role: Role::Admin,
            ..user
        };
        let Json(admin_rules) = rules(Auth(admin)).await;
        assert_eq!(admin_rules.len(), 1);
    }
}
