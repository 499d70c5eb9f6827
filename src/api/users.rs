// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Signalboard

//! User endpoints: own profile, admin listing, profile updates and
//! account deletion.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::auth::policy::{self, Action};
use crate::auth::{AdminOnly, Auth, AuthError};
use crate::error::ApiError;
use crate::models::{UpdateUserRequest, UserResponse};
use crate::state::AppState;
use crate::storage::repository::UserRepository;

#[utoipa::path(
    get,
    path = "/v1/users/me",
    tag = "Users",
    responses(
        (status = 200, body = UserResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(
    Auth(actor): Auth,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = UserRepository::new(&state.storage).get(actor.id)?;
    Ok(Json(user.into()))
}

#[utoipa::path(
    get,
    path = "/v1/users",
    tag = "Users",
    responses(
        (status = 200, body = [UserResponse]),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn list_users(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = UserRepository::new(&state.storage).list_all()?;
    Ok(Json(users.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    put,
    path = "/v1/users/{id}",
    params(("id" = i64, Path, description = "User id")),
    request_body = UpdateUserRequest,
    tag = "Users",
    responses(
        (status = 200, body = UserResponse),
        (status = 403, description = "Not the account owner"),
        (status = 404, description = "No such user"),
        (status = 409, description = "Username already taken")
    )
)]
pub async fn update_user(
    Auth(actor): Auth,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let users = UserRepository::new(&state.storage);
    let mut user = users.get(id)?;
    policy::authorize(&actor, Action::Update, &user)?;

    if let Some(username) = request.username {
        let username = username.trim().to_string();
        if username.chars().count() < 3 {
            return Err(AuthError::InvalidUsername.into());
        }
        // A rename must not collide with another account's handle.
        if let Some(existing) = users.find_by_username(&username)? {
            if existing.id != user.id {
                return Err(AuthError::UserAlreadyExists.into());
            }
        }
        user.username = username;
    }
    if let Some(full_name) = request.full_name {
        user.full_name = full_name.trim().to_string();
    }
    if let Some(avatar_url) = request.avatar_url {
        user.avatar_url = Some(avatar_url);
    }

    users.update(&user)?;
    Ok(Json(user.into()))
}

/// Deleting an account also revokes every refresh session it owns, so
/// outstanding refresh tokens die with it.
#[utoipa::path(
    delete,
    path = "/v1/users/{id}",
    params(("id" = i64, Path, description = "User id")),
    tag = "Users",
    responses(
        (status = 204),
        (status = 403, description = "Not the account owner"),
        (status = 404, description = "No such user")
    )
)]
pub async fn delete_user(
    Auth(actor): Auth,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let users = UserRepository::new(&state.storage);
    let user = users.get(id)?;
    policy::authorize(&actor, Action::Delete, &user)?;

    users.delete(id)?;
    state.auth.logout_everywhere(id)?;
    Ok(StatusCode::NO_CONTENT)
}
