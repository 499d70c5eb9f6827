// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Signalboard

//! Feedback endpoints: CRUD, upvote toggling and vocabulary metadata.
//!
//! Every route is auth-gated; the policy engine decides per instance.
//! Authors manage their own posts, admins manage everything — which in
//! practice makes status changes an admin capability, since only admins
//! pass an `Update` check on a foreign post.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;

use crate::auth::policy::{self, Action, ResourceKind};
use crate::auth::Auth;
use crate::error::ApiError;
use crate::models::{
    CreateFeedbackRequest, FeedbackQuery, FeedbackResponse, MetaResponse, UpdateFeedbackRequest,
};
use crate::state::AppState;
use crate::storage::repository::{
    FeedbackRepository, Status, StoredFeedback, CATEGORIES, STATUSES,
};

const MAX_TITLE_LEN: usize = 120;

fn validate_title(title: &str) -> Result<String, ApiError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ApiError::bad_request("title must not be empty"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ApiError::bad_request("title is too long"));
    }
    Ok(title.to_string())
}

#[utoipa::path(
    get,
    path = "/v1/feedback",
    params(FeedbackQuery),
    tag = "Feedback",
    responses(
        (status = 200, body = [FeedbackResponse]),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_feedback(
    Auth(actor): Auth,
    State(state): State<AppState>,
    Query(filter): Query<FeedbackQuery>,
) -> Result<Json<Vec<FeedbackResponse>>, ApiError> {
    let posts = FeedbackRepository::new(&state.storage).list_all()?;
    let posts = posts
        .into_iter()
        .filter(|p| filter.category.is_none_or(|c| p.category == c))
        .filter(|p| filter.status.is_none_or(|s| p.status == s))
        .map(|p| FeedbackResponse::for_viewer(p, actor.id))
        .collect();
    Ok(Json(posts))
}

#[utoipa::path(
    get,
    path = "/v1/feedback/{id}",
    params(("id" = i64, Path, description = "Feedback id")),
    tag = "Feedback",
    responses(
        (status = 200, body = FeedbackResponse),
        (status = 404, description = "No such post")
    )
)]
pub async fn get_feedback(
    Auth(actor): Auth,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<FeedbackResponse>, ApiError> {
    let post = FeedbackRepository::new(&state.storage).get(id)?;
    Ok(Json(FeedbackResponse::for_viewer(post, actor.id)))
}

#[utoipa::path(
    post,
    path = "/v1/feedback",
    request_body = CreateFeedbackRequest,
    tag = "Feedback",
    responses(
        (status = 201, body = FeedbackResponse),
        (status = 400, description = "Empty or oversized title")
    )
)]
pub async fn create_feedback(
    Auth(actor): Auth,
    State(state): State<AppState>,
    Json(request): Json<CreateFeedbackRequest>,
) -> Result<(StatusCode, Json<FeedbackResponse>), ApiError> {
    policy::authorize_kind(&actor, Action::Create, ResourceKind::Feedback)?;
    let title = validate_title(&request.title)?;

    let now = Utc::now();
    let post = StoredFeedback {
        id: state.storage.next_feedback_id(),
        title,
        detail: request.detail.trim().to_string(),
        category: request.category,
        status: Status::Suggestion,
        author_id: actor.id,
        upvotes: Vec::new(),
        created_at: now,
        updated_at: now,
    };
    FeedbackRepository::new(&state.storage).create(&post)?;

    tracing::info!(feedback_id = post.id, author_id = actor.id, "created feedback");
    Ok((
        StatusCode::CREATED,
        Json(FeedbackResponse::for_viewer(post, actor.id)),
    ))
}

#[utoipa::path(
    put,
    path = "/v1/feedback/{id}",
    params(("id" = i64, Path, description = "Feedback id")),
    request_body = UpdateFeedbackRequest,
    tag = "Feedback",
    responses(
        (status = 200, body = FeedbackResponse),
        (status = 403, description = "Not the author"),
        (status = 404, description = "No such post")
    )
)]
pub async fn update_feedback(
    Auth(actor): Auth,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateFeedbackRequest>,
) -> Result<Json<FeedbackResponse>, ApiError> {
    let repo = FeedbackRepository::new(&state.storage);
    let mut post = repo.get(id)?;
    policy::authorize(&actor, Action::Update, &post)?;

    if let Some(title) = request.title {
        post.title = validate_title(&title)?;
    }
    if let Some(detail) = request.detail {
        post.detail = detail.trim().to_string();
    }
    if let Some(category) = request.category {
        post.category = category;
    }
    if let Some(status) = request.status {
        post.status = status;
    }
    post.updated_at = Utc::now();

    repo.update(&post)?;
    Ok(Json(FeedbackResponse::for_viewer(post, actor.id)))
}

#[utoipa::path(
    delete,
    path = "/v1/feedback/{id}",
    params(("id" = i64, Path, description = "Feedback id")),
    tag = "Feedback",
    responses(
        (status = 204),
        (status = 403, description = "Not the author"),
        (status = 404, description = "No such post")
    )
)]
pub async fn delete_feedback(
    Auth(actor): Auth,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let repo = FeedbackRepository::new(&state.storage);
    let post = repo.get(id)?;
    policy::authorize(&actor, Action::Delete, &post)?;
    repo.delete(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Toggle the caller's upvote. Voting is open to anyone who can read
/// the post, not only its author.
#[utoipa::path(
    post,
    path = "/v1/feedback/{id}/upvote",
    params(("id" = i64, Path, description = "Feedback id")),
    tag = "Feedback",
    responses(
        (status = 200, body = FeedbackResponse),
        (status = 404, description = "No such post")
    )
)]
pub async fn upvote_feedback(
    Auth(actor): Auth,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<FeedbackResponse>, ApiError> {
    let repo = FeedbackRepository::new(&state.storage);
    let mut post = repo.get(id)?;
    policy::authorize(&actor, Action::Read, &post)?;

    post.toggle_upvote(actor.id);
    post.updated_at = Utc::now();
    repo.update(&post)?;
    Ok(Json(FeedbackResponse::for_viewer(post, actor.id)))
}

#[utoipa::path(
    get,
    path = "/v1/feedback/meta",
    tag = "Feedback",
    responses((status = 200, body = MetaResponse))
)]
pub async fn feedback_meta(Auth(_actor): Auth) -> Json<MetaResponse> {
    Json(MetaResponse {
        categories: CATEGORIES.to_vec(),
        statuses: STATUSES.to_vec(),
    })
}
