// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Signalboard

//! # API Data Models
//!
//! Request and response structures for the REST API. All types derive
//! `Serialize`/`Deserialize` and `ToSchema` for automatic JSON handling
//! and OpenAPI documentation; wire field names are camelCase.
//!
//! Stored documents never cross the boundary directly: responses are
//! projections (a [`UserResponse`] carries no credentials, a
//! [`FeedbackResponse`] collapses the upvoter list to a count plus the
//! viewer's own flag).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{Role, TokenPair};
use crate::storage::repository::{Category, Status, StoredFeedback, StoredUser};

// =============================================================================
// Auth Models
// =============================================================================

/// Request to register a new local account.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Unique handle, at least 3 characters.
    pub username: String,
    /// Login email; stored lowercase.
    pub email: String,
    /// Display name.
    pub full_name: String,
    pub password: String,
}

/// Request to exchange credentials for a token pair.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Refresh/logout body. The token may instead arrive in the
/// `refreshToken` cookie; the body wins when both are present.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

/// An issued access/refresh token pair.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
}

impl From<TokenPair> for TokenPairResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
        }
    }
}

// =============================================================================
// User Models
// =============================================================================

/// Public view of a user account.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<StoredUser> for UserResponse {
    fn from(user: StoredUser) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            role: user.role,
            avatar_url: user.avatar_url,
            created_at: user.created_at,
        }
    }
}

/// Request to update a user profile. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}

// =============================================================================
// Feedback Models
// =============================================================================

/// Request to create a feedback post. New posts always start as
/// suggestions.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateFeedbackRequest {
    pub title: String,
    pub detail: String,
    pub category: Category,
}

/// Request to update a feedback post. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateFeedbackRequest {
    pub title: Option<String>,
    pub detail: Option<String>,
    pub category: Option<Category>,
    pub status: Option<Status>,
}

/// Optional list filters for `GET /v1/feedback`.
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
pub struct FeedbackQuery {
    pub category: Option<Category>,
    pub status: Option<Status>,
}

/// Public view of a feedback post, projected for one viewer.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackResponse {
    pub id: i64,
    pub title: String,
    pub detail: String,
    pub category: Category,
    pub status: Status,
    pub author_id: i64,
    /// Number of distinct upvoters.
    pub upvotes: usize,
    /// Whether the requesting user is among them.
    pub upvoted_by_me: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FeedbackResponse {
    /// Project a stored post for the given viewer.
    pub fn for_viewer(post: StoredFeedback, viewer_id: i64) -> Self {
        let upvoted_by_me = post.upvotes.contains(&viewer_id);
        Self {
            id: post.id,
            title: post.title,
            detail: post.detail,
            category: post.category,
            status: post.status,
            author_id: post.author_id,
            upvotes: post.upvotes.len(),
            upvoted_by_me,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

/// Category and status vocabularies, for client-side pickers.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MetaResponse {
    pub categories: Vec<Category>,
    pub statuses: Vec<Status>,
}

// =============================================================================
// Roadmap Models
// =============================================================================

/// One roadmap column: every post in a status, newest first.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RoadmapColumn {
    pub status: Status,
    pub count: usize,
    pub items: Vec<FeedbackResponse>,
}

/// The roadmap view: planned, in-progress and live columns. Suggestions
/// are not on the roadmap.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapResponse {
    pub planned: RoadmapColumn,
    pub in_progress: RoadmapColumn,
    pub live: RoadmapColumn,
}

// =============================================================================
// Health Models
// =============================================================================

/// Service health report.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HealthResponse {
    /// `"ok"` when the storage probe succeeds.
    pub status: &'static str,
}
