// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Signalboard

//! Roadmap view: feedback grouped into planned, in-progress and live
//! columns. Suggestions stay off the roadmap until promoted.

use axum::{extract::State, Json};

use crate::auth::Auth;
use crate::error::ApiError;
use crate::models::{FeedbackResponse, RoadmapColumn, RoadmapResponse};
use crate::state::AppState;
use crate::storage::repository::{FeedbackRepository, Status, StoredFeedback};

fn column(posts: &[StoredFeedback], status: Status, viewer_id: i64) -> RoadmapColumn {
    let items: Vec<FeedbackResponse> = posts
        .iter()
        .filter(|p| p.status == status)
        .cloned()
        .map(|p| FeedbackResponse::for_viewer(p, viewer_id))
        .collect();
    RoadmapColumn {
        status,
        count: items.len(),
        items,
    }
}

#[utoipa::path(
    get,
    path = "/v1/roadmap",
    tag = "Roadmap",
    responses(
        (status = 200, body = RoadmapResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn roadmap(
    Auth(actor): Auth,
    State(state): State<AppState>,
) -> Result<Json<RoadmapResponse>, ApiError> {
    let posts = FeedbackRepository::new(&state.storage).list_all()?;
    Ok(Json(RoadmapResponse {
        planned: column(&posts, Status::Planned, actor.id),
        in_progress: column(&posts, Status::InProgress, actor.id),
        live: column(&posts, Status::Live, actor.id),
    }))
}
