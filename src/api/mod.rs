// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Signalboard

use axum::{
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::policy::{Action, ResourceKind, Rule, RuleConditions},
    auth::Role,
    models::{
        CreateFeedbackRequest, FeedbackResponse, HealthResponse, LoginRequest, MetaResponse,
        RefreshRequest, RegisterRequest, RoadmapColumn, RoadmapResponse, TokenPairResponse,
        UpdateFeedbackRequest, UpdateUserRequest, UserResponse,
    },
    state::AppState,
    storage::repository::{Category, Status},
};

pub mod auth;
pub mod feedback;
pub mod health;
pub mod roadmap;
pub mod users;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/rules", get(auth::rules))
        .route("/users/me", get(users::me))
        .route("/users", get(users::list_users))
        .route(
            "/users/{id}",
            put(users::update_user).delete(users::delete_user),
        )
        .route(
            "/feedback",
            get(feedback::list_feedback).post(feedback::create_feedback),
        )
        .route("/feedback/meta", get(feedback::feedback_meta))
        .route(
            "/feedback/{id}",
            get(feedback::get_feedback)
                .put(feedback::update_feedback)
                .delete(feedback::delete_feedback),
        )
        .route("/feedback/{id}/upvote", post(feedback::upvote_feedback))
        .route("/roadmap", get(roadmap::roadmap));

    Router::new()
        .nest("/v1", v1_routes)
        .route("/health", get(health::health))
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register,
        auth::login,
        auth::refresh,
        auth::logout,
        auth::rules,
        users::me,
        users::list_users,
        users::update_user,
        users::delete_user,
        feedback::list_feedback,
        feedback::get_feedback,
        feedback::create_feedback,
        feedback::update_feedback,
        feedback::delete_feedback,
        feedback::upvote_feedback,
        feedback::feedback_meta,
        roadmap::roadmap,
        health::health
    ),
    components(
        schemas(
            RegisterRequest,
            LoginRequest,
            RefreshRequest,
            TokenPairResponse,
            UserResponse,
            UpdateUserRequest,
            CreateFeedbackRequest,
            UpdateFeedbackRequest,
            FeedbackResponse,
            MetaResponse,
            RoadmapColumn,
            RoadmapResponse,
            HealthResponse,
            Role,
            Category,
            Status,
            Rule,
            RuleConditions,
            Action,
            ResourceKind
        )
    ),
    tags(
        (name = "Auth", description = "Session lifecycle and authorization rules"),
        (name = "Users", description = "User accounts"),
        (name = "Feedback", description = "Feedback posts and voting"),
        (name = "Roadmap", description = "Status-grouped roadmap view"),
        (name = "Health", description = "Service health")
    )
)]
struct ApiDoc;
