// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Signalboard

//! Signalboard - Feedback Board Backend
//!
//! This crate provides the HTTP backend of a product feedback board:
//! JWT-based sessions with refresh rotation, attribute-based access
//! control, and feedback/roadmap CRUD over a JSON document store.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Session lifecycle, tokens and the policy engine
//! - `storage` - JSON document storage and repositories
//! - `config` - Environment-sourced startup configuration

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod storage;
