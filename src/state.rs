// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Signalboard

//! Shared application state.

use std::sync::Arc;

use crate::auth::AuthService;
use crate::storage::Storage;

/// State shared across all request handlers.
///
/// `Storage` is internally cheap to clone (shared id counters behind
/// `Arc`), so the whole state clones per request without ceremony.
#[derive(Clone)]
pub struct AppState {
    /// Document storage backing every repository.
    pub storage: Storage,
    /// Session lifecycle and token verification.
    pub auth: Arc<AuthService>,
}

impl AppState {
    pub fn new(storage: Storage, auth: AuthService) -> Self {
        Self {
            storage,
            auth: Arc::new(auth),
        }
    }
}
