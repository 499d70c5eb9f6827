// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Signalboard

//! Repository layer providing typed access to the document store.
//!
//! Each repository provides CRUD operations for a specific entity type,
//! using the storage engine for all file operations.

pub mod feedback;
pub mod sessions;
pub mod users;

pub use feedback::{Category, FeedbackRepository, Status, StoredFeedback, CATEGORIES, STATUSES};
pub use sessions::{SessionRepository, StoredSession};
pub use users::{CredentialProvider, StoredCredential, StoredUser, UserRepository};
