// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Signalboard

//! Feedback repository.
//!
//! Feedback posts move through the roadmap by status: a fresh post is a
//! `suggestion`; admins promote it to `planned`, `in-progress`, and
//! finally `live`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::policy::{Resource, ResourceKind};

use super::super::{Storage, StorageError, StorageResult};

/// Feedback category chosen by the author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Feature,
    Enhancement,
    Bug,
    Ui,
    Ux,
}

/// All categories, in display order (metadata endpoint).
pub const CATEGORIES: [Category; 5] = [
    Category::Feature,
    Category::Enhancement,
    Category::Bug,
    Category::Ui,
    Category::Ux,
];

/// Roadmap status of a feedback post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Suggestion,
    Planned,
    InProgress,
    Live,
}

/// All statuses, in roadmap order (metadata endpoint).
pub const STATUSES: [Status; 4] = [
    Status::Suggestion,
    Status::Planned,
    Status::InProgress,
    Status::Live,
];

/// Feedback post stored as a JSON document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct StoredFeedback {
    /// Numeric feedback id
    pub id: i64,
    /// Short title
    pub title: String,
    /// Longer description
    pub detail: String,
    /// Author-chosen category
    pub category: Category,
    /// Roadmap status
    pub status: Status,
    /// Authoring user id
    pub author_id: i64,
    /// Ids of users who upvoted this post
    pub upvotes: Vec<i64>,
    /// When the post was created
    pub created_at: DateTime<Utc>,
    /// When the post was last modified
    pub updated_at: DateTime<Utc>,
}

impl StoredFeedback {
    /// Toggle a user's upvote. Returns `true` when the vote is now set.
    pub fn toggle_upvote(&mut self, user_id: i64) -> bool {
        if let Some(pos) = self.upvotes.iter().position(|&id| id == user_id) {
            self.upvotes.remove(pos);
            false
        } else {
            self.upvotes.push(user_id);
            true
        }
    }
}

impl Resource for StoredFeedback {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Feedback
    }
    fn resource_id(&self) -> i64 {
        self.id
    }
    fn owner_id(&self) -> i64 {
        self.author_id
    }
}

/// Repository for feedback documents.
pub struct FeedbackRepository<'a> {
    storage: &'a Storage,
}

impl<'a> FeedbackRepository<'a> {
    /// Create a new FeedbackRepository.
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Check if a feedback post exists.
    pub fn exists(&self, feedback_id: i64) -> bool {
        self.storage
            .exists(self.storage.paths().feedback(feedback_id))
    }

    /// Get a feedback post by id.
    pub fn get(&self, feedback_id: i64) -> StorageResult<StoredFeedback> {
        let path = self.storage.paths().feedback(feedback_id);
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!("Feedback {feedback_id}")));
        }
        self.storage.read_json(path)
    }

    /// Create a new feedback post.
    pub fn create(&self, feedback: &StoredFeedback) -> StorageResult<()> {
        let feedback_id = feedback.id;
        if self.exists(feedback_id) {
            return Err(StorageError::AlreadyExists(format!(
                "Feedback {feedback_id}"
            )));
        }
        self.storage
            .write_json(self.storage.paths().feedback(feedback_id), feedback)
    }

    /// Update an existing feedback post.
    pub fn update(&self, feedback: &StoredFeedback) -> StorageResult<()> {
        let feedback_id = feedback.id;
        if !self.exists(feedback_id) {
            return Err(StorageError::NotFound(format!("Feedback {feedback_id}")));
        }
        self.storage
            .write_json(self.storage.paths().feedback(feedback_id), feedback)
    }

    /// Delete a feedback post.
    pub fn delete(&self, feedback_id: i64) -> StorageResult<()> {
        if !self.exists(feedback_id) {
            return Err(StorageError::NotFound(format!("Feedback {feedback_id}")));
        }
        self.storage
            .delete(self.storage.paths().feedback(feedback_id))
    }

    /// List all feedback posts, newest first.
    pub fn list_all(&self) -> StorageResult<Vec<StoredFeedback>> {
        let ids = self
            .storage
            .list_documents(self.storage.paths().feedback_dir())?;

        let mut posts = Vec::new();
        for id in ids {
            if let Ok(parsed) = id.parse::<i64>() {
                if let Ok(post) = self.get(parsed) {
                    posts.push(post);
                }
            }
        }
        posts.sort_by_key(|p| std::cmp::Reverse(p.id));
        Ok(posts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StoragePaths;
    use tempfile::TempDir;

    fn sample_feedback(id: i64, author_id: i64) -> StoredFeedback {
        StoredFeedback {
            id,
            title: "Dark mode".to_string(),
            detail: "Please add a dark theme".to_string(),
            category: Category::Feature,
            status: Status::Suggestion,
            author_id,
            upvotes: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn open_temp() -> (TempDir, Storage) {
        let dir = TempDir::new().unwrap();
        let storage = Storage::open(StoragePaths::new(dir.path())).unwrap();
        (dir, storage)
    }

    #[test]
    fn create_get_update_delete_cycle() {
        let (_dir, storage) = open_temp();
        let repo = FeedbackRepository::new(&storage);
        let mut post = sample_feedback(1, 7);
        repo.create(&post).unwrap();

        post.status = Status::Planned;
        repo.update(&post).unwrap();
        assert_eq!(repo.get(1).unwrap().status, Status::Planned);

        repo.delete(1).unwrap();
        assert!(matches!(repo.get(1), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn toggle_upvote_flips_membership() {
        let mut post = sample_feedback(1, 7);
        assert!(post.toggle_upvote(9));
        assert_eq!(post.upvotes, vec![9]);
        assert!(!post.toggle_upvote(9));
        assert!(post.upvotes.is_empty());
    }

    #[test]
    fn list_all_is_newest_first() {
        let (_dir, storage) = open_temp();
        let repo = FeedbackRepository::new(&storage);
        repo.create(&sample_feedback(1, 7)).unwrap();
        repo.create(&sample_feedback(2, 7)).unwrap();

        let posts = repo.list_all().unwrap();
        assert_eq!(posts.iter().map(|p| p.id).collect::<Vec<_>>(), vec![2, 1]);
    }

    #[test]
    fn status_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_string(&Status::InProgress).unwrap(),
            "\"in-progress\""
        );
        assert_eq!(
            serde_json::to_string(&Category::Feature).unwrap(),
            "\"feature\""
        );
    }
}
