// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Signalboard

//! Path constants and utilities for the JSON document storage layout.

use std::path::{Path, PathBuf};

use crate::config::DEFAULT_DATA_DIR;

/// Storage path utilities for the document store.
///
/// One JSON file per entity:
///
/// ```text
/// <root>/users/<id>.json
/// <root>/sessions/<fingerprint>.json
/// <root>/feedback/<id>.json
/// ```
#[derive(Debug, Clone)]
pub struct StoragePaths {
    root: PathBuf,
}

impl Default for StoragePaths {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_DIR)
    }
}

impl StoragePaths {
    /// Create a new StoragePaths with a custom root (useful for testing).
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory for all stored data.
    pub fn root(&self) -> &Path {
        &self.root
    }

    // ========== User Paths ==========

    /// Directory containing all user documents.
    pub fn users_dir(&self) -> PathBuf {
        self.root.join("users")
    }

    /// Path to a specific user document.
    pub fn user(&self, user_id: i64) -> PathBuf {
        self.users_dir().join(format!("{user_id}.json"))
    }

    // ========== Session Paths ==========

    /// Directory containing all refresh-session documents.
    pub fn sessions_dir(&self) -> PathBuf {
        self.root.join("sessions")
    }

    /// Path to a session document, keyed by token fingerprint.
    ///
    /// Fingerprints are base64url without padding, so they are safe as
    /// filenames.
    pub fn session(&self, fingerprint: &str) -> PathBuf {
        self.sessions_dir().join(format!("{fingerprint}.json"))
    }

    // ========== Feedback Paths ==========

    /// Directory containing all feedback documents.
    pub fn feedback_dir(&self) -> PathBuf {
        self.root.join("feedback")
    }

    /// Path to a specific feedback document.
    pub fn feedback(&self, feedback_id: i64) -> PathBuf {
        self.feedback_dir().join(format!("{feedback_id}.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_nest_under_root() {
        let paths = StoragePaths::new("/tmp/board");
        assert_eq!(paths.user(7), PathBuf::from("/tmp/board/users/7.json"));
        assert_eq!(
            paths.session("abc_def"),
            PathBuf::from("/tmp/board/sessions/abc_def.json")
        );
        assert_eq!(
            paths.feedback(12),
            PathBuf::from("/tmp/board/feedback/12.json")
        );
    }

    #[test]
    fn default_root_matches_config() {
        assert_eq!(StoragePaths::default().root(), Path::new(DEFAULT_DATA_DIR));
    }
}
