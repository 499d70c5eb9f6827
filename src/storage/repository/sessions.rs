// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Signalboard

//! Refresh-session repository.
//!
//! One document per outstanding refresh grant, keyed by the token's
//! fingerprint. The raw refresh token is never written anywhere — only
//! its keyed hash, so a copy of the data directory cannot be replayed as
//! a token. Multiple concurrent sessions per user are expected
//! (multi-device).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::super::{Storage, StorageError, StorageResult};

/// One outstanding refresh-token grant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredSession {
    /// Owning user id
    pub user_id: i64,
    /// Keyed fingerprint of the refresh token (never the raw token)
    pub fingerprint: String,
    /// When the grant expires
    pub expires_at: DateTime<Utc>,
    /// When the grant was issued
    pub created_at: DateTime<Utc>,
}

/// Repository for refresh-session documents.
pub struct SessionRepository<'a> {
    storage: &'a Storage,
}

impl<'a> SessionRepository<'a> {
    /// Create a new SessionRepository.
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Persist a new session grant.
    pub fn record(
        &self,
        user_id: i64,
        fingerprint: &str,
        expires_at: DateTime<Utc>,
    ) -> StorageResult<()> {
        let session = StoredSession {
            user_id,
            fingerprint: fingerprint.to_string(),
            expires_at,
            created_at: Utc::now(),
        };
        self.storage
            .write_json(self.storage.paths().session(fingerprint), &session)
    }

    /// Look up a session by its fingerprint.
    pub fn find_by_fingerprint(&self, fingerprint: &str) -> StorageResult<Option<StoredSession>> {
        let path = self.storage.paths().session(fingerprint);
        if !self.storage.exists(&path) {
            return Ok(None);
        }
        match self.storage.read_json(path) {
            Ok(session) => Ok(Some(session)),
            Err(StorageError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Revoke one session. Idempotent: revoking an unknown fingerprint
    /// succeeds.
    pub fn revoke(&self, fingerprint: &str) -> StorageResult<()> {
        self.storage.delete(self.storage.paths().session(fingerprint))
    }

    /// Revoke every session owned by a user (full logout / security
    /// reset). Idempotent; returns the number of sessions removed.
    pub fn revoke_all_for_user(&self, user_id: i64) -> StorageResult<usize> {
        let fingerprints = self
            .storage
            .list_documents(self.storage.paths().sessions_dir())?;

        let mut revoked = 0;
        for fingerprint in fingerprints {
            if let Some(session) = self.find_by_fingerprint(&fingerprint)? {
                if session.user_id == user_id {
                    self.revoke(&fingerprint)?;
                    revoked += 1;
                }
            }
        }
        Ok(revoked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StoragePaths;
    use chrono::Duration;
    use tempfile::TempDir;

    fn open_temp() -> (TempDir, Storage) {
        let dir = TempDir::new().unwrap();
        let storage = Storage::open(StoragePaths::new(dir.path())).unwrap();
        (dir, storage)
    }

    #[test]
    fn record_then_find_round_trips() {
        let (_dir, storage) = open_temp();
        let repo = SessionRepository::new(&storage);
        let expires = Utc::now() + Duration::days(7);
        repo.record(42, "fp_abc", expires).unwrap();

        let found = repo.find_by_fingerprint("fp_abc").unwrap().unwrap();
        assert_eq!(found.user_id, 42);
        assert_eq!(found.fingerprint, "fp_abc");
    }

    #[test]
    fn revoke_is_idempotent() {
        let (_dir, storage) = open_temp();
        let repo = SessionRepository::new(&storage);
        repo.record(1, "fp_x", Utc::now()).unwrap();

        repo.revoke("fp_x").unwrap();
        assert!(repo.find_by_fingerprint("fp_x").unwrap().is_none());
        // Second revocation of the same fingerprint is not an error.
        repo.revoke("fp_x").unwrap();
        // Neither is revoking something that never existed.
        repo.revoke("fp_never").unwrap();
    }

    #[test]
    fn multiple_sessions_per_user_coexist() {
        let (_dir, storage) = open_temp();
        let repo = SessionRepository::new(&storage);
        repo.record(1, "fp_laptop", Utc::now()).unwrap();
        repo.record(1, "fp_phone", Utc::now()).unwrap();

        assert!(repo.find_by_fingerprint("fp_laptop").unwrap().is_some());
        assert!(repo.find_by_fingerprint("fp_phone").unwrap().is_some());
    }

    #[test]
    fn revoke_all_removes_only_that_users_sessions() {
        let (_dir, storage) = open_temp();
        let repo = SessionRepository::new(&storage);
        repo.record(1, "fp_a", Utc::now()).unwrap();
        repo.record(1, "fp_b", Utc::now()).unwrap();
        repo.record(2, "fp_c", Utc::now()).unwrap();

        assert_eq!(repo.revoke_all_for_user(1).unwrap(), 2);
        assert!(repo.find_by_fingerprint("fp_a").unwrap().is_none());
        assert!(repo.find_by_fingerprint("fp_b").unwrap().is_none());
        assert!(repo.find_by_fingerprint("fp_c").unwrap().is_some());

        // Bulk revocation is idempotent too.
        assert_eq!(repo.revoke_all_for_user(1).unwrap(), 0);
    }
}
