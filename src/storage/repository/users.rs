// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Signalboard

//! User repository.
//!
//! Each user is one JSON document holding the identity *and* its
//! credential records. Registration persists both as a single write, so
//! an identity can never exist without its credential (or the other way
//! around).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::policy::{Resource, ResourceKind};
use crate::auth::Role;

use super::super::{Storage, StorageError, StorageResult};

/// Authentication provider for a credential record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialProvider {
    Local,
    Google,
}

/// One authentication method bound to a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredCredential {
    /// Which provider authenticates this credential
    pub provider: CredentialProvider,
    /// Provider-specific account identifier (the email for `local`)
    pub provider_account_id: String,
    /// Salted password hash; present only for `local`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
}

impl StoredCredential {
    /// A local email/password credential.
    pub fn local(email: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            provider: CredentialProvider::Local,
            provider_account_id: email.into(),
            password_hash: Some(password_hash.into()),
        }
    }

    /// A Google OAuth credential. Never carries a password hash.
    pub fn google(account_id: impl Into<String>) -> Self {
        Self {
            provider: CredentialProvider::Google,
            provider_account_id: account_id.into(),
            password_hash: None,
        }
    }
}

/// User identity stored as a JSON document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredUser {
    /// Numeric user id
    pub id: i64,
    /// Unique username (length >= 3)
    pub username: String,
    /// Email, always stored lowercase
    pub email: String,
    /// Display name
    pub full_name: String,
    /// Authorization role
    pub role: Role,
    /// Optional avatar reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// When the account was created
    pub created_at: DateTime<Utc>,
    /// Credential records bound to this identity
    pub credentials: Vec<StoredCredential>,
}

impl StoredUser {
    /// The local (password) credential, if this account has one.
    ///
    /// OAuth-only accounts return `None`, which login treats exactly like
    /// a wrong password.
    pub fn local_credential(&self) -> Option<&StoredCredential> {
        self.credentials
            .iter()
            .find(|c| c.provider == CredentialProvider::Local)
    }
}

impl Resource for StoredUser {
    fn kind(&self) -> ResourceKind {
        ResourceKind::User
    }
    fn resource_id(&self) -> i64 {
        self.id
    }
    fn owner_id(&self) -> i64 {
        // A user record is owned by the user it describes.
        self.id
    }
}

/// Repository for user documents.
pub struct UserRepository<'a> {
    storage: &'a Storage,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository.
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Check if a user exists.
    pub fn exists(&self, user_id: i64) -> bool {
        self.storage.exists(self.storage.paths().user(user_id))
    }

    /// Get a user by id.
    pub fn get(&self, user_id: i64) -> StorageResult<StoredUser> {
        let path = self.storage.paths().user(user_id);
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!("User {user_id}")));
        }
        self.storage.read_json(path)
    }

    /// Get a user by id, `None` when absent.
    pub fn find_by_id(&self, user_id: i64) -> StorageResult<Option<StoredUser>> {
        match self.get(user_id) {
            Ok(user) => Ok(Some(user)),
            Err(StorageError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Find a user by email (case-insensitive; one fetch returns identity
    /// and credentials together).
    pub fn find_by_email(&self, email: &str) -> StorageResult<Option<StoredUser>> {
        let needle = email.trim().to_lowercase();
        self.scan(|user| user.email == needle)
    }

    /// Find a user by username.
    pub fn find_by_username(&self, username: &str) -> StorageResult<Option<StoredUser>> {
        self.scan(|user| user.username == username)
    }

    /// Create a new user document (identity + credentials, one write).
    pub fn create(&self, user: &StoredUser) -> StorageResult<()> {
        let user_id = user.id;
        if self.exists(user_id) {
            return Err(StorageError::AlreadyExists(format!("User {user_id}")));
        }
        self.storage
            .write_json(self.storage.paths().user(user_id), user)
    }

    /// Update an existing user document.
    pub fn update(&self, user: &StoredUser) -> StorageResult<()> {
        let user_id = user.id;
        if !self.exists(user_id) {
            return Err(StorageError::NotFound(format!("User {user_id}")));
        }
        self.storage
            .write_json(self.storage.paths().user(user_id), user)
    }

    /// Delete a user document.
    pub fn delete(&self, user_id: i64) -> StorageResult<()> {
        if !self.exists(user_id) {
            return Err(StorageError::NotFound(format!("User {user_id}")));
        }
        self.storage.delete(self.storage.paths().user(user_id))
    }

    /// List all users (admin view).
    pub fn list_all(&self) -> StorageResult<Vec<StoredUser>> {
        let ids = self
            .storage
            .list_documents(self.storage.paths().users_dir())?;

        let mut users = Vec::new();
        for id in ids {
            if let Ok(parsed) = id.parse::<i64>() {
                if let Ok(user) = self.get(parsed) {
                    users.push(user);
                }
            }
        }
        users.sort_by_key(|u| u.id);
        Ok(users)
    }

    fn scan(&self, predicate: impl Fn(&StoredUser) -> bool) -> StorageResult<Option<StoredUser>> {
        for user in self.list_all()? {
            if predicate(&user) {
                return Ok(Some(user));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StoragePaths;
    use tempfile::TempDir;

    fn sample_user(id: i64, email: &str) -> StoredUser {
        StoredUser {
            id,
            username: format!("user{id}"),
            email: email.to_string(),
            full_name: "Test User".to_string(),
            role: Role::User,
            avatar_url: None,
            created_at: Utc::now(),
            credentials: vec![StoredCredential::local(email, "$argon2id$fake")],
        }
    }

    fn open_temp() -> (TempDir, Storage) {
        let dir = TempDir::new().unwrap();
        let storage = Storage::open(StoragePaths::new(dir.path())).unwrap();
        (dir, storage)
    }

    #[test]
    fn create_and_lookup_by_email_is_case_insensitive() {
        let (_dir, storage) = open_temp();
        let repo = UserRepository::new(&storage);
        repo.create(&sample_user(1, "alice@example.com")).unwrap();

        let found = repo.find_by_email("ALICE@Example.COM").unwrap().unwrap();
        assert_eq!(found.id, 1);
        // Identity and credential come back from the same fetch.
        assert!(found.local_credential().is_some());
    }

    #[test]
    fn create_refuses_duplicate_ids() {
        let (_dir, storage) = open_temp();
        let repo = UserRepository::new(&storage);
        repo.create(&sample_user(1, "a@b.co")).unwrap();
        assert!(matches!(
            repo.create(&sample_user(1, "c@d.co")),
            Err(StorageError::AlreadyExists(_))
        ));
    }

    #[test]
    fn find_by_username_and_missing_lookups() {
        let (_dir, storage) = open_temp();
        let repo = UserRepository::new(&storage);
        repo.create(&sample_user(3, "carol@example.com")).unwrap();

        assert!(repo.find_by_username("user3").unwrap().is_some());
        assert!(repo.find_by_username("nobody").unwrap().is_none());
        assert!(repo.find_by_id(99).unwrap().is_none());
    }

    #[test]
    fn google_credential_never_carries_a_hash() {
        let cred = StoredCredential::google("google-account-123");
        assert_eq!(cred.provider, CredentialProvider::Google);
        assert!(cred.password_hash.is_none());
    }

    #[test]
    fn oauth_only_account_has_no_local_credential() {
        let (_dir, storage) = open_temp();
        let repo = UserRepository::new(&storage);
        let mut user = sample_user(4, "dave@example.com");
        user.credentials = vec![StoredCredential::google("g-4")];
        repo.create(&user).unwrap();

        let found = repo.find_by_email("dave@example.com").unwrap().unwrap();
        assert!(found.local_credential().is_none());
    }

    #[test]
    fn delete_removes_the_document() {
        let (_dir, storage) = open_temp();
        let repo = UserRepository::new(&storage);
        repo.create(&sample_user(5, "e@f.co")).unwrap();
        repo.delete(5).unwrap();
        assert!(!repo.exists(5));
        assert!(matches!(repo.delete(5), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn list_all_is_sorted_by_id() {
        let (_dir, storage) = open_temp();
        let repo = UserRepository::new(&storage);
        repo.create(&sample_user(2, "b@b.co")).unwrap();
        repo.create(&sample_user(1, "a@a.co")).unwrap();

        let users = repo.list_all().unwrap();
        assert_eq!(users.iter().map(|u| u.id).collect::<Vec<_>>(), vec![1, 2]);
    }
}
