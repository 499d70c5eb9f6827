// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Signalboard

//! Authentication use cases: register, login, refresh, logout.
//!
//! One session's lifecycle: `Anonymous -> Authenticated` (login),
//! `Authenticated -> Authenticated` (refresh rotation),
//! `Authenticated -> Anonymous` (logout). Each use case orchestrates the
//! credential verifier, the token service, and the user/session
//! repositories; nothing here talks HTTP.

use std::sync::LazyLock;

use chrono::{Duration, Utc};
use regex::Regex;

use crate::storage::repository::{
    SessionRepository, StoredCredential, StoredUser, UserRepository,
};
use crate::storage::Storage;

use super::error::AuthError;
use super::password;
use super::roles::Role;
use super::tokens::{TokenPair, TokenService};

/// Email shape check applied after lowercasing.
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex literal is valid")
});

/// Minimum username length.
const MIN_USERNAME_LEN: usize = 3;

/// Orchestrates the session lifecycle over storage and the token service.
#[derive(Debug, Clone)]
pub struct AuthService {
    storage: Storage,
    tokens: TokenService,
}

impl AuthService {
    pub fn new(storage: Storage, tokens: TokenService) -> Self {
        Self { storage, tokens }
    }

    /// The token service (shared with the access-token extractor).
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Register a new local account.
    ///
    /// The uniqueness check runs before the (expensive) password hash, and
    /// identity + credential are persisted as a single document — both or
    /// neither.
    ///
    /// # Errors
    /// [`AuthError::InvalidEmail`] / [`AuthError::InvalidUsername`] on
    /// malformed input, [`AuthError::UserAlreadyExists`] on an email or
    /// username collision.
    pub fn register(
        &self,
        username: &str,
        email: &str,
        full_name: &str,
        password: &str,
    ) -> Result<StoredUser, AuthError> {
        let email = email.trim().to_lowercase();
        if !EMAIL_RE.is_match(&email) {
            return Err(AuthError::InvalidEmail);
        }
        let username = username.trim();
        if username.chars().count() < MIN_USERNAME_LEN {
            return Err(AuthError::InvalidUsername);
        }

        let users = UserRepository::new(&self.storage);
        // Fail fast before hashing; hashing a password for a doomed
        // registration is wasted work.
        if users.find_by_email(&email)?.is_some() {
            return Err(AuthError::UserAlreadyExists);
        }
        if users.find_by_username(username)?.is_some() {
            return Err(AuthError::UserAlreadyExists);
        }

        let password_hash = password::hash_password(password)?;
        let user = StoredUser {
            id: self.storage.next_user_id(),
            username: username.to_string(),
            email: email.clone(),
            full_name: full_name.trim().to_string(),
            role: Role::User,
            avatar_url: None,
            created_at: Utc::now(),
            credentials: vec![StoredCredential::local(email, password_hash)],
        };
        users.create(&user)?;

        tracing::info!(user_id = user.id, "registered new user");
        Ok(user)
    }

    /// Exchange email + password for a token pair.
    ///
    /// # Errors
    /// [`AuthError::InvalidCredentials`] for a missing account, an account
    /// with no local password, or a wrong password — indistinguishable by
    /// design. The password comparison never runs when the account is
    /// absent.
    pub fn login(&self, email: &str, password_attempt: &str) -> Result<TokenPair, AuthError> {
        let users = UserRepository::new(&self.storage);
        let Some(user) = users.find_by_email(email)? else {
            return Err(AuthError::InvalidCredentials);
        };
        let Some(hash) = user
            .local_credential()
            .and_then(|cred| cred.password_hash.as_deref())
        else {
            // OAuth-only account: same error as a wrong password.
            return Err(AuthError::InvalidCredentials);
        };
        if !password::verify_password(password_attempt, hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let pair = self.tokens.issue_pair(user.id, &user.email)?;
        self.record_refresh(user.id, &pair)?;

        tracing::info!(user_id = user.id, "user logged in");
        Ok(pair)
    }

    /// Exchange a refresh token for a fresh pair (rotation).
    ///
    /// The presented token's session record is revoked and the new pair's
    /// fingerprint recorded. Revocation is idempotent, so a refresh racing
    /// a logout on the same token simply finds nothing to remove.
    ///
    /// # Errors
    /// [`AuthError::InvalidRefreshToken`] on any validation failure (the
    /// user store is not consulted in that path);
    /// [`AuthError::UserNotFound`] when the subject no longer exists
    /// (issuance is not attempted).
    pub fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = self.tokens.verify_refresh(refresh_token)?;

        let users = UserRepository::new(&self.storage);
        let Some(user) = users.find_by_id(claims.sub)? else {
            return Err(AuthError::UserNotFound);
        };

        let pair = self.tokens.issue_pair(user.id, &user.email)?;

        let sessions = SessionRepository::new(&self.storage);
        sessions.revoke(&self.tokens.fingerprint(refresh_token))?;
        self.record_refresh(user.id, &pair)?;

        tracing::debug!(user_id = user.id, "rotated refresh token");
        Ok(pair)
    }

    /// Invalidate one refresh token.
    ///
    /// Always succeeds, even when the token is unknown or already consumed
    /// — session existence is never leaked through logout.
    pub fn logout(&self, refresh_token: &str) -> Result<(), AuthError> {
        let sessions = SessionRepository::new(&self.storage);
        sessions.revoke(&self.tokens.fingerprint(refresh_token))?;
        Ok(())
    }

    /// Invalidate every session a user owns (account deletion, password
    /// reset flows).
    pub fn logout_everywhere(&self, user_id: i64) -> Result<usize, AuthError> {
        let sessions = SessionRepository::new(&self.storage);
        let revoked = sessions.revoke_all_for_user(user_id)?;
        if revoked > 0 {
            tracing::info!(user_id, revoked, "revoked all sessions for user");
        }
        Ok(revoked)
    }

    fn record_refresh(&self, user_id: i64, pair: &TokenPair) -> Result<(), AuthError> {
        let sessions = SessionRepository::new(&self.storage);
        let expires_at =
            Utc::now() + Duration::seconds(self.tokens.config().refresh_ttl_secs);
        sessions.record(user_id, &self.tokens.fingerprint(&pair.refresh_token), expires_at)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthConfig;
    use crate::storage::StoragePaths;
    use tempfile::TempDir;

    fn test_service() -> (TempDir, AuthService) {
        let dir = TempDir::new().unwrap();
        let storage = Storage::open(StoragePaths::new(dir.path())).unwrap();
        let tokens = TokenService::new(AuthConfig {
            access_secret: "test-access-secret".to_string(),
            access_ttl_secs: 900,
            refresh_secret: "test-refresh-secret".to_string(),
            refresh_ttl_secs: 604_800,
            cookie_secure: false,
        });
        (dir, AuthService::new(storage, tokens))
    }

    fn register_alice(svc: &AuthService) -> StoredUser {
        svc.register("alice", "alice@example.com", "Alice Doe", "Secret123")
            .unwrap()
    }

    #[test]
    fn register_then_login_round_trips() {
        let (_dir, svc) = test_service();
        let user = register_alice(&svc);
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.role, Role::User);

        let pair = svc.login("alice@example.com", "Secret123").unwrap();
        assert!(!pair.access_token.is_empty());
        assert!(!pair.refresh_token.is_empty());
    }

    #[test]
    fn register_normalizes_email_to_lowercase() {
        let (_dir, svc) = test_service();
        let user = svc
            .register("bob", "  Bob@Example.COM ", "Bob", "Secret123")
            .unwrap();
        assert_eq!(user.email, "bob@example.com");
        // Login with any casing finds the same account.
        assert!(svc.login("BOB@example.com", "Secret123").is_ok());
    }

    #[test]
    fn register_rejects_malformed_input() {
        let (_dir, svc) = test_service();
        assert!(matches!(
            svc.register("carol", "not-an-email", "Carol", "pw"),
            Err(AuthError::InvalidEmail)
        ));
        assert!(matches!(
            svc.register("carol", "has space@example.com", "Carol", "pw"),
            Err(AuthError::InvalidEmail)
        ));
        assert!(matches!(
            svc.register("cy", "carol@example.com", "Carol", "pw"),
            Err(AuthError::InvalidUsername)
        ));
    }

    #[test]
    fn duplicate_registration_conflicts_case_insensitively() {
        let (_dir, svc) = test_service();
        register_alice(&svc);
        assert!(matches!(
            svc.register("alice2", "ALICE@EXAMPLE.COM", "Other Alice", "Other456"),
            Err(AuthError::UserAlreadyExists)
        ));
        // The failing path never created a second user.
        let users = UserRepository::new(&svc.storage).list_all().unwrap();
        assert_eq!(users.len(), 1);
    }

    #[test]
    fn wrong_password_and_unknown_email_are_indistinguishable() {
        let (_dir, svc) = test_service();
        register_alice(&svc);

        let wrong_pw = svc.login("alice@example.com", "Wrong456").unwrap_err();
        let no_user = svc.login("nobody@example.com", "Secret123").unwrap_err();
        assert_eq!(wrong_pw.error_code(), no_user.error_code());
        assert!(matches!(wrong_pw, AuthError::InvalidCredentials));
        assert!(matches!(no_user, AuthError::InvalidCredentials));
    }

    #[test]
    fn oauth_only_account_cannot_password_login() {
        let (_dir, svc) = test_service();
        let users = UserRepository::new(&svc.storage);
        users
            .create(&StoredUser {
                id: svc.storage.next_user_id(),
                username: "gina".to_string(),
                email: "gina@example.com".to_string(),
                full_name: "Gina".to_string(),
                role: Role::User,
                avatar_url: None,
                created_at: Utc::now(),
                credentials: vec![StoredCredential::google("g-gina")],
            })
            .unwrap();

        assert!(matches!(
            svc.login("gina@example.com", "anything"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn login_records_a_session_fingerprint() {
        let (_dir, svc) = test_service();
        register_alice(&svc);
        let pair = svc.login("alice@example.com", "Secret123").unwrap();

        let sessions = SessionRepository::new(&svc.storage);
        let fp = svc.tokens.fingerprint(&pair.refresh_token);
        let session = sessions.find_by_fingerprint(&fp).unwrap().unwrap();
        assert_eq!(session.user_id, 1);
        assert!(session.expires_at > Utc::now());
    }

    #[test]
    fn refresh_rotates_the_session_record() {
        let (_dir, svc) = test_service();
        register_alice(&svc);
        let pair = svc.login("alice@example.com", "Secret123").unwrap();
        let old_fp = svc.tokens.fingerprint(&pair.refresh_token);

        let rotated = svc.refresh(&pair.refresh_token).unwrap();
        assert_ne!(rotated.access_token, pair.access_token);
        assert_ne!(rotated.refresh_token, pair.refresh_token);

        let sessions = SessionRepository::new(&svc.storage);
        // Old fingerprint revoked, new one recorded.
        assert!(sessions.find_by_fingerprint(&old_fp).unwrap().is_none());
        let new_fp = svc.tokens.fingerprint(&rotated.refresh_token);
        assert!(sessions.find_by_fingerprint(&new_fp).unwrap().is_some());
    }

    #[test]
    fn refresh_rejects_tampered_tokens() {
        let (_dir, svc) = test_service();
        register_alice(&svc);
        let pair = svc.login("alice@example.com", "Secret123").unwrap();

        let mut tampered = pair.refresh_token.clone();
        tampered.pop();
        tampered.push('x');
        assert!(matches!(
            svc.refresh(&tampered),
            Err(AuthError::InvalidRefreshToken)
        ));
    }

    #[test]
    fn refresh_for_a_deleted_user_fails_closed() {
        let (_dir, svc) = test_service();
        let user = register_alice(&svc);
        let pair = svc.login("alice@example.com", "Secret123").unwrap();

        UserRepository::new(&svc.storage).delete(user.id).unwrap();
        assert!(matches!(
            svc.refresh(&pair.refresh_token),
            Err(AuthError::UserNotFound)
        ));
    }

    #[test]
    fn logout_is_always_successful() {
        let (_dir, svc) = test_service();
        register_alice(&svc);
        let pair = svc.login("alice@example.com", "Secret123").unwrap();

        svc.logout(&pair.refresh_token).unwrap();
        // Second logout with the consumed token, and logout with garbage,
        // both succeed.
        svc.logout(&pair.refresh_token).unwrap();
        svc.logout("never-issued").unwrap();
    }

    #[test]
    fn logout_everywhere_clears_all_devices() {
        let (_dir, svc) = test_service();
        let user = register_alice(&svc);
        svc.login("alice@example.com", "Secret123").unwrap();
        svc.login("alice@example.com", "Secret123").unwrap();

        assert_eq!(svc.logout_everywhere(user.id).unwrap(), 2);
        assert_eq!(svc.logout_everywhere(user.id).unwrap(), 0);
    }

    #[test]
    fn full_session_lifecycle() {
        let (_dir, svc) = test_service();
        register_alice(&svc);

        let pair = svc.login("alice@example.com", "Secret123").unwrap();
        let rotated = svc.refresh(&pair.refresh_token).unwrap();
        assert_ne!(rotated.access_token, pair.access_token);

        svc.logout(&rotated.refresh_token).unwrap();
        // The consumed token logs out "successfully" again.
        svc.logout(&rotated.refresh_token).unwrap();
    }
}
