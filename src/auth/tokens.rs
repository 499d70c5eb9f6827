// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Signalboard

//! Access/refresh token issuance and verification.
//!
//! Both token classes are HS256 JWTs carrying the same claim shape but
//! signed with independently configured secrets and lifetimes. Issuing a
//! pair is atomic: if either signing fails, no pair is returned.
//!
//! Verification deliberately collapses every failure (bad signature,
//! expiry, garbage input) into one error per token class so a caller can
//! never learn *why* a token was rejected.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;

use super::error::AuthError;
use super::password;

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Claims carried by both access and refresh tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's numeric id
    pub sub: i64,
    /// User's email at issuance time
    pub email: String,
    /// Issued-at timestamp (Unix seconds)
    pub iat: i64,
    /// Expiration timestamp (Unix seconds)
    pub exp: i64,
    /// Unique token id. Two tokens minted in the same second would
    /// otherwise be byte-identical — and refresh tokens would then share a
    /// session fingerprint.
    pub jti: String,
}

/// A freshly issued access/refresh token pair.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Signs and verifies both token classes from one immutable config.
#[derive(Debug, Clone)]
pub struct TokenService {
    config: AuthConfig,
}

impl TokenService {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    /// The configuration this service was built with.
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Issue an access/refresh pair for a user.
    ///
    /// Persisting the refresh fingerprint is the caller's job; issuance
    /// only creates tokens.
    ///
    /// # Errors
    /// Fails atomically with [`AuthError::Internal`] if either signing
    /// fails — a partial pair is never returned.
    pub fn issue_pair(&self, user_id: i64, email: &str) -> Result<TokenPair, AuthError> {
        let now = Utc::now().timestamp();

        let access_token = sign(
            &self.config.access_secret,
            &Claims {
                sub: user_id,
                email: email.to_string(),
                iat: now,
                exp: now + self.config.access_ttl_secs,
                jti: Uuid::new_v4().to_string(),
            },
        )?;
        let refresh_token = sign(
            &self.config.refresh_secret,
            &Claims {
                sub: user_id,
                email: email.to_string(),
                iat: now,
                exp: now + self.config.refresh_ttl_secs,
                jti: Uuid::new_v4().to_string(),
            },
        )?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Verify an access token's signature and expiry.
    ///
    /// # Errors
    /// Any failure yields [`AuthError::InvalidAccessToken`].
    pub fn verify_access(&self, token: &str) -> Result<Claims, AuthError> {
        verify(&self.config.access_secret, token).map_err(|_| AuthError::InvalidAccessToken)
    }

    /// Verify a refresh token's signature and expiry.
    ///
    /// # Errors
    /// Any failure yields [`AuthError::InvalidRefreshToken`].
    pub fn verify_refresh(&self, token: &str) -> Result<Claims, AuthError> {
        verify(&self.config.refresh_secret, token).map_err(|_| AuthError::InvalidRefreshToken)
    }

    /// Fingerprint a raw refresh token for session-store lookup.
    pub fn fingerprint(&self, token: &str) -> String {
        password::fingerprint(&self.config.refresh_secret, token)
    }
}

fn sign(secret: &str, claims: &Claims) -> Result<String, AuthError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::Internal(format!("token signing failed: {e}")))
}

fn verify(secret: &str, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = CLOCK_SKEW_LEEWAY;
    validation.validate_aud = false;

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(AuthConfig {
            access_secret: "access-secret".to_string(),
            access_ttl_secs: 900,
            refresh_secret: "refresh-secret".to_string(),
            refresh_ttl_secs: 604_800,
            cookie_secure: false,
        })
    }

    #[test]
    fn issued_pair_round_trips() {
        let svc = service();
        let pair = svc.issue_pair(42, "alice@example.com").unwrap();
        assert!(!pair.access_token.is_empty());
        assert!(!pair.refresh_token.is_empty());
        assert_ne!(pair.access_token, pair.refresh_token);

        let access = svc.verify_access(&pair.access_token).unwrap();
        assert_eq!(access.sub, 42);
        assert_eq!(access.email, "alice@example.com");

        let refresh = svc.verify_refresh(&pair.refresh_token).unwrap();
        assert_eq!(refresh.sub, 42);
        assert!(refresh.exp > access.exp);
    }

    #[test]
    fn back_to_back_pairs_are_distinct() {
        let svc = service();
        let first = svc.issue_pair(1, "a@b.co").unwrap();
        let second = svc.issue_pair(1, "a@b.co").unwrap();
        // jti keeps same-second issuances from colliding.
        assert_ne!(first.access_token, second.access_token);
        assert_ne!(first.refresh_token, second.refresh_token);
        assert_ne!(
            svc.fingerprint(&first.refresh_token),
            svc.fingerprint(&second.refresh_token)
        );
    }

    #[test]
    fn token_classes_are_not_interchangeable() {
        let svc = service();
        let pair = svc.issue_pair(1, "a@b.co").unwrap();
        // An access token must not pass refresh verification or vice versa.
        assert!(svc.verify_refresh(&pair.access_token).is_err());
        assert!(svc.verify_access(&pair.refresh_token).is_err());
    }

    #[test]
    fn tampered_token_is_rejected() {
        let svc = service();
        let pair = svc.issue_pair(1, "a@b.co").unwrap();
        let mut tampered = pair.refresh_token.clone();
        tampered.pop();
        tampered.push('x');
        assert!(matches!(
            svc.verify_refresh(&tampered),
            Err(AuthError::InvalidRefreshToken)
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let svc = service();
        let now = Utc::now().timestamp();
        // Expired well past the 60s leeway.
        let stale = sign(
            "refresh-secret",
            &Claims {
                sub: 1,
                email: "a@b.co".to_string(),
                iat: now - 7200,
                exp: now - 3600,
                jti: "stale".to_string(),
            },
        )
        .unwrap();
        assert!(matches!(
            svc.verify_refresh(&stale),
            Err(AuthError::InvalidRefreshToken)
        ));
    }

    #[test]
    fn garbage_input_is_rejected() {
        let svc = service();
        assert!(svc.verify_refresh("not-a-jwt").is_err());
        assert!(svc.verify_access("").is_err());
    }

    #[test]
    fn fingerprint_matches_standalone_helper() {
        let svc = service();
        let pair = svc.issue_pair(7, "a@b.co").unwrap();
        assert_eq!(
            svc.fingerprint(&pair.refresh_token),
            password::fingerprint("refresh-secret", &pair.refresh_token)
        );
    }
}
