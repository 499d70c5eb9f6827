// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Signalboard

//! Password hashing and refresh-token fingerprinting.
//!
//! Two very different one-way functions live here and must never be
//! confused:
//!
//! - **Password storage** uses argon2id with a random salt. Hashing the
//!   same password twice yields different strings; only `verify_password`
//!   can match them.
//! - **Token fingerprinting** uses HMAC-SHA256 keyed with a server-side
//!   secret. It is deterministic so a presented refresh token can be turned
//!   back into the session-store lookup key. The raw token itself is never
//!   persisted.

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use base64ct::{Base64UrlUnpadded, Encoding};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::error::AuthError;

type HmacSha256 = Hmac<Sha256>;

/// Hash a password for storage.
///
/// Produces a salted argon2id PHC string; the same input hashes differently
/// on every call.
///
/// # Errors
/// Returns [`AuthError::Internal`] if the hasher itself fails.
pub fn hash_password(plain: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| AuthError::Internal(format!("password hashing failed: {e}")))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored hash.
///
/// A mismatch is `Ok(false)`, never an error. A stored hash that does not
/// parse is an integrity problem and surfaces as [`AuthError::Internal`].
pub fn verify_password(plain: &str, stored_hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| AuthError::Internal(format!("malformed stored password hash: {e}")))?;
    match Argon2::default().verify_password(plain.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::Internal(format!(
            "password verification failed: {e}"
        ))),
    }
}

/// Compute the deterministic fingerprint of a refresh token.
///
/// HMAC-SHA256 keyed with a server-side secret, encoded base64url without
/// padding so the result is safe to use as a storage key. Keying the hash
/// means a leaked session store cannot be used to test token guesses
/// offline.
pub fn fingerprint(key: &str, token: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(key.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(token.as_bytes());
    Base64UrlUnpadded::encode_string(&mac.finalize().into_bytes())
}
