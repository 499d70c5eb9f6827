// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Signalboard

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values, and the
//! validated [`AuthConfig`] built once at startup. Nothing re-reads the
//! process environment after boot; handlers only ever see the immutable
//! struct injected through application state.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Root directory for JSON document storage | `./data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `ACCESS_TOKEN_SECRET` | HS256 secret for access tokens | Required |
//! | `ACCESS_TOKEN_TTL_SECS` | Access token lifetime in seconds | `900` |
//! | `REFRESH_TOKEN_SECRET` | HS256 secret for refresh tokens | Required |
//! | `REFRESH_TOKEN_TTL_SECS` | Refresh token lifetime in seconds | `604800` |
//! | `COOKIE_SECURE` | Mark auth cookies `Secure` (`true`/`false`) | `false` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::env;
use std::fmt;

/// Environment variable name for the storage root directory.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Default storage root when `DATA_DIR` is unset.
pub const DEFAULT_DATA_DIR: &str = "./data";

/// Environment variable name for the server bind address.
pub const HOST_ENV: &str = "HOST";

/// Environment variable name for the server bind port.
pub const PORT_ENV: &str = "PORT";

/// Environment variable name for the access token signing secret.
pub const ACCESS_SECRET_ENV: &str = "ACCESS_TOKEN_SECRET";

/// Environment variable name for the access token lifetime (seconds).
pub const ACCESS_TTL_ENV: &str = "ACCESS_TOKEN_TTL_SECS";

/// Environment variable name for the refresh token signing secret.
pub const REFRESH_SECRET_ENV: &str = "REFRESH_TOKEN_SECRET";

/// Environment variable name for the refresh token lifetime (seconds).
pub const REFRESH_TTL_ENV: &str = "REFRESH_TOKEN_TTL_SECS";

/// Environment variable name for the `Secure` cookie attribute toggle.
pub const COOKIE_SECURE_ENV: &str = "COOKIE_SECURE";

/// Environment variable name for the log output format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Default access token lifetime: 15 minutes.
pub const DEFAULT_ACCESS_TTL_SECS: i64 = 900;

/// Default refresh token lifetime: 7 days.
pub const DEFAULT_REFRESH_TTL_SECS: i64 = 604_800;

/// Error raised when startup configuration is missing or malformed.
///
/// These abort the process in `main`; there is no fallback for a service
/// that cannot sign tokens.
#[derive(Debug)]
pub enum ConfigError {
    /// A required environment variable is not set.
    Missing(&'static str),
    /// An environment variable is present but cannot be parsed.
    Invalid(&'static str, String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(var) => write!(f, "missing required environment variable {var}"),
            ConfigError::Invalid(var, value) => {
                write!(f, "invalid value {value:?} for environment variable {var}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Immutable token/cookie configuration, constructed once at startup.
///
/// Access and refresh tokens use independently configured secrets and
/// lifetimes so that access tokens can stay short-lived while refresh
/// tokens survive for days.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HS256 secret for access tokens.
    pub access_secret: String,
    /// Access token lifetime in seconds.
    pub access_ttl_secs: i64,
    /// HS256 secret for refresh tokens.
    pub refresh_secret: String,
    /// Refresh token lifetime in seconds.
    pub refresh_ttl_secs: i64,
    /// Whether auth cookies carry the `Secure` attribute.
    pub cookie_secure: bool,
}

impl AuthConfig {
    /// Load and validate the auth configuration from the process environment.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when a secret is missing or a TTL does not
    /// parse as a positive integer.
    pub fn from_env() -> Result<Self, ConfigError> {
        let access_secret = require_secret(ACCESS_SECRET_ENV)?;
        let refresh_secret = require_secret(REFRESH_SECRET_ENV)?;
        let access_ttl_secs = parse_ttl(ACCESS_TTL_ENV, DEFAULT_ACCESS_TTL_SECS)?;
        let refresh_ttl_secs = parse_ttl(REFRESH_TTL_ENV, DEFAULT_REFRESH_TTL_SECS)?;
        let cookie_secure = parse_bool(COOKIE_SECURE_ENV, false)?;

        Ok(Self {
            access_secret,
            access_ttl_secs,
            refresh_secret,
            refresh_ttl_secs,
            cookie_secure,
        })
    }
}

fn require_secret(var: &'static str) -> Result<String, ConfigError> {
    match env::var(var) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        Ok(value) => Err(ConfigError::Invalid(var, value)),
        Err(_) => Err(ConfigError::Missing(var)),
    }
}

fn parse_ttl(var: &'static str, default: i64) -> Result<i64, ConfigError> {
    match env::var(var) {
        Ok(value) => match value.parse::<i64>() {
            Ok(secs) if secs > 0 => Ok(secs),
            _ => Err(ConfigError::Invalid(var, value)),
        },
        Err(_) => Ok(default),
    }
}

fn parse_bool(var: &'static str, default: bool) -> Result<bool, ConfigError> {
    match env::var(var) {
        Ok(value) => match value.to_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(ConfigError::Invalid(var, value)),
        },
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display_names_the_variable() {
        let missing = ConfigError::Missing(ACCESS_SECRET_ENV);
        assert!(missing.to_string().contains("ACCESS_TOKEN_SECRET"));

        let invalid = ConfigError::Invalid(ACCESS_TTL_ENV, "soon".to_string());
        assert!(invalid.to_string().contains("soon"));
        assert!(invalid.to_string().contains("ACCESS_TOKEN_TTL_SECS"));
    }

    #[test]
    fn defaults_are_sane() {
        // Access tokens are minutes, refresh tokens are days.
        assert!(DEFAULT_ACCESS_TTL_SECS < DEFAULT_REFRESH_TTL_SECS);
        assert_eq!(DEFAULT_ACCESS_TTL_SECS, 15 * 60);
        assert_eq!(DEFAULT_REFRESH_TTL_SECS, 7 * 24 * 60 * 60);
    }
}
