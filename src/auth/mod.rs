// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Signalboard

//! Authentication and authorization.
//!
//! Split along three seams:
//!
//! - **Credentials** ([`password`]): argon2id hashing and the keyed
//!   fingerprint used to index refresh sessions on disk.
//! - **Tokens** ([`tokens`]): stateless HS256 access/refresh JWTs, each
//!   class signed with its own secret.
//! - **Policy** ([`policy`]): attribute-based rules derived from the
//!   actor's role on every check, never stored.
//!
//! [`service::AuthService`] ties them to storage for the session
//! lifecycle; [`extractor::Auth`] turns a request into an
//! [`AuthenticatedUser`].

pub mod error;
pub mod extractor;
pub mod password;
pub mod policy;
pub mod roles;
pub mod service;
pub mod tokens;

pub use error::AuthError;
pub use extractor::{AdminOnly, Auth, AuthenticatedUser};
pub use policy::{Action, Resource, ResourceKind, Rule};
pub use roles::Role;
pub use service::AuthService;
pub use tokens::{TokenPair, TokenService};
