// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Signalboard

//! Storage layer: a JSON document store plus typed repositories.
//!
//! The engine ([`fs::Storage`]) knows only about paths and JSON documents;
//! everything entity-shaped lives in [`repository`].

pub mod fs;
pub mod paths;
pub mod repository;

pub use fs::{Storage, StorageError, StorageResult};
pub use paths::StoragePaths;
