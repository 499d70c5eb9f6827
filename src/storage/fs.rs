// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Signalboard

//! JSON document storage on the local filesystem.
//!
//! Each entity is one pretty-printed JSON file; writes go through a temp
//! file and an atomic rename so a crash never leaves a half-written
//! document. Durability and isolation beyond that are the filesystem's
//! problem — this is a feedback board, not a transaction engine.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};

use super::StoragePaths;

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Filesystem-backed document store.
///
/// Cheap to clone; clones share the id counters. Call [`Storage::open`]
/// once at startup — it creates the directory layout and seeds the id
/// counters from whatever already exists on disk.
#[derive(Debug, Clone)]
pub struct Storage {
    paths: StoragePaths,
    next_user_id: Arc<AtomicI64>,
    next_feedback_id: Arc<AtomicI64>,
}

impl Storage {
    /// Open (and if needed create) the storage layout under `paths`.
    pub fn open(paths: StoragePaths) -> StorageResult<Self> {
        let dirs = [
            paths.users_dir(),
            paths.sessions_dir(),
            paths.feedback_dir(),
        ];
        for dir in dirs {
            fs::create_dir_all(&dir)?;
        }

        // Seed the id counters past everything already on disk.
        let next_user_id = max_numeric_id(&paths.users_dir())? + 1;
        let next_feedback_id = max_numeric_id(&paths.feedback_dir())? + 1;

        Ok(Self {
            paths,
            next_user_id: Arc::new(AtomicI64::new(next_user_id)),
            next_feedback_id: Arc::new(AtomicI64::new(next_feedback_id)),
        })
    }

    /// Get the storage paths.
    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }

    /// Allocate the next user id.
    pub fn next_user_id(&self) -> i64 {
        self.next_user_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Allocate the next feedback id.
    pub fn next_feedback_id(&self) -> i64 {
        self.next_feedback_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Check that the storage root is present and writable.
    ///
    /// Performs a write-read-delete probe; used by the health endpoint.
    pub fn health_check(&self) -> StorageResult<()> {
        let test_file = self.paths.root().join(".health_check");
        let test_data = b"health_check_data";

        fs::write(&test_file, test_data)?;
        let read_data = fs::read(&test_file)?;
        fs::remove_file(&test_file)?;

        if read_data != test_data {
            return Err(StorageError::Io(io::Error::other(
                "health check data mismatch",
            )));
        }
        Ok(())
    }

    // ========== Generic JSON Operations ==========

    /// Read a JSON document and deserialize it.
    pub fn read_json<T: DeserializeOwned>(&self, path: impl AsRef<Path>) -> StorageResult<T> {
        let file = File::open(path.as_ref())?;
        let reader = BufReader::new(file);
        let value = serde_json::from_reader(reader)?;
        Ok(value)
    }

    /// Write a JSON document (atomic write via rename).
    pub fn write_json<T: Serialize>(&self, path: impl AsRef<Path>, value: &T) -> StorageResult<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write to temp file first, then rename for atomicity.
        let temp_path = path.with_extension("tmp");
        {
            let file = File::create(&temp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, value)?;
            writer.flush()?;
        }
        fs::rename(&temp_path, path)?;
        Ok(())
    }

    /// Check if a document exists.
    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        path.as_ref().exists()
    }

    /// Delete a document; missing files are not an error.
    pub fn delete(&self, path: impl AsRef<Path>) -> StorageResult<()> {
        match fs::remove_file(path.as_ref()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// List the file stems of all `.json` documents in a directory.
    pub fn list_documents(&self, dir: impl AsRef<Path>) -> StorageResult<Vec<String>> {
        let mut stems = Vec::new();
        for entry in fs::read_dir(dir.as_ref())? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    stems.push(stem.to_string());
                }
            }
        }
        Ok(stems)
    }
}

/// Highest numeric `.json` file stem in a directory, or 0 when empty.
fn max_numeric_id(dir: &Path) -> StorageResult<i64> {
    let mut max = 0;
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            if let Some(id) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<i64>().ok())
            {
                max = max.max(id);
            }
        }
    }
    Ok(max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Doc {
        id: i64,
        name: String,
    }

    fn open_temp() -> (TempDir, Storage) {
        let dir = TempDir::new().unwrap();
        let storage = Storage::open(StoragePaths::new(dir.path())).unwrap();
        (dir, storage)
    }

    #[test]
    fn write_then_read_round_trips() {
        let (_dir, storage) = open_temp();
        let doc = Doc {
            id: 1,
            name: "hello".to_string(),
        };
        let path = storage.paths().feedback(1);
        storage.write_json(&path, &doc).unwrap();

        let read: Doc = storage.read_json(&path).unwrap();
        assert_eq!(read, doc);
    }

    #[test]
    fn delete_is_idempotent() {
        let (_dir, storage) = open_temp();
        let path = storage.paths().session("nope");
        assert!(storage.delete(&path).is_ok());
        assert!(storage.delete(&path).is_ok());
    }

    #[test]
    fn list_documents_skips_non_json() {
        let (_dir, storage) = open_temp();
        storage
            .write_json(storage.paths().feedback(1), &serde_json::json!({}))
            .unwrap();
        storage
            .write_json(storage.paths().feedback(2), &serde_json::json!({}))
            .unwrap();
        std::fs::write(storage.paths().feedback_dir().join("junk.txt"), b"x").unwrap();

        let mut stems = storage
            .list_documents(storage.paths().feedback_dir())
            .unwrap();
        stems.sort();
        assert_eq!(stems, vec!["1", "2"]);
    }

    #[test]
    fn id_counters_resume_past_existing_documents() {
        let dir = TempDir::new().unwrap();
        {
            let storage = Storage::open(StoragePaths::new(dir.path())).unwrap();
            assert_eq!(storage.next_user_id(), 1);
            assert_eq!(storage.next_user_id(), 2);
            storage
                .write_json(storage.paths().user(2), &serde_json::json!({}))
                .unwrap();
        }
        // Reopening scans the directory and never reuses an id.
        let reopened = Storage::open(StoragePaths::new(dir.path())).unwrap();
        assert_eq!(reopened.next_user_id(), 3);
        assert_eq!(reopened.next_feedback_id(), 1);
    }

    #[test]
    fn health_check_passes_on_writable_root() {
        let (_dir, storage) = open_temp();
        assert!(storage.health_check().is_ok());
    }
}
