//! Layout of the model storage directory
//!
//! Durable models live at `<root>/model_<id>.bin`; the labeled corpus for a
//! training run is written next to them as `<root>/training_<hex>.txt` and
//! removed once the run finishes. The file name is the only source of truth
//! for which models exist.

use crate::{Error, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const MODEL_PREFIX: &str = "model_";
const MODEL_EXTENSION: &str = ".bin";
const CORPUS_PREFIX: &str = "training_";
const CORPUS_EXTENSION: &str = ".txt";

/// Generate a fresh opaque identifier (32 lowercase hex characters)
pub fn new_identifier() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Whether `id` can name a file inside the storage directory.
///
/// Anything outside `[A-Za-z0-9_-]` (path separators, dots) is rejected so an
/// identifier can never escape the storage root.
pub fn is_valid_identifier(id: &str) -> bool {
    !id.is_empty()
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// A model artifact found on disk
#[derive(Debug, Clone, Serialize)]
pub struct StoredModel {
    /// Identifier recovered from the file name
    pub identifier: String,

    /// Full path of the artifact
    pub path: PathBuf,

    /// File name, e.g. `model_<id>.bin`
    pub file_name: String,

    /// Artifact size in bytes
    pub size_bytes: u64,
}

/// Handle on the storage directory
#[derive(Debug, Clone)]
pub struct ModelStore {
    root: PathBuf,
}

impl ModelStore {
    /// Open the storage directory, creating it if needed
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Wrap an existing directory without touching the filesystem
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Storage root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path a model with this identifier is stored at
    pub fn model_path(&self, identifier: &str) -> PathBuf {
        self.root
            .join(format!("{MODEL_PREFIX}{identifier}{MODEL_EXTENSION}"))
    }

    /// Fresh path for a temporary training corpus
    pub fn new_corpus_path(&self) -> PathBuf {
        self.root
            .join(format!("{CORPUS_PREFIX}{}{CORPUS_EXTENSION}", new_identifier()))
    }

    /// Resolve an identifier to an existing model file
    pub fn resolve(&self, identifier: &str) -> Option<PathBuf> {
        if !is_valid_identifier(identifier) {
            return None;
        }
        let path = self.model_path(identifier);
        path.is_file().then_some(path)
    }

    /// Scan the directory for model artifacts, sorted by file name
    pub fn list(&self) -> Result<Vec<StoredModel>> {
        let entries = fs::read_dir(&self.root).map_err(|e| {
            Error::not_found(format!(
                "model directory {} is not readable: {e}",
                self.root.display()
            ))
        })?;

        let mut models = Vec::new();
        for entry in entries {
            let entry = entry?;
            let file_name = entry.file_name().to_string_lossy().into_owned();
            let Some(identifier) = identifier_from_file_name(&file_name) else {
                continue;
            };

            let metadata = entry.metadata()?;
            if !metadata.is_file() {
                continue;
            }

            models.push(StoredModel {
                identifier: identifier.to_string(),
                path: entry.path(),
                file_name,
                size_bytes: metadata.len(),
            });
        }

        models.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        debug!("Found {} models in {}", models.len(), self.root.display());
        Ok(models)
    }
}

/// Recover the identifier from a `model_<id>.bin` file name
pub fn identifier_from_file_name(file_name: &str) -> Option<&str> {
    file_name
        .strip_prefix(MODEL_PREFIX)?
        .strip_suffix(MODEL_EXTENSION)
        .filter(|id| is_valid_identifier(id))
}
