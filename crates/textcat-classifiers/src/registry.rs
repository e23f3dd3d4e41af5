//! In-memory index of trained models

use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use textcat_core::{Error, ModelStore, Result};
use tracing::info;

/// Registry shared between request handlers
pub type SharedRegistry = Arc<ModelRegistry>;

/// Maps model identifiers to artifact paths.
///
/// The storage directory stays the source of truth; this index can always be
/// rebuilt from it with [`ModelRegistry::rebuild_from`].
#[derive(Debug, Default)]
pub struct ModelRegistry {
    entries: RwLock<HashMap<String, PathBuf>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry holding every model currently in `store`
    pub fn from_store(store: &ModelStore) -> Result<Self> {
        let registry = Self::new();
        registry.rebuild_from(store)?;
        Ok(registry)
    }

    /// Register a model; its artifact must already exist
    pub fn register(&self, identifier: impl Into<String>, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        if !path.is_file() {
            return Err(Error::not_found(format!(
                "model artifact {} does not exist",
                path.display()
            )));
        }
        self.entries.write().insert(identifier.into(), path);
        Ok(())
    }

    /// Path registered for `identifier`
    pub fn get(&self, identifier: &str) -> Option<PathBuf> {
        self.entries.read().get(identifier).cloned()
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.entries.read().contains_key(identifier)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// All entries, sorted by identifier
    pub fn entries(&self) -> Vec<(String, PathBuf)> {
        let mut entries: Vec<_> = self
            .entries
            .read()
            .iter()
            .map(|(id, path)| (id.clone(), path.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Replace the contents with the models found in `store`
    pub fn rebuild_from(&self, store: &ModelStore) -> Result<usize> {
        let models = store.list()?;
        let rebuilt: HashMap<_, _> = models
            .into_iter()
            .map(|model| (model.identifier, model.path))
            .collect();
        let count = rebuilt.len();

        *self.entries.write() = rebuilt;
        info!(
            "Model registry rebuilt from {}: {} models",
            store.root().display(),
            count
        );
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_register_requires_artifact() {
        let dir = TempDir::new().unwrap();
        let registry = ModelRegistry::new();

        let missing = dir.path().join("model_a.bin");
        assert!(matches!(registry.register("a", &missing), Err(Error::NotFound(_))));
        assert!(registry.is_empty());

        fs::write(&missing, b"x").unwrap();
        registry.register("a", &missing).unwrap();
        assert_eq!(registry.get("a"), Some(missing));
        assert!(registry.contains("a"));
        assert!(!registry.contains("b"));
    }

    #[test]
    fn test_rebuild_from_store() {
        let dir = TempDir::new().unwrap();
        let store = ModelStore::open(dir.path()).unwrap();
        for id in ["c", "a", "b"] {
            fs::write(store.model_path(id), b"x").unwrap();
        }

        let registry = ModelRegistry::new();
        // stale entries disappear on rebuild
        let stale = dir.path().join("elsewhere.bin");
        fs::write(&stale, b"x").unwrap();
        registry.register("stale", &stale).unwrap();

        assert_eq!(registry.rebuild_from(&store).unwrap(), 3);
        let ids: Vec<_> = registry.entries().into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(registry.get("b"), Some(store.model_path("b")));
    }

    #[test]
    fn test_concurrent_registration() {
        let dir = TempDir::new().unwrap();
        let store = ModelStore::open(dir.path()).unwrap();
        let registry = Arc::new(ModelRegistry::new());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = registry.clone();
                let path = store.model_path(&format!("m{i}"));
                fs::write(&path, b"x").unwrap();
                std::thread::spawn(move || registry.register(format!("m{i}"), path).unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(registry.len(), 8);
    }
}
