//! Saving and restoring the title and document
//!
//! Content is kept as one JSON string in a key-value string store, the way a
//! browser keeps it in local storage.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::PersistenceError;
use super::model::Document;
use super::raw::{from_raw, to_raw, RawContent};

/// Default storage key for saved content
pub const DEFAULT_STORAGE_KEY: &str = "draftEditor";

/// Title and document saved together
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedContent {
    #[serde(default)]
    pub title: String,
    pub content: RawContent,
}

impl SavedContent {
    pub fn new(title: impl Into<String>, document: &Document) -> Self {
        Self {
            title: title.into(),
            content: to_raw(document),
        }
    }

    /// Rebuild the document
    pub fn document(&self) -> Result<Document, PersistenceError> {
        Ok(from_raw(&self.content)?)
    }
}

/// Key-value store of strings
pub trait ContentStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), PersistenceError>;
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ContentStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store keeping each item in `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn item_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl ContentStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let path = self.item_path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&path)?))
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.item_path(key), value)?;
        Ok(())
    }
}

/// Loads and saves the title/document bundle for the host
pub trait PersistenceAdapter {
    /// Previously saved content; absent or unreadable data yields `None`
    fn load(&self) -> Option<SavedContent>;

    fn save(&mut self, content: &SavedContent) -> Result<(), PersistenceError>;
}

/// [`PersistenceAdapter`] over a [`ContentStore`] entry
#[derive(Debug, Clone)]
pub struct StoredContent<S> {
    store: S,
    key: String,
}

impl<S: ContentStore> StoredContent<S> {
    pub fn new(store: S) -> Self {
        Self::with_key(store, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn try_load(&self) -> Result<Option<SavedContent>, PersistenceError> {
        let Some(json) = self.store.get_item(&self.key)? else {
            return Ok(None);
        };
        let saved: SavedContent = serde_json::from_str(&json)?;
        // Validate now so a bad document never reaches the editor
        saved.document()?;
        Ok(Some(saved))
    }
}

impl<S: ContentStore> PersistenceAdapter for StoredContent<S> {
    fn load(&self) -> Option<SavedContent> {
        match self.try_load() {
            Ok(Some(saved)) => {
                tracing::info!("Loaded saved content from {}", self.key);
                Some(saved)
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Discarding saved content in {}: {}", self.key, e);
                None
            }
        }
    }

    fn save(&mut self, content: &SavedContent) -> Result<(), PersistenceError> {
        let json = serde_json::to_string(content)?;
        self.store.set_item(&self.key, &json)?;
        tracing::info!("Saved content to {}", self.key);
        Ok(())
    }
}
