//! JSON snapshot of the in-memory tables
//!
//! The whole table set is one JSON document. Writes go to a sibling `.tmp`
//! file first and are renamed into place, so a crash mid-write leaves the
//! previous snapshot intact.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::PersistenceResult;
use crate::memory::{MemoryStore, MemoryTables};

/// A snapshot file on disk
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the tables; a missing file yields empty tables
    pub async fn load(&self) -> PersistenceResult<MemoryTables> {
        if !tokio::fs::try_exists(&self.path).await? {
            debug!(path = %self.path.display(), "No snapshot yet, starting empty");
            return Ok(MemoryTables::default());
        }
        let content = tokio::fs::read_to_string(&self.path).await?;
        let tables: MemoryTables = serde_json::from_str(&content)?;
        debug!(
            path = %self.path.display(),
            todos = tables.todos.len(),
            relatos = tables.relatos.len(),
            "Loaded snapshot"
        );
        Ok(tables)
    }

    /// Write the tables atomically
    pub async fn save(&self, tables: &MemoryTables) -> PersistenceResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(tables)?;
        let temp_path = self.path.with_extension("tmp");
        tokio::fs::write(&temp_path, &content).await?;
        tokio::fs::rename(&temp_path, &self.path).await?;
        info!(path = %self.path.display(), "Saved snapshot");
        Ok(())
    }

    /// Load into a shared store, seeding the default catalog when asked
    pub async fn open_store(&self, seed_catalog: bool) -> PersistenceResult<Arc<MemoryStore>> {
        let store = MemoryStore::with_tables(self.load().await?);
        if seed_catalog {
            store.seed_default_catalog();
        }
        Ok(Arc::new(store))
    }

    pub async fn save_store(&self, store: &MemoryStore) -> PersistenceResult<()> {
        self.save(&store.snapshot()).await
    }
}
