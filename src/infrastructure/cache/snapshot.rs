//! JSON snapshots for warm restarts

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::cache::ResponseCache;
use crate::domain::DomainError;

const SNAPSHOT_VERSION: u32 = 1;

/// One recorded (query, response) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub query: String,
    pub response: String,
    pub confidence: f64,
    pub created_at: DateTime<Utc>,
}

/// Serializable copy of the full-message level
///
/// Only exact entries are stored. Restoring replays them through the normal
/// write path, which rebuilds the phrase, word and semantic levels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSnapshot {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub entries: Vec<SnapshotEntry>,
}

impl CacheSnapshot {
    /// Capture the recorded pairs of `cache` in insertion order
    pub fn capture(cache: &dyn ResponseCache) -> Self {
        let entries = cache
            .entries()
            .into_iter()
            .map(|(query, response)| SnapshotEntry {
                query,
                response: response.text().to_string(),
                confidence: response.confidence(),
                created_at: response.created_at(),
            })
            .collect();

        Self {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            entries,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write atomically: temp file in the same directory, then rename
    pub async fn save(&self, path: &Path) -> Result<(), DomainError> {
        let json = serde_json::to_vec_pretty(self)
            .map_err(|e| DomainError::storage(format!("Failed to serialize snapshot: {}", e)))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                DomainError::storage(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        let temp = temp_path(path);

        tokio::fs::write(&temp, json).await.map_err(|e| {
            DomainError::storage(format!("Failed to write {}: {}", temp.display(), e))
        })?;

        tokio::fs::rename(&temp, path).await.map_err(|e| {
            DomainError::storage(format!("Failed to replace {}: {}", path.display(), e))
        })?;

        info!(path = %path.display(), entries = self.len(), "Saved cache snapshot");
        Ok(())
    }

    /// Read a snapshot; a missing file is `None`
    pub async fn load(path: &Path) -> Result<Option<Self>, DomainError> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(DomainError::storage(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let snapshot: Self = serde_json::from_slice(&bytes).map_err(|e| {
            DomainError::storage(format!("Invalid snapshot {}: {}", path.display(), e))
        })?;

        if snapshot.version != SNAPSHOT_VERSION {
            return Err(DomainError::storage(format!(
                "Unsupported snapshot version {} (expected {})",
                snapshot.version, SNAPSHOT_VERSION
            )));
        }

        Ok(Some(snapshot))
    }

    /// Replay every entry into `cache`, returning how many were written
    pub async fn restore_into(&self, cache: &dyn ResponseCache) -> usize {
        let mut restored = 0;

        for entry in &self.entries {
            let outcome = cache
                .record_at(&entry.query, &entry.response, entry.confidence, entry.created_at)
                .await;

            if outcome.full_message {
                restored += 1;
            } else {
                warn!(query = %entry.query, issues = ?outcome.issues, "Skipped snapshot entry");
            }
        }

        restored
    }
}

/// Save `cache` to `path`
pub async fn save_snapshot(cache: &dyn ResponseCache, path: &Path) -> Result<usize, DomainError> {
    let snapshot = CacheSnapshot::capture(cache);
    snapshot.save(path).await?;
    Ok(snapshot.len())
}

/// Load `path` into `cache`; a missing file restores nothing
pub async fn restore_snapshot(cache: &dyn ResponseCache, path: &Path) -> Result<usize, DomainError> {
    let Some(snapshot) = CacheSnapshot::load(path).await? else {
        info!(path = %path.display(), "No cache snapshot found, starting cold");
        return Ok(0);
    };

    let restored = snapshot.restore_into(cache).await;
    info!(path = %path.display(), restored, "Restored cache snapshot");

    Ok(restored)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::MockResponseCache;

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cache.json");
        let cache = MockResponseCache::new()
            .with_entry("first", "one", 0.9)
            .with_entry("second", "two", 0.4);

        let saved = save_snapshot(&cache, &path).await.unwrap();
        let loaded = CacheSnapshot::load(&path).await.unwrap().unwrap();

        assert_eq!(saved, 2);
        assert_eq!(loaded.version, SNAPSHOT_VERSION);
        assert_eq!(loaded.entries[0].query, "first");
        assert_eq!(loaded.entries[1].response, "two");
        assert!(!temp_path(&path).exists());
    }

    #[tokio::test]
    async fn test_missing_file_is_empty_restore() {
        let dir = tempfile::tempdir().unwrap();
        let cache = MockResponseCache::new();

        let restored = restore_snapshot(&cache, &dir.path().join("absent.json"))
            .await
            .unwrap();

        assert_eq!(restored, 0);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        tokio::fs::write(&path, b"not json").await.unwrap();

        let result = CacheSnapshot::load(&path).await;

        assert!(matches!(result, Err(DomainError::Storage { .. })));
    }

    #[tokio::test]
    async fn test_restore_replays_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        let source = MockResponseCache::new().with_entry("what is food", "eat", 0.8);
        save_snapshot(&source, &path).await.unwrap();

        let target = MockResponseCache::new();
        let restored = restore_snapshot(&target, &path).await.unwrap();

        assert_eq!(restored, 1);
        let hit = target.lookup("what is food").await.unwrap().unwrap();
        assert_eq!(hit.text(), "eat");
    }

    #[test]
    fn test_temp_path() {
        assert_eq!(
            temp_path(Path::new("/data/cache.json")),
            PathBuf::from("/data/cache.json.tmp")
        );
    }
}
