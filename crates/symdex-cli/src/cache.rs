//! Index cache for symdex to skip unchanged files
//!
//! Uses xxHash for file hashing and stores the per-file index in a
//! `.symdex-cache` file at the project root.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use xxhash_rust::xxh3::{xxh3_64, Xxh3};

use symdex_indexer::IndexerConfig;

use crate::process::FileIndex;

/// Cache file name
pub const CACHE_FILE: &str = ".symdex-cache";

/// Cache version - increment when format changes
const CACHE_VERSION: u32 = 1;

/// Entry for a single cached file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// xxHash of file contents
    pub content_hash: u64,
    /// Hash of everything besides the file that shapes its index
    pub settings_hash: u64,
    pub file: FileIndex,
}

/// Cache structure stored on disk
#[derive(Debug, Serialize, Deserialize)]
pub struct Cache {
    /// Cache format version
    pub version: u32,
    /// Cached entries by absolute file path
    pub entries: HashMap<PathBuf, CacheEntry>,
}

impl Default for Cache {
    fn default() -> Self {
        Self {
            version: CACHE_VERSION,
            entries: HashMap::new(),
        }
    }
}

impl Cache {
    /// Load cache from the default location in the given directory
    pub fn load(dir: &Path) -> Result<Self> {
        Self::load_from(&dir.join(CACHE_FILE))
    }

    /// Load cache from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read cache file: {}", path.display()))?;

        let cache: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache file: {}", path.display()))?;

        if cache.version != CACHE_VERSION {
            return Ok(Self::default());
        }

        Ok(cache)
    }

    /// Save cache to the default location in the given directory
    pub fn save(&self, dir: &Path) -> Result<()> {
        self.save_to(&dir.join(CACHE_FILE))
    }

    /// Save cache to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string(self).context("Failed to serialize cache")?;

        fs::write(path, contents)
            .with_context(|| format!("Failed to write cache file: {}", path.display()))?;

        Ok(())
    }

    /// Get the cached index of a file if neither it nor the settings changed
    pub fn get_if_valid(&self, path: &Path, content_hash: u64, settings_hash: u64) -> Option<&FileIndex> {
        self.entries
            .get(path)
            .filter(|entry| entry.content_hash == content_hash && entry.settings_hash == settings_hash)
            .map(|entry| &entry.file)
    }

    /// Update cache entry for a file
    pub fn update(&mut self, path: PathBuf, content_hash: u64, settings_hash: u64, file: FileIndex) {
        self.entries.insert(
            path,
            CacheEntry {
                content_hash,
                settings_hash,
                file,
            },
        );
    }

    /// Remove a file from the cache
    pub fn invalidate(&mut self, path: &Path) {
        self.entries.remove(path);
    }

    /// Remove entries for files that no longer exist
    pub fn prune(&mut self) {
        self.entries.retain(|path, _| path.exists());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn hash_contents(contents: &[u8]) -> u64 {
    xxh3_64(contents)
}

/// Hash the indexer settings together with the project files the index depends on
///
/// The composer manifest decides the framework marker and the service files
/// answer alias lookups, so a change to either invalidates every entry.
pub fn hash_settings(config: &IndexerConfig, project_root: &Path, service_files: &[PathBuf]) -> u64 {
    let mut hasher = Xxh3::new();
    hasher.update(format!("{:?}", config).as_bytes());

    let composer = project_root.join(crate::project::COMPOSER_FILE);
    for path in std::iter::once(composer).chain(service_files.iter().map(|f| project_root.join(f))) {
        hasher.update(path.to_string_lossy().as_bytes());
        match fs::read(&path) {
            Ok(contents) => hasher.update(&contents),
            Err(_) => hasher.update(b"<missing>"),
        }
    }

    hasher.digest()
}

/// Delete the cache file in the given directory
pub fn clear_cache(dir: &Path) -> Result<()> {
    let cache_path = dir.join(CACHE_FILE);
    if cache_path.exists() {
        fs::remove_file(&cache_path)
            .with_context(|| format!("Failed to delete cache file: {}", cache_path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use symdex_core::{ReferenceKind, ReferenceRecord};
    use tempfile::TempDir;

    fn file_index() -> FileIndex {
        let mut file = FileIndex::default();
        file.index
            .references
            .push(ReferenceRecord::unanchored(ReferenceKind::Namespace, "src"));
        file.positions.push((1, 1));
        file
    }

    #[test]
    fn test_cache_save_load() {
        let temp = TempDir::new().unwrap();
        let mut cache = Cache::default();
        cache.update(PathBuf::from("/acme/app/autoload.php"), 12345, 67890, file_index());
        cache.save(temp.path()).unwrap();

        let loaded = Cache::load(temp.path()).unwrap();
        assert_eq!(loaded.len(), 1);

        let file = loaded
            .get_if_valid(Path::new("/acme/app/autoload.php"), 12345, 67890)
            .unwrap();
        assert_eq!(file.index.references[0].name, "src");
        assert_eq!(file.positions, vec![(1, 1)]);
    }

    #[test]
    fn test_get_if_valid() {
        let mut cache = Cache::default();
        let path = PathBuf::from("test.php");
        cache.update(path.clone(), 12345, 67890, FileIndex::default());

        assert!(cache.get_if_valid(&path, 12345, 67890).is_some());
        assert!(cache.get_if_valid(&path, 99999, 67890).is_none());
        assert!(cache.get_if_valid(&path, 12345, 99999).is_none());
        assert!(cache.get_if_valid(Path::new("other.php"), 12345, 67890).is_none());
    }

    #[test]
    fn test_invalidate_and_prune() {
        let temp = TempDir::new().unwrap();
        let existing = temp.path().join("kept.php");
        fs::write(&existing, "<?php").unwrap();

        let mut cache = Cache::default();
        cache.update(existing.clone(), 1, 1, FileIndex::default());
        cache.update(temp.path().join("gone.php"), 2, 2, FileIndex::default());
        cache.update(temp.path().join("changed.php"), 3, 3, FileIndex::default());

        cache.invalidate(&temp.path().join("changed.php"));
        assert_eq!(cache.len(), 2);

        cache.prune();
        assert_eq!(cache.len(), 1);
        assert!(cache.entries.contains_key(&existing));
    }

    #[test]
    fn test_settings_hash_tracks_project_files() {
        let temp = TempDir::new().unwrap();
        let config = IndexerConfig::default();
        let services = vec![PathBuf::from("services.yml")];

        let before = hash_settings(&config, temp.path(), &services);
        assert_eq!(before, hash_settings(&config, temp.path(), &services));

        fs::write(temp.path().join("composer.json"), r#"{"require": {}}"#).unwrap();
        let with_composer = hash_settings(&config, temp.path(), &services);
        assert_ne!(before, with_composer);

        fs::write(temp.path().join("services.yml"), "services: {}").unwrap();
        assert_ne!(with_composer, hash_settings(&config, temp.path(), &services));

        let other = IndexerConfig {
            kernel_class: "Kernel".to_string(),
            ..IndexerConfig::default()
        };
        assert_ne!(
            hash_settings(&config, temp.path(), &services),
            hash_settings(&other, temp.path(), &services)
        );
    }

    #[test]
    fn test_load_nonexistent() {
        let temp = TempDir::new().unwrap();
        assert!(Cache::load(temp.path()).unwrap().is_empty());
    }

    #[test]
    fn test_version_mismatch() {
        let temp = TempDir::new().unwrap();
        let old_cache = serde_json::json!({ "version": 999, "entries": {} });
        fs::write(temp.path().join(CACHE_FILE), old_cache.to_string()).unwrap();

        let cache = Cache::load(temp.path()).unwrap();
        assert!(cache.is_empty());
        assert_eq!(cache.version, CACHE_VERSION);
    }

    #[test]
    fn test_clear_cache() {
        let temp = TempDir::new().unwrap();
        Cache::default().save(temp.path()).unwrap();
        assert!(temp.path().join(CACHE_FILE).exists());

        clear_cache(temp.path()).unwrap();
        assert!(!temp.path().join(CACHE_FILE).exists());
    }
}
