//! Load-once dataset cache.
//!
//! Datasets are memoized per fill policy and keyed on the identity of the
//! source file (canonical path, size, modification time). When the key changes
//! the file is re-read and the cached `Arc<Dataset>` is replaced as a whole:
//! holders of the previous `Arc` keep a complete, unchanged dataset.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::SystemTime;

use tracing::{debug, info};

use crate::domain::{Dataset, FillPolicy};
use crate::error::LoadError;
use crate::io::ingest;

/// Identity of a source file at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceKey {
    path: PathBuf,
    len: u64,
    modified: Option<SystemTime>,
}

impl SourceKey {
    pub fn probe(path: &Path) -> Result<Self, LoadError> {
        let meta = std::fs::metadata(path).map_err(|source| LoadError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let canonical = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        Ok(Self {
            path: canonical,
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }
}

#[derive(Debug)]
struct Entry {
    key: SourceKey,
    dataset: Arc<Dataset>,
}

#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: RwLock<HashMap<FillPolicy, Entry>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached dataset for `path`, loading it if absent or stale.
    ///
    /// A failed reload leaves the previous entry untouched.
    pub fn get_or_load(&self, path: &Path, policy: FillPolicy) -> Result<Arc<Dataset>, LoadError> {
        let key = SourceKey::probe(path)?;

        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(entry) = entries.get(&policy) {
                if entry.key == key {
                    debug!(path = %path.display(), ?policy, "dataset cache hit");
                    return Ok(Arc::clone(&entry.dataset));
                }
            }
        }

        info!(path = %path.display(), ?policy, "dataset cache miss; loading");
        let dataset = Arc::new(ingest::load(path, policy)?);

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(
            policy,
            Entry {
                key,
                dataset: Arc::clone(&dataset),
            },
        );
        Ok(dataset)
    }

    /// Drop every cached dataset.
    pub fn invalidate(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const HEADER: &str = "location,date,new_cases,new_deaths,total_cases,total_deaths\n";

    #[test]
    fn unchanged_file_is_served_from_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        fs::write(&path, format!("{HEADER}US,2021-01-01,1,0,1,0\n")).unwrap();

        let cache = DatasetCache::new();
        let a = cache.get_or_load(&path, FillPolicy::Core).unwrap();
        let b = cache.get_or_load(&path, FillPolicy::Core).unwrap();
        assert!(Arc::ptr_eq(&a, &b));

        // Policies are cached separately.
        let c = cache.get_or_load(&path, FillPolicy::Extended).unwrap();
        assert!(!Arc::ptr_eq(&a, &c));
    }

    #[test]
    fn changed_file_swaps_whole_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        fs::write(&path, format!("{HEADER}US,2021-01-01,1,0,1,0\n")).unwrap();

        let cache = DatasetCache::new();
        let before = cache.get_or_load(&path, FillPolicy::Core).unwrap();

        fs::write(
            &path,
            format!("{HEADER}US,2021-01-01,1,0,1,0\nUS,2021-01-02,2,0,3,0\n"),
        )
        .unwrap();
        let after = cache.get_or_load(&path, FillPolicy::Core).unwrap();

        assert_eq!(before.len(), 1);
        assert_eq!(after.len(), 2);
    }

    #[test]
    fn failed_reload_keeps_previous_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        fs::write(&path, format!("{HEADER}US,2021-01-01,1,0,1,0\n")).unwrap();

        let cache = DatasetCache::new();
        let first = cache.get_or_load(&path, FillPolicy::Core).unwrap();

        fs::write(&path, format!("{HEADER}US,bad,1,0,1,0\n")).unwrap();
        assert!(cache.get_or_load(&path, FillPolicy::Core).is_err());

        let entries = cache.entries.read().unwrap();
        assert!(Arc::ptr_eq(&entries[&FillPolicy::Core].dataset, &first));
    }

    #[test]
    fn invalidate_forces_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        fs::write(&path, format!("{HEADER}US,2021-01-01,1,0,1,0\n")).unwrap();

        let cache = DatasetCache::new();
        let a = cache.get_or_load(&path, FillPolicy::Core).unwrap();
        cache.invalidate();
        let b = cache.get_or_load(&path, FillPolicy::Core).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(*a, *b);
    }
}
