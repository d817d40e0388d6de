//! Parsed package.json files, reused across resolutions.
//!
//! An entry is reused only while the file's mtime and size are unchanged, so
//! the cache survives [`super::Resolver::clear_cache`].

use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::SystemTime;

/// File metadata used to detect edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Stamp {
    modified: Option<SystemTime>,
    size: u64,
}

impl Stamp {
    fn of(path: &Path) -> Option<Self> {
        let meta = path.metadata().ok()?;
        Some(Self {
            modified: meta.modified().ok(),
            size: meta.len(),
        })
    }
}

#[derive(Debug)]
struct Entry {
    stamp: Stamp,
    value: Option<Arc<Value>>,
}

#[derive(Debug, Default)]
pub(crate) struct PackageJsonCache {
    entries: RwLock<HashMap<PathBuf, Entry>>,
}

impl PackageJsonCache {
    /// Parsed contents of `path`, or `None` if it is missing or not JSON.
    pub(crate) fn get(&self, path: &Path) -> Option<Arc<Value>> {
        let stamp = Stamp::of(path)?;

        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(entry) = entries.get(path) {
                if entry.stamp == stamp {
                    return entry.value.clone();
                }
            }
        }

        let value = std::fs::read_to_string(path)
            .ok()
            .and_then(|text| serde_json::from_str::<Value>(&text).ok())
            .map(Arc::new);

        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                path.to_path_buf(),
                Entry {
                    stamp,
                    value: value.clone(),
                },
            );
        value
    }

    /// Nearest `package.json` at or above `dir`, with its directory.
    pub(crate) fn find_nearest(&self, dir: &Path) -> Option<(PathBuf, Arc<Value>)> {
        let mut current = Some(dir);
        while let Some(d) = current {
            let candidate = d.join("package.json");
            if candidate.is_file() {
                return self.get(&candidate).map(|v| (d.to_path_buf(), v));
            }
            current = d.parent();
        }
        None
    }
}
