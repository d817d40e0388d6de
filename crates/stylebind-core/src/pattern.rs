//! Decides which files belong to the project.

use crate::config::ProjectConfig;
use crate::paths::normalize;
use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Suffix every managed file has.
pub const CSS_MODULE_SUFFIX: &str = ".module.css";

/// Directories skipped while expanding wildcard includes.
const SKIPPED_DIRECTORIES: &[&str] = &["node_modules", "bower_components", "jspm_packages"];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Membership test for the managed file set.
#[derive(Debug, Clone)]
pub struct MatchesPattern {
    includes: Vec<Pattern>,
    excludes: Vec<Pattern>,
    out_dir: PathBuf,
    roots: Vec<PathBuf>,
}

impl MatchesPattern {
    /// Compile the include/exclude globs of `config`.
    ///
    /// Globs that fail to compile are dropped with a debug log; tsc reports them.
    #[must_use]
    pub fn new(config: &ProjectConfig) -> Self {
        let includes = config
            .includes
            .iter()
            .filter_map(|spec| compile(&include_glob(spec)))
            .collect();
        let excludes = config
            .excludes
            .iter()
            .flat_map(|spec| [compile(spec), compile(&format!("{}/**/*", spec.trim_end_matches('/')))])
            .flatten()
            .collect();
        let roots = config
            .wildcard_directories
            .iter()
            .map(|d| d.path.clone())
            .collect();

        Self {
            includes,
            excludes,
            out_dir: config.dts_out_dir.clone(),
            roots,
        }
    }

    /// Whether `path` is a managed CSS module.
    #[must_use]
    pub fn matches(&self, path: &Path) -> bool {
        let Some(name) = path.to_str() else {
            return false;
        };
        if !name.ends_with(CSS_MODULE_SUFFIX) || path.starts_with(&self.out_dir) {
            return false;
        }
        // Must agree with `find_files`, which never descends into these.
        if path
            .components()
            .any(|c| SKIPPED_DIRECTORIES.iter().any(|d| c.as_os_str() == *d))
        {
            return false;
        }
        self.includes.iter().any(|p| p.matches_with(name, MATCH_OPTIONS))
            && !self.excludes.iter().any(|p| p.matches_with(name, MATCH_OPTIONS))
    }

    /// Every managed file on disk, sorted by path.
    #[must_use]
    pub fn find_files(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();

        for root in &self.roots {
            for entry in WalkDir::new(root)
                .follow_links(true)
                .into_iter()
                .filter_entry(|e| {
                    if e.depth() == 0 || !e.file_type().is_dir() {
                        return true;
                    }
                    let name = e.file_name().to_string_lossy();
                    !SKIPPED_DIRECTORIES.contains(&name.as_ref()) && e.path() != self.out_dir
                })
            {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        debug!(root = %root.display(), error = %e, "Skipping unreadable entry");
                        continue;
                    }
                };

                if entry.file_type().is_file() {
                    let path = normalize(entry.path());
                    if self.matches(&path) {
                        files.push(path);
                    }
                }
            }
        }

        files.sort();
        files.dedup();
        files
    }
}

/// A plain path names a directory, so it includes everything below it.
fn include_glob(spec: &str) -> String {
    let last = spec.rsplit('/').next().unwrap_or(spec);
    if last.contains(['*', '?']) || last.contains('.') {
        spec.to_string()
    } else {
        format!("{}/**/*", spec.trim_end_matches('/'))
    }
}

fn compile(spec: &str) -> Option<Pattern> {
    match Pattern::new(spec) {
        Ok(pattern) => Some(pattern),
        Err(e) => {
            debug!(pattern = spec, error = %e, "Ignoring invalid glob");
            None
        }
    }
}
