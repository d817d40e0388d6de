//! Module resolver for CSS module specifiers.
//!
//! Resolution follows the TypeScript compiler: relative specifiers,
//! `compilerOptions.paths`, `compilerOptions.baseUrl`, package.json `imports`
//! for `#` specifiers, and `node_modules` packages with `exports` / `main`.
//! A declaration stub `X.d.css.ts` or `X.css.d.ts` counts as present whenever
//! `X.css` is, and a stub hit is reported as the `.css` file itself.
//!
//! Results are memoized per `(specifier, request)` until [`Resolver::clear_cache`].

mod exports;
mod package_json;

pub use exports::{resolve_exports, resolve_imports, CONDITIONS};

use crate::config::{CompilerOptions, PathMappings};
use crate::paths::normalize;
use package_json::PackageJsonCache;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use tracing::{debug, trace};
use url::Url;

/// Extensions appended to a candidate path before giving up on it.
pub const PROBE_EXTENSIONS: &[&str] = &[".ts", ".tsx", ".d.ts"];

/// Declaration stub suffixes that stand in for a `.css` file.
const STUB_SUFFIXES: &[&str] = &[".d.css.ts", ".css.d.ts"];

/// Per-call resolution options.
#[derive(Debug, Clone, Copy)]
pub struct ResolveOptions<'a> {
    /// Absolute path of the importing file.
    pub request: &'a Path,
}

/// Resolves import specifiers to absolute paths.
#[derive(Debug, Default)]
pub struct Resolver {
    compiler_options: CompilerOptions,
    cache: RwLock<HashMap<(String, PathBuf), Option<PathBuf>>>,
    package_json: PackageJsonCache,
}

impl Resolver {
    #[must_use]
    pub fn new(compiler_options: CompilerOptions) -> Self {
        Self {
            compiler_options,
            ..Self::default()
        }
    }

    /// Resolve `specifier` as imported from `options.request`.
    ///
    /// Returns `None` when nothing matches. Never fails.
    pub fn resolve(&self, specifier: &str, options: &ResolveOptions<'_>) -> Option<PathBuf> {
        let key = (specifier.to_string(), options.request.to_path_buf());
        if let Some(cached) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return cached.clone();
        }

        let resolved = self.resolve_uncached(specifier, options.request);
        trace!(
            specifier,
            request = %options.request.display(),
            resolved = ?resolved,
            "Resolved specifier"
        );

        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, resolved.clone());
        resolved
    }

    /// Drop every memoized resolution.
    pub fn clear_cache(&self) {
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        if !cache.is_empty() {
            debug!(entries = cache.len(), "Clearing resolution cache");
        }
        cache.clear();
    }

    fn resolve_uncached(&self, specifier: &str, request: &Path) -> Option<PathBuf> {
        if specifier.is_empty() {
            return None;
        }

        if Path::new(specifier).is_absolute() {
            return Some(normalize(Path::new(specifier)));
        }

        if is_url_specifier(specifier) {
            return None;
        }

        let dir = request.parent().unwrap_or(Path::new("/"));

        if is_relative(specifier) {
            return probe(&normalize(&dir.join(specifier)))
                .or_else(|| resolve_as_url(specifier, request));
        }

        if let Some(mappings) = &self.compiler_options.paths {
            for candidate in path_mapping_candidates(mappings, specifier) {
                if let Some(found) = probe(&candidate) {
                    return Some(found);
                }
            }
        }

        if let Some(base_url) = &self.compiler_options.base_url {
            if let Some(found) = probe(&normalize(&base_url.join(specifier))) {
                return Some(found);
            }
        }

        if specifier.starts_with('#') {
            return self.resolve_hash_import(specifier, dir);
        }

        self.resolve_bare(specifier, dir)
    }

    fn resolve_hash_import(&self, specifier: &str, dir: &Path) -> Option<PathBuf> {
        let (pkg_dir, pkg_json) = self.package_json.find_nearest(dir)?;
        let target = resolve_imports(&pkg_json, specifier)?;
        probe(&normalize(&pkg_dir.join(&target)))
    }

    fn resolve_bare(&self, specifier: &str, dir: &Path) -> Option<PathBuf> {
        let (pkg_name, subpath) = parse_bare_specifier(specifier);

        let mut current = Some(dir);
        while let Some(d) = current {
            let pkg_dir = d.join("node_modules").join(pkg_name);
            if pkg_dir.is_dir() {
                if let Some(found) = self.resolve_in_package(&pkg_dir, subpath) {
                    return Some(found);
                }
            }
            current = d.parent();
        }
        None
    }

    fn resolve_in_package(&self, pkg_dir: &Path, subpath: Option<&str>) -> Option<PathBuf> {
        let pkg_json = self.package_json.get(&pkg_dir.join("package.json"));

        if let Some(pkg_json) = pkg_json.as_deref() {
            if pkg_json.get("exports").is_some() {
                let exports_subpath = subpath.map(|s| format!("./{s}"));
                let target = resolve_exports(pkg_json, exports_subpath.as_deref())?;
                return probe(&normalize(&pkg_dir.join(&target)));
            }
        }

        match subpath {
            Some(sub) => probe(&normalize(&pkg_dir.join(sub))),
            None => {
                let main = pkg_json
                    .as_deref()
                    .and_then(|v| v.get("main"))
                    .and_then(serde_json::Value::as_str);
                if let Some(found) = main.and_then(|m| probe(&normalize(&pkg_dir.join(m)))) {
                    return Some(found);
                }
                ["index.module.css", "index.css"]
                    .iter()
                    .find_map(|index| probe(&pkg_dir.join(index)))
            }
        }
    }
}

/// Whether `specifier` is a URL such as `https://...` or `data:...`.
#[must_use]
pub fn is_url_specifier(specifier: &str) -> bool {
    Url::parse(specifier).is_ok()
}

fn is_relative(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
}

/// Check one candidate path against the stub-aware view of the filesystem.
fn probe(path: &Path) -> Option<PathBuf> {
    let name = path.to_str()?;

    if let Some(stem) = STUB_SUFFIXES.iter().find_map(|suffix| name.strip_suffix(suffix)) {
        let source = PathBuf::from(format!("{stem}.css"));
        return source.is_file().then_some(source);
    }

    if path.is_file() {
        return Some(path.to_path_buf());
    }

    PROBE_EXTENSIONS.iter().find_map(|ext| {
        let candidate = PathBuf::from(format!("{name}{ext}"));
        candidate.is_file().then_some(candidate)
    })
}

/// Resolve a relative specifier with URL semantics against the real location
/// of the importing file.
fn resolve_as_url(specifier: &str, request: &Path) -> Option<PathBuf> {
    let real = dunce::canonicalize(request).unwrap_or_else(|_| request.to_path_buf());
    let base = Url::from_file_path(&real).ok()?;
    let joined = base.join(specifier).ok()?;
    let path = joined.to_file_path().ok()?;
    path.is_file().then_some(path)
}

/// Candidate paths from `compilerOptions.paths`, in substitution order.
///
/// An exact key wins; otherwise the pattern with the longest prefix before
/// its `*`.
fn path_mapping_candidates(mappings: &PathMappings, specifier: &str) -> Vec<PathBuf> {
    let mut matched: Option<(&[String], &str, usize)> = None;

    for (pattern, substitutions) in &mappings.entries {
        if pattern == specifier {
            matched = Some((substitutions, "", usize::MAX));
            break;
        }
        let Some((prefix, suffix)) = pattern.split_once('*') else {
            continue;
        };
        if suffix.contains('*')
            || !specifier.starts_with(prefix)
            || !specifier.ends_with(suffix)
            || specifier.len() < prefix.len() + suffix.len()
        {
            continue;
        }
        if matched.is_some_and(|(_, _, len)| len >= prefix.len()) {
            continue;
        }
        let star = &specifier[prefix.len()..specifier.len() - suffix.len()];
        matched = Some((substitutions, star, prefix.len()));
    }

    let Some((substitutions, star, _)) = matched else {
        return Vec::new();
    };
    substitutions
        .iter()
        .map(|s| normalize(&mappings.base.join(s.replacen('*', star, 1))))
        .collect()
}

/// Split `@scope/pkg/sub` into `("@scope/pkg", Some("sub"))`.
fn parse_bare_specifier(spec: &str) -> (&str, Option<&str>) {
    let split_at = if spec.starts_with('@') {
        spec.match_indices('/').nth(1).map(|(i, _)| i)
    } else {
        spec.find('/')
    };

    match split_at {
        Some(i) => (&spec[..i], Some(&spec[i + 1..])),
        None => (spec, None),
    }
}
