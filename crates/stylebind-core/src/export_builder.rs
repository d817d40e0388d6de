//! Flattened export records for CSS modules.
//!
//! The record of a module lists every token name visible to an importer: its
//! own local tokens, then for each importer in source order either the
//! target's whole record (`@import`) or the requested names (`@value ... from`).
//! Records are memoized per path. Any edit anywhere can change any record, so
//! the cache is only ever dropped wholesale.

use crate::module::{CssModule, TokenImporter};
use crate::resolver::ResolveOptions;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// What the builder needs from its owner.
pub trait ExportBuilderHost {
    /// Resolve `specifier` as imported from `options.request`.
    fn resolve(&self, specifier: &str, options: &ResolveOptions<'_>) -> Option<PathBuf>;

    /// Whether `path` is in the managed file set.
    fn matches_pattern(&self, path: &Path) -> bool;

    /// The parsed module at `path`, if loaded.
    fn get_module(&self, path: &Path) -> Option<&CssModule>;
}

/// Token names visible when importing a module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportRecord {
    /// Own tokens first, then imported ones in source order. Not de-duplicated.
    pub all_tokens: Vec<String>,
}

impl ExportRecord {
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.all_tokens.iter().any(|t| t == name)
    }
}

/// Memoizing builder of [`ExportRecord`]s.
#[derive(Debug, Default)]
pub struct ExportBuilder {
    cache: HashMap<PathBuf, Arc<ExportRecord>>,
}

impl ExportBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build (or fetch) the export record of `module`.
    ///
    /// Import cycles terminate: the edge that closes a cycle sees an empty
    /// record for the module still being built.
    pub fn build(&mut self, module: &CssModule, host: &dyn ExportBuilderHost) -> Arc<ExportRecord> {
        if let Some(cached) = self.cache.get(&module.path) {
            return Arc::clone(cached);
        }

        // Placeholder first, so a cycle back to this module stops here.
        self.cache
            .insert(module.path.clone(), Arc::new(ExportRecord::default()));

        let mut all_tokens: Vec<String> = module
            .local_tokens
            .iter()
            .map(|t| t.name.clone())
            .collect();

        let options = ResolveOptions {
            request: &module.path,
        };
        for importer in &module.token_importers {
            let Some(from) = host.resolve(importer.from(), &options) else {
                continue;
            };
            if !host.matches_pattern(&from) {
                continue;
            }
            let Some(imported) = host.get_module(&from) else {
                continue;
            };

            match importer {
                TokenImporter::Import(_) => {
                    let record = self.build(imported, host);
                    all_tokens.extend(record.all_tokens.iter().cloned());
                }
                TokenImporter::Value(value) => {
                    all_tokens.extend(value.values.iter().map(|v| v.name.clone()));
                }
            }
        }

        let record = Arc::new(ExportRecord { all_tokens });
        self.cache.insert(module.path.clone(), Arc::clone(&record));
        record
    }

    /// Drop every memoized record.
    pub fn clear_cache(&mut self) {
        if !self.cache.is_empty() {
            debug!(entries = self.cache.len(), "Clearing export record cache");
        }
        self.cache.clear();
    }

    /// Number of memoized records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::module::{
        AtImportTokenImporter, AtValueImport, AtValueTokenImporter, Location, Token,
    };
    use std::collections::BTreeMap;

    /// In-memory host: relative specifiers resolve by name within `/src`.
    #[derive(Default)]
    pub(crate) struct MemoryHost {
        pub(crate) modules: BTreeMap<PathBuf, CssModule>,
    }

    impl MemoryHost {
        pub(crate) fn insert(&mut self, module: CssModule) {
            self.modules.insert(module.path.clone(), module);
        }
    }

    impl ExportBuilderHost for MemoryHost {
        fn resolve(&self, specifier: &str, options: &ResolveOptions<'_>) -> Option<PathBuf> {
            let name = specifier.strip_prefix("./")?;
            let dir = options.request.parent()?;
            let path = dir.join(name);
            (self.modules.contains_key(&path) || name.ends_with(".css")).then_some(path)
        }

        fn matches_pattern(&self, path: &Path) -> bool {
            path.to_string_lossy().ends_with(".module.css")
        }

        fn get_module(&self, path: &Path) -> Option<&CssModule> {
            self.modules.get(path)
        }
    }

    pub(crate) fn token(name: &str) -> Token {
        Token {
            name: name.to_string(),
            loc: Location::default(),
            declaration_loc: None,
        }
    }

    pub(crate) fn import(from: &str) -> TokenImporter {
        TokenImporter::Import(AtImportTokenImporter {
            from: from.to_string(),
            from_loc: Location::default(),
        })
    }

    pub(crate) fn value(from: &str, names: &[(&str, Option<&str>)]) -> TokenImporter {
        TokenImporter::Value(AtValueTokenImporter {
            values: names
                .iter()
                .map(|(name, local)| AtValueImport {
                    name: (*name).to_string(),
                    loc: Location::default(),
                    local_name: local.map(str::to_string),
                    local_loc: local.map(|_| Location::default()),
                })
                .collect(),
            from: from.to_string(),
            from_loc: Location::default(),
        })
    }

    pub(crate) fn module(name: &str, tokens: &[&str], importers: Vec<TokenImporter>) -> CssModule {
        CssModule {
            local_tokens: tokens.iter().map(|t| token(t)).collect(),
            token_importers: importers,
            ..CssModule::empty(Path::new("/src").join(name), "")
        }
    }

    fn build(host: &MemoryHost, builder: &mut ExportBuilder, name: &str) -> Vec<String> {
        let module = &host.modules[&Path::new("/src").join(name)];
        builder.build(module, host).all_tokens.clone()
    }

    #[test]
    fn test_wildcard_import_flattens_target() {
        let mut host = MemoryHost::default();
        host.insert(module("b.module.css", &["x"], vec![]));
        host.insert(module("a.module.css", &[], vec![import("./b.module.css")]));

        let mut builder = ExportBuilder::new();
        assert_eq!(build(&host, &mut builder, "a.module.css"), vec!["x"]);
    }

    #[test]
    fn test_order_own_tokens_then_importers() {
        let mut host = MemoryHost::default();
        host.insert(module("b.module.css", &["b_1", "b_2"], vec![]));
        host.insert(module("c.module.css", &["c_1", "c_2"], vec![]));
        host.insert(module(
            "a.module.css",
            &["a_1", "a_1"],
            vec![
                value("./c.module.css", &[("c_2", Some("renamed"))]),
                import("./b.module.css"),
            ],
        ));

        let mut builder = ExportBuilder::new();
        assert_eq!(
            build(&host, &mut builder, "a.module.css"),
            vec!["a_1", "a_1", "c_2", "b_1", "b_2"]
        );
    }

    #[test]
    fn test_transitive_wildcard_imports() {
        let mut host = MemoryHost::default();
        host.insert(module("c.module.css", &["c"], vec![]));
        host.insert(module("b.module.css", &["b"], vec![import("./c.module.css")]));
        host.insert(module("a.module.css", &["a"], vec![import("./b.module.css")]));

        let mut builder = ExportBuilder::new();
        assert_eq!(build(&host, &mut builder, "a.module.css"), vec!["a", "b", "c"]);
        assert_eq!(builder.len(), 3);
    }

    #[test]
    fn test_skips_unresolved_unmanaged_and_unloaded() {
        let mut host = MemoryHost::default();
        host.insert(module(
            "a.module.css",
            &["a"],
            vec![
                import("https://example.com/x.module.css"),
                import("./plain.css"),
                import("./not-loaded.module.css"),
                value("./plain.css", &[("p", None)]),
            ],
        ));

        let mut builder = ExportBuilder::new();
        assert_eq!(build(&host, &mut builder, "a.module.css"), vec!["a"]);
    }

    #[test]
    fn test_mutual_wildcard_cycle_terminates() {
        let mut host = MemoryHost::default();
        host.insert(module("a.module.css", &["a"], vec![import("./b.module.css")]));
        host.insert(module("b.module.css", &["b"], vec![import("./a.module.css")]));

        let mut builder = ExportBuilder::new();
        let a = build(&host, &mut builder, "a.module.css");
        assert_eq!(a, vec!["a", "b"]);

        // `b` was completed while `a` was still a placeholder.
        let b = build(&host, &mut builder, "b.module.css");
        assert_eq!(b, vec!["b"]);
    }

    #[test]
    fn test_self_import_terminates() {
        let mut host = MemoryHost::default();
        host.insert(module("a.module.css", &["a"], vec![import("./a.module.css")]));

        let mut builder = ExportBuilder::new();
        assert_eq!(build(&host, &mut builder, "a.module.css"), vec!["a"]);
    }

    #[test]
    fn test_cached_until_cleared() {
        let mut host = MemoryHost::default();
        host.insert(module("b.module.css", &["x"], vec![]));
        host.insert(module("a.module.css", &[], vec![import("./b.module.css")]));

        let mut builder = ExportBuilder::new();
        assert_eq!(build(&host, &mut builder, "a.module.css"), vec!["x"]);

        host.insert(module("b.module.css", &["y"], vec![]));
        assert_eq!(build(&host, &mut builder, "a.module.css"), vec!["x"]);

        builder.clear_cache();
        assert!(builder.is_empty());
        assert_eq!(build(&host, &mut builder, "a.module.css"), vec!["y"]);
    }
}
