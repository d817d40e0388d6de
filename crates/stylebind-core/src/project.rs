//! The incremental project cache.
//!
//! A [`Project`] owns every cache the engine has: parsed modules, semantic
//! diagnostics, memoized resolutions and export records. Mutations go
//! through `&mut self`, so only one is ever in flight and no locks are
//! needed. Any add/update/remove clears all derived caches: a new file can
//! change which path-alias candidate wins anywhere in the project, and any
//! module's export set can flow transitively into any other.

use crate::checker::{check_css_module, CheckerArgs};
use crate::config::ProjectConfig;
use crate::diagnostic::Diagnostic;
use crate::emit::{DtsEmitter, Emitter, OutputWriter};
use crate::error::Error;
use crate::export_builder::{ExportBuilder, ExportBuilderHost};
use crate::module::CssModule;
use crate::parser::{CssModuleParser, ModuleParser};
use crate::paths::dts_output_path;
use crate::pattern::MatchesPattern;
use crate::resolver::{ResolveOptions, Resolver};
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Reported when the include/exclude patterns match no file.
pub const NO_FILES_MESSAGE: &str = "The file specified in tsconfig.json not found.";

/// One analyzed project.
pub struct Project {
    config: ProjectConfig,
    resolver: Resolver,
    matches_pattern: MatchesPattern,
    export_builder: ExportBuilder,
    /// Parsed modules by absolute path.
    parse_cache: BTreeMap<PathBuf, CssModule>,
    /// Semantic diagnostics by absolute path, filled lazily.
    check_cache: HashMap<PathBuf, Vec<Diagnostic>>,
    parser: Box<dyn ModuleParser>,
    emitter: Box<dyn Emitter>,
}

impl std::fmt::Debug for Project {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Project")
            .field("config", &self.config.config_file_name)
            .field("modules", &self.parse_cache.len())
            .field("checked", &self.check_cache.len())
            .finish_non_exhaustive()
    }
}

/// The collaborators the export builder and checker see.
struct Host<'a> {
    resolver: &'a Resolver,
    matches_pattern: &'a MatchesPattern,
    parse_cache: &'a BTreeMap<PathBuf, CssModule>,
}

impl ExportBuilderHost for Host<'_> {
    fn resolve(&self, specifier: &str, options: &ResolveOptions<'_>) -> Option<PathBuf> {
        self.resolver.resolve(specifier, options)
    }

    fn matches_pattern(&self, path: &Path) -> bool {
        self.matches_pattern.matches(path)
    }

    fn get_module(&self, path: &Path) -> Option<&CssModule> {
        self.parse_cache.get(path)
    }
}

impl Project {
    /// Create a project with the built-in parser and emitter.
    ///
    /// # Errors
    /// Returns [`Error::ReadModule`] if a matched file cannot be read.
    pub fn new(config: ProjectConfig) -> Result<Self, Error> {
        let parser = Box::new(CssModuleParser::from_config(&config));
        let emitter = Box::new(DtsEmitter::from_config(&config));
        Self::with_collaborators(config, parser, emitter)
    }

    /// Create a project with a custom parser and emitter.
    ///
    /// Every file matching the configuration is read and parsed. Files that
    /// disappear between listing and reading are skipped.
    ///
    /// # Errors
    /// Returns [`Error::ReadModule`] if a matched file cannot be read.
    pub fn with_collaborators(
        config: ProjectConfig,
        parser: Box<dyn ModuleParser>,
        emitter: Box<dyn Emitter>,
    ) -> Result<Self, Error> {
        let matches_pattern = MatchesPattern::new(&config);
        let resolver = Resolver::new(config.compiler_options.clone());

        let mut project = Self {
            config,
            resolver,
            matches_pattern,
            export_builder: ExportBuilder::new(),
            parse_cache: BTreeMap::new(),
            check_cache: HashMap::new(),
            parser,
            emitter,
        };

        for path in project.matches_pattern.find_files() {
            if let Some(module) = project.read_and_parse(&path)? {
                project.parse_cache.insert(path, module);
            }
        }

        debug!(
            config = %project.config.config_file_name.display(),
            modules = project.parse_cache.len(),
            "Created project"
        );
        Ok(project)
    }

    #[must_use]
    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    /// Whether `path` belongs to the managed file set.
    #[must_use]
    pub fn is_managed(&self, path: &Path) -> bool {
        self.matches_pattern.matches(path)
    }

    #[must_use]
    pub fn get_module(&self, path: &Path) -> Option<&CssModule> {
        self.parse_cache.get(path)
    }

    /// Loaded modules, sorted by path.
    pub fn modules(&self) -> impl Iterator<Item = &CssModule> {
        self.parse_cache.values()
    }

    /// Resolve `specifier` exactly as the checker does.
    #[must_use]
    pub fn resolve(&self, specifier: &str, request: &Path) -> Option<PathBuf> {
        self.resolver.resolve(specifier, &ResolveOptions { request })
    }

    /// Read and parse a new file.
    ///
    /// # Errors
    /// Returns [`Error::ReadModule`] for read failures other than the file
    /// not existing.
    pub fn add_file(&mut self, path: &Path) -> Result<(), Error> {
        self.load_file(path)
    }

    /// Re-read and re-parse a changed file.
    ///
    /// # Errors
    /// Returns [`Error::ReadModule`] for read failures other than the file
    /// not existing.
    pub fn update_file(&mut self, path: &Path) -> Result<(), Error> {
        self.load_file(path)
    }

    /// Forget a deleted file.
    pub fn remove_file(&mut self, path: &Path) {
        self.parse_cache.remove(path);
        self.invalidate(path);
    }

    fn load_file(&mut self, path: &Path) -> Result<(), Error> {
        // A file that is already gone will be followed by a remove event.
        let Some(module) = self.read_and_parse(path)? else {
            return Ok(());
        };
        self.parse_cache.insert(path.to_path_buf(), module);
        self.invalidate(path);
        Ok(())
    }

    /// Blocking read so a later `remove_file` can never race an in-flight read.
    fn read_and_parse(&self, path: &Path) -> Result<Option<CssModule>, Error> {
        match stylebind_util::fs::read_to_string_lossy(path) {
            Ok(text) => Ok(Some(self.parser.parse(&text, path))),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "Skipping vanished file");
                Ok(None)
            }
            Err(source) => Err(Error::ReadModule {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    fn invalidate(&mut self, changed: &Path) {
        debug!(path = %changed.display(), "Invalidating project caches");
        self.resolver.clear_cache();
        self.export_builder.clear_cache();
        self.check_cache.clear();
    }

    /// Configuration-level diagnostics.
    #[must_use]
    pub fn project_diagnostics(&self) -> Vec<Diagnostic> {
        let mut diagnostics = self.config.diagnostics.clone();
        if self.parse_cache.is_empty() {
            diagnostics.push(Diagnostic::project(NO_FILES_MESSAGE));
        }
        diagnostics
    }

    /// Parser diagnostics of every module, in path order.
    #[must_use]
    pub fn syntactic_diagnostics(&self) -> Vec<Diagnostic> {
        self.parse_cache
            .values()
            .flat_map(|m| m.diagnostics.iter().cloned())
            .collect()
    }

    /// All diagnostics of the project.
    ///
    /// Project and syntactic diagnostics come first. If there are any,
    /// semantic checking is skipped for the whole project, since it assumes a
    /// syntactically sound module graph.
    ///
    /// # Errors
    /// Returns [`Error::ModuleNotFound`] if the resolver and the parse cache
    /// disagree about a module.
    pub fn get_diagnostics(&mut self) -> Result<Vec<Diagnostic>, Error> {
        let mut diagnostics = self.project_diagnostics();
        diagnostics.extend(self.syntactic_diagnostics());
        if !diagnostics.is_empty() {
            debug!(
                count = diagnostics.len(),
                "Skipping semantic checks due to project or syntactic diagnostics"
            );
            return Ok(diagnostics);
        }

        diagnostics.extend(self.semantic_diagnostics()?);
        Ok(diagnostics)
    }

    fn semantic_diagnostics(&mut self) -> Result<Vec<Diagnostic>, Error> {
        let host = Host {
            resolver: &self.resolver,
            matches_pattern: &self.matches_pattern,
            parse_cache: &self.parse_cache,
        };

        let mut diagnostics = Vec::new();
        for (path, module) in &self.parse_cache {
            if let Some(cached) = self.check_cache.get(path) {
                diagnostics.extend(cached.iter().cloned());
                continue;
            }

            trace!(path = %path.display(), "Checking module");
            let checked = check_css_module(
                module,
                &mut CheckerArgs {
                    config: &self.config,
                    export_builder: &mut self.export_builder,
                    host: &host,
                },
            )?;
            diagnostics.extend(checked.iter().cloned());
            self.check_cache.insert(path.clone(), checked);
        }
        Ok(diagnostics)
    }

    /// Where the declaration file for `module_path` goes.
    #[must_use]
    pub fn output_path(&self, module_path: &Path) -> PathBuf {
        dts_output_path(
            module_path,
            &self.config.base_path,
            &self.config.dts_out_dir,
            self.config.arbitrary_extensions,
        )
    }

    /// Generate and write a declaration file for every module.
    ///
    /// Files are written in parallel. One failed write does not stop the
    /// others.
    ///
    /// # Errors
    /// Returns [`Error::EmitOutputs`] listing every failed write.
    pub fn emit_outputs(&self, writer: &dyn OutputWriter) -> Result<(), Error> {
        let failures: Vec<Error> = self
            .parse_cache
            .par_iter()
            .filter_map(|(path, module)| {
                let output_path = self.output_path(path);
                let output = self.emitter.emit(module);
                writer
                    .write(&output_path, &output.text)
                    .err()
                    .map(|source| Error::WriteOutput {
                        path: output_path,
                        source,
                    })
            })
            .collect();

        debug!(
            written = self.parse_cache.len() - failures.len(),
            failed = failures.len(),
            "Emitted declaration files"
        );

        if failures.is_empty() {
            Ok(())
        } else {
            Err(Error::EmitOutputs { failures })
        }
    }
}
