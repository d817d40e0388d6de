//! Project configuration read from `tsconfig.json`.
//!
//! Only the keys stylebind needs are read: `include`, `exclude`, `extends`,
//! `compilerOptions.baseUrl`, `compilerOptions.paths` and `cmkOptions`.
//! Wrong value types in `cmkOptions` become project diagnostics. JSON syntax
//! errors are left for the TypeScript compiler to report; the file is then
//! treated as empty.

use crate::diagnostic::Diagnostic;
use crate::error::Error;
use crate::paths::{find_tsconfig, join_normalized, normalize};
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Include spec used when `include` is absent.
pub const DEFAULT_INCLUDE_SPEC: &str = "**/*";

/// `cmkOptions.dtsOutDir` when absent.
pub const DEFAULT_DTS_OUT_DIR: &str = "generated";

/// `compilerOptions.paths`, with substitutions relative to `base`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMappings {
    /// Directory the substitutions are resolved against: `baseUrl` if set,
    /// otherwise the directory of the config that declared `paths`.
    pub base: PathBuf,
    pub entries: Vec<(String, Vec<String>)>,
}

/// The part of `compilerOptions` the resolver uses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilerOptions {
    /// Absolute `baseUrl`.
    pub base_url: Option<PathBuf>,
    pub paths: Option<PathMappings>,
}

/// A directory to watch for new files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WildcardDirectory {
    pub path: PathBuf,
    pub recursive: bool,
}

/// Normalized project configuration.
///
/// Paths are absolute and every option has its default filled in.
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    /// Absolute path of the tsconfig file.
    pub config_file_name: PathBuf,
    /// Root for relative entries and for the layout under `dts_out_dir`.
    pub base_path: PathBuf,
    /// Absolute include globs.
    pub includes: Vec<String>,
    /// Absolute exclude globs.
    pub excludes: Vec<String>,
    pub dts_out_dir: PathBuf,
    pub arbitrary_extensions: bool,
    pub named_exports: bool,
    /// Read for config compatibility only. It steers import completions in
    /// editors, which this crate does not provide.
    pub prioritize_named_imports: bool,
    /// Whether `@keyframes` names become tokens.
    pub keyframes: bool,
    pub compiler_options: CompilerOptions,
    pub wildcard_directories: Vec<WildcardDirectory>,
    /// Diagnostics found while reading the config, base configs first.
    pub diagnostics: Vec<Diagnostic>,
}

impl ProjectConfig {
    /// Configuration with every option at its default, rooted at `base_path`.
    #[must_use]
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        let base_path = normalize(&base_path.into());
        normalize_config(
            RawConfig::default(),
            CompilerOptions::default(),
            base_path.join(crate::paths::TSCONFIG_FILE_NAME),
            base_path,
            Vec::new(),
        )
    }
}

/// Find and read the project config.
///
/// `project` is either a directory (searched upwards for `tsconfig.json`) or
/// the path of a config file.
pub fn load_project_config(project: &Path) -> Result<ProjectConfig, Error> {
    let config_file_name = find_tsconfig(project).ok_or_else(|| Error::TsConfigNotFound {
        start: project.to_path_buf(),
    })?;
    let base_path = config_file_name
        .parent()
        .map_or_else(|| PathBuf::from("/"), Path::to_path_buf);

    let mut visiting = Vec::new();
    let parsed = read_tsconfig_file(&config_file_name, &mut visiting)?;

    debug!(
        config = %config_file_name.display(),
        diagnostics = parsed.diagnostics.len(),
        "Loaded project config"
    );

    let compiler_options = parsed.compiler_options.finish();
    Ok(normalize_config(
        parsed.config,
        compiler_options,
        config_file_name,
        base_path,
        parsed.diagnostics,
    ))
}

/// Options as written, before defaults are applied.
#[derive(Debug, Clone, Default)]
struct RawConfig {
    includes: Option<Vec<String>>,
    excludes: Option<Vec<String>>,
    dts_out_dir: Option<String>,
    arbitrary_extensions: Option<bool>,
    named_exports: Option<bool>,
    prioritize_named_imports: Option<bool>,
    keyframes: Option<bool>,
}

impl RawConfig {
    fn merge(mut self, overrides: Self) -> Self {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if overrides.$field.is_some() { self.$field = overrides.$field; })*
            };
        }
        take!(
            includes,
            excludes,
            dts_out_dir,
            arbitrary_extensions,
            named_exports,
            prioritize_named_imports,
            keyframes
        );
        self
    }
}

/// `compilerOptions` as written, with relative paths already anchored to the
/// declaring config's directory.
#[derive(Debug, Clone, Default)]
struct RawCompilerOptions {
    base_url: Option<PathBuf>,
    paths: Option<(PathBuf, Vec<(String, Vec<String>)>)>,
}

impl RawCompilerOptions {
    fn merge(mut self, overrides: Self) -> Self {
        if overrides.base_url.is_some() {
            self.base_url = overrides.base_url;
        }
        if overrides.paths.is_some() {
            self.paths = overrides.paths;
        }
        self
    }

    fn finish(self) -> CompilerOptions {
        let paths = self.paths.map(|(declared_in, entries)| PathMappings {
            base: self.base_url.clone().unwrap_or(declared_in),
            entries,
        });
        CompilerOptions {
            base_url: self.base_url,
            paths,
        }
    }
}

#[derive(Debug, Default)]
struct ParsedRawData {
    config: RawConfig,
    compiler_options: RawCompilerOptions,
    diagnostics: Vec<Diagnostic>,
}

impl ParsedRawData {
    fn merge(mut self, overrides: Self) -> Self {
        self.config = self.config.merge(overrides.config);
        self.compiler_options = self.compiler_options.merge(overrides.compiler_options);
        self.diagnostics.extend(overrides.diagnostics);
        self
    }
}

/// Read one config file and everything it extends.
fn read_tsconfig_file(path: &Path, visiting: &mut Vec<PathBuf>) -> Result<ParsedRawData, Error> {
    if visiting.iter().any(|p| p == path) {
        debug!(config = %path.display(), "Skipping circular extends");
        return Ok(ParsedRawData::default());
    }
    visiting.push(path.to_path_buf());

    let text = stylebind_util::fs::read_to_string_lossy(path).map_err(|source| {
        Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        }
    })?;

    let raw = match serde_json::from_str::<Value>(&strip_json_comments(&text)) {
        Ok(value) => value,
        Err(e) => {
            debug!(config = %path.display(), error = %e, "Ignoring tsconfig syntax error");
            Value::Null
        }
    };

    let own = parse_raw_data(&raw, path);

    let mut merged = ParsedRawData::default();
    for base in extends_entries(&raw) {
        let Some(base_path) = resolve_extends(&base, path) else {
            debug!(config = %path.display(), extends = %base, "Extended config not found");
            continue;
        };
        match read_tsconfig_file(&base_path, visiting) {
            Ok(base) => merged = merged.merge(base),
            Err(Error::ConfigRead { source, .. }) if source.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
    }

    visiting.pop();
    Ok(merged.merge(own))
}

fn parse_raw_data(raw: &Value, config_file_name: &Path) -> ParsedRawData {
    let mut result = ParsedRawData::default();
    let Some(raw) = raw.as_object() else {
        return result;
    };
    let config_dir = config_file_name.parent().unwrap_or(Path::new("/"));

    // Non-string entries are reported by tsc, not here.
    if let Some(Value::Array(include)) = raw.get("include") {
        result.config.includes = Some(string_entries(include));
    }
    if let Some(Value::Array(exclude)) = raw.get("exclude") {
        result.config.excludes = Some(string_entries(exclude));
    }

    if let Some(Value::Object(options)) = raw.get("compilerOptions") {
        if let Some(Value::String(base_url)) = options.get("baseUrl") {
            result.compiler_options.base_url = Some(join_normalized(config_dir, base_url));
        }
        if let Some(Value::Object(paths)) = options.get("paths") {
            let entries = paths
                .iter()
                .filter_map(|(key, value)| {
                    let Value::Array(substitutions) = value else {
                        return None;
                    };
                    Some((key.clone(), string_entries(substitutions)))
                })
                .collect();
            result.compiler_options.paths = Some((config_dir.to_path_buf(), entries));
        }
    }

    if let Some(Value::Object(cmk)) = raw.get("cmkOptions") {
        let mut invalid = |option: &str, ty: &str| {
            result.diagnostics.push(Diagnostic::project(format!(
                "`{option}` in {} must be a {ty}.",
                config_file_name.display()
            )));
        };

        if let Some(value) = cmk.get("dtsOutDir") {
            match value {
                Value::String(s) => result.config.dts_out_dir = Some(s.clone()),
                _ => invalid("dtsOutDir", "string"),
            }
        }

        let mut read_bool = |option: &str, slot: &mut Option<bool>| {
            if let Some(value) = cmk.get(option) {
                match value {
                    Value::Bool(b) => *slot = Some(*b),
                    _ => invalid(option, "boolean"),
                }
            }
        };
        read_bool("arbitraryExtensions", &mut result.config.arbitrary_extensions);
        read_bool("namedExports", &mut result.config.named_exports);
        read_bool(
            "prioritizeNamedImports",
            &mut result.config.prioritize_named_imports,
        );
        read_bool("keyframes", &mut result.config.keyframes);
    }

    result
}

fn string_entries(values: &[Value]) -> Vec<String> {
    values
        .iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect()
}

fn extends_entries(raw: &Value) -> Vec<String> {
    match raw.get("extends") {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Array(entries)) => string_entries(entries),
        _ => Vec::new(),
    }
}

/// Locate an `extends` target the way tsc does: relative and absolute paths
/// from the extending config, anything else as a package in `node_modules`.
fn resolve_extends(spec: &str, from: &Path) -> Option<PathBuf> {
    let config_dir = from.parent()?;

    let with_json = |candidate: PathBuf| -> Option<PathBuf> {
        if candidate.is_file() {
            return Some(candidate);
        }
        if !candidate.extension().is_some_and(|ext| ext == "json") {
            let mut name = candidate.clone().into_os_string();
            name.push(".json");
            let candidate = PathBuf::from(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        None
    };

    if spec.starts_with("./") || spec.starts_with("../") || Path::new(spec).is_absolute() {
        return with_json(join_normalized(config_dir, spec));
    }

    let mut dir = Some(config_dir);
    while let Some(current) = dir {
        let candidate = current.join("node_modules").join(spec);
        if candidate.is_dir() {
            let nested = candidate.join(crate::paths::TSCONFIG_FILE_NAME);
            if nested.is_file() {
                return Some(nested);
            }
        } else if let Some(found) = with_json(candidate) {
            return Some(found);
        }
        dir = current.parent();
    }
    None
}

fn normalize_config(
    config: RawConfig,
    compiler_options: CompilerOptions,
    config_file_name: PathBuf,
    base_path: PathBuf,
    diagnostics: Vec<Diagnostic>,
) -> ProjectConfig {
    let to_glob = |spec: &String| {
        join_normalized(&base_path, spec)
            .to_string_lossy()
            .replace('\\', "/")
    };

    let include_specs = config
        .includes
        .unwrap_or_else(|| vec![DEFAULT_INCLUDE_SPEC.to_string()]);
    let includes: Vec<String> = include_specs.iter().map(to_glob).collect();
    let excludes = config.excludes.unwrap_or_default().iter().map(to_glob).collect();
    let wildcard_directories = includes.iter().map(|i| wildcard_directory(i)).collect();

    ProjectConfig {
        dts_out_dir: join_normalized(
            &base_path,
            config.dts_out_dir.as_deref().unwrap_or(DEFAULT_DTS_OUT_DIR),
        ),
        arbitrary_extensions: config.arbitrary_extensions.unwrap_or(false),
        named_exports: config.named_exports.unwrap_or(false),
        prioritize_named_imports: config.prioritize_named_imports.unwrap_or(false),
        keyframes: config.keyframes.unwrap_or(true),
        includes,
        excludes,
        compiler_options,
        wildcard_directories,
        config_file_name,
        base_path,
        diagnostics,
    }
}

fn has_wildcard(segment: &str) -> bool {
    segment.contains(['*', '?'])
}

/// The directory an include glob can match under, and whether matches can
/// be nested below it.
pub(crate) fn wildcard_directory(include: &str) -> WildcardDirectory {
    let segments: Vec<&str> = include.split('/').collect();
    let Some(first_wild) = segments.iter().position(|s| has_wildcard(s)) else {
        // A plain path names a directory whose whole subtree is included.
        return WildcardDirectory {
            path: PathBuf::from(include),
            recursive: true,
        };
    };

    let dir = segments[..first_wild].join("/");
    let rest = &segments[first_wild..];
    let recursive = rest.len() > 1 || rest.iter().any(|s| s.contains("**"));

    WildcardDirectory {
        path: if dir.is_empty() {
            PathBuf::from("/")
        } else {
            PathBuf::from(dir)
        },
        recursive,
    }
}

/// Remove `//` and `/* */` comments and trailing commas from JSON text.
///
/// String contents are kept untouched.
#[must_use]
pub fn strip_json_comments(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    let mut last = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'"' => {
                i += 1;
                while i < bytes.len() && bytes[i] != b'"' {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
                i += 1;
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                out.push_str(&text[last..i]);
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
                last = i;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                out.push_str(&text[last..i]);
                i += 2;
                while i < bytes.len() && !(bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/')) {
                    i += 1;
                }
                i = (i + 2).min(bytes.len());
                last = i;
                out.push(' ');
            }
            _ => i += 1,
        }
    }
    out.push_str(&text[last.min(text.len())..]);

    remove_trailing_commas(&out)
}

fn remove_trailing_commas(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            out.push(c);
            continue;
        }

        if c == '"' {
            in_string = true;
        } else if c == ',' {
            let next = bytes[i + 1..]
                .iter()
                .find(|b| !b.is_ascii_whitespace())
                .copied();
            if matches!(next, Some(b'}' | b']')) {
                continue;
            }
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn root(dir: &tempfile::TempDir) -> PathBuf {
        normalize(dir.path())
    }

    fn join(dir: &tempfile::TempDir, rel: &str) -> String {
        root(dir).join(rel).to_string_lossy().into_owned()
    }

    #[test]
    fn test_defaults_for_empty_tsconfig() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("tsconfig.json"), "{}").unwrap();

        let config = load_project_config(dir.path()).unwrap();
        assert_eq!(config.config_file_name, root(&dir).join("tsconfig.json"));
        assert_eq!(config.base_path, root(&dir));
        assert_eq!(config.includes, vec![join(&dir, "**/*")]);
        assert!(config.excludes.is_empty());
        assert_eq!(config.dts_out_dir, root(&dir).join("generated"));
        assert!(!config.arbitrary_extensions);
        assert!(!config.named_exports);
        assert!(!config.prioritize_named_imports);
        assert!(config.keyframes);
        assert!(config.diagnostics.is_empty());
        assert_eq!(
            config.wildcard_directories,
            vec![WildcardDirectory {
                path: root(&dir),
                recursive: true
            }]
        );
    }

    #[test]
    fn test_missing_tsconfig_is_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("tsconfig.json"), "{}").unwrap();

        let err = load_project_config(&dir.path().join("unknown")).unwrap_err();
        assert!(matches!(err, Error::TsConfigNotFound { .. }));
    }

    #[test]
    fn test_values_override_defaults() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("tsconfig.json"),
            r#"{
                // comments are allowed
                "include": ["src"],
                "exclude": ["src/test"],
                "compilerOptions": { "baseUrl": ".", "paths": { "@/*": ["./src/*"] } },
                "cmkOptions": {
                    "dtsOutDir": "generated/cmk",
                    "arbitraryExtensions": true,
                    "namedExports": true,
                    "prioritizeNamedImports": true,
                    "keyframes": false,
                },
            }"#,
        )
        .unwrap();

        let config = load_project_config(dir.path()).unwrap();
        assert_eq!(config.includes, vec![join(&dir, "src")]);
        assert_eq!(config.excludes, vec![join(&dir, "src/test")]);
        assert_eq!(config.dts_out_dir, root(&dir).join("generated/cmk"));
        assert!(config.arbitrary_extensions);
        assert!(config.named_exports);
        assert!(config.prioritize_named_imports);
        assert!(!config.keyframes);
        assert_eq!(config.compiler_options.base_url, Some(root(&dir)));

        let paths = config.compiler_options.paths.unwrap();
        assert_eq!(paths.base, root(&dir));
        assert_eq!(
            paths.entries,
            vec![("@/*".to_string(), vec!["./src/*".to_string()])]
        );
    }

    #[test]
    fn test_extends_chain_and_override() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("tsconfig.base1.json"),
            r#"{ "include": ["src1"], "cmkOptions": { "dtsOutDir": "generated1" } }"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("tsconfig.base2.json"),
            r#"{ "extends": "./tsconfig.base1.json", "cmkOptions": { "dtsOutDir": "generated2" } }"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("tsconfig.json"),
            r#"{ "extends": "./tsconfig.base2.json", }"#,
        )
        .unwrap();

        let config = load_project_config(dir.path()).unwrap();
        assert_eq!(config.includes, vec![join(&dir, "src1")]);
        assert_eq!(config.dts_out_dir, root(&dir).join("generated2"));
    }

    #[test]
    fn test_extends_array_and_missing_entries() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("tsconfig.base.json"),
            r#"{ "extends": "./un-existing.json", "cmkOptions": { "dtsOutDir": "generated/cmk" } }"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("tsconfig.json"),
            r#"{
                "extends": ["./tsconfig.base.json", "./un-existing.json"],
                "cmkOptions": { "arbitraryExtensions": true }
            }"#,
        )
        .unwrap();

        let config = load_project_config(dir.path()).unwrap();
        assert_eq!(config.dts_out_dir, root(&dir).join("generated/cmk"));
        assert!(config.arbitrary_extensions);
    }

    #[test]
    fn test_extends_from_package() {
        let dir = tempdir().unwrap();
        let pkg = dir.path().join("node_modules/some-pkg");
        fs::create_dir_all(&pkg).unwrap();
        fs::write(
            pkg.join("tsconfig.json"),
            r#"{ "cmkOptions": { "dtsOutDir": "generated/cmk" } }"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("tsconfig.json"),
            r#"{ "extends": "some-pkg/tsconfig.json" }"#,
        )
        .unwrap();

        let config = load_project_config(dir.path()).unwrap();
        assert_eq!(config.dts_out_dir, root(&dir).join("generated/cmk"));
    }

    #[test]
    fn test_circular_extends_terminates() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("tsconfig.json"),
            r#"{ "extends": "./tsconfig.other.json" }"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("tsconfig.other.json"),
            r#"{ "extends": "./tsconfig.json", "cmkOptions": { "namedExports": true } }"#,
        )
        .unwrap();

        let config = load_project_config(dir.path()).unwrap();
        assert!(config.named_exports);
    }

    #[test]
    fn test_wrong_types_become_diagnostics() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("tsconfig.base.json"),
            r#"{ "cmkOptions": { "dtsOutDir": 1 } }"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("tsconfig.json"),
            r#"{
                "extends": "./tsconfig.base.json",
                "include": ["src", 1],
                "cmkOptions": { "arbitraryExtensions": 1 }
            }"#,
        )
        .unwrap();

        let config = load_project_config(dir.path()).unwrap();
        assert_eq!(config.includes, vec![join(&dir, "src")]);
        assert_eq!(config.dts_out_dir, root(&dir).join("generated"));

        let texts: Vec<&str> = config.diagnostics.iter().map(|d| d.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                format!(
                    "`dtsOutDir` in {} must be a string.",
                    root(&dir).join("tsconfig.base.json").display()
                ),
                format!(
                    "`arbitraryExtensions` in {} must be a boolean.",
                    root(&dir).join("tsconfig.json").display()
                ),
            ]
        );
        assert!(config.diagnostics.iter().all(|d| d.path().is_none()));
    }

    #[test]
    fn test_syntax_error_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("tsconfig.json"), r#"{ "include": ["src"] "#).unwrap();

        let config = load_project_config(dir.path()).unwrap();
        assert_eq!(config.includes, vec![join(&dir, "**/*")]);
        assert!(config.diagnostics.is_empty());
    }

    #[test]
    fn test_paths_without_base_url_use_config_dir() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("configs")).unwrap();
        fs::write(
            dir.path().join("configs/tsconfig.base.json"),
            r#"{ "compilerOptions": { "paths": { "@/*": ["../src/*"] } } }"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("tsconfig.json"),
            r#"{ "extends": "./configs/tsconfig.base.json" }"#,
        )
        .unwrap();

        let config = load_project_config(dir.path()).unwrap();
        let paths = config.compiler_options.paths.unwrap();
        assert_eq!(paths.base, root(&dir).join("configs"));
        assert!(config.compiler_options.base_url.is_none());
    }

    #[test]
    fn test_wildcard_directories() {
        assert_eq!(
            wildcard_directory("/app/src1"),
            WildcardDirectory {
                path: PathBuf::from("/app/src1"),
                recursive: true
            }
        );
        assert_eq!(
            wildcard_directory("/app/src2/**/*"),
            WildcardDirectory {
                path: PathBuf::from("/app/src2"),
                recursive: true
            }
        );
        assert_eq!(
            wildcard_directory("/app/src3/*"),
            WildcardDirectory {
                path: PathBuf::from("/app/src3"),
                recursive: false
            }
        );
    }

    #[test]
    fn test_strip_json_comments_keeps_strings() {
        let text = r#"{ "a": "// not a comment", /* block */ "b": [1, 2,], }"#;
        let value: Value = serde_json::from_str(&strip_json_comments(text)).unwrap();
        assert_eq!(value["a"], "// not a comment");
        assert_eq!(value["b"], serde_json::json!([1, 2]));
    }

    #[test]
    fn test_with_base_path_defaults() {
        let config = ProjectConfig::with_base_path("/app");
        assert_eq!(config.includes, vec!["/app/**/*".to_string()]);
        assert_eq!(config.dts_out_dir, PathBuf::from("/app/generated"));
        assert_eq!(config.config_file_name, PathBuf::from("/app/tsconfig.json"));
    }
}
