//! Semantic checks for one CSS module.
//!
//! Diagnostics come out in source order: local tokens first, then importers
//! in declaration order. Every diagnostic points into the checked module.

use crate::config::ProjectConfig;
use crate::diagnostic::Diagnostic;
use crate::error::Error;
use crate::export_builder::{ExportBuilder, ExportBuilderHost};
use crate::module::{CssModule, Location, TokenImporter};
use crate::resolver::{is_url_specifier, ResolveOptions};
use unicode_xid::UnicodeXID;

/// Collaborators of [`check_css_module`].
pub struct CheckerArgs<'a> {
    /// Supplies the naming policy (`namedExports`).
    pub config: &'a ProjectConfig,
    pub export_builder: &'a mut ExportBuilder,
    pub host: &'a dyn ExportBuilderHost,
}

/// Why a token name is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenNameViolation {
    /// Not usable as a JavaScript identifier (named exports only).
    InvalidJsIdentifier,
    /// `__proto__` would clobber the styles object's prototype.
    ProtoNotAllowed,
    /// `default` collides with the default export (named exports only).
    DefaultNotAllowed,
    /// Backslashes do not survive into the generated property key.
    BackslashNotAllowed,
}

impl TokenNameViolation {
    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            Self::InvalidJsIdentifier => {
                "stylebind does not support invalid names as JavaScript identifiers."
            }
            Self::ProtoNotAllowed => "`__proto__` is not allowed as names.",
            Self::DefaultNotAllowed => {
                "`default` is not allowed as names when `cmkOptions.namedExports` is enabled."
            }
            Self::BackslashNotAllowed => {
                "Backslash (\\) is not allowed in names when `cmkOptions.namedExports` is disabled."
            }
        }
    }
}

/// Check `name` against the naming policy.
#[must_use]
pub fn validate_token_name(name: &str, named_exports: bool) -> Option<TokenNameViolation> {
    if name == "__proto__" {
        return Some(TokenNameViolation::ProtoNotAllowed);
    }
    if named_exports {
        if name == "default" {
            return Some(TokenNameViolation::DefaultNotAllowed);
        }
        if !is_js_identifier(name) {
            return Some(TokenNameViolation::InvalidJsIdentifier);
        }
    } else if name.contains('\\') {
        return Some(TokenNameViolation::BackslashNotAllowed);
    }
    None
}

/// `[$_\p{ID_Start}][$\u{200c}\u{200d}\p{ID_Continue}]*`
#[must_use]
pub fn is_js_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first == '$' || first == '_' || first.is_xid_start())
        && chars.all(|c| matches!(c, '$' | '\u{200c}' | '\u{200d}') || c.is_xid_continue())
}

/// Produce the semantic diagnostics of `module`.
///
/// # Errors
/// Returns [`Error::ModuleNotFound`] when an import resolves into the managed
/// set but the target is not loaded; that means the resolver and the parse
/// cache disagree, which is never the user's fault.
pub fn check_css_module(
    module: &CssModule,
    args: &mut CheckerArgs<'_>,
) -> Result<Vec<Diagnostic>, Error> {
    let named_exports = args.config.named_exports;
    let host = args.host;
    let mut diagnostics = Vec::new();
    let check_name = |diagnostics: &mut Vec<Diagnostic>, name: &str, loc: Location| {
        if let Some(violation) = validate_token_name(name, named_exports) {
            diagnostics.push(Diagnostic::at(violation.message(), &module.path, loc));
        }
    };

    for token in &module.local_tokens {
        check_name(&mut diagnostics, &token.name, token.loc);
    }

    let options = ResolveOptions {
        request: &module.path,
    };
    for importer in &module.token_importers {
        let from = importer.from();
        if is_url_specifier(from) {
            continue;
        }

        let Some(resolved) = host.resolve(from, &options) else {
            diagnostics.push(Diagnostic::at(
                format!("Cannot import module '{from}'"),
                &module.path,
                importer.from_loc(),
            ));
            continue;
        };
        if !host.matches_pattern(&resolved) {
            continue;
        }
        let imported = host
            .get_module(&resolved)
            .ok_or_else(|| Error::ModuleNotFound {
                path: resolved.clone(),
                request: module.path.clone(),
            })?;

        let TokenImporter::Value(value_importer) = importer else {
            continue;
        };
        let record = args.export_builder.build(imported, host);
        for value in &value_importer.values {
            if !record.contains(&value.name) {
                diagnostics.push(Diagnostic::at(
                    format!("Module '{from}' has no exported token '{}'.", value.name),
                    &module.path,
                    value.loc,
                ));
            }
            check_name(&mut diagnostics, &value.name, value.loc);
            if let (Some(local_name), Some(local_loc)) = (&value.local_name, value.local_loc) {
                check_name(&mut diagnostics, local_name, local_loc);
            }
        }
    }

    Ok(diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export_builder::tests::{import, module, value, MemoryHost};
    use crate::module::{Position, Token};
    use std::path::{Path, PathBuf};

    fn check(host: &MemoryHost, name: &str, named_exports: bool) -> Result<Vec<Diagnostic>, Error> {
        let mut config = ProjectConfig::with_base_path("/src");
        config.named_exports = named_exports;
        let mut export_builder = ExportBuilder::new();
        let module = &host.modules[&Path::new("/src").join(name)];
        check_css_module(
            module,
            &mut CheckerArgs {
                config: &config,
                export_builder: &mut export_builder,
                host,
            },
        )
    }

    fn texts(diagnostics: &[Diagnostic]) -> Vec<&str> {
        diagnostics.iter().map(|d| d.text.as_str()).collect()
    }

    fn at(line: u32, column: u32, offset: usize, len: usize) -> Location {
        Location::new(
            Position::new(line, column, offset),
            Position::new(line, column + len as u32, offset + len),
        )
    }

    #[test]
    fn test_validate_token_name() {
        assert_eq!(
            validate_token_name("__proto__", false),
            Some(TokenNameViolation::ProtoNotAllowed)
        );
        assert_eq!(
            validate_token_name("__proto__", true),
            Some(TokenNameViolation::ProtoNotAllowed)
        );
        assert_eq!(validate_token_name("default", false), None);
        assert_eq!(
            validate_token_name("default", true),
            Some(TokenNameViolation::DefaultNotAllowed)
        );
        assert_eq!(validate_token_name("a-1", false), None);
        assert_eq!(
            validate_token_name("a-1", true),
            Some(TokenNameViolation::InvalidJsIdentifier)
        );
        assert_eq!(
            validate_token_name("a\\:b", false),
            Some(TokenNameViolation::BackslashNotAllowed)
        );
        assert_eq!(validate_token_name("$ok_ä1", true), None);
    }

    #[test]
    fn test_is_js_identifier() {
        assert!(is_js_identifier("a"));
        assert!(is_js_identifier("_a1"));
        assert!(is_js_identifier("$"));
        assert!(is_js_identifier("a\u{200c}"));
        assert!(is_js_identifier("a\u{200d}b"));
        assert!(!is_js_identifier(""));
        assert!(!is_js_identifier("1a"));
        assert!(!is_js_identifier("a-b"));
    }

    #[test]
    fn test_valid_module_has_no_diagnostics() {
        let mut host = MemoryHost::default();
        host.insert(module("b.module.css", &["b_1"], vec![]));
        host.insert(module(
            "a.module.css",
            &["a_1"],
            vec![import("./b.module.css"), value("./b.module.css", &[("b_1", Some("x"))])],
        ));

        assert!(check(&host, "a.module.css", true).unwrap().is_empty());
    }

    #[test]
    fn test_cannot_import_missing_module() {
        let mut host = MemoryHost::default();
        let mut a = module("a.module.css", &[], vec![]);
        a.token_importers.push(TokenImporter::Value(crate::module::AtValueTokenImporter {
            values: vec![crate::module::AtValueImport {
                name: "y".to_string(),
                loc: at(1, 8, 7, 1),
                local_name: None,
                local_loc: None,
            }],
            from: "missing".to_string(),
            from_loc: at(1, 15, 14, 7),
        }));
        host.insert(a);

        let diagnostics = check(&host, "a.module.css", false).unwrap();
        assert_eq!(texts(&diagnostics), vec!["Cannot import module 'missing'"]);
        assert_eq!(diagnostics[0].start.unwrap().column, 15);
        assert_eq!(diagnostics[0].length, Some(7));
        assert_eq!(diagnostics[0].path(), Some(Path::new("/src/a.module.css")));
    }

    #[test]
    fn test_missing_exported_token() {
        let mut host = MemoryHost::default();
        host.insert(module("b.module.css", &["p"], vec![]));
        host.insert(module(
            "a.module.css",
            &[],
            vec![value("./b.module.css", &[("q", None), ("p", None)])],
        ));

        let diagnostics = check(&host, "a.module.css", false).unwrap();
        assert_eq!(
            texts(&diagnostics),
            vec!["Module './b.module.css' has no exported token 'q'."]
        );
    }

    #[test]
    fn test_named_import_sees_transitive_exports() {
        let mut host = MemoryHost::default();
        host.insert(module("c.module.css", &["c"], vec![]));
        host.insert(module("b.module.css", &[], vec![import("./c.module.css")]));
        host.insert(module(
            "a.module.css",
            &[],
            vec![value("./b.module.css", &[("c", None)])],
        ));

        assert!(check(&host, "a.module.css", false).unwrap().is_empty());
    }

    #[test]
    fn test_urls_and_unmanaged_targets_are_skipped() {
        let mut host = MemoryHost::default();
        host.insert(module(
            "a.module.css",
            &[],
            vec![
                import("https://example.com/a.module.css"),
                value("https://example.com/a.module.css", &[("x", None)]),
                import("./plain.css"),
                value("./plain.css", &[("x", None)]),
            ],
        ));

        assert!(check(&host, "a.module.css", false).unwrap().is_empty());
    }

    #[test]
    fn test_unloaded_managed_target_is_internal_error() {
        let mut host = MemoryHost::default();
        host.insert(module("a.module.css", &[], vec![import("./gone.module.css")]));

        let err = check(&host, "a.module.css", false).unwrap_err();
        match err {
            Error::ModuleNotFound { path, request } => {
                assert_eq!(path, PathBuf::from("/src/gone.module.css"));
                assert_eq!(request, PathBuf::from("/src/a.module.css"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_naming_diagnostics_in_source_order() {
        let mut host = MemoryHost::default();
        host.insert(module("b.module.css", &["c-c", "d-d"], vec![]));
        let mut a = module(
            "a.module.css",
            &[],
            vec![value("./b.module.css", &[("c-c", None), ("d-d", None)])],
        );
        a.local_tokens = vec![
            Token {
                loc: at(1, 2, 1, 3),
                ..crate::export_builder::tests::token("a-a")
            },
            Token {
                loc: at(2, 2, 10, 3),
                ..crate::export_builder::tests::token("b-b")
            },
        ];
        host.insert(a);

        let diagnostics = check(&host, "a.module.css", true).unwrap();
        assert_eq!(diagnostics.len(), 4);
        assert!(diagnostics
            .iter()
            .all(|d| d.text == TokenNameViolation::InvalidJsIdentifier.message()));
        let lines: Vec<u32> = diagnostics.iter().map(|d| d.start.unwrap().line).collect();
        assert_eq!(&lines[..2], &[1, 2]);

        // Without named exports, dashes are fine.
        assert!(check(&host, "a.module.css", false).unwrap().is_empty());
    }

    #[test]
    fn test_local_rename_is_validated_separately() {
        let mut host = MemoryHost::default();
        host.insert(module("b.module.css", &["b"], vec![]));
        host.insert(module(
            "a.module.css",
            &["__proto__"],
            vec![value("./b.module.css", &[("missing", Some("default"))])],
        ));

        let diagnostics = check(&host, "a.module.css", true).unwrap();
        assert_eq!(
            texts(&diagnostics),
            vec![
                TokenNameViolation::ProtoNotAllowed.message(),
                "Module './b.module.css' has no exported token 'missing'.",
                TokenNameViolation::DefaultNotAllowed.message(),
            ]
        );
    }
}
