//! CSS module data model.
//!
//! A [`CssModule`] is immutable once parsed. Edits produce a new instance
//! that replaces the old one in the project's parse cache.

use crate::diagnostic::Diagnostic;
use serde::Serialize;
use std::path::PathBuf;

/// A position in a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Position {
    /// 1-based line.
    pub line: u32,
    /// 1-based column.
    pub column: u32,
    /// 0-based byte offset.
    pub offset: usize,
}

impl Position {
    #[must_use]
    pub fn new(line: u32, column: u32, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }
}

/// A source range. `start` is inclusive, `end` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Location {
    pub start: Position,
    pub end: Position,
}

impl Location {
    #[must_use]
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Length of the range in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end.offset.saturating_sub(self.start.offset)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An identifier a module defines and exposes to importers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub name: String,
    pub loc: Location,
    /// The whole declaration (rule, `@value`, `@keyframes`) that introduced the token.
    pub declaration_loc: Option<Location>,
}

/// `@import '...'`: imports every token visible from the target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AtImportTokenImporter {
    /// Unresolved, unquoted specifier.
    pub from: String,
    /// Location of the specifier, excluding quotes.
    pub from_loc: Location,
}

/// `@value a, b as c from '...'`: imports the listed names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AtValueTokenImporter {
    pub values: Vec<AtValueImport>,
    pub from: String,
    pub from_loc: Location,
}

/// One name imported by an `@value ... from` statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AtValueImport {
    /// Name in the origin module.
    pub name: String,
    pub loc: Location,
    /// Local rename (`a as b` has `local_name = Some("b")`).
    pub local_name: Option<String>,
    pub local_loc: Option<Location>,
}

impl AtValueImport {
    /// The name this import is bound to in the importing module.
    #[must_use]
    pub fn binding_name(&self) -> &str {
        self.local_name.as_deref().unwrap_or(&self.name)
    }
}

/// A declaration pulling tokens from another module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TokenImporter {
    Import(AtImportTokenImporter),
    Value(AtValueTokenImporter),
}

impl TokenImporter {
    /// The unresolved specifier.
    #[must_use]
    pub fn from(&self) -> &str {
        match self {
            Self::Import(i) => &i.from,
            Self::Value(v) => &v.from,
        }
    }

    /// Location of the specifier.
    #[must_use]
    pub fn from_loc(&self) -> Location {
        match self {
            Self::Import(i) => i.from_loc,
            Self::Value(v) => v.from_loc,
        }
    }
}

/// One parsed CSS module file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssModule {
    /// Absolute path.
    pub path: PathBuf,
    pub text: String,
    /// Tokens in definition order. Duplicate names are kept.
    pub local_tokens: Vec<Token>,
    /// Importers in source order.
    pub token_importers: Vec<TokenImporter>,
    /// Syntactic diagnostics reported by the parser.
    pub diagnostics: Vec<Diagnostic>,
}

impl CssModule {
    /// A module with no tokens, importers, or diagnostics.
    #[must_use]
    pub fn empty(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
            local_tokens: Vec::new(),
            token_importers: Vec::new(),
            diagnostics: Vec::new(),
        }
    }
}
