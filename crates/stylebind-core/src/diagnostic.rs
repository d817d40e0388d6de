//! Diagnostics: user-authorable problems, returned as data.

use crate::module::Location;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Diagnostic severity. Only errors are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticCategory {
    #[default]
    Error,
}

impl DiagnosticCategory {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 1-based line/column of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DiagnosticPosition {
    pub line: u32,
    pub column: u32,
}

/// The file a diagnostic points into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticFile {
    pub path: PathBuf,
}

/// A problem in user-authored input.
///
/// Project diagnostics have no `file`. Syntactic and semantic diagnostics
/// always have a `file` and a `start`, and the file is the one whose content
/// is wrong.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub text: String,
    pub category: DiagnosticCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<DiagnosticFile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<DiagnosticPosition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
}

impl Diagnostic {
    /// A configuration-level diagnostic with no location.
    #[must_use]
    pub fn project(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            category: DiagnosticCategory::Error,
            file: None,
            start: None,
            length: None,
        }
    }

    /// A diagnostic spanning `loc` in `path`.
    #[must_use]
    pub fn at(text: impl Into<String>, path: &Path, loc: Location) -> Self {
        Self {
            text: text.into(),
            category: DiagnosticCategory::Error,
            file: Some(DiagnosticFile {
                path: path.to_path_buf(),
            }),
            start: Some(DiagnosticPosition {
                line: loc.start.line,
                column: loc.start.column,
            }),
            length: Some(loc.len()),
        }
    }

    /// A diagnostic at an explicit line/column with a length.
    #[must_use]
    pub fn at_position(
        text: impl Into<String>,
        path: &Path,
        start: DiagnosticPosition,
        length: usize,
    ) -> Self {
        Self {
            text: text.into(),
            category: DiagnosticCategory::Error,
            file: Some(DiagnosticFile {
                path: path.to_path_buf(),
            }),
            start: Some(start),
            length: Some(length),
        }
    }

    /// Path of the file this diagnostic points into, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.file.as_ref().map(|f| f.path.as_path())
    }
}
