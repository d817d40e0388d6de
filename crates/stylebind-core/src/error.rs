use std::path::PathBuf;
use thiserror::Error;

/// Core error type for stylebind operations.
///
/// These are tool malfunctions or internal-consistency faults. Problems in
/// user-authored files are [`crate::Diagnostic`]s and never travel through
/// this type.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No tsconfig.json found from {start}")]
    TsConfigNotFound { start: PathBuf },

    #[error("Failed to read config at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read CSS module file {path}: {source}")]
    ReadModule {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {} declaration file(s)", failures.len())]
    EmitOutputs { failures: Vec<Error> },

    #[error("Resolved module {path} (imported from {request}) is not in the project")]
    ModuleNotFound { path: PathBuf, request: PathBuf },

    #[error("{0}")]
    Other(String),
}

impl Error {
    #[must_use]
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Stable code for this error, for JSON output and log filtering.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => codes::IO_ERROR,
            Self::TsConfigNotFound { .. } => codes::TSCONFIG_NOT_FOUND,
            Self::ConfigRead { .. } => codes::CONFIG_READ_ERROR,
            Self::ReadModule { .. } => codes::READ_CSS_MODULE_FILE_ERROR,
            Self::WriteOutput { .. } | Self::EmitOutputs { .. } => codes::WRITE_DTS_FILE_ERROR,
            Self::ModuleNotFound { .. } => codes::MODULE_NOT_FOUND,
            Self::Other(_) => codes::INTERNAL_ERROR,
        }
    }

    /// Whether this error means the engine's caches disagree with each other.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::ModuleNotFound { .. } | Self::Other(_))
    }
}

/// Stable error codes.
///
/// All codes are SCREAMING_SNAKE_CASE and stable across versions.
pub mod codes {
    pub const IO_ERROR: &str = "IO_ERROR";
    pub const TSCONFIG_NOT_FOUND: &str = "TSCONFIG_NOT_FOUND";
    pub const CONFIG_READ_ERROR: &str = "CONFIG_READ_ERROR";
    pub const READ_CSS_MODULE_FILE_ERROR: &str = "READ_CSS_MODULE_FILE_ERROR";
    pub const WRITE_DTS_FILE_ERROR: &str = "WRITE_DTS_FILE_ERROR";
    pub const MODULE_NOT_FOUND: &str = "MODULE_NOT_FOUND";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}
