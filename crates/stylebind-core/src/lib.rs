#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::return_self_not_must_use)]

pub mod checker;
pub mod config;
pub mod diagnostic;
pub mod emit;
pub mod error;
pub mod export_builder;
pub mod module;
pub mod parser;
pub mod paths;
pub mod pattern;
pub mod project;
pub mod resolver;
pub mod version;

pub use checker::{check_css_module, validate_token_name, CheckerArgs, TokenNameViolation};
pub use config::{load_project_config, ProjectConfig};
pub use diagnostic::{Diagnostic, DiagnosticCategory, DiagnosticFile, DiagnosticPosition};
pub use emit::{DtsEmitter, EmitOutput, Emitter, FsWriter, OutputWriter};
pub use error::Error;
pub use export_builder::{ExportBuilder, ExportBuilderHost, ExportRecord};
pub use module::{
    AtImportTokenImporter, AtValueImport, AtValueTokenImporter, CssModule, Location, Position,
    Token, TokenImporter,
};
pub use parser::{CssModuleParser, ModuleParser};
pub use pattern::MatchesPattern;
pub use project::Project;
pub use resolver::{ResolveOptions, Resolver};
pub use version::VERSION;
