//! Declaration file generation and writing.
//!
//! The generated text depends only on the module itself, never on whether
//! its imports resolve, so each file can be emitted independently.

use crate::checker::validate_token_name;
use crate::config::ProjectConfig;
use crate::module::{AtValueImport, CssModule, Token, TokenImporter};
use crate::resolver::is_url_specifier;
use std::io;
use std::path::Path;

/// Name of the default-exported object.
pub const STYLES_EXPORT_NAME: &str = "styles";

/// Added to every file: the top-level `await` used below is only legal
/// under some `module` settings.
const HEADER: &str = "// @ts-nocheck\n";

/// Source-to-generated position pairs. Offsets are in bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeMapping {
    pub source_offsets: Vec<usize>,
    pub lengths: Vec<usize>,
    pub generated_offsets: Vec<usize>,
    pub generated_lengths: Vec<usize>,
}

impl CodeMapping {
    fn push(&mut self, source_offset: usize, length: usize, generated_offset: usize, generated_length: usize) {
        self.source_offsets.push(source_offset);
        self.lengths.push(length);
        self.generated_offsets.push(generated_offset);
        self.generated_lengths.push(generated_length);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.source_offsets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.source_offsets.is_empty()
    }
}

/// Generated declaration text plus positional metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmitOutput {
    pub text: String,
    pub mapping: CodeMapping,
    /// Pairs of generated ranges that name the same token (`a as b`).
    pub linked_code_mapping: CodeMapping,
}

/// Produces a declaration artifact for one module.
pub trait Emitter: Send + Sync {
    fn emit(&self, module: &CssModule) -> EmitOutput;
}

/// Writes generated artifacts.
pub trait OutputWriter: Sync {
    fn write(&self, path: &Path, text: &str) -> io::Result<()>;
}

/// Writes to the real filesystem, creating parent directories.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsWriter;

impl OutputWriter for FsWriter {
    fn write(&self, path: &Path, text: &str) -> io::Result<()> {
        stylebind_util::fs::write_with_parents(path, text.as_bytes())
    }
}

/// TypeScript declaration emitter.
#[derive(Debug, Clone, Copy, Default)]
pub struct DtsEmitter {
    pub named_exports: bool,
}

impl DtsEmitter {
    #[must_use]
    pub fn from_config(config: &ProjectConfig) -> Self {
        Self {
            named_exports: config.named_exports,
        }
    }

    fn is_valid_name(&self, name: &str) -> bool {
        validate_token_name(name, self.named_exports).is_none()
    }

    fn is_valid_value(&self, value: &AtValueImport) -> bool {
        self.is_valid_name(&value.name)
            && value
                .local_name
                .as_deref()
                .map_or(true, |local| self.is_valid_name(local))
    }
}

impl Emitter for DtsEmitter {
    fn emit(&self, module: &CssModule) -> EmitOutput {
        let tokens: Vec<&Token> = module
            .local_tokens
            .iter()
            .filter(|t| self.is_valid_name(&t.name))
            .collect();
        // URL imports are resolved at runtime, so they have no types to pull in.
        let importers: Vec<&TokenImporter> = module
            .token_importers
            .iter()
            .filter(|i| !is_url_specifier(i.from()))
            .collect();

        if self.named_exports {
            self.emit_named_exports(&tokens, &importers)
        } else {
            self.emit_default_export(&tokens, &importers)
        }
    }
}

impl DtsEmitter {
    fn emit_named_exports(&self, tokens: &[&Token], importers: &[&TokenImporter]) -> EmitOutput {
        let mut out = EmitOutput {
            text: HEADER.to_string(),
            ..EmitOutput::default()
        };

        for token in tokens {
            out.text.push_str("export var ");
            let len = token.name.len();
            out.mapping.push(token.loc.start.offset, len, out.text.len(), len);
            out.text.push_str(&token.name);
            out.text.push_str(": string;\n");
        }

        for importer in importers {
            match importer {
                TokenImporter::Import(import) => {
                    out.text.push_str("export * from ");
                    push_specifier(&mut out, &import.from, import.from_loc.start.offset);
                    out.text.push_str(";\n");
                }
                TokenImporter::Value(value_importer) => {
                    out.text.push_str("export {\n");
                    for value in value_importer.values.iter().filter(|v| self.is_valid_value(v)) {
                        out.text.push_str("  ");
                        let name_len = value.name.len();
                        out.mapping.push(value.loc.start.offset, name_len, out.text.len(), name_len);
                        match (&value.local_name, value.local_loc) {
                            (Some(local_name), Some(local_loc)) => {
                                let name_offset = out.text.len();
                                out.text.push_str(&value.name);
                                out.text.push_str(" as ");
                                let local_len = local_name.len();
                                let local_offset = out.text.len();
                                out.mapping
                                    .push(local_loc.start.offset, local_len, local_offset, local_len);
                                out.linked_code_mapping
                                    .push(local_offset, local_len, name_offset, name_len);
                                out.text.push_str(local_name);
                            }
                            _ => out.text.push_str(&value.name),
                        }
                        out.text.push_str(",\n");
                    }
                    out.text.push_str("} from ");
                    push_specifier(
                        &mut out,
                        &value_importer.from,
                        value_importer.from_loc.start.offset,
                    );
                    out.text.push_str(";\n");
                }
            }
        }
        out
    }

    fn emit_default_export(&self, tokens: &[&Token], importers: &[&TokenImporter]) -> EmitOutput {
        let mut out = EmitOutput {
            text: HEADER.to_string(),
            ..EmitOutput::default()
        };

        // Falls back from the error type of an unresolvable import to `{}`.
        if importers.iter().any(|i| matches!(i, TokenImporter::Import(_))) {
            out.text
                .push_str("function blockErrorType<T>(val: T): [0] extends [(1 & T)] ? {} : T;\n");
        }

        out.text
            .push_str(&format!("declare const {STYLES_EXPORT_NAME} = {{\n"));
        for token in tokens {
            out.text.push_str("  '");
            let len = token.name.len();
            out.mapping.push(token.loc.start.offset, len, out.text.len(), len);
            out.text.push_str(&token.name);
            out.text.push_str("': '' as readonly string,\n");
        }

        for importer in importers {
            match importer {
                TokenImporter::Import(import) => {
                    out.text.push_str("  ...blockErrorType((await import(");
                    push_specifier(&mut out, &import.from, import.from_loc.start.offset);
                    out.text.push_str(")).default),\n");
                }
                TokenImporter::Value(value_importer) => {
                    let values = value_importer.values.iter().filter(|v| self.is_valid_value(v));
                    for (i, value) in values.enumerate() {
                        let local_name = value.binding_name();
                        let local_loc = value.local_loc.unwrap_or(value.loc);

                        out.text.push_str("  '");
                        let local_len = local_name.len();
                        let local_offset = out.text.len();
                        out.mapping
                            .push(local_loc.start.offset, local_len, local_offset, local_len);
                        out.text.push_str(local_name);
                        out.text.push_str("': (await import(");
                        if i == 0 {
                            push_specifier(
                                &mut out,
                                &value_importer.from,
                                value_importer.from_loc.start.offset,
                            );
                        } else {
                            out.text.push('\'');
                            out.text.push_str(&value_importer.from);
                            out.text.push('\'');
                        }
                        out.text.push_str(")).default['");
                        let name_len = value.name.len();
                        let name_offset = out.text.len();
                        out.mapping.push(value.loc.start.offset, name_len, name_offset, name_len);
                        out.linked_code_mapping
                            .push(local_offset, local_len, name_offset, name_len);
                        out.text.push_str(&value.name);
                        out.text.push_str("'],\n");
                    }
                }
            }
        }

        out.text
            .push_str(&format!("}};\nexport default {STYLES_EXPORT_NAME};\n"));
        out
    }
}

/// Append `'from'`, mapping the quotes too.
fn push_specifier(out: &mut EmitOutput, from: &str, from_offset: usize) {
    let len = from.len() + 2;
    out.mapping
        .push(from_offset.saturating_sub(1), len, out.text.len(), len);
    out.text.push('\'');
    out.text.push_str(from);
    out.text.push('\'');
}
