//! CSS module parser.
//!
//! Scans module source for the things the engine needs (class selectors,
//! `@keyframes` names, `@value` declarations and imports, `@import`) without
//! building a full stylesheet AST. The parser never touches the filesystem:
//! specifiers are kept exactly as written.

use crate::config::ProjectConfig;
use crate::diagnostic::Diagnostic;
use crate::module::{
    AtImportTokenImporter, AtValueImport, AtValueTokenImporter, CssModule, Location, Position,
    Token, TokenImporter,
};
use std::path::Path;
use tracing::trace;

/// Turns module text into a [`CssModule`].
///
/// Syntax problems are reported in [`CssModule::diagnostics`], never as errors.
pub trait ModuleParser: Send + Sync {
    fn parse(&self, text: &str, path: &Path) -> CssModule;
}

/// The built-in parser for `*.module.css` files.
#[derive(Debug, Clone, Copy)]
pub struct CssModuleParser {
    keyframes: bool,
}

impl Default for CssModuleParser {
    fn default() -> Self {
        Self { keyframes: true }
    }
}

impl CssModuleParser {
    /// `keyframes` controls whether `@keyframes` names become tokens.
    #[must_use]
    pub fn new(keyframes: bool) -> Self {
        Self { keyframes }
    }

    #[must_use]
    pub fn from_config(config: &ProjectConfig) -> Self {
        Self::new(config.keyframes)
    }
}

impl ModuleParser for CssModuleParser {
    fn parse(&self, text: &str, path: &Path) -> CssModule {
        let mut scanner = Scanner::new(text, path, self.keyframes);
        scanner.parse_block(0, None);

        trace!(
            path = %path.display(),
            tokens = scanner.local_tokens.len(),
            importers = scanner.token_importers.len(),
            diagnostics = scanner.diagnostics.len(),
            "Parsed CSS module"
        );

        CssModule {
            path: path.to_path_buf(),
            text: text.to_string(),
            local_tokens: scanner.local_tokens,
            token_importers: scanner.token_importers,
            diagnostics: scanner.diagnostics,
        }
    }
}

/// Byte offset to line/column conversion.
#[derive(Debug)]
struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self { line_starts }
    }

    fn position(&self, text: &str, offset: usize) -> Position {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let column = text[self.line_starts[line]..offset].chars().count() + 1;
        Position::new(line as u32 + 1, column as u32, offset)
    }
}

/// How a prelude (selector, at-rule params, declaration) ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Terminator {
    OpenBrace,
    Semicolon,
    CloseBrace,
    Eof,
}

struct Scanner<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    lines: LineIndex,
    path: &'a Path,
    keyframes: bool,
    local_tokens: Vec<Token>,
    token_importers: Vec<TokenImporter>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str, path: &'a Path, keyframes: bool) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
            lines: LineIndex::new(text),
            path,
            keyframes,
            local_tokens: Vec::new(),
            token_importers: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    fn loc(&self, start: usize, end: usize) -> Location {
        Location::new(
            self.lines.position(self.text, start),
            self.lines.position(self.text, end),
        )
    }

    fn error(&mut self, text: impl Into<String>, start: usize, end: usize) {
        let loc = self.loc(start, end);
        self.diagnostics.push(Diagnostic::at(text, self.path, loc));
    }

    /// Parse statements until the block opened at `opened_at` closes.
    fn parse_block(&mut self, depth: usize, opened_at: Option<usize>) {
        loop {
            self.skip_trivia();
            if self.pos >= self.bytes.len() {
                if let Some(start) = opened_at {
                    self.error("Unclosed block", start, start + 1);
                }
                return;
            }

            match self.bytes[self.pos] {
                b'}' => {
                    if depth == 0 {
                        self.error("Unexpected }", self.pos, self.pos + 1);
                        self.pos += 1;
                    } else {
                        self.pos += 1;
                        return;
                    }
                }
                b';' => self.pos += 1,
                b'@' => self.at_rule(depth),
                _ => self.qualified_rule(depth),
            }
        }
    }

    /// Skip whitespace and comments.
    fn skip_trivia(&mut self) {
        while self.pos < self.bytes.len() {
            let b = self.bytes[self.pos];
            if b.is_ascii_whitespace() {
                self.pos += 1;
            } else if b == b'/' && self.bytes.get(self.pos + 1) == Some(&b'*') {
                self.pos = self.skip_comment(self.pos);
            } else {
                break;
            }
        }
    }

    /// Skip the comment starting at `start`, returning the offset after it.
    fn skip_comment(&mut self, start: usize) -> usize {
        match self.text[start + 2..].find("*/") {
            Some(idx) => start + 2 + idx + 2,
            None => {
                self.error("Unclosed comment", start, start + 2);
                self.bytes.len()
            }
        }
    }

    /// Skip the string starting at `start`, returning the offset after it.
    fn skip_string(&mut self, start: usize) -> usize {
        let quote = self.bytes[start];
        let mut i = start + 1;
        while i < self.bytes.len() {
            match self.bytes[i] {
                b'\\' => i += 1 + char_len_at(self.text, i + 1),
                b'\n' => break,
                b if b == quote => return i + 1,
                _ => i += 1,
            }
        }
        self.error("Unclosed string", start, start + 1);
        i.min(self.bytes.len())
    }

    /// Find where the prelude starting at `start` ends.
    ///
    /// Returns the offset of the terminator (or the end of input).
    fn read_prelude(&mut self, start: usize) -> (usize, Terminator) {
        let mut i = start;
        let mut parens = 0usize;

        while i < self.bytes.len() {
            match self.bytes[i] {
                b'"' | b'\'' => {
                    i = self.skip_string(i);
                    continue;
                }
                b'/' if self.bytes.get(i + 1) == Some(&b'*') => {
                    i = self.skip_comment(i);
                    continue;
                }
                b'\\' => {
                    i += 1 + char_len_at(self.text, i + 1);
                    continue;
                }
                b'(' => parens += 1,
                b')' => parens = parens.saturating_sub(1),
                b'{' if parens == 0 => return (i, Terminator::OpenBrace),
                b';' if parens == 0 => return (i, Terminator::Semicolon),
                b'}' => return (i, Terminator::CloseBrace),
                _ => {}
            }
            i += 1;
        }
        (self.bytes.len(), Terminator::Eof)
    }

    /// Skip a block body whose `{` is already consumed.
    fn skip_block(&mut self, opened_at: usize) {
        let mut depth = 1usize;
        loop {
            let (end, term) = self.read_prelude(self.pos);
            match term {
                Terminator::OpenBrace => {
                    depth += 1;
                    self.pos = end + 1;
                }
                Terminator::CloseBrace => {
                    self.pos = end + 1;
                    depth -= 1;
                    if depth == 0 {
                        return;
                    }
                }
                Terminator::Semicolon => self.pos = end + 1,
                Terminator::Eof => {
                    self.pos = end;
                    self.error("Unclosed block", opened_at, opened_at + 1);
                    return;
                }
            }
        }
    }

    fn at_rule(&mut self, depth: usize) {
        let start = self.pos;
        let name_end = ident_end(self.text, start + 1);
        let name = self.text[start + 1..name_end].to_ascii_lowercase();

        let (end, term) = self.read_prelude(name_end);
        match term {
            Terminator::OpenBrace => {
                self.pos = end + 1;
                if name == "keyframes" {
                    let first = self.local_tokens.len();
                    self.at_keyframes(name_end, end);
                    self.skip_block(start);
                    self.close_declarations(first, start);
                } else {
                    self.parse_block(depth + 1, Some(start));
                }
            }
            Terminator::Semicolon | Terminator::CloseBrace | Terminator::Eof => {
                self.pos = if term == Terminator::Semicolon { end + 1 } else { end };
                match name.as_str() {
                    "import" => self.at_import(name_end, end),
                    "value" => self.at_value(start, name_end, end),
                    _ => {}
                }
            }
        }
    }

    fn qualified_rule(&mut self, depth: usize) {
        let start = self.pos;
        let (end, term) = self.read_prelude(start);
        match term {
            Terminator::OpenBrace => {
                let first = self.local_tokens.len();
                self.scan_selector(start, end, None);
                self.pos = end + 1;
                self.parse_block(depth + 1, Some(start));
                self.close_declarations(first, start);
            }
            // Declarations carry no tokens.
            Terminator::Semicolon => self.pos = end + 1,
            Terminator::CloseBrace | Terminator::Eof => self.pos = end,
        }
    }

    /// Record the whole declaration span on the tokens it introduced.
    ///
    /// Only tokens pushed directly by the declaration at `start` are
    /// updated; nested rules already set their own spans.
    fn close_declarations(&mut self, first: usize, start: usize) {
        let decl = self.loc(start, self.pos);
        for token in &mut self.local_tokens[first..] {
            if token.declaration_loc.is_none() {
                token.declaration_loc = Some(decl);
            }
        }
    }

    /// Collect local class names in `text[from..to]`.
    ///
    /// `wrapper` is the enclosing `:local(...)` / `:global(...)`, if any.
    fn scan_selector(&mut self, from: usize, to: usize, wrapper: Option<&'static str>) {
        let mut i = from;
        while i < to {
            match self.bytes[i] {
                b'/' if self.bytes.get(i + 1) == Some(&b'*') => {
                    i = self.skip_comment(i).min(to);
                }
                b'"' | b'\'' => i = self.skip_string(i).min(to),
                b'[' => {
                    i += 1;
                    while i < to && self.bytes[i] != b']' {
                        if matches!(self.bytes[i], b'"' | b'\'') {
                            i = self.skip_string(i);
                        } else {
                            i += 1;
                        }
                    }
                    i += 1;
                }
                b'.' if i + 1 < to && is_ident_start(self.bytes[i + 1]) => {
                    let name_start = i + 1;
                    let name_end = ident_end(self.text, name_start).min(to);
                    if wrapper != Some(":global(...)") {
                        self.local_tokens.push(Token {
                            name: self.text[name_start..name_end].to_string(),
                            loc: self.loc(name_start, name_end),
                            declaration_loc: None,
                        });
                    }
                    i = name_end;
                }
                b'#' => i = ident_end(self.text, i + 1),
                b':' if self.bytes.get(i + 1) == Some(&b':') => {
                    i = ident_end(self.text, i + 2);
                }
                b':' => i = self.scan_pseudo(i, to, wrapper),
                _ => i += 1,
            }
        }
    }

    /// Handle the pseudo-class at `start`, returning where scanning resumes.
    fn scan_pseudo(&mut self, start: usize, to: usize, wrapper: Option<&'static str>) -> usize {
        let name_end = ident_end(self.text, start + 1).min(to);
        let scope = match &self.text[start + 1..name_end] {
            "local" => ":local(...)",
            "global" => ":global(...)",
            _ => return name_end,
        };
        let pseudo = &self.text[start..name_end];

        if self.bytes.get(name_end) != Some(&b'(') || name_end >= to {
            let text = format!("`{pseudo}` is not supported. Use `{pseudo}(...)` instead.");
            self.error(text, start, name_end);
            return name_end;
        }

        let close = matching_paren(self.bytes, name_end, to).unwrap_or(to);
        let after = (close + 1).min(to);
        if let Some(outer) = wrapper {
            let text = format!("A `{pseudo}(...)` is not allowed inside of `{outer}`.");
            self.error(text, start, after);
        } else {
            self.scan_selector(name_end + 1, close, Some(scope));
        }
        after
    }

    fn at_keyframes(&mut self, from: usize, to: usize) {
        if !self.keyframes {
            return;
        }
        let Some((start, end)) = trimmed_range(self.text, from, to) else {
            return;
        };
        let name = &self.text[start..end];

        if name.starts_with(":global(") && name.ends_with(')') {
            return;
        }
        if name.starts_with(":local(") && name.ends_with(')') {
            let text = format!(
                "stylebind does not support `:local()` wrapper for keyframes. Use `@keyframes {name} {{...}}` instead."
            );
            self.error(text, start, end);
            return;
        }

        self.local_tokens.push(Token {
            name: name.to_string(),
            loc: self.loc(start, end),
            declaration_loc: None,
        });
    }

    /// `@import "x";`, `@import 'x' screen;`, `@import url("x");`, `@import url(x);`
    fn at_import(&mut self, from: usize, to: usize) {
        let Some((start, end)) = trimmed_range(self.text, from, to) else {
            return;
        };
        let params = &self.text[start..end];

        let is_url_function = params
            .as_bytes()
            .get(..4)
            .is_some_and(|p| p.eq_ignore_ascii_case(b"url("));
        let spec = if is_url_function {
            let inner_start = start + 4;
            let Some(close) = matching_paren(self.bytes, start + 3, end) else {
                return;
            };
            let Some((s, e)) = trimmed_range(self.text, inner_start, close) else {
                return;
            };
            if matches!(self.bytes[s], b'"' | b'\'') {
                quoted_range(self.bytes, s, e)
            } else {
                Some((s, e))
            }
        } else if matches!(self.bytes[start], b'"' | b'\'') {
            quoted_range(self.bytes, start, end)
        } else {
            None
        };

        let Some((s, e)) = spec.filter(|(s, e)| e > s) else {
            return;
        };
        self.token_importers
            .push(TokenImporter::Import(AtImportTokenImporter {
                from: self.text[s..e].to_string(),
                from_loc: self.loc(s, e),
            }));
    }

    /// `@value name: value;` or `@value a, b as c from "x";`
    fn at_value(&mut self, at_start: usize, from: usize, to: usize) {
        let Some((start, end)) = trimmed_range(self.text, from, to) else {
            self.invalid_at_value(at_start, to);
            return;
        };

        if let Some(import) = split_value_import(self.text, start, end) {
            self.at_value_import(import);
            return;
        }

        let name_end = word_end(self.text, start);
        if name_end == start {
            self.invalid_at_value(at_start, to);
            return;
        }
        let token = Token {
            name: self.text[start..name_end].to_string(),
            loc: self.loc(start, name_end),
            declaration_loc: Some(self.loc(at_start, self.pos)),
        };
        self.local_tokens.push(token);
    }

    fn invalid_at_value(&mut self, at_start: usize, to: usize) {
        let end = trimmed_range(self.text, at_start, to).map_or(to, |(_, e)| e);
        let text = format!("`{}` is a invalid syntax.", &self.text[at_start..end]);
        self.error(text, at_start, end);
    }

    fn at_value_import(&mut self, import: ValueImportParts) {
        let mut values = Vec::new();
        let mut item_start = import.items.0;

        for piece in self.text[import.items.0..import.items.1].split(',') {
            let piece_start = item_start;
            item_start += piece.len() + 1;

            let Some((s, e)) = trimmed_range(self.text, piece_start, piece_start + piece.len())
            else {
                let text = "`` is invalid syntax.".to_string();
                self.error(text, piece_start, piece_start);
                continue;
            };

            let name_end = word_end(self.text, s);
            if name_end == s {
                let text = format!("`{}` is invalid syntax.", &self.text[s..e]);
                self.error(text, s, e);
                continue;
            }

            let mut value = AtValueImport {
                name: self.text[s..name_end].to_string(),
                loc: self.loc(s, name_end),
                local_name: None,
                local_loc: None,
            };
            if let Some((ls, le)) = alias_range(self.text, name_end, e) {
                value.local_name = Some(self.text[ls..le].to_string());
                value.local_loc = Some(self.loc(ls, le));
            }
            values.push(value);
        }

        let (s, e) = import.from;
        self.token_importers
            .push(TokenImporter::Value(AtValueTokenImporter {
                values,
                from: self.text[s..e].to_string(),
                from_loc: self.loc(s, e),
            }));
    }
}

/// Byte ranges of the pieces of `a, b as c from "x"`.
struct ValueImportParts {
    /// Everything before `from`.
    items: (usize, usize),
    /// The specifier, excluding quotes.
    from: (usize, usize),
}

/// Split `text[start..end]` into items and specifier if it is a value import.
fn split_value_import(text: &str, start: usize, end: usize) -> Option<ValueImportParts> {
    let bytes = text.as_bytes();
    let quote = bytes[end - 1];
    if !matches!(quote, b'"' | b'\'') || end - start < 2 {
        return None;
    }
    let open = start + text[start..end - 1].rfind(quote as char)?;

    // `\s+from\s+` before the opening quote
    let before = &text[start..open];
    let trimmed = before.trim_end();
    if trimmed.len() == before.len() {
        return None;
    }
    let keyword = trimmed.strip_suffix("from")?;
    let items = keyword.trim_end();
    if items.len() == keyword.len() || items.trim_start().is_empty() {
        return None;
    }

    Some(ValueImportParts {
        items: (start, start + items.len()),
        from: (open + 1, end - 1),
    })
}

/// Range of `c` in ` as c` following an imported name.
fn alias_range(text: &str, from: usize, to: usize) -> Option<(usize, usize)> {
    let rest = &text[from..to];
    let after_ws = rest.trim_start();
    if after_ws.len() == rest.len() {
        return None;
    }
    let after_as = after_ws.strip_prefix("as")?;
    let name = after_as.trim_start();
    if name.len() == after_as.len() {
        return None;
    }
    let start = to - name.len();
    let end = word_end(text, start).min(to);
    (end > start).then_some((start, end))
}

/// Range of `text[from..to]` with surrounding whitespace removed.
fn trimmed_range(text: &str, from: usize, to: usize) -> Option<(usize, usize)> {
    let slice = &text[from..to];
    let start = from + (slice.len() - slice.trim_start().len());
    let end = to - (slice.len() - slice.trim_end().len());
    (end > start).then_some((start, end))
}

/// Range inside the quotes of the string starting at `start`.
fn quoted_range(bytes: &[u8], start: usize, end: usize) -> Option<(usize, usize)> {
    let quote = bytes[start];
    let close = (start + 1..end).find(|&i| bytes[i] == quote)?;
    Some((start + 1, close))
}

/// Offset of the `)` matching the `(` at `open`, searching before `to`.
fn matching_paren(bytes: &[u8], open: usize, to: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, &b) in bytes.iter().enumerate().take(to).skip(open) {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || matches!(b, b'_' | b'-' | b'\\') || b >= 0x80
}

fn char_len_at(text: &str, i: usize) -> usize {
    text.get(i..)
        .and_then(|rest| rest.chars().next())
        .map_or(1, char::len_utf8)
}

/// End of the CSS identifier starting at `start`. Escapes are kept verbatim.
fn ident_end(text: &str, start: usize) -> usize {
    let bytes = text.as_bytes();
    let mut i = start;
    while i < bytes.len() {
        let b = bytes[i];
        if b == b'\\' {
            i += 1 + char_len_at(text, i + 1);
        } else if b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-') {
            i += 1;
        } else if b >= 0x80 {
            i += char_len_at(text, i);
        } else {
            break;
        }
    }
    i.min(bytes.len())
}

/// End of the `[\w-]+` run starting at `start`.
fn word_end(text: &str, start: usize) -> usize {
    let bytes = text.as_bytes();
    let mut i = start;
    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || matches!(bytes[i], b'_' | b'-')) {
        i += 1;
    }
    i
}
