//! Human and JSON rendering of diagnostics and status messages.
//!
//! Diagnostics go to stderr, status messages to stdout. With `--json`, a
//! single report object per run goes to stdout instead.

use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use stylebind_core::paths::display_relative;
use stylebind_core::version::DIAGNOSTICS_SCHEMA_VERSION;
use stylebind_core::Diagnostic;

const RED: &str = "\x1b[91m";
const YELLOW: &str = "\x1b[93m";
const CYAN: &str = "\x1b[96m";
const GRAY: &str = "\x1b[90m";
const RESET: &str = "\x1b[0m";
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[3J\x1b[H";

/// JSON report for one check cycle.
#[derive(Serialize)]
struct DiagnosticsReport<'a> {
    schema_version: u32,
    ok: bool,
    diagnostics: &'a [Diagnostic],
}

/// Writes reports for one CLI invocation.
#[derive(Debug, Clone)]
pub struct Reporter {
    cwd: PathBuf,
    pretty: bool,
    json: bool,
}

impl Reporter {
    pub fn new(cwd: PathBuf, pretty: bool, json: bool) -> Self {
        Self { cwd, pretty, json }
    }

    pub fn diagnostics(&self, diagnostics: &[Diagnostic]) -> io::Result<()> {
        if self.json {
            let report = DiagnosticsReport {
                schema_version: DIAGNOSTICS_SCHEMA_VERSION,
                ok: diagnostics.is_empty(),
                diagnostics,
            };
            let text = serde_json::to_string_pretty(&report).map_err(io::Error::other)?;
            let mut out = io::stdout().lock();
            writeln!(out, "{text}")?;
            return out.flush();
        }

        let mut out = io::stderr().lock();
        for diagnostic in diagnostics {
            writeln!(out, "{}\n", format_diagnostic(diagnostic, &self.cwd, self.pretty))?;
        }
        out.flush()
    }

    /// A status line, prefixed with the current time.
    pub fn status(&self, message: &str) -> io::Result<()> {
        if self.json {
            return Ok(());
        }
        let mut out = io::stdout().lock();
        writeln!(out, "{} {message}", format_time(now_unix_secs(), self.pretty))?;
        out.flush()
    }

    pub fn clear_screen(&self) -> io::Result<()> {
        if self.json {
            return Ok(());
        }
        let mut out = io::stdout().lock();
        write!(out, "{CLEAR_SCREEN}")?;
        out.flush()
    }
}

/// `path:line:column - error: text`, or `error: text` for project diagnostics.
pub fn format_diagnostic(diagnostic: &Diagnostic, cwd: &Path, pretty: bool) -> String {
    let category = diagnostic.category.as_str();
    let category = if pretty {
        format!("{RED}{category}{RESET}")
    } else {
        category.to_string()
    };

    let (Some(path), Some(start)) = (diagnostic.path(), diagnostic.start) else {
        return format!("{category}: {}", diagnostic.text);
    };

    let file = display_relative(path, cwd);
    if pretty {
        format!(
            "{CYAN}{file}{RESET}:{YELLOW}{}{RESET}:{YELLOW}{}{RESET} - {category}: {}",
            start.line, start.column, diagnostic.text
        )
    } else {
        format!(
            "{file}:{}:{} - {category}: {}",
            start.line, start.column, diagnostic.text
        )
    }
}

/// `[h:mm:ss AM]` in UTC.
pub fn format_time(unix_secs: u64, pretty: bool) -> String {
    let secs_of_day = unix_secs % 86_400;
    let hour = secs_of_day / 3600;
    let minute = (secs_of_day % 3600) / 60;
    let second = secs_of_day % 60;
    let meridiem = if hour < 12 { "AM" } else { "PM" };
    let hour12 = match hour % 12 {
        0 => 12,
        h => h,
    };

    let text = format!("{hour12}:{minute:02}:{second:02} {meridiem}");
    if pretty {
        format!("[{GRAY}{text}{RESET}]")
    } else {
        format!("[{text}]")
    }
}

/// `Found 1 error.` / `Found 3 errors.`
pub fn format_summary(count: usize) -> String {
    if count == 1 {
        "Found 1 error.".to_string()
    } else {
        format!("Found {count} errors.")
    }
}

fn now_unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
