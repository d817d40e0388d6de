pub mod check;
pub mod watch;

use crate::report::Reporter;
use std::path::PathBuf;
use stylebind_core::{Diagnostic, Error, FsWriter, Project};
use tracing::error;

/// Options shared by one-shot and watch runs.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// `tsconfig.json` or a directory to search upwards from.
    pub project: PathBuf,
    pub cwd: PathBuf,
    pub pretty: bool,
    pub clean: bool,
    pub json: bool,
}

impl RunOptions {
    pub fn reporter(&self) -> Reporter {
        Reporter::new(self.cwd.clone(), self.pretty, self.json)
    }
}

/// Report diagnostics, then emit declarations if there were none.
///
/// Returns the diagnostics that were reported.
pub(crate) fn check_and_emit(
    project: &mut Project,
    reporter: &Reporter,
) -> Result<Vec<Diagnostic>, Error> {
    let diagnostics = project.get_diagnostics()?;
    reporter.diagnostics(&diagnostics)?;

    if diagnostics.is_empty() {
        if let Err(e) = project.emit_outputs(&FsWriter) {
            if let Error::EmitOutputs { failures } = &e {
                for failure in failures {
                    error!(code = failure.code(), "{failure}");
                }
            }
            return Err(e);
        }
    }
    Ok(diagnostics)
}
