//! One-shot run: check the project, emit declarations, exit.

use super::{check_and_emit, RunOptions};
use miette::{IntoDiagnostic, Result};
use stylebind_core::{load_project_config, Project};
use tracing::info;

/// Run once. Exits with status 1 when any diagnostic was reported.
pub fn run(options: &RunOptions) -> Result<()> {
    let config = load_project_config(&options.project).into_diagnostic()?;

    if options.clean {
        info!(dir = %config.dts_out_dir.display(), "Removing output directory");
        stylebind_util::fs::remove_dir_all_if_exists(&config.dts_out_dir).into_diagnostic()?;
    }

    let mut project = Project::new(config).into_diagnostic()?;
    let reporter = options.reporter();
    let diagnostics = check_and_emit(&mut project, &reporter).into_diagnostic()?;

    if !diagnostics.is_empty() {
        std::process::exit(1);
    }
    Ok(())
}
