//! Watch mode: keep the project loaded and re-check on file changes.
//!
//! Changes to the config file itself are not watched.

use super::{check_and_emit, RunOptions};
use crate::report::{format_summary, Reporter};
use miette::{IntoDiagnostic, Result};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use stylebind_core::paths::normalize;
use stylebind_core::{load_project_config, Error, Project, ProjectConfig};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Event coalescing window.
const COALESCE_WINDOW_MS: u64 = 50;

/// What a coalesced path turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileChange {
    Add,
    Update,
    Remove,
}

/// Run in watch mode until interrupted.
///
/// Errors before the watcher is running are returned. Errors afterwards are
/// logged and the loop keeps going.
pub fn run(options: &RunOptions, preserve_watch_output: bool) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new().into_diagnostic()?;
    runtime.block_on(watch(options, preserve_watch_output))
}

async fn watch(options: &RunOptions, preserve_watch_output: bool) -> Result<()> {
    let reporter = options.reporter();
    let config = load_project_config(&options.project).into_diagnostic()?;

    if options.clean {
        info!(dir = %config.dts_out_dir.display(), "Removing output directory");
        stylebind_util::fs::remove_dir_all_if_exists(&config.dts_out_dir).into_diagnostic()?;
    }

    if !preserve_watch_output {
        reporter.clear_screen().into_diagnostic()?;
    }
    reporter
        .status("Starting compilation in watch mode...")
        .into_diagnostic()?;

    let mut project = Project::new(config).into_diagnostic()?;
    report_cycle(&mut project, &reporter).into_diagnostic()?;

    let (tx, mut rx) = mpsc::unbounded_channel::<Vec<PathBuf>>();
    let mut watcher = RecommendedWatcher::new(
        move |res: Result<Event, notify::Error>| match res {
            Ok(event) => {
                if should_process_event(&event) {
                    if let Err(e) = tx.send(event.paths) {
                        warn!(error = %e, "Failed to send watch event");
                    }
                }
            }
            Err(e) => error!(error = %e, "Watch error"),
        },
        Config::default(),
    )
    .into_diagnostic()?;

    for (root, mode) in watch_roots(project.config()) {
        watcher.watch(&root, mode).into_diagnostic()?;
        info!(root = %root.display(), "Watching directory");
    }

    let window = Duration::from_millis(COALESCE_WINDOW_MS);
    let mut pending: BTreeSet<PathBuf> = BTreeSet::new();
    let mut last_event_time = Instant::now();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("Stopping watcher");
                break;
            }
            received = tokio::time::timeout(window, rx.recv()) => match received {
                Ok(Some(paths)) => {
                    pending.extend(paths.iter().map(|p| normalize(p)));
                    last_event_time = Instant::now();
                }
                Ok(None) => {
                    debug!("Watch event channel closed");
                    break;
                }
                Err(_) => {
                    if pending.is_empty() || last_event_time.elapsed() < window {
                        continue;
                    }
                    let batch = std::mem::take(&mut pending);
                    debug!(count = batch.len(), "Processing coalesced file events");

                    if !apply_changes(&mut project, &batch) {
                        continue;
                    }
                    if !preserve_watch_output {
                        if let Err(e) = reporter.clear_screen() {
                            error!(error = %e, "Failed to clear screen");
                        }
                    }
                    if let Err(e) = reporter.status("File change detected. Starting incremental compilation...") {
                        error!(error = %e, "Failed to write status");
                    }
                    if let Err(e) = report_cycle(&mut project, &reporter) {
                        error!(code = e.code(), "{e}");
                    }
                }
            }
        }
    }

    Ok(())
}

fn should_process_event(event: &Event) -> bool {
    matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}

/// Directories to watch: the include patterns' fixed prefixes that exist.
fn watch_roots(config: &ProjectConfig) -> Vec<(PathBuf, RecursiveMode)> {
    let mut roots: Vec<(PathBuf, RecursiveMode)> = Vec::new();
    for dir in &config.wildcard_directories {
        if !dir.path.is_dir() || roots.iter().any(|(p, _)| p == &dir.path) {
            continue;
        }
        let mode = if dir.recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        roots.push((dir.path.clone(), mode));
    }
    if roots.is_empty() {
        roots.push((config.base_path.clone(), RecursiveMode::Recursive));
    }
    roots
}

/// Classify a changed path by what is on disk now. Events for one path can
/// arrive out of order inside a window, so their kinds are not trusted.
fn classify(project: &Project, path: &Path) -> Option<FileChange> {
    if !project.is_managed(path) {
        return None;
    }
    let loaded = project.get_module(path).is_some();
    match (path.is_file(), loaded) {
        (true, true) => Some(FileChange::Update),
        (true, false) => Some(FileChange::Add),
        (false, true) => Some(FileChange::Remove),
        (false, false) => None,
    }
}

/// Apply a batch of changes. Returns whether any managed file changed.
fn apply_changes(project: &mut Project, paths: &BTreeSet<PathBuf>) -> bool {
    let mut changed = false;
    for path in paths {
        let Some(change) = classify(project, path) else {
            continue;
        };
        debug!(path = %path.display(), ?change, "File changed");

        let result = match change {
            FileChange::Add => project.add_file(path),
            FileChange::Update => project.update_file(path),
            FileChange::Remove => {
                project.remove_file(path);
                Ok(())
            }
        };
        match result {
            Ok(()) => changed = true,
            Err(e) => error!(code = e.code(), "{e}"),
        }
    }
    changed
}

fn report_cycle(project: &mut Project, reporter: &Reporter) -> Result<(), Error> {
    let diagnostics = check_and_emit(project, reporter)?;
    reporter.status(&format!(
        "{} Watching for file changes.",
        format_summary(diagnostics.len())
    ))?;
    Ok(())
}
