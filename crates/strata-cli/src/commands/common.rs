//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use strata_core::Project;
use strata_db::{Connection, DuckDbBackend};

use crate::cli::GlobalArgs;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and cleanup happens properly.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Intentionally empty: ExitCode is a control-flow mechanism, not a
        // user-facing error. If anyhow's Display chain ever reaches this
        // (e.g. downcast_ref fails in main.rs), we don't want "exit code N"
        // leaking into stderr.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Load the project from the global --project-dir
pub(crate) fn load_project(global: &GlobalArgs) -> Result<Project> {
    Project::load(Path::new(&global.project_dir)).context("Failed to load project")
}

/// Open the connection configured in strata.yml
pub(crate) fn connect(project: &Project, global: &GlobalArgs) -> Result<Arc<dyn Connection>> {
    let path = project.database_path();
    if global.verbose {
        eprintln!("[verbose] Using database: {}", path);
    }
    let db: Arc<dyn Connection> =
        Arc::new(DuckDbBackend::new(&path).context("Failed to connect to database")?);
    Ok(db)
}

/// Split a comma-separated --select value into trimmed model names
pub(crate) fn parse_selection(select: &Option<String>) -> Option<Vec<String>> {
    select.as_ref().map(|s| {
        s.split(',')
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect()
    })
}
