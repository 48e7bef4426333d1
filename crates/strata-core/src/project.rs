//! Project loading: configuration, source discovery, and model discovery

use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::model::Model;
use crate::registry::Registry;
use crate::source::discover_sources;

/// Name of the project configuration file
pub const CONFIG_FILE: &str = "strata.yml";

/// A loaded project: configuration plus the populated registry
pub struct Project {
    /// Absolute project root directory
    pub root: PathBuf,

    /// Parsed strata.yml
    pub config: Config,

    /// All discovered sources and models
    pub registry: Registry,
}

impl Project {
    /// Load a project from a directory containing strata.yml
    ///
    /// Discovers source definition files and model SQL files under the
    /// configured paths and registers everything. Registration order is
    /// deterministic: files are walked in sorted path order.
    pub fn load(root: &Path) -> CoreResult<Self> {
        if !root.is_dir() {
            return Err(CoreError::ProjectNotFound {
                path: root.display().to_string(),
            });
        }
        let root = root
            .canonicalize()
            .map_err(|e| CoreError::IoWithPath {
                path: root.display().to_string(),
                source: e,
            })?;

        let config = Config::load(&root.join(CONFIG_FILE))?;
        debug!("loaded project '{}' from {}", config.name, root.display());

        let mut registry = Registry::new(config.materialization);

        for source in discover_sources(&config.source_paths_absolute(&root))? {
            registry.register_source(source)?;
        }

        for dir in config.model_paths_absolute(&root) {
            for path in discover_sql_files(&dir)? {
                registry.register(Model::from_file(path)?)?;
            }
        }
        debug!(
            "registered {} models from {}",
            registry.len(),
            root.display()
        );

        Ok(Self {
            root,
            config,
            registry,
        })
    }

    /// The project's target directory (run artifacts, compiled SQL)
    pub fn target_dir(&self) -> PathBuf {
        self.root.join(&self.config.target_path)
    }

    /// Path of the run manifest artifact
    pub fn manifest_path(&self) -> PathBuf {
        self.target_dir().join("manifest.json")
    }

    /// Path of the incremental watermark file
    pub fn watermarks_path(&self) -> PathBuf {
        crate::watermark::watermark_file(&self.target_dir())
    }

    /// Directory for rendered model SQL
    pub fn compiled_dir(&self) -> PathBuf {
        self.target_dir().join("compiled")
    }

    /// Database path resolved against the project root, ":memory:" passed through
    pub fn database_path(&self) -> String {
        let path = &self.config.database.path;
        if path == ":memory:" || Path::new(path).is_absolute() {
            path.clone()
        } else {
            self.root.join(path).display().to_string()
        }
    }
}

/// Recursively collect .sql files under a directory, in sorted path order
///
/// A missing directory yields no files rather than an error, matching
/// source discovery.
fn discover_sql_files(dir: &Path) -> CoreResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    if dir.is_dir() {
        walk_sql(dir, &mut files)?;
    }
    Ok(files)
}

fn walk_sql(dir: &Path, files: &mut Vec<PathBuf>) -> CoreResult<()> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .map(|e| e.path())
        .collect();
    entries.sort();

    for path in entries {
        if path.is_dir() {
            walk_sql(&path, files)?;
        } else if path.extension().is_some_and(|ext| ext == "sql") {
            files.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "project_test.rs"]
mod tests;
