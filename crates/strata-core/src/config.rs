//! Configuration types and parsing for strata.yml

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main project configuration from strata.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Project name
    pub name: String,

    /// Project version
    #[serde(default = "default_version")]
    pub version: String,

    /// Directories containing model SQL files
    #[serde(default = "default_model_paths")]
    pub model_paths: Vec<String>,

    /// Directories containing source definition YAML files
    #[serde(default = "default_source_paths")]
    pub source_paths: Vec<String>,

    /// Output directory for the run manifest, watermarks, and compiled SQL
    #[serde(default = "default_target_path")]
    pub target_path: String,

    /// Default materialization for models without an explicit one
    #[serde(default)]
    pub materialization: Materialization,

    /// Default schema for materialized models
    #[serde(default)]
    pub schema: Option<String>,

    /// Database connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// Database connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Path to the database file, or ":memory:"
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Materialization strategy for models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Materialization {
    /// (Re)define a view over the rendered query
    #[default]
    View,
    /// Full rebuild: replace the table with the rendered query's result
    Table,
    /// Merge rows newer than the persisted watermark into the existing table
    Incremental,
}

impl std::fmt::Display for Materialization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Materialization::View => write!(f, "view"),
            Materialization::Table => write!(f, "table"),
            Materialization::Incremental => write!(f, "incremental"),
        }
    }
}

fn default_version() -> String {
    "1.0.0".to_string()
}

fn default_model_paths() -> Vec<String> {
    vec!["models".to_string()]
}

fn default_source_paths() -> Vec<String> {
    vec!["sources".to_string()]
}

fn default_target_path() -> String {
    "target".to_string()
}

fn default_db_path() -> String {
    ":memory:".to_string()
}

impl Config {
    /// Load configuration from a strata.yml file
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;

        serde_yaml::from_str(&content).map_err(|e| CoreError::ConfigParseError {
            message: e.to_string(),
        })
    }

    /// Model directories resolved against the project root
    pub fn model_paths_absolute(&self, root: &Path) -> Vec<PathBuf> {
        self.model_paths.iter().map(|p| root.join(p)).collect()
    }

    /// Source directories resolved against the project root
    pub fn source_paths_absolute(&self, root: &Path) -> Vec<PathBuf> {
        self.source_paths.iter().map(|p| root.join(p)).collect()
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
