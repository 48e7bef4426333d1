//! Model representation

use crate::config::Materialization;
use crate::error::{CoreError, CoreResult};
use crate::model_name::ModelName;
use crate::refs::ExtractedRefs;
use crate::source_name::SourceName;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default cutoff column for incremental models without an explicit one
pub const DEFAULT_CUTOFF_COLUMN: &str = "updated_at";

/// A named transformation unit: one SQL body plus its sidecar configuration.
#[derive(Debug, Clone)]
pub struct Model {
    /// Model name (file stem of the SQL file)
    pub name: ModelName,

    /// Path to the SQL file, when loaded from disk
    pub path: Option<PathBuf>,

    /// Raw SQL body with reference markers left in place
    pub raw_sql: String,

    /// Sidecar configuration from the 1:1 .yml file
    pub config: ModelConfig,

    /// Models this model references, extracted at registration
    pub depends_on: Vec<ModelName>,

    /// (group, table) sources this model references, extracted at registration
    pub source_deps: Vec<(SourceName, String)>,
}

/// Per-model configuration from the sidecar YAML file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    /// Materialization strategy (falls back to the project default)
    #[serde(default)]
    pub materialized: Option<Materialization>,

    /// Target schema override
    #[serde(default)]
    pub schema: Option<String>,

    /// Key column for the incremental upsert; required when incremental
    #[serde(default)]
    pub unique_key: Option<String>,

    /// Column compared against the watermark; defaults to `updated_at`
    #[serde(default)]
    pub cutoff_column: Option<String>,
}

impl Model {
    /// Create a model from in-memory parts. Dependency fields start empty;
    /// the registry fills them during registration.
    pub fn new(name: impl Into<ModelName>, raw_sql: impl Into<String>, config: ModelConfig) -> Self {
        Self {
            name: name.into(),
            path: None,
            raw_sql: raw_sql.into(),
            config,
            depends_on: Vec::new(),
            source_deps: Vec::new(),
        }
    }

    /// Load a model from a SQL file, picking up the 1:1 `.yml` sidecar if
    /// one exists next to it.
    pub fn from_file(path: PathBuf) -> CoreResult<Self> {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(ModelName::try_new)
            .ok_or_else(|| CoreError::EmptyName {
                context: format!("model file {}", path.display()),
            })?;

        let raw_sql = std::fs::read_to_string(&path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;

        if raw_sql.trim().is_empty() {
            return Err(CoreError::EmptyModelBody {
                name: name.into_inner(),
            });
        }

        let config = Self::load_sidecar(&path)?;

        Ok(Self {
            name,
            path: Some(path),
            raw_sql,
            config,
            depends_on: Vec::new(),
            source_deps: Vec::new(),
        })
    }

    fn load_sidecar(sql_path: &std::path::Path) -> CoreResult<ModelConfig> {
        for ext in ["yml", "yaml"] {
            let sidecar = sql_path.with_extension(ext);
            if sidecar.exists() {
                let content =
                    std::fs::read_to_string(&sidecar).map_err(|e| CoreError::IoWithPath {
                        path: sidecar.display().to_string(),
                        source: e,
                    })?;
                return Ok(serde_yaml::from_str(&content)?);
            }
        }
        Ok(ModelConfig::default())
    }

    /// Materialization with fallback to the project default
    pub fn materialization(&self, default: Materialization) -> Materialization {
        self.config.materialized.unwrap_or(default)
    }

    /// The column compared against the watermark for incremental models
    pub fn cutoff_column(&self) -> &str {
        self.config
            .cutoff_column
            .as_deref()
            .unwrap_or(DEFAULT_CUTOFF_COLUMN)
    }

    /// Physical relation this model materializes into, unquoted
    pub fn relation(&self, default_schema: Option<&str>) -> String {
        match self.config.schema.as_deref().or(default_schema) {
            Some(schema) => format!("{}.{}", schema, self.name),
            None => self.name.to_string(),
        }
    }

    /// Attach extracted references. Called by the registry after marker
    /// extraction; not public because dependencies must match the body.
    pub(crate) fn set_refs(&mut self, refs: ExtractedRefs) {
        self.depends_on = refs.models;
        self.source_deps = refs.sources;
    }
}

#[cfg(test)]
#[path = "model_test.rs"]
mod tests;
