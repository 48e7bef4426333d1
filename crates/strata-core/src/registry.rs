//! Model and source catalog
//!
//! The registry is the compile-time entry point: models are registered
//! one at a time, each registration extracts the body's reference markers
//! and enforces the local invariants (unique name, non-empty body,
//! incremental models carry a unique_key, no self-reference, no malformed
//! markers). Cross-model resolution is the graph builder's job.

use crate::config::Materialization;
use crate::error::{CoreError, CoreResult};
use crate::model::Model;
use crate::model_name::ModelName;
use crate::refs;
use crate::source::SourceFile;
use crate::source_name::SourceName;
use crate::sql_utils::quote_relation;
use std::collections::HashMap;

/// In-memory catalog of models and sources.
#[derive(Debug, Default)]
pub struct Registry {
    /// Models in registration order, for deterministic diagnostics
    models: Vec<Model>,
    /// Index into `models` by name
    by_name: HashMap<ModelName, usize>,
    /// Source groups by name
    sources: HashMap<SourceName, SourceFile>,
    /// Default materialization applied to models without an explicit one
    default_materialization: Materialization,
}

impl Registry {
    /// Create an empty registry with the given project default materialization
    pub fn new(default_materialization: Materialization) -> Self {
        Self {
            default_materialization,
            ..Self::default()
        }
    }

    /// Register a source group. Groups are immutable once registered.
    pub fn register_source(&mut self, source: SourceFile) -> CoreResult<()> {
        if self.sources.contains_key(&source.name) {
            return Err(CoreError::SourceDuplicateName {
                name: source.name.to_string(),
                path1: "registry".to_string(),
                path2: "registry".to_string(),
            });
        }
        self.sources.insert(source.name.clone(), source);
        Ok(())
    }

    /// Register a model, extracting its references and validating the
    /// definition-level invariants.
    pub fn register(&mut self, mut model: Model) -> CoreResult<()> {
        if self.by_name.contains_key(&model.name) {
            return Err(CoreError::DuplicateModel {
                name: model.name.to_string(),
            });
        }

        if model.raw_sql.trim().is_empty() {
            return Err(CoreError::EmptyModelBody {
                name: model.name.to_string(),
            });
        }

        if model.materialization(self.default_materialization) == Materialization::Incremental
            && model.config.unique_key.is_none()
        {
            return Err(CoreError::MissingUniqueKey {
                name: model.name.to_string(),
            });
        }

        if let Some(marker) = refs::find_invalid_marker(&model.raw_sql) {
            return Err(CoreError::InvalidMarker {
                model: model.name.to_string(),
                marker,
            });
        }

        let extracted = refs::extract(&model.raw_sql);
        if extracted.models.contains(&model.name) {
            return Err(CoreError::SelfReference {
                name: model.name.to_string(),
            });
        }
        model.set_refs(extracted);

        self.by_name.insert(model.name.clone(), self.models.len());
        self.models.push(model);
        Ok(())
    }

    /// Resolve a model by name
    pub fn resolve(&self, name: &str) -> CoreResult<&Model> {
        self.get(name).ok_or_else(|| CoreError::ModelNotFound {
            name: name.to_string(),
        })
    }

    /// Look up a model by name
    pub fn get(&self, name: &str) -> Option<&Model> {
        self.by_name.get(name).map(|&idx| &self.models[idx])
    }

    /// True if a model with this name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// All models in registration order
    pub fn all(&self) -> impl Iterator<Item = &Model> {
        self.models.iter()
    }

    /// Number of registered models
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// True if no models are registered
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// The project default materialization
    pub fn default_materialization(&self) -> Materialization {
        self.default_materialization
    }

    /// Physical relation of a registered source table, unquoted
    pub fn source_relation(&self, group: &str, table: &str) -> Option<String> {
        let source = self.sources.get(group)?;
        source.table(table).map(|t| source.relation(t))
    }

    /// Quoted relation of every model, for reference rendering
    pub fn model_relations(&self, default_schema: Option<&str>) -> HashMap<ModelName, String> {
        self.models
            .iter()
            .map(|m| {
                (
                    m.name.clone(),
                    quote_relation(&m.relation(default_schema)),
                )
            })
            .collect()
    }

    /// Quoted relation of every registered source table, for rendering
    pub fn source_relations(&self) -> HashMap<(SourceName, String), String> {
        let mut map = HashMap::new();
        for (group, source) in &self.sources {
            for table in &source.tables {
                map.insert(
                    (group.clone(), table.name.clone()),
                    quote_relation(&source.relation(table)),
                );
            }
        }
        map
    }
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
