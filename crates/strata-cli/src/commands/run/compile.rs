//! Model rendering for execution

use anyhow::{Context, Result};
use std::collections::HashMap;
use strata_core::config::Materialization;
use strata_core::sql_utils::quote_relation;
use strata_core::{refs, ModelName, Project};

/// A model rendered down to executable SQL plus the metadata the
/// executor needs to materialize it
#[derive(Debug, Clone)]
pub(crate) struct CompiledModel {
    pub(crate) name: ModelName,
    /// Target relation, unquoted (schema.name or bare name)
    pub(crate) relation: String,
    /// Target relation with each part quoted, ready for DDL
    pub(crate) quoted_relation: String,
    /// Rendered SQL with every marker substituted
    pub(crate) sql: String,
    pub(crate) materialization: Materialization,
    pub(crate) schema: Option<String>,
    /// Merge key for incremental models
    pub(crate) unique_key: Option<String>,
    /// Column the incremental watermark predicate filters on
    pub(crate) cutoff_column: String,
    /// Direct model dependencies
    pub(crate) dependencies: Vec<ModelName>,
}

/// Render every registered model to executable SQL.
///
/// All models are compiled regardless of selection so that a selected
/// model's rendered dependencies are available too.
pub(crate) fn compile_models(project: &Project) -> Result<HashMap<ModelName, CompiledModel>> {
    let default_schema = project.config.schema.as_deref();
    let model_relations = project.registry.model_relations(default_schema);
    let source_relations = project.registry.source_relations();

    let mut compiled = HashMap::new();
    for model in project.registry.all() {
        let sql = refs::render(
            model.name.as_str(),
            &model.raw_sql,
            &model_relations,
            &source_relations,
        )
        .with_context(|| format!("Failed to render model '{}'", model.name))?;

        let relation = model.relation(default_schema);
        compiled.insert(
            model.name.clone(),
            CompiledModel {
                name: model.name.clone(),
                quoted_relation: quote_relation(&relation),
                relation,
                sql,
                materialization: model.materialization(project.registry.default_materialization()),
                schema: model
                    .config
                    .schema
                    .clone()
                    .or_else(|| project.config.schema.clone()),
                unique_key: model.config.unique_key.clone(),
                cutoff_column: model.cutoff_column().to_string(),
                dependencies: model.depends_on.clone(),
            },
        );
    }

    Ok(compiled)
}

#[cfg(test)]
#[path = "compile_test.rs"]
mod tests;
