//! List command: models in scheduled batch order

use anyhow::Result;
use serde::Serialize;
use strata_core::config::Materialization;
use strata_core::{ModelDag, Schedule};

use crate::cli::{GlobalArgs, LsArgs, LsOutput};
use crate::commands::common::{self, load_project};

#[derive(Serialize)]
struct ModelInfo {
    name: String,
    batch: usize,
    materialized: Materialization,
    relation: String,
    dependencies: Vec<String>,
}

/// Execute the ls command
pub async fn execute(args: &LsArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;

    let dag = ModelDag::build(&project.registry)?;
    let selection = common::parse_selection(&args.select);
    let schedule = Schedule::plan(&dag, selection.as_deref())?;

    let default_schema = project.config.schema.as_deref();
    let default_mat = project.registry.default_materialization();

    let mut info = Vec::new();
    for (batch_idx, batch) in schedule.batches.iter().enumerate() {
        for name in batch {
            let model = project.registry.resolve(name)?;
            info.push(ModelInfo {
                name: model.name.to_string(),
                batch: batch_idx + 1,
                materialized: model.materialization(default_mat),
                relation: model.relation(default_schema),
                dependencies: model.depends_on.iter().map(|d| d.to_string()).collect(),
            });
        }
    }

    match args.output {
        LsOutput::Json => println!("{}", serde_json::to_string_pretty(&info)?),
        LsOutput::Table => {
            if info.is_empty() {
                println!("No models.");
                return Ok(());
            }
            let mut current_batch = 0;
            for model in &info {
                if model.batch != current_batch {
                    current_batch = model.batch;
                    println!("batch {}:", current_batch);
                }
                let deps = if model.dependencies.is_empty() {
                    String::new()
                } else {
                    format!("  <- {}", model.dependencies.join(", "))
                };
                println!(
                    "  {} ({}) -> {}{}",
                    model.name, model.materialized, model.relation, deps
                );
            }
        }
    }

    Ok(())
}
