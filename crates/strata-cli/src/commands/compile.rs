//! Compile command: render model SQL without executing it

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use strata_core::{ModelDag, ModelName, Schedule};

use crate::cli::{CompileArgs, GlobalArgs};
use crate::commands::common::{self, load_project};
use crate::commands::run::compile::compile_models;

/// Execute the compile command
pub async fn execute(args: &CompileArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;

    let dag = ModelDag::build(&project.registry)?;
    let selection = common::parse_selection(&args.select);
    let schedule = Schedule::plan(&dag, selection.as_deref())?;

    if schedule.is_empty() {
        println!("No models to compile.");
        return Ok(());
    }

    let compiled = compile_models(&project)?;
    let out_dir = project.compiled_dir();
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let selected: HashSet<ModelName> = schedule.flatten().into_iter().collect();
    let mut written = 0;
    for model in compiled.values() {
        if !selected.contains(&model.name) {
            continue;
        }
        let path = out_dir.join(format!("{}.sql", model.name));
        fs::write(&path, &model.sql)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        if global.verbose {
            eprintln!("[verbose] Wrote {}", path.display());
        }
        written += 1;
    }

    println!("Compiled {} models to {}", written, out_dir.display());
    Ok(())
}
