//! Run command implementation
//!
//! Split into submodules:
//! - `compile` — marker rendering into executable SQL
//! - `execute` — batch executor with skip cascade and abort
//! - `incremental` — watermark-windowed merge builds

pub(crate) mod compile;
mod execute;
mod incremental;

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use strata_core::{
    FileWatermarkStore, ModelDag, ModelName, ModelStatus, RunManifest, Schedule, WatermarkStore,
};
use strata_db::Connection;

use crate::cli::{GlobalArgs, RunArgs};
use crate::commands::common::{self, load_project, ExitCode};

use compile::{compile_models, CompiledModel};
use execute::{execute_schedule, ExecutionContext};

/// Execute the run command
pub async fn execute(args: &RunArgs, global: &GlobalArgs) -> Result<()> {
    let start_time = Instant::now();
    let project = load_project(global)?;

    let dag = ModelDag::build(&project.registry)?;
    let selection = common::parse_selection(&args.select);
    let schedule = Schedule::plan(&dag, selection.as_deref())?;

    if schedule.is_empty() {
        println!("No models to run.");
        return Ok(());
    }

    let compiled = compile_models(&project)?;
    let db = common::connect(&project, global)?;
    create_schemas(&db, &compiled, global).await?;

    let store: Arc<dyn WatermarkStore> =
        Arc::new(FileWatermarkStore::new(project.watermarks_path()));

    // Ctrl-C flips the flag; the executor checks it between batches and
    // before each model start, so running statements finish first.
    let abort = Arc::new(AtomicBool::new(false));
    {
        let abort = Arc::clone(&abort);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("\nInterrupt received, finishing running models...");
                abort.store(true, Ordering::SeqCst);
            }
        });
    }

    if global.verbose {
        eprintln!(
            "[verbose] {} models in {} batches",
            schedule.model_count(),
            schedule.batches.len()
        );
    }
    println!("Running {} models...\n", schedule.model_count());

    let ctx = ExecutionContext {
        db,
        compiled: Arc::new(compiled),
        store,
        threads: args.threads,
        full_refresh: args.full_refresh,
        abort,
    };

    let mut manifest = execute_schedule(&ctx, &schedule, RunManifest::new(schedule.flatten())).await;
    manifest.finish();
    if let Err(e) = manifest.save(&project.manifest_path()) {
        eprintln!("Warning: Failed to save run manifest: {}", e);
    }

    let succeeded = manifest.count(ModelStatus::Succeeded);
    let failed = manifest.count(ModelStatus::Failed);
    let skipped = manifest.count(ModelStatus::Skipped);

    println!();
    println!(
        "Completed: {} succeeded, {} failed, {} skipped",
        succeeded, failed, skipped
    );
    println!("Total time: {}ms", start_time.elapsed().as_millis());

    if failed > 0 {
        for record in manifest.failed_models() {
            eprintln!(
                "  failed: {} - {}",
                record.name,
                record.error.as_deref().unwrap_or("unknown error")
            );
        }
        return Err(ExitCode(1).into());
    }

    Ok(())
}

/// Create every schema the compiled models materialize into
async fn create_schemas(
    db: &Arc<dyn Connection>,
    compiled: &HashMap<ModelName, CompiledModel>,
    global: &GlobalArgs,
) -> Result<()> {
    let schemas: HashSet<&str> = compiled.values().filter_map(|m| m.schema.as_deref()).collect();

    for schema in schemas {
        if global.verbose {
            eprintln!("[verbose] Creating schema if not exists: {}", schema);
        }
        db.create_schema_if_not_exists(schema)
            .await
            .with_context(|| format!("Failed to create schema: {}", schema))?;
    }

    Ok(())
}
