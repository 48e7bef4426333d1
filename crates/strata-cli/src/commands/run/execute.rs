//! Batch executor: concurrent model building with skip cascade and abort

use anyhow::Result;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use strata_core::config::Materialization;
use strata_core::{ModelName, ModelStatus, RunManifest, Schedule, WatermarkStore};
use strata_db::Connection;
use tokio::sync::Semaphore;

use super::compile::CompiledModel;
use super::incremental::execute_incremental;

/// Shared context for one run's execution phase
pub(super) struct ExecutionContext {
    pub(super) db: Arc<dyn Connection>,
    pub(super) compiled: Arc<HashMap<ModelName, CompiledModel>>,
    pub(super) store: Arc<dyn WatermarkStore>,
    pub(super) threads: usize,
    pub(super) full_refresh: bool,
    /// Set by the Ctrl-C handler; models already running finish
    pub(super) abort: Arc<AtomicBool>,
}

fn lock(manifest: &Mutex<RunManifest>) -> MutexGuard<'_, RunManifest> {
    manifest.lock().unwrap_or_else(|p| p.into_inner())
}

/// Materialize one compiled model against the target store
async fn run_single_model(
    db: &Arc<dyn Connection>,
    compiled: &CompiledModel,
    store: &Arc<dyn WatermarkStore>,
    full_refresh: bool,
) -> Result<()> {
    match compiled.materialization {
        Materialization::View => {
            db.create_view_as(&compiled.quoted_relation, &compiled.sql)
                .await?;
        }
        Materialization::Table => {
            db.create_table_as(&compiled.quoted_relation, &compiled.sql, true)
                .await?;
        }
        Materialization::Incremental => {
            execute_incremental(db, compiled, store.as_ref(), full_refresh).await?;
        }
    }
    Ok(())
}

/// Name of the first direct dependency that did not succeed, if any
fn blocked_by(
    compiled: &CompiledModel,
    manifest: &MutexGuard<'_, RunManifest>,
) -> Option<ModelName> {
    compiled
        .dependencies
        .iter()
        .find(|dep| {
            matches!(
                manifest.status(dep),
                Some(ModelStatus::Failed) | Some(ModelStatus::Skipped)
            )
        })
        .cloned()
}

/// Execute every batch of the schedule, updating the manifest as models
/// start and finish.
///
/// Within a batch, models run as concurrent tasks bounded by a semaphore
/// of `threads` permits. Batches are awaited fully before the next one
/// starts, so a model never runs before its dependencies have settled.
/// A model whose direct dependency failed or was skipped is skipped
/// without starting; an abort skips everything not yet started.
pub(super) async fn execute_schedule(
    ctx: &ExecutionContext,
    schedule: &Schedule,
    manifest: RunManifest,
) -> RunManifest {
    let manifest = Arc::new(Mutex::new(manifest));
    let semaphore = Arc::new(Semaphore::new(ctx.threads.max(1)));

    for batch in &schedule.batches {
        if ctx.abort.load(Ordering::SeqCst) {
            break;
        }

        let mut handles = Vec::new();
        for name in batch {
            if ctx.abort.load(Ordering::SeqCst) {
                break;
            }

            let Some(compiled) = ctx.compiled.get(name) else {
                // Scheduled names come from the same registry the compiler
                // walked, so this is unreachable in practice.
                lock(&manifest).mark_skipped(name, "not compiled");
                continue;
            };

            {
                let mut guard = lock(&manifest);
                if let Some(blocker) = blocked_by(compiled, &guard) {
                    let reason = format!("upstream model '{}' did not succeed", blocker);
                    println!("  - {} (skipped: {})", name, reason);
                    guard.mark_skipped(name, reason);
                    continue;
                }
                guard.mark_running(name);
            }

            let db = Arc::clone(&ctx.db);
            let store = Arc::clone(&ctx.store);
            let compiled = compiled.clone();
            let full_refresh = ctx.full_refresh;
            let semaphore = Arc::clone(&semaphore);
            let manifest = Arc::clone(&manifest);

            handles.push(tokio::spawn(async move {
                let _permit = match semaphore.acquire().await {
                    Ok(permit) => permit,
                    Err(_) => return,
                };

                let start = Instant::now();
                let result = run_single_model(&db, &compiled, &store, full_refresh).await;
                let elapsed = start.elapsed().as_millis();

                match result {
                    Ok(()) => {
                        println!(
                            "  \u{2713} {} ({}) [{}ms]",
                            compiled.name, compiled.materialization, elapsed
                        );
                        lock(&manifest).mark_succeeded(&compiled.name);
                    }
                    Err(e) => {
                        println!("  \u{2717} {} - {:#} [{}ms]", compiled.name, e, elapsed);
                        lock(&manifest).mark_failed(&compiled.name, format!("{:#}", e));
                    }
                }
            }));
        }

        for handle in handles {
            if handle.await.is_err() {
                // A panicked task left its model in `running`; the sweep
                // below will not touch it, so surface it as failed.
                log::warn!("model task panicked");
            }
        }

        let mut guard = lock(&manifest);
        for name in batch {
            if guard.status(name) == Some(ModelStatus::Running) {
                guard.mark_failed(name, "model task panicked");
            }
        }
    }

    // Anything never started (abort, or batches after a break)
    let mut final_manifest = lock(&manifest).clone();
    let pending: Vec<ModelName> = final_manifest
        .models
        .iter()
        .filter(|r| r.status == ModelStatus::Pending)
        .map(|r| r.name.clone())
        .collect();
    for name in pending {
        println!("  - {} (skipped: aborted)", name);
        final_manifest.mark_skipped(&name, "aborted");
    }

    final_manifest
}

#[cfg(test)]
#[path = "execute_test.rs"]
mod tests;
