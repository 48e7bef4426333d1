//! Incremental materialization: watermark-windowed merge builds

use anyhow::{anyhow, Context, Result};
use std::sync::Arc;
use strata_core::refs::apply_watermark_predicate;
use strata_core::{Watermark, WatermarkStore};
use strata_db::Connection;

use super::compile::CompiledModel;

/// Build an incremental model.
///
/// A model with no committed watermark, a missing target table, or a
/// `--full-refresh` run gets a full rebuild. Otherwise the rendered query
/// is windowed down to rows whose cutoff column is newer than the
/// watermark and merged into the existing table by unique key.
///
/// The watermark commits only after the build has succeeded, and commits
/// the maximum cutoff actually present in the target, so a crash between
/// merge and commit re-merges rows instead of losing them. Store failures
/// propagate: a read error must not silently trigger a full rebuild.
pub(super) async fn execute_incremental(
    db: &Arc<dyn Connection>,
    compiled: &CompiledModel,
    store: &dyn WatermarkStore,
    full_refresh: bool,
) -> Result<()> {
    let unique_key = compiled
        .unique_key
        .as_deref()
        .ok_or_else(|| anyhow!("incremental model '{}' has no unique_key", compiled.name))?;

    if full_refresh {
        store
            .clear(&compiled.name)
            .context("Failed to reset watermark")?;
    }

    let exists = db.relation_exists(&compiled.relation).await?;
    let watermark = store.get(&compiled.name)?;

    match watermark {
        Some(mark) if exists && !full_refresh => {
            let windowed =
                apply_watermark_predicate(&compiled.sql, &compiled.cutoff_column, &mark.cutoff);
            db.merge_upsert(&compiled.quoted_relation, &windowed, unique_key)
                .await?;
        }
        _ => {
            db.create_table_as(&compiled.quoted_relation, &compiled.sql, true)
                .await?;
        }
    }

    // New high-water mark is what actually landed in the target. An empty
    // target commits nothing, leaving the next run on a full build.
    if let Some(max) = db
        .query_max(&compiled.quoted_relation, &compiled.cutoff_column)
        .await?
    {
        store
            .commit(&compiled.name, Watermark::new(max))
            .context("Failed to commit watermark")?;
    }

    Ok(())
}

#[cfg(test)]
#[path = "incremental_test.rs"]
mod tests;
