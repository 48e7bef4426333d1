//! Incremental state: per-model high-water marks
//!
//! A watermark records the highest cutoff value observed in a model's
//! target relation after a confirmed successful build. The next run uses
//! it to window the model's query down to new rows. Absence of a
//! watermark means "never built": the model gets a full build.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{CoreError, CoreResult};
use crate::model_name::ModelName;

/// A committed high-water mark for one incremental model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Watermark {
    /// Highest cutoff value seen in the target, as a string
    pub cutoff: String,

    /// When the mark was committed
    pub committed_at: DateTime<Utc>,
}

impl Watermark {
    pub fn new(cutoff: impl Into<String>) -> Self {
        Self {
            cutoff: cutoff.into(),
            committed_at: Utc::now(),
        }
    }
}

/// Storage for incremental watermarks
///
/// Commits must only happen after the corresponding merge has been
/// confirmed; a failed commit is a real failure for the model, never
/// silently swallowed, because losing it would make the next run re-read
/// already-merged rows.
pub trait WatermarkStore: Send + Sync {
    /// Fetch the committed watermark for a model, if any
    fn get(&self, model: &ModelName) -> CoreResult<Option<Watermark>>;

    /// Commit a new watermark for a model
    fn commit(&self, model: &ModelName, watermark: Watermark) -> CoreResult<()>;

    /// Remove a model's watermark, forcing the next run to a full build
    fn clear(&self, model: &ModelName) -> CoreResult<()>;

    /// Remove every stored watermark
    fn clear_all(&self) -> CoreResult<()>;
}

/// JSON-file-backed store, one file for the whole project
///
/// The file maps model name to watermark. Writes go through a temp file
/// and rename so a crash mid-write cannot truncate existing state.
pub struct FileWatermarkStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within one process.
    lock: Mutex<()>,
}

impl FileWatermarkStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn read_all(&self) -> CoreResult<HashMap<ModelName, Watermark>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(HashMap::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn write_all(&self, marks: &HashMap<ModelName, Watermark>) -> CoreResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let temp_path = self.path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(marks)?;
        fs::write(&temp_path, json)?;
        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }

    fn guard(&self) -> CoreResult<std::sync::MutexGuard<'_, ()>> {
        self.lock.lock().map_err(|_| CoreError::State {
            message: "watermark store lock poisoned".to_string(),
        })
    }
}

impl WatermarkStore for FileWatermarkStore {
    fn get(&self, model: &ModelName) -> CoreResult<Option<Watermark>> {
        let _guard = self.guard()?;
        Ok(self.read_all()?.get(model).cloned())
    }

    fn commit(&self, model: &ModelName, watermark: Watermark) -> CoreResult<()> {
        let _guard = self.guard()?;
        let mut marks = self.read_all()?;
        marks.insert(model.clone(), watermark);
        self.write_all(&marks)
    }

    fn clear(&self, model: &ModelName) -> CoreResult<()> {
        let _guard = self.guard()?;
        let mut marks = self.read_all()?;
        if marks.remove(model).is_some() {
            self.write_all(&marks)?;
        }
        Ok(())
    }

    fn clear_all(&self) -> CoreResult<()> {
        let _guard = self.guard()?;
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

/// In-memory store for tests and ephemeral runs
#[derive(Default)]
pub struct MemoryWatermarkStore {
    marks: Mutex<HashMap<ModelName, Watermark>>,
}

impl MemoryWatermarkStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> CoreResult<std::sync::MutexGuard<'_, HashMap<ModelName, Watermark>>> {
        self.marks.lock().map_err(|_| CoreError::State {
            message: "watermark store lock poisoned".to_string(),
        })
    }
}

impl WatermarkStore for MemoryWatermarkStore {
    fn get(&self, model: &ModelName) -> CoreResult<Option<Watermark>> {
        Ok(self.guard()?.get(model).cloned())
    }

    fn commit(&self, model: &ModelName, watermark: Watermark) -> CoreResult<()> {
        self.guard()?.insert(model.clone(), watermark);
        Ok(())
    }

    fn clear(&self, model: &ModelName) -> CoreResult<()> {
        self.guard()?.remove(model);
        Ok(())
    }

    fn clear_all(&self) -> CoreResult<()> {
        self.guard()?.clear();
        Ok(())
    }
}

/// Path of the watermark file under a project's target directory
pub fn watermark_file(target_dir: &Path) -> PathBuf {
    target_dir.join("watermarks.json")
}

#[cfg(test)]
#[path = "watermark_test.rs"]
mod tests;
