//! Run manifest: per-model execution record for one engine run
//!
//! Created when a run starts with every scheduled model `pending`;
//! updated as models start, finish, fail, or get skipped; persisted as a
//! JSON artifact at run end so a failed subgraph can be re-run precisely.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use uuid::Uuid;

use crate::error::CoreResult;
use crate::model_name::ModelName;

/// Terminal and in-flight states of one model within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelStatus {
    /// Scheduled but not started
    Pending,
    /// Currently executing
    Running,
    /// Finished successfully
    Succeeded,
    /// Execution or state failure
    Failed,
    /// Not started because an upstream failed or the run was aborted
    Skipped,
}

impl std::fmt::Display for ModelStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelStatus::Pending => write!(f, "pending"),
            ModelStatus::Running => write!(f, "running"),
            ModelStatus::Succeeded => write!(f, "succeeded"),
            ModelStatus::Failed => write!(f, "failed"),
            ModelStatus::Skipped => write!(f, "skipped"),
        }
    }
}

/// One model's record within the manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRecord {
    /// Model name
    pub name: ModelName,

    /// Current status
    pub status: ModelStatus,

    /// When execution started
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    /// When execution finished (success or failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,

    /// Error detail when failed, or the skip reason when skipped
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ModelRecord {
    fn new(name: ModelName) -> Self {
        Self {
            name,
            status: ModelStatus::Pending,
            started_at: None,
            finished_at: None,
            error: None,
        }
    }

    /// Wall-clock duration in milliseconds, when both timestamps exist
    pub fn duration_ms(&self) -> Option<i64> {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => Some((end - start).num_milliseconds()),
            _ => None,
        }
    }
}

/// The per-run record of every scheduled model's execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    /// Short unique identifier for this run
    pub run_id: String,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When the run finished
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,

    /// Records in scheduled order
    pub models: Vec<ModelRecord>,
}

impl RunManifest {
    /// Create a manifest with every model `pending`, in scheduled order
    pub fn new(scheduled: Vec<ModelName>) -> Self {
        Self {
            run_id: Uuid::new_v4().to_string()[..8].to_string(),
            started_at: Utc::now(),
            finished_at: None,
            models: scheduled.into_iter().map(ModelRecord::new).collect(),
        }
    }

    fn record_mut(&mut self, name: &str) -> Option<&mut ModelRecord> {
        self.models.iter_mut().find(|r| r.name == name)
    }

    /// Look up a model's record
    pub fn record(&self, name: &str) -> Option<&ModelRecord> {
        self.models.iter().find(|r| r.name == name)
    }

    /// Current status of a model, if it is part of this run
    pub fn status(&self, name: &str) -> Option<ModelStatus> {
        self.record(name).map(|r| r.status)
    }

    /// Mark a model as running
    pub fn mark_running(&mut self, name: &str) {
        if let Some(record) = self.record_mut(name) {
            record.status = ModelStatus::Running;
            record.started_at = Some(Utc::now());
        }
    }

    /// Mark a model as succeeded
    pub fn mark_succeeded(&mut self, name: &str) {
        if let Some(record) = self.record_mut(name) {
            record.status = ModelStatus::Succeeded;
            record.finished_at = Some(Utc::now());
        }
    }

    /// Mark a model as failed with error detail
    pub fn mark_failed(&mut self, name: &str, error: impl Into<String>) {
        if let Some(record) = self.record_mut(name) {
            record.status = ModelStatus::Failed;
            record.finished_at = Some(Utc::now());
            record.error = Some(error.into());
        }
    }

    /// Mark a not-yet-started model as skipped with a reason
    pub fn mark_skipped(&mut self, name: &str, reason: impl Into<String>) {
        if let Some(record) = self.record_mut(name) {
            record.status = ModelStatus::Skipped;
            record.error = Some(reason.into());
        }
    }

    /// Stamp the run end time
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Overall result: success iff no model failed
    pub fn is_success(&self) -> bool {
        !self
            .models
            .iter()
            .any(|r| r.status == ModelStatus::Failed)
    }

    /// Names of failed models, in scheduled order
    pub fn failed_models(&self) -> Vec<&ModelRecord> {
        self.models
            .iter()
            .filter(|r| r.status == ModelStatus::Failed)
            .collect()
    }

    /// Count of models with the given status
    pub fn count(&self, status: ModelStatus) -> usize {
        self.models.iter().filter(|r| r.status == status).count()
    }

    /// Load a manifest from a JSON file
    pub fn load(path: &Path) -> CoreResult<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Save the manifest atomically (write to a temp file, then rename)
    pub fn save(&self, path: &Path) -> CoreResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let temp_path = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&temp_path, json)?;
        fs::rename(&temp_path, path)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "manifest_test.rs"]
mod tests;
