//! strata-core - Core library for Strata
//!
//! This crate provides the compile-time half of the engine: configuration
//! parsing, model and source catalogs, reference extraction and rendering,
//! dependency graph construction, batch scheduling, and the durable run
//! state (manifest and incremental watermarks).

pub mod config;
pub mod dag;
pub mod error;
pub mod manifest;
pub mod model;
pub mod model_name;
mod newtype_string;
pub mod project;
pub mod refs;
pub mod registry;
pub mod schedule;
pub mod source;
pub mod source_name;
pub mod sql_utils;
pub mod watermark;

pub use config::{Config, DatabaseConfig, Materialization};
pub use dag::ModelDag;
pub use error::{CoreError, CoreResult};
pub use manifest::{ModelRecord, ModelStatus, RunManifest};
pub use model::{Model, ModelConfig};
pub use model_name::ModelName;
pub use project::Project;
pub use refs::ExtractedRefs;
pub use registry::Registry;
pub use schedule::Schedule;
pub use source::{SourceFile, SourceTable};
pub use source_name::SourceName;
pub use watermark::{FileWatermarkStore, MemoryWatermarkStore, Watermark, WatermarkStore};
