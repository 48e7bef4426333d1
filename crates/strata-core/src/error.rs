//! Error types for strata-core

use thiserror::Error;

/// Core error type for Strata
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E002: Failed to parse configuration file
    #[error("[E002] Failed to parse config: {message}")]
    ConfigParseError { message: String },

    /// E003: Project directory not found
    #[error("[E003] Project directory not found: {path}")]
    ProjectNotFound { path: String },

    /// E004: Model not registered
    #[error("[E004] Model not found: {name}")]
    ModelNotFound { name: String },

    /// E005: Duplicate model name
    #[error("[E005] Duplicate model name: {name}")]
    DuplicateModel { name: String },

    /// E006: Model SQL body is empty
    #[error("[E006] Model '{name}' has an empty SQL body")]
    EmptyModelBody { name: String },

    /// E007: Incremental model without a unique key
    #[error("[E007] Incremental model '{name}' requires a unique_key")]
    MissingUniqueKey { name: String },

    /// E008: Model references itself
    #[error("[E008] Model '{name}' references itself")]
    SelfReference { name: String },

    /// E009: Reference to a model that is not registered
    #[error("[E009] Model '{model}' references unknown model '{reference}'")]
    UnresolvedReference { model: String, reference: String },

    /// E010: Reference to a source that is not registered
    #[error("[E010] Model '{model}' references unknown source '{group}.{table}'")]
    UnresolvedSource {
        model: String,
        group: String,
        table: String,
    },

    /// E011: Marker syntax that neither ref() nor source() matches
    #[error("[E011] Model '{model}' contains an unrecognized reference marker: {marker}")]
    InvalidMarker { model: String, marker: String },

    /// E012: Circular dependency detected
    #[error("[E012] Circular dependency detected: {cycle}")]
    CircularDependency { cycle: String },

    /// E013: Selection names a model that does not exist
    #[error("[E013] Unknown model in selection: {name}")]
    UnknownSelection { name: String },

    /// E014: Empty name where a non-empty identifier is required
    #[error("[E014] Empty name: {context}")]
    EmptyName { context: String },

    // Source error types (SRC001-SRC004)
    /// SRC001: Failed to parse source file
    #[error("[SRC001] Failed to parse source file {path}: {details}")]
    SourceParseError { path: String, details: String },

    /// SRC002: Source has no tables defined
    #[error("[SRC002] Source '{name}' has no tables defined in {path}")]
    SourceEmptyTables { name: String, path: String },

    /// SRC003: Duplicate table in source
    #[error("[SRC003] Duplicate table '{table}' in source '{source_name}'")]
    SourceDuplicateTable { table: String, source_name: String },

    /// SRC004: Duplicate source group name
    #[error("[SRC004] Duplicate source name '{name}' in {path1} and {path2}")]
    SourceDuplicateName {
        name: String,
        path1: String,
        path2: String,
    },

    /// S001: Watermark store read or write failure
    ///
    /// Never downgraded to "no watermark": a failed read must fail the
    /// model rather than silently trigger a full rebuild.
    #[error("[S001] Watermark state error: {message}")]
    State { message: String },

    /// E015: IO error
    #[error("[E015] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// E016: IO error with file path context
    #[error("[E016] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// E017: YAML parse error
    #[error("[E017] YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
