//! Source definitions for externally ingested raw data
//!
//! Sources point at physical tables that exist in the target store but are
//! not managed by Strata (e.g. tables restored from an extraction dump).
//! They are immutable once registered and have no dependencies of their own.

use crate::error::{CoreError, CoreResult};
use crate::source_name::SourceName;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A source definition file (YAML with `kind: sources`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFile {
    /// Must be "sources" - enforced during parsing
    pub kind: SourceKind,

    /// Logical group name used in `source('group', 'table')` markers
    pub name: SourceName,

    /// Description of the source group
    #[serde(default)]
    pub description: Option<String>,

    /// Physical schema the group's tables live in
    pub schema: String,

    /// Tables in this source
    pub tables: Vec<SourceTable>,
}

/// Enforces kind: sources
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Sources,
}

/// A single table within a source group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceTable {
    /// Logical name used in models
    pub name: String,

    /// Actual table name in the target store, if different
    #[serde(default)]
    pub identifier: Option<String>,

    /// Description of the table
    #[serde(default)]
    pub description: Option<String>,
}

impl SourceFile {
    /// Load and validate a source file from a path
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;

        let source: SourceFile =
            serde_yaml::from_str(&content).map_err(|e| CoreError::SourceParseError {
                path: path.display().to_string(),
                details: e.to_string(),
            })?;

        if source.tables.is_empty() {
            return Err(CoreError::SourceEmptyTables {
                name: source.name.to_string(),
                path: path.display().to_string(),
            });
        }

        let mut seen = std::collections::HashSet::new();
        for table in &source.tables {
            if !seen.insert(table.name.as_str()) {
                return Err(CoreError::SourceDuplicateTable {
                    table: table.name.clone(),
                    source_name: source.name.to_string(),
                });
            }
        }

        Ok(source)
    }

    /// Look up a table by its logical name
    pub fn table(&self, name: &str) -> Option<&SourceTable> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Physical relation of a table in this group, unquoted
    pub fn relation(&self, table: &SourceTable) -> String {
        let identifier = table.identifier.as_deref().unwrap_or(&table.name);
        format!("{}.{}", self.schema, identifier)
    }
}

/// Minimal YAML probe to check the `kind` field without a full parse
#[derive(Deserialize)]
struct SourceKindProbe {
    #[serde(default)]
    kind: Option<SourceKind>,
}

/// Discover and load all source files under the given directories.
///
/// Directories that do not exist are skipped; YAML files without
/// `kind: sources` are ignored so source directories can hold other
/// configuration. Duplicate group names across files are an error.
pub fn discover_sources(source_paths: &[PathBuf]) -> CoreResult<Vec<SourceFile>> {
    let mut sources = Vec::new();

    for source_path in source_paths {
        if !source_path.exists() {
            continue;
        }
        discover_recursive(source_path, &mut sources)?;
    }

    let mut seen: std::collections::HashMap<SourceName, usize> = std::collections::HashMap::new();
    for (idx, source) in sources.iter().enumerate() {
        if let Some(&prev) = seen.get(&source.name) {
            return Err(CoreError::SourceDuplicateName {
                name: source.name.to_string(),
                path1: format!("source #{}", prev + 1),
                path2: format!("source #{}", idx + 1),
            });
        }
        seen.insert(source.name.clone(), idx);
    }

    Ok(sources)
}

fn discover_recursive(dir: &Path, sources: &mut Vec<SourceFile>) -> CoreResult<()> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .map(|e| e.path())
        .collect();
    // Deterministic discovery order regardless of directory iteration order
    entries.sort();

    for path in entries {
        if path.is_dir() {
            discover_recursive(&path, sources)?;
        } else if path.extension().is_some_and(|e| e == "yml" || e == "yaml") {
            let content = match std::fs::read_to_string(&path) {
                Ok(c) => c,
                Err(e) => {
                    log::warn!("cannot read {}: {}", path.display(), e);
                    continue;
                }
            };

            let probe: SourceKindProbe = match serde_yaml::from_str(&content) {
                Ok(p) => p,
                Err(_) => continue,
            };
            if !matches!(probe.kind, Some(SourceKind::Sources)) {
                continue;
            }

            // The probe matched, so parse errors here are real
            sources.push(SourceFile::load(&path)?);
        }
    }

    Ok(())
}
