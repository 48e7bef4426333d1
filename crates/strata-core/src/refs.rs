//! Reference marker extraction and rendering
//!
//! Model bodies carry two marker kinds: `{{ ref('model') }}` and
//! `{{ source('group', 'table') }}`. Extraction pulls the declared
//! references out of a body without evaluating anything; rendering
//! substitutes each marker with the physical relation it resolves to.
//! Resolution itself happens earlier, at graph build time, so rendering
//! is a literal text pass over validated input.

use crate::error::{CoreError, CoreResult};
use crate::model_name::ModelName;
use crate::source_name::SourceName;
use crate::sql_utils::{quote_ident, string_literal};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static REF_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\{\{\s*ref\s*\(\s*['"]([A-Za-z0-9_]+)['"]\s*\)\s*\}\}"#)
        .expect("static ref pattern")
});

static SOURCE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\{\{\s*source\s*\(\s*['"]([A-Za-z0-9_]+)['"]\s*,\s*['"]([A-Za-z0-9_]+)['"]\s*\)\s*\}\}"#,
    )
    .expect("static source pattern")
});

static ANY_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{[^{}]*\}\}").expect("static marker pattern"));

/// References declared in a model body, in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedRefs {
    /// Referenced model names, deduplicated
    pub models: Vec<ModelName>,
    /// Referenced (group, table) source pairs, deduplicated
    pub sources: Vec<(SourceName, String)>,
}

/// Extract every `ref()` and `source()` marker from a SQL body.
pub fn extract(sql: &str) -> ExtractedRefs {
    let mut refs = ExtractedRefs::default();

    for cap in REF_MARKER.captures_iter(sql) {
        let name = ModelName::new(&cap[1]);
        if !refs.models.contains(&name) {
            refs.models.push(name);
        }
    }

    for cap in SOURCE_MARKER.captures_iter(sql) {
        let pair = (SourceName::new(&cap[1]), cap[2].to_string());
        if !refs.sources.contains(&pair) {
            refs.sources.push(pair);
        }
    }

    refs
}

/// Find the first `{{ ... }}` span that is neither a valid `ref()` nor a
/// valid `source()` marker, if any.
///
/// Bodies are otherwise opaque SQL, so anything marker-shaped that the two
/// patterns reject is a typo the author should hear about at compile time
/// rather than from the database.
pub fn find_invalid_marker(sql: &str) -> Option<String> {
    ANY_MARKER
        .find_iter(sql)
        .map(|m| m.as_str())
        .find(|m| !REF_MARKER.is_match(m) && !SOURCE_MARKER.is_match(m))
        .map(|m| m.to_string())
}

/// Substitute every marker in `sql` with its physical relation.
///
/// `model_relations` and `source_relations` map validated references to
/// already-quoted relation names. A marker with no entry is an unresolved
/// reference; graph building catches those first, so hitting one here
/// means the caller skipped validation.
pub fn render(
    model: &str,
    sql: &str,
    model_relations: &HashMap<ModelName, String>,
    source_relations: &HashMap<(SourceName, String), String>,
) -> CoreResult<String> {
    let mut missing: Option<CoreError> = None;

    let pass1 = REF_MARKER.replace_all(sql, |cap: &regex::Captures<'_>| {
        match model_relations.get(&cap[1]) {
            Some(relation) => relation.clone(),
            None => {
                missing.get_or_insert(CoreError::UnresolvedReference {
                    model: model.to_string(),
                    reference: cap[1].to_string(),
                });
                cap[0].to_string()
            }
        }
    });

    let pass2 = SOURCE_MARKER.replace_all(&pass1, |cap: &regex::Captures<'_>| {
        let key = (SourceName::new(&cap[1]), cap[2].to_string());
        match source_relations.get(&key) {
            Some(relation) => relation.clone(),
            None => {
                missing.get_or_insert(CoreError::UnresolvedSource {
                    model: model.to_string(),
                    group: cap[1].to_string(),
                    table: cap[2].to_string(),
                });
                cap[0].to_string()
            }
        }
    });

    match missing {
        Some(err) => Err(err),
        None => Ok(pass2.into_owned()),
    }
}

/// Wrap a rendered query in the incremental watermark predicate.
///
/// Produces a select over the original query restricted to rows whose
/// cutoff column is strictly newer than the persisted watermark. The
/// watermark is interpolated as an escaped string literal; comparison
/// semantics are the target store's.
pub fn apply_watermark_predicate(select: &str, cutoff_column: &str, watermark: &str) -> String {
    let inner = select.trim().trim_end_matches(';');
    format!(
        "SELECT * FROM ({}) AS watermark_window WHERE {} > {}",
        inner,
        quote_ident(cutoff_column),
        string_literal(watermark)
    )
}

#[cfg(test)]
#[path = "refs_test.rs"]
mod tests;
