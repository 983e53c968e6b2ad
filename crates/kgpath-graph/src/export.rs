//! Batch export of path evidence for question entities.
//!
//! Candidates are picked by type property first, then by label, and only
//! when neither yields anything by question-shaped names. Each candidate's
//! two-hop paths are written to a pretty-printed JSON array for downstream
//! question/answer generation.

use crate::extraction::{ExtractionRequest, Extractor};
use crate::hop_filter::MULTI_HOP_MIN;
use crate::Node;
use chrono::{DateTime, Utc};
use kgpath_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Type values that mark a question entity unless overridden.
pub const DEFAULT_TYPE_VALUES: [&str; 3] = ["问题", "Question", "question"];

/// Properties consulted for the entity type, in priority order.
const TYPE_PROPERTIES: [&str; 4] = ["entity_type", "type", "类别", "category"];

/// Labels that mark a question entity.
const QUESTION_LABELS: [&str; 2] = ["问题", "Question"];

/// Name prefixes typical of questions.
const QUESTION_OPENERS: [&str; 10] = [
    "为什么",
    "如何",
    "怎样",
    "怎么",
    "是否",
    "什么是",
    "原因是什么",
    "影响是什么",
    "有哪些",
    "会导致什么",
];

// ============================================================================
// Candidate discovery
// ============================================================================

/// The entity's type value: the first non-empty type property.
fn entity_type(node: &Node) -> Option<String> {
    TYPE_PROPERTIES.iter().find_map(|key| {
        match node.properties.get(*key)? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) if s.is_empty() => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    })
}

/// Whether `name` reads like a question.
pub fn looks_like_question(name: &str) -> bool {
    let name = name.trim();
    !name.is_empty()
        && (name.ends_with('?')
            || name.ends_with('？')
            || QUESTION_OPENERS.iter().any(|opener| name.starts_with(opener)))
}

/// Select question entities from `entities`.
///
/// Type values compare case-insensitively. An empty `type_values` uses
/// [`DEFAULT_TYPE_VALUES`].
pub fn find_question_entities(entities: &[Node], type_values: &[String]) -> Vec<Node> {
    let type_set: HashSet<String> = if type_values.is_empty() {
        DEFAULT_TYPE_VALUES.iter().map(|v| v.to_lowercase()).collect()
    } else {
        type_values.iter().map(|v| v.to_lowercase()).collect()
    };

    let typed: Vec<Node> = entities
        .iter()
        .filter(|node| {
            entity_type(node).is_some_and(|t| type_set.contains(&t.to_lowercase()))
                || node
                    .labels
                    .iter()
                    .any(|l| QUESTION_LABELS.contains(&l.as_str()))
        })
        .cloned()
        .collect();
    if !typed.is_empty() {
        return typed;
    }

    log::debug!("no typed question entities; falling back to question-shaped names");
    entities
        .iter()
        .filter(|node| looks_like_question(&node.name))
        .cloned()
        .collect()
}

// ============================================================================
// Samples
// ============================================================================

/// One exported sample.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PathSample {
    /// Tenant graph the sample came from.
    pub graph_id: String,
    /// Element id of the question entity.
    pub question_entity_id: String,
    /// Name of the question entity.
    pub question_entity_name: String,
    /// Rendered multi-hop paths around the entity.
    pub paths: Vec<String>,
    /// How many of `paths` were cut short by the cycle guard.
    #[serde(default)]
    pub truncated: usize,
    /// Export time.
    pub exported_at: DateTime<Utc>,
}

/// Export parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportOptions {
    /// Tenant graph identifier recorded in each sample.
    pub graph_id: String,
    /// Type values that mark a question entity.
    pub type_values: Vec<String>,
    /// Restrict the entity scan to one label.
    pub label: Option<String>,
    /// Maximum number of samples.
    pub limit: Option<usize>,
    /// Maximum number of entities scanned for candidates.
    pub scan_limit: usize,
    /// Hop bound for each candidate's extraction.
    pub depth: i64,
    /// Minimum hop count of exported paths.
    pub min_hops: usize,
}

impl ExportOptions {
    /// Default options for `graph_id`: two-hop paths of question entities.
    pub fn new(graph_id: impl Into<String>) -> Self {
        Self {
            graph_id: graph_id.into(),
            type_values: DEFAULT_TYPE_VALUES.iter().map(|v| v.to_string()).collect(),
            label: None,
            limit: None,
            scan_limit: 10_000,
            depth: 2,
            min_hops: MULTI_HOP_MIN,
        }
    }
}

/// Discover question entities and extract their paths.
///
/// # Errors
///
/// Returns a connectivity error if any store call fails.
pub async fn build_samples(extractor: &Extractor, options: &ExportOptions) -> Result<Vec<PathSample>> {
    let entities = extractor
        .bounded(
            extractor
                .store()
                .list_entities(options.label.as_deref(), options.scan_limit.max(1)),
        )
        .await?;

    let mut candidates = find_question_entities(&entities, &options.type_values);
    if let Some(limit) = options.limit {
        candidates.truncate(limit);
    }
    log::info!(
        "exporting {} question entities out of {} scanned",
        candidates.len(),
        entities.len()
    );

    let mut samples = Vec::with_capacity(candidates.len());
    for node in candidates.into_iter().filter(|n| !n.name.is_empty()) {
        let request = ExtractionRequest::new(node.name.clone())
            .with_max_hops(options.depth)
            .with_min_hops(options.min_hops);
        let extraction = extractor.extract(&request).await?;
        let truncated = extraction.truncated_count();
        if truncated > 0 {
            log::warn!("'{}': {truncated} truncated paths exported", node.name);
        }
        let paths = extraction.rendered();
        log::debug!("'{}': {} paths", node.name, paths.len());

        samples.push(PathSample {
            graph_id: options.graph_id.clone(),
            question_entity_id: node.key,
            question_entity_name: node.name,
            paths,
            truncated,
            exported_at: Utc::now(),
        });
    }
    Ok(samples)
}

/// Write samples as a pretty JSON array, creating parent directories.
///
/// # Errors
///
/// Returns an I/O error naming `path` if the file cannot be written.
pub fn write_samples(path: &Path, samples: &[PathSample]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Error::io_with_path(e, parent))?;
    }
    let json = serde_json::to_string_pretty(samples)?;
    std::fs::write(path, json).map_err(|e| Error::io_with_path(e, path))?;
    log::info!("wrote {} samples to {}", samples.len(), path.display());
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
