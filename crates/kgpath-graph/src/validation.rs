//! Subgraph validation and integrity checking.
//!
//! The assembler already guarantees most of these invariants for data it
//! produced; validation exists for subgraphs built or edited elsewhere and
//! to explain, ahead of enumeration, why paths may come out truncated.

use crate::{PathModel, Subgraph};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};

// ============================================================================
// Types
// ============================================================================

/// Result of subgraph validation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Whether the subgraph is valid (no errors).
    pub valid: bool,
    /// Violations of the subgraph invariants.
    pub errors: Vec<ValidationIssue>,
    /// Conditions the enumerator tolerates but reports.
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Create a new empty (valid) result.
    pub fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Add an error (marks the subgraph as invalid).
    pub fn add_error(&mut self, issue: ValidationIssue) {
        self.valid = false;
        self.errors.push(issue);
    }

    /// Add a warning.
    pub fn add_warning(&mut self, issue: ValidationIssue) {
        self.warnings.push(issue);
    }

    /// Total issue count (errors + warnings).
    pub fn total_issues(&self) -> usize {
        self.errors.len() + self.warnings.len()
    }

    /// Whether an issue with `code` was reported.
    pub fn has_issue(&self, code: &str) -> bool {
        self.errors
            .iter()
            .chain(&self.warnings)
            .any(|issue| issue.code == code)
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

/// A single finding.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Issue code, e.g. `DANGLING_EDGES`.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Affected node keys.
    pub nodes: Vec<String>,
    /// Affected edge keys.
    pub edges: Vec<String>,
}

impl ValidationIssue {
    /// Create a new issue.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Attach affected nodes.
    pub fn with_nodes(mut self, nodes: Vec<String>) -> Self {
        self.nodes = nodes;
        self
    }

    /// Attach affected edges.
    pub fn with_edges(mut self, edges: Vec<String>) -> Self {
        self.edges = edges;
        self
    }
}

// ============================================================================
// Validation functions
// ============================================================================

/// Validate a subgraph.
///
/// Errors: dangling edge endpoints, empty node keys, unlabeled nodes,
/// duplicate node keys. Warnings: malformed edges, self-loops, directed
/// cycles, isolated nodes.
pub fn validate_subgraph(subgraph: &Subgraph) -> ValidationResult {
    let mut result = ValidationResult::new();

    check_node_identity(subgraph, &mut result);
    check_dangling_edges(subgraph, &mut result);
    check_malformed_edges(subgraph, &mut result);
    check_self_loops(subgraph, &mut result);
    check_cycles_and_isolation(subgraph, &mut result);

    result
}

/// Quick check that the subgraph has no validation errors.
pub fn is_valid(subgraph: &Subgraph) -> bool {
    validate_subgraph(subgraph).valid
}

// ============================================================================
// Individual checks
// ============================================================================

fn check_node_identity(subgraph: &Subgraph, result: &mut ValidationResult) {
    let empty_keys: Vec<String> = subgraph
        .nodes
        .iter()
        .filter(|n| n.key.is_empty())
        .map(|n| n.name.clone())
        .collect();
    if !empty_keys.is_empty() {
        result.add_error(
            ValidationIssue::new(
                "EMPTY_KEYS",
                format!("{} node(s) have no element id", empty_keys.len()),
            )
            .with_nodes(empty_keys),
        );
    }

    let unlabeled: Vec<String> = subgraph
        .nodes
        .iter()
        .filter(|n| n.labels.is_empty())
        .map(|n| n.key.clone())
        .collect();
    if !unlabeled.is_empty() {
        result.add_error(
            ValidationIssue::new(
                "UNLABELED_NODES",
                format!("{} node(s) carry no label", unlabeled.len()),
            )
            .with_nodes(unlabeled),
        );
    }

    let mut seen = HashSet::new();
    let duplicates: BTreeSet<&str> = subgraph
        .nodes
        .iter()
        .filter(|n| !n.key.is_empty() && !seen.insert(n.key.as_str()))
        .map(|n| n.key.as_str())
        .collect();
    if !duplicates.is_empty() {
        result.add_error(
            ValidationIssue::new(
                "DUPLICATE_KEYS",
                format!("{} node key(s) occur more than once", duplicates.len()),
            )
            .with_nodes(duplicates.into_iter().map(String::from).collect()),
        );
    }
}

fn check_dangling_edges(subgraph: &Subgraph, result: &mut ValidationResult) {
    let keys: HashSet<&str> = subgraph.nodes.iter().map(|n| n.key.as_str()).collect();
    let mut missing: Vec<String> = Vec::new();
    let mut edges: Vec<String> = Vec::new();

    for edge in &subgraph.edges {
        let mut dangling = false;
        for endpoint in [&edge.start, &edge.end] {
            if !keys.contains(endpoint.as_str()) {
                dangling = true;
                if !missing.contains(endpoint) {
                    missing.push(endpoint.clone());
                }
            }
        }
        if dangling {
            edges.push(edge.key.clone());
        }
    }

    if !edges.is_empty() {
        result.add_error(
            ValidationIssue::new(
                "DANGLING_EDGES",
                format!("{} edge(s) reference nodes outside the subgraph", edges.len()),
            )
            .with_nodes(missing)
            .with_edges(edges),
        );
    }
}

fn check_malformed_edges(subgraph: &Subgraph, result: &mut ValidationResult) {
    let malformed: Vec<String> = subgraph
        .edges
        .iter()
        .filter(|e| !e.is_well_formed())
        .map(|e| e.key.clone())
        .collect();
    if !malformed.is_empty() {
        result.add_warning(
            ValidationIssue::new(
                "MALFORMED_EDGES",
                format!(
                    "{} edge(s) have no relation type and will be skipped",
                    malformed.len()
                ),
            )
            .with_edges(malformed),
        );
    }
}

fn check_self_loops(subgraph: &Subgraph, result: &mut ValidationResult) {
    let loops: Vec<String> = subgraph
        .edges
        .iter()
        .filter(|e| e.start == e.end)
        .map(|e| e.key.clone())
        .collect();
    if !loops.is_empty() {
        result.add_warning(
            ValidationIssue::new(
                "SELF_LOOPS",
                format!("{} edge(s) are self-loops", loops.len()),
            )
            .with_edges(loops),
        );
    }
}

fn check_cycles_and_isolation(subgraph: &Subgraph, result: &mut ValidationResult) {
    let model = PathModel::build(subgraph);

    if model.has_cycle() {
        result.add_warning(ValidationIssue::new(
            "CYCLES",
            "directed cycle detected; paths through it will be truncated",
        ));
    }

    let mut degree: HashMap<&str, usize> = HashMap::new();
    for (key, indeg) in model.in_degrees() {
        let outdeg = model.out_degree(key).unwrap_or(0);
        degree.insert(key, indeg + outdeg);
    }
    let isolated: Vec<String> = subgraph
        .nodes
        .iter()
        .filter(|n| degree.get(n.key.as_str()) == Some(&0))
        .map(|n| n.key.clone())
        .collect();
    if !isolated.is_empty() {
        result.add_warning(
            ValidationIssue::new(
                "ISOLATED_NODES",
                format!("{} node(s) have no usable connections", isolated.len()),
            )
            .with_nodes(isolated),
        );
    }
}

// ============================================================================
// Tests
// ============================================================================
