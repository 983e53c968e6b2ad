//! Subgraph statistics.
//!
//! Degree figures come from the enumerator's [`PathModel`], so they describe
//! exactly the graph the enumerator walks (malformed edges excluded).

use crate::{PathModel, Subgraph};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Types
// ============================================================================

/// Structural summary of an assembled subgraph.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SubgraphStats {
    /// Total number of nodes.
    pub node_count: usize,
    /// Total number of edges, malformed ones included.
    pub edge_count: usize,
    /// Edges the enumerator skips.
    pub skipped_edges: usize,
    /// Nodes per label. A node with several labels counts once per label.
    pub label_distribution: BTreeMap<String, usize>,
    /// Edges per relation type.
    pub relation_distribution: BTreeMap<String, usize>,
    /// Nodes without incoming edges.
    pub root_count: usize,
    /// Nodes without outgoing edges.
    pub leaf_count: usize,
    /// Nodes without any edges.
    pub isolated_count: usize,
    /// Maximum in-degree.
    pub max_in_degree: usize,
    /// Maximum out-degree.
    pub max_out_degree: usize,
    /// Name of the first node holding the maximum in-degree.
    pub most_referenced: Option<String>,
    /// Name of the first node holding the maximum out-degree.
    pub most_referencing: Option<String>,
}

// ============================================================================
// Functions
// ============================================================================

/// Compute statistics for `subgraph`.
pub fn compute_stats(subgraph: &Subgraph) -> SubgraphStats {
    let model = PathModel::build(subgraph);

    let mut label_distribution = BTreeMap::new();
    for node in &subgraph.nodes {
        for label in &node.labels {
            *label_distribution.entry(label.clone()).or_insert(0) += 1;
        }
    }

    let mut relation_distribution = BTreeMap::new();
    for edge in subgraph.edges.iter().filter(|e| e.is_well_formed()) {
        *relation_distribution
            .entry(edge.relation_type.clone())
            .or_insert(0) += 1;
    }

    let mut stats = SubgraphStats {
        node_count: subgraph.node_count(),
        edge_count: subgraph.edge_count(),
        skipped_edges: model.skipped_edges(),
        label_distribution,
        relation_distribution,
        root_count: model.roots().len(),
        leaf_count: model.leaves().len(),
        ..Default::default()
    };

    for node in &subgraph.nodes {
        let (Some(indeg), Some(outdeg)) = (model.in_degree(&node.key), model.out_degree(&node.key))
        else {
            continue;
        };
        if indeg == 0 && outdeg == 0 {
            stats.isolated_count += 1;
        }
        if indeg > stats.max_in_degree {
            stats.max_in_degree = indeg;
            stats.most_referenced = Some(node.name.clone());
        }
        if outdeg > stats.max_out_degree {
            stats.max_out_degree = outdeg;
            stats.most_referencing = Some(node.name.clone());
        }
    }

    stats
}

/// One-line size summary.
pub fn quick_summary(subgraph: &Subgraph) -> String {
    format!(
        "{} nodes, {} edges",
        subgraph.node_count(),
        subgraph.edge_count()
    )
}

// ============================================================================
// Tests
// ============================================================================
