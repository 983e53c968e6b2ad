//! Root-to-leaf path enumeration.
//!
//! [`PathModel`] is the adjacency/in-degree view of an assembled subgraph,
//! backed by a petgraph `DiGraph`. Only forward (`start -> end`) edges with
//! a relation type and two present endpoints enter the model; anything else
//! is skipped with a warning so a malformed edge never aborts enumeration.
//!
//! [`PathEnumerator`] walks every root (in-degree zero) depth first and
//! emits one [`Path`] per root-to-leaf walk. Nodes on the current recursion
//! stack are tracked: reaching one again closes a cycle, and the branch is
//! emitted with `truncated` set instead of recursing forever. An optional
//! depth bound truncates the same way.

use crate::{Edge, Node, Path, Subgraph};
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::{HashMap, HashSet};

// ============================================================================
// PathModel
// ============================================================================

/// Adjacency and degree bookkeeping over a subgraph.
#[derive(Debug)]
pub struct PathModel<'a> {
    graph: DiGraph<&'a Node, &'a Edge>,
    indices: HashMap<&'a str, NodeIndex>,
    skipped_edges: usize,
}

impl<'a> PathModel<'a> {
    /// Build the model for `subgraph`.
    pub fn build(subgraph: &'a Subgraph) -> Self {
        let mut graph = DiGraph::with_capacity(subgraph.node_count(), subgraph.edge_count());
        let mut indices: HashMap<&'a str, NodeIndex> = HashMap::new();

        for node in &subgraph.nodes {
            if indices.contains_key(node.key.as_str()) {
                continue;
            }
            let idx = graph.add_node(node);
            indices.insert(node.key.as_str(), idx);
        }

        let mut skipped_edges = 0;
        for edge in &subgraph.edges {
            if !edge.is_well_formed() {
                log::warn!(
                    "skipping edge '{}' ({} -> {}): missing relation type",
                    edge.key,
                    edge.start,
                    edge.end
                );
                skipped_edges += 1;
                continue;
            }
            match (
                indices.get(edge.start.as_str()),
                indices.get(edge.end.as_str()),
            ) {
                (Some(&from), Some(&to)) => {
                    graph.add_edge(from, to, edge);
                }
                _ => {
                    log::warn!(
                        "skipping edge '{}' ({} -> {}): endpoint not in subgraph",
                        edge.key,
                        edge.start,
                        edge.end
                    );
                    skipped_edges += 1;
                }
            }
        }

        Self {
            graph,
            indices,
            skipped_edges,
        }
    }

    /// Number of nodes in the model.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges admitted to the model.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Number of edges left out as malformed.
    pub fn skipped_edges(&self) -> usize {
        self.skipped_edges
    }

    /// In-degree of the node with `key`.
    pub fn in_degree(&self, key: &str) -> Option<usize> {
        self.indices.get(key).map(|&idx| self.in_degree_at(idx))
    }

    /// Out-degree of the node with `key`.
    pub fn out_degree(&self, key: &str) -> Option<usize> {
        self.indices.get(key).map(|&idx| {
            self.graph
                .edges_directed(idx, petgraph::Direction::Outgoing)
                .count()
        })
    }

    /// In-degree of every node, zero included, in node order.
    pub fn in_degrees(&self) -> Vec<(&'a str, usize)> {
        self.graph
            .node_indices()
            .map(|idx| (self.graph[idx].key.as_str(), self.in_degree_at(idx)))
            .collect()
    }

    /// Nodes without incoming edges, in node order.
    pub fn roots(&self) -> Vec<&'a Node> {
        self.root_indices().map(|idx| self.graph[idx]).collect()
    }

    /// Nodes without outgoing edges, in node order.
    pub fn leaves(&self) -> Vec<&'a Node> {
        self.graph
            .node_indices()
            .filter(|&idx| self.outgoing(idx).is_empty())
            .map(|idx| self.graph[idx])
            .collect()
    }

    /// True when the model contains a directed cycle (self-loops included).
    pub fn has_cycle(&self) -> bool {
        petgraph::algo::is_cyclic_directed(&self.graph)
    }

    fn in_degree_at(&self, idx: NodeIndex) -> usize {
        self.graph
            .edges_directed(idx, petgraph::Direction::Incoming)
            .count()
    }

    fn root_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph
            .node_indices()
            .filter(|&idx| self.in_degree_at(idx) == 0)
    }

    /// Outgoing edges of `idx` in insertion order.
    fn outgoing(&self, idx: NodeIndex) -> Vec<(EdgeIndex, NodeIndex)> {
        let mut edges: Vec<(EdgeIndex, NodeIndex)> =
            self.graph.edges(idx).map(|e| (e.id(), e.target())).collect();
        edges.sort_by_key(|(id, _)| *id);
        edges
    }
}

// ============================================================================
// PathEnumerator
// ============================================================================

/// Depth-first enumerator of root-to-leaf paths.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PathEnumerator {
    max_depth: Option<usize>,
}

impl PathEnumerator {
    /// Create an enumerator without a depth bound (the cycle guard still applies).
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound the number of hops followed from a root. Zero is treated as one.
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth.map(|d| d.max(1));
        self
    }

    /// The configured depth bound.
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Enumerate all root-to-leaf paths of `subgraph`.
    pub fn enumerate(&self, subgraph: &Subgraph) -> Vec<Path> {
        self.enumerate_model(&PathModel::build(subgraph))
    }

    /// Enumerate over an already built model.
    pub fn enumerate_model(&self, model: &PathModel<'_>) -> Vec<Path> {
        let mut out = Vec::new();
        let mut on_stack = HashSet::new();
        for root in model.root_indices() {
            let mut path = Path::single(model.graph[root].name.clone());
            self.descend(model, root, &mut path, &mut on_stack, &mut out);
        }
        let truncated = out.iter().filter(|p| p.truncated).count();
        if truncated > 0 {
            log::debug!("{truncated} of {} paths truncated", out.len());
        }
        out
    }

    fn descend(
        &self,
        model: &PathModel<'_>,
        idx: NodeIndex,
        path: &mut Path,
        on_stack: &mut HashSet<NodeIndex>,
        out: &mut Vec<Path>,
    ) {
        let next = model.outgoing(idx);
        if next.is_empty() {
            out.push(path.clone());
            return;
        }
        if self.max_depth.is_some_and(|max| path.hop_count() >= max) {
            out.push(truncated(path));
            return;
        }

        on_stack.insert(idx);
        for (edge_idx, target) in next {
            let edge = model.graph[edge_idx];
            path.push(edge.relation_type.as_str(), model.graph[target].name.as_str());
            if on_stack.contains(&target) {
                log::debug!("cycle closed by edge '{}'", edge.key);
                out.push(truncated(path));
            } else {
                self.descend(model, target, path, on_stack, out);
            }
            path.pop();
        }
        on_stack.remove(&idx);
    }
}

fn truncated(path: &Path) -> Path {
    let mut copy = path.clone();
    copy.truncated = true;
    copy
}

/// Enumerate all root-to-leaf paths without a depth bound.
pub fn enumerate_paths(subgraph: &Subgraph) -> Vec<Path> {
    PathEnumerator::new().enumerate(subgraph)
}

// ============================================================================
// Tests
// ============================================================================
