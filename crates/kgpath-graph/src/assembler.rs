//! Subgraph assembly from raw path records.
//!
//! The assembler folds a stream of walks into one consistent node/edge set:
//!
//! 1. Nodes are indexed by element key; the first occurrence wins.
//! 2. With a label filter, each node is classified once, on first sight.
//! 3. Edges are indexed by their own key, so parallel edges of different
//!    types between the same pair both survive.
//! 4. An edge survives when either endpoint passed the filter; the other
//!    endpoint is pulled back in from the unfiltered index. Filtering can
//!    therefore add boundary nodes but never strands an edge.

use crate::{Edge, LabelFilter, Node, RawPathRecord, Subgraph};
use std::collections::{HashMap, HashSet};

/// Incremental builder for a [`Subgraph`].
#[derive(Debug, Default)]
pub struct SubgraphAssembler {
    filter: Option<LabelFilter>,
    nodes: Vec<Node>,
    node_index: HashMap<String, usize>,
    passed_filter: HashSet<String>,
    edges: Vec<Edge>,
    edge_keys: HashSet<String>,
    dropped_nodes: usize,
    dropped_edges: usize,
}

/// Counters describing what the assembler discarded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AssemblyReport {
    /// Nodes discarded for an empty key or no labels.
    pub dropped_nodes: usize,
    /// Edges discarded for an empty key or an endpoint the store never returned.
    pub dropped_edges: usize,
    /// Nodes admitted only through connectivity repair.
    pub repaired_nodes: usize,
}

impl SubgraphAssembler {
    /// Create an assembler without label filtering.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the result to nodes carrying one of the filter's labels
    /// (plus repaired boundary nodes). An empty filter disables filtering.
    pub fn with_filter(mut self, filter: Option<LabelFilter>) -> Self {
        self.filter = filter.filter(|f| !f.is_empty());
        self
    }

    /// Fold one walk into the indexes.
    pub fn add_record(&mut self, record: &RawPathRecord) {
        for raw in &record.nodes {
            if self.node_index.contains_key(&raw.key) {
                continue;
            }
            let node = Node::from(raw);
            if !node.is_well_formed() {
                log::warn!(
                    "dropping node '{}' (key '{}'): missing key or labels",
                    node.name,
                    node.key
                );
                self.dropped_nodes += 1;
                continue;
            }
            let passes = self
                .filter
                .as_ref()
                .is_none_or(|f| f.matches(&node.labels));
            if passes {
                self.passed_filter.insert(node.key.clone());
            }
            self.node_index.insert(node.key.clone(), self.nodes.len());
            self.nodes.push(node);
        }

        for raw in &record.relationships {
            if raw.key.is_empty() {
                log::warn!(
                    "dropping relationship {} -> {} without an element id",
                    raw.start,
                    raw.end
                );
                self.dropped_edges += 1;
                continue;
            }
            if self.edge_keys.insert(raw.key.clone()) {
                self.edges.push(Edge::from(raw));
            }
        }
    }

    /// Fold many walks.
    pub fn add_records<'a, I>(&mut self, records: I)
    where
        I: IntoIterator<Item = &'a RawPathRecord>,
    {
        for record in records {
            self.add_record(record);
        }
    }

    /// Resolve connectivity and produce the subgraph.
    pub fn finish(self) -> Subgraph {
        self.finish_with_report().0
    }

    /// Like [`finish`](Self::finish), also returning what was discarded.
    pub fn finish_with_report(self) -> (Subgraph, AssemblyReport) {
        let Self {
            nodes,
            node_index,
            passed_filter,
            edges,
            dropped_nodes,
            mut dropped_edges,
            ..
        } = self;

        let mut repaired: HashSet<String> = HashSet::new();
        let mut kept_edges = Vec::with_capacity(edges.len());

        for edge in edges {
            let start_in = passed_filter.contains(&edge.start);
            let end_in = passed_filter.contains(&edge.end);
            if !start_in && !end_in {
                continue;
            }
            let missing: Vec<&str> = [(start_in, &edge.start), (end_in, &edge.end)]
                .into_iter()
                .filter(|(inside, _)| !inside)
                .map(|(_, key)| key.as_str())
                .collect();
            if let Some(absent) = missing.iter().find(|k| !node_index.contains_key(**k)) {
                log::warn!(
                    "dropping edge '{}' ({}): endpoint '{}' was never returned by the store",
                    edge.key,
                    edge.relation_type,
                    absent
                );
                dropped_edges += 1;
                continue;
            }
            for key in missing {
                repaired.insert(key.to_string());
            }
            kept_edges.push(edge);
        }

        let report = AssemblyReport {
            dropped_nodes,
            dropped_edges,
            repaired_nodes: repaired.len(),
        };

        let nodes: Vec<Node> = nodes
            .into_iter()
            .filter(|n| passed_filter.contains(&n.key) || repaired.contains(&n.key))
            .collect();

        log::debug!(
            "assembled subgraph: {} nodes ({} repaired), {} edges",
            nodes.len(),
            report.repaired_nodes,
            kept_edges.len()
        );

        (
            Subgraph {
                nodes,
                edges: kept_edges,
            },
            report,
        )
    }
}

/// Assemble a subgraph from raw records in one call.
pub fn assemble(records: &[RawPathRecord], filter: Option<LabelFilter>) -> Subgraph {
    let mut assembler = SubgraphAssembler::new().with_filter(filter);
    assembler.add_records(records);
    assembler.finish()
}

// ============================================================================
// Tests
// ============================================================================
