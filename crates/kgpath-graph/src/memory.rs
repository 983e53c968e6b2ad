//! In-memory graph store for tests and offline fixtures.
//!
//! Holds a single tenant graph and answers traversal queries with the same
//! walk semantics as a Cypher variable-length match: a walk never reuses a
//! relationship, nodes may repeat, and every walk of length 1..=max_hops is
//! one record.

use crate::store::{BoundedPathQuery, GraphStore};
use crate::{Connection, Direction, Edge, Node, Properties, RawNode, RawPathRecord, RawRelationship};
use async_trait::async_trait;
use kgpath_core::{Error, Result};
use std::collections::HashMap;
use std::time::Duration;

/// Build a raw node with a `name` property and the given labels.
pub fn raw_node(key: &str, name: &str, labels: &[&str]) -> RawNode {
    let mut properties = Properties::new();
    properties.insert("name".to_string(), name.into());
    RawNode {
        key: key.to_string(),
        id: None,
        labels: labels.iter().map(|l| l.to_string()).collect(),
        properties,
    }
}

/// Build a raw relationship.
pub fn raw_rel(key: &str, start: &str, rel_type: &str, end: &str) -> RawRelationship {
    RawRelationship {
        key: key.to_string(),
        rel_type: Some(rel_type.to_string()),
        start: start.to_string(),
        end: end.to_string(),
        properties: Properties::new(),
    }
}

/// A graph store backed by vectors.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    nodes: Vec<RawNode>,
    relationships: Vec<RawRelationship>,
    failure: Option<String>,
    latency: Option<Duration>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every call fails with a connectivity error.
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Delay every call by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Add a node carrying `name` and `labels`.
    pub fn with_node(mut self, key: &str, name: &str, labels: &[&str]) -> Self {
        self.add_node(raw_node(key, name, labels));
        self
    }

    /// Add a relationship.
    pub fn with_edge(mut self, key: &str, start: &str, rel_type: &str, end: &str) -> Self {
        self.add_relationship(raw_rel(key, start, rel_type, end));
        self
    }

    /// Add a raw node.
    pub fn add_node(&mut self, node: RawNode) {
        self.nodes.push(node);
    }

    /// Add a raw relationship.
    pub fn add_relationship(&mut self, relationship: RawRelationship) {
        self.relationships.push(relationship);
    }

    async fn check(&self) -> Result<()> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        match &self.failure {
            Some(message) => Err(Error::connectivity(message.clone())),
            None => Ok(()),
        }
    }

    fn node_by_key(&self) -> HashMap<&str, &RawNode> {
        self.nodes.iter().map(|n| (n.key.as_str(), n)).collect()
    }

    /// Relationships leaving `key` under `direction`, with the node reached.
    fn steps<'a>(
        &'a self,
        key: &'a str,
        direction: Direction,
    ) -> impl Iterator<Item = (usize, &'a str)> + 'a {
        self.relationships
            .iter()
            .enumerate()
            .filter_map(move |(i, rel)| {
                let forward = rel.start == key;
                let backward = rel.end == key;
                match direction {
                    Direction::Outgoing if forward => Some((i, rel.end.as_str())),
                    Direction::Incoming if backward => Some((i, rel.start.as_str())),
                    Direction::Both if forward => Some((i, rel.end.as_str())),
                    Direction::Both if backward => Some((i, rel.start.as_str())),
                    _ => None,
                }
            })
    }

    fn walk<'a>(
        &'a self,
        current: &'a str,
        query: &BoundedPathQuery,
        nodes: &HashMap<&str, &'a RawNode>,
        trail: &mut Vec<(usize, &'a str)>,
        start: &'a RawNode,
        out: &mut Vec<RawPathRecord>,
    ) {
        if trail.len() >= query.max_hops {
            return;
        }
        for (rel_index, next) in self.steps(current, query.direction) {
            if out.len() >= query.limit {
                return;
            }
            if trail.iter().any(|(used, _)| *used == rel_index) || !nodes.contains_key(next) {
                continue;
            }
            trail.push((rel_index, next));
            out.push(self.record(start, trail, nodes));
            self.walk(next, query, nodes, trail, start, out);
            trail.pop();
        }
    }

    fn record(
        &self,
        start: &RawNode,
        trail: &[(usize, &str)],
        nodes: &HashMap<&str, &RawNode>,
    ) -> RawPathRecord {
        let mut record_nodes = vec![start.clone()];
        let mut record_rels = Vec::with_capacity(trail.len());
        for (rel_index, key) in trail {
            record_rels.push(self.relationships[*rel_index].clone());
            if let Some(node) = nodes.get(key) {
                record_nodes.push((*node).clone());
            }
        }
        RawPathRecord::new(record_nodes, record_rels)
    }
}

fn name_of(node: &RawNode) -> Option<&str> {
    node.properties.get("name").and_then(|v| v.as_str())
}

#[async_trait]
impl GraphStore for MemoryStore {
    async fn fetch_bounded_paths(&self, query: &BoundedPathQuery) -> Result<Vec<RawPathRecord>> {
        self.check().await?;

        let nodes = self.node_by_key();
        let mut out = Vec::new();
        for start in self
            .nodes
            .iter()
            .filter(|n| name_of(n) == Some(query.start_name.as_str()))
        {
            let mut trail = Vec::new();
            self.walk(&start.key, query, &nodes, &mut trail, start, &mut out);
        }
        Ok(out)
    }

    async fn list_entities(&self, label: Option<&str>, limit: usize) -> Result<Vec<Node>> {
        self.check().await?;
        Ok(self
            .nodes
            .iter()
            .filter(|n| label.is_none_or(|l| n.labels.iter().any(|nl| nl == l)))
            .take(limit)
            .map(Node::from)
            .collect())
    }

    async fn get_entity(&self, name: &str) -> Result<Option<Node>> {
        self.check().await?;
        Ok(self
            .nodes
            .iter()
            .find(|n| name_of(n) == Some(name))
            .map(Node::from))
    }

    async fn entity_connections(
        &self,
        key: &str,
        direction: Direction,
        limit: usize,
    ) -> Result<Vec<Connection>> {
        self.check().await?;
        let nodes = self.node_by_key();
        Ok(self
            .steps(key, direction)
            .filter_map(|(i, other)| {
                nodes.get(other).map(|node| Connection {
                    edge: Edge::from(&self.relationships[i]),
                    node: Node::from(*node),
                })
            })
            .take(limit)
            .collect())
    }

    async fn ping(&self) -> Result<()> {
        self.check().await
    }

    fn name(&self) -> &str {
        "memory"
    }
}

// ============================================================================
// Tests
// ============================================================================
