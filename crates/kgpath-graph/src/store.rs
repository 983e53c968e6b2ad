//! Graph store contract.
//!
//! [`GraphStore`] is the only thing the extraction pipeline knows about the
//! database. Implementations are explicitly constructed, shared behind an
//! `Arc`, and must tolerate concurrent calls from independent extractions.
//!
//! [`BoundedPathQuery`] owns the request normalization (hop clamping,
//! lenient direction) and the Cypher text, so every backend speaking Cypher
//! issues the same query.

use crate::{Connection, Direction, Node, RawPathRecord};
use async_trait::async_trait;
use kgpath_core::Result;
use kgpath_core::settings::{DEFAULT_FETCH_LIMIT, clamp_hops};

// ============================================================================
// Bounded path query
// ============================================================================

/// A hop-bounded traversal from a named start entity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoundedPathQuery {
    /// `name` property of the start entity.
    pub start_name: String,
    /// Maximum walk length, at least one.
    pub max_hops: usize,
    /// Which edges may be traversed.
    pub direction: Direction,
    /// Maximum number of records to return.
    pub limit: usize,
}

impl BoundedPathQuery {
    /// Create a query. `max_hops` below one is clamped to one.
    pub fn new(start_name: impl Into<String>, max_hops: i64, direction: Direction) -> Self {
        Self {
            start_name: start_name.into(),
            max_hops: clamp_hops(max_hops),
            direction,
            limit: DEFAULT_FETCH_LIMIT,
        }
    }

    /// Set the record limit (at least one).
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    /// Variable-length relationship pattern for this direction and bound.
    ///
    /// Cypher cannot parameterize the range of a variable-length pattern, so
    /// the bound is written into the text. It is always a clamped integer.
    pub fn pattern(&self) -> String {
        let hops = self.max_hops;
        match self.direction {
            Direction::Outgoing => format!("-[*1..{hops}]->"),
            Direction::Incoming => format!("<-[*1..{hops}]-"),
            Direction::Both => format!("-[*1..{hops}]-"),
        }
    }

    /// Cypher statement. Parameters: `$name`, `$graph_id`, `$limit`.
    ///
    /// Each row carries one walk as a `nodes` list and a `relationships`
    /// list whose entries deserialize into [`RawNode`](crate::RawNode) and
    /// [`RawRelationship`](crate::RawRelationship).
    pub fn cypher(&self) -> String {
        format!(
            "MATCH (start) WHERE start.name = $name AND start.graph_id = $graph_id \
             MATCH p=(start){pattern}(m) WHERE m.graph_id = $graph_id \
             RETURN [n IN nodes(p) | {{key: elementId(n), id: id(n), labels: labels(n), properties: properties(n)}}] AS nodes, \
             [r IN relationships(p) | {{key: elementId(r), rel_type: type(r), start: elementId(startNode(r)), end: elementId(endNode(r)), properties: properties(r)}}] AS relationships \
             LIMIT $limit",
            pattern = self.pattern()
        )
    }
}

// ============================================================================
// GraphStore trait
// ============================================================================

/// Access to a labeled property graph scoped to one tenant graph.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Run a hop-bounded traversal from the entity named in `query`.
    ///
    /// An unknown start entity yields an empty vector, not an error.
    ///
    /// # Errors
    ///
    /// Returns a connectivity error when the store is unreachable or
    /// rejects the query.
    async fn fetch_bounded_paths(&self, query: &BoundedPathQuery) -> Result<Vec<RawPathRecord>>;

    /// List entities, optionally restricted to one label.
    async fn list_entities(&self, label: Option<&str>, limit: usize) -> Result<Vec<Node>>;

    /// Look up a single entity by its `name` property.
    async fn get_entity(&self, name: &str) -> Result<Option<Node>>;

    /// Edges touching the entity with element id `key`, each paired with
    /// the node at the other end.
    async fn entity_connections(
        &self,
        key: &str,
        direction: Direction,
        limit: usize,
    ) -> Result<Vec<Connection>>;

    /// Cheap round trip proving the store is reachable.
    async fn ping(&self) -> Result<()>;

    /// Returns the name of this store for logging/debugging.
    fn name(&self) -> &str {
        "unnamed"
    }
}

// ============================================================================
// Tests
// ============================================================================
