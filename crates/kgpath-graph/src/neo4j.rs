//! Neo4j graph store over Bolt.
//!
//! [`Neo4jStore`] wraps a pooled `neo4rs::Graph`. Every query is scoped to
//! the configured `graph_id`, and every returned node or relationship is
//! projected into a plain map in Cypher so rows deserialize straight into
//! [`RawNode`]/[`RawRelationship`].

use crate::store::{BoundedPathQuery, GraphStore};
use crate::{Connection, Direction, Edge, Node, RawNode, RawPathRecord, RawRelationship};
use async_trait::async_trait;
use kgpath_core::{Error, Result, StoreSettings};
use neo4rs::{ConfigBuilder, Graph, Query, Row, query};
use serde::de::DeserializeOwned;

/// Cypher projection of node `n` into a [`RawNode`] map.
const NODE_PROJECTION: &str =
    "{key: elementId(n), id: id(n), labels: labels(n), properties: properties(n)}";

/// Cypher projection of relationship `r` into a [`RawRelationship`] map.
const REL_PROJECTION: &str = "{key: elementId(r), rel_type: type(r), \
     start: elementId(startNode(r)), end: elementId(endNode(r)), properties: properties(r)}";

/// Graph store backed by a Neo4j server.
pub struct Neo4jStore {
    graph: Graph,
    graph_id: String,
    uri: String,
}

impl std::fmt::Debug for Neo4jStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Neo4jStore")
            .field("uri", &self.uri)
            .field("graph_id", &self.graph_id)
            .finish_non_exhaustive()
    }
}

impl Neo4jStore {
    /// Open a connection pool and verify the server answers.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for incomplete settings and a
    /// connectivity error if the server cannot be reached or rejects the
    /// credentials.
    pub async fn connect(settings: &StoreSettings) -> Result<Self> {
        settings.validate()?;

        let uri = settings.uri.clone().unwrap_or_default();
        let mut builder = ConfigBuilder::default()
            .uri(uri.as_str())
            .user(settings.user.as_deref().unwrap_or_default())
            .password(settings.password.as_deref().unwrap_or_default())
            .max_connections(settings.max_connections)
            .fetch_size(settings.fetch_limit());
        if let Some(db) = settings.database.as_deref().filter(|d| !d.is_empty()) {
            builder = builder.db(db);
        }
        let config = builder
            .build()
            .map_err(|e| Error::config(format!("invalid store settings: {e}")))?;

        let graph = Graph::connect(config).await.map_err(store_error)?;
        let store = Self {
            graph,
            graph_id: settings.graph_id().to_string(),
            uri,
        };
        store.ping().await?;

        log::info!(
            "connected to graph store at {} (graph_id '{}', pool {})",
            store.uri,
            store.graph_id,
            settings.max_connections
        );
        Ok(store)
    }

    /// The tenant identifier every query is scoped to.
    pub fn graph_id(&self) -> &str {
        &self.graph_id
    }

    async fn rows(&self, q: Query) -> Result<Vec<Row>> {
        let mut stream = self.graph.execute(q).await.map_err(store_error)?;
        let mut rows = Vec::new();
        while let Some(row) = stream.next().await.map_err(store_error)? {
            rows.push(row);
        }
        Ok(rows)
    }
}

fn store_error(err: neo4rs::Error) -> Error {
    Error::connectivity(err.to_string())
}

fn column<T: DeserializeOwned>(row: &Row, name: &str) -> Result<T> {
    row.get::<T>(name)
        .map_err(|e| Error::invalid_data(format!("unexpected '{name}' column: {e}")))
}

/// Quote a label for use in a Cypher pattern.
fn quote_label(label: &str) -> String {
    format!("`{}`", label.replace('`', "``"))
}

fn list_entities_cypher(label: Option<&str>) -> String {
    let pattern = match label {
        Some(l) => format!("(n:{})", quote_label(l)),
        None => "(n)".to_string(),
    };
    format!(
        "MATCH {pattern} WHERE n.graph_id = $graph_id \
         RETURN {NODE_PROJECTION} AS node ORDER BY n.name LIMIT $limit"
    )
}

fn get_entity_cypher() -> String {
    format!(
        "MATCH (n) WHERE n.name = $name AND n.graph_id = $graph_id \
         RETURN {NODE_PROJECTION} AS node LIMIT 1"
    )
}

fn connections_cypher(direction: Direction) -> String {
    let pattern = match direction {
        Direction::Outgoing => "(s)-[r]->(n)",
        Direction::Incoming => "(s)<-[r]-(n)",
        Direction::Both => "(s)-[r]-(n)",
    };
    format!(
        "MATCH {pattern} WHERE elementId(s) = $key \
         AND s.graph_id = $graph_id AND n.graph_id = $graph_id \
         RETURN {REL_PROJECTION} AS rel, {NODE_PROJECTION} AS node LIMIT $limit"
    )
}

fn limit_param(limit: usize) -> i64 {
    i64::try_from(limit.max(1)).unwrap_or(i64::MAX)
}

#[async_trait]
impl GraphStore for Neo4jStore {
    async fn fetch_bounded_paths(&self, q: &BoundedPathQuery) -> Result<Vec<RawPathRecord>> {
        let cypher = q.cypher();
        log::debug!("bounded path query: {cypher}");
        let rows = self
            .rows(
                query(&cypher)
                    .param("name", q.start_name.as_str())
                    .param("graph_id", self.graph_id.as_str())
                    .param("limit", limit_param(q.limit)),
            )
            .await?;

        rows.iter()
            .map(|row| {
                let nodes: Vec<RawNode> = column(row, "nodes")?;
                let relationships: Vec<RawRelationship> = column(row, "relationships")?;
                Ok(RawPathRecord::new(nodes, relationships))
            })
            .collect()
    }

    async fn list_entities(&self, label: Option<&str>, limit: usize) -> Result<Vec<Node>> {
        let rows = self
            .rows(
                query(&list_entities_cypher(label))
                    .param("graph_id", self.graph_id.as_str())
                    .param("limit", limit_param(limit)),
            )
            .await?;
        rows.iter()
            .map(|row| column::<RawNode>(row, "node").map(|raw| Node::from(&raw)))
            .collect()
    }

    async fn get_entity(&self, name: &str) -> Result<Option<Node>> {
        let rows = self
            .rows(
                query(&get_entity_cypher())
                    .param("name", name)
                    .param("graph_id", self.graph_id.as_str()),
            )
            .await?;
        rows.first()
            .map(|row| column::<RawNode>(row, "node").map(|raw| Node::from(&raw)))
            .transpose()
    }

    async fn entity_connections(
        &self,
        key: &str,
        direction: Direction,
        limit: usize,
    ) -> Result<Vec<Connection>> {
        let rows = self
            .rows(
                query(&connections_cypher(direction))
                    .param("key", key)
                    .param("graph_id", self.graph_id.as_str())
                    .param("limit", limit_param(limit)),
            )
            .await?;
        rows.iter()
            .map(|row| {
                let rel: RawRelationship = column(row, "rel")?;
                let node: RawNode = column(row, "node")?;
                Ok(Connection {
                    edge: Edge::from(&rel),
                    node: Node::from(&node),
                })
            })
            .collect()
    }

    async fn ping(&self) -> Result<()> {
        let rows = self.rows(query("RETURN 1 AS ok")).await?;
        match rows.first().map(|row| column::<i64>(row, "ok")) {
            Some(Ok(1)) => Ok(()),
            Some(Err(e)) => Err(e),
            _ => Err(Error::connectivity("health probe returned no result")),
        }
    }

    fn name(&self) -> &str {
        "neo4j"
    }
}
