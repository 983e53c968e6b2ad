//! Query response types.
//!
//! Structured, serializable views of extraction results and store lookups,
//! used for JSON output. Paths travel as rendered strings here.

use crate::extraction::{Extraction, ExtractionRequest};
use crate::stats::SubgraphStats;
use crate::validation::ValidationResult;
use crate::{Connection, Edge, Node};
use serde::{Deserialize, Serialize};

// ============================================================================
// Node / Edge summaries
// ============================================================================

/// Summary information about a node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeSummary {
    /// Element id.
    pub key: String,
    /// Display name.
    pub name: String,
    /// Labels, sorted.
    pub labels: Vec<String>,
    /// Description, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl From<&Node> for NodeSummary {
    fn from(node: &Node) -> Self {
        Self {
            key: node.key.clone(),
            name: node.name.clone(),
            labels: node.labels.iter().cloned().collect(),
            description: (!node.description.is_empty()).then(|| node.description.clone()),
        }
    }
}

/// Summary information about an edge.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeInfo {
    /// Element id.
    pub key: String,
    /// Start node element id.
    pub from: String,
    /// End node element id.
    pub to: String,
    /// Relation type.
    pub relation: String,
    /// Description, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl From<&Edge> for EdgeInfo {
    fn from(edge: &Edge) -> Self {
        Self {
            key: edge.key.clone(),
            from: edge.start.clone(),
            to: edge.end.clone(),
            relation: edge.relation_type.clone(),
            description: edge.description().map(String::from),
        }
    }
}

// ============================================================================
// Paths
// ============================================================================

/// Response for a path extraction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PathsResponse {
    /// Start entity name.
    pub entity: String,
    /// Effective hop bound.
    pub max_hops: usize,
    /// Direction used.
    pub direction: String,
    /// Minimum hop count applied.
    pub min_hops: usize,
    /// Rendered paths.
    pub paths: Vec<String>,
    /// Number of paths.
    pub count: usize,
    /// Paths cut short by the cycle or depth guard.
    pub truncated: usize,
    /// Nodes in the assembled subgraph.
    pub node_count: usize,
    /// Edges in the assembled subgraph.
    pub edge_count: usize,
}

impl PathsResponse {
    /// Build from a request and its result.
    pub fn new(request: &ExtractionRequest, extraction: &Extraction) -> Self {
        let paths = extraction.rendered();
        Self {
            entity: request.start_name.clone(),
            max_hops: request.hop_bound(),
            direction: request.direction.to_string(),
            min_hops: request.min_hops,
            count: paths.len(),
            paths,
            truncated: extraction.truncated_count(),
            node_count: extraction.subgraph.node_count(),
            edge_count: extraction.subgraph.edge_count(),
        }
    }
}

// ============================================================================
// Inspection
// ============================================================================

/// Response for subgraph inspection.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InspectResponse {
    /// Start entity name.
    pub entity: String,
    /// Structural statistics.
    pub stats: SubgraphStats,
    /// Validation findings.
    pub validation: ValidationResult,
    /// Nodes dropped during assembly.
    pub dropped_nodes: usize,
    /// Edges dropped during assembly.
    pub dropped_edges: usize,
    /// Nodes re-admitted by connectivity repair.
    pub repaired_nodes: usize,
}

// ============================================================================
// Entities
// ============================================================================

/// Full information about one entity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityInfo {
    /// Summary.
    #[serde(flatten)]
    pub summary: NodeSummary,
    /// Legacy numeric id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_id: Option<i64>,
    /// Remaining properties.
    pub properties: serde_json::Map<String, serde_json::Value>,
}

impl From<&Node> for EntityInfo {
    fn from(node: &Node) -> Self {
        Self {
            summary: NodeSummary::from(node),
            store_id: node.store_id,
            properties: node.properties.clone(),
        }
    }
}

/// Response for an entity listing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityListResponse {
    /// Label filter applied, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Entities.
    pub entities: Vec<NodeSummary>,
    /// Number of entities returned.
    pub count: usize,
}

impl EntityListResponse {
    /// Build from a listing.
    pub fn new(label: Option<&str>, nodes: &[Node]) -> Self {
        Self {
            label: label.map(String::from),
            entities: nodes.iter().map(NodeSummary::from).collect(),
            count: nodes.len(),
        }
    }
}

/// One neighbor of an entity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    /// The connecting edge.
    pub edge: EdgeInfo,
    /// The node at the other end.
    pub node: NodeSummary,
}

impl From<&Connection> for ConnectionInfo {
    fn from(conn: &Connection) -> Self {
        Self {
            edge: EdgeInfo::from(&conn.edge),
            node: NodeSummary::from(&conn.node),
        }
    }
}

/// Response for a connections lookup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConnectionsResponse {
    /// Element id of the entity.
    pub key: String,
    /// Direction used.
    pub direction: String,
    /// Neighbors.
    pub connections: Vec<ConnectionInfo>,
    /// Number of neighbors.
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Path, Subgraph};

    #[test]
    fn test_node_summary() {
        let node = Node::new("k1", "Crack")
            .with_label("Entity")
            .with_label("Defect")
            .with_description("a fracture");
        let summary = NodeSummary::from(&node);
        assert_eq!(summary.labels, vec!["Defect", "Entity"]);
        assert_eq!(summary.description.as_deref(), Some("a fracture"));

        let bare = NodeSummary::from(&Node::new("k2", "Bare"));
        assert!(bare.description.is_none());
        let json = serde_json::to_value(&bare).unwrap();
        assert!(json.get("description").is_none());
    }

    #[test]
    fn test_edge_info() {
        let edge = Edge::new("r1", "a", "causes", "b").with_property("description", "why");
        let info = EdgeInfo::from(&edge);
        assert_eq!(info.relation, "causes");
        assert_eq!(info.description.as_deref(), Some("why"));
    }

    #[test]
    fn test_paths_response() {
        let request = ExtractionRequest::new("A").with_max_hops(0).with_min_hops(1);
        let extraction = Extraction {
            subgraph: Subgraph::new(),
            report: Default::default(),
            paths: vec![Path::single("A").then("r", "B")],
        };
        let response = PathsResponse::new(&request, &extraction);
        assert_eq!(response.max_hops, 1);
        assert_eq!(response.direction, "both");
        assert_eq!(response.paths, vec!["A -> r -> B"]);
        assert_eq!(response.count, 1);
        assert_eq!(response.truncated, 0);
    }

    #[test]
    fn test_entity_info_flattens_summary() {
        let node = Node::new("k1", "Crack")
            .with_label("Entity")
            .with_property("type", "问题");
        let json = serde_json::to_value(EntityInfo::from(&node)).unwrap();
        assert_eq!(json["key"], "k1");
        assert_eq!(json["properties"]["type"], "问题");
    }
}
