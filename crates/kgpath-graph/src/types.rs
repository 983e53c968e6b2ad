//! Core graph types: raw store records, assembled nodes and edges, and paths.
//!
//! Raw types mirror what the store hands back for one traversal walk.
//! [`Node`] and [`Edge`] are the typed records the rest of the crate works
//! with: the fields the algorithms depend on (`name`, `description`,
//! `relation_type`) are pulled out and everything else stays in an open
//! property map.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Open property map carried alongside the typed fields.
pub type Properties = serde_json::Map<String, serde_json::Value>;

/// Delimiter token between path elements.
pub const PATH_DELIMITER: &str = "->";

// ============================================================================
// Direction
// ============================================================================

/// Traversal direction relative to the start entity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Only edges pointing away from the start (`start -> ...`).
    Outgoing,
    /// Only edges pointing toward the start (`... -> start`).
    Incoming,
    /// Undirected traversal.
    #[default]
    Both,
}

impl Direction {
    /// Parse a direction, accepting `out`/`in` aliases.
    ///
    /// Unrecognized input yields [`Direction::Both`]; this never fails.
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "outgoing" | "out" => Self::Outgoing,
            "incoming" | "in" => Self::Incoming,
            "both" | "" => Self::Both,
            other => {
                log::debug!("unrecognized direction '{other}', defaulting to both");
                Self::Both
            }
        }
    }

    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Outgoing => "outgoing",
            Self::Incoming => "incoming",
            Self::Both => "both",
        }
    }
}

impl FromStr for Direction {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse_lenient(s))
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Raw store records
// ============================================================================

/// A node as returned by the store for one walk.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawNode {
    /// Store element id.
    pub key: String,
    /// Legacy numeric id, when the store exposes one.
    #[serde(default)]
    pub id: Option<i64>,
    /// Node labels.
    #[serde(default)]
    pub labels: Vec<String>,
    /// All node properties.
    #[serde(default)]
    pub properties: Properties,
}

/// A relationship as returned by the store for one walk.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRelationship {
    /// Store element id of the relationship.
    pub key: String,
    /// Relationship type; absent on malformed data.
    #[serde(default)]
    pub rel_type: Option<String>,
    /// Element id of the start node.
    pub start: String,
    /// Element id of the end node.
    pub end: String,
    /// All relationship properties.
    #[serde(default)]
    pub properties: Properties,
}

/// One walk of length 1..=max_hops from the start entity.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPathRecord {
    /// Nodes along the walk, start first.
    pub nodes: Vec<RawNode>,
    /// Relationships along the walk, in walk order.
    pub relationships: Vec<RawRelationship>,
}

impl RawPathRecord {
    /// Create a record from its parts.
    pub fn new(nodes: Vec<RawNode>, relationships: Vec<RawRelationship>) -> Self {
        Self {
            nodes,
            relationships,
        }
    }
}

// ============================================================================
// Node
// ============================================================================

/// A node in an assembled subgraph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Stable element id; the deduplication key.
    pub key: String,
    /// Legacy numeric id, if any.
    pub store_id: Option<i64>,
    /// Display name.
    pub name: String,
    /// Free-text description (empty when absent).
    pub description: String,
    /// Labels carried by the node.
    pub labels: BTreeSet<String>,
    /// Remaining properties.
    pub properties: Properties,
}

impl Node {
    /// Create a node with a key and display name.
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            store_id: None,
            name: name.into(),
            description: String::new(),
            labels: BTreeSet::new(),
            properties: Properties::new(),
        }
    }

    /// Add a label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.insert(label.into());
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add a property.
    pub fn with_property(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Look up a property as a string.
    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(|v| v.as_str())
    }

    /// Whether this node satisfies the node invariant (key and a label).
    pub fn is_well_formed(&self) -> bool {
        !self.key.is_empty() && !self.labels.is_empty()
    }
}

impl From<&RawNode> for Node {
    fn from(raw: &RawNode) -> Self {
        let text = |key: &str| {
            raw.properties
                .get(key)
                .map(value_to_text)
                .filter(|n| !n.is_empty())
        };
        let name = text("name")
            .or_else(|| text("title"))
            .unwrap_or_else(|| serde_json::Value::Object(raw.properties.clone()).to_string());

        let description = raw
            .properties
            .get("description")
            .map(value_to_text)
            .unwrap_or_default();

        let mut properties = raw.properties.clone();
        properties.remove("name");
        properties.remove("description");

        Self {
            key: raw.key.clone(),
            store_id: raw.id,
            name,
            description,
            labels: raw.labels.iter().cloned().collect(),
            properties,
        }
    }
}

// ============================================================================
// Edge
// ============================================================================

/// A directed edge in an assembled subgraph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Stable element id of the relationship.
    pub key: String,
    /// Relationship type; empty when the store omitted it.
    pub relation_type: String,
    /// Key of the start node.
    pub start: String,
    /// Key of the end node.
    pub end: String,
    /// Relationship properties.
    pub properties: Properties,
}

impl Edge {
    /// Create an edge.
    pub fn new(
        key: impl Into<String>,
        start: impl Into<String>,
        relation_type: impl Into<String>,
        end: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            relation_type: relation_type.into(),
            start: start.into(),
            end: end.into(),
            properties: Properties::new(),
        }
    }

    /// Add a property.
    pub fn with_property(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Relationship description, when present.
    pub fn description(&self) -> Option<&str> {
        self.properties.get("description").and_then(|v| v.as_str())
    }

    /// Whether the edge carries a usable relationship type.
    pub fn is_well_formed(&self) -> bool {
        !self.relation_type.trim().is_empty()
    }

    /// Key of the endpoint opposite `key`.
    pub fn other_end(&self, key: &str) -> &str {
        if self.start == key {
            &self.end
        } else {
            &self.start
        }
    }
}

impl From<&RawRelationship> for Edge {
    fn from(raw: &RawRelationship) -> Self {
        Self {
            key: raw.key.clone(),
            relation_type: raw.rel_type.clone().unwrap_or_default(),
            start: raw.start.clone(),
            end: raw.end.clone(),
            properties: raw.properties.clone(),
        }
    }
}

/// An edge touching an entity paired with the node on its other end.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    /// The relationship.
    pub edge: Edge,
    /// The node at the far end.
    pub node: Node,
}

// ============================================================================
// Subgraph
// ============================================================================

/// The assembled neighborhood of a start entity.
///
/// Nodes and edges are unique by key and kept in first-seen order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Subgraph {
    /// Retained nodes.
    pub nodes: Vec<Node>,
    /// Retained edges.
    pub edges: Vec<Edge>,
}

impl Subgraph {
    /// Create an empty subgraph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// True when no nodes were retained.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Find a node by key.
    pub fn node(&self, key: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.key == key)
    }

    /// Find nodes by display name.
    pub fn nodes_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.nodes.iter().filter(move |n| n.name == name)
    }
}

// ============================================================================
// Label filter
// ============================================================================

/// Set of labels of which a node must carry at least one.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelFilter {
    labels: BTreeSet<String>,
}

impl LabelFilter {
    /// Build a filter from labels. Blank entries are ignored.
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels
                .into_iter()
                .map(Into::into)
                .filter(|l: &String| !l.trim().is_empty())
                .collect(),
        }
    }

    /// Build a filter, returning `None` when no usable label was given.
    pub fn from_labels<I, S>(labels: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let filter = Self::new(labels);
        (!filter.is_empty()).then_some(filter)
    }

    /// True when no labels are required.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Whether any of `labels` is in the required set.
    pub fn matches<'a, I>(&self, labels: I) -> bool
    where
        I: IntoIterator<Item = &'a String>,
    {
        labels.into_iter().any(|l| self.labels.contains(l))
    }

    /// The required labels.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}

// ============================================================================
// Path
// ============================================================================

/// One relation followed by the entity it leads to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hop {
    /// Relationship type.
    pub relation: String,
    /// Display name of the entity reached.
    pub entity: String,
}

/// An enumerated reasoning path: `entity0, relation0, entity1, ...`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Path {
    /// Display name of the root entity.
    pub start: String,
    /// Relations and entities following the root.
    pub hops: Vec<Hop>,
    /// Set when enumeration stopped early on a cycle or the depth bound.
    #[serde(default)]
    pub truncated: bool,
}

impl Path {
    /// A path consisting of a single entity.
    pub fn single(start: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            hops: Vec::new(),
            truncated: false,
        }
    }

    /// Append a hop.
    pub fn then(mut self, relation: impl Into<String>, entity: impl Into<String>) -> Self {
        self.push(relation, entity);
        self
    }

    /// Append a hop in place.
    pub fn push(&mut self, relation: impl Into<String>, entity: impl Into<String>) {
        self.hops.push(Hop {
            relation: relation.into(),
            entity: entity.into(),
        });
    }

    /// Remove the last hop.
    pub fn pop(&mut self) -> Option<Hop> {
        self.hops.pop()
    }

    /// Number of relations traversed.
    pub fn hop_count(&self) -> usize {
        self.hops.len()
    }

    /// True for single-entity paths.
    pub fn is_degenerate(&self) -> bool {
        self.hops.is_empty()
    }

    /// Entity names in order, root first.
    pub fn entities(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.start.as_str()).chain(self.hops.iter().map(|h| h.entity.as_str()))
    }

    /// Relation types in order.
    pub fn relations(&self) -> impl Iterator<Item = &str> {
        self.hops.iter().map(|h| h.relation.as_str())
    }

    /// Render as `A -> rel -> B -> ...`.
    pub fn render(&self) -> String {
        let mut out = self.start.clone();
        for hop in &self.hops {
            out.push(' ');
            out.push_str(PATH_DELIMITER);
            out.push(' ');
            out.push_str(&hop.relation);
            out.push(' ');
            out.push_str(PATH_DELIMITER);
            out.push(' ');
            out.push_str(&hop.entity);
        }
        out
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Render a batch of paths to strings.
pub fn render_paths(paths: &[Path]) -> Vec<String> {
    paths.iter().map(Path::render).collect()
}

/// Text form of a property value: strings unquoted, everything else as JSON.
fn value_to_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(key: &str, props: serde_json::Value) -> RawNode {
        RawNode {
            key: key.to_string(),
            id: Some(7),
            labels: vec!["Entity".to_string()],
            properties: props.as_object().cloned().unwrap_or_default(),
        }
    }

    #[test]
    fn test_direction_parse_lenient() {
        assert_eq!(Direction::parse_lenient("out"), Direction::Outgoing);
        assert_eq!(Direction::parse_lenient("OUTGOING"), Direction::Outgoing);
        assert_eq!(Direction::parse_lenient("in"), Direction::Incoming);
        assert_eq!(Direction::parse_lenient(" incoming "), Direction::Incoming);
        assert_eq!(Direction::parse_lenient("both"), Direction::Both);
        assert_eq!(Direction::parse_lenient("sideways"), Direction::Both);
        assert_eq!(Direction::parse_lenient(""), Direction::Both);
    }

    #[test]
    fn test_direction_from_str_never_fails() {
        let d: Direction = "whatever".parse().unwrap();
        assert_eq!(d, Direction::Both);
        assert_eq!(Direction::default(), Direction::Both);
        assert_eq!(Direction::Incoming.to_string(), "incoming");
    }

    #[test]
    fn test_node_from_raw_uses_name() {
        let node = Node::from(&raw(
            "4:x:1",
            json!({"name": "带钢头部温降", "description": "d", "graph_id": "g"}),
        ));
        assert_eq!(node.key, "4:x:1");
        assert_eq!(node.store_id, Some(7));
        assert_eq!(node.name, "带钢头部温降");
        assert_eq!(node.description, "d");
        assert!(node.labels.contains("Entity"));
        assert_eq!(node.property_str("graph_id"), Some("g"));
        assert!(!node.properties.contains_key("name"));
    }

    #[test]
    fn test_node_from_raw_falls_back_to_title() {
        let node = Node::from(&raw("k", json!({"title": "Titled"})));
        assert_eq!(node.name, "Titled");
        assert_eq!(node.description, "");
    }

    #[test]
    fn test_node_from_raw_blank_name_uses_title() {
        let node = Node::from(&raw("k", json!({"name": "", "title": "Titled"})));
        assert_eq!(node.name, "Titled");
        let node = Node::from(&raw("k", json!({"name": null, "title": "Titled"})));
        assert_eq!(node.name, "Titled");
    }

    #[test]
    fn test_node_from_raw_falls_back_to_properties() {
        let node = Node::from(&raw("k", json!({"code": 12})));
        assert_eq!(node.name, r#"{"code":12}"#);
    }

    #[test]
    fn test_node_well_formed() {
        assert!(Node::new("k", "A").with_label("Entity").is_well_formed());
        assert!(!Node::new("k", "A").is_well_formed());
        assert!(!Node::new("", "A").with_label("Entity").is_well_formed());
    }

    #[test]
    fn test_edge_from_raw_missing_type() {
        let edge = Edge::from(&RawRelationship {
            key: "r1".into(),
            rel_type: None,
            start: "a".into(),
            end: "b".into(),
            properties: Properties::new(),
        });
        assert_eq!(edge.relation_type, "");
        assert!(!edge.is_well_formed());
    }

    #[test]
    fn test_edge_helpers() {
        let edge = Edge::new("r1", "a", "导致", "b").with_property("description", "causes");
        assert!(edge.is_well_formed());
        assert_eq!(edge.description(), Some("causes"));
        assert_eq!(edge.other_end("a"), "b");
        assert_eq!(edge.other_end("b"), "a");
    }

    #[test]
    fn test_label_filter() {
        let filter = LabelFilter::new(["Entity", " "]);
        assert!(!filter.is_empty());
        assert_eq!(filter.labels().collect::<Vec<_>>(), vec!["Entity"]);

        let node = Node::new("k", "A").with_label("Entity").with_label("Other");
        assert!(filter.matches(&node.labels));
        assert!(!filter.matches(&Node::new("k", "B").with_label("Other").labels));
    }

    #[test]
    fn test_label_filter_from_empty_labels() {
        assert!(LabelFilter::from_labels(Vec::<String>::new()).is_none());
        assert!(LabelFilter::from_labels([""]).is_none());
        assert!(LabelFilter::from_labels(["Entity"]).is_some());
    }

    #[test]
    fn test_path_render() {
        let path = Path::single("A").then("rel1", "B").then("rel2", "C");
        assert_eq!(path.render(), "A -> rel1 -> B -> rel2 -> C");
        assert_eq!(path.hop_count(), 2);
        assert_eq!(path.entities().collect::<Vec<_>>(), vec!["A", "B", "C"]);
        assert_eq!(path.relations().collect::<Vec<_>>(), vec!["rel1", "rel2"]);
        assert_eq!(path.to_string(), path.render());
    }

    #[test]
    fn test_degenerate_path() {
        let path = Path::single("D");
        assert!(path.is_degenerate());
        assert_eq!(path.render(), "D");
        assert_eq!(render_paths(&[path]), vec!["D".to_string()]);
    }

    #[test]
    fn test_path_push_pop() {
        let mut path = Path::single("A");
        path.push("r", "B");
        assert_eq!(path.hop_count(), 1);
        let hop = path.pop().unwrap();
        assert_eq!(hop.entity, "B");
        assert!(path.is_degenerate());
    }

    #[test]
    fn test_subgraph_lookup() {
        let subgraph = Subgraph {
            nodes: vec![Node::new("1", "A"), Node::new("2", "A"), Node::new("3", "B")],
            edges: vec![],
        };
        assert_eq!(subgraph.node_count(), 3);
        assert!(subgraph.node("3").is_some());
        assert!(subgraph.node("9").is_none());
        assert_eq!(subgraph.nodes_named("A").count(), 2);
    }

    #[test]
    fn test_raw_record_deserialize_defaults() {
        let record: RawPathRecord = serde_json::from_value(json!({
            "nodes": [{"key": "a"}],
            "relationships": [{"key": "r", "start": "a", "end": "b"}]
        }))
        .unwrap();
        assert!(record.nodes[0].labels.is_empty());
        assert!(record.relationships[0].rel_type.is_none());
    }
}
