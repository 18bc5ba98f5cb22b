//! Graph data model shared by every normalization pass and by the query layer.
//!
//! Two shapes live here:
//! - the **raw document** (`RawDocument`): loosely typed JSON as supplied by a
//!   dataset provider, only checked for the presence of `nodes` / `links`;
//! - the **normalized graph** (`NormalizedGraph`): plain string ids, a resolved
//!   `NodeKind` on every node and freshly computed degrees.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

use crate::IngestionError;

// ============================================================================
// Node kinds
// ============================================================================

/// Final classification of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Actor,
    Sponsor,
    Victim,
}

impl NodeKind {
    pub const ALL: [NodeKind; 3] = [NodeKind::Sponsor, NodeKind::Actor, NodeKind::Victim];

    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Actor => "actor",
            NodeKind::Sponsor => "sponsor",
            NodeKind::Victim => "victim",
        }
    }

    /// Lenient parse used for raw `type` fields (case-insensitive, trimmed).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "actor" => Some(NodeKind::Actor),
            "sponsor" => Some(NodeKind::Sponsor),
            "victim" => Some(NodeKind::Victim),
            _ => None,
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

// ============================================================================
// Normalized records
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub degree: usize,
}

impl Node {
    pub fn new(id: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            kind,
            degree: 0,
        }
    }
}

/// A canonical edge: plain string endpoints, positive weight, free-form type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub source: String,
    pub target: String,
    pub weight: f64,
    #[serde(rename = "type", default)]
    pub kind: String,
}

impl Link {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            weight: 1.0,
            kind: String::new(),
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }
}

// ============================================================================
// Raw document
// ============================================================================

/// Raw input document: `{ "nodes": [...], "links": [...] }`.
///
/// Entries are kept as JSON values; reducing them to canonical records is the
/// job of [`crate::canonical`]. Only the two top-level collections are checked
/// here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawDocument {
    pub nodes: Vec<Value>,
    pub links: Vec<Value>,
}

impl RawDocument {
    pub fn from_json_str(text: &str) -> Result<Self, IngestionError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, IngestionError> {
        let Value::Object(mut root) = value else {
            return Err(IngestionError::NotAnObject);
        };
        let nodes = take_collection(&mut root, "nodes")?;
        let links = take_collection(&mut root, "links")?;
        Ok(Self { nodes, links })
    }
}

fn take_collection(
    root: &mut serde_json::Map<String, Value>,
    collection: &'static str,
) -> Result<Vec<Value>, IngestionError> {
    match root.remove(collection) {
        None | Some(Value::Null) => Err(IngestionError::MissingCollection { collection }),
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(IngestionError::NotACollection { collection }),
    }
}

// ============================================================================
// Normalized graph
// ============================================================================

/// Immutable output of [`crate::normalize`].
///
/// Serializes to the same `{nodes, links}` shape as the input document, so a
/// normalized graph can be written out and fed back in.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NormalizedGraph {
    nodes: Vec<Node>,
    links: Vec<Link>,
    #[serde(skip)]
    index: HashMap<String, usize>,
    /// Split variant id -> original id.
    #[serde(skip)]
    origins: BTreeMap<String, String>,
}

impl NormalizedGraph {
    pub(crate) fn new(
        nodes: Vec<Node>,
        links: Vec<Link>,
        origins: BTreeMap<String, String>,
    ) -> Self {
        let index = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();
        Self {
            nodes,
            links,
            index,
            origins,
        }
    }

    /// Build a graph from records that are already normalized (ids unique,
    /// endpoints resolvable). Degrees are taken as given.
    pub fn from_parts(nodes: Vec<Node>, links: Vec<Link>) -> Self {
        Self::new(nodes, links, BTreeMap::new())
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn kind_of(&self, id: &str) -> Option<NodeKind> {
        self.node(id).map(|n| n.kind)
    }

    /// Original id of a split variant, or the id itself for unsplit nodes.
    pub fn origin_of<'a>(&'a self, id: &'a str) -> &'a str {
        self.origins.get(id).map(String::as_str).unwrap_or(id)
    }

    pub fn is_split_variant(&self, id: &str) -> bool {
        self.origins.contains_key(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn count_of_kind(&self, kind: NodeKind) -> usize {
        self.nodes.iter().filter(|n| n.kind == kind).count()
    }

    /// Serialize back into the raw document shape.
    pub fn to_document(&self) -> RawDocument {
        RawDocument {
            nodes: self
                .nodes
                .iter()
                .filter_map(|n| serde_json::to_value(n).ok())
                .collect(),
            links: self
                .links
                .iter()
                .filter_map(|l| serde_json::to_value(l).ok())
                .collect(),
        }
    }
}
