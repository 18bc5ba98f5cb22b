//! Edge canonicalization.
//!
//! Raw endpoints arrive either as a plain id (`"APT28"`, `42`) or as a record
//! carrying an `id` field (`{"id": "APT28", "x": 10.5}`), the latter being what
//! a layout engine leaves behind after it has resolved links in place. Both are
//! reduced here, once, to a plain `String`; no later pass looks at raw JSON.

use serde_json::Value;

use crate::model::{Link, NodeKind, RawDocument};

/// Weight assigned when a raw link carries no usable weight.
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// A node as read from the raw document, before role resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalNode {
    pub id: String,
    /// Raw `type` when it names one of the known kinds.
    pub declared_kind: Option<NodeKind>,
}

#[derive(Debug, Clone, Default)]
pub struct CanonicalGraph {
    pub nodes: Vec<CanonicalNode>,
    pub links: Vec<Link>,
    /// Node entries without a usable `id`.
    pub malformed_nodes: usize,
    /// Link entries with an endpoint that is neither an id nor an id-bearing record.
    pub malformed_links: usize,
}

pub fn canonicalize(doc: &RawDocument) -> CanonicalGraph {
    let mut out = CanonicalGraph::default();

    for raw in &doc.nodes {
        match canonical_node(raw) {
            Some(node) => out.nodes.push(node),
            None => {
                tracing::warn!(entry = %raw, "skipping node without a usable id");
                out.malformed_nodes += 1;
            }
        }
    }

    for raw in &doc.links {
        match canonical_link(raw) {
            Some(link) => out.links.push(link),
            None => {
                tracing::warn!(entry = %raw, "skipping link with an unresolvable endpoint");
                out.malformed_links += 1;
            }
        }
    }

    out
}

/// Reduce a raw endpoint to its id.
pub fn endpoint_id(value: &Value) -> Option<String> {
    match value {
        Value::Object(record) => record.get("id").and_then(scalar_id),
        other => scalar_id(other),
    }
}

fn scalar_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn canonical_node(raw: &Value) -> Option<CanonicalNode> {
    let record = raw.as_object()?;
    let id = record.get("id").and_then(scalar_id)?;
    let declared_kind = record
        .get("type")
        .and_then(Value::as_str)
        .and_then(NodeKind::parse);
    Some(CanonicalNode { id, declared_kind })
}

fn canonical_link(raw: &Value) -> Option<Link> {
    let record = raw.as_object()?;
    let source = record.get("source").and_then(endpoint_id)?;
    let target = record.get("target").and_then(endpoint_id)?;
    let weight = record
        .get("weight")
        .map(canonical_weight)
        .unwrap_or(DEFAULT_WEIGHT);
    let kind = record
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    Some(Link {
        source,
        target,
        weight,
        kind,
    })
}

/// Weights must be finite and strictly positive; anything else falls back to
/// [`DEFAULT_WEIGHT`]. Numeric strings are accepted.
fn canonical_weight(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(w) if w.is_finite() && w > 0.0 => w,
        _ => DEFAULT_WEIGHT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> RawDocument {
        RawDocument::from_value(value).unwrap()
    }

    #[test]
    fn plain_and_record_endpoints_reduce_to_the_same_id() {
        let g = canonicalize(&doc(json!({
            "nodes": [{ "id": "A" }, { "id": "B" }],
            "links": [
                { "source": "A", "target": "B" },
                { "source": { "id": "A", "x": 1.5 }, "target": { "id": "B", "index": 3 } }
            ]
        })));
        assert_eq!(g.links.len(), 2);
        assert_eq!(g.links[0].source, g.links[1].source);
        assert_eq!(g.links[0].target, g.links[1].target);
    }

    #[test]
    fn numeric_ids_render_as_text() {
        assert_eq!(endpoint_id(&json!(7)), Some("7".to_string()));
        assert_eq!(endpoint_id(&json!({ "id": 12 })), Some("12".to_string()));
        assert_eq!(endpoint_id(&json!({ "name": "x" })), None);
        assert_eq!(endpoint_id(&json!(null)), None);
        assert_eq!(endpoint_id(&json!("")), None);
    }

    #[test]
    fn weight_and_type_defaults() {
        let g = canonicalize(&doc(json!({
            "nodes": [],
            "links": [
                { "source": "A", "target": "B" },
                { "source": "A", "target": "B", "weight": 0 },
                { "source": "A", "target": "B", "weight": -2 },
                { "source": "A", "target": "B", "weight": "4" },
                { "source": "A", "target": "B", "weight": 2.5, "type": "Actor_To_Victim" },
                { "source": "A", "target": "B", "type": 9 }
            ]
        })));
        let weights: Vec<f64> = g.links.iter().map(|l| l.weight).collect();
        assert_eq!(weights, vec![1.0, 1.0, 1.0, 4.0, 2.5, 1.0]);
        assert_eq!(g.links[0].kind, "");
        assert_eq!(g.links[4].kind, "Actor_To_Victim");
        assert_eq!(g.links[5].kind, "");
    }

    #[test]
    fn malformed_entries_are_counted_not_fatal() {
        let g = canonicalize(&doc(json!({
            "nodes": [{ "id": "A", "type": "sponsor" }, { "type": "actor" }, "loose"],
            "links": [
                { "source": "A" },
                { "source": [1], "target": "A" },
                { "source": "A", "target": "A" }
            ]
        })));
        assert_eq!(g.nodes.len(), 1);
        assert_eq!(g.nodes[0].declared_kind, Some(NodeKind::Sponsor));
        assert_eq!(g.malformed_nodes, 2);
        assert_eq!(g.links.len(), 1);
        assert_eq!(g.malformed_links, 2);
    }
}
