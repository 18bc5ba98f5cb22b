//! The normalization pipeline.
//!
//! ```text
//! RawDocument ─► canonicalize ─► classify ─► split
//!             ─► retain_resolvable ─► assign_degrees ─► NormalizedGraph
//! ```
//!
//! Each stage is a pure function of its inputs; a call to [`normalize`] holds
//! no state between invocations.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::canonical::canonicalize;
use crate::degree::assign_degrees;
use crate::model::{Node, NodeKind, NormalizedGraph, RawDocument};
use crate::roles::{classify, RoleTokens};
use crate::split::{split, SplitPolicy};
use crate::validate::retain_resolvable;
use crate::IngestionError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeOptions {
    #[serde(flatten)]
    pub roles: RoleTokens,
    #[serde(flatten)]
    pub split: SplitPolicy,
}

/// Diagnostics collected along the way. Nothing in here is an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NormalizeReport {
    pub raw_nodes: usize,
    pub raw_links: usize,
    pub malformed_nodes: usize,
    pub malformed_links: usize,
    pub duplicate_nodes: usize,
    /// Ids created for link endpoints missing from the node list.
    pub synthesized: Vec<String>,
    /// Original ids of split nodes.
    pub split: Vec<String>,
    /// Links dropped because an endpoint did not resolve after the rewrite.
    pub dropped_links: usize,
    pub nodes: usize,
    pub links: usize,
}

#[derive(Debug, Clone)]
pub struct Normalized {
    pub graph: NormalizedGraph,
    pub report: NormalizeReport,
}

pub fn normalize(doc: &RawDocument, options: &NormalizeOptions) -> Normalized {
    let canonical = canonicalize(doc);
    let classification = classify(&canonical.nodes, &canonical.links, &options.roles);
    let rewritten = split(&classification, &canonical.links, &options.split);
    let (links, dropped_links) = retain_resolvable(&rewritten.nodes, rewritten.links);
    let mut nodes = rewritten.nodes;
    assign_degrees(&mut nodes, &links);

    let report = NormalizeReport {
        raw_nodes: doc.nodes.len(),
        raw_links: doc.links.len(),
        malformed_nodes: canonical.malformed_nodes,
        malformed_links: canonical.malformed_links,
        duplicate_nodes: classification.duplicate_nodes,
        synthesized: classification.synthesized,
        split: rewritten.split_ids,
        dropped_links,
        nodes: nodes.len(),
        links: links.len(),
    };

    tracing::info!(
        nodes = report.nodes,
        links = report.links,
        synthesized = report.synthesized.len(),
        split = report.split.len(),
        dropped_links = report.dropped_links,
        "normalized attribution graph"
    );

    Normalized {
        graph: NormalizedGraph::new(nodes, links, rewritten.origins),
        report,
    }
}

pub fn normalize_value(
    value: Value,
    options: &NormalizeOptions,
) -> Result<Normalized, IngestionError> {
    let doc = RawDocument::from_value(value)?;
    Ok(normalize(&doc, options))
}

pub fn normalize_json_str(
    text: &str,
    options: &NormalizeOptions,
) -> Result<Normalized, IngestionError> {
    let doc = RawDocument::from_json_str(text)?;
    Ok(normalize(&doc, options))
}

impl NormalizeReport {
    /// One-line human summary.
    pub fn summary_line(&self) -> String {
        format!(
            "{} nodes, {} links ({} synthesized, {} split, {} dropped, {} malformed)",
            self.nodes,
            self.links,
            self.synthesized.len(),
            self.split.len(),
            self.dropped_links,
            self.malformed_nodes + self.malformed_links,
        )
    }
}

impl NormalizedGraph {
    /// Nodes ordered by descending degree; equal degrees keep node order.
    pub fn top_by_degree(&self, limit: usize) -> Vec<&Node> {
        let mut nodes: Vec<&Node> = self.nodes().iter().collect();
        nodes.sort_by(|a, b| b.degree.cmp(&a.degree));
        nodes.truncate(limit);
        nodes
    }

    pub fn kind_counts(&self) -> Vec<(NodeKind, usize)> {
        NodeKind::ALL
            .iter()
            .map(|&k| (k, self.count_of_kind(k)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pipeline_heals_splits_and_counts() {
        let n = normalize_value(
            json!({
                "nodes": [
                    { "id": "US", "type": "sponsor" },
                    { "id": "APT1", "type": "actor", "degree": 40 }
                ],
                "links": [
                    { "source": "US", "target": "APT1", "type": "sponsor_to_actor", "weight": 2 },
                    {
                        "source": { "id": "APT1" },
                        "target": { "id": "US" },
                        "type": "actor_to_victim"
                    },
                    { "source": "APT1", "target": "Bank", "type": "actor_to_victim" }
                ]
            }),
            &NormalizeOptions::default(),
        )
        .unwrap();

        let g = &n.graph;
        assert_eq!(n.report.synthesized, vec!["Bank".to_string()]);
        assert_eq!(n.report.split, vec!["US".to_string()]);
        assert_eq!(n.report.dropped_links, 0);
        assert!(!g.contains("US"));
        assert_eq!(g.kind_of("US (sponsor)"), Some(NodeKind::Sponsor));
        assert_eq!(g.kind_of("US (victim)"), Some(NodeKind::Victim));
        assert_eq!(g.kind_of("Bank"), Some(NodeKind::Victim));
        assert_eq!(g.node("APT1").map(|n| n.degree), Some(3));
        assert_eq!(g.node("US (sponsor)").map(|n| n.degree), Some(1));
        assert_eq!(g.origin_of("US (victim)"), "US");
        assert_eq!(g.links()[0].weight, 2.0);
    }

    #[test]
    fn missing_collections_fail_before_normalizing() {
        let err = normalize_json_str(r#"{"links": []}"#, &NormalizeOptions::default()).unwrap_err();
        assert!(err.to_string().contains("nodes"));
    }

    #[test]
    fn options_deserialize_flat() {
        let opts: NormalizeOptions = serde_json::from_value(json!({
            "ambiguous_route": "both",
            "victim_suffix": "#v"
        }))
        .unwrap();
        assert_eq!(opts.split.ambiguous_route, crate::split::AmbiguousRoute::Both);
        assert_eq!(opts.split.victim_suffix, "#v");
        assert_eq!(opts.split.sponsor_suffix, " (sponsor)");
        assert_eq!(opts.roles, RoleTokens::default());
    }

    #[test]
    fn top_by_degree_is_stable() {
        let n = normalize_value(
            json!({
                "nodes": [{ "id": "a" }, { "id": "b" }, { "id": "c" }],
                "links": [{ "source": "a", "target": "b" }, { "source": "c", "target": "c" }]
            }),
            &NormalizeOptions::default(),
        )
        .unwrap();
        let top: Vec<&str> = n.graph.top_by_degree(2).iter().map(|n| n.id.as_str()).collect();
        assert_eq!(top, vec!["c", "a"]);
        assert_eq!(
            n.graph.kind_counts(),
            vec![(NodeKind::Sponsor, 0), (NodeKind::Actor, 3), (NodeKind::Victim, 0)]
        );
        assert!(n.report.summary_line().starts_with("3 nodes, 2 links"));
    }
}
