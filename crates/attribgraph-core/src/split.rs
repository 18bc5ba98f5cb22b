//! Node splitting and link rewrite.
//!
//! A node whose aggregated role set is exactly `{sponsor, victim}` is replaced
//! by two variants, `<id><sponsor_suffix>` and `<id><victim_suffix>`. Every
//! link endpoint that lands on such a node is rerouted using the role that
//! endpoint has *in that link*:
//!
//! | per-link role | routed to |
//! |---|---|
//! | sponsor | sponsor variant |
//! | victim | victim variant |
//! | actor | decided by [`AmbiguousRoute`] |
//!
//! Under the default [`SplitRule::Exact`] a plain `actor` appearance puts
//! `actor` into the node's role set and so prevents the split; the ambiguous
//! row only comes into play with [`SplitRule::IgnoreActor`].

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::model::{Link, Node, NodeKind};
use crate::roles::{Classification, Role, RoleSet};

/// Where an endpoint with the plain `actor` role goes when its node is split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbiguousRoute {
    /// Route to the sponsor variant.
    #[default]
    Sponsor,
    /// Route to the victim variant.
    Victim,
    /// Duplicate the link onto both variants.
    Both,
}

impl AmbiguousRoute {
    /// Tie-break applied unless configured otherwise.
    pub const DEFAULT: AmbiguousRoute = AmbiguousRoute::Sponsor;

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sponsor" => Some(Self::Sponsor),
            "victim" => Some(Self::Victim),
            "both" | "duplicate" => Some(Self::Both),
            _ => None,
        }
    }
}

/// Which role sets trigger a split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitRule {
    /// Role set is exactly `{sponsor, victim}`.
    #[default]
    Exact,
    /// Role set holds both sponsor and victim, whatever else it holds.
    IgnoreActor,
}

impl SplitRule {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" => Some(Self::Exact),
            "ignore_actor" | "ignore-actor" => Some(Self::IgnoreActor),
            _ => None,
        }
    }

    pub fn splits(self, roles: RoleSet) -> bool {
        match self {
            SplitRule::Exact => roles.needs_split(),
            SplitRule::IgnoreActor => roles.contains(Role::Sponsor) && roles.contains(Role::Victim),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitPolicy {
    pub split_rule: SplitRule,
    pub ambiguous_route: AmbiguousRoute,
    pub sponsor_suffix: String,
    pub victim_suffix: String,
}

impl Default for SplitPolicy {
    fn default() -> Self {
        Self {
            split_rule: SplitRule::Exact,
            ambiguous_route: AmbiguousRoute::DEFAULT,
            sponsor_suffix: " (sponsor)".to_string(),
            victim_suffix: " (victim)".to_string(),
        }
    }
}

impl SplitPolicy {
    pub fn splits(&self, roles: RoleSet) -> bool {
        self.split_rule.splits(roles)
    }

    pub fn sponsor_id(&self, id: &str) -> String {
        format!("{id}{}", self.sponsor_suffix)
    }

    pub fn victim_id(&self, id: &str) -> String {
        format!("{id}{}", self.victim_suffix)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SplitOutput {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
    /// Original ids of the nodes that were split, in arena order.
    pub split_ids: Vec<String>,
    /// Variant id -> original id.
    pub origins: BTreeMap<String, String>,
}

/// Materialize final nodes from the arena and rewrite `links` (which must be
/// the list `classification` was computed from).
pub fn split(classification: &Classification, links: &[Link], policy: &SplitPolicy) -> SplitOutput {
    let mut out = SplitOutput::default();
    let mut emitted: HashSet<String> = HashSet::new();

    // Reserve every original id first so a variant can never shadow a real node.
    for record in classification.arena.records() {
        if !policy.splits(record.roles) {
            emitted.insert(record.id.clone());
        }
    }

    for record in classification.arena.records() {
        if policy.splits(record.roles) {
            let sponsor_id = policy.sponsor_id(&record.id);
            let victim_id = policy.victim_id(&record.id);
            tracing::debug!(
                id = %record.id,
                sponsor = %sponsor_id,
                victim = %victim_id,
                "splitting node with sponsor and victim roles"
            );
            let variants = [(sponsor_id, NodeKind::Sponsor), (victim_id, NodeKind::Victim)];
            for (variant, kind) in variants {
                out.origins.insert(variant.clone(), record.id.clone());
                if emitted.insert(variant.clone()) {
                    out.nodes.push(Node::new(variant, kind));
                } else {
                    tracing::warn!(id = %variant, "split variant id already exists; merging");
                }
            }
            out.split_ids.push(record.id.clone());
        } else {
            let kind = record
                .roles
                .resolved_kind()
                .or(record.declared_kind)
                .unwrap_or(NodeKind::Actor);
            out.nodes.push(Node::new(record.id.clone(), kind));
        }
    }

    out.links.reserve(links.len());
    for (link, roles) in links.iter().zip(&classification.edge_roles) {
        let sources = route(classification, policy, &link.source, roles.source);
        let targets = route(classification, policy, &link.target, roles.target);
        for source in &sources {
            for target in &targets {
                out.links.push(Link {
                    source: source.clone(),
                    target: target.clone(),
                    weight: link.weight,
                    kind: link.kind.clone(),
                });
            }
        }
    }

    out
}

/// Ids an endpoint is routed to: one, or two under [`AmbiguousRoute::Both`].
fn route(
    classification: &Classification,
    policy: &SplitPolicy,
    id: &str,
    role: Role,
) -> Vec<String> {
    let is_split = classification
        .arena
        .get(id)
        .is_some_and(|r| policy.splits(r.roles));
    if !is_split {
        return vec![id.to_string()];
    }
    match (role, policy.ambiguous_route) {
        (Role::Sponsor, _) | (Role::Actor, AmbiguousRoute::Sponsor) => vec![policy.sponsor_id(id)],
        (Role::Victim, _) | (Role::Actor, AmbiguousRoute::Victim) => vec![policy.victim_id(id)],
        (Role::Actor, AmbiguousRoute::Both) => vec![policy.sponsor_id(id), policy.victim_id(id)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::CanonicalNode;
    use crate::roles::{classify, RoleTokens};

    fn canonical(ids: &[&str]) -> Vec<CanonicalNode> {
        ids.iter()
            .map(|id| CanonicalNode {
                id: id.to_string(),
                declared_kind: None,
            })
            .collect()
    }

    fn run(ids: &[&str], links: &[Link], policy: &SplitPolicy) -> SplitOutput {
        let c = classify(&canonical(ids), links, &RoleTokens::default());
        split(&c, links, policy)
    }

    /// `US` backs `A` and is also attacked by `A`.
    fn sponsor_victim_links() -> Vec<Link> {
        vec![
            Link::new("US", "A").with_kind("sponsor_to_actor"),
            Link::new("A", "US").with_kind("actor_to_victim"),
        ]
    }

    #[test]
    fn sponsor_victim_node_splits_into_two_variants() {
        let out = run(&["US", "A"], &sponsor_victim_links(), &SplitPolicy::default());
        let ids: Vec<&str> = out.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["US (sponsor)", "US (victim)", "A"]);
        assert_eq!(out.nodes[0].kind, NodeKind::Sponsor);
        assert_eq!(out.nodes[1].kind, NodeKind::Victim);
        assert_eq!(out.split_ids, vec!["US".to_string()]);
        assert_eq!(out.origins.get("US (victim)").map(String::as_str), Some("US"));

        assert_eq!(out.links[0].source, "US (sponsor)");
        assert_eq!(out.links[0].target, "A");
        assert_eq!(out.links[1].source, "A");
        assert_eq!(out.links[1].target, "US (victim)");
    }

    #[test]
    fn unsplit_nodes_resolve_kind_by_precedence() {
        let links = vec![
            Link::new("S", "A").with_kind("sponsor_to_actor"),
            Link::new("A", "V").with_kind("actor_to_victim"),
            Link::new("V", "B"),
        ];
        let out = run(&["S", "A", "V", "B", "lonely"], &links, &SplitPolicy::default());
        let kinds: Vec<(&str, NodeKind)> =
            out.nodes.iter().map(|n| (n.id.as_str(), n.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                ("S", NodeKind::Sponsor),
                ("A", NodeKind::Actor),
                ("V", NodeKind::Victim),
                ("B", NodeKind::Actor),
                ("lonely", NodeKind::Actor),
            ]
        );
        assert!(out.split_ids.is_empty());
        assert_eq!(out.links, links);
    }

    #[test]
    fn isolated_node_keeps_declared_kind() {
        let nodes = vec![CanonicalNode {
            id: "gov".to_string(),
            declared_kind: Some(NodeKind::Victim),
        }];
        let c = classify(&nodes, &[], &RoleTokens::default());
        let out = split(&c, &[], &SplitPolicy::default());
        assert_eq!(out.nodes[0].kind, NodeKind::Victim);
    }

    fn ignoring_actor(route: AmbiguousRoute) -> SplitPolicy {
        SplitPolicy {
            split_rule: SplitRule::IgnoreActor,
            ambiguous_route: route,
            ..SplitPolicy::default()
        }
    }

    #[test]
    fn ambiguous_endpoint_follows_policy() {
        let mut links = sponsor_victim_links();
        links.push(Link::new("US", "B").with_kind("mentions"));

        let default = run(&["US", "A", "B"], &links, &ignoring_actor(AmbiguousRoute::DEFAULT));
        assert_eq!(default.split_ids, vec!["US".to_string()]);
        assert_eq!(default.links[2].source, "US (sponsor)");

        let out = run(&["US", "A", "B"], &links, &ignoring_actor(AmbiguousRoute::Victim));
        assert_eq!(out.links[2].source, "US (victim)");

        let both = ignoring_actor(AmbiguousRoute::Both);
        let out = run(&["US", "A", "B"], &links, &both);
        assert_eq!(out.links.len(), 4);
        assert_eq!(out.links[2].source, "US (sponsor)");
        assert_eq!(out.links[3].source, "US (victim)");
    }

    #[test]
    fn actor_role_on_unsplit_node_is_unchanged() {
        // `US` also appears as a plain actor, so its set is {sponsor, victim, actor}.
        let mut links = sponsor_victim_links();
        links.push(Link::new("US", "B").with_kind("mentions"));
        links.push(Link::new("B", "US").with_kind("mentions"));
        let out = run(&["US", "A", "B"], &links, &SplitPolicy::default());
        assert!(out.split_ids.is_empty());
        assert_eq!(out.nodes[0].kind, NodeKind::Sponsor);
    }

    #[test]
    fn variant_colliding_with_real_node_is_merged() {
        let out = run(
            &["US", "A", "US (victim)"],
            &sponsor_victim_links(),
            &SplitPolicy::default(),
        );
        let count = out.nodes.iter().filter(|n| n.id == "US (victim)").count();
        assert_eq!(count, 1);
        let ids: HashSet<&str> = out.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids.len(), out.nodes.len());
    }

    #[test]
    fn rule_and_route_parse() {
        assert_eq!(SplitRule::parse("ignore-actor"), Some(SplitRule::IgnoreActor));
        assert_eq!(SplitRule::parse("exact"), Some(SplitRule::Exact));
        let all = RoleSet::of(&[Role::Sponsor, Role::Victim, Role::Actor]);
        assert!(!SplitRule::Exact.splits(all));
        assert!(SplitRule::IgnoreActor.splits(all));
        assert!(!SplitRule::IgnoreActor.splits(RoleSet::of(&[Role::Sponsor, Role::Actor])));

        assert_eq!(AmbiguousRoute::parse("Both"), Some(AmbiguousRoute::Both));
        assert_eq!(AmbiguousRoute::parse("victim"), Some(AmbiguousRoute::Victim));
        assert_eq!(AmbiguousRoute::parse("nope"), None);
        assert_eq!(AmbiguousRoute::default(), AmbiguousRoute::DEFAULT);
    }
}
