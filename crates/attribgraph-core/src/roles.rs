//! Role classification.
//!
//! Every canonical link assigns a role to each of its endpoints, derived only
//! from the link's `type` string. Roles are then folded into a per-node set.
//! Node records live in a [`NodeArena`] (records by index, ids mapped to
//! indices) so the splitter can read the aggregated sets without chasing
//! references.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::canonical::CanonicalNode;
use crate::model::{Link, NodeKind};

/// Role of one endpoint in one link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Sponsor,
    Actor,
    Victim,
}

impl Role {
    fn bit(self) -> u8 {
        match self {
            Role::Sponsor => 0b001,
            Role::Actor => 0b010,
            Role::Victim => 0b100,
        }
    }
}

impl From<Role> for NodeKind {
    fn from(role: Role) -> Self {
        match role {
            Role::Sponsor => NodeKind::Sponsor,
            Role::Actor => NodeKind::Actor,
            Role::Victim => NodeKind::Victim,
        }
    }
}

/// Set of roles a node takes across all links.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RoleSet(u8);

impl RoleSet {
    pub const EMPTY: RoleSet = RoleSet(0);
    /// The only combination that forces a split.
    pub const SPONSOR_AND_VICTIM: RoleSet = RoleSet(0b101);

    pub fn of(roles: &[Role]) -> Self {
        roles.iter().fold(Self::EMPTY, |mut set, &r| {
            set.insert(r);
            set
        })
    }

    pub fn insert(&mut self, role: Role) {
        self.0 |= role.bit();
    }

    pub fn contains(self, role: Role) -> bool {
        self.0 & role.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Exactly `{sponsor, victim}`; a set that also holds `actor` does not split.
    pub fn needs_split(self) -> bool {
        self == Self::SPONSOR_AND_VICTIM
    }

    /// Kind by precedence `sponsor > victim > actor`. `None` when empty.
    pub fn resolved_kind(self) -> Option<NodeKind> {
        if self.contains(Role::Sponsor) {
            Some(NodeKind::Sponsor)
        } else if self.contains(Role::Victim) {
            Some(NodeKind::Victim)
        } else if self.contains(Role::Actor) {
            Some(NodeKind::Actor)
        } else {
            None
        }
    }
}

/// Substrings of a lower-cased link type that mark endpoint roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleTokens {
    /// Marks the source as a sponsor (`sponsor_to_actor`, `sponsor_to_victim`, ...).
    pub sponsor_token: String,
    /// Marks the target as a victim (`actor_to_victim`, ...).
    pub victim_token: String,
}

impl Default for RoleTokens {
    fn default() -> Self {
        Self {
            sponsor_token: "sponsor_to".to_string(),
            victim_token: "to_victim".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeRoles {
    pub source: Role,
    pub target: Role,
}

pub fn classify_link(kind: &str, tokens: &RoleTokens) -> EdgeRoles {
    let kind = kind.to_lowercase();
    let source = if kind.contains(&tokens.sponsor_token.to_lowercase()) {
        Role::Sponsor
    } else {
        Role::Actor
    };
    let target = if kind.contains(&tokens.victim_token.to_lowercase()) {
        Role::Victim
    } else {
        Role::Actor
    };
    EdgeRoles { source, target }
}

// ============================================================================
// Arena
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRecord {
    pub id: String,
    pub declared_kind: Option<NodeKind>,
    pub roles: RoleSet,
    /// Created because a link referenced an id absent from the node list.
    pub synthesized: bool,
}

#[derive(Debug, Clone, Default)]
pub struct NodeArena {
    records: Vec<NodeRecord>,
    by_id: HashMap<String, usize>,
}

impl NodeArena {
    pub fn records(&self) -> &[NodeRecord] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&NodeRecord> {
        self.by_id.get(id).map(|&i| &self.records[i])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Insert a record; returns `false` when the id is already present.
    fn insert(&mut self, record: NodeRecord) -> bool {
        if self.by_id.contains_key(&record.id) {
            return false;
        }
        self.by_id.insert(record.id.clone(), self.records.len());
        self.records.push(record);
        true
    }

    fn add_role(&mut self, id: &str, role: Role) {
        if let Some(&i) = self.by_id.get(id) {
            self.records[i].roles.insert(role);
        }
    }
}

/// Output of the classifier: the arena plus per-link roles (parallel to the
/// link list it was computed from).
#[derive(Debug, Clone, Default)]
pub struct Classification {
    pub arena: NodeArena,
    pub edge_roles: Vec<EdgeRoles>,
    pub synthesized: Vec<String>,
    pub duplicate_nodes: usize,
}

pub fn classify(nodes: &[CanonicalNode], links: &[Link], tokens: &RoleTokens) -> Classification {
    let mut out = Classification::default();

    for node in nodes {
        let inserted = out.arena.insert(NodeRecord {
            id: node.id.clone(),
            declared_kind: node.declared_kind,
            roles: RoleSet::EMPTY,
            synthesized: false,
        });
        if !inserted {
            tracing::warn!(id = %node.id, "duplicate node id; keeping the first record");
            out.duplicate_nodes += 1;
        }
    }

    // Heal dangling endpoints before any roles are folded in.
    for link in links {
        for id in [&link.source, &link.target] {
            let inserted = out.arena.insert(NodeRecord {
                id: id.clone(),
                declared_kind: None,
                roles: RoleSet::EMPTY,
                synthesized: true,
            });
            if inserted {
                tracing::debug!(id = %id, "synthesized actor node for dangling link endpoint");
                out.synthesized.push(id.clone());
            }
        }
    }

    out.edge_roles.reserve(links.len());
    for link in links {
        let roles = classify_link(&link.kind, tokens);
        out.arena.add_role(&link.source, roles.source);
        out.arena.add_role(&link.target, roles.target);
        out.edge_roles.push(roles);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str) -> CanonicalNode {
        CanonicalNode {
            id: id.to_string(),
            declared_kind: None,
        }
    }

    #[test]
    fn link_type_tokens_drive_endpoint_roles() {
        let t = RoleTokens::default();
        assert_eq!(
            classify_link("sponsor_to_actor", &t),
            EdgeRoles {
                source: Role::Sponsor,
                target: Role::Actor
            }
        );
        assert_eq!(
            classify_link("Actor_To_Victim", &t),
            EdgeRoles {
                source: Role::Actor,
                target: Role::Victim
            }
        );
        assert_eq!(
            classify_link("SPONSOR_TO_VICTIM", &t),
            EdgeRoles {
                source: Role::Sponsor,
                target: Role::Victim
            }
        );
        assert_eq!(
            classify_link("", &t),
            EdgeRoles {
                source: Role::Actor,
                target: Role::Actor
            }
        );
    }

    #[test]
    fn role_set_precedence_and_split_rule() {
        assert!(RoleSet::of(&[Role::Sponsor, Role::Victim]).needs_split());
        assert!(!RoleSet::of(&[Role::Sponsor, Role::Victim, Role::Actor]).needs_split());
        assert!(!RoleSet::of(&[Role::Actor]).needs_split());
        assert!(!RoleSet::of(&[Role::Victim]).needs_split());

        assert_eq!(
            RoleSet::of(&[Role::Actor, Role::Victim]).resolved_kind(),
            Some(NodeKind::Victim)
        );
        assert_eq!(
            RoleSet::of(&[Role::Actor, Role::Victim, Role::Sponsor]).resolved_kind(),
            Some(NodeKind::Sponsor)
        );
        assert_eq!(RoleSet::EMPTY.resolved_kind(), None);
    }

    #[test]
    fn aggregation_ignores_link_order() {
        let t = RoleTokens::default();
        let nodes = vec![node("X"), node("A"), node("V")];
        let mut links = vec![
            Link::new("X", "A").with_kind("sponsor_to_actor"),
            Link::new("A", "X").with_kind("actor_to_victim"),
            Link::new("A", "V").with_kind("actor_to_victim"),
        ];
        let forward = classify(&nodes, &links, &t);
        links.reverse();
        let backward = classify(&nodes, &links, &t);
        for id in ["X", "A", "V"] {
            assert_eq!(
                forward.arena.get(id).map(|r| r.roles),
                backward.arena.get(id).map(|r| r.roles)
            );
        }
        assert!(forward.arena.get("X").unwrap().roles.needs_split());
    }

    #[test]
    fn dangling_endpoints_are_synthesized_once() {
        let t = RoleTokens::default();
        let links = vec![
            Link::new("A", "ghost").with_kind("actor_to_victim"),
            Link::new("ghost", "A"),
        ];
        let c = classify(&[node("A"), node("A")], &links, &t);
        assert_eq!(c.synthesized, vec!["ghost".to_string()]);
        assert_eq!(c.duplicate_nodes, 1);
        assert_eq!(c.arena.len(), 2);
        let ghost = c.arena.get("ghost").unwrap();
        assert!(ghost.synthesized);
        assert!(ghost.roles.contains(Role::Victim));
        assert!(ghost.roles.contains(Role::Actor));
        assert_eq!(c.edge_roles.len(), 2);
    }
}
