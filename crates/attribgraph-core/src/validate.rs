//! Post-rewrite referential check.

use std::collections::HashSet;

use crate::model::{Link, Node};

/// Drop every link with an endpoint outside `nodes`. Returns the surviving
/// links and how many were dropped.
pub fn retain_resolvable(nodes: &[Node], links: Vec<Link>) -> (Vec<Link>, usize) {
    let ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    let before = links.len();
    let kept: Vec<Link> = links
        .into_iter()
        .filter(|link| {
            let ok = ids.contains(link.source.as_str()) && ids.contains(link.target.as_str());
            if !ok {
                tracing::debug!(
                    source = %link.source,
                    target = %link.target,
                    "dropping link with unresolved endpoint"
                );
            }
            ok
        })
        .collect();
    let dropped = before - kept.len();
    (kept, dropped)
}
