//! Degree recomputation.

use std::collections::HashMap;

use crate::model::{Link, Node};

/// Set every node's degree to its number of link endpoint occurrences.
/// A self-loop counts twice; nodes without links end at 0.
pub fn assign_degrees(nodes: &mut [Node], links: &[Link]) {
    let mut counts: HashMap<&str, usize> = HashMap::with_capacity(nodes.len());
    for link in links {
        *counts.entry(link.source.as_str()).or_default() += 1;
        *counts.entry(link.target.as_str()).or_default() += 1;
    }
    for node in nodes.iter_mut() {
        node.degree = counts.get(node.id.as_str()).copied().unwrap_or(0);
    }
}
