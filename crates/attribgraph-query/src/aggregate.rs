//! Grouped weight sums with a stable ranking.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub name: String,
    pub count: f64,
}

/// Sum weights per key in a single pass, then rank descending by sum.
///
/// Keys appear in first-seen order before sorting and the sort is stable, so
/// ties keep encounter order. At most `limit` entries are returned.
pub fn rank_by_weight<'a, I>(items: I, limit: usize) -> Vec<RankedEntry>
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    let mut slots: HashMap<&'a str, usize> = HashMap::new();
    let mut sums: Vec<(&'a str, f64)> = Vec::new();
    for (key, weight) in items {
        match slots.get(key) {
            Some(&i) => sums[i].1 += weight,
            None => {
                slots.insert(key, sums.len());
                sums.push((key, weight));
            }
        }
    }
    sums.sort_by(|a, b| b.1.total_cmp(&a.1));
    sums.truncate(limit);
    sums.into_iter()
        .map(|(name, count)| RankedEntry {
            name: name.to_string(),
            count,
        })
        .collect()
}
