//! Country token → canonical sponsor display name.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tokens that by themselves mark a question as country-scoped.
pub const COUNTRY_TOKENS: [&str; 4] = ["china", "russia", "iran", "korea"];

/// Built-in table. Keys are lower-case.
const BUILTIN: [(&str, &str); 10] = [
    ("china", "China"),
    ("prc", "China"),
    ("russia", "Russian Federation"),
    ("russian federation", "Russian Federation"),
    ("iran", "Iran (Islamic Republic of)"),
    ("korea", "Korea (Democratic People's Republic of)"),
    ("north korea", "Korea (Democratic People's Republic of)"),
    ("dprk", "Korea (Democratic People's Republic of)"),
    ("democratic people's republic of korea", "Korea (Democratic People's Republic of)"),
    ("united states", "United States of America"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountryTable {
    entries: BTreeMap<String, String>,
}

impl Default for CountryTable {
    fn default() -> Self {
        Self {
            entries: BUILTIN
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl CountryTable {
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Add or override an entry; the token is matched case-insensitively.
    pub fn insert(&mut self, token: &str, canonical: impl Into<String>) {
        self.entries
            .insert(token.trim().to_lowercase(), canonical.into());
    }

    /// Overlay `other` on top of `self`.
    pub fn extend(&mut self, other: &CountryTable) {
        for (k, v) in &other.entries {
            self.entries.insert(k.trim().to_lowercase(), v.clone());
        }
    }

    /// Canonical display name, or the token itself (trimmed) when unmapped.
    pub fn resolve(&self, token: &str) -> String {
        let token = token.trim();
        self.entries
            .get(&token.to_lowercase())
            .cloned()
            .unwrap_or_else(|| token.to_string())
    }

    pub fn contains(&self, token: &str) -> bool {
        self.entries.contains_key(&token.trim().to_lowercase())
    }

    /// Earliest table key that appears as whole words in `text`; at equal
    /// positions the longer key wins ("north korea" over "korea").
    pub fn find_in(&self, text: &str) -> Option<&str> {
        let lower = text.to_lowercase();
        self.entries
            .keys()
            .filter_map(|key| word_position(&lower, key).map(|pos| (pos, key.as_str())))
            .min_by(|(pa, a), (pb, b)| pa.cmp(pb).then(b.len().cmp(&a.len())))
            .map(|(_, key)| key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn word_position(haystack: &str, needle: &str) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    let is_word = |c: char| c.is_alphanumeric() || c == '\'';
    haystack.match_indices(needle).map(|(pos, _)| pos).find(|&pos| {
        let before = haystack[..pos].chars().next_back();
        let after = haystack[pos + needle.len()..].chars().next();
        !before.is_some_and(is_word) && !after.is_some_and(is_word)
    })
}
