//! Per-entity details document: `{ "<node id>": { ...free-form... } }`.
//!
//! Details are keyed by the ids of the raw dataset, so a split variant is
//! looked up under its original id.

use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use attribgraph_core::SplitPolicy;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailsDocument {
    entries: BTreeMap<String, Value>,
}

impl DetailsDocument {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        let Value::Object(map) = value else {
            return Err(anyhow!("details document must be a JSON object keyed by node id"));
        };
        Ok(Self {
            entries: map.into_iter().collect(),
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read details {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("invalid details {}", path.display()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact id first, then the id with a split suffix removed. Returns the key
    /// that matched alongside the record.
    pub fn lookup<'a>(&'a self, id: &'a str, policy: &SplitPolicy) -> Option<(&'a str, &'a Value)> {
        if let Some(v) = self.entries.get(id) {
            return Some((id, v));
        }
        [policy.sponsor_suffix.as_str(), policy.victim_suffix.as_str()]
            .into_iter()
            .filter(|suffix| !suffix.is_empty())
            .filter_map(|suffix| id.strip_suffix(suffix))
            .find_map(|origin| self.entries.get(origin).map(|v| (origin, v)))
    }
}
