//! CLI configuration.
//!
//! Values come from (lowest to highest precedence): built-in defaults, an
//! optional JSON config file, then command-line flags.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use attribgraph_core::NormalizeOptions;
use attribgraph_query::CountryTable;

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "attribgraph.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    /// Dataset name -> file name under `data_dir`.
    pub datasets: BTreeMap<String, String>,
    /// Entity details file name under `data_dir`.
    pub details: String,
    pub normalize: NormalizeOptions,
    /// Entries added on top of the built-in country table.
    pub countries: CountryTable,
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut datasets = BTreeMap::new();
        datasets.insert("sector".to_string(), "sector.json".to_string());
        datasets.insert("geo".to_string(), "geo.json".to_string());
        Self {
            data_dir: PathBuf::from("data"),
            datasets,
            details: "details.json".to_string(),
            normalize: NormalizeOptions::default(),
            countries: CountryTable::empty(),
        }
    }
}

impl AppConfig {
    /// Load `explicit` if given (it must exist), else `attribgraph.json` in
    /// the working directory if present, else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Self::from_file(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: AppConfig = serde_json::from_str(&text)
            .with_context(|| format!("invalid config {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Built-in country table overlaid with configured entries.
    pub fn country_table(&self) -> CountryTable {
        let mut table = CountryTable::default();
        table.extend(&self.countries);
        table
    }

    pub fn details_path(&self) -> PathBuf {
        self.data_dir.join(&self.details)
    }
}
