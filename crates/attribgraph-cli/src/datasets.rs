//! Dataset provider: named graph documents under a data directory.

use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use attribgraph_core::{normalize_json_str, NormalizeOptions, Normalized};

use crate::config::AppConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetEntry {
    pub name: String,
    pub path: PathBuf,
    pub exists: bool,
}

/// Where a graph comes from: an explicit path or a configured dataset name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphLocation {
    Path(PathBuf),
    Named(String),
}

pub fn resolve(config: &AppConfig, location: &GraphLocation) -> Result<PathBuf> {
    match location {
        GraphLocation::Path(path) => Ok(path.clone()),
        GraphLocation::Named(name) => {
            let file = config.datasets.get(name).ok_or_else(|| {
                let known = config.datasets.keys().cloned().collect::<Vec<_>>().join(", ");
                anyhow!("unknown dataset `{name}` (known: {known})")
            })?;
            Ok(config.data_dir.join(file))
        }
    }
}

pub fn entries(config: &AppConfig) -> Vec<DatasetEntry> {
    config
        .datasets
        .iter()
        .map(|(name, file)| {
            let path = config.data_dir.join(file);
            let exists = path.is_file();
            DatasetEntry {
                name: name.clone(),
                path,
                exists,
            }
        })
        .collect()
}

/// Read and normalize one graph document.
pub fn load_graph(path: &Path, options: &NormalizeOptions) -> Result<Normalized> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read graph {}", path.display()))?;
    let normalized = normalize_json_str(&text, options)
        .with_context(|| format!("failed to ingest graph {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        summary = %normalized.report.summary_line(),
        "loaded graph"
    );
    Ok(normalized)
}
