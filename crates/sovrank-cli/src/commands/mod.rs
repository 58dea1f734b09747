//! Command handlers for the CLI.
//!
//! These are called from `main` after the tracing subscriber and analysis
//! config are established. Every command reads and writes plain JSON files;
//! nothing here owns long-lived state.

mod extract;
mod fuse;
mod normalize;
mod sov;

use std::fs;
use std::path::Path;

use anyhow::Context as _;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sovrank_core::{load_synonyms, AnalysisConfig, BrandCatalog};

pub(crate) use extract::run_extract;
pub(crate) use fuse::run_fuse;
pub(crate) use normalize::run_normalize;
pub(crate) use sov::{run_sov, SovArgs};

/// Read and deserialize a JSON file, attaching the path to any failure.
fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

/// Serialize `value` as pretty JSON and write it to `path`.
fn write_json<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let rendered = serde_json::to_string_pretty(value)?;
    fs::write(path, rendered).with_context(|| format!("writing {}", path.display()))
}

/// Build the brand catalog: built-in seeds, plus an optional YAML catalog
/// merged on top.
fn build_catalog(config: &AnalysisConfig, synonyms: Option<&Path>) -> anyhow::Result<BrandCatalog> {
    let mut catalog = BrandCatalog::with_config(config);
    if let Some(path) = synonyms {
        let file =
            load_synonyms(path).with_context(|| format!("loading synonyms from {}", path.display()))?;
        catalog.import(&file);
        tracing::info!(
            path = %path.display(),
            canonical_brands = catalog.len(),
            "synonym catalog loaded"
        );
    }
    Ok(catalog)
}
