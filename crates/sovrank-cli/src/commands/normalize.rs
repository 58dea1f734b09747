use std::path::Path;

use sovrank_core::AnalysisConfig;

/// Print the canonical form of each name, one per line, in input order.
///
/// # Errors
///
/// Returns an error if the synonym catalog cannot be loaded.
pub(crate) fn run_normalize(
    config: &AnalysisConfig,
    synonyms: Option<&Path>,
    names: &[String],
) -> anyhow::Result<()> {
    let catalog = super::build_catalog(config, synonyms)?;
    for name in names {
        println!("{}", catalog.normalize(name));
    }
    Ok(())
}
