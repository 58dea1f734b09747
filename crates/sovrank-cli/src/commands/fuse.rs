use std::path::Path;

use sovrank_core::{AnalysisConfig, SearchObservation};
use sovrank_fusion::{account_universe, fuse};

/// Fuse per-account search observations into a single ranked list.
///
/// Reads a JSON array of observations, runs reciprocal-rank fusion with the
/// configured `k`, and either writes the fused list as JSON or prints it as
/// a table.
///
/// # Errors
///
/// Returns an error if a file cannot be read, parsed, or written.
pub(crate) fn run_fuse(
    config: &AnalysisConfig,
    input: &Path,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let observations: Vec<SearchObservation> = super::read_json(input)?;
    let accounts = account_universe(&observations);
    let fused = fuse(&observations, config.rrf_k);
    println!(
        "fused {} observations from {} accounts into {} ranked items",
        observations.len(),
        accounts.len(),
        fused.len()
    );

    if let Some(path) = output {
        super::write_json(path, &fused)?;
        println!("wrote fused ranking to {}", path.display());
        return Ok(());
    }

    if fused.is_empty() {
        println!("no items to rank");
        return Ok(());
    }

    let header = format!("{:<6}{:<28}{:>12}  ACCOUNTS", "RANK", "ITEM", "SCORE");
    println!("{header}");
    for ranking in &fused {
        println!(
            "{:<6}{:<28}{:>12.6}  {}",
            ranking.final_rank,
            ranking.item_id,
            ranking.fusion_score,
            ranking.per_account_rank.len()
        );
    }

    Ok(())
}
