use std::path::Path;

use sovrank_core::{AnalysisConfig, SearchObservation, SovMethod, Tier};
use sovrank_fusion::fuse;
use sovrank_metrics::{aggregate, join_rankings, ItemMeta, SovReport};

/// Arguments for the `sov` command.
pub(crate) struct SovArgs<'a> {
    pub observations: &'a Path,
    pub items: &'a Path,
    pub keyword: &'a str,
    pub method: SovMethod,
    pub synonyms: Option<&'a Path>,
    pub output: Option<&'a Path>,
    pub text: bool,
}

/// Run the full pipeline for one keyword: fuse observations, join item
/// metadata, aggregate share of voice per tier, and emit the report.
///
/// Without `--output` the text rendering always prints; with it, the report
/// is written as JSON and `--text` additionally prints the rendering.
///
/// # Errors
///
/// Returns an error if a file cannot be read, parsed, or written.
pub(crate) fn run_sov(config: &AnalysisConfig, args: &SovArgs) -> anyhow::Result<()> {
    let observations: Vec<SearchObservation> = super::read_json(args.observations)?;
    let fused = fuse(&observations, config.rrf_k);
    if fused.is_empty() {
        println!(
            "no observations for '{}'; nothing to aggregate",
            args.keyword
        );
        return Ok(());
    }

    let raw_items: Vec<serde_json::Value> = super::read_json(args.items)?;
    let mut metas = Vec::new();
    let mut skipped = 0usize;
    for value in &raw_items {
        match ItemMeta::from_value(value) {
            Some(meta) => metas.push(meta),
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        eprintln!("warning: {skipped} item rows had no usable id and were skipped");
    }

    let catalog = super::build_catalog(config, args.synonyms)?;
    let ranked = join_rankings(&fused, &metas, &catalog);
    let tiers = aggregate(&ranked, args.keyword, args.method, &Tier::ALL);
    let report = SovReport::new(args.keyword, args.method, tiers);

    if let Some(path) = args.output {
        super::write_json(path, &report)?;
        println!("wrote SOV report to {}", path.display());
    }
    if args.text || args.output.is_none() {
        print!("{report}");
    }

    Ok(())
}
