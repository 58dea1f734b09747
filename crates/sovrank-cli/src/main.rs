use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sovrank_core::SovMethod;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "sovrank")]
#[command(about = "Share-of-voice analytics over multi-account search rankings")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fuse per-account search observations into one ranked list
    Fuse {
        /// JSON file holding an array of search observations
        #[arg(long)]
        input: PathBuf,
        /// Write the fused ranking as JSON instead of printing a table
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Compute share-of-voice tiers for one keyword
    Sov {
        /// JSON file holding an array of search observations
        #[arg(long)]
        observations: PathBuf,
        /// JSON file holding an array of item metadata objects
        #[arg(long)]
        items: PathBuf,
        /// Keyword the observations were collected for
        #[arg(long)]
        keyword: String,
        /// Aggregation method: simple, weighted, or engagement
        #[arg(long, default_value = "simple")]
        method: SovMethod,
        /// YAML synonym catalog merged over the built-in seeds
        #[arg(long)]
        synonyms: Option<PathBuf>,
        /// Write the full report as JSON to this path
        #[arg(long)]
        output: Option<PathBuf>,
        /// Render the report as text to stdout
        #[arg(long)]
        text: bool,
    },
    /// Extract structured annotation records from raw model responses
    Extract {
        /// JSON file holding an array of `{item_id, response}` rows
        #[arg(long)]
        input: PathBuf,
        /// Where to write extracted records and the failure summary
        #[arg(long)]
        output: PathBuf,
    },
    /// Print canonical forms for brand names
    Normalize {
        /// YAML synonym catalog merged over the built-in seeds
        #[arg(long)]
        synonyms: Option<PathBuf>,
        /// Brand names to canonicalize
        #[arg(required = true)]
        names: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = sovrank_core::load_analysis_config()?;

    match cli.command {
        Commands::Fuse { input, output } => {
            commands::run_fuse(&config, &input, output.as_deref())
        }
        Commands::Sov {
            observations,
            items,
            keyword,
            method,
            synonyms,
            output,
            text,
        } => commands::run_sov(
            &config,
            &commands::SovArgs {
                observations: &observations,
                items: &items,
                keyword: &keyword,
                method,
                synonyms: synonyms.as_deref(),
                output: output.as_deref(),
                text,
            },
        ),
        Commands::Extract { input, output } => commands::run_extract(&input, &output),
        Commands::Normalize { synonyms, names } => {
            commands::run_normalize(&config, synonyms.as_deref(), &names)
        }
    }
}
