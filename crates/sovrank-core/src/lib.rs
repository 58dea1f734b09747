//! Shared domain model for the sovrank SOV pipeline.
//!
//! Holds the typed records that flow between the fusion, metrics, and
//! extraction crates, the brand synonym catalog that canonicalizes mention
//! spellings, and the tunable analysis constants.

pub mod catalog;
pub mod config;
pub mod types;

pub use catalog::{load_synonyms, BrandCatalog, CatalogError, SynonymEntry, SynonymsFile};
pub use config::{
    load_analysis_config, AnalysisConfig, ConfigError, DEFAULT_FUZZY_THRESHOLD, DEFAULT_RRF_K,
};
pub use types::{BrandMention, FusedRanking, SearchObservation, Sentiment, SovMethod, Tier};
