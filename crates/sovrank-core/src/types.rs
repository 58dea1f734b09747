//! Shared data model for the SOV pipeline.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One account's sighting of an item in a keyword's search results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchObservation {
    /// Account that performed the search.
    pub source_account: String,
    /// Stable identifier of the observed item.
    pub item_id: String,
    /// 1-based position in that account's result list.
    pub observed_rank: u32,
}

/// Consensus ranking for one item after fusing per-account observations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusedRanking {
    pub item_id: String,
    /// Reciprocal-rank-fusion score; higher is better.
    pub fusion_score: f64,
    /// Dense 1-based position after sorting by score descending.
    pub final_rank: u32,
    /// Rank per account; accounts that never saw the item are absent.
    pub per_account_rank: BTreeMap<String, u32>,
}

/// A brand name as it appears in source text, before canonicalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandMention {
    pub surface_form: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
}

/// Three-valued sentiment scale used across the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

/// Labels recognized by [`Sentiment::from_label`], matched after lowercasing.
/// Mirrors the upstream annotator's vocabulary (English and Chinese).
const SENTIMENT_LABELS: &[(&str, Sentiment)] = &[
    ("positive", Sentiment::Positive),
    ("正向", Sentiment::Positive),
    ("积极", Sentiment::Positive),
    ("正面", Sentiment::Positive),
    ("好", Sentiment::Positive),
    ("推荐", Sentiment::Positive),
    ("negative", Sentiment::Negative),
    ("负向", Sentiment::Negative),
    ("消极", Sentiment::Negative),
    ("负面", Sentiment::Negative),
    ("差", Sentiment::Negative),
    ("不推荐", Sentiment::Negative),
    ("neutral", Sentiment::Neutral),
    ("中立", Sentiment::Neutral),
    ("中性", Sentiment::Neutral),
    ("一般", Sentiment::Neutral),
    ("普通", Sentiment::Neutral),
    ("客观", Sentiment::Neutral),
];

impl Sentiment {
    /// Map a free-text sentiment label onto the fixed three-value scale.
    ///
    /// Unrecognized labels read as [`Sentiment::Neutral`].
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        let lower = label.trim().to_lowercase();
        for &(known, sentiment) in SENTIMENT_LABELS {
            if lower == known {
                return sentiment;
            }
        }
        Sentiment::Neutral
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sentiment::Positive => write!(f, "positive"),
            Sentiment::Negative => write!(f, "negative"),
            Sentiment::Neutral => write!(f, "neutral"),
        }
    }
}

/// Result-depth window over which SOV is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Top20,
    Top50,
    Top100,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Top20, Tier::Top50, Tier::Top100];

    /// Maximum `final_rank` admitted into this window.
    #[must_use]
    pub fn limit(self) -> u32 {
        match self {
            Tier::Top20 => 20,
            Tier::Top50 => 50,
            Tier::Top100 => 100,
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Top20 => write!(f, "top20"),
            Tier::Top50 => write!(f, "top50"),
            Tier::Top100 => write!(f, "top100"),
        }
    }
}

/// How a brand's voice share is weighted within a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SovMethod {
    Simple,
    Weighted,
    Engagement,
}

impl std::fmt::Display for SovMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SovMethod::Simple => write!(f, "simple"),
            SovMethod::Weighted => write!(f, "weighted"),
            SovMethod::Engagement => write!(f, "engagement"),
        }
    }
}

impl std::str::FromStr for SovMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "simple" => Ok(SovMethod::Simple),
            "weighted" => Ok(SovMethod::Weighted),
            "engagement" => Ok(SovMethod::Engagement),
            _ => Err(format!(
                "unknown SOV method '{s}'; expected simple, weighted, or engagement"
            )),
        }
    }
}
