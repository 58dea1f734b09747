//! Tiered share-of-voice aggregation over fused, brand-annotated items.
//!
//! Each item explodes into one row per canonical brand it mentions. Rows are
//! filtered per result-depth tier, and a brand's share is its portion of the
//! tier's total row weight. The three methods share that skeleton and differ
//! only in the weight: `simple` counts rows, `weighted` discounts by rank,
//! `engagement` weighs by interaction counts.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use sovrank_core::{SovMethod, Tier};

use crate::dataset::RankedItem;

/// Method-specific fields reported alongside a brand's share.
///
/// Serialized untagged and flattened into [`SovRecord`], so a simple record
/// carries no extra keys while weighted and engagement records add theirs.
/// Variant order matters for deserialization: the richest shape must be
/// tried first, or an engagement record would match the weighted variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MethodStats {
    Engagement {
        total_engagement: u64,
        avg_engagement_per_mention: f64,
        avg_rank: f64,
    },
    Weighted {
        weighted_score: f64,
        avg_rank: f64,
    },
    Simple {},
}

/// One brand's share of voice within a (keyword, tier, method) group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SovRecord {
    pub keyword: String,
    pub tier: Tier,
    pub method: SovMethod,
    /// Dense 1-based position by descending `sov_percentage`.
    pub rank: u32,
    pub brand: String,
    pub sov_percentage: f64,
    pub mention_count: usize,
    #[serde(flatten)]
    pub stats: MethodStats,
}

/// Aggregation output for one tier.
///
/// `records` is empty when no row qualified for the tier, or when the
/// engagement method found only zero-engagement rows; `total_rows` and
/// `unique_brands` still describe what the tier contained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierBreakdown {
    pub total_rows: usize,
    pub unique_brands: usize,
    pub records: Vec<SovRecord>,
}

/// How concentrated a tier's voice is among its leading brands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Concentration {
    pub top3_share: f64,
    pub top5_share: f64,
    pub level: ConcentrationLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConcentrationLevel {
    High,
    Medium,
    Fragmented,
}

impl std::fmt::Display for ConcentrationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Fragmented => write!(f, "fragmented"),
        }
    }
}

/// One exploded (brand, item) row. Every brand an item mentions gets a row
/// carrying that item's rank and engagement.
struct Row<'a> {
    brand: &'a str,
    final_rank: u32,
    engagement: u64,
}

struct BrandAccum<'a> {
    brand: &'a str,
    mention_count: usize,
    weight_sum: f64,
    rank_sum: u64,
    engagement_sum: u64,
}

/// Computes share-of-voice records per tier for one keyword and method.
///
/// Items with no resolved brands contribute nothing. Every requested tier is
/// present in the result, with an empty `records` list when nothing
/// qualified; within a tier, record percentages sum to 100 and ranks run
/// densely from 1.
#[must_use]
pub fn aggregate(
    items: &[RankedItem],
    keyword: &str,
    method: SovMethod,
    tiers: &[Tier],
) -> BTreeMap<Tier, TierBreakdown> {
    let rows = explode(items);
    let mut breakdowns = BTreeMap::new();
    for &tier in tiers {
        let in_tier: Vec<&Row<'_>> = rows
            .iter()
            .filter(|row| row.final_rank <= tier.limit())
            .collect();
        breakdowns.insert(tier, tier_breakdown(&in_tier, keyword, method, tier));
    }
    breakdowns
}

/// Sums the leading shares of a sorted record list and classifies the tier.
///
/// Expects records as produced by [`aggregate`], sorted by descending share.
/// The classification looks at the top-3 share alone: above 60 is `high`,
/// above 40 is `medium`, anything else is `fragmented`.
#[must_use]
pub fn market_concentration(records: &[SovRecord]) -> Concentration {
    let top3_share: f64 = records.iter().take(3).map(|r| r.sov_percentage).sum();
    let top5_share: f64 = records.iter().take(5).map(|r| r.sov_percentage).sum();
    let level = if top3_share > 60.0 {
        ConcentrationLevel::High
    } else if top3_share > 40.0 {
        ConcentrationLevel::Medium
    } else {
        ConcentrationLevel::Fragmented
    };
    Concentration {
        top3_share,
        top5_share,
        level,
    }
}

fn explode(items: &[RankedItem]) -> Vec<Row<'_>> {
    let mut rows = Vec::new();
    for item in items {
        for brand in &item.brands {
            rows.push(Row {
                brand,
                final_rank: item.final_rank,
                engagement: item.engagement.total(),
            });
        }
    }
    rows
}

fn tier_breakdown(
    rows: &[&Row<'_>],
    keyword: &str,
    method: SovMethod,
    tier: Tier,
) -> TierBreakdown {
    let mut accums: Vec<BrandAccum<'_>> = Vec::new();
    let mut by_brand: HashMap<&str, usize> = HashMap::new();

    for row in rows {
        let idx = match by_brand.get(row.brand) {
            Some(&idx) => idx,
            None => {
                accums.push(BrandAccum {
                    brand: row.brand,
                    mention_count: 0,
                    weight_sum: 0.0,
                    rank_sum: 0,
                    engagement_sum: 0,
                });
                by_brand.insert(row.brand, accums.len() - 1);
                accums.len() - 1
            }
        };
        let acc = &mut accums[idx];
        acc.mention_count += 1;
        acc.weight_sum += row_weight(method, row);
        acc.rank_sum += u64::from(row.final_rank);
        acc.engagement_sum = acc.engagement_sum.saturating_add(row.engagement);
    }

    TierBreakdown {
        total_rows: rows.len(),
        unique_brands: accums.len(),
        records: build_records(&accums, keyword, method, tier),
    }
}

#[allow(clippy::cast_precision_loss)]
fn row_weight(method: SovMethod, row: &Row<'_>) -> f64 {
    match method {
        SovMethod::Simple => 1.0,
        SovMethod::Weighted => 1.0 / (f64::from(row.final_rank) + 1.0),
        SovMethod::Engagement => row.engagement as f64,
    }
}

#[allow(clippy::cast_precision_loss)]
fn build_records(
    accums: &[BrandAccum<'_>],
    keyword: &str,
    method: SovMethod,
    tier: Tier,
) -> Vec<SovRecord> {
    if accums.is_empty() {
        return Vec::new();
    }

    let total_weight: f64 = accums.iter().map(|acc| acc.weight_sum).sum();
    if total_weight <= 0.0 {
        // Only reachable for the engagement method: rows existed but every
        // one carried zero engagement, so shares would be 0/0.
        tracing::warn!(
            keyword,
            method = %method,
            tier = %tier,
            rows = accums.iter().map(|acc| acc.mention_count).sum::<usize>(),
            "tier has rows but zero total weight; emitting no records"
        );
        return Vec::new();
    }

    let mut records: Vec<SovRecord> = accums
        .iter()
        .map(|acc| {
            let mentions = acc.mention_count as f64;
            let avg_rank = acc.rank_sum as f64 / mentions;
            let stats = match method {
                SovMethod::Simple => MethodStats::Simple {},
                SovMethod::Weighted => MethodStats::Weighted {
                    weighted_score: acc.weight_sum,
                    avg_rank,
                },
                SovMethod::Engagement => MethodStats::Engagement {
                    total_engagement: acc.engagement_sum,
                    avg_engagement_per_mention: acc.engagement_sum as f64 / mentions,
                    avg_rank,
                },
            };
            SovRecord {
                keyword: keyword.to_string(),
                tier,
                method,
                rank: 0,
                brand: acc.brand.to_string(),
                sov_percentage: 100.0 * acc.weight_sum / total_weight,
                mention_count: acc.mention_count,
                stats,
            }
        })
        .collect();

    // Stable sort, so brands tied on share keep first-seen order.
    records.sort_by(|a, b| b.sov_percentage.total_cmp(&a.sov_percentage));
    for (rank, record) in (1..).zip(records.iter_mut()) {
        record.rank = rank;
    }
    records
}
