//! Boundary types for item metadata arriving from exports and crawl dumps.
//!
//! Metadata rows come from sources we do not control. Brand lists may arrive
//! double-encoded as a JSON string, engagement counts may be strings or
//! floats, and fields go missing. Every field is coerced on the way in so a
//! malformed value degrades to empty or zero instead of failing the row.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use sovrank_core::{BrandCatalog, FusedRanking};

/// Engagement counters for one item, summed across interaction kinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engagement {
    #[serde(default)]
    pub liked_count: u64,
    #[serde(default)]
    pub collected_count: u64,
    #[serde(default)]
    pub comment_count: u64,
    #[serde(default)]
    pub share_count: u64,
}

impl Engagement {
    /// Total engagement weight for share-of-voice purposes, saturating at
    /// `u64::MAX`.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.liked_count
            .saturating_add(self.collected_count)
            .saturating_add(self.comment_count)
            .saturating_add(self.share_count)
    }

    fn from_record(record: &serde_json::Map<String, Value>) -> Self {
        Self {
            liked_count: count_field(record, "liked_count"),
            collected_count: count_field(record, "collected_count"),
            comment_count: count_field(record, "comment_count"),
            share_count: count_field(record, "share_count"),
        }
    }
}

/// Per-item metadata as parsed from an export row: the raw brand surface
/// forms and engagement counters keyed by the item id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemMeta {
    pub item_id: String,
    pub brands: Vec<String>,
    pub engagement: Engagement,
}

impl ItemMeta {
    /// Parses one export row, coercing each field leniently.
    ///
    /// Returns `None` when the row is not an object or carries no usable id
    /// (`item_id`, `note_id`, or `id`). Everything else degrades per field:
    /// an unreadable brand list becomes empty, an unreadable count becomes 0.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        let record = value.as_object()?;
        let item_id = ["item_id", "note_id", "id"]
            .iter()
            .find_map(|key| record.get(*key).and_then(scalar_string))?;

        let brands = record.get("brand_list").map(string_list).unwrap_or_default();
        let engagement = Engagement::from_record(record);

        Some(Self {
            item_id,
            brands,
            engagement,
        })
    }
}

/// One fused item ready for aggregation: consensus rank, canonical brand
/// names, and engagement counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedItem {
    pub item_id: String,
    pub final_rank: u32,
    pub brands: Vec<String>,
    pub engagement: Engagement,
}

/// Joins fused rankings with item metadata and canonicalizes brand names.
///
/// Items without a metadata row keep their rank but carry no brands, which
/// excludes them from every share-of-voice method downstream. When the same
/// item id appears twice in `meta`, the first row wins.
#[must_use]
pub fn join_rankings(
    fused: &[FusedRanking],
    meta: &[ItemMeta],
    catalog: &BrandCatalog,
) -> Vec<RankedItem> {
    let mut by_id: HashMap<&str, &ItemMeta> = HashMap::new();
    for row in meta {
        if let Some(first) = by_id.get(row.item_id.as_str()) {
            tracing::warn!(
                item = %row.item_id,
                kept_brands = first.brands.len(),
                "duplicate metadata row for item; keeping the first"
            );
        } else {
            by_id.insert(row.item_id.as_str(), row);
        }
    }

    let mut items = Vec::with_capacity(fused.len());
    let mut without_meta = 0usize;
    for ranking in fused {
        let (brands, engagement) = match by_id.get(ranking.item_id.as_str()) {
            Some(row) => (catalog.normalize_list(&row.brands), row.engagement),
            None => {
                without_meta += 1;
                (Vec::new(), Engagement::default())
            }
        };
        items.push(RankedItem {
            item_id: ranking.item_id.clone(),
            final_rank: ranking.final_rank,
            brands,
            engagement,
        });
    }

    tracing::debug!(
        items = items.len(),
        without_meta,
        "joined fused rankings with item metadata"
    );
    items
}

/// Coerces a brand-list field into owned strings.
///
/// Accepts a JSON array of scalars, a bare string, or a string containing a
/// JSON-encoded array, including the case where that encoding was applied
/// twice (a common export artifact). Anything else yields an empty list.
fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(scalar_string).collect(),
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Vec::new();
            }
            if trimmed.starts_with('[') {
                if let Ok(inner) = serde_json::from_str::<Value>(trimmed) {
                    if inner.is_array() {
                        return string_list(&inner);
                    }
                }
            }
            // A leading quote is the double-encoded artifact: decode the
            // outer string, then parse the array it holds.
            if trimmed.starts_with('"') {
                if let Ok(Value::String(inner)) = serde_json::from_str::<Value>(trimmed) {
                    if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(&inner) {
                        return items.iter().filter_map(scalar_string).collect();
                    }
                    tracing::warn!(
                        content = %inner,
                        "double-encoded brand list does not hold a JSON array; dropping it"
                    );
                    return Vec::new();
                }
            }
            vec![trimmed.to_string()]
        }
        _ => Vec::new(),
    }
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn count_field(record: &serde_json::Map<String, Value>, key: &str) -> u64 {
    record.get(key).map_or(0, count_value)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn count_value(value: &Value) -> u64 {
    match value {
        Value::Number(number) => number
            .as_u64()
            .or_else(|| number.as_f64().filter(|f| *f > 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Value::String(text) => {
            let trimmed = text.trim();
            trimmed
                .parse::<u64>()
                .ok()
                .or_else(|| {
                    trimmed
                        .parse::<f64>()
                        .ok()
                        .filter(|f| *f > 0.0)
                        .map(|f| f as u64)
                })
                .unwrap_or(0)
        }
        _ => 0,
    }
}
