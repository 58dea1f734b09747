//! Assembled share-of-voice reports and their text rendering.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sovrank_core::{SovMethod, Tier};

use crate::aggregate::{market_concentration, MethodStats, TierBreakdown};

const BRAND_COLUMN: usize = 24;

/// One keyword's share-of-voice result across all requested tiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SovReport {
    pub keyword: String,
    pub method: SovMethod,
    pub generated_at: DateTime<Utc>,
    pub tiers: BTreeMap<Tier, TierBreakdown>,
}

impl SovReport {
    #[must_use]
    pub fn new(keyword: &str, method: SovMethod, tiers: BTreeMap<Tier, TierBreakdown>) -> Self {
        Self {
            keyword: keyword.to_string(),
            method,
            generated_at: Utc::now(),
            tiers,
        }
    }

    /// Renders the report as plain text with one table per tier.
    #[must_use]
    pub fn render_text(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for SovReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "# Share of Voice: {}", self.keyword)?;
        writeln!(f)?;
        writeln!(
            f,
            "**Generated**: {}",
            self.generated_at.format("%Y-%m-%d %H:%M UTC")
        )?;
        writeln!(f, "**Method**: {}", self.method)?;
        writeln!(f)?;
        writeln!(f, "---")?;

        for (tier, breakdown) in &self.tiers {
            writeln!(f)?;
            writeln!(f, "## Top {}", tier.limit())?;
            writeln!(f)?;

            if breakdown.records.is_empty() {
                writeln!(f, "no qualifying rows for this tier")?;
                continue;
            }

            write!(
                f,
                "{:<6}{:<width$}{:>8}{:>10}",
                "RANK",
                "BRAND",
                "SOV%",
                "MENTIONS",
                width = BRAND_COLUMN
            )?;
            match self.method {
                SovMethod::Simple => {}
                SovMethod::Weighted => write!(f, "{:>10}", "AVG RANK")?,
                SovMethod::Engagement => write!(f, "{:>12}{:>10}", "ENGAGEMENT", "AVG RANK")?,
            }
            writeln!(f)?;

            for record in &breakdown.records {
                let brand = if record.brand.chars().count() > BRAND_COLUMN {
                    let prefix: String = record.brand.chars().take(BRAND_COLUMN - 3).collect();
                    format!("{prefix}...")
                } else {
                    record.brand.clone()
                };
                write!(
                    f,
                    "{:<6}{:<width$}{:>8.2}{:>10}",
                    record.rank,
                    brand,
                    record.sov_percentage,
                    record.mention_count,
                    width = BRAND_COLUMN
                )?;
                match &record.stats {
                    MethodStats::Simple {} => {}
                    MethodStats::Weighted { avg_rank, .. } => write!(f, "{avg_rank:>10.1}")?,
                    MethodStats::Engagement {
                        total_engagement,
                        avg_rank,
                        ..
                    } => write!(f, "{total_engagement:>12}{avg_rank:>10.1}")?,
                }
                writeln!(f)?;
            }

            let concentration = market_concentration(&breakdown.records);
            writeln!(f)?;
            writeln!(
                f,
                "Concentration: {} (top3 {:.2}%, top5 {:.2}%)",
                concentration.level, concentration.top3_share, concentration.top5_share
            )?;
        }

        Ok(())
    }
}
