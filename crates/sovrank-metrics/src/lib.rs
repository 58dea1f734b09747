//! Share-of-voice metrics over fused rankings.
//!
//! Takes the consensus ranking produced by `sovrank-fusion`, joins it with
//! per-item brand and engagement metadata, and computes tiered brand share
//! tables under three weighting methods, plus a rendered report.

pub mod aggregate;
pub mod dataset;
pub mod report;

pub use aggregate::{
    aggregate, market_concentration, Concentration, ConcentrationLevel, MethodStats, SovRecord,
    TierBreakdown,
};
pub use dataset::{join_rankings, Engagement, ItemMeta, RankedItem};
pub use report::SovReport;
