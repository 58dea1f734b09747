//! Consensus ranking across search accounts.
//!
//! Different accounts searching the same keyword see the same items at
//! different positions. This crate merges those per-account observations
//! into one ranking with reciprocal rank fusion, so downstream share-of-voice
//! metrics operate on a single agreed-upon item order.

pub mod rrf;

pub use rrf::{account_universe, fuse};
