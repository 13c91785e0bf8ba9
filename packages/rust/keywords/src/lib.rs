//! Keyword normalization, statistics, and analysis.
//!
//! This crate turns raw pasted text or CSV content into a deduplicated,
//! validated list of normalized keyword strings, and provides descriptive
//! statistics and lightweight intent/difficulty analysis over keyword lists.
//! Everything here is pure computation: no I/O, no errors surfaced for bad
//! user input (bad input yields empty output plus a log line).

pub mod analysis;
pub mod normalizer;
pub mod stats;

pub use analysis::{
    DifficultyProfile, KeywordTail, SearchIntent, classify_intent, difficulty_profile,
};
pub use normalizer::{
    clean, deduplicate, filter_similar, is_valid, jaccard_similarity, parse, parse_csv,
};
pub use stats::{KeywordStats, compute_stats};
