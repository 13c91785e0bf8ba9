//! Descriptive statistics over a keyword list.

use serde::Serialize;
use std::collections::BTreeMap;

/// Summary statistics for a keyword list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KeywordStats {
    /// Number of keywords.
    pub total_count: usize,
    /// Mean character length.
    pub avg_length: f64,
    /// Mean word count.
    pub avg_words: f64,
    /// Shortest keyword by character length (first on ties).
    pub shortest: String,
    /// Longest keyword by character length (first on ties).
    pub longest: String,
    /// Word count -> number of keywords with that many words.
    pub word_count_distribution: BTreeMap<usize, usize>,
}

/// Compute statistics for a keyword list.
///
/// An empty input yields the zero-valued record rather than an error.
pub fn compute_stats(keywords: &[String]) -> KeywordStats {
    if keywords.is_empty() {
        return KeywordStats::default();
    }

    let lengths: Vec<usize> = keywords.iter().map(|k| k.chars().count()).collect();
    let word_counts: Vec<usize> = keywords
        .iter()
        .map(|k| k.split_whitespace().count())
        .collect();

    let mut distribution = BTreeMap::new();
    for count in &word_counts {
        *distribution.entry(*count).or_insert(0) += 1;
    }

    // First keyword wins ties for both shortest and longest
    let mut shortest = (&keywords[0], lengths[0]);
    let mut longest = (&keywords[0], lengths[0]);
    for (keyword, &len) in keywords.iter().zip(&lengths).skip(1) {
        if len < shortest.1 {
            shortest = (keyword, len);
        }
        if len > longest.1 {
            longest = (keyword, len);
        }
    }

    KeywordStats {
        total_count: keywords.len(),
        avg_length: lengths.iter().sum::<usize>() as f64 / keywords.len() as f64,
        avg_words: word_counts.iter().sum::<usize>() as f64 / keywords.len() as f64,
        shortest: shortest.0.clone(),
        longest: longest.0.clone(),
        word_count_distribution: distribution,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keywords(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_input_yields_zero_record() {
        let stats = compute_stats(&[]);
        assert_eq!(stats, KeywordStats::default());
        assert_eq!(stats.total_count, 0);
        assert!(stats.word_count_distribution.is_empty());
    }

    #[test]
    fn basic_stats() {
        let stats = compute_stats(&keywords(&["seo", "content marketing", "link building tips"]));
        assert_eq!(stats.total_count, 3);
        assert_eq!(stats.shortest, "seo");
        assert_eq!(stats.longest, "link building tips");
        // 3 + 17 + 18 characters
        assert!((stats.avg_length - 38.0 / 3.0).abs() < 1e-9);
        assert!((stats.avg_words - 2.0).abs() < 1e-9);
        assert_eq!(stats.word_count_distribution.get(&1), Some(&1));
        assert_eq!(stats.word_count_distribution.get(&2), Some(&1));
        assert_eq!(stats.word_count_distribution.get(&3), Some(&1));
    }

    #[test]
    fn tie_keeps_first() {
        let stats = compute_stats(&keywords(&["abc", "xyz"]));
        assert_eq!(stats.shortest, "abc");
        assert_eq!(stats.longest, "abc");
    }
}
