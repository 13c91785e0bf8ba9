//! Lightweight keyword analysis: search intent and difficulty profiling.

use serde::Serialize;

/// Marker words for informational queries.
const INFORMATIONAL_MARKERS: [&str; 8] =
    ["what", "how", "why", "when", "where", "guide", "tutorial", "tips"];

/// Marker words for commercial-investigation queries.
const COMMERCIAL_MARKERS: [&str; 6] = ["best", "top", "review", "compare", "vs", "alternative"];

/// Marker words for transactional queries.
const TRANSACTIONAL_MARKERS: [&str; 7] =
    ["buy", "purchase", "order", "price", "cost", "cheap", "discount"];

/// Marker phrases for navigational queries.
const NAVIGATIONAL_MARKERS: [&str; 5] = ["login", "sign in", "website", "official", "homepage"];

/// The search intent behind a keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchIntent {
    Informational,
    Commercial,
    Transactional,
    Navigational,
}

impl SearchIntent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Informational => "informational",
            Self::Commercial => "commercial",
            Self::Transactional => "transactional",
            Self::Navigational => "navigational",
        }
    }
}

impl std::fmt::Display for SearchIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify the search intent of a keyword by marker-word matching.
/// Checks informational, commercial, transactional, navigational in that
/// order; unmatched keywords default to informational.
pub fn classify_intent(keyword: &str) -> SearchIntent {
    let keyword = keyword.to_lowercase();

    if INFORMATIONAL_MARKERS.iter().any(|m| keyword.contains(m)) {
        return SearchIntent::Informational;
    }
    if COMMERCIAL_MARKERS.iter().any(|m| keyword.contains(m)) {
        return SearchIntent::Commercial;
    }
    if TRANSACTIONAL_MARKERS.iter().any(|m| keyword.contains(m)) {
        return SearchIntent::Transactional;
    }
    if NAVIGATIONAL_MARKERS.iter().any(|m| keyword.contains(m)) {
        return SearchIntent::Navigational;
    }
    SearchIntent::Informational
}

/// Head vs. long-tail classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeywordTail {
    ShortTail,
    LongTail,
}

impl KeywordTail {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ShortTail => "short-tail",
            Self::LongTail => "long-tail",
        }
    }
}

/// Basic competitiveness profile for one keyword.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DifficultyProfile {
    /// The keyword the profile describes.
    pub keyword: String,
    /// Number of words.
    pub word_count: usize,
    /// Number of characters.
    pub character_count: usize,
    /// Heuristic difficulty score in [0, 100]; higher is more competitive.
    pub difficulty_score: u32,
    /// Short-tail (head) or long-tail.
    pub tail: KeywordTail,
}

/// Profile a keyword's expected competitiveness.
///
/// Single words are the most contested, long-tail phrases the least; very
/// short strings add difficulty, very long ones subtract a little.
pub fn difficulty_profile(keyword: &str) -> DifficultyProfile {
    let word_count = keyword.split_whitespace().count();
    let character_count = keyword.chars().count();

    let mut score: i32 = match word_count {
        1 => 30,
        2 => 20,
        _ => 10,
    };
    if character_count < 10 {
        score += 20;
    } else if character_count > 30 {
        score -= 10;
    }

    DifficultyProfile {
        keyword: keyword.to_string(),
        word_count,
        character_count,
        difficulty_score: score.clamp(0, 100) as u32,
        tail: if word_count <= 2 {
            KeywordTail::ShortTail
        } else {
            KeywordTail::LongTail
        },
    }
}
