//! Keyword parsing, cleaning, and normalization.
//!
//! Raw user input is noisy by nature, so nothing in this module returns an
//! error: malformed input yields an empty list and a log line, never a
//! failure the caller has to handle.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::{debug, warn};

use keywordforge_shared::{MAX_KEYWORD_LEN, MIN_KEYWORD_LEN};

/// Delimiters applied successively when splitting pasted text. Each pass
/// re-splits every fragment from the previous pass, so mixed separators
/// ("a, b\nc; d") all work.
const DELIMITERS: [char; 4] = [',', '\n', ';', '\t'];

/// Tokens rejected when they make up the entire keyword.
static STOP_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    HashSet::from([
        "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "in", "is",
        "it", "its", "of", "on", "that", "the", "to", "was", "will", "with",
    ])
});

// ---------------------------------------------------------------------------
// Regex patterns (compiled once)
// ---------------------------------------------------------------------------

/// Collapses runs of whitespace to a single space.
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s+").expect("whitespace regex")
});

/// Matches every character that is not a word character, whitespace, or hyphen.
static SPECIAL_CHARS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^\w\s-]").expect("special chars regex")
});

/// Matches at least one ASCII letter anywhere in the keyword.
static HAS_LETTER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Z]").expect("letter regex")
});

/// Matches keywords that are nothing but punctuation.
static PURE_PUNCT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\w\s]+$").expect("punctuation regex")
});

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse keywords from pasted text.
///
/// Splits on comma, newline, semicolon, and tab, cleans and validates each
/// fragment, and deduplicates while preserving first-seen order.
pub fn parse(text: &str) -> Vec<String> {
    let mut fragments: Vec<&str> = vec![text];
    for delimiter in DELIMITERS {
        fragments = fragments
            .into_iter()
            .flat_map(|fragment| fragment.split(delimiter))
            .collect();
    }

    let mut seen = HashSet::new();
    let mut keywords = Vec::new();
    for fragment in fragments {
        let cleaned = clean(fragment);
        if is_valid(&cleaned) && seen.insert(cleaned.clone()) {
            keywords.push(cleaned);
        }
    }

    if keywords.is_empty() && !text.trim().is_empty() {
        debug!(input_len = text.len(), "no valid keywords found in text input");
    }
    keywords
}

/// Parse keywords from CSV content.
///
/// Sniffs the first 1 KB for a header row and skips it when found. Per data
/// row, picks the first cell that is non-empty, longer than one character,
/// and not purely numeric, falling back to the first non-empty cell. The
/// selected cell then goes through the same clean/validate/dedup path as
/// [`parse`].
pub fn parse_csv(content: &str) -> Vec<String> {
    let sample_len = content.len().min(1024);
    let has_header = sniff_header(&content[..sample_len]);

    let mut seen = HashSet::new();
    let mut keywords = Vec::new();
    for (index, line) in content.lines().enumerate() {
        if index == 0 && has_header {
            continue;
        }
        if line.trim().is_empty() {
            continue;
        }

        let row = split_csv_row(line);
        let Some(cell) = extract_keyword_cell(&row) else {
            continue;
        };
        let cleaned = clean(&cell);
        if is_valid(&cleaned) && seen.insert(cleaned.clone()) {
            keywords.push(cleaned);
        }
    }

    if keywords.is_empty() && !content.trim().is_empty() {
        warn!(content_len = content.len(), "no valid keywords found in CSV input");
    }
    keywords
}

/// Decide whether the first row of the sample looks like a header.
///
/// A column votes for a header when its data cells are consistently numeric
/// (or consistently one length) and the first-row cell breaks that pattern;
/// otherwise it votes against. Same spirit as the classic CSV sniffer.
fn sniff_header(sample: &str) -> bool {
    let rows: Vec<Vec<String>> = sample
        .lines()
        .filter(|line| !line.trim().is_empty())
        .take(8)
        .map(split_csv_row)
        .collect();
    if rows.len() < 2 {
        return false;
    }

    let first = &rows[0];
    let data = &rows[1..];
    let mut votes = 0i32;

    for (col, header_cell) in first.iter().enumerate() {
        let cells: Vec<&str> = data
            .iter()
            .filter_map(|row| row.get(col))
            .map(String::as_str)
            .collect();
        if cells.is_empty() {
            continue;
        }

        if cells.iter().all(|c| is_numeric_like(c)) {
            votes += if is_numeric_like(header_cell) { -1 } else { 1 };
            continue;
        }

        let len = cells[0].len();
        if cells.iter().all(|c| c.len() == len) {
            votes += if header_cell.len() == len { -1 } else { 1 };
        } else {
            votes -= 1;
        }
    }

    votes > 0
}

/// Split one CSV line into cells, honoring double-quoted fields.
fn split_csv_row(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                // Escaped quote inside a quoted field
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                cells.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    cells.push(current);
    cells
}

/// Pick the most keyword-like cell from a CSV row.
fn extract_keyword_cell(row: &[String]) -> Option<String> {
    if row.is_empty() {
        return None;
    }
    if row.len() == 1 {
        let cell = row[0].trim();
        return (!cell.is_empty()).then(|| cell.to_string());
    }

    for cell in row {
        let cell = cell.trim();
        if !cell.is_empty() && cell.len() > 1 && !is_numeric(cell) {
            return Some(cell.to_string());
        }
    }

    // Fallback to first non-empty cell
    row.iter()
        .map(|cell| cell.trim())
        .find(|cell| !cell.is_empty())
        .map(str::to_string)
}

fn is_numeric(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// Numeric in the sniffer's sense: anything that parses as a float
/// ("1000", "2.5", "-3").
fn is_numeric_like(s: &str) -> bool {
    !s.trim().is_empty() && s.trim().parse::<f64>().is_ok()
}

// ---------------------------------------------------------------------------
// Cleaning and validation
// ---------------------------------------------------------------------------

/// Clean and normalize one keyword.
///
/// Lowercases, strips everything except word characters, whitespace, and
/// hyphens, collapses internal whitespace, then removes edge hyphens.
/// Idempotent: cleaning an already-clean keyword is a no-op.
pub fn clean(keyword: &str) -> String {
    if keyword.is_empty() {
        return String::new();
    }

    let keyword = keyword.to_lowercase();
    let keyword = keyword.trim();
    // Strip before collapsing: a punctuation token between spaces must not
    // leave a double space behind.
    let keyword = SPECIAL_CHARS_RE.replace_all(keyword, "");
    let keyword = WHITESPACE_RE.replace_all(&keyword, " ");
    keyword.trim_matches('-').trim().to_string()
}

/// Whether a cleaned keyword is worth keeping.
pub fn is_valid(keyword: &str) -> bool {
    if keyword.is_empty() {
        return false;
    }
    let char_count = keyword.chars().count();
    if char_count < MIN_KEYWORD_LEN || char_count > MAX_KEYWORD_LEN {
        return false;
    }
    if !HAS_LETTER_RE.is_match(keyword) {
        return false;
    }
    if is_numeric(keyword) {
        return false;
    }
    if STOP_WORDS.contains(keyword) {
        return false;
    }
    if PURE_PUNCT_RE.is_match(keyword) {
        return false;
    }
    true
}

// ---------------------------------------------------------------------------
// Deduplication and similarity filtering
// ---------------------------------------------------------------------------

/// Remove duplicates case-insensitively, keeping the first original casing.
pub fn deduplicate(keywords: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut deduplicated = Vec::new();

    for keyword in keywords {
        let normalized = keyword.trim().to_lowercase();
        if seen.insert(normalized) {
            deduplicated.push(keyword.clone());
        }
    }
    deduplicated
}

/// Drop near-duplicate keywords.
///
/// Greedy pass: each keyword is compared against the already-accepted list
/// with Jaccard similarity over lowercase word sets. Above the threshold the
/// shorter string wins, replacing a longer previously-accepted one.
pub fn filter_similar(keywords: &[String], threshold: f64) -> Vec<String> {
    let mut filtered: Vec<String> = Vec::new();

    for keyword in keywords {
        let mut is_similar = false;

        for i in 0..filtered.len() {
            if jaccard_similarity(keyword, &filtered[i]) > threshold {
                if keyword.len() < filtered[i].len() {
                    filtered.remove(i);
                    filtered.push(keyword.clone());
                }
                is_similar = true;
                break;
            }
        }

        if !is_similar {
            filtered.push(keyword.clone());
        }
    }
    filtered
}

/// Jaccard similarity over the two keywords' lowercase word sets.
pub fn jaccard_similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let words_a: HashSet<String> = a.to_lowercase().split_whitespace().map(String::from).collect();
    let words_b: HashSet<String> = b.to_lowercase().split_whitespace().map(String::from).collect();
    if words_a.is_empty() || words_b.is_empty() {
        return 0.0;
    }

    let intersection = words_a.intersection(&words_b).count();
    let union = words_a.union(&words_b).count();
    intersection as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_splits_on_all_delimiters() {
        let keywords = parse("seo tools, keyword research\ncontent marketing; link building\tbacklinks");
        assert_eq!(
            keywords,
            vec![
                "seo tools",
                "keyword research",
                "content marketing",
                "link building",
                "backlinks"
            ]
        );
    }

    #[test]
    fn parse_deduplicates_preserving_order() {
        let keywords = parse("alpha marketing, beta tools, beta tools, gamma seo");
        assert_eq!(keywords, vec!["alpha marketing", "beta tools", "gamma seo"]);
    }

    #[test]
    fn parse_empty_and_whitespace_input() {
        assert!(parse("").is_empty());
        assert!(parse("   \n\t  ").is_empty());
        assert!(parse(",,,;;;").is_empty());
    }

    #[test]
    fn parse_rejects_invalid_fragments() {
        // Stop word, pure number, single char, too long
        let long = "x".repeat(101);
        let input = format!("the, 12345, a, {long}, valid keyword");
        assert_eq!(parse(&input), vec!["valid keyword"]);
    }

    #[test]
    fn clean_normalizes_messy_input() {
        assert_eq!(clean("  SEO Optimization!!!  "), "seo optimization");
        assert_eq!(clean("Content   Marketing"), "content marketing");
        assert_eq!(clean("-lead-gen-"), "lead-gen");
        assert_eq!(clean("email@marketing"), "emailmarketing");
        assert_eq!(clean(" - "), "");
    }

    #[test]
    fn clean_collapses_space_left_by_stripped_punctuation() {
        assert_eq!(clean("seo & tools"), "seo tools");
        assert_eq!(clean("a ! b"), "a b");
        assert_eq!(parse("seo & tools"), vec!["seo tools"]);
    }

    #[test]
    fn clean_is_idempotent() {
        let samples = [
            "  SEO Optimization!!!  ",
            "-lead-gen-",
            "Content   Marketing",
            "a - b",
            "a ! b",
            "seo & tools",
            " - ",
            "café brûlée",
            "تسويق",
            "",
        ];
        for sample in samples {
            let once = clean(sample);
            assert_eq!(clean(&once), once, "clean not idempotent for {sample:?}");
        }
    }

    #[test]
    fn validity_rules() {
        assert!(is_valid("seo"));
        assert!(is_valid("b2b marketing"));
        assert!(!is_valid(""));
        assert!(!is_valid("x"));
        assert!(!is_valid("12345"));
        assert!(!is_valid("the"));
        assert!(!is_valid(&"y".repeat(101)));
    }

    #[test]
    fn csv_with_header_row() {
        let csv = "keyword,volume,cpc\nseo tools,1000,2.5\nkeyword research,800,1.9\n";
        let keywords = parse_csv(csv);
        assert_eq!(keywords, vec!["seo tools", "keyword research"]);
    }

    #[test]
    fn csv_without_header() {
        let csv = "seo tools\nkeyword research\ncontent marketing\n";
        let keywords = parse_csv(csv);
        assert_eq!(
            keywords,
            vec!["seo tools", "keyword research", "content marketing"]
        );
    }

    #[test]
    fn csv_picks_keyword_column_over_numeric() {
        let csv = "1,seo tools,99\n2,keyword research,42\n";
        let keywords = parse_csv(csv);
        assert_eq!(keywords, vec!["seo tools", "keyword research"]);
    }

    #[test]
    fn csv_quoted_cells() {
        let csv = "\"seo, advanced\",10\n\"content marketing\",20\n";
        let keywords = parse_csv(csv);
        assert_eq!(keywords, vec!["seo advanced", "content marketing"]);
    }

    #[test]
    fn csv_empty_input() {
        assert!(parse_csv("").is_empty());
        assert!(parse_csv("\n\n\n").is_empty());
    }

    #[test]
    fn deduplicate_keeps_first_casing() {
        let keywords: Vec<String> = ["SEO", "seo", "Seo Tools", "seo tools"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(deduplicate(&keywords), vec!["SEO", "Seo Tools"]);
    }

    #[test]
    fn filter_similar_keeps_shorter() {
        let keywords: Vec<String> = ["content marketing", "content marketing strategy"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let filtered = filter_similar(&keywords, 0.5);
        assert_eq!(filtered, vec!["content marketing"]);
    }

    #[test]
    fn filter_similar_replaces_longer_accepted() {
        let keywords: Vec<String> = ["content marketing strategy", "content marketing"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let filtered = filter_similar(&keywords, 0.5);
        assert_eq!(filtered, vec!["content marketing"]);
    }

    #[test]
    fn filter_similar_keeps_distinct() {
        let keywords: Vec<String> = ["seo tools", "email outreach", "link building"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let filtered = filter_similar(&keywords, 0.5);
        assert_eq!(filtered.len(), 3);
    }

    #[test]
    fn jaccard_basics() {
        assert_eq!(jaccard_similarity("seo tools", "seo tools"), 1.0);
        assert_eq!(jaccard_similarity("seo", "marketing"), 0.0);
        assert_eq!(jaccard_similarity("", "seo"), 0.0);
        // {content, marketing} vs {content, marketing, strategy} -> 2/3
        let sim = jaccard_similarity("content marketing", "content marketing strategy");
        assert!((sim - 2.0 / 3.0).abs() < 1e-9);
    }
}
