//! Outline assembly from competitive research.
//!
//! The generator searches for top-ranking content on a group's keywords,
//! extracts structure from the leading pages, and assembles a section plan
//! around the primary keyword. Research failures downgrade to a shorter
//! fallback outline; `generate` itself never fails, so one bad group cannot
//! sink a whole pipeline run.

use tracing::{debug, warn};

use keywordforge_shared::{OutlineDraft, OutlineSection, Result};

use crate::extractor::ContentExtractor;
use crate::search::SearchProvider;

/// How many ranked pages get fetched for structural analysis.
const RESEARCH_PAGE_COUNT: usize = 3;

/// Target word count for a fully researched outline.
const FULL_OUTLINE_WORDS: u32 = 2000;

/// Target word count for the fallback outline.
const FALLBACK_OUTLINE_WORDS: u32 = 1500;

/// What the researcher learned from the competitor pages. Diagnostic only;
/// the section plan is keyword-driven.
#[derive(Debug)]
struct ResearchInsight {
    pages_analyzed: usize,
    headings_observed: usize,
    mean_word_count: usize,
}

/// Generates one content outline per keyword group.
pub struct OutlineGenerator {
    search: Box<dyn SearchProvider>,
    extractor: ContentExtractor,
    result_count: usize,
}

impl OutlineGenerator {
    /// Create a generator over the given search backend. `result_count`
    /// bounds how many search results are requested per group.
    pub fn new(search: Box<dyn SearchProvider>, result_count: usize) -> Result<Self> {
        Ok(Self {
            search,
            extractor: ContentExtractor::new()?,
            result_count,
        })
    }

    /// Generate an outline for a group's keywords.
    ///
    /// Runs search plus extraction for context, then builds the section
    /// plan from the primary keyword. Any research error produces the
    /// fallback outline instead.
    pub async fn generate(&self, keywords: &[String]) -> OutlineDraft {
        match self.research(keywords).await {
            Ok(insight) => {
                debug!(
                    pages = insight.pages_analyzed,
                    headings = insight.headings_observed,
                    mean_words = insight.mean_word_count,
                    "competitor research complete"
                );
                primary_outline(keywords)
            }
            Err(e) => {
                warn!(error = %e, "outline research failed, using fallback outline");
                fallback_outline(keywords)
            }
        }
    }

    async fn research(&self, keywords: &[String]) -> Result<ResearchInsight> {
        let results = self.search.search(keywords, self.result_count).await?;
        let urls: Vec<String> = results
            .iter()
            .take(RESEARCH_PAGE_COUNT)
            .map(|r| r.url.clone())
            .collect();
        let pages = self.extractor.extract_many(&urls).await;

        let mean_word_count = if pages.is_empty() {
            0
        } else {
            pages.iter().map(|p| p.word_count).sum::<usize>() / pages.len()
        };

        Ok(ResearchInsight {
            pages_analyzed: pages.len(),
            headings_observed: pages.iter().map(|p| p.headings.len()).sum(),
            mean_word_count,
        })
    }
}

/// The full six-section plan built around the primary keyword.
fn primary_outline(keywords: &[String]) -> OutlineDraft {
    let main = keywords.first().map(String::as_str).unwrap_or("topic");
    let main_title = title_case(main);

    OutlineDraft {
        title: format!("Complete Guide to {main_title}"),
        meta_description: format!("Learn about {main} with this guide."),
        target_keywords: keywords.to_vec(),
        estimated_word_count: FULL_OUTLINE_WORDS,
        sections: vec![
            section("Introduction", Some(format!("Overview of {main}")), 200),
            section(
                format!("Understanding {main_title}"),
                Some(format!("Key concepts of {main}")),
                400,
            ),
            section(
                format!("Benefits of {main_title}"),
                Some(format!("Advantages of {main}")),
                350,
            ),
            section(
                format!("How to Use {main_title}"),
                Some("Implementation guide".to_string()),
                500,
            ),
            section(
                "Best Practices",
                Some("Tips and recommendations".to_string()),
                300,
            ),
            section("Conclusion", Some("Summary and next steps".to_string()), 150),
        ],
    }
}

/// Shorter five-section plan used when research is unavailable. Also the
/// shape the orchestrator substitutes when outline generation exceeds its
/// time budget.
pub fn fallback_outline(keywords: &[String]) -> OutlineDraft {
    let main = keywords.first().map(String::as_str).unwrap_or("content");
    let main_title = title_case(main);

    OutlineDraft {
        title: format!("Guide to {main_title}"),
        meta_description: format!("Learn about {main}."),
        target_keywords: keywords.to_vec(),
        estimated_word_count: FALLBACK_OUTLINE_WORDS,
        sections: vec![
            section("Introduction", None, 200),
            section(format!("What is {main_title}"), None, 300),
            section("Benefits", None, 250),
            section("How to Get Started", None, 400),
            section("Conclusion", None, 150),
        ],
    }
}

fn section(heading: impl Into<String>, description: Option<String>, words: u32) -> OutlineSection {
    OutlineSection {
        heading: heading.into(),
        level: 2,
        description,
        estimated_words: words,
    }
}

/// Uppercase the first letter of each word. Keywords arrive normalized to
/// lowercase, so this is enough for display casing.
fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
