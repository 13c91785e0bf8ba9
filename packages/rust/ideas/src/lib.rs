//! Template-driven post idea generation.
//!
//! Every keyword group gets one idea per content format, built from the
//! group's primary keyword. Titles, word-count targets, and descriptions
//! are fixed templates per format; difficulty comes from how broad the
//! primary keyword is (single-word topics are the hardest to rank for).

use tracing::info;

use keywordforge_shared::{ContentType, Difficulty, KeywordGroup, PostIdea};

/// How many of a group's keywords an idea targets.
const TARGET_KEYWORD_LIMIT: usize = 3;

/// Generate post ideas for every group, one idea per content format.
///
/// Output order follows the input groups, and within a group the formats
/// run in [`ContentType::ALL`] order.
pub fn generate_ideas(groups: &[KeywordGroup]) -> Vec<PostIdea> {
    let ideas: Vec<PostIdea> = groups.iter().flat_map(group_ideas).collect();
    info!(ideas = ideas.len(), groups = groups.len(), "generated post ideas");
    ideas
}

fn group_ideas(group: &KeywordGroup) -> Vec<PostIdea> {
    let main_keyword = group
        .keywords
        .first()
        .map(String::as_str)
        .unwrap_or(group.name.as_str());

    ContentType::ALL
        .iter()
        .map(|&content_type| PostIdea {
            id: format!("idea_{}_{}", group.id, content_type.slug()),
            group_id: group.id,
            title: title_for(content_type, main_keyword),
            content_type,
            target_keywords: group
                .keywords
                .iter()
                .take(TARGET_KEYWORD_LIMIT)
                .cloned()
                .collect(),
            estimated_word_count: word_count_for(content_type),
            difficulty: assess_difficulty(main_keyword),
            description: description_for(content_type, main_keyword),
        })
        .collect()
}

fn title_for(content_type: ContentType, keyword: &str) -> String {
    match content_type {
        ContentType::HowToGuide => format!("How to {keyword}: Step-by-Step Guide"),
        ContentType::Listicle => format!("10 Essential {keyword} Tips"),
        ContentType::Comparison => format!("{keyword} vs Alternatives: Complete Comparison"),
        ContentType::CaseStudy => format!("Real {keyword} Success Stories and Case Studies"),
        ContentType::BeginnerGuide => format!("{keyword} for Beginners: Getting Started"),
    }
}

fn word_count_for(content_type: ContentType) -> u32 {
    match content_type {
        ContentType::HowToGuide => 1500,
        ContentType::Listicle => 1200,
        ContentType::Comparison => 2000,
        ContentType::CaseStudy => 1800,
        ContentType::BeginnerGuide => 1600,
    }
}

/// Broad single-word topics are the hardest to write competitively;
/// long-tail keywords are the easiest.
fn assess_difficulty(keyword: &str) -> Difficulty {
    match keyword.split_whitespace().count() {
        1 => Difficulty::Hard,
        2 => Difficulty::Medium,
        _ => Difficulty::Easy,
    }
}

fn description_for(content_type: ContentType, keyword: &str) -> String {
    match content_type {
        ContentType::HowToGuide => format!(
            "A comprehensive step-by-step guide covering all aspects of {keyword}. \
             Perfect for readers looking for actionable instructions."
        ),
        ContentType::Listicle => format!(
            "An engaging list-format article highlighting the most important {keyword} \
             tips and strategies."
        ),
        ContentType::Comparison => format!(
            "An in-depth comparison analyzing {keyword} against alternatives, helping \
             readers make informed decisions."
        ),
        ContentType::CaseStudy => format!(
            "Real-world examples and success stories showcasing effective {keyword} \
             implementation."
        ),
        ContentType::BeginnerGuide => format!(
            "A beginner-friendly introduction to {keyword}, covering fundamentals and \
             getting started tips."
        ),
    }
}
