//! Core domain types for the KeywordForge pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{PipelineError, Result};

/// Maximum normalized keyword length accepted by validation.
pub const MAX_KEYWORD_LEN: usize = 100;

/// Minimum normalized keyword length accepted by validation.
pub const MIN_KEYWORD_LEN: usize = 2;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper for keyword batch identifiers (time-sortable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchId(pub Uuid);

impl BatchId {
    /// Generate a new time-sortable batch identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for BatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for BatchId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A UUID v7 wrapper for keyword group identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub Uuid);

impl GroupId {
    /// Generate a new time-sortable group identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for GroupId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for GroupId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A UUID v7 wrapper for outline identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutlineId(pub Uuid);

impl OutlineId {
    /// Generate a new time-sortable outline identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for OutlineId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OutlineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for OutlineId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A UUID v7 wrapper for report identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportId(pub Uuid);

impl ReportId {
    /// Generate a new time-sortable report identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ReportId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ReportId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ReportId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ---------------------------------------------------------------------------
// KeywordBatch
// ---------------------------------------------------------------------------

/// Lifecycle state of a keyword batch.
///
/// `Uploaded` is the only initial state; `Completed` and `Failed` are
/// terminal. Only the pipeline moves a batch between states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    Uploaded,
    Processing,
    Completed,
    Failed,
}

impl BatchStatus {
    /// Stable string form used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uploaded => "uploaded",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BatchStatus {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "uploaded" => Ok(Self::Uploaded),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(PipelineError::validation(format!(
                "unknown batch status: {other}"
            ))),
        }
    }
}

/// How the batch's keywords were submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchSource {
    Text,
    Csv,
}

impl BatchSource {
    /// Stable string form used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Csv => "csv",
        }
    }
}

impl std::fmt::Display for BatchSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BatchSource {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "text" => Ok(Self::Text),
            "csv" => Ok(Self::Csv),
            other => Err(PipelineError::validation(format!(
                "unknown batch source: {other}"
            ))),
        }
    }
}

/// One user-submitted set of keywords, processed as a unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordBatch {
    /// Unique identifier for this batch.
    pub id: BatchId,
    /// The user who submitted the batch.
    pub user_id: String,
    /// Normalized keywords, duplicates removed, input order preserved.
    pub keywords: Vec<String>,
    /// Cached `keywords.len()` for cheap listing queries.
    pub keyword_count: usize,
    /// Current lifecycle state.
    pub status: BatchStatus,
    /// Submission channel.
    pub source: BatchSource,
    /// When the batch was created.
    pub created_at: DateTime<Utc>,
    /// When the batch was last modified.
    pub updated_at: DateTime<Utc>,
    /// When the pipeline finished, if it has.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl KeywordBatch {
    /// Create a new batch in the `Uploaded` state.
    ///
    /// Fails with a validation error when the keyword list or user id is
    /// empty; callers surface that as "no keywords found" rather than
    /// persisting an unusable record.
    pub fn new(user_id: impl Into<String>, keywords: Vec<String>, source: BatchSource) -> Result<Self> {
        let user_id = user_id.into();
        if user_id.is_empty() {
            return Err(PipelineError::validation("batch user_id must not be empty"));
        }
        if keywords.is_empty() {
            return Err(PipelineError::validation(
                "batch must contain at least one keyword",
            ));
        }

        let now = Utc::now();
        let keyword_count = keywords.len();
        Ok(Self {
            id: BatchId::new(),
            user_id,
            keywords,
            keyword_count,
            status: BatchStatus::Uploaded,
            source,
            created_at: now,
            updated_at: now,
            completed_at: None,
        })
    }

    /// Whether the batch is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self.status, BatchStatus::Completed | BatchStatus::Failed)
    }
}

// ---------------------------------------------------------------------------
// KeywordGroup
// ---------------------------------------------------------------------------

/// A semantically related subset of a batch's keywords.
///
/// Groups partition the batch: every batch keyword belongs to exactly one
/// group. The score is a coarse confidence signal (1.0 exact/trivial,
/// 0.8 semantic clustering, 0.5 chunk fallback), not a statistical metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordGroup {
    /// Unique identifier for this group.
    pub id: GroupId,
    /// The batch this group belongs to.
    pub batch_id: BatchId,
    /// Derived human-readable cluster name.
    pub name: String,
    /// Member keywords in input order.
    pub keywords: Vec<String>,
    /// Grouping confidence in [0, 1].
    pub score: f64,
    /// When the group was created.
    pub created_at: DateTime<Utc>,
}

impl KeywordGroup {
    /// Create a group, validating that it is non-empty and the score is in
    /// range.
    pub fn new(
        batch_id: BatchId,
        name: impl Into<String>,
        keywords: Vec<String>,
        score: f64,
    ) -> Result<Self> {
        if keywords.is_empty() {
            return Err(PipelineError::validation(
                "group must contain at least one keyword",
            ));
        }
        if !(0.0..=1.0).contains(&score) {
            return Err(PipelineError::validation(format!(
                "group score {score} outside [0, 1]"
            )));
        }

        Ok(Self {
            id: GroupId::new(),
            batch_id,
            name: name.into(),
            keywords,
            score,
            created_at: Utc::now(),
        })
    }
}

// ---------------------------------------------------------------------------
// Outline
// ---------------------------------------------------------------------------

/// One section of a content outline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlineSection {
    /// Section heading text.
    pub heading: String,
    /// Heading level (2 = H2, 3 = H3, ...).
    pub level: u8,
    /// Short description of what the section covers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Target word count for the section.
    pub estimated_words: u32,
}

/// The structured content of an outline, as produced by the generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlineDraft {
    /// Proposed article title.
    pub title: String,
    /// Proposed meta description.
    pub meta_description: String,
    /// Keywords the article should target.
    pub target_keywords: Vec<String>,
    /// Target total word count.
    pub estimated_word_count: u32,
    /// Ordered section list.
    pub sections: Vec<OutlineSection>,
}

/// A persisted outline, one per group, regenerable in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outline {
    /// Unique identifier for this outline.
    pub id: OutlineId,
    /// The group this outline was generated for.
    pub group_id: GroupId,
    /// The outline content.
    pub content: OutlineDraft,
    /// When the outline was first created.
    pub created_at: DateTime<Utc>,
    /// When the outline was last regenerated.
    pub updated_at: DateTime<Utc>,
}

impl Outline {
    /// Create a new outline for a group.
    pub fn new(group_id: GroupId, content: OutlineDraft) -> Self {
        let now = Utc::now();
        Self {
            id: OutlineId::new(),
            group_id,
            content,
            created_at: now,
            updated_at: now,
        }
    }
}

// ---------------------------------------------------------------------------
// PostIdea
// ---------------------------------------------------------------------------

/// Content format a post idea targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentType {
    HowToGuide,
    Listicle,
    Comparison,
    CaseStudy,
    BeginnerGuide,
}

impl ContentType {
    /// All content types, in generation order.
    pub const ALL: [ContentType; 5] = [
        Self::HowToGuide,
        Self::Listicle,
        Self::Comparison,
        Self::CaseStudy,
        Self::BeginnerGuide,
    ];

    /// Display name used in reports and storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HowToGuide => "How-to Guide",
            Self::Listicle => "Listicle",
            Self::Comparison => "Comparison",
            Self::CaseStudy => "Case Study",
            Self::BeginnerGuide => "Beginner Guide",
        }
    }

    /// Lowercase slug used in synthesized idea identifiers.
    pub fn slug(&self) -> &'static str {
        match self {
            Self::HowToGuide => "how-to_guide",
            Self::Listicle => "listicle",
            Self::Comparison => "comparison",
            Self::CaseStudy => "case_study",
            Self::BeginnerGuide => "beginner_guide",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContentType {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "How-to Guide" => Ok(Self::HowToGuide),
            "Listicle" => Ok(Self::Listicle),
            "Comparison" => Ok(Self::Comparison),
            "Case Study" => Ok(Self::CaseStudy),
            "Beginner Guide" => Ok(Self::BeginnerGuide),
            other => Err(PipelineError::validation(format!(
                "unknown content type: {other}"
            ))),
        }
    }
}

/// How hard the content is expected to be to rank and write for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Display name used in reports and storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Difficulty {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Easy" => Ok(Self::Easy),
            "Medium" => Ok(Self::Medium),
            "Hard" => Ok(Self::Hard),
            other => Err(PipelineError::validation(format!(
                "unknown difficulty: {other}"
            ))),
        }
    }
}

/// A template-derived post idea for one keyword group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostIdea {
    /// Synthesized identifier (`idea_{group_id}_{content type slug}`).
    pub id: String,
    /// The group this idea belongs to.
    pub group_id: GroupId,
    /// Proposed article title.
    pub title: String,
    /// Content format.
    pub content_type: ContentType,
    /// Keywords to target (first three of the group).
    pub target_keywords: Vec<String>,
    /// Estimated article length for the format.
    pub estimated_word_count: u32,
    /// Expected writing/ranking difficulty.
    pub difficulty: Difficulty,
    /// One-line pitch for the idea.
    pub description: String,
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// A persisted reference to a rendered batch report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Unique identifier for this report.
    pub id: ReportId,
    /// The batch the report summarizes.
    pub batch_id: BatchId,
    /// Where the rendered artifact can be downloaded from.
    pub download_url: String,
    /// Whether an email hand-off was performed.
    pub email_sent: bool,
    /// Number of groups in the report.
    pub group_count: usize,
    /// Number of post ideas in the report.
    pub idea_count: usize,
    /// When the report was rendered.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_id_roundtrip() {
        let id = BatchId::new();
        let s = id.to_string();
        let parsed: BatchId = s.parse().expect("parse BatchId");
        assert_eq!(id, parsed);
    }

    #[test]
    fn batch_ids_are_time_sortable() {
        let a = BatchId::new();
        let b = BatchId::new();
        assert!(a.0 <= b.0);
    }

    #[test]
    fn batch_constructor_validates() {
        let err = KeywordBatch::new("U123", vec![], BatchSource::Text);
        assert!(err.is_err());

        let err = KeywordBatch::new("", vec!["seo".into()], BatchSource::Text);
        assert!(err.is_err());

        let batch = KeywordBatch::new("U123", vec!["seo".into()], BatchSource::Text)
            .expect("valid batch");
        assert_eq!(batch.status, BatchStatus::Uploaded);
        assert_eq!(batch.keyword_count, 1);
        assert!(batch.completed_at.is_none());
        assert!(!batch.is_terminal());
    }

    #[test]
    fn group_constructor_validates_score_range() {
        let batch_id = BatchId::new();
        assert!(KeywordGroup::new(batch_id, "seo related", vec!["seo".into()], 1.5).is_err());
        assert!(KeywordGroup::new(batch_id, "seo related", vec![], 0.8).is_err());

        let group = KeywordGroup::new(batch_id, "seo related", vec!["seo".into()], 0.8)
            .expect("valid group");
        assert_eq!(group.batch_id, batch_id);
        assert_eq!(group.score, 0.8);
    }

    #[test]
    fn status_string_roundtrip() {
        for status in [
            BatchStatus::Uploaded,
            BatchStatus::Processing,
            BatchStatus::Completed,
            BatchStatus::Failed,
        ] {
            let parsed: BatchStatus = status.as_str().parse().expect("parse status");
            assert_eq!(parsed, status);
        }
        assert!("done".parse::<BatchStatus>().is_err());
    }

    #[test]
    fn content_type_string_roundtrip() {
        for ct in ContentType::ALL {
            let parsed: ContentType = ct.as_str().parse().expect("parse content type");
            assert_eq!(parsed, ct);
        }
    }

    #[test]
    fn batch_serialization() {
        let batch = KeywordBatch::new(
            "U123",
            vec!["seo tools".into(), "keyword research".into()],
            BatchSource::Csv,
        )
        .expect("valid batch");

        let json = serde_json::to_string_pretty(&batch).expect("serialize");
        let parsed: KeywordBatch = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed.keywords, batch.keywords);
        assert_eq!(parsed.source, BatchSource::Csv);
        assert_eq!(parsed.status, BatchStatus::Uploaded);
    }

    #[test]
    fn outline_draft_serialization() {
        let draft = OutlineDraft {
            title: "Complete Guide to Seo".into(),
            meta_description: "Learn about seo with this guide.".into(),
            target_keywords: vec!["seo".into()],
            estimated_word_count: 2000,
            sections: vec![OutlineSection {
                heading: "Introduction".into(),
                level: 2,
                description: Some("Overview of seo".into()),
                estimated_words: 200,
            }],
        };

        let json = serde_json::to_string(&draft).expect("serialize");
        let parsed: OutlineDraft = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, draft);
    }

    #[test]
    fn batch_fixture_validates() {
        let fixture = std::fs::read_to_string("../../../fixtures/json/batch.fixture.json")
            .expect("read fixture");
        let parsed: KeywordBatch = serde_json::from_str(&fixture).expect("deserialize fixture");
        assert_eq!(parsed.user_id, "U02EXAMPLE");
        assert_eq!(parsed.keyword_count, 3);
        assert_eq!(parsed.status, BatchStatus::Completed);
    }
}
