//! Report rendering for completed batches.
//!
//! The final pipeline stage hands the full group and idea set to a
//! [`ReportSink`], which produces a downloadable artifact reference and an
//! email-sent flag. The bundled [`FileReportSink`] renders a markdown
//! summary into a local directory; email delivery stays a flag only, the
//! hand-off itself is out of scope.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use keywordforge_shared::{BatchId, KeywordGroup, PipelineError, PostIdea, Result};

/// What the sink produced for a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReport {
    /// Where the rendered artifact can be retrieved from.
    pub download_url: String,
    /// Whether the report was handed off for email delivery.
    pub email_sent: bool,
}

/// Accepts a finished report payload and produces an artifact reference.
#[async_trait]
pub trait ReportSink: Send + Sync {
    /// Render the report for `batch_id` over the given groups and ideas.
    async fn render(
        &self,
        batch_id: BatchId,
        groups: &[KeywordGroup],
        ideas: &[PostIdea],
    ) -> Result<RenderedReport>;
}

/// Writes one markdown report file per batch under a local directory.
pub struct FileReportSink {
    output_dir: PathBuf,
    email_enabled: bool,
}

impl FileReportSink {
    pub fn new(output_dir: impl Into<PathBuf>, email_enabled: bool) -> Self {
        Self {
            output_dir: output_dir.into(),
            email_enabled,
        }
    }
}

#[async_trait]
impl ReportSink for FileReportSink {
    async fn render(
        &self,
        batch_id: BatchId,
        groups: &[KeywordGroup],
        ideas: &[PostIdea],
    ) -> Result<RenderedReport> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| PipelineError::io(&self.output_dir, e))?;

        let path = self.output_dir.join(format!("report_{batch_id}.md"));
        let markdown = render_markdown(batch_id, groups, ideas);
        tokio::fs::write(&path, markdown)
            .await
            .map_err(|e| PipelineError::io(&path, e))?;

        info!(
            %batch_id,
            path = %path.display(),
            groups = groups.len(),
            ideas = ideas.len(),
            "report rendered"
        );

        Ok(RenderedReport {
            download_url: format!("file://{}", path.display()),
            email_sent: self.email_enabled,
        })
    }
}

/// Build the markdown body of a batch report.
fn render_markdown(batch_id: BatchId, groups: &[KeywordGroup], ideas: &[PostIdea]) -> String {
    let mut out = String::new();
    out.push_str("# Keyword Research Report\n\n");
    out.push_str(&format!("- Batch: `{batch_id}`\n"));
    out.push_str(&format!(
        "- Generated: {}\n",
        Utc::now().format("%Y-%m-%d %H:%M UTC")
    ));
    out.push_str(&format!("- Groups: {}\n", groups.len()));
    out.push_str(&format!("- Post ideas: {}\n\n", ideas.len()));

    out.push_str("## Keyword Groups\n\n");
    for group in groups {
        out.push_str(&format!(
            "### {} (confidence {:.1})\n\n",
            group.name, group.score
        ));
        for keyword in &group.keywords {
            out.push_str(&format!("- {keyword}\n"));
        }
        out.push('\n');

        let group_ideas: Vec<&PostIdea> =
            ideas.iter().filter(|i| i.group_id == group.id).collect();
        if !group_ideas.is_empty() {
            out.push_str("Post ideas:\n\n");
            for idea in group_ideas {
                out.push_str(&format!(
                    "- **{}** ({}, ~{} words, {})\n",
                    idea.title, idea.content_type, idea.estimated_word_count, idea.difficulty
                ));
            }
            out.push('\n');
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use keywordforge_shared::{ContentType, Difficulty};
    use uuid::Uuid;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("kf_report_{}", Uuid::now_v7()))
    }

    fn sample_group(batch_id: BatchId) -> KeywordGroup {
        KeywordGroup::new(
            batch_id,
            "keyword related",
            vec!["keyword research".into(), "keyword tools".into()],
            0.8,
        )
        .unwrap()
    }

    fn sample_idea(group: &KeywordGroup) -> PostIdea {
        PostIdea {
            id: format!("idea_{}_listicle", group.id),
            group_id: group.id,
            title: "10 Essential keyword research Tips".into(),
            content_type: ContentType::Listicle,
            target_keywords: group.keywords.clone(),
            estimated_word_count: 1200,
            difficulty: Difficulty::Medium,
            description: "An engaging list-format article.".into(),
        }
    }

    #[tokio::test]
    async fn writes_report_file_and_returns_reference() {
        let dir = temp_dir();
        let sink = FileReportSink::new(&dir, false);
        let batch_id = BatchId::new();
        let group = sample_group(batch_id);
        let idea = sample_idea(&group);

        let rendered = sink
            .render(batch_id, &[group], std::slice::from_ref(&idea))
            .await
            .unwrap();

        assert!(!rendered.email_sent);
        assert!(rendered.download_url.starts_with("file://"));

        let path = dir.join(format!("report_{batch_id}.md"));
        let body = std::fs::read_to_string(&path).expect("report file written");
        assert!(body.contains("# Keyword Research Report"));
        assert!(body.contains("keyword related"));
        assert!(body.contains("10 Essential keyword research Tips"));
        assert!(body.contains("Groups: 1"));
        assert!(body.contains("Post ideas: 1"));
    }

    #[tokio::test]
    async fn email_flag_follows_configuration() {
        let sink = FileReportSink::new(temp_dir(), true);
        let batch_id = BatchId::new();
        let rendered = sink.render(batch_id, &[], &[]).await.unwrap();
        assert!(rendered.email_sent);
    }

    #[tokio::test]
    async fn ideas_render_under_their_own_group() {
        let dir = temp_dir();
        let sink = FileReportSink::new(&dir, false);
        let batch_id = BatchId::new();
        let with_idea = sample_group(batch_id);
        let without_idea =
            KeywordGroup::new(batch_id, "seo related", vec!["seo audit".into()], 0.5).unwrap();
        let idea = sample_idea(&with_idea);

        sink.render(batch_id, &[with_idea, without_idea], &[idea])
            .await
            .unwrap();

        let body =
            std::fs::read_to_string(dir.join(format!("report_{batch_id}.md"))).unwrap();
        let seo_section = body.split("### seo related").nth(1).unwrap();
        assert!(!seo_section.contains("Post ideas:"));
    }
}
