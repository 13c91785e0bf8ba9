//! Four-stage batch pipeline: group → outline → ideate → report.
//!
//! One pipeline run owns its batch exclusively, enforced by the cache lock
//! keyed on the batch id. The lock is released on every exit path; a
//! crashed worker's lock expires on its TTL instead of blocking the batch
//! forever. Stage failures mark the batch failed and are not retried.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, instrument, warn};

use keywordforge_cache::{Cache, RateLimiter, lock_key};
use keywordforge_grouping::KeywordGrouper;
use keywordforge_report::ReportSink;
use keywordforge_research::{OutlineGenerator, fallback_outline};
use keywordforge_shared::{
    BatchId, BatchStatus, KeywordBatch, KeywordGroup, Outline, OutlineDraft, PipelineConfig,
    PipelineError, PostIdea, Report, ReportId, Result,
};
use keywordforge_storage::Storage;

/// The four ordered pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Group,
    Outline,
    Ideate,
    Report,
}

impl Stage {
    /// All stages in execution order.
    pub const ALL: [Stage; 4] = [Self::Group, Self::Outline, Self::Ideate, Self::Report];

    /// Display name used in progress events and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Group => "Grouping keywords",
            Self::Outline => "Generating outlines",
            Self::Ideate => "Generating post ideas",
            Self::Report => "Rendering report",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a completed pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    /// The processed batch.
    pub batch_id: BatchId,
    /// How many groups the batch's keywords formed.
    pub group_count: usize,
    /// How many post ideas were generated.
    pub idea_count: usize,
    /// Where the rendered report can be retrieved from.
    pub download_url: String,
    /// Whether the report was handed off for email delivery.
    pub email_sent: bool,
    /// Total pipeline wall time.
    pub elapsed: std::time::Duration,
}

/// Progress-event consumer for pipeline runs.
pub trait PipelineObserver: Send + Sync {
    /// Called before a stage runs, with its 1-based position.
    fn stage(&self, batch_id: BatchId, stage: Stage, current: usize, total: usize);
    /// Called once when the pipeline reaches `Completed`.
    fn completed(&self, outcome: &PipelineOutcome);
    /// Called once when the pipeline reaches `Failed`.
    fn failed(&self, batch_id: BatchId, error: &PipelineError);
}

/// No-op observer for headless/test usage.
pub struct SilentObserver;

impl PipelineObserver for SilentObserver {
    fn stage(&self, _batch_id: BatchId, _stage: Stage, _current: usize, _total: usize) {}
    fn completed(&self, _outcome: &PipelineOutcome) {}
    fn failed(&self, _batch_id: BatchId, _error: &PipelineError) {}
}

/// Produces one outline draft per keyword group.
///
/// [`OutlineGenerator`] is the production implementation and never errors;
/// the trait seam exists so the orchestrator's failure handling stays
/// testable against backends that do.
#[async_trait]
pub trait OutlineSource: Send + Sync {
    async fn generate(&self, keywords: &[String]) -> Result<OutlineDraft>;
}

#[async_trait]
impl OutlineSource for OutlineGenerator {
    async fn generate(&self, keywords: &[String]) -> Result<OutlineDraft> {
        Ok(OutlineGenerator::generate(self, keywords).await)
    }
}

/// Everything one pipeline run needs, injected by the caller.
pub struct PipelineDeps {
    pub storage: Arc<Storage>,
    pub cache: Arc<dyn Cache>,
    pub grouper: Arc<KeywordGrouper>,
    pub outline_source: Arc<dyn OutlineSource>,
    pub report_sink: Arc<dyn ReportSink>,
    pub config: PipelineConfig,
}

impl PipelineDeps {
    fn rate_limiter(&self) -> RateLimiter {
        RateLimiter::new(
            Arc::clone(&self.cache),
            self.config.rate_limit_max,
            self.config.rate_limit_window,
        )
    }
}

/// Run the full pipeline for one batch.
///
/// Preconditions, checked in order: the user is within their request
/// budget, the batch exists, the requester owns it, and no other run holds
/// its processing lock. A held lock is reported as
/// [`PipelineError::AlreadyProcessing`] with the existing lock untouched.
#[instrument(skip_all, fields(batch_id = %batch_id, user_id))]
pub async fn process_batch(
    deps: &PipelineDeps,
    user_id: &str,
    batch_id: BatchId,
    observer: &dyn PipelineObserver,
) -> Result<PipelineOutcome> {
    let start = Instant::now();

    deps.rate_limiter().check(user_id).await?;
    let batch = authorized_batch(deps, user_id, batch_id).await?;

    let lock = lock_key(batch_id);
    let acquired = deps
        .cache
        .set_if_absent(&lock, "1", deps.config.lock_ttl)
        .await?;
    if !acquired {
        info!("processing lock already held");
        return Err(PipelineError::AlreadyProcessing {
            batch_id: batch_id.to_string(),
        });
    }

    deps.storage
        .update_batch_status(batch_id, BatchStatus::Processing, None)
        .await?;
    info!(keywords = batch.keyword_count, "pipeline started");

    let result = run_stages(deps, &batch, observer).await;

    // The lock must die on every exit path, success or failure.
    let _ = deps.cache.delete(&lock).await;

    match result {
        Ok((group_count, idea_count, rendered)) => {
            deps.storage
                .update_batch_status(batch_id, BatchStatus::Completed, Some(Utc::now()))
                .await?;

            let outcome = PipelineOutcome {
                batch_id,
                group_count,
                idea_count,
                download_url: rendered.download_url,
                email_sent: rendered.email_sent,
                elapsed: start.elapsed(),
            };
            info!(
                groups = outcome.group_count,
                ideas = outcome.idea_count,
                elapsed_ms = outcome.elapsed.as_millis(),
                "pipeline complete"
            );
            observer.completed(&outcome);
            Ok(outcome)
        }
        Err(e) => {
            warn!(error = %e, "pipeline stage failed, marking batch failed");
            let _ = deps
                .storage
                .update_batch_status(batch_id, BatchStatus::Failed, Some(Utc::now()))
                .await;
            observer.failed(batch_id, &e);
            Err(e)
        }
    }
}

/// Execute the four stages in order. Any error aborts the remainder; the
/// caller owns status and lock cleanup.
async fn run_stages(
    deps: &PipelineDeps,
    batch: &KeywordBatch,
    observer: &dyn PipelineObserver,
) -> Result<(usize, usize, keywordforge_report::RenderedReport)> {
    let total = Stage::ALL.len();

    // --- Stage 1: Group ---
    observer.stage(batch.id, Stage::Group, 1, total);
    let clusters = deps.grouper.group(&batch.keywords);
    let mut groups: Vec<KeywordGroup> = Vec::with_capacity(clusters.len());
    for cluster in clusters {
        let group = KeywordGroup::new(batch.id, cluster.name, cluster.keywords, cluster.score)?;
        deps.storage.create_group(&group).await?;
        groups.push(group);
    }
    info!(groups = groups.len(), "group stage complete");

    // --- Stage 2: Outline ---
    observer.stage(batch.id, Stage::Outline, 2, total);
    for group in &groups {
        let draft = generate_with_timeout(deps, group).await?;
        persist_outline(deps, group, draft).await?;
    }
    info!(outlines = groups.len(), "outline stage complete");

    // --- Stage 3: Ideate ---
    observer.stage(batch.id, Stage::Ideate, 3, total);
    let ideas: Vec<PostIdea> = keywordforge_ideas::generate_ideas(&groups);
    for idea in &ideas {
        deps.storage.create_idea(idea).await?;
    }

    // --- Stage 4: Report ---
    observer.stage(batch.id, Stage::Report, 4, total);
    let rendered = deps.report_sink.render(batch.id, &groups, &ideas).await?;
    let report = Report {
        id: ReportId::new(),
        batch_id: batch.id,
        download_url: rendered.download_url.clone(),
        email_sent: rendered.email_sent,
        group_count: groups.len(),
        idea_count: ideas.len(),
        created_at: Utc::now(),
    };
    deps.storage.create_report(&report).await?;

    Ok((groups.len(), ideas.len(), rendered))
}

/// Generate a group's outline under the configured time budget. A timeout
/// downgrades that group to the fallback outline; the stage keeps going.
async fn generate_with_timeout(deps: &PipelineDeps, group: &KeywordGroup) -> Result<OutlineDraft> {
    match tokio::time::timeout(
        deps.config.outline_timeout,
        deps.outline_source.generate(&group.keywords),
    )
    .await
    {
        Ok(result) => result,
        Err(_) => {
            warn!(group_id = %group.id, "outline generation timed out, using fallback");
            Ok(fallback_outline(&group.keywords))
        }
    }
}

/// Write a group's outline, overwriting an existing one in place.
async fn persist_outline(
    deps: &PipelineDeps,
    group: &KeywordGroup,
    draft: OutlineDraft,
) -> Result<()> {
    match deps.storage.get_outline_by_group(group.id).await? {
        Some(_) => deps.storage.update_outline(group.id, &draft).await,
        None => {
            deps.storage
                .create_outline(&Outline::new(group.id, draft))
                .await
        }
    }
}

/// Re-run only the outline stage for an already-grouped batch.
///
/// Rejected with [`PipelineError::AlreadyProcessing`] while a full run
/// holds the batch's lock: the outline stage writes the same rows, and two
/// concurrent writers have no defined winner. Regeneration itself takes no
/// lock; the overwrite is idempotent. Returns how many outlines were
/// written.
#[instrument(skip_all, fields(batch_id = %batch_id, user_id))]
pub async fn regenerate_outlines(
    deps: &PipelineDeps,
    user_id: &str,
    batch_id: BatchId,
) -> Result<usize> {
    let _batch = authorized_batch(deps, user_id, batch_id).await?;

    if deps.cache.exists(&lock_key(batch_id)).await? {
        return Err(PipelineError::AlreadyProcessing {
            batch_id: batch_id.to_string(),
        });
    }

    let groups = deps.storage.list_groups_by_batch(batch_id).await?;
    if groups.is_empty() {
        return Err(PipelineError::not_found(format!(
            "groups for batch {batch_id}"
        )));
    }

    for group in &groups {
        let draft = generate_with_timeout(deps, group).await?;
        persist_outline(deps, group, draft).await?;
    }

    info!(outlines = groups.len(), "outlines regenerated");
    Ok(groups.len())
}

/// Fetch a batch and verify the requester owns it. Ownership failures are
/// distinct from lookup misses.
pub(crate) async fn authorized_batch(
    deps: &PipelineDeps,
    user_id: &str,
    batch_id: BatchId,
) -> Result<KeywordBatch> {
    let batch = deps
        .storage
        .get_batch(batch_id)
        .await?
        .ok_or_else(|| PipelineError::not_found(format!("batch {batch_id}")))?;

    if batch.user_id != user_id {
        return Err(PipelineError::Unauthorized);
    }
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::upload_batch;
    use keywordforge_cache::InMemoryCache;
    use keywordforge_grouping::HashEmbedder;
    use keywordforge_report::FileReportSink;
    use keywordforge_research::SearchProvider;
    use keywordforge_shared::BatchSource;
    use std::time::Duration;
    use uuid::Uuid;

    /// Search provider with no results: research succeeds without touching
    /// the network and the generator emits the full six-section outline.
    struct NoResultsSearch;

    #[async_trait]
    impl SearchProvider for NoResultsSearch {
        async fn search(
            &self,
            _keywords: &[String],
            _count: usize,
        ) -> Result<Vec<keywordforge_research::SearchResult>> {
            Ok(Vec::new())
        }
    }

    struct FailingOutlineSource;

    #[async_trait]
    impl OutlineSource for FailingOutlineSource {
        async fn generate(&self, _keywords: &[String]) -> Result<OutlineDraft> {
            Err(PipelineError::research("outline backend exploded"))
        }
    }

    struct SlowOutlineSource;

    #[async_trait]
    impl OutlineSource for SlowOutlineSource {
        async fn generate(&self, keywords: &[String]) -> Result<OutlineDraft> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(fallback_outline(keywords))
        }
    }

    async fn test_deps() -> PipelineDeps {
        test_deps_with(None, PipelineConfig::default()).await
    }

    async fn test_deps_with(
        outline_source: Option<Arc<dyn OutlineSource>>,
        config: PipelineConfig,
    ) -> PipelineDeps {
        let outline_source = match outline_source {
            Some(source) => source,
            None => Arc::new(
                OutlineGenerator::new(Box::new(NoResultsSearch), 5).expect("generator"),
            ),
        };
        let report_dir = std::env::temp_dir().join(format!("kf_pipeline_{}", Uuid::now_v7()));

        PipelineDeps {
            storage: Arc::new(Storage::open_in_memory().await.expect("storage")),
            cache: Arc::new(InMemoryCache::new()),
            grouper: Arc::new(KeywordGrouper::new(Box::new(HashEmbedder::new(64)), 20)),
            outline_source,
            report_sink: Arc::new(FileReportSink::new(report_dir, false)),
            config,
        }
    }

    async fn seeded_batch(deps: &PipelineDeps, user_id: &str) -> KeywordBatch {
        upload_batch(
            deps,
            user_id,
            "keyword research, keyword tools, keyword planner, content marketing,\n\
             content strategy, content calendar, link building, backlink checker,\n\
             link outreach, seo audit, seo checklist, seo basics",
            BatchSource::Text,
        )
        .await
        .expect("upload batch")
    }

    #[tokio::test]
    async fn full_pipeline_completes_and_persists_everything() {
        let deps = test_deps().await;
        let batch = seeded_batch(&deps, "U1").await;

        let outcome = process_batch(&deps, "U1", batch.id, &SilentObserver)
            .await
            .expect("pipeline");

        assert!(outcome.group_count >= 1);
        assert_eq!(outcome.idea_count, outcome.group_count * 5);
        assert!(outcome.download_url.starts_with("file://"));

        let stored = deps.storage.get_batch(batch.id).await.unwrap().unwrap();
        assert_eq!(stored.status, BatchStatus::Completed);
        assert!(stored.completed_at.is_some());

        // Groups partition the batch's keywords.
        let groups = deps.storage.list_groups_by_batch(batch.id).await.unwrap();
        let mut covered: Vec<String> =
            groups.iter().flat_map(|g| g.keywords.clone()).collect();
        covered.sort();
        let mut expected = batch.keywords.clone();
        expected.sort();
        assert_eq!(covered, expected);

        // One outline per group, ideas and report persisted.
        for group in &groups {
            assert!(deps
                .storage
                .get_outline_by_group(group.id)
                .await
                .unwrap()
                .is_some());
        }
        let ideas = deps.storage.list_ideas_by_batch(batch.id).await.unwrap();
        assert_eq!(ideas.len(), groups.len() * 5);
        assert!(deps.storage.get_report(batch.id).await.unwrap().is_some());

        // Lock released on success.
        assert!(!deps.cache.exists(&lock_key(batch.id)).await.unwrap());
    }

    #[tokio::test]
    async fn held_lock_rejects_a_second_run() {
        let deps = test_deps().await;
        let batch = seeded_batch(&deps, "U1").await;

        deps.cache
            .set_if_absent(&lock_key(batch.id), "1", Duration::from_secs(1800))
            .await
            .unwrap();

        let err = process_batch(&deps, "U1", batch.id, &SilentObserver)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::AlreadyProcessing { .. }));

        // The existing lock survives and the batch was never touched.
        assert!(deps.cache.exists(&lock_key(batch.id)).await.unwrap());
        let stored = deps.storage.get_batch(batch.id).await.unwrap().unwrap();
        assert_eq!(stored.status, BatchStatus::Uploaded);
    }

    #[tokio::test]
    async fn missing_batch_and_wrong_owner_are_distinct() {
        let deps = test_deps().await;
        let batch = seeded_batch(&deps, "U1").await;

        let err = process_batch(&deps, "U1", BatchId::new(), &SilentObserver)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::NotFound { .. }));

        let err = process_batch(&deps, "U2", batch.id, &SilentObserver)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Unauthorized));
    }

    #[tokio::test]
    async fn rate_limit_rejects_excess_requests() {
        let mut config = PipelineConfig::default();
        config.rate_limit_max = 1;
        let deps = test_deps_with(None, config).await;
        let batch = seeded_batch(&deps, "U1").await;

        process_batch(&deps, "U1", batch.id, &SilentObserver)
            .await
            .expect("first run");

        let err = process_batch(&deps, "U1", batch.id, &SilentObserver)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::RateLimited { .. }));
    }

    #[tokio::test]
    async fn stage_failure_marks_batch_failed_and_releases_lock() {
        let deps =
            test_deps_with(Some(Arc::new(FailingOutlineSource)), PipelineConfig::default())
                .await;
        let batch = seeded_batch(&deps, "U1").await;

        let err = process_batch(&deps, "U1", batch.id, &SilentObserver)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Research(_)));

        let stored = deps.storage.get_batch(batch.id).await.unwrap().unwrap();
        assert_eq!(stored.status, BatchStatus::Failed);
        assert!(!deps.cache.exists(&lock_key(batch.id)).await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn outline_timeout_downgrades_to_fallback() {
        let mut config = PipelineConfig::default();
        config.outline_timeout = Duration::from_secs(5);
        let deps = test_deps_with(Some(Arc::new(SlowOutlineSource)), config).await;
        let batch = seeded_batch(&deps, "U1").await;

        let outcome = process_batch(&deps, "U1", batch.id, &SilentObserver)
            .await
            .expect("pipeline");
        assert!(outcome.group_count >= 1);

        let groups = deps.storage.list_groups_by_batch(batch.id).await.unwrap();
        for group in groups {
            let outline = deps
                .storage
                .get_outline_by_group(group.id)
                .await
                .unwrap()
                .expect("fallback outline persisted");
            assert_eq!(outline.content.estimated_word_count, 1500);
        }
    }

    #[tokio::test]
    async fn regenerate_overwrites_outlines_in_place() {
        let deps = test_deps().await;
        let batch = seeded_batch(&deps, "U1").await;
        process_batch(&deps, "U1", batch.id, &SilentObserver)
            .await
            .unwrap();

        let groups = deps.storage.list_groups_by_batch(batch.id).await.unwrap();
        let before = deps
            .storage
            .get_outline_by_group(groups[0].id)
            .await
            .unwrap()
            .unwrap();

        let written = regenerate_outlines(&deps, "U1", batch.id).await.unwrap();
        assert_eq!(written, groups.len());

        let after = deps
            .storage
            .get_outline_by_group(groups[0].id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(after.id, before.id);
    }

    #[tokio::test]
    async fn regenerate_requires_groups_and_a_free_batch() {
        let deps = test_deps().await;
        let batch = seeded_batch(&deps, "U1").await;

        // Nothing grouped yet.
        let err = regenerate_outlines(&deps, "U1", batch.id).await.unwrap_err();
        assert!(matches!(err, PipelineError::NotFound { .. }));

        process_batch(&deps, "U1", batch.id, &SilentObserver)
            .await
            .unwrap();

        // A full run's lock blocks regeneration.
        deps.cache
            .set_if_absent(&lock_key(batch.id), "1", Duration::from_secs(1800))
            .await
            .unwrap();
        let err = regenerate_outlines(&deps, "U1", batch.id).await.unwrap_err();
        assert!(matches!(err, PipelineError::AlreadyProcessing { .. }));

        // Ownership still applies.
        let err = regenerate_outlines(&deps, "U2", batch.id).await.unwrap_err();
        assert!(matches!(err, PipelineError::Unauthorized));
    }
}
