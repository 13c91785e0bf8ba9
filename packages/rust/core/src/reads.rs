//! Read surface over the store, with the same ownership checks as the
//! pipeline. The front end renders batches, groups, and reports from here.

use keywordforge_shared::{BatchId, KeywordBatch, KeywordGroup, Report, Result};

use crate::pipeline::{PipelineDeps, authorized_batch};

/// Fetch a batch the user owns.
pub async fn get_batch(
    deps: &PipelineDeps,
    user_id: &str,
    batch_id: BatchId,
) -> Result<KeywordBatch> {
    authorized_batch(deps, user_id, batch_id).await
}

/// Fetch the groups of a batch the user owns.
pub async fn get_batch_groups(
    deps: &PipelineDeps,
    user_id: &str,
    batch_id: BatchId,
) -> Result<Vec<KeywordGroup>> {
    authorized_batch(deps, user_id, batch_id).await?;
    deps.storage.list_groups_by_batch(batch_id).await
}

/// Fetch the latest report of a batch the user owns, if one exists.
pub async fn get_report(
    deps: &PipelineDeps,
    user_id: &str,
    batch_id: BatchId,
) -> Result<Option<Report>> {
    authorized_batch(deps, user_id, batch_id).await?;
    deps.storage.get_report(batch_id).await
}

/// The user's most recent batches, newest first.
pub async fn list_history(
    deps: &PipelineDeps,
    user_id: &str,
    limit: u32,
) -> Result<Vec<KeywordBatch>> {
    deps.storage.list_history(user_id, limit).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::upload_batch;
    use crate::pipeline::{OutlineSource, SilentObserver, process_batch};
    use async_trait::async_trait;
    use keywordforge_cache::InMemoryCache;
    use keywordforge_grouping::{HashEmbedder, KeywordGrouper};
    use keywordforge_report::FileReportSink;
    use keywordforge_research::fallback_outline;
    use keywordforge_shared::{BatchSource, OutlineDraft, PipelineConfig, PipelineError};
    use keywordforge_storage::Storage;
    use std::sync::Arc;
    use uuid::Uuid;

    struct OfflineOutlineSource;

    #[async_trait]
    impl OutlineSource for OfflineOutlineSource {
        async fn generate(&self, keywords: &[String]) -> Result<OutlineDraft> {
            Ok(fallback_outline(keywords))
        }
    }

    async fn test_deps() -> PipelineDeps {
        PipelineDeps {
            storage: Arc::new(Storage::open_in_memory().await.unwrap()),
            cache: Arc::new(InMemoryCache::new()),
            grouper: Arc::new(KeywordGrouper::new(Box::new(HashEmbedder::new(64)), 20)),
            outline_source: Arc::new(OfflineOutlineSource),
            report_sink: Arc::new(FileReportSink::new(
                std::env::temp_dir().join(format!("kf_reads_{}", Uuid::now_v7())),
                false,
            )),
            config: PipelineConfig::default(),
        }
    }

    #[tokio::test]
    async fn read_surface_enforces_ownership() {
        let deps = test_deps().await;
        let batch = upload_batch(&deps, "U1", "seo tools, seo audit", BatchSource::Text)
            .await
            .unwrap();
        process_batch(&deps, "U1", batch.id, &SilentObserver)
            .await
            .unwrap();

        let fetched = get_batch(&deps, "U1", batch.id).await.unwrap();
        assert_eq!(fetched.id, batch.id);

        let groups = get_batch_groups(&deps, "U1", batch.id).await.unwrap();
        assert!(!groups.is_empty());

        let report = get_report(&deps, "U1", batch.id).await.unwrap();
        assert!(report.is_some());

        for err in [
            get_batch(&deps, "U2", batch.id).await.unwrap_err(),
            get_batch_groups(&deps, "U2", batch.id).await.unwrap_err(),
            get_report(&deps, "U2", batch.id).await.unwrap_err(),
        ] {
            assert!(matches!(err, PipelineError::Unauthorized));
        }
    }

    #[tokio::test]
    async fn history_lists_only_the_users_batches() {
        let deps = test_deps().await;
        upload_batch(&deps, "U1", "seo tools", BatchSource::Text)
            .await
            .unwrap();
        upload_batch(&deps, "U2", "link building", BatchSource::Text)
            .await
            .unwrap();

        let history = list_history(&deps, "U1", 5).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].user_id, "U1");
    }
}
