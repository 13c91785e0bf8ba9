//! Batch intake: raw user input → persisted `Uploaded` batch.

use tracing::{info, warn};

use keywordforge_keywords::{parse, parse_csv};
use keywordforge_shared::{BatchSource, KeywordBatch, PipelineError, Result};

use crate::pipeline::PipelineDeps;

/// Normalize raw text or CSV content and persist a new batch for the user.
///
/// Empty input (or input where nothing survives validation) is an
/// [`PipelineError::Validation`] the front end renders as "no keywords
/// found". Batches over the configured keyword cap are truncated, not
/// rejected.
pub async fn upload_batch(
    deps: &PipelineDeps,
    user_id: &str,
    content: &str,
    source: BatchSource,
) -> Result<KeywordBatch> {
    let mut keywords = match source {
        BatchSource::Text => parse(content),
        BatchSource::Csv => parse_csv(content),
    };

    if keywords.is_empty() {
        return Err(PipelineError::validation("no keywords found in input"));
    }

    let cap = deps.config.max_keywords_per_batch;
    if keywords.len() > cap {
        warn!(
            submitted = keywords.len(),
            cap, "keyword cap exceeded, truncating batch"
        );
        keywords.truncate(cap);
    }

    let batch = KeywordBatch::new(user_id, keywords, source)?;
    deps.storage.create_batch(&batch).await?;

    info!(
        batch_id = %batch.id,
        keywords = batch.keyword_count,
        source = %batch.source,
        "batch uploaded"
    );
    Ok(batch)
}
