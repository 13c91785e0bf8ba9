//! libSQL storage layer for KeywordForge.
//!
//! The [`Storage`] struct wraps a local libSQL database holding batches,
//! keyword groups, outlines, post ideas, and report references. Migrations
//! are baked in and applied on open. Keyword lists and outline content are
//! stored as JSON columns; everything else is flat.
//!
//! All writes to a given batch's records happen from within that batch's
//! single pipeline run, so the store needs no locking of its own.

mod migrations;

use std::path::Path;

use chrono::{DateTime, Utc};
use libsql::{Connection, Database, params};

use keywordforge_shared::{
    BatchId, BatchStatus, GroupId, KeywordBatch, KeywordGroup, Outline, OutlineDraft, OutlineId,
    PipelineError, PostIdea, Report, Result,
};

/// Primary storage handle wrapping a libSQL database.
pub struct Storage {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
}

impl Storage {
    /// Open or create a database at `path`.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| PipelineError::Storage(e.to_string()))?;

        Self::from_db(db).await
    }

    /// Open a fresh in-memory database. Used by tests and dry runs.
    pub async fn open_in_memory() -> Result<Self> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| PipelineError::Storage(e.to_string()))?;

        Self::from_db(db).await
    }

    async fn from_db(db: Database) -> Result<Self> {
        let conn = db
            .connect()
            .map_err(|e| PipelineError::Storage(e.to_string()))?;

        let storage = Self { db, conn };
        storage.run_migrations().await?;
        Ok(storage)
    }

    /// Run pending schema migrations.
    async fn run_migrations(&self) -> Result<()> {
        let current_version = self.get_schema_version().await;

        for migration in migrations::all_migrations() {
            if migration.version > current_version {
                tracing::info!(
                    version = migration.version,
                    description = migration.description,
                    "applying migration"
                );
                self.conn.execute_batch(migration.sql).await.map_err(|e| {
                    PipelineError::Storage(format!(
                        "migration v{} failed: {e}",
                        migration.version
                    ))
                })?;
            }
        }
        Ok(())
    }

    /// Get the current schema version, or 0 if no migrations have been applied.
    async fn get_schema_version(&self) -> u32 {
        let result = self
            .conn
            .query("SELECT MAX(version) FROM schema_migrations", params![])
            .await;

        match result {
            Ok(mut rows) => {
                if let Ok(Some(row)) = rows.next().await {
                    row.get::<u32>(0).unwrap_or(0)
                } else {
                    0
                }
            }
            Err(_) => 0, // Table doesn't exist yet
        }
    }

    // -----------------------------------------------------------------------
    // Batch operations
    // -----------------------------------------------------------------------

    /// Insert a new batch record.
    pub async fn create_batch(&self, batch: &KeywordBatch) -> Result<()> {
        let keywords_json = serde_json::to_string(&batch.keywords)
            .map_err(|e| PipelineError::Conversion(e.to_string()))?;
        self.conn
            .execute(
                "INSERT INTO batches (id, user_id, keywords_json, keyword_count, status, source,
                                      created_at, updated_at, completed_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    batch.id.to_string(),
                    batch.user_id.as_str(),
                    keywords_json.as_str(),
                    batch.keyword_count as i64,
                    batch.status.as_str(),
                    batch.source.as_str(),
                    batch.created_at.to_rfc3339(),
                    batch.updated_at.to_rfc3339(),
                    batch.completed_at.map(|t| t.to_rfc3339()),
                ],
            )
            .await
            .map_err(|e| PipelineError::Storage(e.to_string()))?;
        Ok(())
    }

    /// Get a batch by ID.
    pub async fn get_batch(&self, id: BatchId) -> Result<Option<KeywordBatch>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, user_id, keywords_json, keyword_count, status, source,
                        created_at, updated_at, completed_at
                 FROM batches WHERE id = ?1",
                params![id.to_string()],
            )
            .await
            .map_err(|e| PipelineError::Storage(e.to_string()))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_batch(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(PipelineError::Storage(e.to_string())),
        }
    }

    /// Update a batch's status, stamping `updated_at` and, when given,
    /// `completed_at`.
    pub async fn update_batch_status(
        &self,
        id: BatchId,
        status: BatchStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.conn
            .execute(
                "UPDATE batches SET status = ?1, updated_at = ?2,
                        completed_at = COALESCE(?3, completed_at)
                 WHERE id = ?4",
                params![
                    status.as_str(),
                    now.as_str(),
                    completed_at.map(|t| t.to_rfc3339()),
                    id.to_string(),
                ],
            )
            .await
            .map_err(|e| PipelineError::Storage(e.to_string()))?;
        Ok(())
    }

    /// List a user's most recent batches, newest first.
    pub async fn list_history(&self, user_id: &str, limit: u32) -> Result<Vec<KeywordBatch>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, user_id, keywords_json, keyword_count, status, source,
                        created_at, updated_at, completed_at
                 FROM batches WHERE user_id = ?1
                 ORDER BY created_at DESC
                 LIMIT ?2",
                params![user_id, limit],
            )
            .await
            .map_err(|e| PipelineError::Storage(e.to_string()))?;

        let mut results = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            results.push(row_to_batch(&row)?);
        }
        Ok(results)
    }

    // -----------------------------------------------------------------------
    // Group operations
    // -----------------------------------------------------------------------

    /// Insert a new group record.
    pub async fn create_group(&self, group: &KeywordGroup) -> Result<()> {
        let keywords_json = serde_json::to_string(&group.keywords)
            .map_err(|e| PipelineError::Conversion(e.to_string()))?;
        self.conn
            .execute(
                "INSERT INTO groups (id, batch_id, name, keywords_json, score, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    group.id.to_string(),
                    group.batch_id.to_string(),
                    group.name.as_str(),
                    keywords_json.as_str(),
                    group.score,
                    group.created_at.to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| PipelineError::Storage(e.to_string()))?;
        Ok(())
    }

    /// List all groups for a batch, in creation order.
    pub async fn list_groups_by_batch(&self, batch_id: BatchId) -> Result<Vec<KeywordGroup>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, batch_id, name, keywords_json, score, created_at
                 FROM groups WHERE batch_id = ?1 ORDER BY id",
                params![batch_id.to_string()],
            )
            .await
            .map_err(|e| PipelineError::Storage(e.to_string()))?;

        let mut results = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            results.push(row_to_group(&row)?);
        }
        Ok(results)
    }

    // -----------------------------------------------------------------------
    // Outline operations
    // -----------------------------------------------------------------------

    /// Insert a new outline. The `group_id` column is unique, so callers
    /// check for an existing outline first and use [`Self::update_outline`]
    /// to overwrite it.
    pub async fn create_outline(&self, outline: &Outline) -> Result<()> {
        let content_json = serde_json::to_string(&outline.content)
            .map_err(|e| PipelineError::Conversion(e.to_string()))?;
        self.conn
            .execute(
                "INSERT INTO outlines (id, group_id, content_json, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    outline.id.to_string(),
                    outline.group_id.to_string(),
                    content_json.as_str(),
                    outline.created_at.to_rfc3339(),
                    outline.updated_at.to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| PipelineError::Storage(e.to_string()))?;
        Ok(())
    }

    /// Overwrite a group's outline content in place.
    pub async fn update_outline(&self, group_id: GroupId, content: &OutlineDraft) -> Result<()> {
        let content_json = serde_json::to_string(content)
            .map_err(|e| PipelineError::Conversion(e.to_string()))?;
        let now = Utc::now().to_rfc3339();
        self.conn
            .execute(
                "UPDATE outlines SET content_json = ?1, updated_at = ?2 WHERE group_id = ?3",
                params![content_json.as_str(), now.as_str(), group_id.to_string()],
            )
            .await
            .map_err(|e| PipelineError::Storage(e.to_string()))?;
        Ok(())
    }

    /// Get the outline for a group, if one has been generated.
    pub async fn get_outline_by_group(&self, group_id: GroupId) -> Result<Option<Outline>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, group_id, content_json, created_at, updated_at
                 FROM outlines WHERE group_id = ?1",
                params![group_id.to_string()],
            )
            .await
            .map_err(|e| PipelineError::Storage(e.to_string()))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_outline(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(PipelineError::Storage(e.to_string())),
        }
    }

    // -----------------------------------------------------------------------
    // Post idea operations
    // -----------------------------------------------------------------------

    /// Insert a post idea record.
    pub async fn create_idea(&self, idea: &PostIdea) -> Result<()> {
        let targets_json = serde_json::to_string(&idea.target_keywords)
            .map_err(|e| PipelineError::Conversion(e.to_string()))?;
        self.conn
            .execute(
                "INSERT INTO post_ideas (id, group_id, title, content_type,
                                         target_keywords_json, estimated_word_count,
                                         difficulty, description)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    idea.id.as_str(),
                    idea.group_id.to_string(),
                    idea.title.as_str(),
                    idea.content_type.as_str(),
                    targets_json.as_str(),
                    i64::from(idea.estimated_word_count),
                    idea.difficulty.as_str(),
                    idea.description.as_str(),
                ],
            )
            .await
            .map_err(|e| PipelineError::Storage(e.to_string()))?;
        Ok(())
    }

    /// List all ideas for a batch, grouped by their owning group.
    pub async fn list_ideas_by_batch(&self, batch_id: BatchId) -> Result<Vec<PostIdea>> {
        let mut rows = self
            .conn
            .query(
                "SELECT i.id, i.group_id, i.title, i.content_type, i.target_keywords_json,
                        i.estimated_word_count, i.difficulty, i.description
                 FROM post_ideas i
                 JOIN groups g ON g.id = i.group_id
                 WHERE g.batch_id = ?1
                 ORDER BY i.group_id, i.id",
                params![batch_id.to_string()],
            )
            .await
            .map_err(|e| PipelineError::Storage(e.to_string()))?;

        let mut results = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            results.push(row_to_idea(&row)?);
        }
        Ok(results)
    }

    // -----------------------------------------------------------------------
    // Report operations
    // -----------------------------------------------------------------------

    /// Insert a report reference.
    pub async fn create_report(&self, report: &Report) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO reports (id, batch_id, download_url, email_sent,
                                      group_count, idea_count, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    report.id.to_string(),
                    report.batch_id.to_string(),
                    report.download_url.as_str(),
                    i64::from(report.email_sent),
                    report.group_count as i64,
                    report.idea_count as i64,
                    report.created_at.to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| PipelineError::Storage(e.to_string()))?;
        Ok(())
    }

    /// Get the most recent report for a batch.
    pub async fn get_report(&self, batch_id: BatchId) -> Result<Option<Report>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, batch_id, download_url, email_sent, group_count, idea_count,
                        created_at
                 FROM reports WHERE batch_id = ?1
                 ORDER BY created_at DESC LIMIT 1",
                params![batch_id.to_string()],
            )
            .await
            .map_err(|e| PipelineError::Storage(e.to_string()))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_report(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(PipelineError::Storage(e.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Row converters
// ---------------------------------------------------------------------------

fn get_string(row: &libsql::Row, idx: i32) -> Result<String> {
    row.get::<String>(idx)
        .map_err(|e| PipelineError::Storage(e.to_string()))
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| PipelineError::Storage(format!("invalid timestamp: {e}")))
}

fn parse_json_list(s: &str) -> Result<Vec<String>> {
    serde_json::from_str(s).map_err(|e| PipelineError::Conversion(e.to_string()))
}

fn row_to_batch(row: &libsql::Row) -> Result<KeywordBatch> {
    Ok(KeywordBatch {
        id: get_string(row, 0)?
            .parse()
            .map_err(|e| PipelineError::Storage(format!("invalid batch id: {e}")))?,
        user_id: get_string(row, 1)?,
        keywords: parse_json_list(&get_string(row, 2)?)?,
        keyword_count: row
            .get::<i64>(3)
            .map_err(|e| PipelineError::Storage(e.to_string()))? as usize,
        status: get_string(row, 4)?.parse()?,
        source: get_string(row, 5)?.parse()?,
        created_at: parse_timestamp(&get_string(row, 6)?)?,
        updated_at: parse_timestamp(&get_string(row, 7)?)?,
        completed_at: match row.get::<String>(8) {
            Ok(s) => Some(parse_timestamp(&s)?),
            Err(_) => None,
        },
    })
}

fn row_to_group(row: &libsql::Row) -> Result<KeywordGroup> {
    Ok(KeywordGroup {
        id: get_string(row, 0)?
            .parse()
            .map_err(|e| PipelineError::Storage(format!("invalid group id: {e}")))?,
        batch_id: get_string(row, 1)?
            .parse()
            .map_err(|e| PipelineError::Storage(format!("invalid batch id: {e}")))?,
        name: get_string(row, 2)?,
        keywords: parse_json_list(&get_string(row, 3)?)?,
        score: row
            .get::<f64>(4)
            .map_err(|e| PipelineError::Storage(e.to_string()))?,
        created_at: parse_timestamp(&get_string(row, 5)?)?,
    })
}

fn row_to_outline(row: &libsql::Row) -> Result<Outline> {
    let content: OutlineDraft = serde_json::from_str(&get_string(row, 2)?)
        .map_err(|e| PipelineError::Conversion(e.to_string()))?;
    Ok(Outline {
        id: get_string(row, 0)?
            .parse::<OutlineId>()
            .map_err(|e| PipelineError::Storage(format!("invalid outline id: {e}")))?,
        group_id: get_string(row, 1)?
            .parse()
            .map_err(|e| PipelineError::Storage(format!("invalid group id: {e}")))?,
        content,
        created_at: parse_timestamp(&get_string(row, 3)?)?,
        updated_at: parse_timestamp(&get_string(row, 4)?)?,
    })
}

fn row_to_idea(row: &libsql::Row) -> Result<PostIdea> {
    Ok(PostIdea {
        id: get_string(row, 0)?,
        group_id: get_string(row, 1)?
            .parse()
            .map_err(|e| PipelineError::Storage(format!("invalid group id: {e}")))?,
        title: get_string(row, 2)?,
        content_type: get_string(row, 3)?.parse()?,
        target_keywords: parse_json_list(&get_string(row, 4)?)?,
        estimated_word_count: row
            .get::<i64>(5)
            .map_err(|e| PipelineError::Storage(e.to_string()))? as u32,
        difficulty: get_string(row, 6)?.parse()?,
        description: get_string(row, 7)?,
    })
}

fn row_to_report(row: &libsql::Row) -> Result<Report> {
    Ok(Report {
        id: get_string(row, 0)?
            .parse()
            .map_err(|e| PipelineError::Storage(format!("invalid report id: {e}")))?,
        batch_id: get_string(row, 1)?
            .parse()
            .map_err(|e| PipelineError::Storage(format!("invalid batch id: {e}")))?,
        download_url: get_string(row, 2)?,
        email_sent: row
            .get::<i64>(3)
            .map_err(|e| PipelineError::Storage(e.to_string()))?
            != 0,
        group_count: row
            .get::<i64>(4)
            .map_err(|e| PipelineError::Storage(e.to_string()))? as usize,
        idea_count: row
            .get::<i64>(5)
            .map_err(|e| PipelineError::Storage(e.to_string()))? as usize,
        created_at: parse_timestamp(&get_string(row, 6)?)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use keywordforge_shared::{BatchSource, ContentType, Difficulty, OutlineSection, ReportId};
    use uuid::Uuid;

    async fn test_storage() -> Storage {
        Storage::open_in_memory().await.expect("open test db")
    }

    fn sample_batch() -> KeywordBatch {
        KeywordBatch::new(
            "U123",
            vec!["keyword research".into(), "seo tools".into()],
            BatchSource::Text,
        )
        .unwrap()
    }

    fn sample_draft(title: &str) -> OutlineDraft {
        OutlineDraft {
            title: title.into(),
            meta_description: "Learn about keyword research.".into(),
            target_keywords: vec!["keyword research".into()],
            estimated_word_count: 2000,
            sections: vec![OutlineSection {
                heading: "Introduction".into(),
                level: 2,
                description: None,
                estimated_words: 200,
            }],
        }
    }

    #[tokio::test]
    async fn open_and_migrate() {
        let storage = test_storage().await;
        assert_eq!(storage.get_schema_version().await, 1);
    }

    #[tokio::test]
    async fn idempotent_migration_on_reopen() {
        let tmp = std::env::temp_dir().join(format!("kf_test_{}.db", Uuid::now_v7()));
        let s1 = Storage::open(&tmp).await.expect("first open");
        drop(s1);
        let s2 = Storage::open(&tmp).await.expect("second open");
        assert_eq!(s2.get_schema_version().await, 1);
    }

    #[tokio::test]
    async fn batch_roundtrip_and_status_update() {
        let storage = test_storage().await;
        let batch = sample_batch();
        storage.create_batch(&batch).await.expect("create batch");

        let found = storage.get_batch(batch.id).await.unwrap().expect("batch");
        assert_eq!(found.user_id, "U123");
        assert_eq!(found.keywords, batch.keywords);
        assert_eq!(found.keyword_count, 2);
        assert_eq!(found.status, BatchStatus::Uploaded);
        assert_eq!(found.source, BatchSource::Text);
        assert!(found.completed_at.is_none());

        storage
            .update_batch_status(batch.id, BatchStatus::Processing, None)
            .await
            .unwrap();
        let found = storage.get_batch(batch.id).await.unwrap().unwrap();
        assert_eq!(found.status, BatchStatus::Processing);
        assert!(found.completed_at.is_none());

        let done_at = Utc::now();
        storage
            .update_batch_status(batch.id, BatchStatus::Completed, Some(done_at))
            .await
            .unwrap();
        let found = storage.get_batch(batch.id).await.unwrap().unwrap();
        assert_eq!(found.status, BatchStatus::Completed);
        assert!(found.completed_at.is_some());
    }

    #[tokio::test]
    async fn missing_batch_is_none() {
        let storage = test_storage().await;
        assert!(storage.get_batch(BatchId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn history_is_per_user_newest_first() {
        let storage = test_storage().await;

        let mut mine = sample_batch();
        mine.user_id = "U1".into();
        let mut newer = sample_batch();
        newer.user_id = "U1".into();
        newer.created_at = mine.created_at + chrono::Duration::seconds(5);
        let mut theirs = sample_batch();
        theirs.user_id = "U2".into();

        for batch in [&mine, &newer, &theirs] {
            storage.create_batch(batch).await.unwrap();
        }

        let history = storage.list_history("U1", 5).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id, newer.id);
        assert_eq!(history[1].id, mine.id);

        let limited = storage.list_history("U1", 1).await.unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[tokio::test]
    async fn groups_roundtrip() {
        let storage = test_storage().await;
        let batch = sample_batch();
        storage.create_batch(&batch).await.unwrap();

        let g1 = KeywordGroup::new(
            batch.id,
            "keyword related",
            vec!["keyword research".into()],
            0.8,
        )
        .unwrap();
        let g2 = KeywordGroup::new(batch.id, "seo related", vec!["seo tools".into()], 0.5)
            .unwrap();
        storage.create_group(&g1).await.unwrap();
        storage.create_group(&g2).await.unwrap();

        let groups = storage.list_groups_by_batch(batch.id).await.unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name, "keyword related");
        assert_eq!(groups[0].score, 0.8);
        assert_eq!(groups[1].keywords, vec!["seo tools"]);

        let other = storage.list_groups_by_batch(BatchId::new()).await.unwrap();
        assert!(other.is_empty());
    }

    #[tokio::test]
    async fn outline_create_then_overwrite() {
        let storage = test_storage().await;
        let batch = sample_batch();
        storage.create_batch(&batch).await.unwrap();
        let group = KeywordGroup::new(
            batch.id,
            "keyword related",
            vec!["keyword research".into()],
            0.8,
        )
        .unwrap();
        storage.create_group(&group).await.unwrap();

        assert!(storage
            .get_outline_by_group(group.id)
            .await
            .unwrap()
            .is_none());

        let outline = Outline::new(group.id, sample_draft("First Draft"));
        storage.create_outline(&outline).await.unwrap();

        let found = storage
            .get_outline_by_group(group.id)
            .await
            .unwrap()
            .expect("outline");
        assert_eq!(found.content.title, "First Draft");
        assert_eq!(found.content.sections.len(), 1);

        storage
            .update_outline(group.id, &sample_draft("Second Draft"))
            .await
            .unwrap();
        let found = storage.get_outline_by_group(group.id).await.unwrap().unwrap();
        assert_eq!(found.content.title, "Second Draft");
        // Same record, regenerated in place.
        assert_eq!(found.id, outline.id);
        assert!(found.updated_at >= found.created_at);
    }

    #[tokio::test]
    async fn ideas_list_by_batch_via_groups() {
        let storage = test_storage().await;
        let batch = sample_batch();
        storage.create_batch(&batch).await.unwrap();
        let group = KeywordGroup::new(
            batch.id,
            "keyword related",
            vec!["keyword research".into()],
            0.8,
        )
        .unwrap();
        storage.create_group(&group).await.unwrap();

        let idea = PostIdea {
            id: format!("idea_{}_listicle", group.id),
            group_id: group.id,
            title: "10 Essential keyword research Tips".into(),
            content_type: ContentType::Listicle,
            target_keywords: vec!["keyword research".into()],
            estimated_word_count: 1200,
            difficulty: Difficulty::Medium,
            description: "An engaging list-format article.".into(),
        };
        storage.create_idea(&idea).await.unwrap();

        let ideas = storage.list_ideas_by_batch(batch.id).await.unwrap();
        assert_eq!(ideas.len(), 1);
        assert_eq!(ideas[0].content_type, ContentType::Listicle);
        assert_eq!(ideas[0].difficulty, Difficulty::Medium);
        assert_eq!(ideas[0].target_keywords, vec!["keyword research"]);
    }

    #[tokio::test]
    async fn latest_report_wins() {
        let storage = test_storage().await;
        let batch = sample_batch();
        storage.create_batch(&batch).await.unwrap();

        let first = Report {
            id: ReportId::new(),
            batch_id: batch.id,
            download_url: "file:///tmp/one.md".into(),
            email_sent: false,
            group_count: 2,
            idea_count: 10,
            created_at: Utc::now(),
        };
        let second = Report {
            id: ReportId::new(),
            download_url: "file:///tmp/two.md".into(),
            email_sent: true,
            created_at: first.created_at + chrono::Duration::seconds(3),
            ..first.clone()
        };
        storage.create_report(&first).await.unwrap();
        storage.create_report(&second).await.unwrap();

        let found = storage.get_report(batch.id).await.unwrap().expect("report");
        assert_eq!(found.download_url, "file:///tmp/two.md");
        assert!(found.email_sent);
        assert_eq!(found.group_count, 2);
        assert_eq!(found.idea_count, 10);
    }
}
