//! SQL migration definitions for the KeywordForge database.
//!
//! Migrations are applied in order on database open. Each migration has a
//! version number and a set of SQL statements executed within a transaction.

/// A database migration with a version and SQL statements.
pub(crate) struct Migration {
    pub version: u32,
    pub description: &'static str,
    pub sql: &'static str,
}

/// All migrations, in ascending version order.
pub(crate) fn all_migrations() -> Vec<Migration> {
    vec![Migration {
        version: 1,
        description: "Initial schema: batches, groups, outlines, post_ideas, reports",
        sql: r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_migrations (
    version   INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Keyword batches (one user submission each)
CREATE TABLE IF NOT EXISTS batches (
    id            TEXT PRIMARY KEY,
    user_id       TEXT NOT NULL,
    keywords_json TEXT NOT NULL,
    keyword_count INTEGER NOT NULL,
    status        TEXT NOT NULL,
    source        TEXT NOT NULL,
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL,
    completed_at  TEXT
);

CREATE INDEX IF NOT EXISTS idx_batches_user ON batches(user_id, created_at DESC);

-- Keyword groups (partition of a batch's keywords)
CREATE TABLE IF NOT EXISTS groups (
    id            TEXT PRIMARY KEY,
    batch_id      TEXT NOT NULL REFERENCES batches(id) ON DELETE CASCADE,
    name          TEXT NOT NULL,
    keywords_json TEXT NOT NULL,
    score         REAL NOT NULL,
    created_at    TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_groups_batch ON groups(batch_id);

-- Content outlines, one per group, overwritten on regenerate
CREATE TABLE IF NOT EXISTS outlines (
    id           TEXT PRIMARY KEY,
    group_id     TEXT NOT NULL UNIQUE REFERENCES groups(id) ON DELETE CASCADE,
    content_json TEXT NOT NULL,
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL
);

-- Post ideas, several per group
CREATE TABLE IF NOT EXISTS post_ideas (
    id                   TEXT PRIMARY KEY,
    group_id             TEXT NOT NULL REFERENCES groups(id) ON DELETE CASCADE,
    title                TEXT NOT NULL,
    content_type         TEXT NOT NULL,
    target_keywords_json TEXT NOT NULL,
    estimated_word_count INTEGER NOT NULL,
    difficulty           TEXT NOT NULL,
    description          TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_post_ideas_group ON post_ideas(group_id);

-- Rendered report references, latest per batch wins
CREATE TABLE IF NOT EXISTS reports (
    id           TEXT PRIMARY KEY,
    batch_id     TEXT NOT NULL REFERENCES batches(id) ON DELETE CASCADE,
    download_url TEXT NOT NULL,
    email_sent   INTEGER NOT NULL,
    group_count  INTEGER NOT NULL,
    idea_count   INTEGER NOT NULL,
    created_at   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_reports_batch ON reports(batch_id, created_at DESC);

INSERT INTO schema_migrations (version) VALUES (1);
"#,
    }]
}
