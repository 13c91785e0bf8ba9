//! Shared types, error model, and configuration for KeywordForge.
//!
//! This crate is the foundation depended on by all other KeywordForge crates.
//! It provides:
//! - [`PipelineError`] — the unified error type
//! - Domain types ([`KeywordBatch`], [`KeywordGroup`], [`Outline`], [`PostIdea`], [`Report`])
//! - Configuration ([`AppConfig`], [`PipelineConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, EmbeddingConfig, PipelineConfig, ProcessingConfig, RateLimitConfig, ReportConfig,
    SearchConfig, StorageConfig, config_dir, config_file_path, expand_home, init_config,
    load_config, load_config_from, search_api_key,
};
pub use error::{PipelineError, Result};
pub use types::{
    BatchId, BatchSource, BatchStatus, ContentType, Difficulty, GroupId, KeywordBatch,
    KeywordGroup, MAX_KEYWORD_LEN, MIN_KEYWORD_LEN, Outline, OutlineDraft, OutlineId,
    OutlineSection, PostIdea, Report, ReportId,
};
