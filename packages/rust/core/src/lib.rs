//! Batch orchestration for KeywordForge.
//!
//! This crate ties normalization, grouping, research, ideation, and report
//! rendering into the four-stage batch pipeline, guarded by the per-batch
//! processing lock. It also owns batch intake, the submission queue, and
//! the read surface the front end serves batches from.

pub mod intake;
pub mod pipeline;
pub mod queue;
pub mod reads;

pub use intake::upload_batch;
pub use pipeline::{
    OutlineSource, PipelineDeps, PipelineObserver, PipelineOutcome, SilentObserver, Stage,
    process_batch, regenerate_outlines,
};
pub use queue::PipelineQueue;
pub use reads::{get_batch, get_batch_groups, get_report, list_history};
