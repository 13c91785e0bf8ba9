//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use keywordforge_cache::InMemoryCache;
use keywordforge_core::pipeline::{
    PipelineDeps, PipelineObserver, PipelineOutcome, Stage,
};
use keywordforge_core::{PipelineQueue, regenerate_outlines, upload_batch};
use keywordforge_grouping::{Embedder, HashEmbedder, KeywordGrouper};
use keywordforge_keywords::{classify_intent, compute_stats, difficulty_profile, KeywordTail};
use keywordforge_report::FileReportSink;
use keywordforge_research::{HttpSearchProvider, OutlineGenerator};
use keywordforge_shared::{
    AppConfig, BatchId, BatchSource, PipelineConfig, PipelineError, expand_home, init_config,
    load_config, search_api_key,
};
use keywordforge_storage::Storage;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// KeywordForge — cluster keywords into content plans.
#[derive(Parser)]
#[command(
    name = "keywordforge",
    version,
    about = "Group keywords by semantic similarity and turn them into outlines, post ideas, and a report.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// User identifier owning batches (defaults to "local").
    #[arg(long, env = "KEYWORDFORGE_USER", default_value = "local", global = true)]
    pub user: String,

    /// Database file path (overrides the config file).
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Upload keywords (inline text or a file) as a new batch.
    Upload {
        /// Keywords as inline text (comma/newline/semicolon/tab separated).
        text: Option<String>,

        /// Read keywords from a file instead.
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Treat the input as CSV (implied by a .csv file extension).
        #[arg(long)]
        csv: bool,
    },

    /// Run the full pipeline (group, outline, ideate, report) on a batch.
    Process {
        /// Batch ID from `upload`.
        batch_id: String,
    },

    /// Regenerate the outlines of an already-grouped batch.
    Regenerate {
        /// Batch ID from `upload`.
        batch_id: String,
    },

    /// List your most recent batches.
    History {
        /// How many batches to show.
        #[arg(short, long, default_value = "5")]
        limit: u32,
    },

    /// Show a batch, its groups, and its report if present.
    Show {
        /// Batch ID from `upload`.
        batch_id: String,
    },

    /// Print keyword statistics without persisting anything.
    Stats {
        /// Keywords as inline text.
        text: Option<String>,

        /// Read keywords from a file instead.
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Initialize the config file with defaults.
    InitConfig,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "keywordforge=info",
        1 => "keywordforge=debug",
        _ => "keywordforge=trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Upload { text, file, csv } => {
            cmd_upload(&cli.user, cli.db.as_deref(), text.as_deref(), file.as_deref(), csv).await
        }
        Command::Process { ref batch_id } => {
            cmd_process(&cli.user, cli.db.as_deref(), batch_id).await
        }
        Command::Regenerate { ref batch_id } => {
            cmd_regenerate(&cli.user, cli.db.as_deref(), batch_id).await
        }
        Command::History { limit } => cmd_history(&cli.user, cli.db.as_deref(), limit).await,
        Command::Show { ref batch_id } => cmd_show(&cli.user, cli.db.as_deref(), batch_id).await,
        Command::Stats { text, file } => cmd_stats(text.as_deref(), file.as_deref()),
        Command::InitConfig => cmd_init_config(),
    }
}

// ---------------------------------------------------------------------------
// Dependency wiring
// ---------------------------------------------------------------------------

/// Build the pipeline dependency set from config plus CLI overrides.
async fn build_deps(db_override: Option<&std::path::Path>) -> Result<PipelineDeps> {
    let config = load_config()?;

    let db_path = match db_override {
        Some(path) => path.to_path_buf(),
        None => expand_home(&config.storage.db_path)?,
    };
    let storage = Storage::open(&db_path).await?;

    let search =
        HttpSearchProvider::new(&config.search.endpoint, search_api_key(&config))?;
    let outline_source =
        OutlineGenerator::new(Box::new(search), config.search.result_count)?;

    let report_dir = expand_home(&config.report.output_dir)?;

    Ok(PipelineDeps {
        storage: Arc::new(storage),
        cache: Arc::new(InMemoryCache::new()),
        grouper: Arc::new(KeywordGrouper::new(
            build_embedder(&config),
            config.processing.max_groups_per_batch,
        )),
        outline_source: Arc::new(outline_source),
        report_sink: Arc::new(FileReportSink::new(report_dir, config.report.email_enabled)),
        config: PipelineConfig::from(&config),
    })
}

/// Pick the embedding backend from config.
fn build_embedder(config: &AppConfig) -> Box<dyn Embedder> {
    #[cfg(feature = "embeddings")]
    if config.embedding.model != "feature-hash" {
        match keywordforge_grouping::FastEmbedEmbedder::default_model() {
            Ok(embedder) => return Box::new(embedder),
            Err(e) => {
                tracing::warn!(error = %e, "fastembed init failed, using feature hashing")
            }
        }
    }

    Box::new(HashEmbedder::new(config.embedding.dimension))
}

fn parse_batch_id(raw: &str) -> Result<BatchId> {
    raw.parse()
        .map_err(|e| eyre!("invalid batch id '{raw}': {e}"))
}

/// Resolve inline text vs. file input, flagging CSV content.
fn read_input(
    text: Option<&str>,
    file: Option<&std::path::Path>,
    csv_flag: bool,
) -> Result<(String, BatchSource)> {
    match (file, text) {
        (Some(path), _) => {
            let content = std::fs::read_to_string(path)
                .map_err(|e| eyre!("cannot read '{}': {e}", path.display()))?;
            let is_csv = csv_flag
                || path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
            let source = if is_csv { BatchSource::Csv } else { BatchSource::Text };
            Ok((content, source))
        }
        (None, Some(text)) => {
            let source = if csv_flag { BatchSource::Csv } else { BatchSource::Text };
            Ok((text.to_string(), source))
        }
        (None, None) => Err(eyre!("provide keywords inline or via --file")),
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_upload(
    user: &str,
    db: Option<&std::path::Path>,
    text: Option<&str>,
    file: Option<&std::path::Path>,
    csv: bool,
) -> Result<()> {
    let (content, source) = read_input(text, file, csv)?;
    let deps = build_deps(db).await?;

    let batch = upload_batch(&deps, user, &content, source).await?;

    println!();
    println!("  Batch uploaded");
    println!("  ID:       {}", batch.id);
    println!("  Keywords: {}", batch.keyword_count);
    println!("  Source:   {}", batch.source);
    println!();
    println!("  Next: keywordforge process {}", batch.id);
    println!();

    Ok(())
}

async fn cmd_process(user: &str, db: Option<&std::path::Path>, batch_id: &str) -> Result<()> {
    let batch_id = parse_batch_id(batch_id)?;
    let deps = Arc::new(build_deps(db).await?);

    info!(%batch_id, user, "submitting batch for processing");

    let queue = PipelineQueue::new(Arc::clone(&deps));
    let observer = Arc::new(CliObserver::new());
    let handle = queue.submit(user.to_string(), batch_id, observer)?;

    let outcome = match handle.await.map_err(|e| eyre!("pipeline task panicked: {e}"))? {
        Ok(outcome) => outcome,
        Err(PipelineError::AlreadyProcessing { batch_id }) => {
            println!("Batch {batch_id} is already processing; try again once it finishes.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    println!();
    println!("  Batch processed");
    println!("  Groups: {}", outcome.group_count);
    println!("  Ideas:  {}", outcome.idea_count);
    println!("  Report: {}", outcome.download_url);
    if outcome.email_sent {
        println!("  Email:  sent");
    }
    println!("  Time:   {:.1}s", outcome.elapsed.as_secs_f64());
    println!();

    Ok(())
}

async fn cmd_regenerate(user: &str, db: Option<&std::path::Path>, batch_id: &str) -> Result<()> {
    let batch_id = parse_batch_id(batch_id)?;
    let deps = build_deps(db).await?;

    let count = regenerate_outlines(&deps, user, batch_id).await?;
    println!("Regenerated {count} outline(s) for batch {batch_id}.");
    Ok(())
}

async fn cmd_history(user: &str, db: Option<&std::path::Path>, limit: u32) -> Result<()> {
    let deps = build_deps(db).await?;
    let batches = keywordforge_core::list_history(&deps, user, limit).await?;

    if batches.is_empty() {
        println!("No batches yet. Start with: keywordforge upload \"keyword one, keyword two\"");
        return Ok(());
    }

    println!();
    for batch in batches {
        println!(
            "  {}  {:<10}  {:>4} keywords  {}",
            batch.id,
            batch.status,
            batch.keyword_count,
            batch.created_at.format("%Y-%m-%d %H:%M"),
        );
    }
    println!();
    Ok(())
}

async fn cmd_show(user: &str, db: Option<&std::path::Path>, batch_id: &str) -> Result<()> {
    let batch_id = parse_batch_id(batch_id)?;
    let deps = build_deps(db).await?;

    let batch = keywordforge_core::get_batch(&deps, user, batch_id).await?;
    let groups = keywordforge_core::get_batch_groups(&deps, user, batch_id).await?;
    let report = keywordforge_core::get_report(&deps, user, batch_id).await?;

    println!();
    println!("  Batch:    {}", batch.id);
    println!("  Status:   {}", batch.status);
    println!("  Keywords: {}", batch.keyword_count);
    println!("  Created:  {}", batch.created_at.format("%Y-%m-%d %H:%M"));
    if let Some(completed_at) = batch.completed_at {
        println!("  Finished: {}", completed_at.format("%Y-%m-%d %H:%M"));
    }

    if !groups.is_empty() {
        println!();
        println!("  Groups:");
        for group in &groups {
            println!(
                "    {} (confidence {:.1}): {}",
                group.name,
                group.score,
                group.keywords.join(", ")
            );
        }
    }

    if let Some(report) = report {
        println!();
        println!("  Report:  {}", report.download_url);
        println!(
            "  Email:   {}",
            if report.email_sent { "sent" } else { "not sent" }
        );
    }
    println!();
    Ok(())
}

fn cmd_stats(text: Option<&str>, file: Option<&std::path::Path>) -> Result<()> {
    let (content, source) = read_input(text, file, false)?;
    let keywords = match source {
        BatchSource::Csv => keywordforge_keywords::parse_csv(&content),
        BatchSource::Text => keywordforge_keywords::parse(&content),
    };

    if keywords.is_empty() {
        println!("No keywords found in input.");
        return Ok(());
    }

    let stats = compute_stats(&keywords);
    println!();
    println!("  Keywords:       {}", stats.total_count);
    println!("  Avg length:     {:.1} chars", stats.avg_length);
    println!("  Avg word count: {:.1}", stats.avg_words);
    println!("  Shortest:       {}", stats.shortest);
    println!("  Longest:        {}", stats.longest);

    println!();
    println!("  Word count distribution:");
    for (words, count) in &stats.word_count_distribution {
        println!("    {words} word(s): {count}");
    }

    let mut intents: std::collections::BTreeMap<&str, usize> = Default::default();
    let mut long_tail = 0usize;
    for keyword in &keywords {
        *intents.entry(classify_intent(keyword).as_str()).or_insert(0) += 1;
        if difficulty_profile(keyword).tail == KeywordTail::LongTail {
            long_tail += 1;
        }
    }

    println!();
    println!("  Search intent:");
    for (intent, count) in intents {
        println!("    {intent}: {count}");
    }
    println!(
        "  Long tail: {long_tail} of {} keywords",
        stats.total_count
    );
    println!();
    Ok(())
}

fn cmd_init_config() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress observer
// ---------------------------------------------------------------------------

/// Pipeline observer rendering stage progress with an indicatif spinner.
struct CliObserver {
    spinner: ProgressBar,
}

impl CliObserver {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl PipelineObserver for CliObserver {
    fn stage(&self, _batch_id: BatchId, stage: Stage, current: usize, total: usize) {
        self.spinner
            .set_message(format!("[{current}/{total}] {stage}"));
    }

    fn completed(&self, _outcome: &PipelineOutcome) {
        self.spinner.finish_and_clear();
    }

    fn failed(&self, _batch_id: BatchId, _error: &PipelineError) {
        self.spinner.finish_and_clear();
    }
}
