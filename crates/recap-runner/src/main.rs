//! # recap-runner
//!
//! Thin adapter between a cron-like scheduler and the compaction engine.
//! Each invocation loads settings, opens the database, builds the HTTP
//! summarizer, populates the job registry, dispatches one job by name, and
//! exits. Overlap protection beyond the engine's debounce is the
//! scheduler's responsibility (a single cron entry suffices).

#![deny(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use recap_engine::{
    CompactionEngine, CompactionJob, EngineConfig, JobRegistry, StageTransition,
};
use recap_llm::{HttpSummarizer, HttpSummarizerConfig};
use recap_settings::{EngineSettings, RecapSettings, load_settings, load_settings_from_path};
use recap_store::SqliteStore;

/// Recap job runner.
#[derive(Parser, Debug)]
#[command(name = "recap-runner", about = "Recap memory compaction job runner")]
struct Cli {
    /// Path to the settings file (defaults to `~/.recap/settings.json`).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Path to the `SQLite` database (overrides settings if specified).
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Job to dispatch.
    #[arg(long, default_value = CompactionJob::NAME)]
    job: String,
}

fn default_db_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".recap").join("recap.db")
}

fn ensure_parent_dir(path: &std::path::Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}

/// Map file/env settings onto the engine's validated configuration.
fn engine_config(settings: &EngineSettings) -> EngineConfig {
    EngineConfig {
        idle_threshold_minutes: settings.idle_threshold_minutes,
        density_threshold_minutes: settings.density_threshold_minutes,
        density_threshold_lines: settings.density_threshold_lines,
        active_trigger_count: settings.active_trigger_count,
        active_chunk_size: settings.active_chunk_size,
        min_run_interval_seconds: settings.min_run_interval_seconds,
        stage_transitions: settings
            .stage_transitions
            .iter()
            .map(|t| StageTransition {
                source_stage: t.source_stage,
                target_stage: t.target_stage,
                trigger_count: t.trigger_count,
                chunk_size: t.chunk_size,
            })
            .collect(),
        terminal_stage_cap: settings.terminal_stage_cap,
        summarizer_timeout_seconds: settings.summarizer_timeout_seconds,
    }
}

fn load(cli: &Cli) -> Result<RecapSettings> {
    let settings = match &cli.settings {
        Some(path) => load_settings_from_path(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => load_settings().context("Failed to load settings")?,
    };
    settings.validate().context("Invalid settings")?;
    Ok(settings)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let settings = load(&cli)?;

    let db_path = cli
        .db_path
        .clone()
        .or_else(|| settings.storage.db_path.as_ref().map(PathBuf::from))
        .unwrap_or_else(default_db_path);
    ensure_parent_dir(&db_path)?;

    let store = Arc::new(
        SqliteStore::open(&db_path)
            .with_context(|| format!("Failed to open database at {}", db_path.display()))?,
    );

    let api_key = std::env::var(&settings.summarizer.api_key_env).ok();
    let summarizer = Arc::new(
        HttpSummarizer::new(HttpSummarizerConfig {
            base_url: settings.summarizer.base_url.clone(),
            model: settings.summarizer.model.clone(),
            api_key,
            max_tokens: settings.summarizer.max_tokens,
            timeout_ms: settings.engine.summarizer_timeout_seconds.saturating_mul(1_000),
        })
        .context("Failed to build summarizer client")?,
    );

    let engine = Arc::new(
        CompactionEngine::new(
            store.clone(),
            store.clone(),
            store.clone(),
            summarizer,
            engine_config(&settings.engine),
        )
        .context("Failed to build compaction engine")?,
    );

    let mut registry = JobRegistry::new();
    registry.register(Arc::new(CompactionJob::new(engine)));

    info!(job = %cli.job, db_path = %db_path.display(), "dispatching job");
    registry
        .dispatch(&cli.job)
        .await
        .with_context(|| format!("Job '{}' failed", cli.job))?;
    Ok(())
}
