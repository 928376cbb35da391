//! Compaction engine orchestration.
//!
//! One run walks the state machine: debounce gate → load buffer →
//! classify → stage-one summarize+purge (or no-op) → cascade in ascending
//! stage order → terminal retention cap → marker update. Each mutation
//! commits independently; a crash mid-run leaves partial progress that the
//! next run resolves by re-reading persisted state from scratch.
//!
//! The run marker is written last and only on overall success, so any
//! failed step leaves the marker untouched and the next scheduled
//! invocation retries the whole pipeline. The stage-one purge is ordered
//! strictly after a successful summarizer call: a failed or timed-out
//! summarization leaves the buffer byte-identical.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info};

use recap_core::BufferMessage;
use recap_llm::Summarizer;

use crate::errors::EngineError;
use crate::stores::{BufferStore, RunMarkerStore, SummaryStore};
use crate::summarize::summarize_with_timeout;
use crate::types::{Activity, EngineConfig, RunReport};
use crate::{cascade, classifier, debounce, retention};

/// The hierarchical rolling-buffer summarization and retention engine.
///
/// Safe to invoke repeatedly: runs inside the debounce interval are
/// no-ops. The debounce is suppression, not mutual exclusion — see
/// [`crate::debounce`].
pub struct CompactionEngine {
    buffer: Arc<dyn BufferStore>,
    summaries: Arc<dyn SummaryStore>,
    marker: Arc<dyn RunMarkerStore>,
    summarizer: Arc<dyn Summarizer>,
    config: EngineConfig,
}

impl std::fmt::Debug for CompactionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompactionEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl CompactionEngine {
    /// Create an engine over the given collaborators.
    ///
    /// Fails with [`EngineError::Configuration`] if the configuration is
    /// invalid.
    pub fn new(
        buffer: Arc<dyn BufferStore>,
        summaries: Arc<dyn SummaryStore>,
        marker: Arc<dyn RunMarkerStore>,
        summarizer: Arc<dyn Summarizer>,
        config: EngineConfig,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            buffer,
            summaries,
            marker,
            summarizer,
            config,
        })
    }

    /// Execute one compaction run.
    pub async fn compact(&self) -> Result<RunReport, EngineError> {
        let now = Utc::now();
        if !debounce::should_run(self.marker.get()?, now, self.config.min_run_interval_seconds) {
            debug!(
                min_interval_s = self.config.min_run_interval_seconds,
                "run gated by debounce interval"
            );
            return Ok(RunReport::gated());
        }

        let messages = self.buffer.read_all_ordered()?;
        let mut report = RunReport {
            buffer_len: messages.len(),
            ..RunReport::default()
        };

        if messages.is_empty() {
            debug!("buffer empty; skipping stage-one compaction");
        } else {
            let activity = classifier::classify(&messages, now, &self.config);
            report.activity = Some(activity);
            match activity {
                Activity::Active => {
                    if messages.len() >= self.config.active_trigger_count {
                        let chunk = self.config.active_chunk_size.min(messages.len());
                        report.messages_summarized =
                            self.summarize_and_purge(&messages[..chunk], false).await?;
                    } else {
                        debug!(
                            count = messages.len(),
                            trigger = self.config.active_trigger_count,
                            "active conversation below trigger; leaving buffer untouched"
                        );
                    }
                }
                Activity::Inactive => {
                    report.messages_summarized =
                        self.summarize_and_purge(&messages, true).await?;
                }
            }
        }

        for transition in &self.config.stage_transitions {
            if let Some(merge) = cascade::merge_stage(
                self.summaries.as_ref(),
                self.summarizer.as_ref(),
                self.summarizer_timeout(),
                transition,
            )
            .await?
            {
                report.merges.push(merge);
            }
        }

        report.evicted = retention::enforce_cap(
            self.summaries.as_ref(),
            self.config.terminal_stage(),
            self.config.terminal_stage_cap,
        )?;

        self.marker.set(now)?;
        info!(
            buffer_len = report.buffer_len,
            summarized = report.messages_summarized,
            merges = report.merges.len(),
            evicted = report.evicted,
            "compaction run complete"
        );
        Ok(report)
    }

    /// Summarize `batch` into a stage-1 summary, then purge the consumed
    /// messages. The purge runs only after the summarizer succeeds.
    async fn summarize_and_purge(
        &self,
        batch: &[BufferMessage],
        purge_all: bool,
    ) -> Result<usize, EngineError> {
        let Some(first) = batch.first() else {
            return Ok(0);
        };

        let texts: Vec<String> = batch.iter().map(BufferMessage::transcript_line).collect();
        let content =
            summarize_with_timeout(self.summarizer.as_ref(), self.summarizer_timeout(), &texts)
                .await?;

        let _ = self.summaries.insert(&content, first.timestamp, 1)?;
        if purge_all {
            self.buffer.delete_all()?;
        } else {
            self.buffer.delete_exact(batch)?;
        }

        info!(
            consumed = batch.len(),
            anchor = %first.timestamp,
            purge_all,
            "stage-one summary committed"
        );
        Ok(batch.len())
    }

    fn summarizer_timeout(&self) -> Duration {
        Duration::from_secs(self.config.summarizer_timeout_seconds)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{DateTime, Duration as ChronoDuration, Utc};

    use recap_llm::SummarizerError;

    use super::*;
    use crate::testing::{
        FailingBufferStore, MemoryBufferStore, MemoryRunMarkerStore, MemorySummaryStore,
        ScriptedSummarizer,
    };

    struct Harness {
        buffer: Arc<MemoryBufferStore>,
        summaries: Arc<MemorySummaryStore>,
        marker: Arc<MemoryRunMarkerStore>,
        summarizer: Arc<ScriptedSummarizer>,
        engine: CompactionEngine,
    }

    fn harness(
        config: EngineConfig,
        messages: Vec<BufferMessage>,
        summarizer: ScriptedSummarizer,
    ) -> Harness {
        let buffer = Arc::new(MemoryBufferStore::with_messages(messages));
        let summaries = Arc::new(MemorySummaryStore::default());
        let marker = Arc::new(MemoryRunMarkerStore::default());
        let summarizer = Arc::new(summarizer);
        let engine = CompactionEngine::new(
            buffer.clone(),
            summaries.clone(),
            marker.clone(),
            summarizer.clone(),
            config,
        )
        .unwrap();
        Harness {
            buffer,
            summaries,
            marker,
            summarizer,
            engine,
        }
    }

    fn config() -> EngineConfig {
        EngineConfig {
            idle_threshold_minutes: 30,
            density_threshold_minutes: 10,
            density_threshold_lines: 3,
            active_trigger_count: 4,
            active_chunk_size: 2,
            min_run_interval_seconds: 300,
            ..EngineConfig::default()
        }
    }

    /// Messages at the given minute offsets before now, oldest first.
    fn messages_at(minutes_ago: &[i64]) -> Vec<BufferMessage> {
        let now = Utc::now();
        minutes_ago
            .iter()
            .enumerate()
            .map(|(i, m)| {
                BufferMessage::new(
                    "ana",
                    format!("message {i}"),
                    now - ChronoDuration::minutes(*m),
                    "web",
                    "chat",
                )
            })
            .collect()
    }

    fn stale_messages(count: usize) -> Vec<BufferMessage> {
        let offsets: Vec<i64> = (0..count)
            .map(|i| 120 - i64::try_from(i).unwrap())
            .collect();
        messages_at(&offsets)
    }

    fn seed_summaries(
        store: &MemorySummaryStore,
        stage: u32,
        count: usize,
        base: DateTime<Utc>,
    ) {
        for i in 0..count {
            let _ = store.seed(
                &format!("s{stage} {i}"),
                base + ChronoDuration::minutes(i64::try_from(i).unwrap()),
                stage,
            );
        }
    }

    // --- Debounce ---

    #[tokio::test]
    async fn gated_run_does_nothing() {
        let h = harness(config(), stale_messages(3), ScriptedSummarizer::fixed("s"));
        h.marker.set(Utc::now()).unwrap();

        let report = h.engine.compact().await.unwrap();

        assert!(report.gated);
        assert_eq!(h.summarizer.call_count(), 0);
        assert_eq!(h.buffer.snapshot().len(), 3);
    }

    #[tokio::test]
    async fn two_runs_within_interval_summarize_once() {
        let h = harness(config(), stale_messages(3), ScriptedSummarizer::fixed("s"));

        let first = h.engine.compact().await.unwrap();
        let second = h.engine.compact().await.unwrap();

        assert!(!first.gated);
        assert!(second.gated);
        assert_eq!(h.summarizer.call_count(), 1);
    }

    // --- Inactive full purge ---

    #[tokio::test]
    async fn inactive_buffer_is_fully_purged() {
        let messages = stale_messages(3);
        let oldest_ts = messages[0].timestamp;
        let h = harness(config(), messages, ScriptedSummarizer::fixed("condensed"));

        let report = h.engine.compact().await.unwrap();

        assert_eq!(report.activity, Some(Activity::Inactive));
        assert_eq!(report.messages_summarized, 3);
        assert!(h.buffer.snapshot().is_empty());

        let stage_one = h.summaries.read_all_ordered(1).unwrap();
        assert_eq!(stage_one.len(), 1);
        assert_eq!(stage_one[0].anchor_timestamp, oldest_ts);
        assert_eq!(stage_one[0].content, "condensed");
    }

    #[tokio::test]
    async fn summarizer_sees_transcript_lines_oldest_first() {
        let h = harness(config(), stale_messages(3), ScriptedSummarizer::fixed("s"));

        let _ = h.engine.compact().await.unwrap();

        let calls = h.summarizer.calls();
        assert_eq!(
            calls[0],
            vec!["ana: message 0", "ana: message 1", "ana: message 2"]
        );
    }

    // --- Active chunking ---

    #[tokio::test]
    async fn active_buffer_compacts_oldest_chunk() {
        // 5 messages inside a 10-minute window: Active, over trigger 4.
        let messages = messages_at(&[8, 6, 4, 2, 1]);
        let expected_rest: Vec<BufferMessage> = messages[2..].to_vec();
        let oldest_ts = messages[0].timestamp;
        let h = harness(config(), messages, ScriptedSummarizer::fixed("chunk"));

        let report = h.engine.compact().await.unwrap();

        assert_eq!(report.activity, Some(Activity::Active));
        assert_eq!(report.messages_summarized, 2);
        assert_eq!(h.buffer.snapshot(), expected_rest);

        let stage_one = h.summaries.read_all_ordered(1).unwrap();
        assert_eq!(stage_one.len(), 1);
        assert_eq!(stage_one[0].anchor_timestamp, oldest_ts);
    }

    #[tokio::test]
    async fn active_buffer_under_trigger_is_left_untouched() {
        // 3 messages inside the window: Active but below trigger 4.
        let h = harness(config(), messages_at(&[5, 3, 1]), ScriptedSummarizer::fixed("s"));

        let report = h.engine.compact().await.unwrap();

        assert_eq!(report.activity, Some(Activity::Active));
        assert_eq!(report.messages_summarized, 0);
        assert_eq!(h.summarizer.call_count(), 0);
        assert_eq!(h.buffer.snapshot().len(), 3);
        // Nothing to do still counts as a successful run.
        assert!(h.marker.get().unwrap().is_some());
    }

    // --- Cascade within a run ---

    #[tokio::test]
    async fn empty_buffer_still_cascades_prior_state() {
        let h = harness(config(), Vec::new(), ScriptedSummarizer::fixed("merged"));
        seed_summaries(&h.summaries, 1, 10, Utc::now() - ChronoDuration::days(2));

        let report = h.engine.compact().await.unwrap();

        assert!(report.activity.is_none());
        assert_eq!(report.merges.len(), 1);
        assert_eq!(h.summaries.read_all_ordered(1).unwrap().len(), 5);
        assert_eq!(h.summaries.read_all_ordered(2).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn lower_merge_feeds_higher_merge_in_same_run() {
        // Stage 2 sits one row under its trigger; the stage-1 merge pushes
        // it over, so one run produces merges at both levels.
        let h = harness(config(), Vec::new(), ScriptedSummarizer::fixed("merged"));
        let base = Utc::now() - ChronoDuration::days(3);
        seed_summaries(&h.summaries, 1, 10, base + ChronoDuration::hours(12));
        seed_summaries(&h.summaries, 2, 9, base);

        let report = h.engine.compact().await.unwrap();

        assert_eq!(report.merges.len(), 2);
        assert_eq!(report.merges[0].source_stage, 1);
        assert_eq!(report.merges[1].source_stage, 2);
        assert_eq!(h.summaries.read_all_ordered(1).unwrap().len(), 5);
        assert_eq!(h.summaries.read_all_ordered(2).unwrap().len(), 5);
        assert_eq!(h.summaries.read_all_ordered(3).unwrap().len(), 1);
    }

    // --- Retention ---

    #[tokio::test]
    async fn terminal_stage_is_capped_after_cascade() {
        let mut cfg = config();
        cfg.terminal_stage_cap = 10;
        let h = harness(cfg, Vec::new(), ScriptedSummarizer::fixed("s"));
        let base = Utc::now() - ChronoDuration::days(30);
        seed_summaries(&h.summaries, 3, 12, base);

        let report = h.engine.compact().await.unwrap();

        assert_eq!(report.evicted, 2);
        let remaining = h.summaries.read_all_ordered(3).unwrap();
        assert_eq!(remaining.len(), 10);
        assert_eq!(remaining[0].content, "s3 2");
    }

    // --- Failure isolation ---

    #[tokio::test]
    async fn summarizer_failure_leaves_buffer_and_marker_untouched() {
        let messages = stale_messages(3);
        let before = messages.clone();
        let h = harness(config(), messages, ScriptedSummarizer::failing());

        let err = h.engine.compact().await.unwrap_err();

        assert_matches!(err, EngineError::Summarizer(_));
        assert_eq!(h.buffer.snapshot(), before);
        assert!(h.summaries.read_all_ordered(1).unwrap().is_empty());
        assert!(h.marker.get().unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn summarizer_timeout_is_a_failure() {
        let messages = stale_messages(3);
        let before = messages.clone();
        let h = harness(
            config(),
            messages,
            ScriptedSummarizer::fixed("late")
                .with_delay(std::time::Duration::from_secs(600)),
        );

        let err = h.engine.compact().await.unwrap_err();

        assert_matches!(
            err,
            EngineError::Summarizer(SummarizerError::Timeout { timeout_ms: 60_000 })
        );
        assert_eq!(h.buffer.snapshot(), before);
        assert!(h.marker.get().unwrap().is_none());
    }

    #[tokio::test]
    async fn store_failure_aborts_the_run() {
        let marker = Arc::new(MemoryRunMarkerStore::default());
        let engine = CompactionEngine::new(
            Arc::new(FailingBufferStore),
            Arc::new(MemorySummaryStore::default()),
            marker.clone(),
            Arc::new(ScriptedSummarizer::fixed("s")),
            config(),
        )
        .unwrap();

        let err = engine.compact().await.unwrap_err();

        assert_matches!(err, EngineError::Store(_));
        assert!(marker.get().unwrap().is_none());
    }

    #[tokio::test]
    async fn cascade_failure_keeps_lower_stage_work_and_skips_higher() {
        // First merge (1 -> 2) succeeds; second (2 -> 3) fails. The
        // committed stage-1 merge stays; stage 3 is never reached and the
        // marker does not advance.
        let h = harness(
            config(),
            Vec::new(),
            ScriptedSummarizer::sequence(vec![Ok("first merge".into())]),
        );
        let base = Utc::now() - ChronoDuration::days(3);
        seed_summaries(&h.summaries, 1, 10, base + ChronoDuration::hours(12));
        seed_summaries(&h.summaries, 2, 10, base);

        let err = h.engine.compact().await.unwrap_err();

        assert_matches!(err, EngineError::Summarizer(_));
        assert_eq!(h.summaries.read_all_ordered(1).unwrap().len(), 5);
        assert_eq!(h.summaries.read_all_ordered(2).unwrap().len(), 11);
        assert!(h.summaries.read_all_ordered(3).unwrap().is_empty());
        assert!(h.marker.get().unwrap().is_none());
    }

    // --- Construction ---

    #[test]
    fn invalid_config_is_rejected_at_construction() {
        let result = CompactionEngine::new(
            Arc::new(MemoryBufferStore::default()),
            Arc::new(MemorySummaryStore::default()),
            Arc::new(MemoryRunMarkerStore::default()),
            Arc::new(ScriptedSummarizer::fixed("s")),
            EngineConfig {
                terminal_stage_cap: 0,
                ..EngineConfig::default()
            },
        );
        assert_matches!(result, Err(EngineError::Configuration { .. }));
    }
}
