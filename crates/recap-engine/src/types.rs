//! Engine configuration and run reporting types.

use serde::{Deserialize, Serialize};

use crate::errors::EngineError;

/// Buffer activity classification. There is no third state: a buffer that
/// is recent but sparse collapses to `Inactive`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activity {
    /// A live, dense conversation; compact in chunks to avoid summarizing
    /// an exchange that is still unfolding.
    Active,
    /// A concluded or stale conversation; the whole buffer can be folded
    /// into one summary.
    Inactive,
}

/// One step of the meta-summarization cascade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageTransition {
    /// Stage whose rows are consumed.
    pub source_stage: u32,
    /// Stage the merged summary is written to. Must be `source_stage + 1`.
    pub target_stage: u32,
    /// Minimum source-row count before a merge runs.
    pub trigger_count: usize,
    /// Number of oldest source rows merged per run.
    pub chunk_size: usize,
}

/// Configuration for the compaction engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// Minutes of silence after the newest message before the buffer
    /// counts as Inactive. Default: 30.
    pub idle_threshold_minutes: i64,
    /// Maximum span in minutes between oldest and newest message for the
    /// buffer to count as dense. Default: 10.
    pub density_threshold_minutes: i64,
    /// Minimum message count within the density window. Default: 5.
    pub density_threshold_lines: usize,
    /// Buffer size at which an Active conversation gets chunk-compacted.
    /// Default: 20.
    pub active_trigger_count: usize,
    /// Number of oldest messages summarized per Active chunk. Default: 10.
    pub active_chunk_size: usize,
    /// Minimum seconds between runs (debounce). Default: 300.
    pub min_run_interval_seconds: i64,
    /// Ordered cascade steps, lowest stage first.
    pub stage_transitions: Vec<StageTransition>,
    /// Maximum rows retained at the terminal stage. Default: 50.
    pub terminal_stage_cap: usize,
    /// Bounded timeout applied around every summarizer call. Default: 60.
    pub summarizer_timeout_seconds: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            idle_threshold_minutes: 30,
            density_threshold_minutes: 10,
            density_threshold_lines: 5,
            active_trigger_count: 20,
            active_chunk_size: 10,
            min_run_interval_seconds: 300,
            stage_transitions: vec![
                StageTransition {
                    source_stage: 1,
                    target_stage: 2,
                    trigger_count: 10,
                    chunk_size: 5,
                },
                StageTransition {
                    source_stage: 2,
                    target_stage: 3,
                    trigger_count: 10,
                    chunk_size: 5,
                },
            ],
            terminal_stage_cap: 50,
            summarizer_timeout_seconds: 60,
        }
    }
}

impl EngineConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.idle_threshold_minutes <= 0 {
            return Err(EngineError::configuration("idleThresholdMinutes must be positive"));
        }
        if self.density_threshold_minutes <= 0 {
            return Err(EngineError::configuration("densityThresholdMinutes must be positive"));
        }
        if self.density_threshold_lines == 0 {
            return Err(EngineError::configuration("densityThresholdLines must be positive"));
        }
        if self.active_trigger_count == 0 {
            return Err(EngineError::configuration("activeTriggerCount must be positive"));
        }
        if self.active_chunk_size == 0 {
            return Err(EngineError::configuration("activeChunkSize must be positive"));
        }
        if self.min_run_interval_seconds < 0 {
            return Err(EngineError::configuration(
                "minRunIntervalSeconds must not be negative",
            ));
        }
        if self.terminal_stage_cap == 0 {
            return Err(EngineError::configuration("terminalStageCap must be positive"));
        }
        if self.summarizer_timeout_seconds == 0 {
            return Err(EngineError::configuration(
                "summarizerTimeoutSeconds must be positive",
            ));
        }

        let mut previous_source: Option<u32> = None;
        for transition in &self.stage_transitions {
            if transition.source_stage == 0 {
                return Err(EngineError::configuration("sourceStage must be at least 1"));
            }
            if transition.target_stage != transition.source_stage + 1 {
                return Err(EngineError::configuration(format!(
                    "transition {} -> {} must step exactly one stage upward",
                    transition.source_stage, transition.target_stage
                )));
            }
            if transition.trigger_count == 0 || transition.chunk_size == 0 {
                return Err(EngineError::configuration(format!(
                    "transition {} -> {} has a non-positive trigger or chunk size",
                    transition.source_stage, transition.target_stage
                )));
            }
            if previous_source.is_some_and(|prev| transition.source_stage <= prev) {
                return Err(EngineError::configuration(
                    "stageTransitions must be ordered by ascending source stage",
                ));
            }
            previous_source = Some(transition.source_stage);
        }
        Ok(())
    }

    /// The highest configured stage, subject to the retention cap.
    ///
    /// With no transitions configured, stage 1 is terminal.
    #[must_use]
    pub fn terminal_stage(&self) -> u32 {
        self.stage_transitions
            .last()
            .map_or(1, |transition| transition.target_stage)
    }
}

/// Outcome of one cascade merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeReport {
    /// Stage whose rows were consumed.
    pub source_stage: u32,
    /// Stage the merged summary was written to.
    pub target_stage: u32,
    /// Number of source rows merged and deleted.
    pub merged: usize,
}

/// Observational counters for one compaction run.
///
/// The `Result` returned by [`crate::CompactionEngine::compact`] is the
/// success/failure signal; this report exists for structured logging.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    /// The run was suppressed by the debounce gate; nothing else ran.
    pub gated: bool,
    /// Buffer size observed at the start of the run.
    pub buffer_len: usize,
    /// Classification result, absent when the buffer was empty.
    pub activity: Option<Activity>,
    /// Raw messages consumed by the stage-one step.
    pub messages_summarized: usize,
    /// Cascade merges performed, in execution order.
    pub merges: Vec<MergeReport>,
    /// Terminal-stage rows evicted by the retention cap.
    pub evicted: usize,
}

impl RunReport {
    /// Report for a debounce-gated run.
    #[must_use]
    pub(crate) fn gated() -> Self {
        Self {
            gated: true,
            ..Self::default()
        }
    }
}
