//! Meta-summarization cascade.
//!
//! Runs of same-stage summaries merge into the next stage once a trigger
//! count is reached: the oldest `chunk_size` rows (by `anchor_timestamp`)
//! are condensed into one row at `target_stage`, anchored at the oldest
//! merged row's anchor, and the source rows are deleted in one transaction.
//!
//! The engine applies transitions strictly in increasing-stage order, so a
//! stage-k merge can push stage-(k+1) past its own trigger within the same
//! run when prior state already sits at the threshold.

use std::time::Duration;

use tracing::{debug, info};

use recap_llm::Summarizer;

use crate::errors::EngineError;
use crate::stores::SummaryStore;
use crate::summarize::summarize_with_timeout;
use crate::types::{MergeReport, StageTransition};

/// Merge one stage into the next, if the trigger count is met.
///
/// Returns `Ok(None)` when the source stage is below the trigger. On
/// summarizer failure the source rows are left untouched and nothing is
/// inserted.
pub async fn merge_stage(
    store: &dyn SummaryStore,
    summarizer: &dyn Summarizer,
    timeout: Duration,
    transition: &StageTransition,
) -> Result<Option<MergeReport>, EngineError> {
    let rows = store.read_all_ordered(transition.source_stage)?;
    if rows.len() < transition.trigger_count {
        debug!(
            stage = transition.source_stage,
            count = rows.len(),
            trigger = transition.trigger_count,
            "cascade below trigger; skipping"
        );
        return Ok(None);
    }

    let batch = &rows[..transition.chunk_size.min(rows.len())];
    let Some(oldest) = batch.first() else {
        return Ok(None);
    };

    let texts: Vec<String> = batch.iter().map(|s| s.content.clone()).collect();
    let merged_content = summarize_with_timeout(summarizer, timeout, &texts).await?;

    let _ = store.insert(&merged_content, oldest.anchor_timestamp, transition.target_stage)?;
    let ids: Vec<String> = batch.iter().map(|s| s.id.clone()).collect();
    store.delete_by_ids(&ids)?;

    info!(
        source_stage = transition.source_stage,
        target_stage = transition.target_stage,
        merged = batch.len(),
        anchor = %oldest.anchor_timestamp,
        "merged summaries into higher stage"
    );

    Ok(Some(MergeReport {
        source_stage: transition.source_stage,
        target_stage: transition.target_stage,
        merged: batch.len(),
    }))
}
