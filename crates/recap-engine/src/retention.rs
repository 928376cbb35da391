//! Terminal-stage retention cap.
//!
//! The highest configured stage is a bounded FIFO window: once the cascade
//! has run, any rows beyond `terminal_stage_cap` are evicted oldest-first
//! by `anchor_timestamp`, in one transaction. History beyond the cap is
//! permanently discarded.

use tracing::info;

use crate::stores::{StoreError, SummaryStore};

/// Evict terminal-stage rows beyond `cap`, oldest first.
///
/// Returns the number of evicted rows (0 when within the cap).
pub fn enforce_cap(
    store: &dyn SummaryStore,
    terminal_stage: u32,
    cap: usize,
) -> Result<usize, StoreError> {
    let rows = store.read_all_ordered(terminal_stage)?;
    if rows.len() <= cap {
        return Ok(0);
    }

    let excess = rows.len() - cap;
    let ids: Vec<String> = rows[..excess].iter().map(|s| s.id.clone()).collect();
    store.delete_by_ids(&ids)?;

    info!(
        stage = terminal_stage,
        evicted = excess,
        cap,
        "evicted oldest terminal-stage summaries"
    );
    Ok(excess)
}
