//! # recap-engine
//!
//! Hierarchical rolling-buffer summarization and retention engine.
//!
//! A continuously growing transcript buffer is compacted into a bounded,
//! multi-resolution set of summaries: raw messages roll up into stage-1
//! summaries, runs of stage-N summaries merge into stage-(N+1), and the
//! terminal stage is capped as a FIFO window. One run of
//! [`CompactionEngine::compact`] executes:
//!
//! 1. **Debounce gate** — skip if the last run is too recent.
//! 2. **Classify** — [`classifier`] decides Active vs Inactive from the
//!    buffer's timestamps.
//! 3. **Stage one** — summarize and purge a chunk (Active) or the whole
//!    buffer (Inactive); purge happens only after the summarizer succeeds.
//! 4. **Cascade** — [`cascade`] merges lower stages upward in strictly
//!    increasing stage order.
//! 5. **Retention** — [`retention`] evicts the oldest terminal-stage rows
//!    beyond the cap.
//! 6. **Marker** — record the run timestamp, only on overall success.
//!
//! Collaborators are injected through the [`stores`] traits and the
//! re-exported [`Summarizer`] trait, so the engine is testable with
//! in-memory fakes and deployable over SQLite and HTTP.

#![deny(unsafe_code)]

pub mod cascade;
pub mod classifier;
pub mod debounce;
pub mod engine;
pub mod errors;
pub mod registry;
pub mod retention;
pub mod stores;
pub mod types;

mod summarize;

#[cfg(test)]
pub(crate) mod testing;

pub use engine::CompactionEngine;
pub use errors::EngineError;
pub use recap_llm::{Summarizer, SummarizerError};
pub use registry::{CompactionJob, Job, JobRegistry};
pub use stores::{BufferStore, RunMarkerStore, StoreError, SummaryStore};
pub use types::{Activity, EngineConfig, MergeReport, RunReport, StageTransition};
