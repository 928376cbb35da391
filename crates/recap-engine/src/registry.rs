//! Job registry — explicit dispatch for scheduler callbacks.
//!
//! Scheduled work is dispatched through a startup-populated mapping from
//! job name to a typed [`Job`], never through reflective lookup. Asking for
//! a name nobody registered is an explicit [`EngineError::UnknownJob`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::engine::CompactionEngine;
use crate::errors::EngineError;

/// A named unit of scheduled work.
#[async_trait]
pub trait Job: Send + Sync {
    /// Name the scheduler dispatches this job by.
    fn name(&self) -> &str;

    /// Run the job once.
    async fn run(&self) -> Result<(), EngineError>;
}

/// Registry mapping job names to their implementations.
pub struct JobRegistry {
    jobs: HashMap<String, Arc<dyn Job>>,
}

impl JobRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            jobs: HashMap::new(),
        }
    }

    /// Register a job. Overwrites any existing job with the same name.
    pub fn register(&mut self, job: Arc<dyn Job>) {
        debug!(job_name = job.name(), "job registered");
        let _ = self.jobs.insert(job.name().to_owned(), job);
    }

    /// Look up a job by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Job>> {
        self.jobs.get(name).cloned()
    }

    /// Run the named job, or fail with [`EngineError::UnknownJob`].
    pub async fn dispatch(&self, name: &str) -> Result<(), EngineError> {
        match self.get(name) {
            Some(job) => job.run().await,
            None => Err(EngineError::UnknownJob {
                name: name.to_owned(),
            }),
        }
    }

    /// All registered job names, sorted alphabetically.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.jobs.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered jobs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Adapts the compaction engine to the [`Job`] trait under the name
/// `compact`.
pub struct CompactionJob {
    engine: Arc<CompactionEngine>,
}

impl CompactionJob {
    /// Job name used for registration and dispatch.
    pub const NAME: &'static str = "compact";

    /// Wrap an engine.
    #[must_use]
    pub fn new(engine: Arc<CompactionEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl Job for CompactionJob {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn run(&self) -> Result<(), EngineError> {
        let report = self.engine.compact().await?;
        if report.gated {
            debug!("compact job gated; nothing to do");
        } else {
            info!(
                summarized = report.messages_summarized,
                merges = report.merges.len(),
                evicted = report.evicted,
                "compact job finished"
            );
        }
        Ok(())
    }
}
