//! In-memory fakes shared by the unit tests in this crate.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use recap_core::ids::generate_id;
use recap_core::{BufferMessage, Summary};
use recap_llm::{Summarizer, SummarizerError, SummarizerResult};

use crate::stores::{BufferStore, RunMarkerStore, StoreError, SummaryStore};

/// Vec-backed buffer store.
#[derive(Default)]
pub(crate) struct MemoryBufferStore {
    messages: Mutex<Vec<BufferMessage>>,
}

impl MemoryBufferStore {
    pub(crate) fn with_messages(messages: Vec<BufferMessage>) -> Self {
        Self {
            messages: Mutex::new(messages),
        }
    }

    pub(crate) fn snapshot(&self) -> Vec<BufferMessage> {
        self.messages.lock().unwrap().clone()
    }
}

impl BufferStore for MemoryBufferStore {
    fn append(&self, message: &BufferMessage) -> Result<(), StoreError> {
        self.messages.lock().unwrap().push(message.clone());
        Ok(())
    }

    fn read_all_ordered(&self) -> Result<Vec<BufferMessage>, StoreError> {
        let mut messages = self.messages.lock().unwrap().clone();
        messages.sort_by_key(|m| m.timestamp);
        Ok(messages)
    }

    fn delete_exact(&self, subset: &[BufferMessage]) -> Result<(), StoreError> {
        let mut messages = self.messages.lock().unwrap();
        for target in subset {
            if let Some(pos) = messages.iter().position(|m| m == target) {
                let _ = messages.remove(pos);
            }
        }
        Ok(())
    }

    fn delete_all(&self) -> Result<(), StoreError> {
        self.messages.lock().unwrap().clear();
        Ok(())
    }
}

/// Vec-backed summary store.
#[derive(Default)]
pub(crate) struct MemorySummaryStore {
    rows: Mutex<Vec<Summary>>,
}

impl MemorySummaryStore {
    pub(crate) fn seed(&self, content: &str, anchor: DateTime<Utc>, stage: u32) -> Summary {
        self.insert(content, anchor, stage).unwrap()
    }
}

impl SummaryStore for MemorySummaryStore {
    fn insert(
        &self,
        content: &str,
        anchor_timestamp: DateTime<Utc>,
        stage: u32,
    ) -> Result<Summary, StoreError> {
        let summary = Summary {
            id: generate_id("sum"),
            content: content.to_owned(),
            anchor_timestamp,
            stage,
        };
        self.rows.lock().unwrap().push(summary.clone());
        Ok(summary)
    }

    fn read_all_ordered(&self, stage: u32) -> Result<Vec<Summary>, StoreError> {
        let mut rows: Vec<Summary> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.stage == stage)
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            a.anchor_timestamp
                .cmp(&b.anchor_timestamp)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(rows)
    }

    fn delete_by_ids(&self, ids: &[String]) -> Result<(), StoreError> {
        self.rows
            .lock()
            .unwrap()
            .retain(|s| !ids.contains(&s.id));
        Ok(())
    }
}

/// Single-slot marker store.
#[derive(Default)]
pub(crate) struct MemoryRunMarkerStore {
    marker: Mutex<Option<DateTime<Utc>>>,
}

impl RunMarkerStore for MemoryRunMarkerStore {
    fn get(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
        Ok(*self.marker.lock().unwrap())
    }

    fn set(&self, timestamp: DateTime<Utc>) -> Result<(), StoreError> {
        *self.marker.lock().unwrap() = Some(timestamp);
        Ok(())
    }
}

/// A buffer store whose reads fail, for store-failure propagation tests.
pub(crate) struct FailingBufferStore;

impl BufferStore for FailingBufferStore {
    fn append(&self, _message: &BufferMessage) -> Result<(), StoreError> {
        Err(StoreError::backend("disk full"))
    }

    fn read_all_ordered(&self) -> Result<Vec<BufferMessage>, StoreError> {
        Err(StoreError::backend("disk full"))
    }

    fn delete_exact(&self, _subset: &[BufferMessage]) -> Result<(), StoreError> {
        Err(StoreError::backend("disk full"))
    }

    fn delete_all(&self) -> Result<(), StoreError> {
        Err(StoreError::backend("disk full"))
    }
}

/// Scripted summarizer: pops queued results first, then falls back to a
/// fixed response or a permanent failure. Records every call's input.
pub(crate) struct ScriptedSummarizer {
    queued: Mutex<VecDeque<SummarizerResult<String>>>,
    fallback: Fallback,
    delay: Option<Duration>,
    calls: Mutex<Vec<Vec<String>>>,
}

enum Fallback {
    Fixed(String),
    Fail,
}

impl ScriptedSummarizer {
    /// Always succeed with `text`.
    pub(crate) fn fixed(text: &str) -> Self {
        Self {
            queued: Mutex::new(VecDeque::new()),
            fallback: Fallback::Fixed(text.to_owned()),
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Always fail with a 500-style API error.
    pub(crate) fn failing() -> Self {
        Self {
            queued: Mutex::new(VecDeque::new()),
            fallback: Fallback::Fail,
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Pop the given results in order, then fail.
    pub(crate) fn sequence(results: Vec<SummarizerResult<String>>) -> Self {
        Self {
            queued: Mutex::new(results.into()),
            fallback: Fallback::Fail,
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Sleep before answering, for timeout tests.
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub(crate) fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn scripted_failure() -> SummarizerError {
        SummarizerError::Api {
            status: 500,
            message: "scripted failure".into(),
        }
    }
}

#[async_trait]
impl Summarizer for ScriptedSummarizer {
    async fn summarize(&self, texts: &[String]) -> SummarizerResult<String> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.calls.lock().unwrap().push(texts.to_vec());
        if let Some(result) = self.queued.lock().unwrap().pop_front() {
            return result;
        }
        match &self.fallback {
            Fallback::Fixed(text) => Ok(text.clone()),
            Fallback::Fail => Err(Self::scripted_failure()),
        }
    }
}
