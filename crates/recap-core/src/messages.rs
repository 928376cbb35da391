//! Raw transcript messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A raw, not-yet-summarized transcript message.
///
/// Rows are ephemeral: ingestion appends them and the compaction engine
/// deletes them once their content has been folded into a stage-1 summary.
/// Deletion matches on **full-record equality**, so every field participates
/// in `PartialEq`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferMessage {
    /// Who sent the message (user handle or assistant name).
    pub sender: String,
    /// Message body.
    pub content: String,
    /// When the message was sent.
    pub timestamp: DateTime<Utc>,
    /// Originating platform (e.g. `telegram`, `web`).
    pub platform: String,
    /// Conversation mode the message arrived in (e.g. `chat`, `voice`).
    pub mode: String,
}

impl BufferMessage {
    /// Create a message.
    #[must_use]
    pub fn new(
        sender: impl Into<String>,
        content: impl Into<String>,
        timestamp: DateTime<Utc>,
        platform: impl Into<String>,
        mode: impl Into<String>,
    ) -> Self {
        Self {
            sender: sender.into(),
            content: content.into(),
            timestamp,
            platform: platform.into(),
            mode: mode.into(),
        }
    }

    /// Render the message as one transcript line for summarizer input.
    #[must_use]
    pub fn transcript_line(&self) -> String {
        format!("{}: {}", self.sender, self.content)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn sample() -> BufferMessage {
        BufferMessage::new(
            "ana",
            "remind me about the dentist",
            Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap(),
            "telegram",
            "chat",
        )
    }

    #[test]
    fn transcript_line_formats_sender_and_content() {
        assert_eq!(sample().transcript_line(), "ana: remind me about the dentist");
    }

    #[test]
    fn equality_covers_every_field() {
        let a = sample();
        let mut b = sample();
        assert_eq!(a, b);
        b.mode = "voice".into();
        assert_ne!(a, b);
    }

    #[test]
    fn serde_uses_camel_case() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert!(json.contains("\"timestamp\""));
        assert!(json.contains("\"platform\""));
    }
}
