//! OpenAI-compatible HTTP summarizer.
//!
//! Posts a single non-streaming `/chat/completions` request per call. The
//! request timeout is set on the [`reqwest::Client`], so a hung endpoint
//! surfaces as [`SummarizerError::Timeout`] rather than blocking the run.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::constants::{CONDENSE_INPUT_HEADER, CONDENSE_SYSTEM_PROMPT};
use crate::summarizer::{Summarizer, SummarizerError, SummarizerResult};

/// Configuration for [`HttpSummarizer`].
#[derive(Debug, Clone)]
pub struct HttpSummarizerConfig {
    /// Base URL of the API, without the `/chat/completions` suffix
    /// (e.g. `https://api.openai.com/v1`).
    pub base_url: String,
    /// Model name sent in the request body.
    pub model: String,
    /// Bearer token, if the endpoint requires one.
    pub api_key: Option<String>,
    /// Completion token budget.
    pub max_tokens: u32,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// [`Summarizer`] backed by an OpenAI-compatible chat-completions endpoint.
pub struct HttpSummarizer {
    client: reqwest::Client,
    config: HttpSummarizerConfig,
}

impl HttpSummarizer {
    /// Build a summarizer with the timeout baked into the HTTP client.
    pub fn new(config: HttpSummarizerConfig) -> SummarizerResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    fn user_prompt(texts: &[String]) -> String {
        format!("{CONDENSE_INPUT_HEADER}\n\n{}", texts.join("\n"))
    }
}

#[async_trait]
impl Summarizer for HttpSummarizer {
    async fn summarize(&self, texts: &[String]) -> SummarizerResult<String> {
        let prompt = Self::user_prompt(texts);
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: CONDENSE_SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: 0.2,
        };

        trace!(
            input_texts = texts.len(),
            prompt_bytes = prompt.len(),
            model = %self.config.model,
            "sending condensation request"
        );

        let mut request = self.client.post(self.endpoint()).json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                SummarizerError::Timeout {
                    timeout_ms: self.config.timeout_ms,
                }
            } else {
                SummarizerError::Http(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SummarizerError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        let content = content.trim();
        if content.is_empty() {
            return Err(SummarizerError::EmptyCompletion);
        }

        debug!(summary_bytes = content.len(), "condensation complete");
        Ok(content.to_owned())
    }
}
