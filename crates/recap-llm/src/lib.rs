//! # recap-llm
//!
//! The text-generation seam of the recap engine: the [`Summarizer`] trait
//! maps an ordered list of texts to one summary string, and
//! [`HttpSummarizer`] implements it against any OpenAI-compatible
//! chat-completions endpoint with a bounded request timeout.
//!
//! The summarizer is the only collaborator that may block on network
//! latency; everything it can do wrong is a typed [`SummarizerError`],
//! including the empty-completion case — callers must never purge source
//! data on anything but a clean `Ok`.

#![deny(unsafe_code)]

pub mod constants;
pub mod http;
pub mod summarizer;

pub use http::{HttpSummarizer, HttpSummarizerConfig};
pub use summarizer::{Summarizer, SummarizerError, SummarizerResult};
