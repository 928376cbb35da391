//! # recap-core
//!
//! Shared domain types for the recap memory service.
//!
//! Two records flow through the system:
//!
//! - [`BufferMessage`] — a raw transcript message awaiting compaction.
//!   Ephemeral: written by ingestion, consumed and deleted by the engine.
//! - [`Summary`] — a generational summary. Stage 1 condenses raw messages;
//!   stage N condenses stage-(N-1) summaries. Immutable once created.
//!
//! Timestamps are `chrono::DateTime<Utc>` in Rust and sortable ISO-8601
//! strings on disk and on the wire (see [`time`]).

#![deny(unsafe_code)]

pub mod ids;
pub mod messages;
pub mod summaries;
pub mod time;

pub use messages::BufferMessage;
pub use summaries::Summary;
