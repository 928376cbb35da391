//! # recap-store
//!
//! `SQLite` persistence for the recap engine's three collaborator stores.
//!
//! [`SqliteStore`] implements `BufferStore`, `SummaryStore`, and
//! `RunMarkerStore` over one connection, so a single database file holds
//! the rolling buffer, every summary stage, and the debounce marker.
//! Timestamps are stored as fixed-width sortable ISO-8601 text, which
//! makes `ORDER BY timestamp` agree with chronological order.

#![deny(unsafe_code)]

pub mod schema;
pub mod sqlite;

pub use sqlite::SqliteStore;
