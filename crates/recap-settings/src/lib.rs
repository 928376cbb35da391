//! # recap-settings
//!
//! Settings for the recap memory service.
//!
//! Loading flow:
//! 1. Start with compiled [`RecapSettings::default()`]
//! 2. If `~/.recap/settings.json` exists, deep-merge user values over
//!    defaults
//! 3. Apply `RECAP_*` environment variable overrides (highest priority)

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{load_settings, load_settings_from_path, settings_path};
pub use types::{
    EngineSettings, RecapSettings, StageTransitionSettings, StorageSettings, SummarizerSettings,
};
