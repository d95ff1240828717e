// src/models/mod.rs

//! Domain models for the writeups service.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod catalog;
mod config;
mod entry;

// Re-export all public types
pub use catalog::{
    Catalog, ChallengeEntry, ChallengeOutcome, Item, PostEntry, display_name,
};
pub use config::{
    Config, ENV_GITHUB_TOKEN, ENV_LOCAL, HttpConfig, LayoutConfig, LocalConfig, LoggingConfig,
    RemoteConfig, ServerConfig, SourceConfig,
};
pub use entry::{Collection, EntryKind, HIDDEN_PREFIX, Handle, Locator, SourceEntry};
