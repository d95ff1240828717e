//! Content source abstractions.
//!
//! A source is a read-only tree of directories and files:
//!
//! ```text
//! {root}/
//! ├── .github/              # hidden, never a collection
//! ├── picoCTF/              # Collection
//! │   ├── chal1/            # Challenge
//! │   │   ├── WRITEUP.md
//! │   │   └── Solution/
//! │   │       └── solve.py
//! │   └── notes/            # no WRITEUP.md, skipped
//! └── README.md
//! ```
//!
//! Two backends implement it: `LocalSource` over a filesystem mirror and
//! `RemoteSource` over the GitHub contents API. Nothing is cached; every call
//! hits the backend.

pub mod local;
pub mod remote;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Collection, Config, Handle, Locator, SourceEntry};
use crate::utils::http;

// Re-export for convenience
pub use local::LocalSource;
pub use remote::RemoteSource;

/// Trait for content backends.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// List the entries at the backend root.
    async fn list_root(&self) -> Result<Vec<SourceEntry>>;

    /// List the entries under a directory handle.
    async fn list_children(&self, handle: &Handle) -> Result<Vec<SourceEntry>>;

    /// Read the raw text behind a locator.
    ///
    /// Fails with `AppError::NotFound` when the content is absent.
    async fn read_content(&self, locator: &Locator) -> Result<String>;

    /// List top-level collections, skipping hidden and non-directory entries.
    async fn list_collections(&self) -> Result<Vec<Collection>> {
        let entries = self.list_root().await?;
        Ok(entries
            .into_iter()
            .filter(|e| e.is_dir() && !e.is_hidden())
            .map(Collection::from)
            .collect())
    }
}

/// The writeups and posts backends of one deployment.
#[derive(Clone)]
pub struct Sources {
    pub writeups: Arc<dyn ContentSource>,
    pub posts: Arc<dyn ContentSource>,
}

impl Sources {
    /// Build the backend pair selected by the configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        if config.is_local() {
            log::info!(
                "Using local mirror at {} (posts: {})",
                config.local.root.display(),
                config.local.posts_root.display()
            );
            Ok(Self {
                writeups: Arc::new(LocalSource::new(&config.local.root)),
                posts: Arc::new(LocalSource::new(&config.local.posts_root)),
            })
        } else {
            let remote = &config.remote;
            log::info!(
                "Using GitHub repositories {} and {}{}",
                remote.repo,
                remote.posts_repo,
                if remote.token.is_some() {
                    " (authenticated)"
                } else {
                    ""
                }
            );
            let client = http::create_async_client(&config.http, remote.token.as_deref())?;
            Ok(Self {
                writeups: Arc::new(RemoteSource::new(
                    client.clone(),
                    remote.contents_url(&remote.repo),
                )),
                posts: Arc::new(RemoteSource::new(
                    client,
                    remote.contents_url(&remote.posts_repo),
                )),
            })
        }
    }
}
