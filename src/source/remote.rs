//! GitHub contents API content source.
//!
//! Each listing is a single `GET {api}/repos/{owner}/{repo}/contents/{path}`.
//! Directory rows carry their own API `url`, which becomes the child handle;
//! file rows carry a `download_url`, which becomes the locator.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::error::Result;
use crate::models::{EntryKind, Handle, Locator, SourceEntry};
use crate::source::ContentSource;
use crate::utils::http::fetch_text;

/// One row of a contents API directory listing.
#[derive(Debug, Clone, Deserialize)]
struct ContentsItem {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    url: String,
    #[serde(default)]
    download_url: Option<String>,
}

impl From<ContentsItem> for SourceEntry {
    fn from(item: ContentsItem) -> Self {
        let kind = match item.kind.as_str() {
            "dir" => EntryKind::Dir,
            "file" => EntryKind::File,
            _ => EntryKind::Other,
        };
        let locator = match kind {
            EntryKind::File => item.download_url.map(Locator::new),
            _ => None,
        };
        SourceEntry {
            name: item.name,
            kind,
            handle: Handle::new(item.url),
            locator,
        }
    }
}

/// Repository-backed content source.
#[derive(Debug, Clone)]
pub struct RemoteSource {
    client: Client,
    root: Handle,
}

impl RemoteSource {
    /// Create a source rooted at a repository contents URL.
    ///
    /// The client is expected to carry credentials and default headers.
    pub fn new(client: Client, contents_url: impl Into<String>) -> Self {
        Self {
            client,
            root: Handle::new(contents_url),
        }
    }

    pub fn root(&self) -> &Handle {
        &self.root
    }

    async fn list(&self, url: &str) -> Result<Vec<SourceEntry>> {
        log::debug!("Listing {}", url);
        let body = fetch_text(&self.client, url).await?;
        let items: Vec<ContentsItem> = serde_json::from_str(&body)?;
        Ok(items.into_iter().map(SourceEntry::from).collect())
    }
}

#[async_trait]
impl ContentSource for RemoteSource {
    async fn list_root(&self) -> Result<Vec<SourceEntry>> {
        self.list(self.root.as_str()).await
    }

    async fn list_children(&self, handle: &Handle) -> Result<Vec<SourceEntry>> {
        self.list(handle.as_str()).await
    }

    async fn read_content(&self, locator: &Locator) -> Result<String> {
        log::debug!("Downloading {}", locator);
        fetch_text(&self.client, locator.as_str()).await
    }
}
