//! Catalog entries produced by the aggregator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entry::{Handle, Locator};

/// One CTF writeup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeEntry {
    /// Challenge directory name
    pub name: String,

    /// Owning collection name
    pub ctf: String,

    /// Locator of the writeup file
    pub writeup: Locator,

    /// Handle of the solution directory, when the challenge has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solution: Option<Handle>,
}

/// One standalone post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostEntry {
    /// File name with the post extension stripped
    pub name: String,

    /// Locator of the post body
    pub url: Locator,
}

impl PostEntry {
    /// Name as shown on a card: underscores become spaces.
    pub fn display_name(&self) -> String {
        display_name(&self.name)
    }
}

/// Normalize a post name for display.
pub fn display_name(name: &str) -> String {
    name.replace('_', " ")
}

/// Either kind of selectable item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Item {
    Challenge(ChallengeEntry),
    Post(PostEntry),
}

impl Item {
    pub fn name(&self) -> &str {
        match self {
            Item::Challenge(c) => &c.name,
            Item::Post(p) => &p.name,
        }
    }
}

/// Both catalogs, in traversal order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub challenges: Vec<ChallengeEntry>,
    pub posts: Vec<PostEntry>,
}

impl Catalog {
    pub fn is_empty(&self) -> bool {
        self.challenges.is_empty() && self.posts.is_empty()
    }

    /// Find a challenge by collection and name.
    pub fn challenge(&self, ctf: &str, name: &str) -> Option<&ChallengeEntry> {
        self.challenges
            .iter()
            .find(|c| c.ctf == ctf && c.name == name)
    }

    /// Find a post by name or display name.
    pub fn post(&self, name: &str) -> Option<&PostEntry> {
        self.posts
            .iter()
            .find(|p| p.name == name || p.display_name() == name)
    }
}

/// Summary of a challenge catalog build.
#[derive(Debug, Clone)]
pub struct ChallengeOutcome {
    pub entries: Vec<ChallengeEntry>,
    pub collection_total: usize,
    pub challenge_total: usize,
    pub branch_failures: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ChallengeOutcome {
    pub(crate) fn start() -> Self {
        let now = Utc::now();
        Self {
            entries: Vec::new(),
            collection_total: 0,
            challenge_total: 0,
            branch_failures: 0,
            started_at: now,
            finished_at: now,
        }
    }

    /// Build duration in milliseconds.
    pub fn elapsed_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}
