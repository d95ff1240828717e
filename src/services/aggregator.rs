// src/services/aggregator.rs

//! Catalog aggregation service.
//!
//! Walks a content source and flattens it into challenge and post catalogs.

use futures::stream::{self, StreamExt};

use crate::error::{AppError, Result};
use crate::models::{ChallengeEntry, ChallengeOutcome, Collection, LayoutConfig, PostEntry};
use crate::source::ContentSource;

/// Result of scanning one collection.
#[derive(Debug, Default)]
struct CollectionScan {
    entries: Vec<ChallengeEntry>,
    challenge_total: usize,
    failures: usize,
}

/// Service for building catalogs from a content source.
#[derive(Debug, Clone)]
pub struct Aggregator {
    layout: LayoutConfig,
    concurrency: usize,
}

impl Aggregator {
    /// Create an aggregator for the given layout.
    ///
    /// `concurrency` bounds how many collections are scanned at once.
    pub fn new(layout: LayoutConfig, concurrency: usize) -> Self {
        Self {
            layout,
            concurrency: concurrency.max(1),
        }
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Build the challenge catalog.
    ///
    /// A failure listing the collections aborts the build. A failure below
    /// that drops only the affected collection or challenge.
    pub async fn build_challenge_catalog(
        &self,
        source: &dyn ContentSource,
    ) -> Result<ChallengeOutcome> {
        let mut outcome = ChallengeOutcome::start();

        let collections = source.list_collections().await?;
        outcome.collection_total = collections.len();
        log::debug!("Found {} collections", collections.len());

        // `buffered` yields in input order, so the catalog stays deterministic.
        let mut scans = stream::iter(collections)
            .map(|collection| async move {
                let result = self.scan_collection(source, &collection).await;
                (collection, result)
            })
            .buffered(self.concurrency);

        while let Some((collection, result)) = scans.next().await {
            match result {
                Ok(scan) => {
                    outcome.challenge_total += scan.challenge_total;
                    outcome.branch_failures += scan.failures;
                    outcome.entries.extend(scan.entries);
                }
                Err(error) => {
                    outcome.branch_failures += 1;
                    log_branch_failure(&collection.name, &error);
                }
            }
        }

        outcome.finished_at = chrono::Utc::now();
        log::info!(
            "Challenge catalog: {} writeups from {} challenges in {} collections ({} failed branches, {} ms)",
            outcome.entries.len(),
            outcome.challenge_total,
            outcome.collection_total,
            outcome.branch_failures,
            outcome.elapsed_ms()
        );
        Ok(outcome)
    }

    /// Build the post catalog from the root of a source.
    pub async fn build_post_catalog(&self, source: &dyn ContentSource) -> Result<Vec<PostEntry>> {
        let extension = self.layout.post_extension.as_str();
        let posts: Vec<PostEntry> = source
            .list_root()
            .await?
            .into_iter()
            .filter(|e| e.is_file())
            .filter_map(|e| {
                let name = e.name.strip_suffix(extension)?;
                if name.is_empty() {
                    return None;
                }
                Some(PostEntry {
                    name: name.to_string(),
                    url: e.locator?,
                })
            })
            .collect();

        log::info!("Post catalog: {} posts", posts.len());
        Ok(posts)
    }

    /// Scan the challenges of one collection, in listing order.
    async fn scan_collection(
        &self,
        source: &dyn ContentSource,
        collection: &Collection,
    ) -> Result<CollectionScan> {
        let children = source.list_children(&collection.handle).await?;
        let mut scan = CollectionScan::default();

        for challenge in children.into_iter().filter(|e| e.is_dir()) {
            scan.challenge_total += 1;

            let files = match source.list_children(&challenge.handle).await {
                Ok(files) => files,
                Err(error) => {
                    scan.failures += 1;
                    log_branch_failure(&format!("{}/{}", collection.name, challenge.name), &error);
                    continue;
                }
            };

            let writeup = files
                .iter()
                .find(|f| f.is_file() && f.name == self.layout.writeup_file)
                .and_then(|f| f.locator.clone());

            let Some(writeup) = writeup else {
                log::debug!(
                    "Skipping {}/{}: no {}",
                    collection.name,
                    challenge.name,
                    self.layout.writeup_file
                );
                continue;
            };

            let solution = files
                .iter()
                .find(|f| f.is_dir() && f.name == self.layout.solution_dir)
                .map(|f| f.handle.clone());

            scan.entries.push(ChallengeEntry {
                name: challenge.name,
                ctf: collection.name.clone(),
                writeup,
                solution,
            });
        }

        Ok(scan)
    }
}

/// Expected absences stay at debug level; transport failures are warnings.
fn log_branch_failure(branch: &str, error: &AppError) {
    if error.is_not_found() {
        log::debug!("Skipping {}: {}", branch, error);
    } else {
        log::warn!("Failed to list {}: {}", branch, error);
    }
}


#[cfg(test)]
mod tests {
    use super::memory::MemorySource;
    use super::*;
    use crate::models::{Handle, Locator};
    use crate::source::LocalSource;
    use tempfile::TempDir;

    fn aggregator() -> Aggregator {
        Aggregator::new(LayoutConfig::default(), 4)
    }

    fn names(outcome: &ChallengeOutcome) -> Vec<(String, String)> {
        outcome
            .entries
            .iter()
            .map(|e| (e.ctf.clone(), e.name.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_single_writeup_scenario_local() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("ctfA/chal1")).unwrap();
        std::fs::create_dir_all(tmp.path().join("ctfA/chal2")).unwrap();
        std::fs::write(tmp.path().join("ctfA/chal1/WRITEUP.md"), "# chal1").unwrap();

        let source = LocalSource::new(tmp.path());
        let outcome = aggregator().build_challenge_catalog(&source).await.unwrap();

        assert_eq!(outcome.entries.len(), 1);
        let entry = &outcome.entries[0];
        assert_eq!(entry.name, "chal1");
        assert_eq!(entry.ctf, "ctfA");
        assert_eq!(entry.writeup, Locator::new("ctfA/chal1/WRITEUP.md"));
        assert_eq!(entry.solution, None);
        assert_eq!(outcome.challenge_total, 2);
        assert_eq!(outcome.branch_failures, 0);
    }

    #[tokio::test]
    async fn test_collection_without_writeups_contributes_nothing() {
        let source = MemorySource::with_files(&[
            ("ctfA/chal1/notes.txt", "x"),
            ("ctfA/chal2/writeup.md", "wrong case"),
            ("ctfB/chal1/WRITEUP.md", "# b1"),
        ]);

        let outcome = aggregator().build_challenge_catalog(&source).await.unwrap();
        assert_eq!(
            names(&outcome),
            vec![("ctfB".to_string(), "chal1".to_string())]
        );
        assert_eq!(outcome.collection_total, 2);
    }

    #[tokio::test]
    async fn test_writeup_must_be_a_file() {
        let source = MemorySource::with_files(&[("ctfA/chal1/WRITEUP.md/inner.txt", "x")]);

        let outcome = aggregator().build_challenge_catalog(&source).await.unwrap();
        assert!(outcome.entries.is_empty());
    }

    #[tokio::test]
    async fn test_hidden_and_root_files_excluded() {
        let source = MemorySource::with_files(&[
            (".hidden/chal1/WRITEUP.md", "# hidden"),
            ("README.md", "readme"),
            ("ctfA/chal1/WRITEUP.md", "# a1"),
        ]);

        let outcome = aggregator().build_challenge_catalog(&source).await.unwrap();
        assert_eq!(
            names(&outcome),
            vec![("ctfA".to_string(), "chal1".to_string())]
        );
        assert_eq!(outcome.collection_total, 1);
    }

    #[tokio::test]
    async fn test_order_and_idempotence() {
        let source = MemorySource::with_files(&[
            ("alpha/z_last/WRITEUP.md", "z"),
            ("alpha/a_first/WRITEUP.md", "a"),
            ("beta/only/WRITEUP.md", "b"),
            ("gamma/one/WRITEUP.md", "g1"),
            ("gamma/two/WRITEUP.md", "g2"),
        ]);

        // Concurrency 1 and 8 must agree
        let serial = Aggregator::new(LayoutConfig::default(), 1)
            .build_challenge_catalog(&source)
            .await
            .unwrap();
        let first = Aggregator::new(LayoutConfig::default(), 8)
            .build_challenge_catalog(&source)
            .await
            .unwrap();
        let second = Aggregator::new(LayoutConfig::default(), 8)
            .build_challenge_catalog(&source)
            .await
            .unwrap();

        assert_eq!(first.entries, second.entries);
        assert_eq!(serial.entries, first.entries);
        assert_eq!(
            names(&first),
            vec![
                ("alpha".to_string(), "a_first".to_string()),
                ("alpha".to_string(), "z_last".to_string()),
                ("beta".to_string(), "only".to_string()),
                ("gamma".to_string(), "one".to_string()),
                ("gamma".to_string(), "two".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_solution_handle_recorded() {
        let source = MemorySource::with_files(&[
            ("ctfA/chal1/WRITEUP.md", "# a1"),
            ("ctfA/chal1/Solution/solve.py", "print(1)"),
        ]);

        let outcome = aggregator().build_challenge_catalog(&source).await.unwrap();
        assert_eq!(
            outcome.entries[0].solution,
            Some(Handle::new("ctfA/chal1/Solution/"))
        );
    }

    #[tokio::test]
    async fn test_branch_failures_are_isolated() {
        let source = MemorySource::with_files(&[
            ("ctfA/chal1/WRITEUP.md", "# a1"),
            ("ctfA/chal2/WRITEUP.md", "# a2"),
            ("ctfB/chal1/WRITEUP.md", "# b1"),
            ("ctfC/chal1/WRITEUP.md", "# c1"),
        ])
        .fail("ctfA/chal2/")
        .fail("ctfB/");

        let outcome = aggregator().build_challenge_catalog(&source).await.unwrap();
        assert_eq!(
            names(&outcome),
            vec![
                ("ctfA".to_string(), "chal1".to_string()),
                ("ctfC".to_string(), "chal1".to_string()),
            ]
        );
        assert_eq!(outcome.branch_failures, 2);
    }

    #[tokio::test]
    async fn test_top_level_failure_aborts() {
        let source = MemorySource::with_files(&[("ctfA/chal1/WRITEUP.md", "# a1")]).fail("");

        let result = aggregator().build_challenge_catalog(&source).await;
        assert!(result.unwrap_err().is_transport());
    }

    #[tokio::test]
    async fn test_catalog_is_not_cached() {
        use std::sync::atomic::Ordering;

        let source = MemorySource::with_files(&[("ctfA/chal1/WRITEUP.md", "# a1")]);
        let aggregator = aggregator();

        aggregator.build_challenge_catalog(&source).await.unwrap();
        let after_first = source.listings.load(Ordering::SeqCst);
        aggregator.build_challenge_catalog(&source).await.unwrap();
        assert_eq!(source.listings.load(Ordering::SeqCst), after_first * 2);
    }

    #[tokio::test]
    async fn test_post_catalog() {
        let source = MemorySource::with_files(&[
            ("hello_world.md", "# hello"),
            ("notes.txt", "not a post"),
            (".md", "no name"),
            ("drafts/wip.md", "nested"),
            ("second.post.md", "# second"),
        ]);

        let posts = aggregator().build_post_catalog(&source).await.unwrap();
        let names: Vec<_> = posts.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["hello_world", "second.post"]);
        assert_eq!(posts[0].display_name(), "hello world");
        assert_eq!(posts[0].url, Locator::new("hello_world.md"));
    }

    #[tokio::test]
    async fn test_post_locator_resolves_same_content() {
        let source = MemorySource::with_files(&[
            ("my post_v2.md", "# spaced"),
            ("my_post.md", "# body"),
        ]);

        let posts = aggregator().build_post_catalog(&source).await.unwrap();
        let catalog = crate::models::Catalog {
            challenges: Vec::new(),
            posts: posts.clone(),
        };
        for (entry, body) in posts.iter().zip(["# spaced", "# body"]) {
            let found = catalog.post(&entry.display_name()).unwrap();
            assert_eq!(found.url, entry.url);
            assert_eq!(source.read_content(&found.url).await.unwrap(), body);
        }
    }
}
