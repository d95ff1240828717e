//! Local filesystem content source.
//!
//! Handles and locators are `/`-separated paths relative to the root, so the
//! same values can be rebuilt from request parameters by the local API.
//! Listings are sorted by name because `read_dir` order is unspecified.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::{EntryKind, Handle, Locator, SourceEntry};
use crate::source::ContentSource;
use crate::utils::join_segments;

/// Filesystem-backed content source.
#[derive(Debug, Clone)]
pub struct LocalSource {
    root_dir: PathBuf,
}

impl LocalSource {
    /// Create a new LocalSource rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root_dir
    }

    /// Handle of a directory given its path segments.
    pub fn handle_for(&self, segments: &[&str]) -> Handle {
        Handle::new(join_segments(segments.iter().copied()))
    }

    /// Locator of a file given its path segments.
    pub fn locator_for(&self, segments: &[&str]) -> Locator {
        Locator::new(join_segments(segments.iter().copied()))
    }

    /// Resolve a relative key to a path under the root.
    ///
    /// Keys that would leave the root are reported as not found.
    pub fn path(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(AppError::not_found(key));
        }
        Ok(self.root_dir.join(relative))
    }

    /// Whether the directory behind a handle exists.
    pub async fn dir_exists(&self, handle: &Handle) -> bool {
        match self.path(handle.as_str()) {
            Ok(path) => tokio::fs::metadata(&path)
                .await
                .map(|m| m.is_dir())
                .unwrap_or(false),
            Err(_) => false,
        }
    }

    async fn read_dir(&self, key: &str) -> Result<Vec<SourceEntry>> {
        let dir = self.path(key)?;
        let mut reader = match tokio::fs::read_dir(&dir).await {
            Ok(reader) => reader,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AppError::not_found(dir.display().to_string()));
            }
            Err(e) => return Err(AppError::Io(e)),
        };

        let mut entries = Vec::new();
        while let Some(item) = reader.next_entry().await? {
            let name = item.file_name().to_string_lossy().into_owned();
            // Follow symlinks so linked directories list like real ones
            let kind = match tokio::fs::metadata(item.path()).await {
                Ok(meta) if meta.is_dir() => EntryKind::Dir,
                Ok(meta) if meta.is_file() => EntryKind::File,
                _ => EntryKind::Other,
            };
            let relative = join_segments([key, name.as_str()]);
            let locator = (kind == EntryKind::File).then(|| Locator::new(relative.clone()));
            entries.push(SourceEntry {
                name,
                kind,
                handle: Handle::new(relative),
                locator,
            });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}

#[async_trait]
impl ContentSource for LocalSource {
    async fn list_root(&self) -> Result<Vec<SourceEntry>> {
        self.read_dir("").await
    }

    async fn list_children(&self, handle: &Handle) -> Result<Vec<SourceEntry>> {
        self.read_dir(handle.as_str()).await
    }

    async fn read_content(&self, locator: &Locator) -> Result<String> {
        let path = self.path(locator.as_str())?;
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::not_found(locator.as_str()))
            }
            // Reading a directory is an absence, not a transport failure
            Err(_) if path.is_dir() => Err(AppError::not_found(locator.as_str())),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fixture() -> TempDir {
        let tmp = TempDir::new().unwrap();
        let chal = tmp.path().join("ctfA/chal1");
        std::fs::create_dir_all(chal.join("Solution")).unwrap();
        std::fs::write(chal.join("WRITEUP.md"), "# chal1").unwrap();
        std::fs::write(chal.join("Solution/solve.py"), "print('flag')").unwrap();
        std::fs::create_dir_all(tmp.path().join("ctfA/chal2")).unwrap();
        tmp
    }

    #[tokio::test]
    async fn test_list_children_sorted_with_kinds() {
        let tmp = fixture();
        let source = LocalSource::new(tmp.path());

        let entries = source
            .list_children(&Handle::new("ctfA/chal1"))
            .await
            .unwrap();
        let summary: Vec<_> = entries.iter().map(|e| (e.name.as_str(), e.kind)).collect();
        assert_eq!(
            summary,
            vec![("Solution", EntryKind::Dir), ("WRITEUP.md", EntryKind::File)]
        );
        assert_eq!(entries[0].handle, Handle::new("ctfA/chal1/Solution"));
        assert!(entries[0].locator.is_none());
        assert_eq!(
            entries[1].locator,
            Some(Locator::new("ctfA/chal1/WRITEUP.md"))
        );
    }

    #[tokio::test]
    async fn test_read_content() {
        let tmp = fixture();
        let source = LocalSource::new(tmp.path());

        let text = source
            .read_content(&source.locator_for(&["ctfA", "chal1", "WRITEUP.md"]))
            .await
            .unwrap();
        assert_eq!(text, "# chal1");
    }

    #[tokio::test]
    async fn test_missing_paths_are_not_found() {
        let tmp = fixture();
        let source = LocalSource::new(tmp.path());

        let err = source
            .read_content(&Locator::new("ctfA/missing/WRITEUP.md"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let err = source
            .list_children(&Handle::new("ctfA/chal2/Solution"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let err = source
            .read_content(&Locator::new("ctfA/chal1"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_escaping_root_rejected() {
        let tmp = fixture();
        let source = LocalSource::new(tmp.path().join("ctfA"));

        let err = source
            .read_content(&Locator::new("../ctfA/chal1/WRITEUP.md"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(source.path("/etc/passwd").is_err());
        assert!(source.path("./chal1/WRITEUP.md").is_ok());
    }

    #[tokio::test]
    async fn test_dir_exists() {
        let tmp = fixture();
        let source = LocalSource::new(tmp.path());

        assert!(source.dir_exists(&source.handle_for(&["ctfA", "chal1", "Solution"])).await);
        assert!(!source.dir_exists(&source.handle_for(&["ctfA", "chal2", "Solution"])).await);
        assert!(!source.dir_exists(&source.handle_for(&["ctfA", "chal1", "WRITEUP.md"])).await);
    }
}
