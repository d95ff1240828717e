// src/services/loader.rs

//! Lazy content loading for selected items.

use crate::error::Result;
use crate::models::{ChallengeEntry, Config, Handle, LayoutConfig, PostEntry};
use crate::source::ContentSource;
use crate::utils::download_api_url;

/// Content fetched for one selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedItem {
    /// Writeup or post body
    pub content: String,

    /// Companion solver script, challenges only
    pub solver: Option<String>,
}

/// Find and read the first solver script in a solution directory.
///
/// Returns `Ok(None)` when the directory has no script and
/// `Err(NotFound)` when the directory itself is missing.
pub async fn find_solver(
    source: &dyn ContentSource,
    solution: &Handle,
    extension: &str,
) -> Result<Option<String>> {
    let files = source.list_children(solution).await?;
    let script = files
        .into_iter()
        .find(|f| f.is_file() && f.name.ends_with(extension));

    match script.and_then(|f| f.locator) {
        Some(locator) => Ok(Some(source.read_content(&locator).await?)),
        None => Ok(None),
    }
}

/// Load a writeup and, when available, its solver script.
///
/// Only the writeup itself can fail the load.
pub async fn load_challenge(
    source: &dyn ContentSource,
    layout: &LayoutConfig,
    entry: &ChallengeEntry,
) -> Result<LoadedItem> {
    let content = source.read_content(&entry.writeup).await?;

    let solver = match &entry.solution {
        Some(solution) => match find_solver(source, solution, &layout.solver_extension).await {
            Ok(solver) => solver,
            Err(e) if e.is_not_found() => None,
            Err(e) => {
                log::warn!("Solver lookup failed for {}/{}: {}", entry.ctf, entry.name, e);
                None
            }
        },
        None => None,
    };

    if solver.is_none() {
        log::info!("No solver found for {}/{}", entry.ctf, entry.name);
    }

    Ok(LoadedItem { content, solver })
}

/// Load a post body.
pub async fn load_post(source: &dyn ContentSource, entry: &PostEntry) -> Result<LoadedItem> {
    let content = source.read_content(&entry.url).await?;
    Ok(LoadedItem {
        content,
        solver: None,
    })
}

/// Where the "download challenge" action points.
///
/// The local API zips the solution directory; GitHub only offers the whole
/// repository archive.
pub fn download_link(config: &Config, entry: &ChallengeEntry) -> String {
    if config.is_local() {
        download_api_url(&entry.ctf, &entry.name)
    } else {
        config.remote.archive_url()
    }
}
