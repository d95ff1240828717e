use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::{
        HeaderValue, StatusCode,
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::server::ServerState;
use crate::server::archive::zip_directory;
use crate::server::error::{ApiError, NO_SOLVER, NOT_FOUND, SOLUTION_MISSING};
use crate::services::find_solver;
use crate::source::ContentSource;
use crate::utils::{post_api_url, validate_segment};

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
const APPLICATION_ZIP: &str = "application/zip";

#[derive(Deserialize)]
pub struct ChallengeQuery {
    ctf: Option<String>,
    name: Option<String>,
}

impl ChallengeQuery {
    /// Both parameters, when present and safe to use as path segments.
    fn segments(&self) -> Option<(&str, &str)> {
        let ctf = validate_segment(self.ctf.as_deref()?)?;
        let name = validate_segment(self.name.as_deref()?)?;
        Some((ctf, name))
    }
}

#[derive(Deserialize)]
pub struct PostQuery {
    name: Option<String>,
}

#[derive(Serialize)]
pub struct ChallengeSummary {
    name: String,
    ctf: String,
}

#[derive(Serialize)]
pub struct PostSummary {
    name: String,
    url: String,
}

fn text(body: String) -> Response {
    ([(CONTENT_TYPE, TEXT_PLAIN)], body).into_response()
}

pub async fn challenges_handler(State(state): State<Arc<ServerState>>) -> Json<Vec<ChallengeSummary>> {
    let summaries = match state.aggregator.build_challenge_catalog(&state.writeups).await {
        Ok(outcome) => outcome
            .entries
            .into_iter()
            .map(|c| ChallengeSummary {
                name: c.name,
                ctf: c.ctf,
            })
            .collect(),
        Err(e) => {
            log::error!("Error fetching challenges: {}", e);
            Vec::new()
        }
    };
    Json(summaries)
}

pub async fn writeup_handler(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<ChallengeQuery>,
) -> Result<Response, ApiError> {
    let (ctf, name) = query.segments().ok_or(ApiError::NotFound(NOT_FOUND))?;
    let layout = state.aggregator.layout();
    let locator = state
        .writeups
        .locator_for(&[ctf, name, layout.writeup_file.as_str()]);

    let body = state
        .writeups
        .read_content(&locator)
        .await
        .map_err(|e| ApiError::from_app(NOT_FOUND, e))?;
    Ok(text(body))
}

pub async fn solver_handler(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<ChallengeQuery>,
) -> Result<Response, ApiError> {
    let (ctf, name) = query
        .segments()
        .ok_or(ApiError::NotFound(SOLUTION_MISSING))?;
    let layout = state.aggregator.layout();
    let handle = state
        .writeups
        .handle_for(&[ctf, name, layout.solution_dir.as_str()]);

    match find_solver(&state.writeups, &handle, &layout.solver_extension).await {
        Ok(Some(body)) => Ok(text(body)),
        Ok(None) => Err(ApiError::NotFound(NO_SOLVER)),
        Err(e) => Err(ApiError::from_app(SOLUTION_MISSING, e)),
    }
}

pub async fn posts_handler(State(state): State<Arc<ServerState>>) -> Json<Vec<PostSummary>> {
    let summaries = match state.aggregator.build_post_catalog(&state.posts).await {
        Ok(posts) => posts
            .into_iter()
            .map(|p| PostSummary {
                url: post_api_url(&p.name),
                name: p.name,
            })
            .collect(),
        Err(e) => {
            log::error!("Error fetching posts: {}", e);
            Vec::new()
        }
    };
    Json(summaries)
}

pub async fn post_handler(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<PostQuery>,
) -> Result<Response, ApiError> {
    let name = query
        .name
        .as_deref()
        .and_then(validate_segment)
        .ok_or(ApiError::NotFound(NOT_FOUND))?;
    let extension = state.aggregator.layout().post_extension.as_str();

    let file_name = format!("{name}{extension}");
    let locator = state.posts.locator_for(&[file_name.as_str()]);
    let direct = match state.posts.read_content(&locator).await {
        Ok(body) => return Ok(text(body)),
        Err(e) => e,
    };

    // Display names ("my post") are not reversible, so match against the catalog
    let posts = state
        .aggregator
        .build_post_catalog(&state.posts)
        .await
        .map_err(|e| ApiError::from_app(NOT_FOUND, e))?;
    let Some(post) = posts
        .iter()
        .find(|p| p.name == name || p.display_name() == name)
    else {
        return Err(ApiError::from_app(NOT_FOUND, direct));
    };

    let body = state
        .posts
        .read_content(&post.url)
        .await
        .map_err(|e| ApiError::from_app(NOT_FOUND, e))?;
    Ok(text(body))
}

pub async fn download_handler(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<ChallengeQuery>,
) -> Result<Response, ApiError> {
    let (ctf, name) = query
        .segments()
        .ok_or(ApiError::NotFound(SOLUTION_MISSING))?;
    let layout = state.aggregator.layout();
    let handle = state
        .writeups
        .handle_for(&[ctf, name, layout.solution_dir.as_str()]);

    if !state.writeups.dir_exists(&handle).await {
        return Err(ApiError::NotFound(SOLUTION_MISSING));
    }

    let dir = state
        .writeups
        .path(handle.as_str())
        .map_err(|e| ApiError::from_app(SOLUTION_MISSING, e))?;
    let bytes = zip_directory(dir)
        .await
        .map_err(|e| ApiError::from_app(SOLUTION_MISSING, e))?;

    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}.zip\"",
        name.replace('"', "")
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("attachment; filename=\"solution.zip\""));

    log::info!("Serving {} bytes for {}/{}", bytes.len(), ctf, name);
    Ok((
        StatusCode::OK,
        [
            (CONTENT_TYPE, HeaderValue::from_static(APPLICATION_ZIP)),
            (CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}
