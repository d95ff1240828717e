//! Application configuration structures.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Environment switch selecting the local backend.
pub const ENV_LOCAL: &str = "WRITEUPS_LOCAL";

/// Environment variable carrying the optional GitHub credential.
pub const ENV_GITHUB_TOKEN: &str = "WRITEUPS_GITHUB_TOKEN";

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Backend selection
    #[serde(default)]
    pub source: SourceConfig,

    /// Local filesystem mirror
    #[serde(default)]
    pub local: LocalConfig,

    /// GitHub contents API backend
    #[serde(default)]
    pub remote: RemoteConfig,

    /// HTTP client behavior
    #[serde(default)]
    pub http: HttpConfig,

    /// Reserved file and directory names
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Local API server
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides using the given variable lookup.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup(ENV_LOCAL) {
            self.source.local = parse_switch(&value);
        }
        if let Some(token) = lookup(ENV_GITHUB_TOKEN) {
            let token = token.trim();
            if !token.is_empty() {
                self.remote.token = Some(token.to_string());
            }
        }
    }

    /// Whether the local filesystem backend is active.
    pub fn is_local(&self) -> bool {
        self.source.local
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if self.http.max_concurrent == 0 {
            return Err(AppError::validation("http.max_concurrent must be > 0"));
        }
        if self.layout.writeup_file.trim().is_empty() {
            return Err(AppError::validation("layout.writeup_file is empty"));
        }
        if self.layout.solution_dir.trim().is_empty() {
            return Err(AppError::validation("layout.solution_dir is empty"));
        }
        for (key, ext) in [
            ("layout.solver_extension", &self.layout.solver_extension),
            ("layout.post_extension", &self.layout.post_extension),
        ] {
            if !ext.starts_with('.') || ext.len() < 2 {
                return Err(AppError::validation(format!(
                    "{key} must look like \".ext\", got {ext:?}"
                )));
            }
        }
        if !self.source.local {
            if !self.remote.repo.contains('/') {
                return Err(AppError::validation("remote.repo must be \"owner/name\""));
            }
            if !self.remote.posts_repo.contains('/') {
                return Err(AppError::validation(
                    "remote.posts_repo must be \"owner/name\"",
                ));
            }
            url::Url::parse(&self.remote.api_base)
                .map_err(|e| AppError::validation(format!("remote.api_base: {e}")))?;
        }
        self.server
            .bind
            .parse::<std::net::SocketAddr>()
            .map_err(|e| AppError::validation(format!("server.bind: {e}")))?;
        Ok(())
    }
}

/// Parse a boolean-like environment value.
fn parse_switch(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

/// Backend selection.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SourceConfig {
    /// Read from the local mirror instead of GitHub
    #[serde(default)]
    pub local: bool,
}

/// Local filesystem mirror paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalConfig {
    /// Root holding `<ctf>/<challenge>/` directories
    #[serde(default = "defaults::local_root")]
    pub root: PathBuf,

    /// Directory holding standalone posts
    #[serde(default = "defaults::local_posts_root")]
    pub posts_root: PathBuf,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            root: defaults::local_root(),
            posts_root: defaults::local_posts_root(),
        }
    }
}

/// GitHub repositories and credentials.
#[derive(Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// API base URL
    #[serde(default = "defaults::api_base")]
    pub api_base: String,

    /// Repository holding the writeups (`owner/name`)
    #[serde(default = "defaults::repo")]
    pub repo: String,

    /// Repository holding the posts (`owner/name`)
    #[serde(default = "defaults::posts_repo")]
    pub posts_repo: String,

    /// Branch used for archive downloads
    #[serde(default = "defaults::branch")]
    pub branch: String,

    /// Bearer token attached to every request when set
    #[serde(default, skip_serializing)]
    pub token: Option<String>,
}

impl fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("api_base", &self.api_base)
            .field("repo", &self.repo)
            .field("posts_repo", &self.posts_repo)
            .field("branch", &self.branch)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .finish()
    }
}

impl RemoteConfig {
    /// Contents API URL of a repository root.
    pub fn contents_url(&self, repo: &str) -> String {
        format!(
            "{}/repos/{}/contents",
            self.api_base.trim_end_matches('/'),
            repo
        )
    }

    /// Archive download link for the writeups repository.
    pub fn archive_url(&self) -> String {
        format!(
            "https://github.com/{}/archive/refs/heads/{}.zip",
            self.repo, self.branch
        )
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_base: defaults::api_base(),
            repo: defaults::repo(),
            posts_repo: defaults::posts_repo(),
            branch: defaults::branch(),
            token: None,
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Maximum collections scanned concurrently
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// Reserved names of the content tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LayoutConfig {
    /// File that marks a challenge directory
    #[serde(default = "defaults::writeup_file")]
    pub writeup_file: String,

    /// Directory holding solver scripts
    #[serde(default = "defaults::solution_dir")]
    pub solution_dir: String,

    /// Extension of solver scripts
    #[serde(default = "defaults::solver_extension")]
    pub solver_extension: String,

    /// Extension of post files
    #[serde(default = "defaults::post_extension")]
    pub post_extension: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            writeup_file: defaults::writeup_file(),
            solution_dir: defaults::solution_dir(),
            solver_extension: defaults::solver_extension(),
            post_extension: defaults::post_extension(),
        }
    }
}

/// Local API server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to bind
    #[serde(default = "defaults::bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: defaults::bind(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log filter when `RUST_LOG` is unset
    #[serde(default = "defaults::level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::level(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // Local defaults
    pub fn local_root() -> PathBuf {
        PathBuf::from("content/writeups")
    }
    pub fn local_posts_root() -> PathBuf {
        PathBuf::from("content/posts")
    }

    // Remote defaults
    pub fn api_base() -> String {
        "https://api.github.com".into()
    }
    pub fn repo() -> String {
        "youssef-grayaa/CTF_Writeups".into()
    }
    pub fn posts_repo() -> String {
        "youssef-grayaa/random_posts".into()
    }
    pub fn branch() -> String {
        "main".into()
    }

    // HTTP defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; writeups/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn max_concurrent() -> usize {
        4
    }

    // Layout defaults
    pub fn writeup_file() -> String {
        "WRITEUP.md".into()
    }
    pub fn solution_dir() -> String {
        "Solution".into()
    }
    pub fn solver_extension() -> String {
        ".py".into()
    }
    pub fn post_extension() -> String {
        ".md".into()
    }

    // Server defaults
    pub fn bind() -> String {
        "127.0.0.1:5173".into()
    }

    // Logging defaults
    pub fn level() -> String {
        "info".into()
    }
}
