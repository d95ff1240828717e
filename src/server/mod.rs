//! Local HTTP API over the mirrored writeup and post trees.
//!
//! Handlers read straight from disk on every request; nothing is cached.

pub mod archive;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tokio::signal::ctrl_c;
#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

use crate::error::Result;
use crate::models::Config;
use crate::services::Aggregator;
use crate::source::LocalSource;

pub use error::ApiError;
pub use routes::{
    challenges_handler, download_handler, post_handler, posts_handler, solver_handler,
    writeup_handler,
};

/// Shared state handed to every handler.
pub struct ServerState {
    pub writeups: LocalSource,
    pub posts: LocalSource,
    pub aggregator: Aggregator,
}

impl ServerState {
    pub fn from_config(config: &Config) -> Arc<Self> {
        Arc::new(Self {
            writeups: LocalSource::new(&config.local.root),
            posts: LocalSource::new(&config.local.posts_root),
            aggregator: Aggregator::new(config.layout.clone(), config.http.max_concurrent),
        })
    }
}

pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/api/challenges", get(challenges_handler))
        .route("/api/writeup", get(writeup_handler))
        .route("/api/solver", get(solver_handler))
        .route("/api/posts", get(posts_handler))
        .route("/api/post", get(post_handler))
        .route("/api/download", get(download_handler))
        .with_state(state)
}

/// Serve the local API until Ctrl+C or SIGTERM.
pub async fn start_server(config: &Config) -> Result<()> {
    let state = ServerState::from_config(config);
    log::info!(
        "Serving writeups from {} and posts from {}",
        state.writeups.root().display(),
        state.posts.root().display()
    );

    let address = config.server.bind.as_str();
    log::info!("Binding to {address}");
    let listener = TcpListener::bind(address).await?;
    log::info!("Server running on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => log::info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                log::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                log::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                log::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
