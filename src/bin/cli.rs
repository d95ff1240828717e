//! Writeups CLI
//!
//! Browse the catalog from a terminal or serve the local mirror over HTTP.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use writeups::{
    error::{AppError, Result},
    models::{Config, Item, display_name},
    server,
    services::download_link,
    state::{Browser, Phase},
};

/// writeups - CTF writeup and post browser
#[derive(Parser, Debug)]
#[command(name = "writeups", version, about = "Browse and serve CTF writeups")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "writeups.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Read from the local mirror instead of GitHub
    #[arg(long)]
    local: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the local mirror over HTTP
    Serve {
        /// Address to bind (default: [server] bind)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Print the challenge and post catalogs
    Catalog {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print a challenge writeup
    Open {
        ctf: String,
        name: String,

        /// Also print the solver script
        #[arg(long)]
        solver: bool,
    },

    /// Print a post
    Post {
        /// File stem or display name
        name: String,
    },

    /// Validate the configuration
    Validate,
}

/// Initialize logging from the configured level.
fn init_logging(level: &str, verbose: bool) {
    let level = if verbose { "debug" } else { level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load_or_default(&cli.config);
    config.apply_env();
    if cli.local {
        config.source.local = true;
    }
    init_logging(&config.logging.level, cli.verbose);

    log::info!(
        "Using {} backend",
        if config.is_local() { "local" } else { "remote" }
    );

    match cli.command {
        Command::Serve { bind } => {
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            server::start_server(&config).await?;
        }

        Command::Catalog { json } => {
            let mut browser = Browser::from_config(&config)?;
            browser.refresh().await;
            let catalog = &browser.state().catalog;

            if json {
                println!("{}", serde_json::to_string_pretty(catalog)?);
            } else {
                println!("Challenges ({}):", catalog.challenges.len());
                for c in &catalog.challenges {
                    let marker = if c.solution.is_some() { " [solver]" } else { "" };
                    println!("  {}/{}{}", c.ctf, c.name, marker);
                }
                println!("Posts ({}):", catalog.posts.len());
                for p in &catalog.posts {
                    println!("  {}", p.display_name());
                }
            }
        }

        Command::Open { ctf, name, solver } => {
            let mut browser = Browser::from_config(&config)?;
            browser.refresh().await;

            let entry = browser
                .state()
                .catalog
                .challenge(&ctf, &name)
                .cloned()
                .ok_or_else(|| AppError::not_found(format!("{ctf}/{name}")))?;
            let link = download_link(&config, &entry);

            browser.open(Item::Challenge(entry)).await;
            println!("{}", browser.state().content);

            if solver {
                browser.toggle_solver();
                if let Some(text) = browser.state().solver_panel() {
                    println!("\n--- solver ---\n{}", text);
                }
            }
            println!("\nDownload: {}", link);

            if browser.state().phase == Phase::ItemLoadError {
                return Err(AppError::not_found(format!("{ctf}/{name}")));
            }
        }

        Command::Post { name } => {
            let mut browser = Browser::from_config(&config)?;
            browser.refresh().await;

            let entry = browser
                .state()
                .catalog
                .post(&name)
                .cloned()
                .ok_or_else(|| AppError::not_found(name.clone()))?;
            log::info!("Opening post \"{}\"", display_name(&entry.name));

            browser.open(Item::Post(entry)).await;
            println!("{}", browser.state().content);

            if browser.state().phase == Phase::ItemLoadError {
                return Err(AppError::not_found(name));
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("Config OK");
        }
    }

    Ok(())
}
