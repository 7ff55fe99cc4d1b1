//! arena-ui - Blind pairwise image comparison
//!
//! Serves the voting page on localhost. Images come from an optional
//! directory (manifest.json or a plain listing) and from browser uploads.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use arena_common::config::{load_config, resolve_image_dir, ConfigSource, IMAGE_DIR_ENV};
use arena_common::random::RngSource;
use arena_common::VotePolicy;
use arena_ui::{build_router, loader, AppState, ArenaSettings};
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for arena-ui
#[derive(Parser, Debug)]
#[command(name = "arena-ui")]
#[command(about = "Blind pairwise comparison of two image models")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides config file)
    #[arg(short, long, env = "ARENA_PORT")]
    port: Option<u16>,

    /// Directory of candidate images
    #[arg(short, long)]
    image_dir: Option<PathBuf>,

    /// Instruction table (`id;instruction` CSV)
    #[arg(long)]
    instructions: Option<PathBuf>,

    /// Config file (default: <config dir>/image-arena/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Round cap per session (0 = every matched pair)
    #[arg(long)]
    max_rounds: Option<usize>,

    /// Also accept tie and neither votes
    #[arg(long)]
    extended_votes: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (config, source) =
        load_config(args.config.as_deref()).context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{},tower_http=info", config.logging.level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Image Arena (arena-ui) v{}", env!("CARGO_PKG_VERSION"));
    match &source {
        ConfigSource::File(path) => info!("Config file: {}", path.display()),
        ConfigSource::Defaults => warn!("No config file found, using built-in defaults"),
    }

    let image_dir = resolve_image_dir(args.image_dir.as_deref(), IMAGE_DIR_ENV, &config);
    match &image_dir {
        Some(dir) => info!("Image directory: {}", dir.display()),
        None => info!("No image directory configured; uploads only"),
    }

    let vote_policy = if args.extended_votes {
        VotePolicy::Extended
    } else {
        config.vote_policy
    };

    let settings = ArenaSettings {
        image_dir,
        vote_policy,
        max_rounds: args.max_rounds.or(config.max_rounds),
    };
    let state = AppState::new(settings, Box::new(RngSource::from_entropy()));

    if let Some(path) = args.instructions.or(config.instructions_csv) {
        // failures are logged and shown in the UI; prompts stay blank
        let _ = loader::load_instructions(&state, &path).await;
    }

    if state.image_dir.is_some() {
        loader::spawn_catalog_load(state.clone());
    }

    let app = build_router(state);

    let port = args.port.unwrap_or(config.port);
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("arena-ui listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install terminate handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
