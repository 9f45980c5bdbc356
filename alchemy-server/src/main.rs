//! Alchemy recipe search server - Main entry point
//!
//! Loads the element corpus once, builds the immutable element graph and
//! serves the search API until Ctrl+C or SIGTERM.

use std::path::PathBuf;
use std::time::Duration;

use alchemy_common::config::{load_toml_config, resolve_corpus_path};
use alchemy_common::{Corpus, RecipeService};
use alchemy_server::{build_router, AppState};
use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "alchemy_server=info,alchemy_common=info,tower_http=info";

/// Command-line arguments for alchemy-server
#[derive(Parser, Debug)]
#[command(name = "alchemy-server")]
#[command(about = "Recipe search service for the alchemy element corpus")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides config file)
    #[arg(short, long, env = "ALCHEMY_PORT")]
    port: Option<u16>,

    /// Address to bind (overrides config file)
    #[arg(short, long, env = "ALCHEMY_BIND")]
    bind: Option<String>,

    /// Element corpus JSON file
    #[arg(long)]
    corpus: Option<PathBuf>,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG wins; otherwise the config file's level is applied once loaded
    let env_filter = EnvFilter::try_from_default_env();
    let filter_from_env = env_filter.is_ok();
    let (filter, filter_handle) =
        reload::Layer::new(env_filter.unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!(
        "Starting alchemy-server v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let config = load_toml_config(args.config.as_deref()).context("Failed to load configuration")?;

    if !filter_from_env && !config.logging.level.eq_ignore_ascii_case("info") {
        let level = &config.logging.level;
        let directives = format!(
            "alchemy_server={0},alchemy_common={0},tower_http={0}",
            level
        );
        if let Err(e) = filter_handle.reload(EnvFilter::new(directives)) {
            warn!("Could not apply log level '{}': {}", level, e);
        }
    }

    let corpus_path = resolve_corpus_path(args.corpus.as_deref(), &config);
    info!("Corpus: {}", corpus_path.display());

    let corpus = Corpus::load(&corpus_path)
        .with_context(|| format!("Failed to load corpus from {}", corpus_path.display()))?;
    let report = corpus.validation_report();
    info!(
        "Corpus loaded: {} elements, {} recipes dropped during validation",
        corpus.len(),
        report.total_dropped()
    );

    let service = RecipeService::from_corpus(corpus, config.limits);
    info!(
        "Element graph built: {} recipes",
        service.graph().recipe_count()
    );

    let state = AppState::new(
        service,
        Duration::from_millis(config.animation.step_delay_ms),
    );
    let app = build_router(state);

    let bind = args.bind.unwrap_or(config.bind_address);
    let port = args.port.unwrap_or(config.port);

    let listener = tokio::net::TcpListener::bind((bind.as_str(), port))
        .await
        .with_context(|| format!("Failed to bind to {}:{}", bind, port))?;

    info!("Listening on http://{}:{}", bind, port);

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
                error!("Failed to install SIGTERM handler: {}", e);
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
