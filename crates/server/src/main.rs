use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clipfetch_core::{
    load_config, validate_config, Config, FfmpegReencoder, Fetcher, JobStore, JobSupervisor,
    Reencoder, Transcriber, WhisperTranscriber, YtDlpFetcher,
};

use clipfetch_server::api::create_router;
use clipfetch_server::state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("CLIPFETCH_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration; the service runs fine on defaults without a file
    let config = if config_path.exists() {
        info!("Loading configuration from {:?}", config_path);
        load_config(&config_path)
            .with_context(|| format!("Failed to load config from {:?}", config_path))?
    } else {
        info!("No configuration file at {:?}, using defaults", config_path);
        Config::default()
    };

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Default output directory: {:?}", config.output.default_dir);

    // Create capability adapters
    let fetcher: Arc<dyn Fetcher> = Arc::new(YtDlpFetcher::new(config.fetcher.clone()));
    let reencoder: Arc<dyn Reencoder> = Arc::new(FfmpegReencoder::new(config.reencoder.clone()));
    let transcriber: Arc<dyn Transcriber> =
        Arc::new(WhisperTranscriber::new(config.transcriber.clone()));

    // Probe the tools up front so misconfiguration shows at startup, not
    // mid-job. Missing tools degrade the affected stage, not the server.
    if let Err(e) = fetcher.validate().await {
        warn!("Fetcher unavailable: {}", e);
    }
    if let Err(e) = reencoder.validate().await {
        warn!("Reencoder unavailable: {}", e);
    }
    if let Err(e) = transcriber.validate().await {
        warn!("Transcriber unavailable: {}", e);
    }

    // Create job store and supervisor
    let store = Arc::new(JobStore::new(config.supervisor.max_records));
    let supervisor = Arc::new(JobSupervisor::new(
        config.supervisor.clone(),
        config.output.default_dir.clone(),
        Arc::clone(&store),
        fetcher,
        reencoder,
        transcriber,
    ));
    info!("Job supervisor initialized");

    // Create app state and router
    let state = Arc::new(AppState::new(
        config.clone(),
        Arc::clone(&store),
        Arc::clone(&supervisor),
    ));
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Signal in-flight runners before exiting
    info!("Server shutting down...");
    supervisor.shutdown();

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
