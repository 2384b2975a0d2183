mod api;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use printbooth_core::{
    load_config, validate_config, PrintDispatcher, PrintOrchestrator, RemotePhotoGateway,
};

use api::create_router;
use state::AppState;

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
    let config_path = std::env::var("PRINTBOOTH_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Photo service: {}", config.gateway.base_url);
    if config.printer.simulate {
        info!("Printer simulate mode enabled, no OS print commands will run");
    }

    // Create the photo service gateway
    let gateway = Arc::new(
        RemotePhotoGateway::new(config.gateway.clone())
            .context("Failed to create photo gateway")?,
    );

    // Create the printer dispatch engine
    let dispatcher = PrintDispatcher::new(config.printer.clone())
        .context("Failed to create print dispatcher")?;
    match config.printer.printer_name {
        Some(ref name) => info!("Using printer: {}", name),
        None => info!("Using the platform default printer"),
    }

    // Create the orchestrator
    let orchestrator = PrintOrchestrator::new(
        gateway,
        Arc::new(dispatcher.clone()),
        config.orchestrator.clone(),
    );

    // Create app state
    let state = Arc::new(AppState::new(
        config.clone(),
        orchestrator.clone(),
        dispatcher,
    ));

    // Create router
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

    // Stop polling; an in-flight cycle finishes on its own.
    info!("Server shutting down...");
    orchestrator.stop_polling().await;

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
