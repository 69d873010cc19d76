//! gt-api - GreenThumb plant photo service
//!
//! Serves the JSON API for plant photos, votes, reports, bans and
//! classifier-backed plant identification.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use gt_common::config::{self, CompiledDefaults, ConfigOverrides, ServiceConfig};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gt_api::db::Store;
use gt_api::ml::{Classifier, HttpClassifier, UnavailableClassifier};
use gt_api::AppState;

/// Command-line arguments for gt-api
#[derive(Parser, Debug)]
#[command(name = "gt-api")]
#[command(about = "GreenThumb plant photo API")]
#[command(version)]
struct Args {
    /// TOML config file
    #[arg(short, long, env = "GT_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite database file
    #[arg(short, long, env = "GT_DATABASE")]
    database: Option<PathBuf>,

    /// Address to bind
    #[arg(short, long, env = "GT_BIND_ADDR")]
    bind: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "GT_PORT")]
    port: Option<u16>,

    /// Base URL of the plant classifier service
    #[arg(long, env = "GT_CLASSIFIER_URL")]
    classifier_url: Option<String>,

    /// Account ids to create or promote as admins at startup
    #[arg(long = "admin-id", env = "GT_ADMIN_IDS", value_delimiter = ',')]
    admin_ids: Vec<i64>,

    /// Log level when RUST_LOG is unset
    #[arg(long, env = "GT_LOG_LEVEL")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.clone().or_else(config::default_config_path);
    let toml_config = match &config_path {
        Some(path) => config::load_toml_config(path).context("Failed to load config file")?,
        None => Default::default(),
    };

    let overrides = ConfigOverrides {
        database_path: args.database,
        bind_addr: args.bind,
        port: args.port,
        classifier_url: args.classifier_url,
        initial_admins: args.admin_ids,
        log_level: args.log_level,
    };
    let service_config = ServiceConfig::resolve(
        overrides,
        toml_config,
        CompiledDefaults::for_current_platform(),
    )
    .context("Invalid configuration")?;

    // Initialize tracing
    let default_filter = format!(
        "gt_api={level},gt_common={level},tower_http={level}",
        level = service_config.log_level
    );
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting gt-api v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    match &config_path {
        Some(path) => info!("Config file: {}", path.display()),
        None => warn!("No config directory available, using defaults"),
    }
    info!("Database: {}", service_config.database_path.display());

    let store = Store::open(&service_config.database_path)
        .await
        .context("Failed to open database")?;

    for admin_id in &service_config.initial_admins {
        store
            .ensure_admin(*admin_id)
            .await
            .with_context(|| format!("Failed to seed admin {}", admin_id))?;
        info!(admin_id, "Admin account ensured");
    }

    let classifier: Arc<dyn Classifier> = match &service_config.classifier_url {
        Some(url) => {
            let classifier =
                HttpClassifier::new(url.clone()).context("Failed to create classifier client")?;
            info!("Plant classifier: {}", classifier.base_url());
            Arc::new(classifier)
        }
        None => {
            warn!("No classifier_url configured; image identification and retraining are unavailable");
            Arc::new(UnavailableClassifier)
        }
    };

    let state = AppState::new(store.clone(), classifier)
        .with_plants_max_photos(service_config.plants_max_photos);
    let app = gt_api::build_router(state);

    let addr = service_config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    store.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
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
