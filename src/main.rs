//! Embedded Redis - Lifecycle management for a local Redis server
//!
//! Hosts the embedded server lifecycle as a standalone process.

use std::env;

use anyhow::Context;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use embedded_redis::{is_activated, EmbeddedRedisLifecycle, Properties};

/// Environment variable naming an optional JSON property file
const CONFIG_FILE_VAR: &str = "CONFIG_FILE";

/// Entry point of the hosting process.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load properties from the optional file and the environment
/// 3. Evaluate the profile/property activation gate
/// 4. Start the embedded server, aborting on failure
/// 5. Wait for SIGINT/SIGTERM, then stop the server
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "embedded_redis=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let properties = load_properties()?;
    info!("Configuration loaded: {} properties", properties.len());

    if !is_activated(&properties) {
        info!("Embedded redis server not activated, nothing to do");
        return Ok(());
    }

    let mut lifecycle = EmbeddedRedisLifecycle::new(&properties);
    lifecycle
        .start()
        .await
        .context("Application startup aborted")?;

    shutdown_signal().await;

    lifecycle.stop().await;
    info!("Shutdown complete");
    Ok(())
}

/// Loads the property file named by `CONFIG_FILE`, overridden by the environment.
fn load_properties() -> anyhow::Result<Properties> {
    let env_properties = Properties::from_env();

    match env::var(CONFIG_FILE_VAR) {
        Ok(path) => {
            let file_properties = Properties::from_json_file(&path)
                .with_context(|| format!("Failed to load properties from {path}"))?;
            info!("Loaded property file {}", path);
            Ok(file_properties.merge(env_properties))
        }
        Err(_) => Ok(env_properties),
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
