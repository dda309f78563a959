//! Classpoll server binary.
//!
//! # Startup Sequence
//!
//! 1. Load configuration (`CLASSPOLL_CONFIG`, else `classpoll.yaml`, else
//!    defaults)
//! 2. Initialize structured logging (tracing)
//! 3. Create the poll engine over an empty store with the system clock
//! 4. Serve HTTP + `WebSocket` until `Ctrl-C`

use std::path::PathBuf;
use std::sync::Arc;

use classpoll_core::config::ClasspollConfig;
use classpoll_core::{PollEngine, PollStore, SystemClock};
use classpoll_server::{start_server, AppState};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "classpoll.yaml";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration. Logging is not up yet, so remember where it
    //    came from and report after.
    let (config, source) = load_config()?;

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!(
        source,
        host = config.server.host,
        port = config.server.port,
        max_duration_seconds = ?config.polls.max_duration_seconds,
        max_options = ?config.polls.max_options,
        "Configuration loaded"
    );

    // 3. Create the engine.
    let engine = PollEngine::new(PollStore::new(), Arc::new(SystemClock), config.polls);
    let state = Arc::new(AppState::with_capacity(
        engine,
        config.realtime.broadcast_capacity,
    ));

    // 4. Serve.
    start_server(&config.server, state).await?;
    Ok(())
}

fn load_config() -> Result<(ClasspollConfig, String), Box<dyn std::error::Error>> {
    let path = std::env::var("CLASSPOLL_CONFIG")
        .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);

    if path.exists() {
        let config = ClasspollConfig::from_file(&path)?;
        Ok((config, path.display().to_string()))
    } else {
        Ok((ClasspollConfig::from_env()?, String::from("defaults")))
    }
}
