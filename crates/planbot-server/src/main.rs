//! Web server for the Planbot floor-plan generation service
//!
//! This binary wires the completion gateway, the script executor, and the
//! generation loop together behind a small HTTP API. Clients send chat
//! messages or floor-plan requests to one endpoint; the server owns runtime
//! bootstrap, configuration loading, and graceful shutdown.

mod app;

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use planbot_core::config::ConfigLoader;
use planbot_core::executors::{CodeExecutor, ScriptExecutor};
use planbot_core::llm::gemini;
use planbot_core::PlanBotConfig;

use app::{router, AppState};

#[derive(Parser, Debug)]
#[clap(author, version, about = "Planbot server - chat-driven floor plan generation")]
struct Cli {
    #[clap(
        long,
        short,
        default_value = "planbot.yaml",
        help = "Path to the YAML configuration file"
    )]
    config: String,

    #[clap(long, default_value = "127.0.0.1:3001")]
    bind_addr: String,

    #[clap(long, short, default_value = "info")]
    log_level: String,

    #[clap(long, help = "Skip installing the drafting library at startup")]
    no_bootstrap: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logger
    let log_level_filter = cli.log_level.parse().unwrap_or(LevelFilter::Info);
    env_logger::Builder::new()
        .filter_level(log_level_filter)
        .init();

    let config = if Path::new(&cli.config).exists() {
        log::info!("Loading configuration from file: {}", cli.config);
        ConfigLoader::from_file(&cli.config).await?
    } else {
        log::warn!(
            "Configuration file {} not found, using defaults",
            cli.config
        );
        PlanBotConfig::default()
    };

    let gateway = gemini::create_client(&config.llm)?;
    let executor: Arc<dyn CodeExecutor> = Arc::new(ScriptExecutor::new(
        config.executor.interpreter.as_str(),
        "py",
        Duration::from_secs(config.executor.timeout_secs),
    ));

    if !cli.no_bootstrap {
        planbot_core::bootstrap::ensure_drafting_runtime(executor.as_ref()).await;
    }

    let state = AppState::new(gateway, executor, config.generation.clone());

    let bind_socket_addr: SocketAddr = cli
        .bind_addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid bind address '{}': {}", cli.bind_addr, e))?;

    log::info!("Starting planbot server on {}...", bind_socket_addr);

    let listener = tokio::net::TcpListener::bind(bind_socket_addr).await?;
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Planbot server shut down gracefully.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    log::info!("Shutdown signal received");
}
