// ./cli/src/main.rs
mod commands;

use std::env;
use std::str::FromStr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, level_filters::LevelFilter, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use application::{DocumentService, StatsService};
use commands::{AppState, handle_line};
use infrastructure::{InMemoryDocumentRepository, RepositoryConfig};

const INITIAL_CAPACITY_VAR: &str = "DOCSTORE_INITIAL_CAPACITY";
const SHARD_AMOUNT_VAR: &str = "DOCSTORE_SHARD_AMOUNT";

/// Reads a numeric environment variable, falling back to `None` when it is
/// unset or unparsable.
fn env_usize(name: &str) -> Option<usize> {
    match env::var(name) {
        Ok(raw) => match usize::from_str(raw.trim()) {
            Ok(value) => {
                info!("Using {} = {} from environment.", name, value);
                Some(value)
            }
            Err(_) => {
                warn!(
                    "Invalid {} value '{}' in environment variable. Using default.",
                    name, raw
                );
                None
            }
        },
        Err(_) => {
            debug!("{} environment variable not set. Using default.", name);
            None
        }
    }
}

fn repository_config_from_env() -> RepositoryConfig {
    let mut config = RepositoryConfig::new();
    if let Some(capacity) = env_usize(INITIAL_CAPACITY_VAR) {
        config = config.with_initial_capacity(capacity);
    }
    if let Some(shards) = env_usize(SHARD_AMOUNT_VAR) {
        config = config.with_shard_amount(shards);
    }
    config
}

// Application entry point
#[tokio::main]
async fn main() {
    // --- Logger Initialization ---
    // stdout carries responses, so logs go to stderr
    let filter: EnvFilter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
    info!("Logger initialized successfully.");

    // --- Dependency Injection ---
    let config = repository_config_from_env();
    let document_repository = Arc::new(InMemoryDocumentRepository::with_config(&config));
    info!("In-memory document repository initialized.");

    let app_state = AppState {
        document_service: Arc::new(DocumentService::new(document_repository.clone())),
        stats_service: Arc::new(StatsService::new(document_repository)),
    };
    info!("Application services initialized. Reading commands from stdin.");

    // --- Command Loop ---
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                error!("Failed to read from stdin: {}", e);
                std::process::exit(1);
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let response = handle_line(&app_state, &line).await;
        let mut output = response.to_string();
        output.push('\n');
        if let Err(e) = stdout.write_all(output.as_bytes()).await {
            error!("Failed to write response: {}", e);
            std::process::exit(1);
        }
        if let Err(e) = stdout.flush().await {
            error!("Failed to flush stdout: {}", e);
            std::process::exit(1);
        }
    }
    info!("Input closed, shutting down.");
}
