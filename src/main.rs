//! Trip Planner - slot-filling travel itinerary assistant
//!
//! Collects interests, budget, trip length and destination through discrete
//! actions and composes a templated itinerary on request. This binary hosts
//! sessions over stdin/stdout, one JSON request per line.

mod actions;
mod config;
mod db;
mod host;
mod itinerary;
mod runtime;
mod state_machine;

use config::{Config, DbLocation};
use db::Database;
use host::Host;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging; stdout is reserved for replies
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trip_planner=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = Config::from_env();

    let db = match &config.db {
        DbLocation::InMemory => {
            tracing::info!("Using in-memory database");
            Database::open_in_memory()?
        }
        DbLocation::File(path) => {
            // Ensure database directory exists
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            tracing::info!(path = %path.display(), "Opening database");
            Database::open(path)?
        }
    };

    let host = Host::new(db, &config);
    tracing::info!(default_session = %host.default_session(), "Trip planner ready");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = host.handle_line(line).await;
        let mut out = serde_json::to_vec(&response)?;
        out.push(b'\n');
        stdout.write_all(&out).await?;
        stdout.flush().await?;
    }

    tracing::info!("Input closed, shutting down");
    Ok(())
}
