//! Main entry point for the events admin backend.
//!
//! `serve` runs the event store API on Axum with a SQLite pool.
//! `dashboard` signs an administrator in with Google and opens the
//! interactive events list against that API.

mod api;
mod auth;
mod client;
mod config;
mod dashboard;
mod database;
mod errors;
mod repositories;
mod services;
mod utils;

use crate::api::common::ApiResponse;
use anyhow::Result;
use axum::{Extension, Router, response::Json, routing::get};
use clap::{Parser, Subcommand};
use config::{Config, DashboardConfig};
use database::Database;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "events-admin", version, about = "Events admin dashboard and API")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the event store HTTP API
    Serve,
    /// Sign in and manage events interactively
    Dashboard,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Commands::Serve => serve().await,
        Commands::Dashboard => dashboard::run(DashboardConfig::from_env()?).await,
    }
}

async fn serve() -> Result<()> {
    let config = Config::from_env()?;
    let db = Database::new(&config).await?;
    let pool = db.pool().clone();

    let app = Router::new()
        .route("/", get(root_handler))
        .nest("/api/events", api::event::routes::event_router().await)
        .layer(Extension(pool));

    let bind_address = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;

    info!("Starting events API on port {}", config.server_port);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    db.close().await;
    Ok(())
}

async fn root_handler() -> Json<ApiResponse<serde_json::Value>> {
    Json(ApiResponse::success(
        serde_json::json!({
            "service": "Events Admin API",
            "version": env!("CARGO_PKG_VERSION")
        }),
        "Welcome to the Events Admin API",
    ))
}
