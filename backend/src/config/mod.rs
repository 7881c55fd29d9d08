//! Central module for application-wide configuration settings.
//!
//! Configuration is read from environment variables (optionally seeded from a
//! `.env` file). The event store server and the admin dashboard have separate
//! settings so that neither needs the other's secrets to start.

use anyhow::{Context, Result};
use std::env;

/// Settings for the event store HTTP server.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout_seconds: u64,
    pub server_port: u16,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL not set")?;

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()
            .context("DB_MAX_CONNECTIONS must be a valid number")?;

        let acquire_timeout_seconds = env::var("DB_ACQUIRE_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "3".to_string())
            .parse::<u64>()
            .context("DB_ACQUIRE_TIMEOUT_SECONDS must be a valid number")?;

        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .context("SERVER_PORT must be a valid number")?;

        Ok(Config {
            database_url,
            max_connections,
            acquire_timeout_seconds,
            server_port,
        })
    }
}

/// Google OAuth client used for the popup sign-in flow.
#[derive(Debug, Clone)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Local port the sign-in callback listens on.
    pub callback_port: u16,
}

/// Location of the admin allow-list documents.
#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    pub base_url: String,
    pub project_id: String,
    pub api_key: Option<String>,
    pub collection: String,
}

/// Settings for the interactive admin dashboard.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub events_api_base_url: String,
    pub google: GoogleOAuthConfig,
    pub firestore: FirestoreConfig,
    /// Whether a sign-in that fails the admin check also ends the provider session.
    pub sign_out_unauthorized: bool,
}

impl DashboardConfig {
    /// Loads dashboard configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let events_api_base_url = env::var("EVENTS_API_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        let client_id = env::var("GOOGLE_CLIENT_ID").context("GOOGLE_CLIENT_ID not set")?;
        let client_secret =
            env::var("GOOGLE_CLIENT_SECRET").context("GOOGLE_CLIENT_SECRET not set")?;

        let callback_port = env::var("GOOGLE_CALLBACK_PORT")
            .unwrap_or_else(|_| "8765".to_string())
            .parse::<u16>()
            .context("GOOGLE_CALLBACK_PORT must be a valid number")?;

        let project_id = env::var("FIREBASE_PROJECT_ID").context("FIREBASE_PROJECT_ID not set")?;
        let api_key = env::var("FIREBASE_API_KEY").ok().filter(|key| !key.is_empty());

        let base_url = env::var("FIRESTORE_BASE_URL")
            .unwrap_or_else(|_| "https://firestore.googleapis.com".to_string());

        let collection = env::var("ADMIN_COLLECTION").unwrap_or_else(|_| "adminemail".to_string());

        let sign_out_unauthorized = env::var("AUTH_SIGN_OUT_UNAUTHORIZED")
            .unwrap_or_else(|_| "false".to_string())
            .parse::<bool>()
            .context("AUTH_SIGN_OUT_UNAUTHORIZED must be true or false")?;

        Ok(DashboardConfig {
            events_api_base_url,
            google: GoogleOAuthConfig {
                client_id,
                client_secret,
                callback_port,
            },
            firestore: FirestoreConfig {
                base_url,
                project_id,
                api_key,
                collection,
            },
            sign_out_unauthorized,
        })
    }
}
