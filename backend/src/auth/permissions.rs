//! Admin allow-list lookups.
//!
//! The allow-list is owned by an external document store; this code only
//! reads it. Each record is keyed by the exact email address and carries a
//! `role` field.

use crate::auth::errors::{AuthError, AuthResult};
use crate::auth::models::AdminRole;
use crate::config::FirestoreConfig;
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

#[async_trait]
pub trait PermissionStore: Send + Sync {
    /// Returns the role recorded for `email`, or `None` when no record exists.
    async fn get_role(&self, email: &str) -> AuthResult<Option<AdminRole>>;
}

#[derive(Debug, Deserialize)]
struct FirestoreDocument {
    #[serde(default)]
    fields: HashMap<String, FirestoreValue>,
}

#[derive(Debug, Deserialize)]
struct FirestoreValue {
    #[serde(rename = "stringValue")]
    string_value: Option<String>,
}

/// Reads allow-list documents through the Firestore REST API.
pub struct FirestorePermissionStore {
    http_client: Client,
    config: FirestoreConfig,
}

impl FirestorePermissionStore {
    pub fn new(config: FirestoreConfig) -> AuthResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| {
                AuthError::permission_lookup(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// URL of the document for `email`, with the email as a single path segment.
    pub fn document_url(&self, email: &str) -> AuthResult<Url> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| AuthError::permission_lookup(format!("Invalid Firestore URL: {e}")))?;

        url.path_segments_mut()
            .map_err(|_| AuthError::permission_lookup("Firestore URL cannot be a base"))?
            .pop_if_empty()
            .extend([
                "v1",
                "projects",
                self.config.project_id.as_str(),
                "databases",
                "(default)",
                "documents",
                self.config.collection.as_str(),
                email,
            ]);

        if let Some(api_key) = &self.config.api_key {
            url.query_pairs_mut().append_pair("key", api_key);
        }

        Ok(url)
    }
}

#[async_trait]
impl PermissionStore for FirestorePermissionStore {
    async fn get_role(&self, email: &str) -> AuthResult<Option<AdminRole>> {
        let url = self.document_url(email)?;

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| AuthError::permission_lookup(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                tracing::debug!("No allow-list record for {}", email);
                Ok(None)
            }
            status if status.is_success() => {
                let document = response
                    .json::<FirestoreDocument>()
                    .await
                    .map_err(|e| AuthError::permission_lookup(format!("Invalid document: {e}")))?;

                let role = document
                    .fields
                    .get("role")
                    .and_then(|value| value.string_value.as_deref())
                    .unwrap_or_default();

                Ok(Some(AdminRole::from_role_field(role)))
            }
            status => Err(AuthError::permission_lookup(format!(
                "Allow-list lookup returned HTTP {status}"
            ))),
        }
    }
}
