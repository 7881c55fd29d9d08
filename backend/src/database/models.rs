//! Rust structs that represent database table mappings.
//!
//! `Event` mirrors the `events` table. `EventResponse` is the JSON shape the
//! API serves and the dashboard decodes; the two differ only in bookkeeping
//! columns and field casing.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub venue: String,
    pub date: String,
    pub time: Option<String>,
    pub image_data: Option<String>,
    pub image_mime_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Event as exchanged over `/api/events`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub venue: String,
    pub date: String,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub image_data: Option<String>,
    #[serde(default)]
    pub image_mime_type: Option<String>,
}

impl From<Event> for EventResponse {
    fn from(event: Event) -> Self {
        Self {
            id: event.id,
            title: event.title,
            description: event.description,
            venue: event.venue,
            date: event.date,
            time: event.time,
            image_data: event.image_data,
            image_mime_type: event.image_mime_type,
        }
    }
}

/// Payload for creating or fully replacing an event. The id is never part
/// of the payload: the server assigns it and it does not change afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_image"))]
pub struct CreateEvent {
    #[validate(length(min = 1, max = 255, message = "Title must be between 1-255 characters"))]
    pub title: String,

    pub description: Option<String>,

    #[validate(length(min = 1, max = 255, message = "Venue must be between 1-255 characters"))]
    pub venue: String,

    #[validate(length(min = 1, message = "Date is required"))]
    pub date: String,

    pub time: Option<String>,

    pub image_data: Option<String>,

    pub image_mime_type: Option<String>,
}

pub type UpdateEvent = CreateEvent;

fn validate_image(event: &CreateEvent) -> Result<(), ValidationError> {
    let Some(data) = event.image_data.as_deref() else {
        return Ok(());
    };

    let is_image_mime = event
        .image_mime_type
        .as_deref()
        .is_some_and(|mime| mime.starts_with("image/"));
    if !is_image_mime {
        let mut error = ValidationError::new("image_mime_type");
        error.message = Some("Image data requires an image/* MIME type".into());
        return Err(error);
    }

    if STANDARD.decode(data).is_err() {
        let mut error = ValidationError::new("image_data");
        error.message = Some("Image data must be valid base64".into());
        return Err(error);
    }

    Ok(())
}
