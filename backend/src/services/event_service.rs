//! Event business logic service.

use crate::database::models::{CreateEvent, EventResponse, UpdateEvent};
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::event_repository::EventRepository;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use sqlx::SqlitePool;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

/// Decoded image attached to an event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventImage {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Service layer for event operations.
pub struct EventService<'a> {
    pool: &'a SqlitePool,
}

impl<'a> EventService<'a> {
    /// Creates a new EventService instance.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Lists every event in store order.
    pub async fn list_events(&self) -> ServiceResult<Vec<EventResponse>> {
        let repo = EventRepository::new(self.pool);
        let events = repo.get_all_events().await?;
        Ok(events.into_iter().map(EventResponse::from).collect())
    }

    /// Fetches one event, failing with `NotFound` when the id is unknown.
    pub async fn get_event(&self, id: &str) -> ServiceResult<EventResponse> {
        let repo = EventRepository::new(self.pool);
        repo.get_event_by_id(id)
            .await?
            .map(EventResponse::from)
            .ok_or_else(|| ServiceError::not_found("Event", id))
    }

    /// Validates and stores a new event under a fresh id.
    pub async fn create_event(&self, create_event: CreateEvent) -> ServiceResult<EventResponse> {
        create_event.validate().map_err(validation_error)?;

        let id = Uuid::now_v7().to_string();
        let repo = EventRepository::new(self.pool);
        let event = repo.create_event(&id, create_event).await?;

        tracing::info!("Created event {} ({})", event.id, event.title);
        Ok(event.into())
    }

    /// Validates and replaces an existing event's fields.
    pub async fn update_event(
        &self,
        id: &str,
        update_event: UpdateEvent,
    ) -> ServiceResult<EventResponse> {
        update_event.validate().map_err(validation_error)?;

        let repo = EventRepository::new(self.pool);
        let event = repo
            .update_event(id, update_event)
            .await?
            .ok_or_else(|| ServiceError::not_found("Event", id))?;

        tracing::info!("Updated event {}", event.id);
        Ok(event.into())
    }

    /// Deletes an event, failing with `NotFound` when nothing was removed.
    pub async fn delete_event(&self, id: &str) -> ServiceResult<()> {
        let repo = EventRepository::new(self.pool);
        if !repo.delete_event(id).await? {
            return Err(ServiceError::not_found("Event", id));
        }

        tracing::info!("Deleted event {}", id);
        Ok(())
    }

    /// Decodes the embedded image of an event.
    pub async fn get_event_image(&self, id: &str) -> ServiceResult<EventImage> {
        let event = self.get_event(id).await?;

        let (Some(data), Some(mime_type)) = (event.image_data, event.image_mime_type) else {
            return Err(ServiceError::not_found("Event image", id));
        };

        let bytes = STANDARD.decode(data).map_err(|e| {
            tracing::warn!("Stored image for event {} is not valid base64: {}", id, e);
            ServiceError::internal_error(format!("Stored image for event {id} is corrupt"))
        })?;

        Ok(EventImage { mime_type, bytes })
    }
}

fn validation_error(errors: ValidationErrors) -> ServiceError {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                format!(
                    "{}: {}",
                    field,
                    error.message.as_ref().unwrap_or(&"Invalid value".into())
                )
            })
        })
        .collect();

    if messages.is_empty() {
        messages.push(errors.to_string());
    }

    ServiceError::validation(messages.join(", "))
}
