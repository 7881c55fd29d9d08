//! Database repository for event management operations.

use crate::database::models::{CreateEvent, Event, UpdateEvent};
use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;

const EVENT_COLUMNS: &str = "id, title, description, venue, date, time, image_data, \
                             image_mime_type, created_at, updated_at";

/// Repository for event database operations.
pub struct EventRepository<'a> {
    /// Shared SQLite connection pool
    pool: &'a SqlitePool,
}

impl<'a> EventRepository<'a> {
    /// Creates a new EventRepository instance.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Inserts a new event under the given id.
    pub async fn create_event(&self, id: &str, event: CreateEvent) -> Result<Event> {
        let now = Utc::now();

        let event = sqlx::query_as::<_, Event>(&format!(
            r#"
            INSERT INTO events (id, title, description, venue, date, time, image_data, image_mime_type, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(event.title)
        .bind(event.description)
        .bind(event.venue)
        .bind(event.date)
        .bind(event.time)
        .bind(event.image_data)
        .bind(event.image_mime_type)
        .bind(now)
        .bind(now)
        .fetch_one(self.pool)
        .await?;

        Ok(event)
    }

    /// Retrieves every event, earliest date first, ties in creation order.
    pub async fn get_all_events(&self) -> Result<Vec<Event>> {
        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events ORDER BY date ASC, created_at ASC, id ASC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(events)
    }

    /// Retrieves an event by id.
    pub async fn get_event_by_id(&self, id: &str) -> Result<Option<Event>> {
        let event =
            sqlx::query_as::<_, Event>(&format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ?"))
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        Ok(event)
    }

    /// Replaces all editable fields of an event. Returns `None` if no event
    /// has that id.
    pub async fn update_event(&self, id: &str, event: UpdateEvent) -> Result<Option<Event>> {
        let event = sqlx::query_as::<_, Event>(&format!(
            r#"
            UPDATE events
            SET title = ?, description = ?, venue = ?, date = ?, time = ?,
                image_data = ?, image_mime_type = ?, updated_at = ?
            WHERE id = ?
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(event.title)
        .bind(event.description)
        .bind(event.venue)
        .bind(event.date)
        .bind(event.time)
        .bind(event.image_data)
        .bind(event.image_mime_type)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(event)
    }

    /// Deletes an event. Returns whether a row was removed.
    pub async fn delete_event(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM events WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
