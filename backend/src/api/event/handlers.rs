//! Handler functions for event management API endpoints.

use crate::api::common::{ApiResponse, service_error_to_http};
use crate::database::models::{CreateEvent, EventResponse, UpdateEvent};
use crate::services::event_service::EventService;
use axum::{
    extract::{Extension, Json, Path},
    http::{StatusCode, header},
    response::{IntoResponse, Json as ResponseJson, Response},
};
use sqlx::SqlitePool;

/// Lists all events as a bare JSON array.
#[axum::debug_handler]
pub async fn get_events(
    Extension(pool): Extension<SqlitePool>,
) -> Result<ResponseJson<Vec<EventResponse>>, (StatusCode, String)> {
    let service = EventService::new(&pool);

    let events = service.list_events().await.map_err(service_error_to_http)?;

    Ok(ResponseJson(events))
}

/// Retrieves a specific event by ID.
#[axum::debug_handler]
pub async fn get_event_by_id(
    Extension(pool): Extension<SqlitePool>,
    Path(id): Path<String>,
) -> Result<ResponseJson<EventResponse>, (StatusCode, String)> {
    let service = EventService::new(&pool);

    let event = service.get_event(&id).await.map_err(service_error_to_http)?;

    Ok(ResponseJson(event))
}

#[axum::debug_handler]
pub async fn create_event(
    Extension(pool): Extension<SqlitePool>,
    Json(payload): Json<CreateEvent>,
) -> Result<(StatusCode, ResponseJson<EventResponse>), (StatusCode, String)> {
    let service = EventService::new(&pool);

    let event = service
        .create_event(payload)
        .await
        .map_err(service_error_to_http)?;

    Ok((StatusCode::CREATED, ResponseJson(event)))
}

#[axum::debug_handler]
pub async fn update_event(
    Extension(pool): Extension<SqlitePool>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateEvent>,
) -> Result<ResponseJson<EventResponse>, (StatusCode, String)> {
    let service = EventService::new(&pool);

    let event = service
        .update_event(&id, payload)
        .await
        .map_err(service_error_to_http)?;

    Ok(ResponseJson(event))
}

#[axum::debug_handler]
pub async fn delete_event(
    Extension(pool): Extension<SqlitePool>,
    Path(id): Path<String>,
) -> Result<ResponseJson<ApiResponse<String>>, (StatusCode, String)> {
    let service = EventService::new(&pool);

    service
        .delete_event(&id)
        .await
        .map_err(service_error_to_http)?;

    Ok(ResponseJson(ApiResponse::success(
        id,
        "Event deleted successfully",
    )))
}

/// Serves the decoded event image with its stored content type.
#[axum::debug_handler]
pub async fn get_event_image(
    Extension(pool): Extension<SqlitePool>,
    Path(id): Path<String>,
) -> Result<Response, (StatusCode, String)> {
    let service = EventService::new(&pool);

    let image = service
        .get_event_image(&id)
        .await
        .map_err(service_error_to_http)?;

    Ok(([(header::CONTENT_TYPE, image.mime_type)], image.bytes).into_response())
}
