//! Defines the HTTP routes for event management.

use super::handlers::{
    create_event, delete_event, get_event_by_id, get_event_image, get_events, update_event,
};
use axum::{Router, routing::get};

pub async fn event_router() -> Router {
    Router::new()
        .route("/", get(get_events).post(create_event))
        .route(
            "/{id}",
            get(get_event_by_id).put(update_event).delete(delete_event),
        )
        .route("/{id}/image", get(get_event_image))
}
