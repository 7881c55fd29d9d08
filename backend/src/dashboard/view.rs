//! The events list view: load, delete and navigation.
//!
//! Fetch failures end in `ViewState::Failed`, never in an empty `Loaded`.
//! Deletes remove the event locally once the store acknowledges them,
//! without re-fetching; concurrent changes made elsewhere show up only on
//! the next load.

use crate::client::event_client::EventStoreClient;
use crate::dashboard::navigation::{Navigator, Route};
use crate::dashboard::prompt::Prompter;
use crate::dashboard::render::{EventCard, event_cards};
use crate::database::models::EventResponse;
use std::sync::Arc;
use tracing::{error, info};

pub const DELETE_CONFIRMATION: &str = "Are you sure you want to delete this event?";
pub const DELETE_FAILED_ALERT: &str = "Failed to delete event. Please try again.";

#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Loading,
    Loaded(Vec<EventResponse>),
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Cancelled,
    Deleted,
    Failed,
}

pub struct EventsView {
    client: Arc<dyn EventStoreClient>,
    state: ViewState,
}

impl EventsView {
    pub fn new(client: Arc<dyn EventStoreClient>) -> Self {
        Self {
            client,
            state: ViewState::Loading,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn cards(&self) -> Vec<EventCard> {
        match &self.state {
            ViewState::Loaded(events) => event_cards(events),
            ViewState::Loading | ViewState::Failed(_) => Vec::new(),
        }
    }

    /// Fetches the whole collection once, keeping the store's order.
    pub async fn load(&mut self) {
        self.state = ViewState::Loading;

        self.state = match self.client.list_events().await {
            Ok(events) => {
                info!("Loaded {} events", events.len());
                ViewState::Loaded(events)
            }
            Err(e) => {
                error!("Error fetching events: {}", e);
                ViewState::Failed(e.to_string())
            }
        };
    }

    /// Confirms, deletes remotely, then drops the event from local state.
    /// On failure the list is left untouched and the user is alerted.
    pub async fn delete(&mut self, id: &str, prompter: &dyn Prompter) -> DeleteOutcome {
        if !prompter.confirm(DELETE_CONFIRMATION) {
            return DeleteOutcome::Cancelled;
        }

        match self.client.delete_event(id).await {
            Ok(()) => {
                if let ViewState::Loaded(events) = &mut self.state {
                    events.retain(|event| event.id != id);
                }
                info!("Deleted event {}", id);
                DeleteOutcome::Deleted
            }
            Err(e) => {
                error!("Error deleting event: {}", e);
                prompter.alert(DELETE_FAILED_ALERT);
                DeleteOutcome::Failed
            }
        }
    }

    pub fn create_event(&self, navigator: &dyn Navigator) -> Route {
        go(navigator, Route::NewEvent)
    }

    pub fn view_event(&self, id: &str, navigator: &dyn Navigator) -> Route {
        go(navigator, Route::EventDetail(id.to_string()))
    }

    pub fn edit_event(&self, id: &str, navigator: &dyn Navigator) -> Route {
        go(navigator, Route::EditEvent(id.to_string()))
    }
}

fn go(navigator: &dyn Navigator, route: Route) -> Route {
    navigator.push(&route);
    route
}
