//! Client-side routes reachable from the events list.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    NewEvent,
    EventDetail(String),
    EditEvent(String),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::NewEvent => "/events/new".to_string(),
            Route::EventDetail(id) => format!("/events/{id}"),
            Route::EditEvent(id) => format!("/events/{id}/edit"),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Performs a route transition. Implementations must not touch the store.
pub trait Navigator: Send + Sync {
    fn push(&self, route: &Route);
}

/// Prints the destination; the create, detail and edit screens are served
/// elsewhere.
pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn push(&self, route: &Route) {
        println!("-> {route}");
    }
}
