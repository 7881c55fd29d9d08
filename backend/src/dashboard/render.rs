//! Text rendering of the events list.

use crate::dashboard::view::ViewState;
use crate::database::models::EventResponse;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::fmt::Write;

pub const INVALID_DATE: &str = "Invalid Date";
pub const EMPTY_TITLE: &str = "No events yet";
pub const EMPTY_HINT: &str = "Get started by creating a new event.";
pub const TIME_SEPARATOR: &str = " • ";

/// Display data for one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventCard {
    pub id: String,
    pub title: String,
    pub venue: String,
    pub date_line: String,
    pub description: Option<String>,
}

impl From<&EventResponse> for EventCard {
    fn from(event: &EventResponse) -> Self {
        Self {
            id: event.id.clone(),
            title: event.title.clone(),
            venue: event.venue.clone(),
            date_line: date_line(event),
            description: non_empty(event.description.as_deref()).map(str::to_string),
        }
    }
}

/// One card per event, in the given order.
pub fn event_cards(events: &[EventResponse]) -> Vec<EventCard> {
    events.iter().map(EventCard::from).collect()
}

/// Formats a stored date as e.g. `Mar 5, 2025`.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM[:SS]` and RFC 3339. Anything else
/// renders as `Invalid Date`.
pub fn format_event_date(date: &str) -> String {
    let date = date.trim();
    let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(date)
                .ok()
                .map(|dt| dt.date_naive())
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%M:%S")
                .or_else(|_| NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%M"))
                .ok()
                .map(|dt| dt.date())
        });

    match parsed {
        Some(day) => day.format("%b %-d, %Y").to_string(),
        None => INVALID_DATE.to_string(),
    }
}

/// Date, followed by the time only when one is set.
pub fn date_line(event: &EventResponse) -> String {
    let date = format_event_date(&event.date);
    match non_empty(event.time.as_deref()) {
        Some(time) => format!("{date}{TIME_SEPARATOR}{time}"),
        None => date,
    }
}

pub fn render_view(state: &ViewState) -> String {
    match state {
        ViewState::Loading => "Loading events...".to_string(),
        ViewState::Failed(reason) => format!("Could not load events: {reason}"),
        ViewState::Loaded(events) if events.is_empty() => format!("{EMPTY_TITLE}\n{EMPTY_HINT}"),
        ViewState::Loaded(events) => render_cards(&event_cards(events)),
    }
}

fn render_cards(cards: &[EventCard]) -> String {
    let mut out = format!("Events ({})\n", cards.len());
    for card in cards {
        let _ = writeln!(out, "\n[{}] {}", card.id, card.title);
        let _ = writeln!(out, "    Venue: {}", card.venue);
        let _ = writeln!(out, "    Date:  {}", card.date_line);
        if let Some(description) = &card.description {
            let _ = writeln!(out, "    {description}");
        }
    }
    out
}

/// Only an absent or zero-length value is hidden; whitespace still renders.
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
