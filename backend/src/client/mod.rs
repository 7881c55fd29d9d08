//! Clients for services the dashboard talks to.

pub mod event_client;
