//! Module for event management API endpoints.
//!
//! This module exposes the event store over REST: listing, lookup, creation,
//! full updates, deletion and image download.

pub mod handlers;
pub mod routes;
