//! Module for core business logic services.
//!
//! Services validate input and orchestrate repositories; HTTP handlers only
//! translate between requests and service calls.

pub mod event_service;
