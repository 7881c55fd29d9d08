//! Data access layer.
//!
//! Repositories wrap SQL queries for a single table and return database
//! models; business rules live in `services`.

pub mod event_repository;
