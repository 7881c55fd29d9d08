//! Central module for organizing the application's API endpoints.
//!
//! Each API domain lives in its own submodule with `handlers` and `routes`.

pub mod common;
pub mod event;
