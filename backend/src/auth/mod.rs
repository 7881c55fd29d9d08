//! Authentication module for admin sign-in and access control.
//!
//! This module provides the auth gateway (Google popup sign-in followed by an
//! admin allow-list check), the provider and permission-store seams it is
//! built on, and the session context the dashboard observes.

pub mod callback;
pub mod errors;
pub mod gateway;
pub mod models;
pub mod permissions;
pub mod provider;

// Re-exports for convenience
pub use gateway::AuthGateway;
pub use permissions::FirestorePermissionStore;
pub use provider::GoogleIdentityProvider;
