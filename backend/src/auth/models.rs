//! Data structures for authentication-related entities.
//!
//! This module defines the identity returned by the provider, the admin
//! user the gateway admits, allow-list roles and the session states that
//! subscribers observe.

use std::fmt;

/// Identity as reported by the identity provider, before any authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderUser {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

/// A signed-in user together with the result of the allow-list check.
///
/// `is_admin` is derived on each sign-in and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
    pub is_admin: bool,
}

/// Successful outcome of `sign_in_with_google`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInResult {
    pub user: AuthenticatedUser,
    pub is_admin: bool,
}

/// Role stored in an allow-list record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminRole {
    Admin,
    SuperAdmin,
    Other(String),
}

impl AdminRole {
    /// Parses the raw `role` field. Matching is exact.
    pub fn from_role_field(role: &str) -> Self {
        match role {
            "admin" => AdminRole::Admin,
            "superadmin" => AdminRole::SuperAdmin,
            other => AdminRole::Other(other.to_string()),
        }
    }

    /// Only `admin` and `superadmin` grant dashboard access.
    pub fn is_privileged(&self) -> bool {
        matches!(self, AdminRole::Admin | AdminRole::SuperAdmin)
    }
}

/// Parameters for an interactive popup sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupRequest {
    pub scopes: Vec<String>,
    /// Extra query parameters forwarded to the provider's consent page.
    pub custom_parameters: Vec<(String, String)>,
}

impl PopupRequest {
    /// Google sign-in with default scopes, forced into popup display.
    pub fn google() -> Self {
        Self {
            scopes: vec![
                "openid".to_string(),
                "email".to_string(),
                "profile".to_string(),
            ],
            custom_parameters: vec![("display".to_string(), "popup".to_string())],
        }
    }
}

/// Session as seen by the rest of the application.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    SignedOut,
    /// The provider session is active but the user failed the admin check.
    Unauthorized(ProviderUser),
    Admin(AuthenticatedUser),
}

impl SessionState {
    pub fn is_admin(&self) -> bool {
        matches!(self, SessionState::Admin(user) if user.is_admin)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::SignedOut => write!(f, "signed out"),
            SessionState::Unauthorized(user) => write!(
                f,
                "signed in without admin access ({})",
                user.email.as_deref().unwrap_or(&user.uid)
            ),
            SessionState::Admin(user) => write!(f, "signed in as admin {}", user.email),
        }
    }
}
