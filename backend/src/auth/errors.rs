//! Errors raised by the auth gateway and its collaborators.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    /// The provider signed the user in but did not disclose an email.
    #[error("Google sign-in failed: no email address was returned")]
    NoEmail,

    /// Sign-in succeeded but the email is not on the admin allow-list.
    #[error("{email} is not authorized as admin")]
    NotAuthorized { email: String },

    #[error("Sign-out failed: {message}")]
    SignOutFailed { message: String },

    #[error("Identity provider error: {message}")]
    Provider { message: String },

    #[error("Permission lookup failed: {message}")]
    PermissionLookup { message: String },
}

pub type AuthResult<T> = Result<T, AuthError>;

impl AuthError {
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
        }
    }

    pub fn permission_lookup(message: impl Into<String>) -> Self {
        Self::PermissionLookup {
            message: message.into(),
        }
    }

    /// Stable machine-readable kind.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::NoEmail => "no-email",
            AuthError::NotAuthorized { .. } => "not-authorized",
            AuthError::SignOutFailed { .. } => "sign-out-failed",
            AuthError::Provider { .. } => "provider-error",
            AuthError::PermissionLookup { .. } => "permission-lookup-failed",
        }
    }
}
