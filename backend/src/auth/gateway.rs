//! The auth gateway: provider sign-in followed by the admin allow-list check.
//!
//! The gateway owns the only writer of the session. Current-value reads go
//! through a [`SessionContext`] (a `watch` cell); callback subscribers get
//! every transition in order from a `broadcast` channel. Admin UI is gated
//! on the resolved session rather than on the mere fact that the provider
//! popup succeeded.

use crate::auth::errors::{AuthError, AuthResult};
use crate::auth::models::{
    AuthenticatedUser, PopupRequest, ProviderUser, SessionState, SignInResult,
};
use crate::auth::permissions::PermissionStore;
use crate::auth::provider::IdentityProvider;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;
use tracing::{error, info, warn};

/// Transitions buffered per callback subscriber before it starts lagging.
const TRANSITION_CAPACITY: usize = 32;

/// Read side of the session, threaded through the application explicitly.
#[derive(Debug, Clone)]
pub struct SessionContext {
    receiver: watch::Receiver<SessionState>,
}

impl SessionContext {
    pub fn current(&self) -> SessionState {
        self.receiver.borrow().clone()
    }

    pub fn is_admin(&self) -> bool {
        self.receiver.borrow().is_admin()
    }

    /// Stream of session states, starting with the current one.
    pub fn stream(&self) -> WatchStream<SessionState> {
        WatchStream::new(self.receiver.clone())
    }
}

/// Handle returned by `subscribe_to_auth_state`. Dropping it unsubscribes.
pub struct AuthSubscription {
    handle: JoinHandle<()>,
}

impl AuthSubscription {
    pub fn unsubscribe(self) {}
}

impl Drop for AuthSubscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub struct AuthGateway<P, S> {
    provider: P,
    permissions: S,
    session: watch::Sender<SessionState>,
    transitions: broadcast::Sender<SessionState>,
    sign_out_unauthorized: bool,
}

impl<P, S> AuthGateway<P, S>
where
    P: IdentityProvider,
    S: PermissionStore,
{
    pub fn new(provider: P, permissions: S) -> Self {
        let (session, _) = watch::channel(SessionState::SignedOut);
        let (transitions, _) = broadcast::channel(TRANSITION_CAPACITY);
        Self {
            provider,
            permissions,
            session,
            transitions,
            sign_out_unauthorized: false,
        }
    }

    /// When enabled, a sign-in that fails authorization also ends the
    /// provider session instead of leaving it active.
    pub fn with_sign_out_unauthorized(mut self, enabled: bool) -> Self {
        self.sign_out_unauthorized = enabled;
        self
    }

    pub fn session(&self) -> SessionContext {
        SessionContext {
            receiver: self.session.subscribe(),
        }
    }

    /// Invokes `callback` with the session state at subscription time and
    /// then once per change, in order. Delivery happens on a background task,
    /// so the first call is not synchronous with subscription.
    pub fn subscribe_to_auth_state<F>(&self, callback: F) -> AuthSubscription
    where
        F: Fn(&SessionState) + Send + 'static,
    {
        // Receiver and snapshot are taken together so no change falls between.
        let mut receiver = self.transitions.subscribe();
        let initial = self.session.borrow().clone();

        let handle = tokio::spawn(async move {
            callback(&initial);
            loop {
                match receiver.recv().await {
                    Ok(state) => callback(&state),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("Auth subscriber lagged, skipped {} transitions", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        AuthSubscription { handle }
    }

    /// Signs in through the Google popup and admits the user only if the
    /// allow-list grants `admin` or `superadmin`.
    pub async fn sign_in_with_google(&self) -> AuthResult<SignInResult> {
        let provider_user = self
            .provider
            .sign_in_with_popup(&PopupRequest::google())
            .await
            .inspect_err(|e| error!("Error signing in with Google: {}", e))?;

        let Some(email) = provider_user.email.clone().filter(|email| !email.is_empty()) else {
            return Err(self.reject(provider_user, AuthError::NoEmail).await);
        };

        // A store outage is not a denial: leave the session as it was.
        let role = self
            .permissions
            .get_role(&email)
            .await
            .inspect_err(|e| error!("Error checking admin permissions: {}", e))?;

        let is_admin = role.is_some_and(|role| role.is_privileged());
        if !is_admin {
            return Err(self
                .reject(provider_user, AuthError::NotAuthorized { email })
                .await);
        }

        let user = AuthenticatedUser {
            uid: provider_user.uid,
            email,
            display_name: provider_user.display_name,
            is_admin,
        };
        info!("Admin {} signed in", user.email);
        self.publish(SessionState::Admin(user.clone()));

        Ok(SignInResult { user, is_admin })
    }

    /// Ends the provider session and publishes `SignedOut`.
    pub async fn sign_out(&self) -> AuthResult<()> {
        self.provider.sign_out().await.map_err(|e| {
            error!("Error signing out with Google: {}", e);
            AuthError::SignOutFailed {
                message: e.to_string(),
            }
        })?;

        self.publish(SessionState::SignedOut);
        info!("Signed out");
        Ok(())
    }

    /// Records a sign-in that passed the provider but not authorization.
    async fn reject(&self, provider_user: ProviderUser, error: AuthError) -> AuthError {
        warn!("Sign-in rejected for {}: {}", provider_user.uid, error);

        if self.sign_out_unauthorized {
            match self.provider.sign_out().await {
                Ok(()) => {
                    self.publish(SessionState::SignedOut);
                    return error;
                }
                Err(e) => warn!("Could not end provider session after rejection: {}", e),
            }
        }

        self.publish(SessionState::Unauthorized(provider_user));
        error
    }

    fn publish(&self, state: SessionState) {
        self.session.send_replace(state.clone());
        // No callback subscribers is fine.
        let _ = self.transitions.send(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::AdminRole;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio_stream::StreamExt;

    struct FakeProvider {
        user: ProviderUser,
        fail_sign_out: bool,
        sign_outs: AtomicUsize,
    }

    impl FakeProvider {
        fn with_email(email: Option<&str>) -> Self {
            Self {
                user: ProviderUser {
                    uid: "uid-1".to_string(),
                    email: email.map(str::to_string),
                    display_name: None,
                },
                fail_sign_out: false,
                sign_outs: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl IdentityProvider for FakeProvider {
        async fn sign_in_with_popup(&self, request: &PopupRequest) -> AuthResult<ProviderUser> {
            assert_eq!(request, &PopupRequest::google());
            Ok(self.user.clone())
        }

        async fn sign_out(&self) -> AuthResult<()> {
            self.sign_outs.fetch_add(1, Ordering::SeqCst);
            if self.fail_sign_out {
                return Err(AuthError::provider("network down"));
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakePermissions {
        roles: HashMap<String, String>,
        unreachable: bool,
        lookups: AtomicUsize,
    }

    impl FakePermissions {
        fn with_role(email: &str, role: &str) -> Self {
            let mut permissions = Self::default();
            permissions
                .roles
                .insert(email.to_string(), role.to_string());
            permissions
        }
    }

    #[async_trait]
    impl PermissionStore for FakePermissions {
        async fn get_role(&self, email: &str) -> AuthResult<Option<AdminRole>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            if self.unreachable {
                return Err(AuthError::permission_lookup("HTTP 503"));
            }
            Ok(self
                .roles
                .get(email)
                .map(|role| AdminRole::from_role_field(role)))
        }
    }

    #[tokio::test]
    async fn test_missing_email_skips_lookup() {
        let gateway = AuthGateway::new(FakeProvider::with_email(None), FakePermissions::default());

        let error = gateway.sign_in_with_google().await.unwrap_err();
        assert_eq!(error.kind(), "no-email");
        assert_eq!(gateway.permissions.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_viewer_is_not_authorized() {
        let gateway = AuthGateway::new(
            FakeProvider::with_email(Some("viewer@example.com")),
            FakePermissions::with_role("viewer@example.com", "viewer"),
        );

        let error = gateway.sign_in_with_google().await.unwrap_err();
        assert_eq!(error.kind(), "not-authorized");

        // The provider session stays up and is visible as such.
        let session = gateway.session().current();
        assert!(matches!(session, SessionState::Unauthorized(_)));
        assert!(!gateway.session().is_admin());
        assert_eq!(gateway.provider.sign_outs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unknown_email_is_not_authorized() {
        let gateway = AuthGateway::new(
            FakeProvider::with_email(Some("stranger@example.com")),
            FakePermissions::default(),
        );

        let error = gateway.sign_in_with_google().await.unwrap_err();
        assert_eq!(error.kind(), "not-authorized");
        assert_eq!(gateway.permissions.lookups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_admin_and_superadmin_are_admitted() {
        for role in ["admin", "superadmin"] {
            let gateway = AuthGateway::new(
                FakeProvider::with_email(Some("boss@example.com")),
                FakePermissions::with_role("boss@example.com", role),
            );

            let result = gateway.sign_in_with_google().await.unwrap();
            assert!(result.is_admin);
            assert!(result.user.is_admin);
            assert_eq!(result.user.email, "boss@example.com");
            assert!(gateway.session().is_admin());
        }
    }

    #[tokio::test]
    async fn test_rejection_can_end_provider_session() {
        let gateway = AuthGateway::new(
            FakeProvider::with_email(Some("viewer@example.com")),
            FakePermissions::with_role("viewer@example.com", "viewer"),
        )
        .with_sign_out_unauthorized(true);

        let error = gateway.sign_in_with_google().await.unwrap_err();
        assert_eq!(error.kind(), "not-authorized");
        assert_eq!(gateway.provider.sign_outs.load(Ordering::SeqCst), 1);
        assert_eq!(gateway.session().current(), SessionState::SignedOut);
    }

    #[tokio::test]
    async fn test_sign_out_failure_is_reported() {
        let mut provider = FakeProvider::with_email(Some("boss@example.com"));
        provider.fail_sign_out = true;
        let gateway = AuthGateway::new(
            provider,
            FakePermissions::with_role("boss@example.com", "admin"),
        );
        gateway.sign_in_with_google().await.unwrap();

        let error = gateway.sign_out().await.unwrap_err();
        assert_eq!(error.kind(), "sign-out-failed");
        // The session was not terminated, so it is still published as admin.
        assert!(gateway.session().is_admin());
    }

    #[tokio::test]
    async fn test_store_outage_is_not_a_denial() {
        for sign_out_unauthorized in [false, true] {
            let permissions = FakePermissions {
                unreachable: true,
                ..FakePermissions::default()
            };
            let gateway = AuthGateway::new(
                FakeProvider::with_email(Some("boss@example.com")),
                permissions,
            )
            .with_sign_out_unauthorized(sign_out_unauthorized);

            let error = gateway.sign_in_with_google().await.unwrap_err();
            assert_eq!(error.kind(), "permission-lookup-failed");
            assert_eq!(gateway.session().current(), SessionState::SignedOut);
            assert_eq!(gateway.provider.sign_outs.load(Ordering::SeqCst), 0);
        }
    }

    fn recording_gateway() -> (
        AuthGateway<FakeProvider, FakePermissions>,
        Arc<Mutex<Vec<SessionState>>>,
    ) {
        let gateway = AuthGateway::new(
            FakeProvider::with_email(Some("boss@example.com")),
            FakePermissions::with_role("boss@example.com", "admin"),
        );
        (gateway, Arc::new(Mutex::new(Vec::new())))
    }

    #[tokio::test]
    async fn test_subscribers_observe_every_transition() {
        let (gateway, seen) = recording_gateway();
        let sink = seen.clone();
        let _subscription = gateway.subscribe_to_auth_state(move |state| {
            sink.lock().unwrap().push(state.clone());
        });

        // Back to back, before the subscriber task has had a chance to run.
        let signed_in = gateway.sign_in_with_google().await.unwrap();
        gateway.sign_out().await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                SessionState::SignedOut,
                SessionState::Admin(signed_in.user),
                SessionState::SignedOut,
            ]
        );
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_delivery() {
        let (gateway, seen) = recording_gateway();
        let sink = seen.clone();
        let subscription = gateway.subscribe_to_auth_state(move |state| {
            sink.lock().unwrap().push(state.clone());
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        subscription.unsubscribe();

        gateway.sign_in_with_google().await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(*seen.lock().unwrap(), vec![SessionState::SignedOut]);
    }

    #[tokio::test]
    async fn test_session_stream_follows_changes() {
        let (gateway, _) = recording_gateway();
        let mut stream = gateway.session().stream();
        assert_eq!(stream.next().await, Some(SessionState::SignedOut));

        gateway.sign_in_with_google().await.unwrap();
        assert!(stream.next().await.unwrap().is_admin());

        gateway.sign_out().await.unwrap();
        assert_eq!(stream.next().await, Some(SessionState::SignedOut));
    }
}
