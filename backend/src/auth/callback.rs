//! One-shot local HTTP endpoint that receives the OAuth redirect.
//!
//! The popup's consent page redirects to `http://127.0.0.1:<port>/callback`
//! with either `code` + `state` or an `error`. The server answers that single
//! request and shuts down.

use crate::auth::errors::{AuthError, AuthResult};
use axum::{
    Router,
    extract::{Query, State},
    response::Html,
    routing::get,
};
use serde::Deserialize;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Query parameters delivered to the redirect URI.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl CallbackParams {
    /// Error message if the provider reported one.
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(|e| match &self.error_description {
            Some(desc) => format!("{}: {}", e, desc),
            None => e.clone(),
        })
    }
}

type CallbackSlot = Arc<Mutex<Option<oneshot::Sender<CallbackParams>>>>;

pub struct CallbackServer {
    listener: TcpListener,
    port: u16,
}

impl CallbackServer {
    /// Binds the loopback listener. Port 0 picks a free port.
    pub async fn bind(port: u16) -> AuthResult<Self> {
        let listener = TcpListener::bind(("127.0.0.1", port))
            .await
            .map_err(|e| AuthError::provider(format!("Cannot bind callback port {port}: {e}")))?;
        let port = listener
            .local_addr()
            .map_err(|e| AuthError::provider(format!("Callback listener has no address: {e}")))?
            .port();

        Ok(Self { listener, port })
    }

    pub fn redirect_uri(&self) -> String {
        format!("http://127.0.0.1:{}/callback", self.port)
    }

    /// Serves until the first callback arrives and returns its parameters.
    /// There is no timeout: an abandoned popup keeps this pending.
    pub async fn wait_for_callback(self) -> AuthResult<CallbackParams> {
        let (params_tx, params_rx) = oneshot::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let slot: CallbackSlot = Arc::new(Mutex::new(Some(params_tx)));

        let app = Router::new()
            .route("/callback", get(handle_callback))
            .with_state(slot);

        let server = tokio::spawn(async move {
            axum::serve(self.listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        let params = params_rx
            .await
            .map_err(|_| AuthError::provider("Callback server stopped before sign-in completed"));

        let _ = shutdown_tx.send(());
        match server.await {
            Ok(Err(e)) => tracing::warn!("Callback server error: {}", e),
            Err(e) => tracing::warn!("Callback server task failed: {}", e),
            Ok(Ok(())) => {}
        }

        params
    }
}

async fn handle_callback(
    State(slot): State<CallbackSlot>,
    Query(params): Query<CallbackParams>,
) -> Html<&'static str> {
    let sender = slot.lock().ok().and_then(|mut guard| guard.take());
    match sender {
        Some(sender) => {
            let _ = sender.send(params);
            Html("<html><body>Sign-in complete. You can close this window.</body></html>")
        }
        None => Html("<html><body>This sign-in request was already handled.</body></html>"),
    }
}
