//! Identity provider seam and the Google OAuth implementation.
//!
//! `GoogleIdentityProvider` drives the authorization-code flow: it builds the
//! consent URL (forced into popup display), waits on the local callback,
//! exchanges the code and reads the OpenID userinfo. Tokens are held in memory
//! as the provider session until `sign_out` revokes them.

use crate::auth::callback::CallbackServer;
use crate::auth::errors::{AuthError, AuthResult};
use crate::auth::models::{PopupRequest, ProviderUser};
use crate::config::GoogleOAuthConfig;
use crate::utils::generate_random_string::generate_random_string;
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

const STATE_LENGTH: usize = 32;

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Runs the interactive popup flow and resolves once the user finishes it.
    async fn sign_in_with_popup(&self, request: &PopupRequest) -> AuthResult<ProviderUser>;

    /// Ends the provider session.
    async fn sign_out(&self) -> AuthResult<()>;
}

/// Google OAuth endpoints, overridable for tests.
#[derive(Debug, Clone)]
pub struct GoogleEndpoints {
    pub authorization_url: String,
    pub token_url: String,
    pub userinfo_url: String,
    pub revoke_url: String,
}

impl Default for GoogleEndpoints {
    fn default() -> Self {
        Self {
            authorization_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            userinfo_url: "https://openidconnect.googleapis.com/v1/userinfo".to_string(),
            revoke_url: "https://oauth2.googleapis.com/revoke".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Clone)]
struct ProviderSession {
    access_token: String,
    refresh_token: Option<String>,
}

type UrlOpener = Box<dyn Fn(&Url) + Send + Sync>;

pub struct GoogleIdentityProvider {
    http_client: Client,
    config: GoogleOAuthConfig,
    endpoints: GoogleEndpoints,
    open_url: UrlOpener,
    session: Mutex<Option<ProviderSession>>,
}

impl GoogleIdentityProvider {
    pub fn new(config: GoogleOAuthConfig) -> AuthResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AuthError::provider(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            config,
            endpoints: GoogleEndpoints::default(),
            open_url: Box::new(|url: &Url| {
                eprintln!("Open this URL in your browser to sign in with Google:\n\n  {url}\n");
            }),
            session: Mutex::new(None),
        })
    }

    pub fn with_endpoints(mut self, endpoints: GoogleEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Replaces how the consent URL is presented to the user.
    pub fn with_url_opener(mut self, open_url: impl Fn(&Url) + Send + Sync + 'static) -> Self {
        self.open_url = Box::new(open_url);
        self
    }

    /// Builds the consent page URL.
    pub fn authorization_url(
        &self,
        request: &PopupRequest,
        redirect_uri: &str,
        state: &str,
    ) -> AuthResult<Url> {
        let mut url = Url::parse(&self.endpoints.authorization_url)
            .map_err(|e| AuthError::provider(format!("Invalid authorization endpoint: {e}")))?;

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("response_type", "code");
            query.append_pair("client_id", &self.config.client_id);
            query.append_pair("redirect_uri", redirect_uri);
            query.append_pair("scope", &request.scopes.join(" "));
            query.append_pair("state", state);
            for (key, value) in &request.custom_parameters {
                query.append_pair(key, value);
            }
        }

        Ok(url)
    }

    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> AuthResult<TokenResponse> {
        let response = self
            .http_client
            .post(&self.endpoints.token_url)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AuthError::provider(format!("Token request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::provider(format!(
                "Token exchange failed: HTTP {status} - {body}"
            )));
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| AuthError::provider(format!("Invalid token response: {e}")))
    }

    async fn fetch_user_info(&self, access_token: &str) -> AuthResult<UserInfo> {
        let response = self
            .http_client
            .get(&self.endpoints.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AuthError::provider(format!("Userinfo request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AuthError::provider(format!(
                "Userinfo request failed: HTTP {}",
                response.status()
            )));
        }

        response
            .json::<UserInfo>()
            .await
            .map_err(|e| AuthError::provider(format!("Invalid userinfo response: {e}")))
    }
}

#[async_trait]
impl IdentityProvider for GoogleIdentityProvider {
    async fn sign_in_with_popup(&self, request: &PopupRequest) -> AuthResult<ProviderUser> {
        let server = CallbackServer::bind(self.config.callback_port).await?;
        let redirect_uri = server.redirect_uri();
        let state = generate_random_string(STATE_LENGTH);

        let url = self.authorization_url(request, &redirect_uri, &state)?;
        debug!("Created authorization URL: {}", url);
        (self.open_url)(&url);

        let callback = server.wait_for_callback().await?;

        if let Some(message) = callback.error_message() {
            warn!("Google sign-in was not completed: {}", message);
            return Err(AuthError::provider(format!("Sign-in was not completed: {message}")));
        }
        if callback.state.as_deref() != Some(state.as_str()) {
            return Err(AuthError::provider("State mismatch in sign-in callback"));
        }
        let code = callback
            .code
            .ok_or_else(|| AuthError::provider("Sign-in callback carried no authorization code"))?;

        let tokens = self.exchange_code(&code, &redirect_uri).await?;
        let user_info = self.fetch_user_info(&tokens.access_token).await?;

        *self.session.lock().await = Some(ProviderSession {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        });

        info!("Google sign-in completed for subject {}", user_info.sub);
        Ok(ProviderUser {
            uid: user_info.sub,
            email: user_info.email,
            display_name: user_info.name,
        })
    }

    async fn sign_out(&self) -> AuthResult<()> {
        let mut session = self.session.lock().await;
        let Some(current) = session.as_ref() else {
            return Ok(());
        };

        // Revoking the refresh token also invalidates its access tokens.
        let token = current
            .refresh_token
            .as_deref()
            .unwrap_or(&current.access_token);

        let response = self
            .http_client
            .post(&self.endpoints.revoke_url)
            .form(&[("token", token)])
            .send()
            .await
            .map_err(|e| AuthError::provider(format!("Revoke request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AuthError::provider(format!(
                "Token revocation failed: HTTP {}",
                response.status()
            )));
        }

        *session = None;
        info!("Google session revoked");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config() -> GoogleOAuthConfig {
        GoogleOAuthConfig {
            client_id: "client-123".to_string(),
            client_secret: "secret".to_string(),
            callback_port: 0,
        }
    }

    fn endpoints(server: &MockServer) -> GoogleEndpoints {
        GoogleEndpoints {
            authorization_url: format!("{}/auth", server.uri()),
            token_url: format!("{}/token", server.uri()),
            userinfo_url: format!("{}/userinfo", server.uri()),
            revoke_url: format!("{}/revoke", server.uri()),
        }
    }

    /// Stands in for the browser: follows the consent URL straight to the
    /// redirect URI with the given code and the echoed (or overridden) state.
    fn browser(
        code: &'static str,
        forced_state: Option<&'static str>,
    ) -> impl Fn(&Url) + Send + Sync + 'static {
        move |url: &Url| {
            let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
            let find = |key: &str| {
                pairs
                    .iter()
                    .find(|(k, _)| k == key)
                    .map(|(_, v)| v.clone())
                    .unwrap()
            };
            let redirect_uri = find("redirect_uri");
            let state = forced_state
                .map(str::to_string)
                .unwrap_or_else(|| find("state"));
            tokio::spawn(async move {
                let mut callback = Url::parse(&redirect_uri).unwrap();
                callback
                    .query_pairs_mut()
                    .append_pair("code", code)
                    .append_pair("state", &state);
                let _ = reqwest::get(callback).await;
            });
        }
    }

    #[tokio::test]
    async fn test_authorization_url_forces_popup() {
        let provider = GoogleIdentityProvider::new(config()).unwrap();
        let url = provider
            .authorization_url(
                &PopupRequest::google(),
                "http://127.0.0.1:8765/callback",
                "state-1",
            )
            .unwrap();

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("display".to_string(), "popup".to_string())));
        assert!(pairs.contains(&("client_id".to_string(), "client-123".to_string())));
        assert!(pairs.contains(&("scope".to_string(), "openid email profile".to_string())));
        assert!(pairs.contains(&("state".to_string(), "state-1".to_string())));
    }

    #[tokio::test]
    async fn test_popup_flow_returns_provider_user() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("code=auth-code"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "access-1",
                "refresh_token": "refresh-1",
                "expires_in": 3599,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/userinfo"))
            .and(header("authorization", "Bearer access-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "sub": "google-uid-1",
                "email": "admin@example.com",
                "name": "Ada Admin"
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/revoke"))
            .and(body_string_contains("token=refresh-1"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let provider = GoogleIdentityProvider::new(config())
            .unwrap()
            .with_endpoints(endpoints(&server))
            .with_url_opener(browser("auth-code", None));

        let user = provider
            .sign_in_with_popup(&PopupRequest::google())
            .await
            .unwrap();
        assert_eq!(user.uid, "google-uid-1");
        assert_eq!(user.email.as_deref(), Some("admin@example.com"));
        assert_eq!(user.display_name.as_deref(), Some("Ada Admin"));

        provider.sign_out().await.unwrap();
        // A second sign-out has no session left to revoke.
        provider.sign_out().await.unwrap();
    }

    #[tokio::test]
    async fn test_state_mismatch_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let provider = GoogleIdentityProvider::new(config())
            .unwrap()
            .with_endpoints(endpoints(&server))
            .with_url_opener(browser("auth-code", Some("forged")));

        let error = provider
            .sign_in_with_popup(&PopupRequest::google())
            .await
            .unwrap_err();
        assert_eq!(error.kind(), "provider-error");
    }

    #[tokio::test]
    async fn test_failed_revoke_keeps_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "access-1"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/userinfo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "sub": "google-uid-1"
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/revoke"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let provider = GoogleIdentityProvider::new(config())
            .unwrap()
            .with_endpoints(endpoints(&server))
            .with_url_opener(browser("auth-code", None));

        let user = provider
            .sign_in_with_popup(&PopupRequest::google())
            .await
            .unwrap();
        assert!(user.email.is_none());
        assert!(provider.sign_out().await.is_err());
    }
}
