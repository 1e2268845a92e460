// src/oauth/token_manager.rs
//! Token lifecycle for the recruiting API.
//!
//! Refresh is lazy: it runs when no usable access token is held, or when the
//! recruiting API rejects the current one. Every grant runs under one async
//! mutex, so concurrent callers that find the store empty wait for the
//! in-flight refresh and reuse its result instead of issuing their own.

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use super::client::OAuthClient;
use super::types::{AuthStatus, TokenSet, TokenState};
use crate::error::{RelayError, Result};

pub struct TokenManager {
    client: OAuthClient,
    state: RwLock<TokenState>,
    flight: Mutex<()>,
}

impl TokenManager {
    pub fn new(client: OAuthClient) -> Self {
        let has_bootstrap = client
            .credentials()
            .bootstrap_refresh_token
            .as_deref()
            .is_some_and(|t| !t.is_empty());

        Self {
            client,
            state: RwLock::new(TokenState::new(has_bootstrap)),
            flight: Mutex::new(()),
        }
    }

    pub fn build_authorization_url(&self, scopes: &[String], redirect_uri: &str) -> Result<String> {
        self.client.build_authorization_url(scopes, redirect_uri)
    }

    pub fn authorization_url(&self) -> Result<String> {
        self.client.default_authorization_url()
    }

    pub async fn status(&self) -> AuthStatus {
        self.state.read().await.status
    }

    pub async fn is_authenticated(&self) -> bool {
        self.status().await == AuthStatus::Authenticated
    }

    /// One-time authorization-code exchange. State is untouched on failure.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenSet> {
        let _flight = self.flight.lock().await;

        let tokens = self.client.exchange_code(code).await?;
        self.state.write().await.apply(&tokens);

        info!(
            "Authorization code exchanged (refresh token issued: {})",
            tokens.refresh_token.is_some()
        );
        Ok(tokens)
    }

    /// Install tokens obtained out of band.
    pub async fn store_tokens(&self, tokens: TokenSet) {
        let _flight = self.flight.lock().await;
        self.state.write().await.apply(&tokens);
    }

    /// Refresh-token grant. Not retried here; retry policy belongs to the caller.
    pub async fn refresh(&self) -> Result<String> {
        let _flight = self.flight.lock().await;
        self.refresh_locked().await
    }

    /// Cached access token, or the result of a refresh when none is usable
    /// or `force_refresh` is set.
    pub async fn get_valid_access_token(&self, force_refresh: bool) -> Result<String> {
        let seen_generation = {
            let state = self.state.read().await;
            if !force_refresh {
                if let Some(token) = state.usable_access_token(Utc::now()) {
                    return Ok(token.to_string());
                }
            }
            state.generation
        };

        // A grant that landed while waiting is reused even if its token is
        // already near expiry; the next caller refreshes again.
        self.refresh_unless(|state| {
            state.generation != seen_generation
                || (!force_refresh && state.usable_access_token(Utc::now()).is_some())
        })
        .await
    }

    pub async fn force_refresh(&self) -> Result<String> {
        self.get_valid_access_token(true).await
    }

    /// Drop `rejected` if it is still the live token.
    pub async fn invalidate(&self, rejected: &str) {
        let mut state = self.state.write().await;
        if state.access_token.as_deref() != Some(rejected) {
            return;
        }

        state.access_token = None;
        state.expires_at = None;
        state.status = if state.refresh_token.is_some() || self.has_bootstrap() {
            AuthStatus::Stale
        } else {
            AuthStatus::Unauthenticated
        };
        warn!("Access token rejected by recruiting API, marked stale");
    }

    /// Invalidate a rejected token and obtain a replacement. Concurrent callers
    /// holding the same rejected token share one refresh.
    pub async fn replace_rejected(&self, rejected: &str) -> Result<String> {
        self.invalidate(rejected).await;
        self.refresh_unless(|state| state.access_token.as_deref() != Some(rejected))
            .await
    }

    async fn refresh_unless<F>(&self, reuse: F) -> Result<String>
    where
        F: Fn(&TokenState) -> bool,
    {
        let _flight = self.flight.lock().await;

        {
            let state = self.state.read().await;
            if reuse(&*state) {
                if let Some(token) = state.access_token.as_deref().filter(|t| !t.is_empty()) {
                    debug!("Reusing access token from a concurrent refresh");
                    return Ok(token.to_string());
                }
            }
        }

        self.refresh_locked().await.map_err(|err| match err {
            RelayError::Transport(_) => err,
            other => RelayError::AuthRequired(Box::new(other)),
        })
    }

    // Caller must hold `flight`.
    async fn refresh_locked(&self) -> Result<String> {
        let refresh_token = {
            let state = self.state.read().await;
            state
                .refresh_token
                .clone()
                .or_else(|| self.client.credentials().bootstrap_refresh_token.clone())
                .filter(|t| !t.is_empty())
        };

        let Some(refresh_token) = refresh_token else {
            self.state.write().await.clear();
            return Err(RelayError::AuthRefresh(
                "no refresh token available".to_string(),
            ));
        };

        match self.client.refresh_grant(&refresh_token).await {
            Ok(tokens) => {
                let mut state = self.state.write().await;
                state.apply(&tokens);
                info!(
                    "Access token refreshed (generation {}, rotated refresh token: {})",
                    state.generation,
                    tokens.refresh_token.is_some()
                );
                Ok(tokens.access_token)
            }
            Err(err @ RelayError::AuthRefresh(_)) => {
                error!("Refresh grant failed, re-authorization required");
                self.state.write().await.clear();
                Err(err)
            }
            Err(err) => {
                warn!("Refresh grant did not complete: {}", err);
                Err(err)
            }
        }
    }

    fn has_bootstrap(&self) -> bool {
        self.client
            .credentials()
            .bootstrap_refresh_token
            .as_deref()
            .is_some_and(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::oauth::types::{Credentials, ProviderEndpoints};
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn manager_for(accounts_url: &str, bootstrap: Option<&str>) -> TokenManager {
        let client = OAuthClient::new(
            reqwest::Client::new(),
            Credentials {
                client_id: "client-1".to_string(),
                client_secret: "secret-1".to_string(),
                redirect_uri: "http://localhost:8000/auth/zoho/callback".to_string(),
                bootstrap_refresh_token: bootstrap.map(str::to_string),
            },
            ProviderEndpoints {
                accounts_url: accounts_url.to_string(),
                scopes: vec!["ZohoRecruit.modules.ALL".to_string()],
            },
        );
        TokenManager::new(client)
    }

    fn token_body(access: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": access,
            "expires_in": 3600
        }))
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_refresh() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .respond_with(token_body("shared-token").set_delay(Duration::from_millis(200)))
            .expect(1)
            .mount(&server)
            .await;

        let manager = Arc::new(manager_for(&server.uri(), Some("bootstrap-refresh")));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let manager = manager.clone();
                tokio::spawn(async move { manager.get_valid_access_token(false).await })
            })
            .collect();

        for handle in handles {
            let token = handle.await.unwrap().unwrap();
            assert_eq!(token, "shared-token");
        }
        assert_eq!(manager.status().await, AuthStatus::Authenticated);
    }

    #[tokio::test]
    async fn test_short_lived_token_still_single_flight() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({
                        "access_token": "short",
                        "expires_in": 45
                    }))
                    .set_delay(Duration::from_millis(100)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let manager = Arc::new(manager_for(&server.uri(), Some("bootstrap-refresh")));

        let handles: Vec<_> = (0..5)
            .map(|_| {
                let manager = manager.clone();
                tokio::spawn(async move { manager.get_valid_access_token(false).await })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), "short");
        }
        assert_eq!(manager.get_valid_access_token(false).await.unwrap(), "short");
    }

    #[tokio::test]
    async fn test_refresh_once_then_reuse() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("refresh_token=bootstrap-refresh"))
            .respond_with(token_body("fresh-token"))
            .expect(1)
            .mount(&server)
            .await;

        let manager = manager_for(&server.uri(), Some("bootstrap-refresh"));
        assert_eq!(manager.status().await, AuthStatus::Stale);

        for _ in 0..3 {
            assert_eq!(
                manager.get_valid_access_token(false).await.unwrap(),
                "fresh-token"
            );
        }
        assert!(manager.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_refresh_failure_requires_reauthorization() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid_client"))
            .expect(1)
            .mount(&server)
            .await;

        let manager = manager_for(&server.uri(), Some("revoked-refresh"));
        let err = manager.get_valid_access_token(false).await.unwrap_err();

        match err {
            RelayError::AuthRequired(source) => {
                assert!(matches!(*source, RelayError::AuthRefresh(_)))
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(manager.status().await, AuthStatus::Unauthenticated);
    }

    #[tokio::test]
    async fn test_no_credentials_makes_no_network_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(token_body("never"))
            .expect(0)
            .mount(&server)
            .await;

        let manager = manager_for(&server.uri(), None);
        let err = manager.get_valid_access_token(false).await.unwrap_err();
        assert!(matches!(err, RelayError::AuthRequired(_)));

        let err = manager.refresh().await.unwrap_err();
        assert!(matches!(err, RelayError::AuthRefresh(_)));
    }

    #[tokio::test]
    async fn test_exchange_code_populates_state() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "access-1",
                "refresh_token": "refresh-1",
                "expires_in": 3600
            })))
            .mount(&server)
            .await;

        let manager = manager_for(&server.uri(), None);
        manager.exchange_code("grant-1").await.unwrap();

        assert!(manager.is_authenticated().await);
        assert_eq!(manager.get_valid_access_token(false).await.unwrap(), "access-1");
    }

    #[tokio::test]
    async fn test_failed_exchange_leaves_state_untouched() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid_code"))
            .mount(&server)
            .await;

        let manager = manager_for(&server.uri(), None);
        manager
            .store_tokens(TokenSet::new("kept".into(), Some("kept-refresh".into()), None))
            .await;

        let err = manager.exchange_code("expired").await.unwrap_err();
        assert!(matches!(err, RelayError::AuthExchange(_)));
        assert_eq!(manager.get_valid_access_token(false).await.unwrap(), "kept");
    }

    #[tokio::test]
    async fn test_force_refresh_uses_rotated_refresh_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("refresh_token=first-refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "second-access",
                "refresh_token": "second-refresh"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("refresh_token=second-refresh"))
            .respond_with(token_body("third-access"))
            .expect(1)
            .mount(&server)
            .await;

        let manager = manager_for(&server.uri(), None);
        manager
            .store_tokens(TokenSet::new("first-access".into(), Some("first-refresh".into()), None))
            .await;

        assert_eq!(manager.force_refresh().await.unwrap(), "second-access");
        assert_eq!(manager.force_refresh().await.unwrap(), "third-access");
    }

    #[tokio::test]
    async fn test_concurrent_rejections_share_one_refresh() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(token_body("replacement").set_delay(Duration::from_millis(100)))
            .expect(1)
            .mount(&server)
            .await;

        let manager = Arc::new(manager_for(&server.uri(), None));
        manager
            .store_tokens(TokenSet::new("rejected".into(), Some("refresh-1".into()), None))
            .await;

        let first = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.replace_rejected("rejected").await })
        };
        let second = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.replace_rejected("rejected").await })
        };

        assert_eq!(first.await.unwrap().unwrap(), "replacement");
        assert_eq!(second.await.unwrap().unwrap(), "replacement");
    }

    #[tokio::test]
    async fn test_invalidate_ignores_stale_rejection() {
        let manager = manager_for("http://127.0.0.1:9", None);
        manager
            .store_tokens(TokenSet::new("current".into(), Some("refresh".into()), None))
            .await;

        manager.invalidate("older").await;
        assert!(manager.is_authenticated().await);

        manager.invalidate("current").await;
        assert_eq!(manager.status().await, AuthStatus::Stale);
    }

    #[tokio::test]
    async fn test_transport_failure_keeps_status() {
        // Nothing listens on the discard port.
        let manager = manager_for("http://127.0.0.1:9", Some("bootstrap"));
        let err = manager.get_valid_access_token(false).await.unwrap_err();

        assert!(matches!(err, RelayError::Transport(_)));
        assert_eq!(manager.status().await, AuthStatus::Stale);
    }
}
