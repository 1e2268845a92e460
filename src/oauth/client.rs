// src/oauth/client.rs
//! Authorization-code and refresh-token grants against the identity provider.

use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use super::types::{Credentials, ProviderEndpoints, TokenResponse, TokenSet};
use crate::error::{RelayError, Result};

#[derive(Debug, Clone)]
pub struct OAuthClient {
    http: Client,
    credentials: Credentials,
    endpoints: ProviderEndpoints,
}

impl OAuthClient {
    pub fn new(http: Client, credentials: Credentials, endpoints: ProviderEndpoints) -> Self {
        Self {
            http,
            credentials,
            endpoints,
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn endpoints(&self) -> &ProviderEndpoints {
        &self.endpoints
    }

    /// Consent-page URL. `prompt=consent` forces the provider to issue a refresh token.
    pub fn build_authorization_url(&self, scopes: &[String], redirect_uri: &str) -> Result<String> {
        if self.credentials.client_id.is_empty() {
            return Err(RelayError::Config("client id is empty".to_string()));
        }

        let scope = scopes.join(",");
        let url = Url::parse_with_params(
            &self.endpoints.authorization_url(),
            &[
                ("scope", scope.as_str()),
                ("client_id", self.credentials.client_id.as_str()),
                ("response_type", "code"),
                ("access_type", "offline"),
                ("prompt", "consent"),
                ("redirect_uri", redirect_uri),
            ],
        )
        .map_err(|e| RelayError::Config(format!("invalid authorization endpoint: {}", e)))?;

        Ok(url.into())
    }

    /// Consent-page URL with the configured scopes and redirect target.
    pub fn default_authorization_url(&self) -> Result<String> {
        self.build_authorization_url(&self.endpoints.scopes, &self.credentials.redirect_uri)
    }

    pub async fn exchange_code(&self, code: &str) -> Result<TokenSet> {
        if code.trim().is_empty() {
            return Err(RelayError::AuthExchange("empty authorization code".to_string()));
        }

        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("redirect_uri", self.credentials.redirect_uri.as_str()),
            ("code", code),
        ];

        debug!("Exchanging authorization code at {}", self.endpoints.token_url());
        let (status, body) = self.post_token_form(&params).await?;

        parse_grant(status, &body).ok_or_else(|| {
            warn!("Authorization code exchange rejected ({}): {}", status, body);
            RelayError::AuthExchange(body)
        })
    }

    pub async fn refresh_grant(&self, refresh_token: &str) -> Result<TokenSet> {
        if refresh_token.is_empty() {
            return Err(RelayError::AuthRefresh("no refresh token available".to_string()));
        }

        let params = [
            ("grant_type", "refresh_token"),
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("refresh_token", refresh_token),
        ];

        debug!("Requesting refresh grant at {}", self.endpoints.token_url());
        let (status, body) = self.post_token_form(&params).await?;

        parse_grant(status, &body).ok_or_else(|| {
            warn!("Refresh grant rejected ({}): {}", status, body);
            RelayError::AuthRefresh(body)
        })
    }

    async fn post_token_form(&self, params: &[(&str, &str)]) -> Result<(u16, String)> {
        let response = self
            .http
            .post(self.endpoints.token_url())
            .form(params)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok((status, body))
    }
}

fn parse_grant(status: u16, body: &str) -> Option<TokenSet> {
    if !(200..300).contains(&status) {
        return None;
    }
    serde_json::from_str::<TokenResponse>(body)
        .ok()
        .and_then(TokenResponse::into_token_set)
}
