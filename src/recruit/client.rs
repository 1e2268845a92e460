// src/recruit/client.rs
//! HTTP access to the recruiting API with one credential repair per request.
//!
//! A 401 means the provider refused the credential before touching the
//! resource, so the request (including PUT/POST) is reissued once with a
//! refreshed token. The second outcome is final.

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::error::{RelayError, Result};
use crate::oauth::TokenManager;

pub const DEFAULT_AUTH_SCHEME: &str = "Zoho-oauthtoken";

/// A 2xx response. Empty bodies (204) come back as `Value::Null`.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn is_empty(&self) -> bool {
        self.status == StatusCode::NO_CONTENT.as_u16() || self.body.is_null()
    }

    /// `body.data` as a list, empty when absent.
    pub fn data(&self) -> Vec<Value> {
        self.body
            .get("data")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default()
    }
}

pub struct RecruitClient {
    http: Client,
    tokens: Arc<TokenManager>,
    api_base: String,
    auth_scheme: String,
}

impl RecruitClient {
    pub fn new(http: Client, tokens: Arc<TokenManager>, api_base: String) -> Self {
        Self {
            http,
            tokens,
            api_base: api_base.trim_end_matches('/').to_string(),
            auth_scheme: DEFAULT_AUTH_SCHEME.to_string(),
        }
    }

    pub fn tokens(&self) -> &Arc<TokenManager> {
        &self.tokens
    }

    pub async fn request(&self, method: Method, path: &str, body: Option<&Value>) -> Result<ApiResponse> {
        self.request_with_query(method, path, &[], body).await
    }

    #[instrument(skip(self, query, body), fields(method = %method, path = %path))]
    pub async fn request_with_query(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<ApiResponse> {
        let token = self.tokens.get_valid_access_token(false).await?;
        let (mut status, mut text) = self.send(&method, path, query, body, &token).await?;

        if status == StatusCode::UNAUTHORIZED {
            warn!("Access token rejected, refreshing and retrying once");
            let token = self.tokens.replace_rejected(&token).await?;
            (status, text) = self.send(&method, path, query, body, &token).await?;
        }

        if !status.is_success() {
            warn!("Recruiting API returned {}: {}", status, text);
            return Err(RelayError::remote(status.as_u16(), text));
        }

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text)
                .map_err(|e| RelayError::InvalidResponse(format!("body is not JSON: {}", e)))?
        };

        debug!("Recruiting API returned {}", status);
        Ok(ApiResponse {
            status: status.as_u16(),
            body,
        })
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.request(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<ApiResponse> {
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> Result<ApiResponse> {
        self.request(Method::PUT, path, Some(body)).await
    }

    async fn send(
        &self,
        method: &Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
        token: &str,
    ) -> Result<(StatusCode, String)> {
        let url = format!("{}{}", self.api_base, path);

        let mut request = self
            .http
            .request(method.clone(), &url)
            .header(AUTHORIZATION, format!("{} {}", self.auth_scheme, token))
            .header(CONTENT_TYPE, "application/json");
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        Ok((status, text))
    }
}
