// src/test_utils.rs
//! Fixtures shared by unit tests. Accounts and recruiting API are served by
//! the same mock server: grants under `/token`, resources under [`API_PATH`].

use std::sync::Arc;
use std::time::Duration;

use wiremock::{MockServer, ResponseTemplate};

use crate::oauth::{Credentials, OAuthClient, ProviderEndpoints, TokenManager, TokenSet};
use crate::recruit::RecruitClient;

pub const API_PATH: &str = "/recruit/v2";

pub fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .expect("reqwest client")
}

pub fn token_manager(http: reqwest::Client, accounts_url: &str, bootstrap: Option<&str>) -> Arc<TokenManager> {
    let client = OAuthClient::new(
        http,
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
    Arc::new(TokenManager::new(client))
}

pub fn recruit_client_with_timeout(server: &MockServer, timeout: Duration) -> RecruitClient {
    let http = http_client(timeout);
    let tokens = token_manager(http.clone(), &server.uri(), None);
    RecruitClient::new(http, tokens, format!("{}{}", server.uri(), API_PATH))
}

pub fn recruit_client(server: &MockServer) -> RecruitClient {
    recruit_client_with_timeout(server, Duration::from_secs(5))
}

/// Client already holding a long-lived access token.
pub async fn authenticated_client(server: &MockServer) -> RecruitClient {
    let client = recruit_client(server);
    client
        .tokens()
        .store_tokens(TokenSet::new("access-1".into(), Some("refresh-1".into()), Some(3600)))
        .await;
    client
}

pub fn token_response(access: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "access_token": access,
        "expires_in": 3600
    }))
}
