// src/oauth/types.rs
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Upper bound on the slack applied to a known expiry before a token is
/// treated as gone. Short-lived tokens get half their lifetime instead.
pub const EXPIRY_SKEW_SECS: i64 = 60;

/// Long-lived client credentials supplied at startup.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    /// Used when no refresh token is held in memory.
    pub bootstrap_refresh_token: Option<String>,
}

/// Identity provider endpoints and requested scopes.
#[derive(Debug, Clone)]
pub struct ProviderEndpoints {
    /// Base of the accounts service, e.g. `https://accounts.zoho.com/oauth/v2`
    pub accounts_url: String,
    pub scopes: Vec<String>,
}

impl ProviderEndpoints {
    pub fn authorization_url(&self) -> String {
        format!("{}/auth", self.accounts_url.trim_end_matches('/'))
    }

    pub fn token_url(&self) -> String {
        format!("{}/token", self.accounts_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthStatus {
    /// No access token and no refresh token.
    Unauthenticated,
    /// A usable access token is held.
    Authenticated,
    /// Access token missing or rejected, but a refresh token is available.
    Stale,
}

/// Tokens returned by a successful grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl TokenSet {
    pub fn new(access_token: String, refresh_token: Option<String>, expires_in: Option<i64>) -> Self {
        let expires_at = expires_in
            .filter(|secs| *secs > 0)
            .map(|secs| Utc::now() + Duration::seconds(secs));

        Self {
            access_token,
            refresh_token,
            expires_at,
        }
    }
}

/// The single live token state of the process. Owned by `TokenManager`.
#[derive(Debug, Clone)]
pub struct TokenState {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub status: AuthStatus,
    /// Bumped on every successful grant.
    pub generation: u64,
    /// Slack for the current token, fixed when it is applied.
    pub expiry_skew: Duration,
}

impl TokenState {
    pub fn new(has_bootstrap_refresh: bool) -> Self {
        Self {
            access_token: None,
            refresh_token: None,
            expires_at: None,
            status: if has_bootstrap_refresh {
                AuthStatus::Stale
            } else {
                AuthStatus::Unauthenticated
            },
            generation: 0,
            expiry_skew: Duration::seconds(EXPIRY_SKEW_SECS),
        }
    }

    /// Access token if present and not past its known expiry.
    pub fn usable_access_token(&self, now: DateTime<Utc>) -> Option<&str> {
        let token = self.access_token.as_deref().filter(|t| !t.is_empty())?;
        match self.expires_at {
            Some(expires_at) if now + self.expiry_skew >= expires_at => None,
            _ => Some(token),
        }
    }

    /// Replace state after a grant. A grant without a refresh token keeps the old one.
    pub fn apply(&mut self, tokens: &TokenSet) {
        self.access_token = Some(tokens.access_token.clone());
        if let Some(refresh) = &tokens.refresh_token {
            self.refresh_token = Some(refresh.clone());
        }
        self.expires_at = tokens.expires_at;
        self.expiry_skew = expiry_skew(tokens.expires_at, Utc::now());
        self.status = AuthStatus::Authenticated;
        self.generation += 1;
    }

    pub fn clear(&mut self) {
        self.access_token = None;
        self.refresh_token = None;
        self.expires_at = None;
        self.status = AuthStatus::Unauthenticated;
    }
}

fn expiry_skew(expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Duration {
    let max = Duration::seconds(EXPIRY_SKEW_SECS);
    match expires_at {
        Some(expires_at) => ((expires_at - now) / 2).clamp(Duration::zero(), max),
        None => max,
    }
}

/// Body of the token endpoint. The provider may answer 200 with only `error` set.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
    pub error: Option<String>,
}

impl TokenResponse {
    pub fn into_token_set(self) -> Option<TokenSet> {
        if self.error.is_some() {
            return None;
        }
        let access_token = self.access_token.filter(|t| !t.is_empty())?;
        Some(TokenSet::new(access_token, self.refresh_token, self.expires_in))
    }
}
