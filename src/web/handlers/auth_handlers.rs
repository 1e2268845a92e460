// src/web/handlers/auth_handlers.rs
use rocket::response::Redirect;
use rocket::serde::json::Json;
use rocket::State;
use tracing::info;

use crate::error::RelayError;
use crate::web::types::*;

pub async fn login_handler(state: &State<AppState>) -> Result<Redirect, ApiError> {
    let url = state.tokens.authorization_url()?;
    info!("Redirecting to recruiting platform consent page");
    Ok(Redirect::found(url))
}

pub async fn callback_handler(
    code: Option<String>,
    error: Option<String>,
    state: &State<AppState>,
) -> Result<Redirect, ApiError> {
    if let Some(error) = error {
        return Err(RelayError::AuthExchange(error).into());
    }
    let code = code
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| RelayError::Validation("missing authorization code".to_string()))?;

    state.tokens.exchange_code(&code).await?;
    info!("Recruiting platform connected");

    Ok(Redirect::found(format!(
        "{}/?zoho_connected=true",
        state.ui_url.trim_end_matches('/')
    )))
}

pub async fn status_handler(state: &State<AppState>) -> Json<AuthStatusResponse> {
    let status = state.tokens.status().await;
    Json(AuthStatusResponse {
        authenticated: status == crate::oauth::AuthStatus::Authenticated,
        status,
    })
}
