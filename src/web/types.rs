// src/web/types.rs
use std::sync::Arc;

use rocket::http::Status;
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use rocket::{Request, Response};
use tracing::{error, warn};

use crate::error::RelayError;
use crate::oauth::{AuthStatus, TokenManager};
use crate::portals::PortalRegistry;
use crate::recruit::RecruitService;

/// Everything the routes need, built once at startup.
pub struct AppState {
    pub tokens: Arc<TokenManager>,
    pub recruit: RecruitService,
    pub portals: PortalRegistry,
    /// Where the OAuth callback sends the browser back to.
    pub ui_url: String,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde", rename_all = "lowercase")]
pub enum ResponseType {
    Data,
    Action,
    Error,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct DataResponse<T> {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            response_type: ResponseType::Data,
            success: true,
            message: message.into(),
            data,
        }
    }
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ActionResponse<T> {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    pub action: String,
    pub data: T,
}

impl<T> ActionResponse<T> {
    pub fn success(message: impl Into<String>, action: impl Into<String>, data: T) -> Self {
        Self {
            response_type: ResponseType::Action,
            success: true,
            message: message.into(),
            action: action.into(),
            data,
        }
    }
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct StandardErrorResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub error: String,
    pub error_code: String,
    pub suggestions: Vec<String>,
}

impl StandardErrorResponse {
    pub fn new(error: String, error_code: String, suggestions: Vec<String>) -> Self {
        Self {
            response_type: ResponseType::Error,
            success: false,
            error,
            error_code,
            suggestions,
        }
    }
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct AuthStatusResponse {
    pub authenticated: bool,
    pub status: AuthStatus,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ApplyUrlResponse {
    pub job_id: String,
    pub url: String,
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct StatusUpdateRequest {
    pub status: String,
}

/// JSON error body with a status code chosen per failure kind.
#[derive(Debug)]
pub struct ApiError {
    pub status: Status,
    pub error_code: &'static str,
    pub message: String,
    pub suggestions: Vec<String>,
}

impl ApiError {
    pub fn new(status: Status, error_code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            error_code,
            message: message.into(),
            suggestions: Vec::new(),
        }
    }

    pub fn with_suggestions(mut self, suggestions: &[&str]) -> Self {
        self.suggestions = suggestions.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn body(&self) -> StandardErrorResponse {
        StandardErrorResponse::new(
            self.message.clone(),
            self.error_code.to_string(),
            self.suggestions.clone(),
        )
    }
}

// Provider bodies stay in the log; the response only names the failure.
impl From<RelayError> for ApiError {
    fn from(err: RelayError) -> Self {
        let api_error = match &err {
            RelayError::AuthExchange(_) => ApiError::new(
                Status::BadRequest,
                "AUTH_EXCHANGE_FAILED",
                "Authorization with the recruiting platform failed",
            )
            .with_suggestions(&["Log in again via /auth/zoho/login"]),
            RelayError::AuthRefresh(_) | RelayError::AuthRequired(_) => ApiError::new(
                Status::Unauthorized,
                "AUTH_REQUIRED",
                "Not connected to the recruiting platform",
            )
            .with_suggestions(&["Connect the recruiting account via /auth/zoho/login"]),
            RelayError::RemoteApi { status, .. } if err.is_auth() => ApiError::new(
                Status::Unauthorized,
                "AUTH_REQUIRED",
                format!("The recruiting platform rejected the credentials (status {})", status),
            )
            .with_suggestions(&[
                "Connect the recruiting account via /auth/zoho/login",
                "Check that the granted scopes cover this operation",
            ]),
            RelayError::RemoteApi { status, .. } if (400..500).contains(status) => ApiError::new(
                Status::UnprocessableEntity,
                "REMOTE_REJECTED",
                format!("The recruiting platform rejected the request (status {})", status),
            )
            .with_suggestions(&["Check the submitted fields"]),
            RelayError::RemoteApi { status, .. } => ApiError::new(
                Status::BadGateway,
                "REMOTE_ERROR",
                format!("The recruiting platform failed (status {})", status),
            )
            .with_suggestions(&["Try again in a few moments"]),
            RelayError::InvalidResponse(_) => ApiError::new(
                Status::BadGateway,
                "REMOTE_INVALID_RESPONSE",
                "The recruiting platform returned an unexpected response",
            ),
            RelayError::Transport(_) => ApiError::new(
                Status::ServiceUnavailable,
                "REMOTE_UNREACHABLE",
                "The recruiting platform could not be reached",
            )
            .with_suggestions(&["Try again in a few moments"]),
            RelayError::NotFound(_) => ApiError::new(Status::NotFound, "NOT_FOUND", err.to_string()),
            RelayError::Validation(_) => {
                ApiError::new(Status::BadRequest, "VALIDATION_ERROR", err.to_string())
            }
            RelayError::Config(_) => ApiError::new(
                Status::InternalServerError,
                "CONFIGURATION_ERROR",
                "Server configuration error",
            ),
            RelayError::Database(_) => ApiError::new(
                Status::InternalServerError,
                "DATABASE_ERROR",
                "Local storage error",
            ),
        };

        if api_error.status.code >= 500 {
            error!("Request failed ({}): {:?}", api_error.status, err);
        } else {
            warn!("Request failed ({}): {:?}", api_error.status, err);
        }
        api_error
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        let status = self.status;
        Response::build_from(Json(self.body()).respond_to(request)?)
            .status(status)
            .ok()
    }
}
