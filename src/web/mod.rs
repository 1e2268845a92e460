// src/web/mod.rs
pub mod handlers;
pub mod types;

pub use handlers::*;
pub use types::*;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{Header, Status};
use rocket::response::Redirect;
use rocket::serde::json::{Json, Value};
use rocket::{catchers, get, options, patch, post, routes, Build, Request, Response, Rocket, State};
use tracing::info;

use crate::config::RelayConfig;
use crate::database::JobRecord;
use crate::oauth::{OAuthClient, TokenManager};
use crate::portals::{PortalRegistry, PortalResult};
use crate::recruit::{CreatedJob, DualWriteOutcome, JobPosting, JobSummary, RecruitClient, RecruitService};

// CORS Fairing
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, GET, PATCH, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
    }
}

#[get("/health")]
pub async fn health() -> &'static str {
    handlers::health_handler().await
}

#[get("/auth/zoho/login")]
pub async fn zoho_login(state: &State<AppState>) -> Result<Redirect, ApiError> {
    handlers::login_handler(state).await
}

#[get("/auth/zoho/callback?<code>&<error>")]
pub async fn zoho_callback(
    code: Option<String>,
    error: Option<String>,
    state: &State<AppState>,
) -> Result<Redirect, ApiError> {
    handlers::callback_handler(code, error, state).await
}

#[get("/auth/zoho/status")]
pub async fn zoho_status(state: &State<AppState>) -> Json<AuthStatusResponse> {
    handlers::status_handler(state).await
}

#[post("/jobs", data = "<posting>")]
pub async fn create_job(
    posting: Json<JobPosting>,
    state: &State<AppState>,
) -> Result<Json<ActionResponse<CreatedJob>>, ApiError> {
    handlers::create_job_handler(posting, state).await
}

#[get("/jobs")]
pub async fn list_jobs(state: &State<AppState>) -> Result<Json<Vec<JobSummary>>, ApiError> {
    handlers::list_jobs_handler(state).await
}

#[get("/jobs/mirror")]
pub async fn mirrored_jobs(
    state: &State<AppState>,
) -> Result<Json<DataResponse<Vec<JobRecord>>>, ApiError> {
    handlers::mirrored_jobs_handler(state).await
}

#[get("/jobs/<job_id>", rank = 2)]
pub async fn job_details(job_id: &str, state: &State<AppState>) -> Result<Json<Value>, ApiError> {
    handlers::job_details_handler(job_id, state).await
}

#[get("/jobs/<job_id>/apply-url")]
pub async fn job_apply_url(
    job_id: &str,
    state: &State<AppState>,
) -> Result<Json<ApplyUrlResponse>, ApiError> {
    handlers::apply_url_handler(job_id, state).await
}

#[patch("/jobs/<job_id>/archive")]
pub async fn archive_job(
    job_id: &str,
    state: &State<AppState>,
) -> Result<Json<ActionResponse<DualWriteOutcome>>, ApiError> {
    handlers::archive_job_handler(job_id, state).await
}

#[get("/jobs/<job_id>/candidates")]
pub async fn list_candidates(
    job_id: &str,
    state: &State<AppState>,
) -> Result<Json<Vec<Value>>, ApiError> {
    handlers::list_candidates_handler(job_id, state).await
}

#[get("/jobs/<job_id>/candidates/<candidate_id>")]
pub async fn candidate_details(
    job_id: &str,
    candidate_id: &str,
    state: &State<AppState>,
) -> Result<Json<Value>, ApiError> {
    handlers::candidate_details_handler(job_id, candidate_id, state).await
}

#[patch("/jobs/<job_id>/candidates/<candidate_id>/status", data = "<request>")]
pub async fn update_candidate_status(
    job_id: &str,
    candidate_id: &str,
    request: Json<StatusUpdateRequest>,
    state: &State<AppState>,
) -> Result<Json<ActionResponse<DualWriteOutcome>>, ApiError> {
    handlers::update_status_handler(job_id, candidate_id, request, state).await
}

#[get("/portals")]
pub async fn list_portals(state: &State<AppState>) -> Json<Vec<String>> {
    handlers::list_portals_handler(state).await
}

#[post("/portals/post/<job_id>", data = "<portals>")]
pub async fn publish_job(
    job_id: &str,
    portals: Json<Vec<String>>,
    state: &State<AppState>,
) -> Result<Json<DataResponse<Vec<PortalResult>>>, ApiError> {
    handlers::publish_job_handler(job_id, portals, state).await
}

#[options("/<_..>")]
pub async fn options() -> Status {
    Status::Ok
}

// Error catchers
#[rocket::catch(400)]
pub fn bad_request() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Invalid request format".to_string(),
        "BAD_REQUEST".to_string(),
        vec!["Check your request JSON format".to_string()],
    ))
}

#[rocket::catch(404)]
pub fn not_found() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Resource not found".to_string(),
        "NOT_FOUND".to_string(),
        vec!["Check the request path".to_string()],
    ))
}

#[rocket::catch(422)]
pub fn unprocessable() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Request body could not be parsed".to_string(),
        "UNPROCESSABLE_ENTITY".to_string(),
        vec![
            "Verify all required fields are present".to_string(),
            "Dates must be formatted as YYYY-MM-DD".to_string(),
        ],
    ))
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Internal server error".to_string(),
        "INTERNAL_ERROR".to_string(),
        vec!["Try again in a few moments".to_string()],
    ))
}

/// Routes, catchers and fairings around an already-built state.
pub fn build_rocket(rocket: Rocket<Build>, state: AppState) -> Rocket<Build> {
    rocket
        .attach(Cors)
        .manage(state)
        .register("/", catchers![bad_request, not_found, unprocessable, internal_error])
        .mount(
            "/",
            routes![
                health,
                zoho_login,
                zoho_callback,
                zoho_status,
                create_job,
                list_jobs,
                mirrored_jobs,
                job_details,
                job_apply_url,
                archive_job,
                list_candidates,
                candidate_details,
                update_candidate_status,
                list_portals,
                publish_job,
                options,
            ],
        )
}

/// Wire the token manager, API client, job mirror and portals from config.
pub async fn build_state(config: &RelayConfig) -> Result<AppState> {
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.service.timeout_seconds))
        .build()
        .context("Failed to build HTTP client")?;

    let oauth = OAuthClient::new(http.clone(), config.credentials(), config.endpoints());
    let tokens = Arc::new(TokenManager::new(oauth));

    let database = Arc::new(config.open_database().await?);
    let client = RecruitClient::new(http, tokens.clone(), config.zoho.api_base.clone());
    let recruit =
        RecruitService::new(client, config.zoho.careers_url.clone()).with_database(database);

    Ok(AppState {
        tokens,
        recruit,
        portals: PortalRegistry::with_defaults(&config.zoho.careers_url),
        ui_url: config.service.ui_url.clone(),
    })
}

pub async fn start_web_server(config: RelayConfig) -> Result<()> {
    config.require_credentials()?;
    let state = build_state(&config).await?;

    info!("Starting job relay on port {}", config.service.port);
    info!("Recruiting API: {}", config.zoho.api_base);
    info!("Initial auth status: {:?}", state.tokens.status().await);

    let figment = rocket::Config::figment()
        .merge(("address", "0.0.0.0"))
        .merge(("port", config.service.port));

    let _rocket = build_rocket(rocket::custom(figment), state)
        .launch()
        .await
        .map_err(|e| anyhow::anyhow!("Rocket server failed: {}", e))?;

    Ok(())
}
