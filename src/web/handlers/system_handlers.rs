// src/web/handlers/system_handlers.rs
use rocket::serde::json::Json;
use rocket::State;

use crate::database::JobRecord;
use crate::web::types::*;

pub async fn health_handler() -> &'static str {
    "OK"
}

pub async fn mirrored_jobs_handler(
    state: &State<AppState>,
) -> Result<Json<DataResponse<Vec<JobRecord>>>, ApiError> {
    let jobs = state.recruit.mirrored_jobs().await?;
    Ok(Json(DataResponse::success(
        format!("{} mirrored job postings", jobs.len()),
        jobs,
    )))
}
