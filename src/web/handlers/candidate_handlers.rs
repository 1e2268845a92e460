// src/web/handlers/candidate_handlers.rs
use rocket::serde::json::{Json, Value};
use rocket::State;
use tracing::warn;

use crate::error::RelayError;
use crate::recruit::DualWriteOutcome;
use crate::web::types::*;

/// Same degradation as the job list: remote failures yield `[]`,
/// authentication failures do not.
pub async fn list_candidates_handler(
    job_id: &str,
    state: &State<AppState>,
) -> Result<Json<Vec<Value>>, ApiError> {
    match state.recruit.list_candidates(job_id).await {
        Ok(candidates) => Ok(Json(candidates)),
        Err(err) if err.is_remote() => {
            warn!("Candidates for job {} unavailable: {:?}", job_id, err);
            Ok(Json(Vec::new()))
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn candidate_details_handler(
    job_id: &str,
    candidate_id: &str,
    state: &State<AppState>,
) -> Result<Json<Value>, ApiError> {
    state
        .recruit
        .get_candidate(job_id, candidate_id)
        .await?
        .map(Json)
        .ok_or_else(|| RelayError::NotFound(format!("candidate {}", candidate_id)).into())
}

pub async fn update_status_handler(
    job_id: &str,
    candidate_id: &str,
    request: Json<StatusUpdateRequest>,
    state: &State<AppState>,
) -> Result<Json<ActionResponse<DualWriteOutcome>>, ApiError> {
    let outcome = state
        .recruit
        .update_candidate_status(job_id, candidate_id, &request.status)
        .await?;
    Ok(Json(ActionResponse::success(
        format!("Candidate {} moved to {}", candidate_id, request.status.trim()),
        "update_candidate_status",
        outcome,
    )))
}
