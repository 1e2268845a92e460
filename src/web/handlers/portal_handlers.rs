// src/web/handlers/portal_handlers.rs
use rocket::serde::json::Json;
use rocket::State;

use crate::error::RelayError;
use crate::portals::PortalResult;
use crate::recruit::JobSummary;
use crate::web::types::*;

pub async fn list_portals_handler(state: &State<AppState>) -> Json<Vec<String>> {
    Json(state.portals.names())
}

pub async fn publish_job_handler(
    job_id: &str,
    portals: Json<Vec<String>>,
    state: &State<AppState>,
) -> Result<Json<DataResponse<Vec<PortalResult>>>, ApiError> {
    if portals.is_empty() {
        return Err(RelayError::Validation("no portals requested".to_string()).into());
    }

    let record = state
        .recruit
        .get_job_details(job_id)
        .await?
        .ok_or_else(|| RelayError::NotFound(format!("job {}", job_id)))?;
    let job = JobSummary::from_external(&record)
        .ok_or_else(|| RelayError::InvalidResponse("job record has no id".to_string()))?;

    let results = state.portals.publish(&job, &portals).await;
    let published = results.iter().filter(|r| r.success).count();

    Ok(Json(DataResponse::success(
        format!("Published to {} of {} portals", published, results.len()),
        results,
    )))
}
