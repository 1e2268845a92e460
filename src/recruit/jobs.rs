// src/recruit/jobs.rs
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, instrument, warn};

use super::mapping::{self, JobPosting, JobSummary, JOB_LIST_FIELDS};
use super::{path_segment, DualWriteOutcome, RecruitService};
use crate::database::JobRecord;
use crate::error::{RelayError, Result};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CreatedJob {
    pub id: String,
    pub apply_url: String,
    /// False when the local mirror insert failed after the remote create.
    pub mirrored: bool,
}

impl RecruitService {
    /// Create the opening remotely, then mirror it locally exactly once.
    #[instrument(skip(self, posting), fields(title = %posting.title))]
    pub async fn create_job(&self, posting: &JobPosting) -> Result<CreatedJob> {
        posting.validate()?;

        let response = self
            .client
            .post("/JobOpenings", &posting.to_external())
            .await?;

        let id = mapping::created_record_id(&response.body).ok_or_else(|| {
            warn!("Job opening create not confirmed: {}", response.body);
            RelayError::InvalidResponse("job opening was not created".to_string())
        })?;
        info!("Created job opening {}", id);

        let mirrored = match &self.database {
            Some(db) => match db.jobs().insert(&id, posting).await {
                Ok(_) => true,
                Err(err) => {
                    error!("Job opening {} created but not mirrored: {}", id, err);
                    false
                }
            },
            None => false,
        };

        Ok(CreatedJob {
            apply_url: mapping::apply_url(&self.careers_url, &id),
            id,
            mirrored,
        })
    }

    pub async fn list_jobs(&self) -> Result<Vec<JobSummary>> {
        let response = self
            .client
            .request_with_query(
                Method::GET,
                "/JobOpenings",
                &[("fields", JOB_LIST_FIELDS)],
                None,
            )
            .await?;

        Ok(response
            .data()
            .iter()
            .filter_map(JobSummary::from_external)
            .collect())
    }

    /// Raw provider record, `None` when the opening does not exist.
    pub async fn get_job_details(&self, job_id: &str) -> Result<Option<Value>> {
        let job_id = path_segment("job", job_id)?;
        match self.client.get(&format!("/JobOpenings/{}", job_id)).await {
            Ok(response) => Ok(response.data().into_iter().next()),
            Err(err) if err.remote_status() == Some(404) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Unpublish (best-effort), then mark the opening inactive (authoritative).
    #[instrument(skip(self))]
    pub async fn archive_job(&self, job_id: &str) -> Result<DualWriteOutcome> {
        let job_id = path_segment("job", job_id)?;
        let path = format!("/JobOpenings/{}", job_id);
        let unpublish = mapping::unpublish_payload(job_id);
        let inactive = mapping::archive_status_payload(job_id);

        self.dual_write(
            "archive job",
            self.client.put(&path, &unpublish),
            self.client.put(&path, &inactive),
        )
        .await
    }

    pub fn job_apply_url(&self, job_id: &str) -> Result<String> {
        let job_id = path_segment("job", job_id)?;
        Ok(mapping::apply_url(&self.careers_url, job_id))
    }

    /// Locally mirrored postings, empty without a database.
    pub async fn mirrored_jobs(&self) -> Result<Vec<JobRecord>> {
        match &self.database {
            Some(db) => db.jobs().list().await,
            None => Ok(Vec::new()),
        }
    }
}
