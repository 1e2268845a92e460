// src/recruit/candidates.rs
use serde_json::Value;
use tracing::{debug, instrument};

use super::mapping;
use super::{path_segment, DualWriteOutcome, RecruitService};
use crate::error::{RelayError, Result};

impl RecruitService {
    /// Association records of candidates who applied to `job_id`.
    pub async fn list_candidates(&self, job_id: &str) -> Result<Vec<Value>> {
        let job_id = path_segment("job", job_id)?;
        let response = self
            .client
            .get(&format!("/JobOpenings/{}/associate", job_id))
            .await?;
        Ok(response.data())
    }

    /// Candidate record, `None` when it does not exist.
    pub async fn get_candidate(&self, job_id: &str, candidate_id: &str) -> Result<Option<Value>> {
        let job_id = path_segment("job", job_id)?;
        let candidate_id = path_segment("candidate", candidate_id)?;
        debug!("Fetching candidate {} for job {}", candidate_id, job_id);

        match self.client.get(&format!("/Candidates/{}", candidate_id)).await {
            Ok(response) => Ok(response.data().into_iter().next()),
            Err(err) if err.remote_status() == Some(404) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Candidate-level status (best-effort), then the job association
    /// status (authoritative).
    #[instrument(skip(self))]
    pub async fn update_candidate_status(
        &self,
        job_id: &str,
        candidate_id: &str,
        status: &str,
    ) -> Result<DualWriteOutcome> {
        let job_id = path_segment("job", job_id)?;
        let candidate_id = path_segment("candidate", candidate_id)?;
        let status = status.trim();
        if status.is_empty() {
            return Err(RelayError::Validation("status must not be empty".to_string()));
        }

        let candidate_path = format!("/Candidates/{}", candidate_id);
        let candidate_payload = mapping::candidate_status_payload(candidate_id, status);
        let association_path = format!("/JobOpenings/{}/associate", job_id);
        let association_payload = mapping::association_status_payload(candidate_id, status);

        self.dual_write(
            "candidate status update",
            self.client.put(&candidate_path, &candidate_payload),
            self.client.post(&association_path, &association_payload),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::oauth::TokenSet;
    use crate::test_utils::{authenticated_client, recruit_client_with_timeout, API_PATH};

    const CAREERS: &str = "https://jobs.zoho.com/recruit/careers";

    async fn service(server: &MockServer) -> RecruitService {
        RecruitService::new(authenticated_client(server).await, CAREERS.to_string())
    }

    fn success() -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"code": "SUCCESS", "status": "success", "details": {"id": "58"}}]
        }))
    }

    #[tokio::test]
    async fn test_candidate_write_timeout_association_wins() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(format!("{API_PATH}/Candidates/58")))
            .respond_with(success().set_delay(Duration::from_secs(3)))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(format!("{API_PATH}/JobOpenings/55/associate")))
            .and(body_partial_json(json!({"data": [{"id": "58", "Status": "Screening"}]})))
            .respond_with(success())
            .expect(1)
            .mount(&server)
            .await;

        let client = recruit_client_with_timeout(&server, Duration::from_millis(300));
        client
            .tokens()
            .store_tokens(TokenSet::new("access-1".into(), Some("refresh-1".into()), None))
            .await;
        let service = RecruitService::new(client, CAREERS.to_string());

        let outcome = service
            .update_candidate_status("55", "58", "Screening")
            .await
            .unwrap();
        assert!(!outcome.best_effort_applied);
        assert_eq!(outcome.response["data"][0]["status"], json!("success"));
    }

    #[tokio::test]
    async fn test_both_status_writes_applied() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(format!("{API_PATH}/Candidates/58")))
            .and(body_partial_json(json!({
                "data": [{"Application_Status": "Hired", "Candidate_Stage": "Hired"}]
            })))
            .respond_with(success())
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(format!("{API_PATH}/JobOpenings/55/associate")))
            .respond_with(success())
            .expect(1)
            .mount(&server)
            .await;

        let outcome = service(&server)
            .await
            .update_candidate_status("55", "58", "Hired")
            .await
            .unwrap();
        assert!(outcome.best_effort_applied);
    }

    #[tokio::test]
    async fn test_association_failure_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(format!("{API_PATH}/Candidates/58")))
            .respond_with(success())
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(format!("{API_PATH}/JobOpenings/55/associate")))
            .respond_with(ResponseTemplate::new(400).set_body_string("INVALID_DATA"))
            .mount(&server)
            .await;

        let err = service(&server)
            .await
            .update_candidate_status("55", "58", "Hired")
            .await
            .unwrap_err();
        assert_eq!(err.remote_status(), Some(400));
    }

    #[tokio::test]
    async fn test_blank_status_rejected() {
        let server = MockServer::start().await;
        let err = service(&server)
            .await
            .update_candidate_status("55", "58", " ")
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::Validation(_)));
    }

    #[tokio::test]
    async fn test_list_and_get_candidates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{API_PATH}/JobOpenings/55/associate")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"id": "58", "First_Name": "Asha", "Status": "Screening"}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("{API_PATH}/JobOpenings/56/associate")))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("{API_PATH}/Candidates/58")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"id": "58", "Email": "asha@example.com"}]
            })))
            .mount(&server)
            .await;

        let service = service(&server).await;
        let candidates = service.list_candidates("55").await.unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0]["First_Name"], json!("Asha"));
        assert!(service.list_candidates("56").await.unwrap().is_empty());

        let candidate = service.get_candidate("55", "58").await.unwrap().unwrap();
        assert_eq!(candidate["Email"], json!("asha@example.com"));

        let err = service.get_candidate("55?x=1", "58").await.unwrap_err();
        assert!(matches!(err, RelayError::Validation(_)));
    }
}
