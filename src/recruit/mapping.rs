// src/recruit/mapping.rs
//! Field-name translation between internal job records and the recruiting
//! API's module schema. Dates travel as `YYYY-MM-DD` in both directions.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{RelayError, Result};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const CLIENT_NAME: &str = "My company";
pub const OPEN_STATUS: &str = "In-progress";
pub const ARCHIVED_STATUS: &str = "Inactive";
pub const MISSING_DESCRIPTION: &str = "No description";

/// Fields requested when listing job openings.
pub const JOB_LIST_FIELDS: &str =
    "id,Posting_Title,City,Job_Opening_Status,Salary,Industry,Job_Type,Target_Date,Job_Description";

fn default_industry() -> String {
    "IT Services".to_string()
}

fn default_job_type() -> String {
    "Full Time".to_string()
}

/// A job posting as submitted by the internal UI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobPosting {
    pub title: String,
    pub description: String,
    pub location: String,
    #[serde(default = "default_industry")]
    pub industry: String,
    #[serde(default = "default_job_type")]
    pub job_type: String,
    #[serde(default)]
    pub salary_range: Option<String>,
    #[serde(default)]
    pub experience_required: Option<String>,
    pub target_date: NaiveDate,
}

impl JobPosting {
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("title", &self.title),
            ("description", &self.description),
            ("location", &self.location),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(RelayError::Validation(format!("{} must not be empty", name)));
            }
        }
        Ok(())
    }

    /// Create payload for the job openings module.
    pub fn to_external(&self) -> Value {
        json!({
            "data": [{
                "Posting_Title": self.title,
                "Job_Opening_Name": self.title,
                "Client_Name": CLIENT_NAME,
                "City": self.location,
                "Salary": self.salary_range,
                "Work_Experience": self.experience_required,
                "Job_Description": self.description,
                "Industry": self.industry,
                "Job_Type": self.job_type,
                "Target_Date": format_date(self.target_date),
                "Job_Opening_Status": OPEN_STATUS,
            }]
        })
    }
}

/// A job opening as shown in the UI list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobSummary {
    pub id: String,
    pub title: Option<String>,
    pub location: Option<String>,
    pub salary_range: Option<String>,
    pub industry: Option<String>,
    pub job_type: Option<String>,
    pub target_date: Option<String>,
    pub status: Option<String>,
    pub description: String,
}

impl JobSummary {
    /// `None` when the record carries no id.
    pub fn from_external(record: &Value) -> Option<Self> {
        let id = field_str(record, "id")?;
        Some(Self {
            id,
            title: field_str(record, "Posting_Title"),
            location: field_str(record, "City"),
            salary_range: field_str(record, "Salary"),
            industry: field_str(record, "Industry"),
            job_type: field_str(record, "Job_Type"),
            target_date: field_str(record, "Target_Date")
                .map(|d| normalize_date(&d).map(format_date).unwrap_or(d)),
            status: field_str(record, "Job_Opening_Status"),
            description: field_str(record, "Job_Description")
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| MISSING_DESCRIPTION.to_string()),
        })
    }
}

/// Public careers-page link for an opening.
pub fn apply_url(careers_url: &str, job_id: &str) -> String {
    format!("{}/job-details/{}", careers_url.trim_end_matches('/'), job_id)
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a provider date. Accepts a plain date or a timestamp starting with one.
pub fn normalize_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let date_part = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(date_part, DATE_FORMAT).ok()
}

/// String view of a record field. Numbers are rendered, null and empty are `None`.
pub fn field_str(record: &Value, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub fn candidate_status_payload(candidate_id: &str, status: &str) -> Value {
    json!({
        "data": [{
            "id": candidate_id,
            "Application_Status": status,
            "Candidate_Stage": status,
        }]
    })
}

pub fn association_status_payload(candidate_id: &str, status: &str) -> Value {
    json!({
        "data": [{
            "id": candidate_id,
            "Status": status,
        }]
    })
}

pub fn unpublish_payload(job_id: &str) -> Value {
    json!({ "data": [{ "id": job_id, "Publish": false }] })
}

pub fn archive_status_payload(job_id: &str) -> Value {
    json!({ "data": [{ "id": job_id, "Job_Opening_Status": ARCHIVED_STATUS }] })
}

/// Id of the first record of a write response, when it reports success.
pub fn created_record_id(body: &Value) -> Option<String> {
    let first = body.get("data")?.as_array()?.first()?;
    if first.get("status").and_then(Value::as_str) != Some("success") {
        return None;
    }
    first.get("details").and_then(|d| field_str(d, "id"))
}

/// Whether the first record of a write response reports success. Responses
/// without a per-record status are accepted on their HTTP status alone.
pub fn write_succeeded(body: &Value) -> bool {
    let first = body
        .get("data")
        .and_then(Value::as_array)
        .and_then(|records| records.first());
    match first.and_then(|r| r.get("status")).and_then(Value::as_str) {
        Some(status) => status == "success",
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posting() -> JobPosting {
        JobPosting {
            title: "Platform Engineer".to_string(),
            description: "Build the relay".to_string(),
            location: "Pune".to_string(),
            industry: default_industry(),
            job_type: default_job_type(),
            salary_range: Some("20-30 LPA".to_string()),
            experience_required: None,
            target_date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
        }
    }

    #[test]
    fn test_defaults_applied_on_deserialize() {
        let posting: JobPosting = serde_json::from_value(json!({
            "title": "t",
            "description": "d",
            "location": "l",
            "target_date": "2026-01-05"
        }))
        .unwrap();
        assert_eq!(posting.industry, "IT Services");
        assert_eq!(posting.job_type, "Full Time");
        assert!(posting.salary_range.is_none());
    }

    #[test]
    fn test_target_date_is_literal_iso_string() {
        let payload = posting().to_external();
        let record = &payload["data"][0];
        assert_eq!(record["Target_Date"], json!("2026-01-05"));
        assert_eq!(record["Posting_Title"], json!("Platform Engineer"));
        assert_eq!(record["Job_Opening_Name"], json!("Platform Engineer"));
        assert_eq!(record["City"], json!("Pune"));
        assert_eq!(record["Job_Opening_Status"], json!(OPEN_STATUS));
        assert_eq!(record["Work_Experience"], Value::Null);
    }

    #[test]
    fn test_validate_rejects_blank_fields() {
        let mut job = posting();
        assert!(job.validate().is_ok());
        job.location = "  ".to_string();
        assert!(matches!(job.validate(), Err(RelayError::Validation(_))));
    }

    #[test]
    fn test_summary_from_external() {
        let record = json!({
            "id": "846914000000554001",
            "Posting_Title": "Platform Engineer",
            "City": "Pune",
            "Salary": 2500000,
            "Target_Date": "2026-01-05",
            "Job_Description": null
        });
        let summary = JobSummary::from_external(&record).unwrap();
        assert_eq!(summary.id, "846914000000554001");
        assert_eq!(summary.salary_range.as_deref(), Some("2500000"));
        assert_eq!(summary.target_date.as_deref(), Some("2026-01-05"));
        assert_eq!(summary.description, MISSING_DESCRIPTION);

        assert!(JobSummary::from_external(&json!({"Posting_Title": "x"})).is_none());
    }

    #[test]
    fn test_normalize_date() {
        let expected = NaiveDate::from_ymd_opt(2026, 1, 5);
        assert_eq!(normalize_date("2026-01-05"), expected);
        assert_eq!(normalize_date("2026-01-05T10:00:00+05:30"), expected);
        assert_eq!(normalize_date("05/01/2026"), None);
        assert_eq!(normalize_date(""), None);
    }

    #[test]
    fn test_created_record_id() {
        let ok = json!({"data": [{"status": "success", "details": {"id": "42"}}]});
        assert_eq!(created_record_id(&ok).as_deref(), Some("42"));

        let failed = json!({"data": [{"status": "error", "code": "MANDATORY_NOT_FOUND"}]});
        assert_eq!(created_record_id(&failed), None);
        assert!(!write_succeeded(&failed));
        assert!(write_succeeded(&json!({})));
    }
}
