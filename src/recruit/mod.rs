// src/recruit/mod.rs
//! Recruiting platform integration.
//!
//! - [`client`]: authenticated HTTP with a single 401 repair
//! - [`mapping`]: internal and external field names
//! - [`jobs`], [`candidates`]: domain operations on [`RecruitService`]

pub mod candidates;
pub mod client;
pub mod jobs;
pub mod mapping;

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

pub use client::{ApiResponse, RecruitClient};
pub use jobs::CreatedJob;
pub use mapping::{JobPosting, JobSummary};

use crate::database::Database;
use crate::error::{RelayError, Result};

/// Result of a two-step update. The second write decides success; the first
/// is best-effort and only recorded here.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DualWriteOutcome {
    pub best_effort_applied: bool,
    pub response: Value,
}

pub struct RecruitService {
    client: RecruitClient,
    database: Option<Arc<Database>>,
    careers_url: String,
}

impl RecruitService {
    pub fn new(client: RecruitClient, careers_url: String) -> Self {
        Self {
            client,
            database: None,
            careers_url: careers_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn with_database(mut self, database: Arc<Database>) -> Self {
        self.database = Some(database);
        self
    }

    /// No compensation exists: if the best-effort write lands and the
    /// authoritative one fails, the first change stays on the provider.
    async fn dual_write<B, A>(&self, operation: &str, best_effort: B, authoritative: A) -> Result<DualWriteOutcome>
    where
        B: Future<Output = Result<ApiResponse>>,
        A: Future<Output = Result<ApiResponse>>,
    {
        let best_effort_applied = match best_effort.await {
            Ok(response) if mapping::write_succeeded(&response.body) => true,
            Ok(response) => {
                warn!("{}: best-effort write not applied: {}", operation, response.body);
                false
            }
            Err(err) => {
                warn!("{}: best-effort write failed: {}", operation, err);
                false
            }
        };

        let response = authoritative.await?;
        if !mapping::write_succeeded(&response.body) {
            warn!("{}: provider did not apply update: {}", operation, response.body);
            return Err(RelayError::InvalidResponse(format!(
                "{} was not applied by the recruiting API",
                operation
            )));
        }

        info!("{} applied (best-effort write applied: {})", operation, best_effort_applied);
        Ok(DualWriteOutcome {
            best_effort_applied,
            response: response.body,
        })
    }
}

/// Record id as a single path segment.
pub(crate) fn path_segment<'a>(kind: &str, id: &'a str) -> Result<&'a str> {
    let id = id.trim();
    if id.is_empty() || id.contains(['/', '?', '#']) {
        return Err(RelayError::Validation(format!("invalid {} id", kind)));
    }
    Ok(id)
}
