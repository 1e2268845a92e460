// src/portals/mod.rs
//! Job-board publishing.
//!
//! Each board is a [`Portal`]. The [`PortalRegistry`] is assembled once at
//! startup and handed to the web layer; nothing registers itself.

mod careers;
mod mock;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

pub use careers::CareersPortal;
pub use mock::MockPortal;

use crate::error::{RelayError, Result};
use crate::recruit::JobSummary;

/// Reference to a job published on one board.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PortalPosting {
    pub portal: String,
    pub reference: String,
    pub url: Option<String>,
}

/// Outcome of publishing to one requested board.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PortalResult {
    pub portal: String,
    pub success: bool,
    pub posting: Option<PortalPosting>,
    pub error: Option<String>,
}

#[async_trait]
pub trait Portal: Send + Sync {
    fn name(&self) -> &str;

    async fn publish(&self, job: &JobSummary) -> Result<PortalPosting>;
}

#[derive(Default, Clone)]
pub struct PortalRegistry {
    portals: BTreeMap<String, Arc<dyn Portal>>,
}

impl PortalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Careers page plus the mock board.
    pub fn with_defaults(careers_url: &str) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(CareersPortal::new(careers_url)));
        registry.register(Arc::new(MockPortal::default()));
        registry
    }

    /// Later registrations replace earlier ones with the same name.
    pub fn register(&mut self, portal: Arc<dyn Portal>) {
        let name = portal.name().to_string();
        if self.portals.insert(name.clone(), portal).is_some() {
            warn!("Portal {} registered twice, keeping the latest", name);
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Portal>> {
        self.portals.get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        self.portals.keys().cloned().collect()
    }

    /// Publish to each requested board in order. One board failing does not
    /// stop the others.
    pub async fn publish(&self, job: &JobSummary, names: &[String]) -> Vec<PortalResult> {
        let mut results = Vec::with_capacity(names.len());

        for name in names {
            let outcome = match self.get(name) {
                Some(portal) => portal.publish(job).await,
                None => Err(RelayError::NotFound(format!("portal {}", name))),
            };

            let result = match outcome {
                Ok(posting) => {
                    info!("Job {} published to {}", job.id, name);
                    PortalResult {
                        portal: name.clone(),
                        success: true,
                        posting: Some(posting),
                        error: None,
                    }
                }
                Err(err) => {
                    warn!("Job {} not published to {}: {}", job.id, name, err);
                    PortalResult {
                        portal: name.clone(),
                        success: false,
                        posting: None,
                        error: Some(err.to_string()),
                    }
                }
            };
            results.push(result);
        }

        results
    }
}
